use crate::configuration::Settings;
use crate::forms;
use crate::models::NewUser;
use crate::routes::auth::token_response;
use crate::services::{CredentialService, ServiceError};
use crate::storage::{Storage, StoreError};
use actix_web::{post, web, HttpResponse};
use serde_valid::Validate;

#[tracing::instrument(
    name = "Register user.",
    skip(form, storage, credentials, settings),
    fields(username = %form.username)
)]
#[post("/register")]
pub async fn handler(
    form: web::Json<forms::RegisterForm>,
    storage: web::Data<Storage>,
    credentials: web::Data<CredentialService>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ServiceError> {
    if let Err(errors) = form.validate() {
        let errors = errors.to_string();
        tracing::debug!("Invalid data received {:?}", &errors);
        return Err(ServiceError::invalid("cu-100", errors));
    }

    let form = form.into_inner();
    let new_user = NewUser {
        password_hash: credentials.hash(&form.password),
        username: form.username,
        email: form.email,
    };

    let user = storage
        .users
        .create_user(new_user)
        .await
        .map_err(|err| match err {
            StoreError::Conflict(_) => {
                ServiceError::conflict("cu-101", "Username or email already registered")
            }
            other => ServiceError::persistence("cu-102", format!("Failed to create user: {}", other)),
        })?;
    tracing::info!(user_id = %user.id, "user registered");

    token_response(
        HttpResponse::Created(),
        credentials.get_ref(),
        settings.get_ref(),
        user.id,
        "cu-103",
        "User registered",
    )
}
