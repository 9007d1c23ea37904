use crate::configuration::Settings;
use crate::forms;
use crate::routes::auth::token_response;
use crate::services::{CredentialService, ServiceError};
use crate::storage::{Storage, StoreError};
use actix_web::{post, web, HttpResponse};
use chrono::Utc;

#[tracing::instrument(
    name = "Login.",
    skip(form, storage, credentials, settings),
    fields(username = %form.username)
)]
#[post("/login")]
pub async fn handler(
    form: web::Json<forms::LoginForm>,
    storage: web::Data<Storage>,
    credentials: web::Data<CredentialService>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ServiceError> {
    let bad_login = || ServiceError::unauthorized("ln-202", "Invalid username or password");

    let user = storage
        .users
        .get_user_by_username(&form.username)
        .await
        .map_err(|err| match err {
            StoreError::NotFound => bad_login(),
            other => ServiceError::persistence("ln-201", format!("Failed to load user: {}", other)),
        })?;

    if !credentials.verify(&form.password, &user.password_hash) {
        return Err(bad_login());
    }
    if !user.is_active {
        return Err(ServiceError::unauthorized("ln-203", "User is not active"));
    }

    if let Err(err) = storage.users.record_login(user.id, Utc::now()).await {
        tracing::warn!(user_id = %user.id, "Failed to record last login: {}", err);
    }

    token_response(
        HttpResponse::Ok(),
        credentials.get_ref(),
        settings.get_ref(),
        user.id,
        "ln-204",
        "Logged in",
    )
}
