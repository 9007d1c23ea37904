use crate::configuration::Settings;
use crate::routes::auth::{token_response, REFRESH_COOKIE};
use crate::services::{CredentialService, ServiceError};
use crate::storage::{Storage, StoreError};
use actix_web::{post, web, HttpRequest, HttpResponse};

#[tracing::instrument(name = "Refresh token.", skip_all)]
#[post("/refresh")]
pub async fn handler(
    req: HttpRequest,
    storage: web::Data<Storage>,
    credentials: web::Data<CredentialService>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ServiceError> {
    let rejected = || ServiceError::unauthorized("rf-400", "Invalid refresh token");

    let cookie = req.cookie(REFRESH_COOKIE).ok_or_else(rejected)?;
    let user_id = credentials
        .validate_refresh_token(cookie.value())
        .map_err(|err| {
            tracing::debug!("refresh token rejected: {}", err);
            rejected()
        })?;

    let user = storage
        .users
        .get_user_by_id(user_id)
        .await
        .map_err(|err| match err {
            StoreError::NotFound => rejected(),
            other => ServiceError::persistence("rf-402", format!("Failed to load user: {}", other)),
        })?;
    if !user.is_active {
        tracing::debug!(%user_id, "refresh for inactive user");
        return Err(rejected());
    }

    token_response(
        HttpResponse::Ok(),
        credentials.get_ref(),
        settings.get_ref(),
        user.id,
        "rf-401",
        "Token refreshed",
    )
}
