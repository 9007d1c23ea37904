mod login;
mod refresh;
mod register;

pub use login::handler as login_handler;
pub use refresh::handler as refresh_handler;
pub use register::handler as register_handler;

use crate::configuration::Settings;
use crate::helpers::JsonResponse;
use crate::services::{CredentialError, CredentialService, ServiceError};
use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::{HttpResponse, HttpResponseBuilder};
use serde_derive::Serialize;
use uuid::Uuid;

pub const REFRESH_COOKIE: &str = "refresh_token";

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

fn refresh_cookie(token: String, settings: &Settings) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, token)
        .http_only(true)
        .secure(settings.auth.secure_cookie)
        .same_site(SameSite::Strict)
        .path("/refresh")
        .max_age(Duration::seconds(settings.auth.refresh_token_ttl_secs))
        .finish()
}

/// Issues a token pair: the access token in the body, the refresh token in
/// its cookie.
pub(crate) fn token_response(
    mut response: HttpResponseBuilder,
    credentials: &CredentialService,
    settings: &Settings,
    user_id: Uuid,
    code: &'static str,
    msg: &str,
) -> Result<HttpResponse, ServiceError> {
    let issue_failed = |err: CredentialError| {
        ServiceError::persistence(code, format!("Failed to issue token: {}", err))
    };
    let access_token = credentials.issue_token(user_id).map_err(issue_failed)?;
    let refresh_token = credentials.issue_refresh_token(user_id).map_err(issue_failed)?;

    response.cookie(refresh_cookie(refresh_token, settings));
    Ok(JsonResponse::build()
        .set_id(user_id)
        .set_item(AccessToken {
            access_token,
            token_type: "Bearer",
            expires_in: settings.auth.access_token_ttl_secs,
        })
        .respond(response, msg))
}
