use crate::middleware::authentication::authorization_header;
use crate::models;
use crate::services::CredentialService;
use actix_web::dev::ServiceRequest;
use actix_web::{web, HttpMessage};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AuthFailure {
    #[error("Missing bearer token")]
    Missing,
    #[error("Invalid bearer token")]
    Invalid,
}

impl AuthFailure {
    pub fn code(&self) -> &'static str {
        match self {
            AuthFailure::Missing => "am-300",
            AuthFailure::Invalid => "am-301",
        }
    }
}

fn extract_bearer_token(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[tracing::instrument(name = "Authenticate with JWT", skip(req))]
pub fn try_jwt(req: &mut ServiceRequest) -> Result<(), AuthFailure> {
    let token = authorization_header(req)
        .map_err(|()| AuthFailure::Invalid)?
        .ok_or(AuthFailure::Missing)
        .and_then(|value| extract_bearer_token(value).ok_or(AuthFailure::Invalid))?
        .to_string();

    let credentials = req
        .app_data::<web::Data<CredentialService>>()
        .ok_or_else(|| {
            tracing::error!("credential service is not registered");
            AuthFailure::Invalid
        })?;

    let user_id = credentials.validate_token(&token).map_err(|err| {
        tracing::debug!("token rejected: {}", err);
        AuthFailure::Invalid
    })?;

    if req
        .extensions_mut()
        .insert(Arc::new(models::AuthUser { id: user_id }))
        .is_some()
    {
        tracing::error!("user already attached to request");
        return Err(AuthFailure::Invalid);
    }

    tracing::debug!(%user_id, "JWT authentication successful");
    Ok(())
}
