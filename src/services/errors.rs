use crate::helpers::JsonError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

/// Failure surfaced to HTTP callers. Each one carries a short stable code
/// that is also written to the logs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("{message} [{code}]")]
    InvalidRequest { code: &'static str, message: String },
    #[error("{message} [{code}]")]
    Unauthorized { code: &'static str, message: String },
    #[error("{message} [{code}]")]
    Forbidden { code: &'static str, message: String },
    #[error("{message} [{code}]")]
    NotFound { code: &'static str, message: String },
    #[error("{message} [{code}]")]
    Conflict { code: &'static str, message: String },
    #[error("{message} [{code}]")]
    Timeout { code: &'static str, message: String },
    #[error("{message} [{code}]")]
    UpstreamFailure { code: &'static str, message: String },
    #[error("{message} [{code}]")]
    PersistenceFailure { code: &'static str, message: String },
}

impl ServiceError {
    pub fn invalid(code: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidRequest { code, message: message.into() }
    }

    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::Unauthorized { code, message: message.into() }
    }

    pub fn forbidden(code: &'static str, message: impl Into<String>) -> Self {
        Self::Forbidden { code, message: message.into() }
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound { code, message: message.into() }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict { code, message: message.into() }
    }

    pub fn timeout(code: &'static str, message: impl Into<String>) -> Self {
        Self::Timeout { code, message: message.into() }
    }

    pub fn upstream(code: &'static str, message: impl Into<String>) -> Self {
        Self::UpstreamFailure { code, message: message.into() }
    }

    pub fn persistence(code: &'static str, message: impl Into<String>) -> Self {
        Self::PersistenceFailure { code, message: message.into() }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { code, .. }
            | Self::Unauthorized { code, .. }
            | Self::Forbidden { code, .. }
            | Self::NotFound { code, .. }
            | Self::Conflict { code, .. }
            | Self::Timeout { code, .. }
            | Self::UpstreamFailure { code, .. }
            | Self::PersistenceFailure { code, .. } => *code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidRequest { message, .. }
            | Self::Unauthorized { message, .. }
            | Self::Forbidden { message, .. }
            | Self::NotFound { message, .. }
            | Self::Conflict { message, .. }
            | Self::Timeout { message, .. }
            | Self::UpstreamFailure { message, .. }
            | Self::PersistenceFailure { message, .. } => message,
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
            Self::UpstreamFailure { .. } => StatusCode::BAD_GATEWAY,
            Self::PersistenceFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", self);
        } else {
            tracing::warn!(code = self.code(), "{}", self);
        }
        JsonError::new(self.message(), self.code()).response(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_appends_code() {
        let err = ServiceError::forbidden("h-002", "not your chat");
        assert_eq!(err.to_string(), "not your chat [h-002]");
        assert_eq!(err.code(), "h-002");
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ServiceError::invalid("c-002", ""), 400),
            (ServiceError::unauthorized("c-001", ""), 401),
            (ServiceError::forbidden("c-007", ""), 403),
            (ServiceError::not_found("c-006", ""), 404),
            (ServiceError::conflict("cu-101", ""), 409),
            (ServiceError::timeout("c-012", ""), 408),
            (ServiceError::upstream("c-011", ""), 502),
            (ServiceError::persistence("c-008", ""), 500),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{:?}", err);
        }
    }
}
