/// Failure talking to the completion provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConnectorError {
    #[error("HTTP error: {0}")]
    HttpError(String),
    /// Connect failure, timeout or a 5xx from the provider.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    /// The stream carried something other than completion chunks.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Rate limited: {0}")]
    RateLimited(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConnectorError {
    /// Classify a non-success provider status.
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        let msg = format!("HTTP {} - {}", status.as_u16(), body);
        match status.as_u16() {
            401 | 403 => Self::Unauthorized(msg),
            429 => Self::RateLimited(msg),
            code if code >= 500 => Self::ServiceUnavailable(msg),
            _ => Self::HttpError(msg),
        }
    }
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::from_status(status, err.to_string()),
            None if err.is_timeout() || err.is_connect() => {
                Self::ServiceUnavailable(format!("Provider unreachable: {}", err))
            }
            None if err.is_decode() || err.is_body() => Self::InvalidResponse(err.to_string()),
            None => Self::HttpError(err.to_string()),
        }
    }
}
