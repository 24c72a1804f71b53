//! Provider error types.

use std::sync::Arc;

/// Errors from a search provider call.
///
/// None of these reach the orchestrator's caller: `SearchProvider::search`
/// logs them and returns an empty list.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Lifetime request quota already spent.
    #[error("quota exhausted: {used}/{quota} requests used")]
    QuotaExhausted { used: u64, quota: u64 },

    /// Authentication failed (bad or missing credential).
    #[error("authentication failed")]
    AuthError,

    /// Rate limited by the backend.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// Other non-2xx response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response body did not have the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { ProviderError::Timeout } else { ProviderError::Network(Arc::new(err)) }
    }
}

impl ProviderError {
    pub(crate) fn from_status(status: reqwest::StatusCode) -> Option<Self> {
        match status.as_u16() {
            401 | 403 => Some(ProviderError::AuthError),
            429 => Some(ProviderError::RateLimited),
            _ if status.is_client_error() || status.is_server_error() => {
                Some(ProviderError::HttpError { status: status.as_u16() })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_error_display() {
        let err = ProviderError::QuotaExhausted { used: 100, quota: 100 };
        assert!(err.to_string().contains("100/100"));

        let err = ProviderError::HttpError { status: 502 };
        assert_eq!(err.to_string(), "HTTP error: 502");
    }

    #[test]
    fn test_from_status() {
        assert!(matches!(ProviderError::from_status(StatusCode::UNAUTHORIZED), Some(ProviderError::AuthError)));
        assert!(matches!(ProviderError::from_status(StatusCode::FORBIDDEN), Some(ProviderError::AuthError)));
        assert!(matches!(ProviderError::from_status(StatusCode::TOO_MANY_REQUESTS), Some(ProviderError::RateLimited)));
        assert!(matches!(
            ProviderError::from_status(StatusCode::SERVICE_UNAVAILABLE),
            Some(ProviderError::HttpError { status: 503 })
        ));
        assert!(ProviderError::from_status(StatusCode::OK).is_none());
    }
}
