//! Unified error types for sift.
//!
//! The public search and extraction contracts never surface these to callers;
//! they are logged and turned into an empty result. The code prefixes keep
//! log lines greppable.

/// Unified error types for the fetch, extract, and render pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// HTTP error response or transport failure.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Response declared a non-HTML content type.
    #[error("NOT_HTML: {0}")]
    NotHtml(String),

    /// Content extraction failed.
    #[error("EXTRACT_FAILED: {0}")]
    ExtractFailed(String),

    /// Render mode is disabled.
    #[error("RENDER_DISABLED")]
    RenderDisabled,

    /// Render failed.
    #[error("RENDER_FAILED: {0}")]
    RenderFailed(String),
}

impl Error {
    /// Whether a lightweight fetch that failed this way is worth retrying.
    ///
    /// Transport failures and non-2xx responses are retried; a bad URL,
    /// a non-HTML body, or an oversized body will not change on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::FetchTimeout(_) | Error::HttpError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("INVALID_URL"));
        assert!(err.to_string().contains("not a url"));

        assert_eq!(Error::RenderDisabled.to_string(), "RENDER_DISABLED");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(Error::FetchTimeout("5s".into()).is_retryable());
        assert!(Error::HttpError("status 503".into()).is_retryable());
        assert!(!Error::InvalidUrl("x".into()).is_retryable());
        assert!(!Error::NotHtml("application/pdf".into()).is_retryable());
        assert!(!Error::FetchTooLarge("6MB".into()).is_retryable());
    }
}
