//! URL validation for page extraction.
//!
//! Unlike a browser address bar, nothing is guessed: the input must already
//! be an absolute http(s) URL with a host.

/// Error type for URL validation failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("missing host: {0}")]
    MissingHost(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Validate a URL string before any network call is made.
///
/// Steps:
/// 1. Trim leading/trailing whitespace
/// 2. Parse as an absolute URL (no scheme is assumed)
/// 3. Require an `http` or `https` scheme and a host
/// 4. Remove fragment (#...), which is never sent to the server
pub fn validate(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(format!("{trimmed}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlError::MissingHost(trimmed.to_string()));
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Whether a provider hit URL is usable as a result link.
pub fn is_absolute_http(input: &str) -> bool {
    validate(input).is_ok()
}
