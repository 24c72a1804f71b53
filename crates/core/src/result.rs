//! The canonical search result record shared by providers, the cache, and callers.

use serde::{Deserialize, Serialize};

/// Title substituted when a provider hit carries no title.
pub const NO_TITLE: &str = "No title";

/// Snippet substituted when a provider hit carries no snippet.
pub const NO_SNIPPET: &str = "No snippet";

/// A single search hit, optionally enriched with extracted page text.
///
/// `content` is empty until the orchestrator enriches the hit and is capped
/// at the configured maximum content length afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    #[serde(default)]
    pub content: String,
}

impl SearchResult {
    /// Create an unenriched hit, substituting placeholders for missing text.
    pub fn new(title: Option<String>, url: impl Into<String>, snippet: Option<String>) -> Self {
        Self {
            title: title.filter(|t| !t.trim().is_empty()).unwrap_or_else(|| NO_TITLE.to_string()),
            url: url.into(),
            snippet: snippet.filter(|s| !s.trim().is_empty()).unwrap_or_else(|| NO_SNIPPET.to_string()),
            content: String::new(),
        }
    }

    /// Attach extracted text, truncated to at most `max_chars` characters.
    pub fn with_content(mut self, content: &str, max_chars: usize) -> Self {
        self.content = truncate_chars(content, max_chars).to_string();
        self
    }
}

/// Truncate to a character count without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
