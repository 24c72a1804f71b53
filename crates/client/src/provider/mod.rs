//! Search backends.
//!
//! Two kinds of provider share one contract:
//!
//! - [`ApiProvider`]: a JSON API described by a `ProviderConfig`, with a
//!   lifetime quota and a minimum interval between requests.
//! - [`FallbackProvider`]: the credential-free DuckDuckGo HTML endpoint, used
//!   when every quota-bearing provider is spent or came back empty.
//!
//! `search` never fails outward: transport, status, and shape errors are
//! logged and turned into an empty list.

pub mod adapter;
pub mod error;
pub mod fallback;
pub mod response;

pub use adapter::{ApiProvider, ProviderUsage};
pub use error::ProviderError;
pub use fallback::{FallbackProvider, sanitize_query};
pub use sift_core::FALLBACK_NAME;

use async_trait::async_trait;
use sift_core::SearchResult;

/// A search backend the orchestrator can call.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Unique name referenced by the priority list.
    fn name(&self) -> &str;

    /// Whether another request may be sent. Unbounded providers always say yes.
    async fn has_quota(&self) -> bool {
        true
    }

    /// Return at most `num_results` hits, or an empty list on any failure.
    async fn search(&self, query: &str, num_results: usize) -> Vec<SearchResult>;
}
