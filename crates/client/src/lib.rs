//! Network-facing half of sift.
//!
//! This crate provides search providers, the lightweight fetch pipeline,
//! main-content extraction, browser rendering, and the orchestrator that
//! ties them together.

pub mod content;
pub mod extract;
pub mod fetch;
pub mod provider;
pub mod render;
pub mod search;

pub use content::{ContentExtractor, ExtractPolicy, PageExtractor};
pub use extract::extract_main_text;
pub use fetch::{FetchClient, FetchConfig, FetchResponse};
pub use provider::{ApiProvider, FallbackProvider, ProviderError, ProviderUsage, SearchProvider};
pub use render::{BrowserSession, RenderError, RenderOptions, RenderPool, RenderedPage, Renderer, SessionLauncher};
pub use search::{SearchOrchestrator, SearchSettings};
