//! Headless browser rendering for pages the lightweight fetch cannot read.
//!
//! A [`RenderPool`] hands out at most `size` browser sessions at once. Each
//! render launches a fresh session through a [`SessionLauncher`] and closes it
//! before returning, whether the render succeeded, failed, or timed out.
//! The chromiumoxide launcher lives behind the `render` feature.

#[cfg(feature = "render")]
pub mod chromium;
pub mod pool;

#[cfg(feature = "render")]
pub use chromium::ChromiumLauncher;
pub use pool::RenderPool;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Errors that can occur during page rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Failed to launch or connect to browser.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Failed to navigate to URL.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Failed to get page content.
    #[error("content retrieval failed: {0}")]
    ContentRetrieval(String),

    /// Timeout waiting for page to load.
    #[error("render timeout after {0}ms")]
    Timeout(u64),
}

/// Options for rendering a page.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Deadline for navigation, settle time, and DOM retrieval together (default: 30s).
    pub timeout: Duration,

    /// Fixed wait after load so page scripts can run (default: 5s).
    pub settle: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), settle: Duration::from_secs(5) }
    }
}

/// Result of rendering a page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Rendered HTML content.
    pub html: String,

    /// Final URL after redirects.
    pub final_url: Url,

    /// Time taken to render in milliseconds.
    pub render_time_ms: u64,
}

/// Renderer trait for headless browser page rendering.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render a URL to HTML via headless browser.
    async fn render(&self, url: &Url, opts: &RenderOptions) -> Result<RenderedPage, RenderError>;
}

/// Starts browser sessions for the pool.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, RenderError>;
}

/// One live browser. Must be closed by its owner.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate, wait `opts.settle`, and return the rendered DOM.
    async fn render(&mut self, url: &Url, opts: &RenderOptions) -> Result<RenderedPage, RenderError>;

    /// Shut the browser down. Errors are logged, not returned.
    async fn close(self: Box<Self>);
}
