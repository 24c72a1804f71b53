//! Bounded pool of short-lived browser sessions.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Semaphore;
use url::Url;

use super::{RenderError, RenderOptions, RenderedPage, Renderer, SessionLauncher};

/// Upper bound on a session shutdown before the pool gives up on it.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Renderer that launches one session per call, at most `size` at a time.
#[derive(Clone)]
pub struct RenderPool {
    launcher: Arc<dyn SessionLauncher>,
    permits: Arc<Semaphore>,
    size: usize,
    close_timeout: Duration,
}

impl std::fmt::Debug for RenderPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPool")
            .field("size", &self.size)
            .field("available", &self.permits.available_permits())
            .finish()
    }
}

impl RenderPool {
    /// Create a pool; a size of 0 is treated as 1.
    pub fn new(launcher: Arc<dyn SessionLauncher>, size: usize) -> Self {
        let size = size.max(1);
        Self { launcher, permits: Arc::new(Semaphore::new(size)), size, close_timeout: DEFAULT_CLOSE_TIMEOUT }
    }

    /// Bound how long a session may take to shut down before its permit is released anyway.
    pub fn with_close_timeout(mut self, close_timeout: Duration) -> Self {
        self.close_timeout = close_timeout;
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Sessions that could be launched right now without waiting.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

#[async_trait]
impl Renderer for RenderPool {
    async fn render(&self, url: &Url, opts: &RenderOptions) -> Result<RenderedPage, RenderError> {
        // The semaphore is never closed, so acquire only fails if that changes.
        let _permit = self.permits.acquire().await.map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

        let start = Instant::now();
        let mut session = self.launcher.launch().await?;

        let outcome = tokio::time::timeout(opts.timeout, session.render(url, opts)).await;

        if tokio::time::timeout(self.close_timeout, session.close()).await.is_err() {
            let timeout_ms = self.close_timeout.as_millis() as u64;
            tracing::warn!(url = %url, timeout_ms, "browser session did not close in time");
        }

        let elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(url = %url, elapsed_ms, "browser session released");

        match outcome {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout(opts.timeout.as_millis() as u64)),
        }
    }
}
