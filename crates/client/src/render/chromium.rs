//! Chromium sessions via chromiumoxide.
//!
//! Each launch picks a random User-Agent and window size from fixed pools.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures_util::StreamExt;
use rand::seq::SliceRandom;
use tokio::task::JoinHandle;
use url::Url;

use super::{BrowserSession, RenderError, RenderOptions, RenderedPage, SessionLauncher};
use crate::fetch::random_user_agent;

const WINDOW_SIZES: &[(u32, u32)] = &[(1920, 1080), (1366, 768), (1536, 864), (1440, 900), (1280, 720)];

/// Time allowed for a graceful shutdown before the process is killed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

const BROWSER_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-blink-features=AutomationControlled",
    "--disable-extensions",
    "--no-first-run",
    "--disable-default-apps",
];

/// Launches a headless Chromium per session.
#[derive(Debug, Clone, Default)]
pub struct ChromiumLauncher;

impl ChromiumLauncher {
    pub fn new() -> Self {
        Self
    }

    fn config(&self) -> Result<BrowserConfig, RenderError> {
        let (width, height) = WINDOW_SIZES.choose(&mut rand::thread_rng()).copied().unwrap_or((1366, 768));
        let user_agent = format!("--user-agent={}", random_user_agent());

        BrowserConfig::builder()
            .window_size(width, height)
            .args(BROWSER_ARGS.iter().copied().chain(std::iter::once(user_agent.as_str())))
            .build()
            .map_err(RenderError::BrowserLaunch)
    }
}

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, RenderError> {
        let (browser, mut handler) =
            Browser::launch(self.config()?).await.map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                }
            }
        });

        Ok(Box::new(ChromiumSession { browser, handler_task }))
    }
}

struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn render(&mut self, url: &Url, opts: &RenderOptions) -> Result<RenderedPage, RenderError> {
        let start = Instant::now();

        let page = self.browser.new_page(url.as_str()).await.map_err(|e| RenderError::Navigation(e.to_string()))?;

        tokio::time::sleep(opts.settle).await;

        let html = page.content().await.map_err(|e| RenderError::ContentRetrieval(e.to_string()))?;
        let page_url = page.url().await.map_err(|e| RenderError::ContentRetrieval(e.to_string()))?;
        let final_url = page_url.as_deref().and_then(|u| Url::parse(u).ok()).unwrap_or_else(|| url.clone());

        page.close().await.ok();

        Ok(RenderedPage { html, final_url, render_time_ms: start.elapsed().as_millis() as u64 })
    }

    async fn close(mut self: Box<Self>) {
        let graceful = tokio::time::timeout(SHUTDOWN_GRACE, async {
            if let Err(e) = self.browser.close().await {
                tracing::debug!("browser close error (ignored): {e}");
            }
            self.browser.wait().await.ok();
        })
        .await;

        if graceful.is_err() {
            tracing::warn!("browser did not exit within {}s, killing it", SHUTDOWN_GRACE.as_secs());
            if let Some(Err(e)) = self.browser.kill().await {
                tracing::warn!("failed to kill browser process: {e}");
            }
        }

        self.handler_task.abort();
    }
}
