//! Two-tier page content extraction.
//!
//! ### Lightweight Path
//! - Validate the URL; a malformed URL ends extraction before any request.
//! - GET with a rotated browser header set, retried on transport failures
//!   and non-2xx statuses; retry `n` (1-based) waits `backoff_unit * 2^n`.
//! - Non-HTML responses end extraction (no retry, no escalation).
//!
//! ### Escalation
//! - Text shorter than `min_chars`, or a fetch that never succeeded, is
//!   handed to the browser renderer once.
//! - If rendering fails, any short lightweight text is still returned.
//!
//! Every failure collapses to an empty string at the public boundary.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sift_core::{AppConfig, Error};
use url::Url;

use crate::extract::extract_main_text;
use crate::fetch::{FetchClient, validate};
use crate::render::{RenderOptions, Renderer};

/// Anything that can turn a URL into page text.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    /// Extracted text, or an empty string when nothing could be read.
    async fn extract_content(&self, url: &str) -> String;
}

/// Retry and escalation thresholds.
#[derive(Debug, Clone)]
pub struct ExtractPolicy {
    /// Lightweight fetch attempts (default: 2).
    pub max_attempts: u32,

    /// Backoff unit; retry `n` (1-based) waits `backoff_unit * 2^n`, so 2s then 4s (default: 1s).
    pub backoff_unit: Duration,

    /// Shorter text escalates to the renderer (default: 200 chars).
    pub min_chars: usize,

    /// Browser timing.
    pub render: RenderOptions,
}

impl Default for ExtractPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff_unit: Duration::from_secs(1),
            min_chars: 200,
            render: RenderOptions::default(),
        }
    }
}

impl ExtractPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            backoff_unit: config.backoff_unit(),
            min_chars: config.min_content_chars,
            render: RenderOptions { timeout: config.render_timeout(), settle: config.render_settle() },
        }
    }

    /// Wait before retrying after the failed attempt `attempt` (0-based).
    fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit.saturating_mul(2u32.saturating_pow(attempt.saturating_add(1)))
    }
}

/// Fetches a page and extracts its main text, escalating to a browser when
/// the cheap path comes back short.
#[derive(Clone)]
pub struct ContentExtractor {
    fetch: FetchClient,
    renderer: Option<Arc<dyn Renderer>>,
    policy: ExtractPolicy,
}

impl std::fmt::Debug for ContentExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentExtractor")
            .field("fetch", &self.fetch)
            .field("renderer", &self.renderer.is_some())
            .field("policy", &self.policy)
            .finish()
    }
}

impl ContentExtractor {
    /// Extractor without a browser; short pages return whatever the fetch produced.
    pub fn new(fetch: FetchClient, policy: ExtractPolicy) -> Self {
        Self { fetch, renderer: None, policy }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn policy(&self) -> &ExtractPolicy {
        &self.policy
    }

    /// Run the full pipeline, surfacing the reason when nothing was extracted.
    pub async fn try_extract(&self, url: &str) -> Result<String, Error> {
        let url = validate(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let light = match self.fetch_text(&url).await {
            Ok(text) if text.chars().count() >= self.policy.min_chars => return Ok(text),
            Ok(text) => {
                let chars = text.chars().count();
                tracing::warn!(url = %url, chars, "extracted text too short, escalating to browser");
                Some(text)
            }
            Err(err) if err.is_retryable() => {
                tracing::warn!(url = %url, error = %err, "lightweight fetch failed, escalating");
                None
            }
            Err(err) => return Err(err),
        };

        let Some(renderer) = &self.renderer else {
            return light.ok_or(Error::RenderDisabled);
        };

        match self.render_text(renderer.as_ref(), &url).await {
            Ok(text) if !text.is_empty() => Ok(text),
            Ok(_) => light.ok_or_else(|| Error::ExtractFailed("rendered page has no text".into())),
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "browser extraction failed");
                light.ok_or(err)
            }
        }
    }

    /// Lightweight fetch with retries, then main-text extraction.
    async fn fetch_text(&self, url: &Url) -> Result<String, Error> {
        let mut attempt = 0;
        let response = loop {
            match self.fetch.fetch(url).await {
                Ok(response) => break response,
                Err(err) if err.is_retryable() && attempt + 1 < self.policy.max_attempts => {
                    let delay = self.policy.backoff(attempt);
                    let delay_ms = delay.as_millis() as u64;
                    tracing::debug!(url = %url, attempt, error = %err, delay_ms, "retrying fetch");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        };

        if !response.is_html() {
            let content_type = response.content_type.unwrap_or_else(|| "missing content type".into());
            return Err(Error::NotHtml(content_type));
        }

        extract_main_text(&response.text())
    }

    async fn render_text(&self, renderer: &dyn Renderer, url: &Url) -> Result<String, Error> {
        let page = renderer
            .render(url, &self.policy.render)
            .await
            .map_err(|e| Error::RenderFailed(e.to_string()))?;

        tracing::debug!(
            url = %url,
            final_url = %page.final_url,
            render_ms = page.render_time_ms,
            "page rendered"
        );

        extract_main_text(&page.html)
    }
}

#[async_trait]
impl PageExtractor for ContentExtractor {
    async fn extract_content(&self, url: &str) -> String {
        match self.try_extract(url).await {
            Ok(text) => text,
            Err(err @ Error::InvalidUrl(_)) => {
                tracing::debug!(url, error = %err, "skipping extraction");
                String::new()
            }
            Err(err) => {
                tracing::warn!(url, error = %err, "content extraction failed");
                String::new()
            }
        }
    }
}
