//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SIFT_*)
//! 2. TOML config file (if SIFT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod provider;
mod validation;

pub use provider::{HitFields, ProviderConfig};
pub use validation::ConfigError;

/// Name the keyless fallback backend answers to in the priority list.
pub const FALLBACK_NAME: &str = "duckduckgo_html";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SIFT_*)
/// 2. TOML config file (if SIFT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Google Custom Search API key.
    ///
    /// Set via SIFT_GOOGLE_API_KEY environment variable.
    #[serde(default)]
    pub google_api_key: Option<String>,

    /// Google Custom Search engine id (`cx`).
    ///
    /// Set via SIFT_GOOGLE_CX environment variable.
    #[serde(default)]
    pub google_cx: Option<String>,

    /// Brave Search subscription token.
    ///
    /// Set via SIFT_BRAVE_API_KEY environment variable.
    #[serde(default)]
    pub brave_api_key: Option<String>,

    /// Explicit provider list. When empty, presets are derived from the
    /// credentials above.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,

    /// Provider names in the order they are tried.
    #[serde(default = "default_priority")]
    pub priority: Vec<String>,

    /// Keyless backend used when every provider is exhausted or empty.
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Maximum number of cached queries.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Maximum characters of extracted content kept per result.
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,

    /// Provider request timeout in milliseconds.
    #[serde(default = "default_provider_timeout_ms")]
    pub provider_timeout_ms: u64,

    /// Page fetch timeout in milliseconds.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Maximum bytes to fetch per page.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Lightweight fetch attempts before escalating to the browser.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff unit in milliseconds; retry `n` (1-based) waits `backoff_ms * 2^n`.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Extracted text shorter than this escalates to the browser.
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,

    /// Whether the headless browser path is available.
    ///
    /// Set via SIFT_RENDER_ENABLED environment variable.
    #[serde(default = "default_true")]
    pub render_enabled: bool,

    /// Time given to page scripts before the DOM is read, in milliseconds.
    #[serde(default = "default_render_settle_ms")]
    pub render_settle_ms: u64,

    /// Navigation timeout for the headless browser, in milliseconds.
    #[serde(default = "default_render_timeout_ms")]
    pub render_timeout_ms: u64,

    /// Maximum concurrent browser sessions.
    #[serde(default = "default_one")]
    pub render_pool_size: usize,

    /// Hits enriched concurrently per search. 1 keeps extraction sequential.
    #[serde(default = "default_one")]
    pub enrich_concurrency: usize,
}

/// Settings for the keyless fallback backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackConfig {
    #[serde(default = "default_fallback_endpoint")]
    pub endpoint: String,

    /// Region code sent as `kl` (default: `wt-wt`, no region).
    #[serde(default = "default_region")]
    pub region: String,

    /// Time limit sent as `df` (default: `y`, past year).
    #[serde(default = "default_time_limit")]
    pub time_limit: String,

    /// Sanitized queries are cut to this many characters.
    #[serde(default = "default_max_query_chars")]
    pub max_query_chars: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            endpoint: default_fallback_endpoint(),
            region: default_region(),
            time_limit: default_time_limit(),
            max_query_chars: default_max_query_chars(),
        }
    }
}

fn default_priority() -> Vec<String> {
    vec!["google".into(), "brave".into(), "duckduckgo".into()]
}

fn default_fallback_endpoint() -> String {
    "https://html.duckduckgo.com/html/".into()
}

fn default_region() -> String {
    "wt-wt".into()
}

fn default_time_limit() -> String {
    "y".into()
}

fn default_max_query_chars() -> usize {
    5000
}

fn default_cache_capacity() -> usize {
    100
}

fn default_max_content_length() -> usize {
    10_000
}

fn default_provider_timeout_ms() -> u64 {
    10_000
}

fn default_fetch_timeout_ms() -> u64 {
    5_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_max_retries() -> u32 {
    2
}

fn default_backoff_ms() -> u64 {
    1_000
}

fn default_min_content_chars() -> usize {
    200
}

fn default_render_settle_ms() -> u64 {
    5_000
}

fn default_render_timeout_ms() -> u64 {
    30_000
}

fn default_one() -> usize {
    1
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            google_cx: None,
            brave_api_key: None,
            providers: Vec::new(),
            priority: default_priority(),
            fallback: FallbackConfig::default(),
            cache_capacity: default_cache_capacity(),
            max_content_length: default_max_content_length(),
            provider_timeout_ms: default_provider_timeout_ms(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            max_bytes: default_max_bytes(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            min_content_chars: default_min_content_chars(),
            render_enabled: true,
            render_settle_ms: default_render_settle_ms(),
            render_timeout_ms: default_render_timeout_ms(),
            render_pool_size: default_one(),
            enrich_concurrency: default_one(),
        }
    }
}

impl AppConfig {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn render_settle(&self) -> Duration {
        Duration::from_millis(self.render_settle_ms)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SIFT_`
    /// 2. TOML file from `SIFT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SIFT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SIFT_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Providers to build adapters for.
    ///
    /// The explicit `providers` list wins when non-empty. Otherwise presets
    /// are derived from the configured credentials: Google (key and cx),
    /// Brave (key), and the keyless DuckDuckGo Instant Answer API.
    pub fn resolved_providers(&self) -> Vec<ProviderConfig> {
        if !self.providers.is_empty() {
            return self.providers.clone();
        }

        let mut providers = Vec::new();
        if let (Some(key), Some(cx)) = (&self.google_api_key, &self.google_cx) {
            providers.push(ProviderConfig::google(key.clone(), cx.clone()));
        }
        if let Some(key) = &self.brave_api_key {
            providers.push(ProviderConfig::brave(key.clone()));
        }
        providers.push(ProviderConfig::duckduckgo_instant());
        providers
    }
}
