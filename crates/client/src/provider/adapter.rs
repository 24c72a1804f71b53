//! Quota-bearing JSON search backend driven by a `ProviderConfig`.
//!
//! ### Bookkeeping
//!
//! - `used` counts every request that was actually dispatched, successful or
//!   not, and never resets.
//! - The quota check, the interval wait, and the request itself all happen
//!   under one lock, so concurrent callers cannot overshoot the quota or
//!   undercut the interval.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header;
use serde_json::Value;
use sift_core::{ProviderConfig, SearchResult};
use tokio::sync::Mutex;

use super::{ProviderError, SearchProvider, response};
use crate::fetch::random_user_agent;

/// Mutable per-provider state.
#[derive(Debug, Default)]
struct ProviderState {
    used: u64,
    last_request: Option<Instant>,
}

/// Point-in-time view of a provider's quota consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderUsage {
    pub used: u64,
    pub quota: Option<u64>,
    pub last_request: Option<Instant>,
}

impl ProviderUsage {
    /// Requests left before the quota is spent; `None` when unbounded.
    pub fn remaining(&self) -> Option<u64> {
        self.quota.map(|q| q.saturating_sub(self.used))
    }
}

/// Adapter for one configured search backend.
#[derive(Debug)]
pub struct ApiProvider {
    http: reqwest::Client,
    config: ProviderConfig,
    state: Mutex<ProviderState>,
}

impl ApiProvider {
    /// Build an adapter with its own HTTP client.
    pub fn new(config: ProviderConfig, timeout: Duration) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().timeout(timeout).use_rustls_tls().build()?;
        Ok(Self::with_client(http, config))
    }

    /// Build an adapter around an existing HTTP client.
    pub fn with_client(http: reqwest::Client, config: ProviderConfig) -> Self {
        Self { http, config, state: Mutex::new(ProviderState::default()) }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub async fn usage(&self) -> ProviderUsage {
        let state = self.state.lock().await;
        ProviderUsage { used: state.used, quota: self.config.quota, last_request: state.last_request }
    }

    fn min_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.config.min_interval_secs).unwrap_or(Duration::ZERO)
    }

    /// Run one search, surfacing every failure.
    ///
    /// A zero count returns immediately without touching the quota.
    pub async fn try_search(&self, query: &str, num_results: usize) -> Result<Vec<SearchResult>, ProviderError> {
        let count = self.config.clamp_count(num_results);
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut state = self.state.lock().await;

        if let Some(quota) = self.config.quota
            && state.used >= quota
        {
            return Err(ProviderError::QuotaExhausted { used: state.used, quota });
        }

        if let Some(last) = state.last_request {
            let floor = self.min_interval();
            let elapsed = last.elapsed();
            if elapsed < floor {
                tokio::time::sleep(floor - elapsed).await;
            }
        }

        let request = self.build_request(query, count);

        state.used += 1;
        state.last_request = Some(Instant::now());

        let used = state.used;
        tracing::debug!(provider = %self.config.name, used, count, "dispatching provider request");

        let response = request.send().await?;
        let status = response.status();

        if let Some(err) = ProviderError::from_status(status) {
            return Err(err);
        }

        let bytes = response.bytes().await?;
        drop(state);

        let body: Value = serde_json::from_slice(&bytes).map_err(|e| ProviderError::Parse(e.to_string()))?;
        let items = response::results_at(&body, &self.config.results_field)?;
        let hits = response::map_hits(items, &self.config.fields, count);

        let (raw, kept) = (items.len(), hits.len());
        tracing::debug!(provider = %self.config.name, raw, kept, "provider response mapped");

        Ok(hits)
    }

    fn build_request(&self, query: &str, count: usize) -> reqwest::RequestBuilder {
        let config = &self.config;

        let mut params: Vec<(&str, String)> =
            config.fixed_params.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
        params.push((config.query_param.as_str(), query.to_string()));

        if let Some(count_param) = config.count_param.as_deref().filter(|p| !p.is_empty()) {
            params.push((count_param, count.to_string()));
        }

        let mut request = self
            .http
            .get(&config.endpoint)
            .header(header::USER_AGENT, random_user_agent())
            .header(header::ACCEPT, "application/json");

        if let Some(credential) = &config.credential {
            match (&config.credential_header, config.credential_param.as_deref()) {
                (Some(name), _) => request = request.header(name.as_str(), credential.as_str()),
                (None, Some(param)) if !param.is_empty() => params.push((param, credential.clone())),
                _ => {}
            }
        }

        request.query(&params)
    }
}

#[async_trait]
impl SearchProvider for ApiProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn has_quota(&self) -> bool {
        match self.config.quota {
            Some(quota) => self.state.lock().await.used < quota,
            None => true,
        }
    }

    async fn search(&self, query: &str, num_results: usize) -> Vec<SearchResult> {
        match self.try_search(query, num_results).await {
            Ok(hits) => hits,
            Err(err @ ProviderError::QuotaExhausted { .. }) => {
                tracing::debug!(provider = %self.config.name, error = %err, "provider skipped");
                Vec::new()
            }
            Err(err) => {
                tracing::warn!(provider = %self.config.name, error = %err, "provider search failed");
                Vec::new()
            }
        }
    }
}
