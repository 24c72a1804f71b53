//! Search orchestration: provider fallback chain, enrichment, caching.
//!
//! ### Flow
//! 1. Cached results for the exact query string are returned as stored.
//! 2. Providers are tried in the configured priority order; exhausted ones
//!    are skipped without a call. The first non-empty list wins and lists
//!    are never merged.
//! 3. If nothing came back, the fallback provider runs (unless the priority
//!    list already ran it).
//! 4. Each hit is enriched with extracted page text, truncated to
//!    `max_content_length`, in the original order.
//! 5. The enriched list is cached under the raw query.
//!
//! Cache keys are not normalized: `Rust` and `rust ` are separate entries,
//! and entries never expire on their own. Use [`SearchOrchestrator::invalidate`]
//! or [`SearchOrchestrator::clear_cache`] to force a refresh.

use std::sync::Arc;

use futures_util::{StreamExt, stream};
use sift_core::{AppConfig, Error, ResultCache, SearchResult};
use tokio::sync::Mutex;

use crate::content::{ContentExtractor, ExtractPolicy, PageExtractor};
use crate::fetch::{FetchClient, FetchConfig};
use crate::provider::{ApiProvider, FallbackProvider, SearchProvider};
use crate::render::Renderer;

/// Orchestrator knobs that are not owned by a component.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Maximum cached queries (default: 100).
    pub cache_capacity: usize,
    /// Characters of extracted text kept per hit (default: 10000).
    pub max_content_length: usize,
    /// Hits enriched at once (default: 1, sequential).
    pub enrich_concurrency: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { cache_capacity: 100, max_content_length: 10_000, enrich_concurrency: 1 }
    }
}

impl From<&AppConfig> for SearchSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            cache_capacity: config.cache_capacity,
            max_content_length: config.max_content_length,
            enrich_concurrency: config.enrich_concurrency,
        }
    }
}

/// Entry point for both inbound contracts: `search` and `extract_content`.
pub struct SearchOrchestrator {
    providers: Vec<Arc<dyn SearchProvider>>,
    priority: Vec<String>,
    fallback: Arc<dyn SearchProvider>,
    extractor: Arc<dyn PageExtractor>,
    cache: Mutex<ResultCache>,
    settings: SearchSettings,
}

impl std::fmt::Debug for SearchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOrchestrator")
            .field("providers", &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("priority", &self.priority)
            .field("fallback", &self.fallback.name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl SearchOrchestrator {
    pub fn new(
        providers: Vec<Arc<dyn SearchProvider>>, priority: Vec<String>, fallback: Arc<dyn SearchProvider>,
        extractor: Arc<dyn PageExtractor>, settings: SearchSettings,
    ) -> Self {
        for provider in &providers {
            if !priority.iter().any(|name| name == provider.name()) {
                tracing::debug!(provider = provider.name(), "provider is missing from the priority list");
            }
        }

        let cache = Mutex::new(ResultCache::new(settings.cache_capacity));
        Self { providers, priority, fallback, extractor, cache, settings }
    }

    /// Wire providers, fallback, fetch client, and renderer from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let timeout = config.provider_timeout();

        let providers = config
            .resolved_providers()
            .into_iter()
            .map(|provider| {
                ApiProvider::new(provider, timeout)
                    .map(|adapter| Arc::new(adapter) as Arc<dyn SearchProvider>)
                    .map_err(|e| Error::HttpError(format!("failed to build provider client: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let fallback = FallbackProvider::new(config.fallback.clone(), timeout)
            .map_err(|e| Error::HttpError(format!("failed to build fallback client: {e}")))?;

        let fetch = FetchClient::new(FetchConfig {
            max_bytes: config.max_bytes,
            timeout: config.fetch_timeout(),
            ..Default::default()
        })?;

        let mut extractor = ContentExtractor::new(fetch, ExtractPolicy::from_config(config));
        if let Some(renderer) = renderer_from_config(config) {
            extractor = extractor.with_renderer(renderer);
        }

        Ok(Self::new(
            providers,
            config.priority.clone(),
            Arc::new(fallback),
            Arc::new(extractor),
            SearchSettings::from(config),
        ))
    }

    /// Search, enrich, and cache. Never fails; the worst case is an empty list.
    pub async fn search(&self, query: &str, num_results: usize) -> Vec<SearchResult> {
        if num_results == 0 {
            return Vec::new();
        }

        if let Some(cached) = self.cache.lock().await.get(query) {
            tracing::debug!(query, count = cached.len(), "cache hit");
            return cached.clone();
        }

        let hits = self.raw_search(query, num_results).await;
        let enriched = self.enrich(hits).await;

        self.cache.lock().await.put(query, enriched.clone());

        enriched
    }

    /// Extracted text for one URL, or an empty string.
    pub async fn extract_content(&self, url: &str) -> String {
        self.extractor.extract_content(url).await
    }

    /// Drop one cached query. Returns true if it was cached.
    pub async fn invalidate(&self, query: &str) -> bool {
        self.cache.lock().await.invalidate(query)
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.lock().await.len()
    }

    async fn raw_search(&self, query: &str, num_results: usize) -> Vec<SearchResult> {
        let mut fallback_ran = false;

        for name in &self.priority {
            let provider = if name == self.fallback.name() {
                fallback_ran = true;
                &self.fallback
            } else if let Some(provider) = self.providers.iter().find(|p| p.name() == name) {
                provider
            } else {
                continue;
            };

            if !provider.has_quota().await {
                tracing::debug!(provider = %name, "provider quota exhausted, skipping");
                continue;
            }

            let hits = provider.search(query, num_results).await;
            if !hits.is_empty() {
                tracing::info!(provider = %name, count = hits.len(), "provider selected");
                return hits;
            }

            tracing::debug!(provider = %name, "provider returned no results");
        }

        if fallback_ran {
            return Vec::new();
        }

        tracing::info!(provider = self.fallback.name(), "all providers exhausted or empty, using fallback");
        self.fallback.search(query, num_results).await
    }

    async fn enrich(&self, hits: Vec<SearchResult>) -> Vec<SearchResult> {
        let extractor = &self.extractor;
        let max_chars = self.settings.max_content_length;

        stream::iter(hits)
            .map(|hit| async move {
                let content = extractor.extract_content(&hit.url).await;
                hit.with_content(&content, max_chars)
            })
            .buffered(self.settings.enrich_concurrency.max(1))
            .collect()
            .await
    }
}

#[cfg(feature = "render")]
fn renderer_from_config(config: &AppConfig) -> Option<Arc<dyn Renderer>> {
    use crate::render::{ChromiumLauncher, RenderPool};

    if !config.render_enabled {
        return None;
    }

    let pool = RenderPool::new(Arc::new(ChromiumLauncher::new()), config.render_pool_size);
    Some(Arc::new(pool))
}

#[cfg(not(feature = "render"))]
fn renderer_from_config(config: &AppConfig) -> Option<Arc<dyn Renderer>> {
    if config.render_enabled {
        tracing::debug!("built without the `render` feature; browser escalation is unavailable");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticProvider {
        name: &'static str,
        hits: Vec<SearchResult>,
        calls: AtomicUsize,
    }

    impl StaticProvider {
        fn new(name: &'static str, urls: &[&str]) -> Arc<Self> {
            let hits = urls.iter().map(|u| SearchResult::new(Some(name.to_string()), *u, None)).collect();
            Arc::new(Self { name, hits, calls: AtomicUsize::new(0) })
        }
    }

    fn dynp(provider: &Arc<StaticProvider>) -> Arc<dyn SearchProvider> {
        provider.clone()
    }

    #[async_trait]
    impl SearchProvider for StaticProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn search(&self, _query: &str, num_results: usize) -> Vec<SearchResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.hits.iter().take(num_results).cloned().collect()
        }
    }

    struct EchoExtractor;

    #[async_trait]
    impl PageExtractor for EchoExtractor {
        async fn extract_content(&self, url: &str) -> String {
            format!("text of {url}")
        }
    }

    fn orchestrator(
        providers: Vec<Arc<dyn SearchProvider>>, priority: &[&str], fallback: Arc<dyn SearchProvider>,
    ) -> SearchOrchestrator {
        SearchOrchestrator::new(
            providers,
            priority.iter().map(|s| s.to_string()).collect(),
            fallback,
            Arc::new(EchoExtractor),
            SearchSettings { max_content_length: 12, ..Default::default() },
        )
    }

    #[tokio::test]
    async fn test_first_non_empty_provider_wins() {
        let empty = StaticProvider::new("empty", &[]);
        let full = StaticProvider::new("full", &["https://a.com", "https://b.com"]);
        let never = StaticProvider::new("never", &["https://c.com"]);
        let fallback = StaticProvider::new("fallback", &["https://fb.com"]);

        let search = orchestrator(
            vec![dynp(&empty), dynp(&full), dynp(&never)],
            &["empty", "full", "never"],
            fallback.clone(),
        );
        let results = search.search("q", 5).await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.title == "full"));
        assert_eq!(empty.calls.load(Ordering::SeqCst), 1);
        assert_eq!(never.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_content_is_truncated_in_order() {
        let full = StaticProvider::new("full", &["https://a.com", "https://b.com"]);
        let search = orchestrator(vec![dynp(&full)], &["full"], StaticProvider::new("fallback", &[]));

        let results = search.search("q", 5).await;
        assert_eq!(results[0].content, "text of http");
        assert_eq!(results[0].url, "https://a.com");
        assert_eq!(results[1].url, "https://b.com");
    }

    #[tokio::test]
    async fn test_fallback_with_no_providers() {
        let fallback = StaticProvider::new("fallback", &["https://fb.com"]);
        let search = orchestrator(Vec::new(), &["google", "brave"], fallback.clone());

        let results = search.search("q", 5).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://fb.com");
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_in_priority_runs_once() {
        let empty = StaticProvider::new("empty", &[]);
        let fallback = StaticProvider::new("fallback", &[]);
        let search = orchestrator(vec![dynp(&empty)], &["fallback", "empty"], fallback.clone());

        assert!(search.search("q", 5).await.is_empty());
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_providers() {
        let full = StaticProvider::new("full", &["https://a.com"]);
        let search = orchestrator(vec![dynp(&full)], &["full"], StaticProvider::new("fallback", &[]));

        let first = search.search("q", 5).await;
        let second = search.search("q", 5).await;

        assert_eq!(first, second);
        assert_eq!(full.calls.load(Ordering::SeqCst), 1);
        assert_eq!(search.cache_len().await, 1);

        assert!(search.invalidate("q").await);
        search.search("q", 5).await;
        assert_eq!(full.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_results_short_circuits() {
        let full = StaticProvider::new("full", &["https://a.com"]);
        let search = orchestrator(vec![dynp(&full)], &["full"], StaticProvider::new("fallback", &[]));

        assert!(search.search("q", 0).await.is_empty());
        assert_eq!(full.calls.load(Ordering::SeqCst), 0);
        assert_eq!(search.cache_len().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_enrichment_keeps_order() {
        let urls: Vec<String> = (0..8).map(|i| format!("https://site{i}.com")).collect();
        let refs: Vec<&str> = urls.iter().map(String::as_str).collect();
        let full = StaticProvider::new("full", &refs);

        let search = SearchOrchestrator::new(
            vec![dynp(&full)],
            vec!["full".into()],
            StaticProvider::new("fallback", &[]),
            Arc::new(EchoExtractor),
            SearchSettings { enrich_concurrency: 4, ..Default::default() },
        );

        let results = search.search("q", 8).await;
        let got: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(got, refs);
        assert!(results.iter().all(|r| r.content == format!("text of {}", r.url)));
    }
}
