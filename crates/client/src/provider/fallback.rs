//! Credential-free DuckDuckGo HTML backend used as the provider of last resort.
//!
//! Uses the HTML-only endpoint, which needs no JavaScript. Queries are
//! sanitized first since this backend is sensitive to punctuation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use scraper::{Html, Selector};
use sift_core::{FALLBACK_NAME, FallbackConfig, SearchResult, result::truncate_chars};
use url::Url;

use super::{ProviderError, SearchProvider};
use crate::fetch::{random_user_agent, url::is_absolute_http};

/// Zero-configuration search backend with no quota.
#[derive(Debug, Clone)]
pub struct FallbackProvider {
    http: reqwest::Client,
    config: FallbackConfig,
}

impl FallbackProvider {
    pub fn new(config: FallbackConfig, timeout: Duration) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().timeout(timeout).use_rustls_tls().build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    /// Run one search, surfacing every failure.
    ///
    /// A query that sanitizes to nothing returns an empty list without a request.
    pub async fn try_search(&self, query: &str, num_results: usize) -> Result<Vec<SearchResult>, ProviderError> {
        let query = sanitize_query(query, self.config.max_query_chars);
        if query.is_empty() || num_results == 0 {
            return Ok(Vec::new());
        }

        tracing::debug!(query = %query, "fallback search");

        let form = [
            ("q", query.as_str()),
            ("kl", self.config.region.as_str()),
            ("df", self.config.time_limit.as_str()),
        ];

        let response = self
            .http
            .post(&self.config.endpoint)
            .form(&form)
            .header(header::USER_AGENT, random_user_agent())
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;

        if let Some(err) = ProviderError::from_status(response.status()) {
            return Err(err);
        }

        let html = response.text().await?;
        parse_results(&html, num_results)
    }
}

#[async_trait]
impl SearchProvider for FallbackProvider {
    fn name(&self) -> &str {
        FALLBACK_NAME
    }

    async fn search(&self, query: &str, num_results: usize) -> Vec<SearchResult> {
        self.try_search(query, num_results).await.unwrap_or_else(|err| {
            tracing::warn!(provider = FALLBACK_NAME, error = %err, "fallback search failed");
            Vec::new()
        })
    }
}

/// Strip everything but word characters and whitespace, collapse whitespace,
/// and cap the length.
pub fn sanitize_query(query: &str, max_chars: usize) -> String {
    let kept: String = query.chars().filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace()).collect();
    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, max_chars).trim_end().to_string()
}

/// Parse the HTML result page, skipping ads.
pub fn parse_results(html: &str, max_results: usize) -> Result<Vec<SearchResult>, ProviderError> {
    let document = Html::parse_document(html);

    let result_sel =
        Selector::parse(".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)")
            .map_err(|e| ProviderError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel =
        Selector::parse(".result__a").map_err(|e| ProviderError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".result__snippet")
        .map_err(|e| ProviderError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let Some(url) = title_el.value().attr("href").and_then(unwrap_redirect) else {
            continue;
        };

        let title = collapse(title_el.text());
        let snippet = element.select(&snippet_sel).next().map(|el| collapse(el.text()));

        results.push(SearchResult::new(Some(title), url, snippet));

        if results.len() >= max_results {
            break;
        }
    }

    tracing::debug!(count = results.len(), "fallback results parsed");
    Ok(results)
}

/// Resolve `//duckduckgo.com/l/?uddg=<target>` wrappers to the target URL.
fn unwrap_redirect(href: &str) -> Option<String> {
    let full = if href.starts_with("//") { format!("https:{href}") } else { href.to_string() };
    let parsed = Url::parse(&full).ok()?;

    let is_wrapper =
        parsed.host_str().is_some_and(|h| h.ends_with("duckduckgo.com")) && parsed.path().starts_with("/l/");
    let target = if is_wrapper {
        parsed.query_pairs().find(|(key, _)| key == "uddg").map(|(_, value)| value.into_owned())?
    } else {
        full
    };

    is_absolute_http(&target).then_some(target)
}

fn collapse<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}
