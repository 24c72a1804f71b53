//! Per-provider configuration and the built-in provider presets.
//!
//! A provider is described entirely by data: where to send the query, which
//! parameters to attach, where the hit array lives in the JSON response, and
//! which keys carry each hit's url/title/snippet.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Static description of one quota-bearing search backend.
///
/// Runtime bookkeeping (requests used, last request instant) is owned by the
/// adapter built from this config, not stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique provider name, referenced by the priority list.
    pub name: String,

    /// API key or token, if the backend needs one.
    #[serde(default)]
    pub credential: Option<String>,

    /// Query parameter that carries the credential (default: `key`).
    /// Ignored when `credential_header` is set.
    #[serde(default = "default_credential_param")]
    pub credential_param: Option<String>,

    /// Header that carries the credential instead of a query parameter.
    #[serde(default)]
    pub credential_header: Option<String>,

    /// Absolute http(s) endpoint.
    pub endpoint: String,

    /// Parameters sent with every request.
    #[serde(default)]
    pub fixed_params: BTreeMap<String, String>,

    /// Query parameter that carries the search text (default: `q`).
    #[serde(default = "default_query_param")]
    pub query_param: String,

    /// Query parameter that carries the requested result count (default: `num`).
    /// An empty name sends no count.
    #[serde(default = "default_count_param")]
    pub count_param: Option<String>,

    /// Per-request result ceiling documented by the backend.
    #[serde(default)]
    pub max_per_request: Option<u32>,

    /// Lifetime request cap. `None` means unbounded.
    #[serde(default)]
    pub quota: Option<u64>,

    /// Dotted path to the hit array in the JSON response (e.g. `web.results`).
    pub results_field: String,

    /// Minimum seconds between two requests to this backend.
    #[serde(default)]
    pub min_interval_secs: f64,

    /// Candidate keys for each canonical hit field.
    #[serde(default)]
    pub fields: HitFields,
}

/// Candidate JSON keys for mapping a provider hit onto `SearchResult`.
///
/// The first key present with a non-empty string value wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitFields {
    #[serde(default = "default_url_fields")]
    pub url: Vec<String>,
    #[serde(default = "default_title_fields")]
    pub title: Vec<String>,
    #[serde(default = "default_snippet_fields")]
    pub snippet: Vec<String>,
}

impl Default for HitFields {
    fn default() -> Self {
        Self { url: default_url_fields(), title: default_title_fields(), snippet: default_snippet_fields() }
    }
}

impl HitFields {
    fn single(url: &str, title: &str, snippet: &str) -> Self {
        Self { url: vec![url.into()], title: vec![title.into()], snippet: vec![snippet.into()] }
    }
}

fn default_credential_param() -> Option<String> {
    Some("key".into())
}

fn default_query_param() -> String {
    "q".into()
}

fn default_count_param() -> Option<String> {
    Some("num".into())
}

fn default_url_fields() -> Vec<String> {
    vec!["link".into(), "url".into()]
}

fn default_title_fields() -> Vec<String> {
    vec!["title".into()]
}

fn default_snippet_fields() -> Vec<String> {
    vec!["snippet".into(), "description".into()]
}

impl ProviderConfig {
    /// Minimal config with defaults for every optional knob.
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, results_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            credential: None,
            credential_param: default_credential_param(),
            credential_header: None,
            endpoint: endpoint.into(),
            fixed_params: BTreeMap::new(),
            query_param: default_query_param(),
            count_param: default_count_param(),
            max_per_request: None,
            quota: None,
            results_field: results_field.into(),
            min_interval_secs: 0.0,
            fields: HitFields::default(),
        }
    }

    /// Google Custom Search JSON API: 100 requests, 10 results per request.
    pub fn google(api_key: impl Into<String>, cx: impl Into<String>) -> Self {
        let mut config = Self::new("google", "https://www.googleapis.com/customsearch/v1", "items");
        config.credential = Some(api_key.into());
        config.fixed_params.insert("cx".into(), cx.into());
        config.max_per_request = Some(10);
        config.quota = Some(100);
        config.min_interval_secs = 1.0;
        config.fields = HitFields::single("link", "title", "snippet");
        config
    }

    /// Brave Web Search API: token in a header, hits under `web.results`.
    pub fn brave(api_key: impl Into<String>) -> Self {
        let mut config = Self::new("brave", "https://api.search.brave.com/res/v1/web/search", "web.results");
        config.credential = Some(api_key.into());
        config.credential_param = None;
        config.credential_header = Some("X-Subscription-Token".into());
        config.count_param = Some("count".into());
        config.max_per_request = Some(20);
        config.quota = Some(2000);
        config.min_interval_secs = 1.0;
        config.fields = HitFields::single("url", "title", "description");
        config
    }

    /// DuckDuckGo Instant Answer API: keyless, unbounded, no count parameter.
    pub fn duckduckgo_instant() -> Self {
        let mut config = Self::new("duckduckgo", "https://api.duckduckgo.com/", "RelatedTopics");
        config.credential_param = None;
        config.count_param = None;
        config.fixed_params.insert("format".into(), "json".into());
        config.fields = HitFields::single("FirstURL", "Text", "Text");
        config
    }

    /// Clamp a caller's requested count to this backend's per-request ceiling.
    pub fn clamp_count(&self, requested: usize) -> usize {
        match self.max_per_request {
            Some(max) => requested.min(max as usize),
            None => requested,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.quota.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_preset() {
        let config = ProviderConfig::google("k", "cx-id");
        assert_eq!(config.name, "google");
        assert_eq!(config.quota, Some(100));
        assert_eq!(config.results_field, "items");
        assert_eq!(config.fixed_params.get("cx").map(String::as_str), Some("cx-id"));
        assert_eq!(config.credential_param.as_deref(), Some("key"));
        assert_eq!(config.clamp_count(25), 10);
        assert_eq!(config.clamp_count(3), 3);
    }

    #[test]
    fn test_brave_preset_uses_header() {
        let config = ProviderConfig::brave("token");
        assert!(config.credential_param.is_none());
        assert_eq!(config.credential_header.as_deref(), Some("X-Subscription-Token"));
        assert_eq!(config.results_field, "web.results");
        assert_eq!(config.fields.snippet, vec!["description".to_string()]);
    }

    #[test]
    fn test_duckduckgo_instant_is_unbounded() {
        let config = ProviderConfig::duckduckgo_instant();
        assert!(config.is_unbounded());
        assert!(config.credential.is_none());
        assert!(config.count_param.is_none());
        assert_eq!(config.min_interval_secs, 0.0);
        assert_eq!(config.clamp_count(50), 50);
    }

    #[test]
    fn test_deserialize_minimal_applies_defaults() {
        let json = r#"{"name":"custom","endpoint":"https://search.example/api","results_field":"hits"}"#;
        let config: ProviderConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.query_param, "q");
        assert_eq!(config.count_param.as_deref(), Some("num"));
        assert_eq!(config.credential_param.as_deref(), Some("key"));
        assert!(config.quota.is_none());
        assert_eq!(config.fields, HitFields::default());
    }
}
