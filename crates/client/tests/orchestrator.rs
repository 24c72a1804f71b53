//! End-to-end orchestration against mock providers and pages.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use sift_client::content::{ContentExtractor, ExtractPolicy, PageExtractor};
use sift_client::fetch::{FetchClient, FetchConfig};
use sift_client::provider::{ApiProvider, FallbackProvider, SearchProvider};
use sift_client::search::{SearchOrchestrator, SearchSettings};
use sift_core::{FallbackConfig, ProviderConfig};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct NoContent;

#[async_trait]
impl PageExtractor for NoContent {
    async fn extract_content(&self, _url: &str) -> String {
        String::new()
    }
}

fn api(server: &MockServer, name: &str, quota: Option<u64>) -> Arc<dyn SearchProvider> {
    let mut config = ProviderConfig::new(name, format!("{}/{name}", server.uri()), "items");
    config.quota = quota;
    Arc::new(ApiProvider::new(config, Duration::from_secs(5)).unwrap())
}

fn fallback(server: &MockServer) -> Arc<dyn SearchProvider> {
    let config = FallbackConfig { endpoint: format!("{}/html/", server.uri()), ..Default::default() };
    Arc::new(FallbackProvider::new(config, Duration::from_secs(5)).unwrap())
}

fn items(prefix: &str, count: usize) -> serde_json::Value {
    let items: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "link": format!("https://{prefix}{i}.example"),
                "title": format!("{prefix} {i}"),
                "snippet": "s",
            })
        })
        .collect();
    json!({ "items": items })
}

fn orchestrator(
    providers: Vec<Arc<dyn SearchProvider>>, priority: &[&str], fallback: Arc<dyn SearchProvider>,
) -> SearchOrchestrator {
    SearchOrchestrator::new(
        providers,
        priority.iter().map(|s| s.to_string()).collect(),
        fallback,
        Arc::new(NoContent),
        SearchSettings::default(),
    )
}

#[tokio::test]
async fn test_exhausted_provider_is_never_called_again() {
    let server = MockServer::start().await;

    Mock::given(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items("a", 3)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items("b", 3)))
        .expect(2)
        .mount(&server)
        .await;

    let search = orchestrator(
        vec![api(&server, "a", Some(1)), api(&server, "b", None)],
        &["a", "b"],
        fallback(&server),
    );

    let first = search.search("x", 5).await;
    assert!(first.iter().all(|r| r.title.starts_with("a ")));

    let second = search.search("y", 5).await;
    assert!(second.iter().all(|r| r.title.starts_with("b ")));

    let third = search.search("z", 5).await;
    assert!(third.iter().all(|r| r.title.starts_with("b ")));
}

#[tokio::test]
async fn test_erroring_provider_falls_through() {
    let server = MockServer::start().await;

    Mock::given(path("/a")).respond_with(ResponseTemplate::new(401)).mount(&server).await;
    Mock::given(path("/b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items("b", 2)))
        .mount(&server)
        .await;

    let search = orchestrator(vec![api(&server, "a", None), api(&server, "b", None)], &["a", "b"], fallback(&server));

    let results = search.search("x", 5).await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "b 0");
}

#[tokio::test]
async fn test_all_empty_uses_fallback() {
    let server = MockServer::start().await;

    Mock::given(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<div class="result results_links results_links_deep web-result">
                <a class="result__a" href="https://fallback.example/">Fallback hit</a>
            </div>"#,
            "text/html",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let search = orchestrator(vec![api(&server, "a", None)], &["a"], fallback(&server));

    let results = search.search("x", 5).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, "https://fallback.example/");
    assert_eq!(results[0].snippet, "No snippet");
}

#[tokio::test]
async fn test_no_providers_and_failing_fallback_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(500)).mount(&server).await;

    let search = orchestrator(Vec::new(), &["google", "brave", "duckduckgo"], fallback(&server));

    assert!(search.search("x", 5).await.is_empty());
    assert_eq!(search.cache_len().await, 1);
}

#[tokio::test]
async fn test_cached_results_survive_provider_changes() {
    let server = MockServer::start().await;

    Mock::given(path("/a"))
        .and(query_param("q", "stable"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items("first", 2)))
        .mount(&server)
        .await;

    let search = orchestrator(vec![api(&server, "a", None)], &["a"], fallback(&server));
    let first = search.search("stable", 5).await;

    server.reset().await;
    Mock::given(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items("second", 2)))
        .expect(1)
        .mount(&server)
        .await;

    let second = search.search("stable", 5).await;
    assert_eq!(serde_json::to_vec(&first).unwrap(), serde_json::to_vec(&second).unwrap());

    let other_case = search.search("Stable", 5).await;
    assert_eq!(other_case[0].title, "second 0");
    assert_eq!(search.cache_len().await, 2);
}

#[tokio::test]
async fn test_cache_evicts_oldest_query() {
    let server = MockServer::start().await;
    Mock::given(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items("a", 1)))
        .expect(4)
        .mount(&server)
        .await;

    let search = SearchOrchestrator::new(
        vec![api(&server, "a", None)],
        vec!["a".into()],
        fallback(&server),
        Arc::new(NoContent),
        SearchSettings { cache_capacity: 2, ..Default::default() },
    );

    search.search("one", 1).await;
    search.search("two", 1).await;
    search.search("three", 1).await;
    assert_eq!(search.cache_len().await, 2);

    // "one" was evicted and must be fetched again; "three" is still cached.
    search.search("three", 1).await;
    search.search("one", 1).await;
}

#[tokio::test]
async fn test_hits_are_enriched_from_pages() {
    let server = MockServer::start().await;

    let body = "Detailed article text that is long enough to stay on the fast path. ".repeat(5);
    let page = format!("<html><body><article>{body}</article></body></html>");
    Mock::given(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"link": format!("{}/page", server.uri()), "title": "Page"},
                {"link": format!("{}/missing", server.uri()), "title": "Missing"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page, "text/html"))
        .mount(&server)
        .await;
    Mock::given(path("/missing")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

    let fetch = FetchClient::new(FetchConfig::default()).unwrap();
    let policy = ExtractPolicy { backoff_unit: Duration::from_millis(5), ..Default::default() };
    let extractor = Arc::new(ContentExtractor::new(fetch, policy));

    let search = SearchOrchestrator::new(
        vec![api(&server, "a", None)],
        vec!["a".into()],
        fallback(&server),
        extractor,
        SearchSettings { max_content_length: 40, ..Default::default() },
    );

    let results = search.search("x", 5).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].content, &body.trim()[..40]);
    assert_eq!(results[1].content, "");
    assert_eq!(search.extract_content(&format!("{}/page", server.uri())).await, body.trim());
}
