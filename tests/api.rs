mod helpers;

use std::time::Duration;

use article_digest::{api::routes::create_router, AppState};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use helpers::{pipeline, CountingExtractor, FakeFetcher, FakeGenerator, ARTICLE_HTML, VALID_SUMMARY};
use serde_json::Value;
use tower::ServiceExt;

fn app(fetcher: std::sync::Arc<FakeFetcher>, generator: std::sync::Arc<FakeGenerator>, timeout: Duration) -> Router {
    let pipeline = pipeline(fetcher, CountingExtractor::new(), generator, 10_000);
    create_router(AppState::new(pipeline, timeout))
}

async fn post_json(app: Router, body: &str) -> (StatusCode, Value) {
    post(app, Some("application/json"), body).await
}

async fn post(app: Router, content_type: Option<&str>, body: &str) -> (StatusCode, Value) {
    let mut request = Request::builder().method("POST").uri("/api/parse");
    if let Some(content_type) = content_type {
        request = request.header("content-type", content_type);
    }

    let response = app
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn returns_summary_object() {
    let app = app(
        FakeFetcher::html(ARTICLE_HTML),
        FakeGenerator::replying(VALID_SUMMARY),
        Duration::from_secs(5),
    );

    let (status, json) = post_json(app, r#"{"articleUrl":"https://news.example.com/rivers"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::from_str::<Value>(VALID_SUMMARY).unwrap());
}

#[tokio::test]
async fn missing_url_is_a_bad_request() {
    let fetcher = FakeFetcher::html(ARTICLE_HTML);
    let app = app(fetcher.clone(), FakeGenerator::replying(VALID_SUMMARY), Duration::from_secs(5));

    let (status, json) = post_json(app, "{}").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "articleUrl is required");
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn pipeline_failure_carries_message() {
    let generator = FakeGenerator::replying(VALID_SUMMARY);
    let app = app(FakeFetcher::status(404), generator.clone(), Duration::from_secs(5));

    let (status, json) = post_json(app, r#"{"articleUrl":"https://news.example.com/missing"}"#).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        json["error"],
        "Failed to summarize the article. Failed to fetch URL. Status: 404"
    );
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn schema_failure_is_unprocessable() {
    let app = app(
        FakeFetcher::html(ARTICLE_HTML),
        FakeGenerator::replying(r#"{"heading":"X"}"#),
        Duration::from_secs(5),
    );

    let (status, json) = post_json(app, r#"{"articleUrl":"https://news.example.com/rivers"}"#).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("descriptive_paragraph"));
}

#[tokio::test]
async fn slow_pipeline_times_out() {
    let app = app(
        FakeFetcher::html(ARTICLE_HTML),
        FakeGenerator::slow(VALID_SUMMARY, Duration::from_secs(5)),
        Duration::from_millis(50),
    );

    let (status, json) = post_json(app, r#"{"articleUrl":"https://news.example.com/rivers"}"#).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json["error"], "Request processing timed out");
}

#[tokio::test]
async fn fetch_timeout_is_a_gateway_timeout() {
    let generator = FakeGenerator::replying(VALID_SUMMARY);
    let app = app(FakeFetcher::timing_out(), generator.clone(), Duration::from_secs(5));

    let (status, json) = post_json(app, r#"{"articleUrl":"https://news.example.com/rivers"}"#).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(
        json["error"],
        "Failed to summarize the article. Fetching the URL timed out"
    );
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn unparseable_url_is_a_bad_request() {
    let fetcher = FakeFetcher::html(ARTICLE_HTML);
    let app = app(fetcher.clone(), FakeGenerator::replying(VALID_SUMMARY), Duration::from_secs(5));

    let (status, json) = post_json(app, r#"{"articleUrl":"not a url"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Invalid URL"));
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn non_http_scheme_is_a_bad_request() {
    let fetcher = FakeFetcher::html(ARTICLE_HTML);
    let app = app(fetcher.clone(), FakeGenerator::replying(VALID_SUMMARY), Duration::from_secs(5));

    let (status, json) = post_json(app, r#"{"articleUrl":"ftp://news.example.com/rivers"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("ftp"));
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn body_without_json_content_type_gets_json_error() {
    let fetcher = FakeFetcher::html(ARTICLE_HTML);
    let app = app(fetcher.clone(), FakeGenerator::replying(VALID_SUMMARY), Duration::from_secs(5));

    let (status, json) = post(app, None, r#"{"articleUrl":"https://news.example.com/rivers"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn malformed_json_gets_json_error() {
    for body in ["{not json", ""] {
        let fetcher = FakeFetcher::html(ARTICLE_HTML);
        let app = app(fetcher.clone(), FakeGenerator::replying(VALID_SUMMARY), Duration::from_secs(5));

        let (status, json) = post_json(app, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
        assert!(json["error"].is_string(), "body {body:?}");
        assert_eq!(fetcher.calls(), 0);
    }
}
