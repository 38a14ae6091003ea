use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use url::Url;
use wiremock::{
    matchers::{method, path, query_param, query_param_is_missing},
    Mock, MockServer, ResponseTemplate,
};

use crate::{
    error::ErrorVerbosity,
    google_books::{BooksRelay, GoogleBooksConfig},
    server::app,
    state::ApiState,
};

const API_KEY: &str = "test-key";

fn app_for(upstream: &MockServer, verbosity: ErrorVerbosity) -> Router {
    let config = GoogleBooksConfig::new(
        API_KEY.to_string(),
        Url::parse(&format!("{}/books/v1/volumes", upstream.uri())).unwrap(),
        Duration::from_secs(2),
    );
    let relay = BooksRelay::new(config).unwrap();

    app(ApiState::new(verbosity, relay), false)
}

async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn index_returns_banner() {
    let upstream = MockServer::start().await;

    let response = get(app_for(&upstream, ErrorVerbosity::Full), "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"version": "1.0", "message": "Google Books API"})
    );
}

#[tokio::test]
async fn search_relays_upstream_body() {
    let upstream = MockServer::start().await;
    let volumes = json!({
        "kind": "books#volumes",
        "totalItems": 1,
        "items": [{"id": "zyTCAlFPjgYC", "volumeInfo": {"title": "The Google story"}}],
    });

    Mock::given(method("GET"))
        .and(path("/books/v1/volumes"))
        .and(query_param("q", "google story"))
        .and(query_param("printType", "all"))
        .and(query_param("orderBy", "relevance"))
        .and(query_param("key", API_KEY))
        .and(query_param_is_missing("startIndex"))
        .and(query_param_is_missing("maxResults"))
        .and(query_param_is_missing("download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&volumes))
        .expect(1)
        .mount(&upstream)
        .await;

    let response = get(
        app_for(&upstream, ErrorVerbosity::Full),
        "/api/v1/books/?q=google%20story",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, volumes);
}

#[tokio::test]
async fn search_forwards_optional_parameters() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/books/v1/volumes"))
        .and(query_param("q", "dune"))
        .and(query_param("filter", "free-ebooks"))
        .and(query_param("printType", "books"))
        .and(query_param("orderBy", "newest"))
        .and(query_param("startIndex", "20"))
        .and(query_param("maxResults", "5"))
        .and(query_param("download", "epub"))
        .and(query_param("key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"kind": "books#volumes"})))
        .expect(1)
        .mount(&upstream)
        .await;

    let response = get(
        app_for(&upstream, ErrorVerbosity::Full),
        "/api/v1/books?q=dune&filter=free-ebooks&print_type=books&order_by=newest&start_index=20&count_per_page=5&download_format=true",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn search_drops_unrecognized_values() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/books/v1/volumes"))
        .and(query_param("q", "dune"))
        .and(query_param_is_missing("filter"))
        .and(query_param_is_missing("printType"))
        .and(query_param_is_missing("orderBy"))
        .and(query_param("key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"kind": "books#volumes"})))
        .expect(1)
        .mount(&upstream)
        .await;

    let response = get(
        app_for(&upstream, ErrorVerbosity::Full),
        "/api/v1/books/?q=dune&filter=cheap&print_type=comics&order_by=oldest",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn search_maps_upstream_error_to_detail() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "Invalid Value", "errors": []}
        })))
        .mount(&upstream)
        .await;

    let response = get(
        app_for(&upstream, ErrorVerbosity::Full),
        "/api/v1/books/?q=dune",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"detail": "Invalid Value"}));
}

#[tokio::test]
async fn search_without_query_is_rejected_locally() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let response = get(app_for(&upstream, ErrorVerbosity::Type), "/api/v1/books/").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error_type"], "Query");
}

#[tokio::test]
async fn search_with_empty_query_fails_validation() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let response = get(app_for(&upstream, ErrorVerbosity::Type), "/api/v1/books/?q=").await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error_type"], "Validation");

    let response = get(
        app_for(&upstream, ErrorVerbosity::Type),
        "/api/v1/books/?q=dune&count_per_page=0",
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_book_calls_resource_url_with_key_only() {
    let upstream = MockServer::start().await;
    let volume = json!({"kind": "books#volume", "id": "abc123"});

    Mock::given(method("GET"))
        .and(path("/books/v1/volumes/abc123"))
        .and(query_param("key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(&volume))
        .expect(1)
        .mount(&upstream)
        .await;

    let response = get(
        app_for(&upstream, ErrorVerbosity::Full),
        "/api/v1/book/abc123",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, volume);

    let requests = upstream.received_requests().await.unwrap();

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("key=test-key"));
}

#[tokio::test]
async fn get_book_maps_upstream_error_to_detail() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/books/v1/volumes/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "The volume ID could not be found."}
        })))
        .mount(&upstream)
        .await;

    let response = get(
        app_for(&upstream, ErrorVerbosity::None),
        "/api/v1/book/missing",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"detail": "The volume ID could not be found."})
    );
}

#[tokio::test]
async fn invalid_upstream_body_is_bad_gateway() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&upstream)
        .await;

    let response = get(
        app_for(&upstream, ErrorVerbosity::Message),
        "/api/v1/book/abc123",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        body_json(response).await,
        json!({"message": "The upstream service returned an invalid response"})
    );
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = GoogleBooksConfig::new(
        API_KEY.to_string(),
        Url::parse(&format!("http://{addr}/books/v1/volumes")).unwrap(),
        Duration::from_secs(2),
    );
    let state = ApiState::new(ErrorVerbosity::Type, BooksRelay::new(config).unwrap());

    let response = get(app(state, false), "/api/v1/book/abc123").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["error"]["gateway_error_type"], "Transport");
}

#[tokio::test]
async fn gateway_errors_never_expose_the_key() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = GoogleBooksConfig::new(
        API_KEY.to_string(),
        Url::parse(&format!("http://{addr}/books/v1/volumes")).unwrap(),
        Duration::from_secs(2),
    );
    let state = ApiState::new(ErrorVerbosity::Full, BooksRelay::new(config).unwrap());

    for uri in ["/api/v1/books/?q=dune", "/api/v1/book/abc123"] {
        let response = get(app(state.clone(), false), uri).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = body_json(response).await;

        assert!(body["error"]["gateway_error_reason"].is_string());
        assert!(!body.to_string().contains(API_KEY));
    }
}

#[tokio::test]
async fn slow_upstream_timeout_never_exposes_the_key() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&upstream)
        .await;

    let response = get(
        app_for(&upstream, ErrorVerbosity::Full),
        "/api/v1/book/abc123",
    )
    .await;

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert!(!body_json(response).await.to_string().contains(API_KEY));
}

#[tokio::test]
async fn dot_segment_book_id_never_reaches_upstream() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"kind": "books#volumes"})))
        .expect(0)
        .mount(&upstream)
        .await;

    for uri in ["/api/v1/book/%2E%2E", "/api/v1/book/%2E"] {
        let response = get(app_for(&upstream, ErrorVerbosity::Type), uri).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error_type"], "Path");
    }
}

#[tokio::test]
async fn search_accepts_epub_download_format() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/books/v1/volumes"))
        .and(query_param("q", "dune"))
        .and(query_param("download", "epub"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"kind": "books#volumes"})))
        .expect(1)
        .mount(&upstream)
        .await;

    Mock::given(method("GET"))
        .and(path("/books/v1/volumes"))
        .and(query_param("q", "plain"))
        .and(query_param_is_missing("download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"kind": "books#volumes"})))
        .expect(1)
        .mount(&upstream)
        .await;

    let response = get(
        app_for(&upstream, ErrorVerbosity::Full),
        "/api/v1/books/?q=dune&download_format=epub",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let response = get(
        app_for(&upstream, ErrorVerbosity::Full),
        "/api/v1/books/?q=plain&download_format=false",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let response = get(
        app_for(&upstream, ErrorVerbosity::Type),
        "/api/v1/books/?q=dune&download_format=pdf",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let upstream = MockServer::start().await;

    let response = get(app_for(&upstream, ErrorVerbosity::Type), "/api/v2/books").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error_type"], "NotFound");
}

#[tokio::test]
async fn wrong_method_is_mapped() {
    let upstream = MockServer::start().await;

    let response = app_for(&upstream, ErrorVerbosity::Type)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/book/abc123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_json(response).await["error_type"], "MethodNotAllowed");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let upstream = MockServer::start().await;

    let response = get(app_for(&upstream, ErrorVerbosity::Full), "/openapi.json").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["info"]["title"], "Google Books API");
}

#[tokio::test]
async fn traced_app_still_relays_body() {
    let upstream = MockServer::start().await;
    let config = GoogleBooksConfig::new(
        API_KEY.to_string(),
        Url::parse(&upstream.uri()).unwrap(),
        Duration::from_secs(2),
    );
    let state = ApiState::new(ErrorVerbosity::Full, BooksRelay::new(config).unwrap());

    let response = get(app(state, true), "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Google Books API");
}
