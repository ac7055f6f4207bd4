use super::*;
use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request};
use chrono::TimeZone;
use filament_core::{Material, Snapshot};
use filament_store::{KeyValueStore, MemoryStore, SNAPSHOT_KEY};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "s3cret";

fn catalog_entry(url: String, product: &str, material: Material) -> CatalogEntry {
    CatalogEntry {
        brand: "Test Brand".to_string(),
        material,
        product: product.to_string(),
        url,
        weight_kg: 1.0,
        abrasive: false,
    }
}

/// Two product pages, each expected to be fetched `fetches` times.
async fn product_server(fetches: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pla"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<script type="application/ld+json">
               {"@type":"Product","offers":{"price":"19.99","priceCurrency":"USD"}}
               </script>"#,
        ))
        .expect(fetches)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/petg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<meta property="og:price:amount" content="29.99">"#),
        )
        .expect(fetches)
        .mount(&server)
        .await;
    server
}

fn state_with(server: &MockServer, backend: Arc<dyn KeyValueStore>) -> AppState {
    AppState {
        fetcher: PageFetcher::new("filament-test/0.1", Some(5)).expect("fetcher"),
        catalog: Arc::new(vec![
            catalog_entry(format!("{}/pla", server.uri()), "PLA Basic", Material::Pla),
            catalog_entry(format!("{}/petg", server.uri()), "PETG HF", Material::Petg),
        ]),
        store: SnapshotStore::new(backend),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, headers, body.to_vec())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn old_snapshot() -> Snapshot {
    Snapshot {
        updated_at: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        rows: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Errors and health
// ---------------------------------------------------------------------------

#[test]
fn api_error_forbidden_maps_to_403() {
    let response = ApiError::new("req-1", "forbidden", "nope").into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[test]
fn api_error_internal_maps_to_500() {
    let response = ApiError::new("req-1", "internal_error", "boom").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_returns_ok_with_generated_request_id() {
    let server = product_server(0).await;
    let app = build_app(
        state_with(&server, Arc::new(MemoryStore::new())),
        RefreshAuth::new(None),
    );

    let (status, headers, body) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
    assert_eq!(json["data"]["status"], "ok");
    let header_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .expect("x-request-id header");
    assert_eq!(json["meta"]["request_id"].as_str(), Some(header_id));
}

#[tokio::test]
async fn incoming_request_id_is_propagated() {
    let server = product_server(0).await;
    let app = build_app(
        state_with(&server, Arc::new(MemoryStore::new())),
        RefreshAuth::new(None),
    );

    let request = Request::builder()
        .uri("/api/health")
        .header("x-request-id", "trace-abc")
        .body(Body::empty())
        .expect("request");
    let (_, headers, _) = send(&app, request).await;
    assert_eq!(
        headers.get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("trace-abc")
    );
}

// ---------------------------------------------------------------------------
// Read path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn prices_builds_on_miss_then_serves_stored_snapshot() {
    let server = product_server(1).await;
    let state = state_with(&server, Arc::new(MemoryStore::new()));
    let store = state.store.clone();
    let app = build_app(state, RefreshAuth::new(None));

    let (status, _, body) = send(&app, get("/api/prices")).await;
    assert_eq!(status, StatusCode::OK);
    let first: Snapshot = serde_json::from_slice(&body).expect("snapshot json");

    let products: Vec<&str> = first.rows.iter().map(|r| r.entry.product.as_str()).collect();
    assert_eq!(products, vec!["PLA Basic", "PETG HF"]);
    assert_eq!(first.rows[0].price, Some(19.99));
    assert_eq!(first.rows[1].price, Some(29.99));
    assert_eq!(store.get().await.expect("store read"), Some(first.clone()));

    // Served from the store: the mock expectations allow one fetch per page.
    let (status, _, body) = send(&app, get("/api/prices")).await;
    assert_eq!(status, StatusCode::OK);
    let second: Snapshot = serde_json::from_slice(&body).expect("snapshot json");
    assert_eq!(second, first);
}

#[tokio::test]
async fn prices_returns_existing_snapshot_without_scraping() {
    let server = product_server(0).await;
    let state = state_with(&server, Arc::new(MemoryStore::new()));
    state.store.put(&old_snapshot()).await.expect("seed");
    let app = build_app(state, RefreshAuth::new(None));

    let (status, _, body) = send(&app, get("/api/prices")).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
    assert_eq!(json["updatedAt"], "2020-01-01T00:00:00Z");
    assert_eq!(json["rows"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn prices_allows_any_origin() {
    let server = product_server(0).await;
    let state = state_with(&server, Arc::new(MemoryStore::new()));
    state.store.put(&old_snapshot()).await.expect("seed");
    let app = build_app(state, RefreshAuth::new(None));

    let request = Request::builder()
        .uri("/api/prices")
        .header("origin", "https://elsewhere.example")
        .body(Body::empty())
        .expect("request");
    let (status, headers, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn prices_with_undecodable_stored_value_is_internal_error() {
    let server = product_server(0).await;
    let backend = Arc::new(MemoryStore::new());
    backend
        .put(
            SNAPSHOT_KEY,
            "definitely not json".to_string(),
            std::time::Duration::from_secs(60),
        )
        .await
        .expect("seed");
    let app = build_app(state_with(&server, backend), RefreshAuth::new(None));

    let (status, _, body) = send(&app, get("/api/prices")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
    assert_eq!(json["error"]["code"], "internal_error");
}

// ---------------------------------------------------------------------------
// Manual refresh
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_without_token_is_forbidden_when_token_configured() {
    let server = product_server(0).await;
    let app = build_app(
        state_with(&server, Arc::new(MemoryStore::new())),
        RefreshAuth::new(Some(TOKEN.to_string())),
    );

    let (status, headers, body) = send(&app, get("/api/run")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(headers.contains_key("x-request-id"));
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
    assert_eq!(json["error"]["code"], "forbidden");
}

#[tokio::test]
async fn run_with_wrong_token_is_forbidden_and_leaves_store_untouched() {
    let server = product_server(0).await;
    let state = state_with(&server, Arc::new(MemoryStore::new()));
    let store = state.store.clone();
    let app = build_app(state, RefreshAuth::new(Some(TOKEN.to_string())));

    let (status, _, _) = send(&app, get("/api/run?token=guess")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(store.get().await.expect("store read").is_none());
}

#[tokio::test]
async fn run_with_matching_token_returns_newer_snapshot() {
    let server = product_server(1).await;
    let state = state_with(&server, Arc::new(MemoryStore::new()));
    let store = state.store.clone();
    let previous = old_snapshot();
    store.put(&previous).await.expect("seed");
    let app = build_app(state, RefreshAuth::new(Some(TOKEN.to_string())));

    let (status, _, body) = send(&app, get(&format!("/api/run?token={TOKEN}"))).await;
    assert_eq!(status, StatusCode::OK);
    let fresh: Snapshot = serde_json::from_slice(&body).expect("snapshot json");

    assert!(fresh.updated_at > previous.updated_at);
    assert_eq!(fresh.rows.len(), 2);
    assert_eq!(store.get().await.expect("store read"), Some(fresh));
}

#[tokio::test]
async fn run_is_open_when_no_token_configured() {
    let server = product_server(1).await;
    let app = build_app(
        state_with(&server, Arc::new(MemoryStore::new())),
        RefreshAuth::new(None),
    );

    let (status, _, body) = send(&app, get("/api/run")).await;
    assert_eq!(status, StatusCode::OK);
    let fresh: Snapshot = serde_json::from_slice(&body).expect("snapshot json");
    assert_eq!(fresh.priced_count(), 2);
}

// ---------------------------------------------------------------------------
// Presentation page
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_serves_tracker_page() {
    let server = product_server(0).await;
    let app = build_app(
        state_with(&server, Arc::new(MemoryStore::new())),
        RefreshAuth::new(None),
    );

    for uri in ["/", "/some/other/path"] {
        let (status, headers, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK, "uri {uri}");
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.starts_with("text/html"), "uri {uri}");
        let html = String::from_utf8(body).expect("utf-8 page");
        assert!(html.contains("/api/prices"));
        assert!(html.contains("/api/run"));
    }
}
