//! In-process router tests
//!
//! The router is driven with `tower::ServiceExt::oneshot` over a lazy pool
//! that never connects, so every request here must be answered before the
//! store is touched.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{header, Request, StatusCode};
use freight_desk::api::{build_router, AppState};
use freight_desk::config::SourcesConfig;
use freight_desk::database::Database;
use freight_desk::fetchers::Fetchers;
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

fn make_router() -> axum::Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/unused")
        .expect("lazy pool");
    let db = Database::from_pool(pool);
    let fetchers = Fetchers::new(&db, &SourcesConfig::default());
    build_router(Arc::new(AppState::new(db, fetchers)))
}

async fn call(router: axum::Router, req: Request<Body>) -> (StatusCode, Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, body)
}

fn parse_json(b: Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn unknown_path_is_json_404() {
    let (status, body) = call(make_router(), get("/api/nothing-here")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse_json(body)["error"], "Not found");
}

#[tokio::test]
async fn malformed_imo_is_rejected() {
    let (status, body) = call(make_router(), get("/api/vessels/123")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse_json(body)["error"], "Invalid IMO number");
}

#[tokio::test]
async fn rates_by_bad_date_is_400() {
    let (status, body) = call(make_router(), get("/api/freight/rates/date/2025-13-40")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        parse_json(body)["error"],
        "Invalid date format. Use YYYY-MM-DD."
    );
}

#[tokio::test]
async fn non_numeric_ids_are_400() {
    for uri in [
        "/api/freight/routes/abc",
        "/api/freight/rates/abc",
        "/api/position-lists/abc",
    ] {
        let (status, body) = call(make_router(), get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(parse_json(body)["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid"));
    }
}

#[tokio::test]
async fn route_history_rejects_bad_start_date() {
    let (status, _) = call(
        make_router(),
        get("/api/ffa/route/TD3C?startDate=03/04/2025"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ships_from_port_requires_port() {
    let (status, body) = call(
        make_router(),
        get("/api/position-lists/ships-from-port?regions=USG"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse_json(body)["error"], "Port is required");

    let (status, _) = call(
        make_router(),
        get("/api/position-lists/ships-from-port?port=Houston&vesselTypes=Capesize"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ffa_fetch_without_api_credentials_fails_generically() {
    let req = Request::builder()
        .method("POST")
        .uri("/api/fetch/ffa")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(make_router(), req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(parse_json(body)["error"], "Failed to fetch FFA data");
}

#[tokio::test]
async fn pdf_import_of_empty_directory_saves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let req = post_json(
        "/api/fetch/vessels",
        serde_json::json!({ "fromPDFs": true, "pdfDirectory": dir.path() }),
    );
    let (status, body) = call(make_router(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        parse_json(body),
        serde_json::json!({ "total": 0, "created": 0, "updated": 0, "errors": [] })
    );
}

#[tokio::test]
async fn pdf_import_of_missing_directory_is_404() {
    let req = post_json(
        "/api/fetch/vessels",
        serde_json::json!({ "fromPDFs": true, "pdfDirectory": "/nonexistent/q88" }),
    );
    let (status, body) = call(make_router(), req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        parse_json(body)["error"],
        "Directory not found: /nonexistent/q88"
    );
}

#[tokio::test]
async fn vessel_page_with_bad_imo_renders_404() {
    let (status, body) = call(make_router(), get("/vessels/not-an-imo")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("Vessel not found"));
}
