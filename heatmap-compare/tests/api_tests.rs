//! Integration tests for heatmap-compare HTTP endpoints
//!
//! Each test writes a small data root into a temporary directory and drives
//! the router with `oneshot`.

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

use heatmap_common::config::{DataRoot, HeatmapConfig};
use heatmap_compare::loader::FsDataSource;
use heatmap_compare::{build_router, AppState};

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

fn country_doc(code: &str, name: &str, start: i32, end: i32, value: f64) -> String {
    let years: Vec<String> = (start..=end).map(|y| y.to_string()).collect();
    let cells: Vec<String> = (start..=end)
        .flat_map(|y| {
            (1..=12).map(move |m| {
                format!(
                    r#"{{"year": {y}, "month": {m}, "value": {value}, "births": 1000, "population": 50000, "source": "UN"}}"#
                )
            })
        })
        .collect();
    format!(
        r#"{{
            "country": {{"code": "{code}", "name": "{name}"}},
            "metric": "daily_fertility_rate",
            "title": "Daily Births Per 100k Women (Age 15-44)",
            "years": [{years}],
            "months": ["Jan","Feb","Mar","Apr","May","Jun","Jul","Aug","Sep","Oct","Nov","Dec"],
            "colorScale": {{"type": "sequential", "domain": [1.0, 20.0], "scheme": "turbo"}},
            "data": [{cells}],
            "sources": ["UN"]
        }}"#,
        years = years.join(","),
        cells = cells.join(",")
    )
}

fn state_doc() -> String {
    r#"{
        "state": {"code": "texas", "name": "Texas"},
        "metric": "daily_fertility_rate",
        "years": [2000],
        "colorScale": {"type": "sequential", "domain": [5, 8], "scheme": "turbo"},
        "data": [
            {"year": 2000, "month": 1, "value": 6.1, "birthSource": "CDC", "populationSource": "Census"},
            {"year": 2000, "month": 2, "value": 6.3, "birthSource": "CDC", "populationSource": "CDC"}
        ],
        "birthSources": ["CDC"],
        "populationSources": ["Census"]
    }"#
    .to_string()
}

fn setup() -> (TempDir, axum::Router) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "fertility/aland.json", &country_doc("aland", "Aland", 1990, 1993, 5.0));
    write(root, "fertility/borduria.json", &country_doc("borduria", "Borduria", 1992, 1996, 15.0));
    write(root, "fertility/broken.json", "{ this is not json");
    write(root, "fertility/states/texas.json", &state_doc());
    write(
        root,
        "countries.json",
        r#"{"countries": [
            {"code": "aland", "name": "Aland", "sources": ["UN"],
             "fertility": {"yearRange": [1990, 1993], "hasData": true}},
            {"code": "borduria", "name": "Borduria", "sources": ["UN"],
             "fertility": {"yearRange": [1992, 1996], "hasData": true}}
        ], "generatedAt": "2024-01-01T00:00:00Z"}"#,
    );

    let config = HeatmapConfig {
        data_root: DataRoot::Directory(root.to_path_buf()),
        ..Default::default()
    };
    let state = AppState::new(Arc::new(FsDataSource::new(root)), config);
    (dir, build_router(state))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

async fn extract_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).expect("Should parse JSON")
}

async fn extract_text(body: Body) -> String {
    String::from_utf8(body_bytes(body).await).expect("Should be UTF-8")
}

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, app) = setup();
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "heatmap-compare");
    assert!(body["version"].is_string());
    assert_eq!(body["data_source_reachable"], true);
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_health_reports_unreachable_data_root() {
    let dir = tempfile::tempdir().unwrap();
    let config = HeatmapConfig {
        data_root: DataRoot::Directory(dir.path().to_path_buf()),
        ..Default::default()
    };
    let app = build_router(AppState::new(Arc::new(FsDataSource::new(dir.path())), config));

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["data_source_reachable"], false);
    assert!(body["error"].as_str().unwrap().contains("countries.json"));
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let (_dir, app) = setup();
    let response = app.oneshot(get("/api/buildinfo")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["git_hash"].is_string());
    assert!(body["build_timestamp"].is_string());
}

#[tokio::test]
async fn test_compare_aligns_and_unifies() {
    let (_dir, app) = setup();
    let response = app
        .oneshot(get("/api/compare?countries=aland,borduria,atlantis,broken"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["yearRange"]["start"], 1992);
    assert_eq!(body["yearRange"]["end"], 1996);
    assert_eq!(body["scaleMode"], "unified");
    assert_eq!(body["sharedScale"]["domain"], serde_json::json!([5.0, 15.0]));

    let entities = body["entities"].as_array().unwrap();
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0]["code"], "aland");
    let aland_cells = entities[0]["series"]["data"].as_array().unwrap();
    assert_eq!(aland_cells.len(), 60);
    assert_eq!(aland_cells.iter().filter(|c| c["value"].is_null()).count(), 36);

    assert_eq!(body["missing"], serde_json::json!(["atlantis", "broken"]));
}

#[tokio::test]
async fn test_compare_malformed_query_uses_defaults() {
    let (_dir, app) = setup();
    let response = app
        .oneshot(get("/api/compare?countries=aland,,&metric=bogus&scale=per-country&yearStart=abc"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["metric"], "fertility");
    assert_eq!(body["scaleMode"], "per-country");
    assert!(body.get("sharedScale").is_none());
    assert!(body.get("displayRange").is_none());
    assert_eq!(body["entities"][0]["colorScale"]["domain"], serde_json::json!([1.0, 20.0]));
}

#[tokio::test]
async fn test_compare_empty_selection() {
    let (_dir, app) = setup();
    let response = app.oneshot(get("/api/compare")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["entities"].as_array().unwrap().len(), 0);
    assert_eq!(body["yearRange"]["start"], 1900);
}

#[tokio::test]
async fn test_compare_states_normalized() {
    let (_dir, app) = setup();
    let response = app.oneshot(get("/api/compare/states?states=texas")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["kind"], "state");
    let texas = &body["entities"][0]["series"];
    assert_eq!(texas["entity"]["name"], "Texas");
    assert_eq!(texas["data"][0]["source"], "CDC / Census");
    assert_eq!(texas["data"][1]["source"], "CDC");
}

#[tokio::test]
async fn test_index_endpoint() {
    let (_dir, app) = setup();
    let response = app.clone().oneshot(get("/api/index/countries")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["entities"].as_array().unwrap().len(), 2);
    assert_eq!(body["entities"][0]["fertility"]["yearRange"], serde_json::json!([1990, 1993]));

    let response = app.clone().oneshot(get("/api/index/planets")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("planets"));

    // states.json is absent from this data root
    let response = app.oneshot(get("/api/index/states")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_heatmap_svg() {
    let (_dir, app) = setup();
    let response = app
        .clone()
        .oneshot(get("/heatmap/fertility/aland?yearStart=1992"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/svg+xml");
    let svg = extract_text(response.into_body()).await;
    assert!(svg.starts_with("<svg"));
    assert_eq!(svg.matches("data-year=").count(), 24);

    let response = app.clone().oneshot(get("/heatmap/fertility/atlantis")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.clone().oneshot(get("/heatmap/weather/aland")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/heatmap/fertility/texas.svg?kind=states")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_heatmap_rejects_path_tricks() {
    let (_dir, app) = setup();
    let response = app.oneshot(get("/heatmap/fertility/..%2Fcountries")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_compare_page() {
    let (_dir, app) = setup();
    let response = app
        .oneshot(get("/compare?countries=aland,borduria,atlantis&theme=dark"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = extract_text(response.into_body()).await;
    assert!(html.contains("data-theme=\"dark\""));
    assert_eq!(html.matches("<section class=\"heatmap\"").count(), 2);
    assert!(html.contains("legend shared"));
    assert!(html.contains("Not available: atlantis"));
    assert!(html.contains("Fertility comparison (2 countries, 1992-1996)"));
}

#[tokio::test]
async fn test_static_ui() {
    let (_dir, app) = setup();
    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/static/app.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/javascript");
    let script = extract_text(response.into_body()).await;
    assert!(script.contains("dataset.label"));

    let response = app.oneshot(get("/static/secrets.txt")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
