use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use failtrack::{AddressedState, AddressedStateStore, AppState, ErrorCatalog, FailureRecord, build_router};
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;

fn records() -> Vec<FailureRecord> {
    let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    vec![
        FailureRecord::new("tests/api.py", "test_login", "KeyError: 'token'", ts),
        FailureRecord::new("tests/api.py", "test_logout", "TimeoutError\nafter 30s", ts),
        FailureRecord::new("tests/db.py", "test_connect", "ConnectionError", ts),
    ]
}

fn app_with_store(store: AddressedStateStore, page_size: usize) -> axum::Router {
    let catalog = ErrorCatalog::from_records(records(), store, AddressedState::new());
    build_router(AppState::new(catalog, page_size))
}

fn app(dir: &Path, page_size: usize) -> axum::Router {
    app_with_store(AddressedStateStore::new(dir.join("addressed.json")), page_size)
}

async fn send(app: &axum::Router, method: Method, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("response expected");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should be readable");
    (status, body.to_vec())
}

async fn send_json(app: &axum::Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let (status, body) = send(app, method, uri).await;
    let json = serde_json::from_slice::<Value>(&body).expect("body should be valid JSON");
    (status, json)
}

#[tokio::test]
async fn toggle_flips_and_updates_stats() {
    let temp_dir = TempDir::new().unwrap();
    let app = app(temp_dir.path(), 50);

    let (status, body) = send_json(&app, Method::POST, "/api/toggle/tests/api.py::test_login").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["identity"], "tests/api.py::test_login");
    assert_eq!(body["addressed"], true);

    let (status, stats) = send_json(&app, Method::GET, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["addressed"], 1);
    assert_eq!(stats["unaddressed"], 2);
    assert_eq!(stats["progress_percent"], 33.3);

    let (_, body) = send_json(&app, Method::POST, "/api/toggle/tests/api.py::test_login").await;
    assert_eq!(body["addressed"], false);

    let persisted = AddressedStateStore::new(temp_dir.path().join("addressed.json")).load();
    assert_eq!(persisted.get("tests/api.py::test_login"), Some(&false));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_toggles_are_all_persisted() {
    let temp_dir = TempDir::new().unwrap();
    let app = app(temp_dir.path(), 50);

    let identities = [
        "tests/api.py::test_login",
        "tests/api.py::test_logout",
        "tests/db.py::test_connect",
    ];
    let tasks: Vec<_> = identities
        .iter()
        .map(|identity| {
            let app = app.clone();
            let uri = format!("/api/toggle/{identity}");
            tokio::spawn(async move { send_json(&app, Method::POST, &uri).await })
        })
        .collect();
    for task in tasks {
        let (status, body) = task.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["addressed"], true);
    }

    let persisted = AddressedStateStore::new(temp_dir.path().join("addressed.json")).load();
    assert_eq!(persisted.len(), 3);
    assert!(persisted.values().all(|addressed| *addressed));

    let (_, stats) = send_json(&app, Method::GET, "/api/stats").await;
    assert_eq!(stats["progress_percent"], 100.0);
}

#[tokio::test]
async fn toggle_decodes_percent_encoded_identity() {
    let temp_dir = TempDir::new().unwrap();
    let app = app(temp_dir.path(), 50);

    let (status, body) =
        send_json(&app, Method::POST, "/api/toggle/tests%2Fdb.py%3A%3Atest_connect").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identity"], "tests/db.py::test_connect");
    assert_eq!(body["addressed"], true);
}

#[tokio::test]
async fn toggle_write_failure_returns_500() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, "x").unwrap();
    let app = app_with_store(AddressedStateStore::new(blocker.join("addressed.json")), 50);

    let (status, body) = send_json(&app, Method::POST, "/api/toggle/tests/db.py::test_connect").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "persistence_error");
    assert!(body["error"].as_str().unwrap().contains("Failed to write"));
}

#[tokio::test]
async fn list_supports_pagination_and_search() {
    let temp_dir = TempDir::new().unwrap();
    let app = app(temp_dir.path(), 2);

    let (status, page) = send_json(&app, Method::GET, "/api/errors?page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["current_page"], 2);
    assert_eq!(page["pagination"]["total_pages"], 2);
    assert_eq!(page["pagination"]["total_records"], 3);
    assert_eq!(page["pagination"]["has_prev"], true);
    assert_eq!(page["pagination"]["has_next"], false);
    assert_eq!(page["records"].as_array().unwrap().len(), 1);
    assert_eq!(page["records"][0]["identity"], "tests/db.py::test_connect");

    let (_, page) = send_json(&app, Method::GET, "/api/errors?q=timeout").await;
    assert_eq!(page["pagination"]["total_records"], 1);
    assert_eq!(page["records"][0]["test_name"], "test_logout");
    assert_eq!(page["records"][0]["summary"], "TimeoutError");

    send_json(&app, Method::POST, "/api/toggle/tests/db.py::test_connect").await;
    let (_, page) = send_json(&app, Method::GET, "/api/errors?status=addressed").await;
    assert_eq!(page["pagination"]["total_records"], 1);
    assert_eq!(page["records"][0]["addressed"], true);
}

#[tokio::test]
async fn out_of_range_page_is_empty_not_error() {
    let temp_dir = TempDir::new().unwrap();
    let app = app(temp_dir.path(), 2);

    let (status, page) = send_json(&app, Method::GET, "/api/errors?page=40").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page["records"].as_array().unwrap().is_empty());
    assert_eq!(page["pagination"]["has_next"], false);
}

#[tokio::test]
async fn invalid_query_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let app = app(temp_dir.path(), 2);

    let (status, _) = send(&app, Method::GET, "/api/errors?page=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/api/errors?status=maybe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn index_renders_records() {
    let temp_dir = TempDir::new().unwrap();
    let app = app(temp_dir.path(), 50);

    let (status, body) = send(&app, Method::GET, "/").await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("data-identity=\"tests/api.py::test_login\""));
    assert!(html.contains("KeyError: &#39;token&#39;"));
    assert!(html.contains("id=\"stat-total\">3<"));
}

#[tokio::test]
async fn healthcheck_ok() {
    let temp_dir = TempDir::new().unwrap();
    let app = app(temp_dir.path(), 50);

    let (status, body) = send_json(&app, Method::GET, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
