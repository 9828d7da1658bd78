//! Router tests: the session gate and the JSON API, driven in-process.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use chrono::{Duration, Utc};
use fnicon_core::{CatalogRecord, DEFAULT_ICON_URL, ManualClock, local_icon_ref};
use fnicon_fetch::testing::MockFetcher;
use fnicon_server::{AppState, ServerConfig, build_router};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const PASSWORD: &str = "hunter22";
const INDEX: &str = "<html><body><p>loading</p><div id=\"root\"></div></body></html>";

struct Harness {
    _dir: TempDir,
    config: ServerConfig,
    fetcher: Arc<MockFetcher>,
    clock: Arc<ManualClock>,
    app: Router,
}

fn seeded_record(seq: u32, title: &str) -> CatalogRecord {
    let mut record = CatalogRecord::new(seq, title, format!("https://{title}.lan/"), "");
    record.remote_icon_url = format!("https://icons.lan/{seq}.png");
    record.local_icon_path = Some(local_icon_ref(&record.icon_file_name()));
    record
}

async fn harness_with(fetcher: MockFetcher, with_password: bool) -> Harness {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig::new(&dir.path().join("public"), &dir.path().join("script.js"));
    std::fs::create_dir_all(&config.conf_dir).unwrap();
    std::fs::create_dir_all(&config.www_dir).unwrap();
    std::fs::write(config.public_dir.join("login.html"), "<form>login</form>").unwrap();
    std::fs::write(config.public_dir.join("index.html"), "<h1>dashboard</h1>").unwrap();
    std::fs::write(config.www_index(), INDEX).unwrap();

    let records = vec![seeded_record(1, "nas"), seeded_record(2, "router")];
    std::fs::write(
        config.conf_dir.join("fnicon.json"),
        serde_json::to_string_pretty(&records).unwrap(),
    )
    .unwrap();
    std::fs::write(config.conf_dir.join("1_nas.jpg"), "nas-icon").unwrap();

    let fetcher = Arc::new(fetcher);
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let state = AppState::new(config.clone(), fetcher.clone(), clock.clone());
    if with_password {
        state.auth().initialize(PASSWORD).await.unwrap();
    }

    Harness {
        _dir: dir,
        config,
        fetcher,
        clock,
        app: build_router(state),
    }
}

async fn harness() -> Harness {
    harness_with(MockFetcher::new(), true).await
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string())
}

fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap())
}

/// Logs in and returns the `Cookie` header value.
async fn login(app: &Router) -> String {
    let response = send(
        app,
        request(Method::POST, "/api/login", None, Some(json!({"password": PASSWORD}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response).unwrap();
    cookie.split(';').next().unwrap().to_string()
}

// ============================================================================
// Gate
// ============================================================================

#[tokio::test]
async fn test_gate_redirects_to_init_without_password() {
    let h = harness_with(MockFetcher::new(), false).await;

    let response = send(&h.app, request(Method::GET, "/", None, None)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/login.html?init=true"));
}

#[tokio::test]
async fn test_gate_redirects_to_login() {
    let h = harness().await;

    for uri in ["/", "/index.html", "/api/files"] {
        let response = send(&h.app, request(Method::GET, uri, None, None)).await;
        assert_eq!(response.status(), StatusCode::FOUND, "{uri}");
        assert_eq!(location(&response), Some("/login.html"), "{uri}");
    }

    let response = send(
        &h.app,
        request(Method::GET, "/api/files", Some("sessionId=forged"), None),
    )
    .await;
    assert_eq!(location(&response), Some("/login.html"));
    assert!(set_cookie(&response).is_none());
}

#[tokio::test]
async fn test_public_paths_are_served() {
    let h = harness().await;

    let response = send(&h.app, request(Method::GET, "/login.html", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"<form>login</form>");
}

#[tokio::test]
async fn test_password_file_is_never_served() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    let response = send(&h.app, request(Method::GET, "/conf/1_nas.jpg", Some(&cookie), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"nas-icon");

    for uri in [
        "/conf/password.json",
        "/conf/password%2Ejson",
        "/./conf/password.json",
        "/conf/PASSWORD.json",
    ] {
        let response = send(&h.app, request(Method::GET, uri, Some(&cookie), None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(!String::from_utf8_lossy(&body).contains("hash"), "{uri}");
    }
}

#[tokio::test]
async fn test_valid_session_is_refreshed() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    h.clock.advance(Duration::minutes(29));
    let response = send(&h.app, request(Method::GET, "/index.html", Some(&cookie), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let reissued = set_cookie(&response).unwrap();
    assert!(reissued.starts_with(&cookie));
    assert!(reissued.ends_with("Max-Age=1800"));

    // 29 minutes after the refresh the session is still alive.
    h.clock.advance(Duration::minutes(29));
    let response = send(&h.app, request(Method::GET, "/api/files", Some(&cookie), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_expired_session_clears_cookie() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    h.clock.advance(Duration::minutes(31));
    let response = send(&h.app, request(Method::GET, "/api/files", Some(&cookie), None)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/login.html"));
    assert!(set_cookie(&response).unwrap().contains("Max-Age=0"));

    // Removed on detection: the next attempt is simply unknown.
    let response = send(&h.app, request(Method::GET, "/api/files", Some(&cookie), None)).await;
    assert!(set_cookie(&response).is_none());
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_init_password() {
    let h = harness_with(MockFetcher::new(), false).await;

    let response = send(
        &h.app,
        request(Method::POST, "/api/init-password", None, Some(json!({"password": "abc"}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["success"], false);

    let response = send(
        &h.app,
        request(Method::POST, "/api/init-password", None, Some(json!({"password": PASSWORD}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["success"], true);

    let stored: Value =
        serde_json::from_str(&std::fs::read_to_string(h.config.conf_dir.join("password.json")).unwrap())
            .unwrap();
    assert_eq!(stored["timeout"], 30);
    assert_eq!(stored["password"].as_str().unwrap().len(), 64);

    let response = send(
        &h.app,
        request(Method::POST, "/api/init-password", None, Some(json!({"password": "another1"}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let h = harness().await;

    let response = send(
        &h.app,
        request(Method::POST, "/api/login", None, Some(json!({"password": "wrong-one"}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&response).is_none());
    assert_eq!(json_body(response).await["success"], false);
}

#[tokio::test]
async fn test_login_without_password_is_unauthorized() {
    let h = harness_with(MockFetcher::new(), false).await;

    let response = send(
        &h.app,
        request(Method::POST, "/api/login", None, Some(json!({"password": PASSWORD}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_sets_cookie_and_logout_clears_it() {
    let h = harness().await;

    let response = send(
        &h.app,
        request(Method::POST, "/api/login", None, Some(json!({"password": PASSWORD}))),
    )
    .await;
    let issued = set_cookie(&response).unwrap();
    assert!(issued.starts_with("sessionId="));
    assert!(issued.contains("HttpOnly"));
    assert!(issued.ends_with("Max-Age=1800"));
    let cookie = issued.split(';').next().unwrap().to_string();

    let response = send(&h.app, request(Method::POST, "/api/logout", Some(&cookie), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared: Vec<_> = response.headers().get_all(header::SET_COOKIE).iter().collect();
    assert_eq!(cleared.len(), 1);
    assert!(cleared[0].to_str().unwrap().contains("Max-Age=0"));

    let response = send(&h.app, request(Method::GET, "/api/files", Some(&cookie), None)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
}

// ============================================================================
// Catalogs
// ============================================================================

#[tokio::test]
async fn test_list_excludes_password_file() {
    let h = harness().await;
    std::fs::write(h.config.conf_dir.join("extra.json"), "[]").unwrap();
    let cookie = login(&h.app).await;

    let response = send(&h.app, request(Method::GET, "/api/files", Some(&cookie), None)).await;
    let body = json_body(response).await;
    assert_eq!(body["data"], json!(["extra.json", "fnicon.json"]));
}

#[tokio::test]
async fn test_read_catalog_uses_original_keys() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    let response = send(
        &h.app,
        request(Method::GET, "/api/files/fnicon.json", Some(&cookie), None),
    )
    .await;
    let body = json_body(response).await;
    assert_eq!(body["data"][0]["序号"], 1);
    assert_eq!(body["data"][1]["标题"], "router");
    assert_eq!(body["data"][0]["本地图片URL"], "/conf/1_nas.jpg");
}

#[tokio::test]
async fn test_missing_catalog_and_record_are_not_found() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    let response = send(
        &h.app,
        request(
            Method::POST,
            "/api/files/nope.json",
            Some(&cookie),
            Some(json!({"标题": "x", "外网跳转URL": "https://x.lan/"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &h.app,
        request(
            Method::PUT,
            "/api/files/fnicon.json/42",
            Some(&cookie),
            Some(json!({"标题": "x"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &h.app,
        request(Method::DELETE, "/api/files/fnicon.json/42", Some(&cookie), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_password_file_is_not_a_catalog() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    let response = send(
        &h.app,
        request(Method::GET, "/api/files/password.json", Some(&cookie), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_requests_use_envelope() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    let malformed_body = Request::builder()
        .method(Method::POST)
        .uri("/api/files/fnicon.json")
        .header(header::COOKIE, &cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"标题\": "))
        .unwrap();
    let response = send(&h.app, malformed_body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());

    let response = send(
        &h.app,
        request(
            Method::PUT,
            "/api/files/fnicon.json/first",
            Some(&cookie),
            Some(json!({"标题": "x"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());

    let response = send(
        &h.app,
        request(Method::POST, "/api/login", None, Some(json!(["not", "an", "object"]))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["success"], false);
}

#[tokio::test]
async fn test_create_resolves_and_downloads_icon() {
    let h = harness_with(
        MockFetcher::new().with_image("https://grafana.lan:3000/favicon.ico", b"ICO".to_vec()),
        true,
    )
    .await;
    let cookie = login(&h.app).await;

    let response = send(
        &h.app,
        request(
            Method::POST,
            "/api/files/fnicon.json",
            Some(&cookie),
            Some(json!({
                "标题": "Grafana",
                "外网跳转URL": "https://grafana.lan:3000/d/home",
                "内网跳转URL": "http://10.0.0.5:3000/"
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["序号"], 3);
    assert_eq!(body["data"]["网络图片URL"], "https://grafana.lan:3000/favicon.ico");
    assert_eq!(body["data"]["本地图片URL"], "/conf/3_Grafana.jpg");
    assert_eq!(
        std::fs::read(h.config.conf_dir.join("3_Grafana.jpg")).unwrap(),
        b"ICO"
    );
}

#[tokio::test]
async fn test_create_falls_back_to_default_icon() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    let response = send(
        &h.app,
        request(
            Method::POST,
            "/api/files/fnicon.json",
            Some(&cookie),
            Some(json!({"title": "Blank", "external_url": "https://blank.lan/"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["网络图片URL"], DEFAULT_ICON_URL);
    assert_eq!(h.fetcher.count("file"), 1);
}

#[tokio::test]
async fn test_update_title_only_makes_no_requests() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    let response = send(
        &h.app,
        request(
            Method::PUT,
            "/api/files/fnicon.json/2",
            Some(&cookie),
            Some(json!({"标题": "gateway"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"]["标题"], "gateway");
    assert!(h.fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_update_external_url_rediscovers_icon() {
    let h = harness_with(
        MockFetcher::new()
            .with_page("https://wiki.lan/", r#"<link rel="icon" href="/static/wiki.png">"#)
            .with_image("https://wiki.lan/static/wiki.png", b"PNG".to_vec()),
        true,
    )
    .await;
    let cookie = login(&h.app).await;

    let response = send(
        &h.app,
        request(
            Method::PUT,
            "/api/files/fnicon.json/2",
            Some(&cookie),
            Some(json!({"外网跳转URL": "https://wiki.lan/"})),
        ),
    )
    .await;
    let body = json_body(response).await;
    assert_eq!(body["data"]["网络图片URL"], "https://wiki.lan/static/wiki.png");
    assert_eq!(
        std::fs::read(h.config.conf_dir.join("2_router.jpg")).unwrap(),
        b"PNG"
    );
}

#[tokio::test]
async fn test_delete_removes_record_and_icon() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    let response = send(
        &h.app,
        request(Method::DELETE, "/api/files/fnicon.json/1", Some(&cookie), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!h.config.conf_dir.join("1_nas.jpg").exists());

    let response = send(
        &h.app,
        request(Method::GET, "/api/files/fnicon.json", Some(&cookie), None),
    )
    .await;
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["序号"], 2);
}

#[tokio::test]
async fn test_reorder() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    let response = send(
        &h.app,
        request(
            Method::POST,
            "/api/files/fnicon.json/reorder",
            Some(&cookie),
            Some(json!({"order": [2, 1]})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"][0]["标题"], "router");
    assert_eq!(body["data"][0]["序号"], 1);
    assert_eq!(body["data"][0]["本地图片URL"], "/conf/1_router.jpg");
    assert_eq!(body["data"][1]["标题"], "nas");
    assert_eq!(body["data"][1]["序号"], 2);
    assert_eq!(body["data"][1]["本地图片URL"], "/conf/2_nas.jpg");
    assert_eq!(
        std::fs::read_to_string(h.config.conf_dir.join("2_nas.jpg")).unwrap(),
        "nas-icon"
    );
    assert!(!h.config.conf_dir.join("1_nas.jpg").exists());
}

// ============================================================================
// Apply settings
// ============================================================================

#[tokio::test]
async fn test_apply_settings() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    let response = send(
        &h.app,
        request(Method::POST, "/api/apply-settings", Some(&cookie), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let published = h.config.www_conf_dir();
    assert!(published.join("fnicon.json").exists());
    assert!(published.join("1_nas.jpg").exists());
    assert!(!published.join("password.json").exists());
    let html = std::fs::read_to_string(h.config.www_index()).unwrap();
    assert!(html.contains("<body>\n  <script src=\"/script.js\"></script><div id=\"root\">"));
}

#[tokio::test]
async fn test_apply_settings_without_index_fails() {
    let h = harness().await;
    std::fs::remove_file(h.config.www_index()).unwrap();
    let cookie = login(&h.app).await;

    let response = send(
        &h.app,
        request(Method::POST, "/api/apply-settings", Some(&cookie), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["success"], false);
}
