//! HTTP-level tests for the maintenance gate.
//!
//! These drive the full router (gate middleware, static site, admin page)
//! against an in-memory option store with a fixed clock.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, NaiveDateTime, Utc};
use http_body_util::BodyExt;
use maintenance_gate::config::database::{create_connection, create_tables};
use maintenance_gate::core::options::get_option;
use maintenance_gate::core::settings::{
    self, ALL_OPTION_KEYS, MaintenanceSettings, load_settings, save_settings,
    seed_default_settings,
};
use maintenance_gate::web::role::TokenRoleResolver;
use maintenance_gate::web::templates::Templates;
use maintenance_gate::web::{AppState, build_router};
use sea_orm::DatabaseConnection;
use tempfile::TempDir;
use tower::ServiceExt;

const ADMIN_TOKEN: &str = "test-admin-token";
const SITE_INDEX: &str = "<html><body>Welcome to the shop</body></html>";

// ── Test app builder ───────────────────────────────────────────

struct TestApp {
    router: axum::Router,
    db: DatabaseConnection,
    _site: TempDir,
}

fn at(s: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
        .unwrap()
        .and_utc()
}

async fn build_test_app(settings: &MaintenanceSettings, now: DateTime<Utc>) -> TestApp {
    let db = create_connection("sqlite::memory:").await.unwrap();
    create_tables(&db).await.unwrap();
    save_settings(&db, settings).await.unwrap();

    let site = tempfile::tempdir().unwrap();
    std::fs::write(site.path().join("index.html"), SITE_INDEX).unwrap();

    let state = AppState {
        db: db.clone(),
        roles: Arc::new(TokenRoleResolver::new([ADMIN_TOKEN])),
        templates: Arc::new(Templates::new().unwrap()),
        clock: Arc::new(move || now),
        home_url: "https://shop.example/".to_string(),
    };

    TestApp {
        router: build_router(state, site.path()),
        db,
        _site: site,
    }
}

fn maintenance_on() -> MaintenanceSettings {
    MaintenanceSettings {
        enabled: true,
        message: "<h1>Back at seven</h1>".to_string(),
        ..MaintenanceSettings::default()
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ── Gate behaviour ─────────────────────────────────────────────

#[tokio::test]
async fn disabled_gate_serves_site() {
    let app = build_test_app(&MaintenanceSettings::default(), Utc::now()).await;

    let response = app.router.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, SITE_INDEX);
}

#[tokio::test]
async fn enabled_gate_blocks_visitor_with_503() {
    let app = build_test_app(&maintenance_on(), Utc::now()).await;

    let response = app.router.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.headers()[header::RETRY_AFTER], "3600");
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/html; charset=utf-8"
    );

    let body = body_text(response).await;
    assert!(body.contains("<h1>Back at seven</h1>"));
    assert!(!body.contains("Welcome to the shop"));
}

#[tokio::test]
async fn unreadable_option_store_lets_requests_through() {
    // No create_tables: every option read fails
    let db = create_connection("sqlite::memory:").await.unwrap();
    let site = tempfile::tempdir().unwrap();
    std::fs::write(site.path().join("index.html"), SITE_INDEX).unwrap();

    let state = AppState {
        db,
        roles: Arc::new(TokenRoleResolver::new([ADMIN_TOKEN])),
        templates: Arc::new(Templates::new().unwrap()),
        clock: Arc::new(Utc::now),
        home_url: "https://shop.example/".to_string(),
    };

    let response = build_router(state, site.path())
        .oneshot(get("/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, SITE_INDEX);
}

#[tokio::test]
async fn emergency_login_bypasses_gate() {
    let app = build_test_app(&maintenance_on(), Utc::now()).await;

    let response = app
        .router
        .oneshot(get("/?emergency-login=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn emergency_login_requires_literal_one() {
    let app = build_test_app(&maintenance_on(), Utc::now()).await;

    let response = app
        .router
        .oneshot(get("/?emergency-login=true"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn administrator_passes_through() {
    let app = build_test_app(&maintenance_on(), Utc::now()).await;

    let response = app.router.oneshot(admin_get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, SITE_INDEX);
}

#[tokio::test]
async fn time_window_is_respected() {
    let windowed = MaintenanceSettings {
        time_check_enabled: true,
        window_start: "2024-11-29T18:00".to_string(),
        window_end: "2024-11-29T19:00".to_string(),
        timezone: "Europe/Amsterdam".to_string(),
        ..maintenance_on()
    };

    // 18:30 Amsterdam
    let app = build_test_app(&windowed, at("2024-11-29 17:30")).await;
    let response = app.router.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // 17:59 Amsterdam
    let app = build_test_app(&windowed, at("2024-11-29 16:59")).await;
    let response = app.router.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 19:01 Amsterdam
    let app = build_test_app(&windowed, at("2024-11-29 18:01")).await;
    let response = app.router.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_probe_is_not_gated() {
    let app = build_test_app(&maintenance_on(), Utc::now()).await;

    let response = app.router.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

// ── Admin settings page ────────────────────────────────────────

#[tokio::test]
async fn settings_page_requires_administrator() {
    let app = build_test_app(&MaintenanceSettings::default(), Utc::now()).await;

    let response = app
        .router
        .oneshot(get("/admin/maintenance"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn settings_page_renders_for_administrator() {
    let app = build_test_app(&maintenance_on(), Utc::now()).await;

    let response = app
        .router
        .oneshot(admin_get("/admin/maintenance"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Maintenance Mode Settings"));
    assert!(body.contains(r#"name="enable_maintenance_mode" value="1" checked="checked""#));
    assert!(body.contains("https://shop.example/?emergency-login&#x3D;1"));
}

#[tokio::test]
async fn settings_form_submission_persists_values() {
    let app = build_test_app(&maintenance_on(), Utc::now()).await;

    // enable_maintenance_mode absent: the checkbox was unticked
    let form = "maintenance_start=2025-02-01T09%3A00\
                &maintenance_end=2025-02-01T08%3A00\
                &enable_time_check=1\
                &maintenance_message=%3Cp%3EUpgrading%3C%2Fp%3E\
                &maintenance_timezone=Not%2FAZone";

    let request = Request::builder()
        .method("POST")
        .uri("/admin/maintenance")
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/admin/maintenance?updated=true"
    );

    // Stored verbatim: no cross-field validation, no timezone check
    let stored = load_settings(&app.db).await.unwrap();
    assert_eq!(
        stored,
        MaintenanceSettings {
            enabled: false,
            window_start: "2025-02-01T09:00".to_string(),
            window_end: "2025-02-01T08:00".to_string(),
            timezone: "Not/AZone".to_string(),
            time_check_enabled: true,
            message: "<p>Upgrading</p>".to_string(),
        }
    );
}

#[tokio::test]
async fn visitor_cannot_submit_settings() {
    let app = build_test_app(&MaintenanceSettings::default(), Utc::now()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/admin/maintenance")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("enable_maintenance_mode=1"))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(!load_settings(&app.db).await.unwrap().enabled);
}

// ── Lifecycle ──────────────────────────────────────────────────

#[tokio::test]
async fn uninstall_twice_leaves_store_empty() {
    let db = create_connection("sqlite::memory:").await.unwrap();
    create_tables(&db).await.unwrap();
    seed_default_settings(&db).await.unwrap();

    settings::uninstall(&db).await.unwrap();
    settings::uninstall(&db).await.unwrap();

    for key in ALL_OPTION_KEYS {
        assert!(get_option(&db, key).await.unwrap().is_none());
    }
}
