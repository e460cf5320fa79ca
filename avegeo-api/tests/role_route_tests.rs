/// Role-gate tests over the full router
///
/// These tests require a running PostgreSQL database.
/// Run with: cargo test --test role_route_tests -- --test-threads=1
///
/// Database URL should be set via DATABASE_URL environment variable;
/// each test skips instead of failing when it is not set.
///
/// The geofence listing is open to every session, while recording
/// attendance is a student act. Both gates live in the handlers, so
/// they are only observable through real requests.

use avegeo_api::app::{build_router, AppState};
use avegeo_api::config::{ApiConfig, Config, DatabaseConfig, ResetConfig};
use avegeo_shared::db::migrations::{ensure_database_exists, run_migrations};
use avegeo_shared::db::pool::{create_pool, DatabaseConfig as PoolConfig};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::env;
use tower::ServiceExt;

/// Builds the router over a migrated database, or `None` when no
/// database is configured
async fn db_router() -> Option<Router> {
    let url = match env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set; skipping database-bound test");
            return None;
        }
    };

    ensure_database_exists(&url)
        .await
        .expect("Should be able to create the test database");

    let pool = create_pool(PoolConfig {
        url: url.clone(),
        max_connections: 5,
        min_connections: 1,
        connect_timeout_seconds: 10,
        ..Default::default()
    })
    .await
    .expect("Should connect to the test database");

    run_migrations(&pool).await.expect("Migrations should apply");

    let config = Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            base_url: "http://localhost:8080".to_string(),
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url,
            max_connections: 5,
        },
        reset: ResetConfig {
            secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            ttl_minutes: 20,
        },
    };

    Some(build_router(AppState::new(pool, config)))
}

/// Short unique tag so reruns never collide on matric or email
fn tag() -> String {
    format!("{:x}", Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

async fn post_json(app: &Router, uri: &str, body: Value, bearer: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, value)
}

/// Registers an account and logs it in, returning the session token
async fn register_and_login(app: &Router, role: &str, tag: &str) -> String {
    let matric = format!("{}/{}", role.to_uppercase(), tag);

    let (status, _) = post_json(
        app,
        "/v1/auth/register",
        json!({
            "matric": matric,
            "email": format!("{}@example.edu", tag),
            "username": format!("user-{}", tag),
            "role": role,
            "password": "initial-password",
        }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "Registration should succeed");

    let (status, body) = post_json(
        app,
        "/v1/auth/login",
        json!({ "identifier": matric, "password": "initial-password" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "Login should succeed");

    body["session_token"]
        .as_str()
        .expect("Login should return a session token")
        .to_string()
}

#[tokio::test]
async fn any_session_can_list_geofences() {
    let Some(app) = db_router().await else { return };

    let t = tag();
    let admin_token = register_and_login(&app, "admin", &format!("a{}", t)).await;
    let student_token = register_and_login(&app, "student", &format!("s{}", t)).await;

    // At least one geofence so the listing is non-empty
    let (status, _) = post_json(
        &app,
        "/v1/geofences",
        json!({
            "name": format!("CSC101-{}", t),
            "start_time": (Utc::now() - Duration::minutes(5)).to_rfc3339(),
            "end_time": (Utc::now() + Duration::hours(1)).to_rfc3339(),
            "latitude": 6.5244,
            "longitude": 3.3792,
            "radius_m": 100.0,
        }),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "Admin should create a geofence");

    // The listing is not an admin surface; a student session reads it too
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/geofences")
                .header(header::AUTHORIZATION, format!("Bearer {}", student_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_cannot_record_attendance() {
    let Some(app) = db_router().await else { return };

    let t = tag();
    let admin_token = register_and_login(&app, "admin", &format!("a{}", t)).await;

    let (status, body) = post_json(
        &app,
        "/v1/attendance/record",
        json!({
            "join_code": "a1b2c3",
            "latitude": 6.5244,
            "longitude": 3.3792,
        }),
        Some(&admin_token),
    )
    .await;

    // Rejected on role before the join code is even looked at
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
    assert!(
        body["message"]
            .as_str()
            .unwrap_or_default()
            .contains("Student role required"),
        "Unexpected body: {}",
        body
    );
}
