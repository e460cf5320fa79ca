/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router
/// with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use avegeo_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = avegeo_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use crate::error::ApiError;
use crate::notify::Notifier;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use avegeo_shared::auth::reset::PasswordResetTokenManager;
use avegeo_shared::auth::session::SessionTokenManager;
use avegeo_shared::models::user::{User, UserRole};
use avegeo_shared::services::account::AccountService;
use avegeo_shared::services::attendance::AttendanceRecorder;
use avegeo_shared::services::geofence::GeofenceLifecycle;
use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; the
/// services clone cheaply (pool handles inside).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Account operations (register, login, reset flow)
    pub accounts: AccountService,

    /// Geofence lifecycle operations
    pub geofences: GeofenceLifecycle,

    /// Attendance recording and listings
    pub attendance: AttendanceRecorder,

    /// Outbound notifications
    pub notifier: Notifier,
}

impl AppState {
    /// Creates new application state and wires up the services
    pub fn new(db: PgPool, config: Config) -> Self {
        let sessions = SessionTokenManager::new(db.clone());
        let reset_tokens = PasswordResetTokenManager::with_ttl(
            db.clone(),
            config.reset.secret.clone(),
            Duration::minutes(config.reset.ttl_minutes),
        );

        let accounts = AccountService::new(db.clone(), sessions, reset_tokens);
        let geofences = GeofenceLifecycle::new(db.clone());
        let attendance = AttendanceRecorder::new(db.clone());
        let notifier = Notifier::new(config.api.base_url.clone());

        Self {
            db,
            config: Arc::new(config),
            accounts,
            geofences,
            attendance,
            notifier,
        }
    }
}

/// The authenticated user, injected by the session middleware
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Requires that the current user holds the admin role
///
/// # Errors
///
/// Returns `ApiError::Forbidden` for a student account.
pub fn require_admin(user: &User) -> Result<(), ApiError> {
    if user.role != UserRole::Admin {
        return Err(ApiError::Forbidden(
            "Admin role required for this operation.".to_string(),
        ));
    }

    Ok(())
}

/// Requires that the current user holds the student role
///
/// Attendance recording is a student act; an admin checking into their
/// own class would corrupt the attendance sheet.
///
/// # Errors
///
/// Returns `ApiError::Forbidden` for an admin account.
pub fn require_student(user: &User) -> Result<(), ApiError> {
    if user.role != UserRole::Student {
        return Err(ApiError::Forbidden(
            "Student role required for this operation.".to_string(),
        ));
    }

    Ok(())
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                           # Health check (public)
/// └── /v1/                              # API v1 (versioned)
///     ├── /auth/                        # Public account endpoints
///     │   ├── POST /register
///     │   ├── POST /login
///     │   ├── POST /forgot-password
///     │   └── POST /reset-password
///     ├── /geofences/                   # Session-authenticated
///     │   ├── POST /                    # Create (admin)
///     │   ├── GET  /                    # List (any session)
///     │   ├── GET  /by-name/:name       # Lookup by name + ?date (admin)
///     │   ├── POST /by-name/:name/deactivate        # (admin)
///     │   ├── GET  /code/:join_code     # Lookup by join code
///     │   └── GET  /code/:join_code/attendances     # (creator)
///     └── /attendance/                  # Session-authenticated
///         ├── POST /record              # Record attendance (student)
///         └── GET  /me                  # Own records
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Session authentication (per-route group)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Account routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/forgot-password", post(routes::auth::forgot_password))
        .route("/reset-password", post(routes::auth::reset_password));

    // Geofence routes (require a session)
    let geofence_routes = Router::new()
        .route("/", post(routes::geofence::create_geofence))
        .route("/", get(routes::geofence::list_geofences))
        .route("/by-name/:name", get(routes::geofence::get_by_name))
        .route(
            "/by-name/:name/deactivate",
            post(routes::geofence::deactivate_geofence),
        )
        .route("/code/:join_code", get(routes::geofence::get_by_join_code))
        .route(
            "/code/:join_code/attendances",
            get(routes::geofence::list_attendances),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    // Attendance routes (require a session)
    let attendance_routes = Router::new()
        .route("/record", post(routes::attendance::record_attendance))
        .route("/me", get(routes::attendance::my_records))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/geofences", geofence_routes)
        .nest("/attendance", attendance_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Session authentication middleware layer
///
/// Extracts the bearer token from the Authorization header, resolves it
/// to a user through a durable lookup, and injects [`CurrentUser`] into
/// request extensions. Revocation therefore takes effect on the next
/// request, with no token cache to lag behind.
async fn session_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

    let user = state.accounts.authenticate(token).await?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: UserRole) -> User {
        User {
            matric: "AVE/2024/001".to_string(),
            email: "a@example.edu".to_string(),
            username: "Ada".to_string(),
            role,
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&user(UserRole::Admin)).is_ok());
        assert!(matches!(
            require_admin(&user(UserRole::Student)),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn test_require_student() {
        assert!(require_student(&user(UserRole::Student)).is_ok());
        assert!(matches!(
            require_student(&user(UserRole::Admin)),
            Err(ApiError::Forbidden(_))
        ));
    }
}
