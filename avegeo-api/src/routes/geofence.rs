/// Geofence endpoints
///
/// # Endpoints
///
/// - `POST /v1/geofences` - Create a geofence (admin)
/// - `GET  /v1/geofences` - List geofences (`?mine=true` for own)
/// - `GET  /v1/geofences/by-name/:name?date=YYYY-MM-DD` - Lookup (admin)
/// - `POST /v1/geofences/by-name/:name/deactivate` - Deactivate (creator)
/// - `GET  /v1/geofences/code/:join_code` - Lookup by join code
/// - `GET  /v1/geofences/code/:join_code/attendances` - List (creator)
///
/// All routes here sit behind the session middleware; role and
/// ownership checks are applied per handler.

use crate::{
    app::{require_admin, AppState, CurrentUser},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use avegeo_shared::models::attendance::AttendanceEntry;
use avegeo_shared::models::geofence::Geofence;
use avegeo_shared::services::geofence::{CreateGeofenceRequest, CreatedGeofence};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create-geofence request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGeofenceBody {
    /// Class or event name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// When attendance opens (any offset; stored as UTC)
    pub start_time: DateTime<FixedOffset>,

    /// When attendance closes
    pub end_time: DateTime<FixedOffset>,

    /// Center latitude in degrees
    pub latitude: f64,

    /// Center longitude in degrees
    pub longitude: f64,

    /// Radius in meters
    pub radius_m: f64,
}

/// List query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Restrict the listing to geofences the caller created
    #[serde(default)]
    pub mine: bool,
}

/// By-name lookup and deactivation both key on the start date
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    /// Start date of the geofence (YYYY-MM-DD, UTC)
    pub date: NaiveDate,
}

/// Plain confirmation message
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Create a geofence
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an admin
/// - `422 Unprocessable Entity`: Bad coordinates, radius, or window
/// - `409 Conflict`: Name already used on this date
pub async fn create_geofence(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<CreateGeofenceBody>,
) -> ApiResult<Json<CreatedGeofence>> {
    require_admin(&user)?;
    body.validate().map_err(ApiError::from)?;

    let created = state
        .geofences
        .create(
            &user.matric,
            CreateGeofenceRequest {
                name: body.name,
                start_time: body.start_time,
                end_time: body.end_time,
                latitude: body.latitude,
                longitude: body.longitude,
                radius_m: body.radius_m,
            },
        )
        .await?;

    Ok(Json(created))
}

/// List geofences
///
/// Open to any authenticated user; students browse the listing to find
/// their class. `?mine=true` restricts it to geofences the caller
/// created.
///
/// # Errors
///
/// - `404 Not Found`: No geofences match
pub async fn list_geofences(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Geofence>>> {
    let creator = query.mine.then_some(user.matric.as_str());
    let geofences = state.geofences.list(creator).await?;

    Ok(Json(geofences))
}

/// Lookup a geofence by name and start date
pub async fn get_by_name(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(name): Path<String>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Json<Geofence>> {
    require_admin(&user)?;

    let geofence = state.geofences.get_by_name_and_date(&name, query.date).await?;
    Ok(Json(geofence))
}

/// Deactivate a geofence
///
/// One-way transition, creator-only.
///
/// # Errors
///
/// - `404 Not Found`: No geofence with this name on this date
/// - `409 Conflict`: Already inactive
/// - `403 Forbidden`: Caller is not the creator
pub async fn deactivate_geofence(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(name): Path<String>,
    Json(body): Json<DateQuery>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(&user)?;

    state
        .geofences
        .deactivate(&name, body.date, &user.matric)
        .await?;

    Ok(Json(MessageResponse {
        message: format!("Geofence {} deactivated.", name),
    }))
}

/// Lookup a geofence by its join code
///
/// Open to any authenticated user; students use it to confirm the
/// class a code points at before recording attendance.
pub async fn get_by_join_code(
    State(state): State<AppState>,
    Path(join_code): Path<String>,
) -> ApiResult<Json<Geofence>> {
    let geofence = state.geofences.get_by_join_code(&join_code).await?;
    Ok(Json(geofence))
}

/// List everyone who recorded attendance for a geofence
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not the creator
/// - `404 Not Found`: Unknown code, or no records yet
pub async fn list_attendances(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(join_code): Path<String>,
) -> ApiResult<Json<Vec<AttendanceEntry>>> {
    let entries = state
        .attendance
        .list_attendances(&join_code, &user.matric)
        .await?;

    Ok(Json(entries))
}
