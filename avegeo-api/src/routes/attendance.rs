/// Attendance endpoints
///
/// # Endpoints
///
/// - `POST /v1/attendance/record` - Record attendance at a position
/// - `GET  /v1/attendance/me` - List the caller's own records
///
/// Recording is idempotent per (geofence, student): a repeat
/// submission answers 409 and leaves exactly one record in place.

use crate::{
    app::{require_student, AppState, CurrentUser},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use avegeo_shared::models::attendance::AttendanceRecord;
use avegeo_shared::services::attendance::RecordedAttendance;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Record-attendance request
#[derive(Debug, Deserialize, Validate)]
pub struct RecordAttendanceBody {
    /// Join code of the geofence
    #[validate(length(min = 1, max = 6, message = "Join code must be 1-6 characters"))]
    pub join_code: String,

    /// Submitted latitude in degrees
    pub latitude: f64,

    /// Submitted longitude in degrees
    pub longitude: f64,
}

/// Record-attendance response
#[derive(Debug, Serialize)]
pub struct RecordAttendanceResponse {
    pub message: String,

    #[serde(flatten)]
    pub recorded: RecordedAttendance,
}

/// Own-records query parameters
#[derive(Debug, Deserialize)]
pub struct MyRecordsQuery {
    /// Optional geofence name filter
    pub geofence_name: Option<String>,
}

/// Record attendance for the authenticated user
///
/// Student-only: admins manage geofences, they do not attend them.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a student
/// - `404 Not Found`: Unknown join code
/// - `409 Conflict`: Geofence not active, or already recorded
/// - `403 Forbidden` (`outside_geofence`): Position outside the circle
/// - `422 Unprocessable Entity`: Malformed coordinates
pub async fn record_attendance(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<RecordAttendanceBody>,
) -> ApiResult<Json<RecordAttendanceResponse>> {
    require_student(&user)?;
    body.validate().map_err(ApiError::from)?;

    let recorded = state
        .attendance
        .record(&user.matric, &body.join_code, body.latitude, body.longitude)
        .await?;

    Ok(Json(RecordAttendanceResponse {
        message: "Attendance recorded.".to_string(),
        recorded,
    }))
}

/// List the caller's own attendance records
///
/// # Errors
///
/// - `404 Not Found`: No records match
pub async fn my_records(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<MyRecordsQuery>,
) -> ApiResult<Json<Vec<AttendanceRecord>>> {
    let records = state
        .accounts
        .my_records(&user.matric, query.geofence_name.as_deref())
        .await?;

    Ok(Json(records))
}
