/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Account endpoints (register, login, password reset)
/// - `geofence`: Geofence lifecycle and attendance listings
/// - `attendance`: Attendance recording and own-record queries

pub mod attendance;
pub mod auth;
pub mod geofence;
pub mod health;
