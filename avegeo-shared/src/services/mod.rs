/// Core services
///
/// Orchestration over the models, auth, and geo layers. Each service is
/// an explicitly constructed instance owning a pool handle; nothing is
/// process-global, so tests can build services against substitute
/// state.
///
/// - `geofence`: geofence lifecycle (create, query, deactivate)
/// - `attendance`: attendance recording and creator-facing listings
/// - `account`: registration, login, and the password-reset flow

pub mod account;
pub mod attendance;
pub mod geofence;
