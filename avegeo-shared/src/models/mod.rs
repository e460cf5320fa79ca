/// Database models
///
/// This module contains all database models and their query operations.
///
/// # Models
///
/// - `user`: User accounts (students and admins, keyed by matric)
/// - `geofence`: Time-boxed circular geofences with join codes
/// - `attendance`: Attendance records, one per (user, geofence)
/// - `session_token`: Opaque login session tokens
/// - `reset_token`: Single-use signed password-reset tokens
///
/// # Example
///
/// ```no_run
/// use avegeo_shared::models::user::{User, CreateUser, UserRole};
/// use avegeo_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     matric: "AVE/2024/001".to_string(),
///     email: "student@example.edu".to_string(),
///     username: "Ada".to_string(),
///     role: UserRole::Student,
///     password_hash: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod attendance;
pub mod geofence;
pub mod reset_token;
pub mod session_token;
pub mod user;
