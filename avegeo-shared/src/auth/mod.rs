/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`session`]: opaque session tokens backed by durable lookups
/// - [`reset`]: signed, single-use password-reset tokens
/// - [`authorization`]: resource-ownership checks
///
/// # Security
///
/// - **Password hashing**: Argon2id, 64 MB memory, 3 iterations
/// - **Session tokens**: random opaque strings; validation always hits
///   storage, so revocation is globally immediate
/// - **Reset tokens**: HS256-signed claims plus a persisted single-use
///   record; at most one live token per user

pub mod authorization;
pub mod password;
pub mod reset;
pub mod session;
