//! # AveGeo Shared Library
//!
//! Core types and business logic for the AveGeo attendance platform,
//! shared by the API server and any future binaries.
//!
//! ## Module Organization
//!
//! - `models`: Database models and row-level queries
//! - `auth`: Passwords, sessions, reset tokens, ownership checks
//! - `geo`: Geofence membership geometry and join codes
//! - `services`: Orchestration over models, auth, and geo
//! - `db`: Connection pooling and migrations
//! - `error`: Common error types

pub mod auth;
pub mod db;
pub mod error;
pub mod geo;
pub mod models;
pub mod services;

/// Current version of the AveGeo shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
