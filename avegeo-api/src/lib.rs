//! # AveGeo API Server Library
//!
//! HTTP layer for the AveGeo attendance platform.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `notify`: Outbound notifications (reset links, password changes)
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod notify;
pub mod routes;
