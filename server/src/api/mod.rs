//! REST API for the clonebox service.
//!
//! This module provides HTTP endpoints for cloning repositories into
//! sessions, browsing and reading their files, and removing them.

pub mod sessions;

pub use sessions::routes as session_routes;
pub use sessions::ApiError;
