//! REST API routes for session management.
//!
//! This module provides HTTP endpoints for cloning, browsing, and deleting
//! repository sessions.

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::api::sessions::handlers::{
    cleanup_session, clone_repository, get_file, health_check, list_files, list_sessions,
    service_info,
};
use crate::state::AppState;

/// API routes for session management.
///
/// Also includes the service banner at `/` and the health check at `/health`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        .route("/clone", post(clone_repository))
        .route("/files/{session_id}", get(list_files))
        .route("/files/{session_id}/{*file_path}", get(get_file))
        .route("/cleanup/{session_id}", delete(cleanup_session))
        .route("/sessions", get(list_sessions))
}
