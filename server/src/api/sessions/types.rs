//! Request/Response Types for Session API
//!
//! This module provides DTOs for clone, listing, and cleanup operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workspace::{FileEntry, Session, SessionSummary};

/// Request to clone a repository into a new session.
#[derive(Debug, Clone, Deserialize)]
pub struct CloneRequest {
    /// Repository URL (http or https).
    pub repo_url: String,
    /// Branch to clone; the configured default when absent.
    #[serde(default)]
    pub branch: Option<String>,
}

/// Clone response payload.
#[derive(Debug, Clone, Serialize)]
pub struct CloneResponse {
    /// New session identifier.
    pub session_id: String,
    /// Always `cloned`.
    pub status: String,
    /// API path listing the session's files.
    pub repo_path: String,
    /// Human-readable outcome.
    pub message: String,
}

/// File listing response payload.
#[derive(Debug, Clone, Serialize)]
pub struct FilesResponse {
    /// Session that was listed.
    pub session_id: String,
    /// Every file and directory, `.git` excluded.
    pub files: Vec<FileEntry>,
}

/// Cleanup response payload.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Session that was removed.
    pub session_id: String,
    /// Always `deleted`.
    pub status: String,
    /// Human-readable outcome.
    pub message: String,
}

/// One entry of the session enumeration.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    /// Session identifier.
    pub session_id: String,
    /// Directory creation time.
    pub created_at: DateTime<Utc>,
    /// Total size of the session's files in bytes.
    pub size_bytes: u64,
    /// Total size in mebibytes.
    pub size_mb: f64,
}

/// Session enumeration response payload.
#[derive(Debug, Clone, Serialize)]
pub struct SessionsResponse {
    /// Number of sessions on disk.
    pub active_sessions: usize,
    /// Per-session details.
    pub sessions: Vec<SessionInfo>,
}

/// Health check response payload.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Root directory holding the sessions.
    pub repos_dir: String,
    /// Number of sessions on disk.
    pub active_sessions: usize,
}

/// Service banner payload.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    /// Service name.
    pub service: String,
    /// Crate version.
    pub version: String,
    /// Always `online`.
    pub status: String,
}

/// Convert a freshly created session to its API response.
#[must_use]
pub fn session_to_response(session: &Session) -> CloneResponse {
    CloneResponse {
        session_id: session.id.to_string(),
        status: "cloned".to_string(),
        repo_path: format!("/files/{}", session.id),
        message: "Repository cloned successfully".to_string(),
    }
}

/// Convert an enumeration summary to its API response.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summary_to_response(summary: SessionSummary) -> SessionInfo {
    SessionInfo {
        session_id: summary.id.to_string(),
        created_at: summary.created_at,
        size_bytes: summary.total_size_bytes,
        size_mb: summary.total_size_bytes as f64 / (1024.0 * 1024.0),
    }
}
