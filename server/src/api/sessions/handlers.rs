//! API Handler implementations for session management.
//!
//! This module provides HTTP request handlers for session operations.

use axum::{
    body::Body,
    extract::{Json, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

use crate::api::sessions::types::{
    session_to_response, summary_to_response, CloneRequest, CloneResponse, DeleteResponse,
    FilesResponse, HealthResponse, ServiceInfo, SessionsResponse,
};
use crate::state::AppState;
use crate::workspace::{ErrorKind, SessionError, SessionStore};

/// API errors for session operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Domain-level session error.
    #[error("{0}")]
    Session(#[from] SessionError),
    /// A blocking filesystem task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(String),
}

impl ApiError {
    /// Stable category of the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Session(err) => err.kind(),
            ApiError::Task(_) => ErrorKind::InternalFailure,
        }
    }
}

/// HTTP status used for each error category.
#[must_use]
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput | ErrorKind::InvalidPath | ErrorKind::IsADirectory => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::SessionNotFound
        | ErrorKind::RepositoryNotFound
        | ErrorKind::BranchNotFound
        | ErrorKind::FileNotFound => StatusCode::NOT_FOUND,
        ErrorKind::AccessDenied => StatusCode::FORBIDDEN,
        ErrorKind::CloneTimeout => StatusCode::REQUEST_TIMEOUT,
        ErrorKind::CloneFailed | ErrorKind::InternalFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = status_for(kind);
        let message = self.to_string();

        if status.is_server_error() {
            error!(error_type = kind.as_str(), error = %message, "request failed");
        } else {
            debug!(error_type = kind.as_str(), error = %message, "request rejected");
        }

        let body = Json(json!({
            "error": message,
            "error_type": kind.as_str(),
        }));

        (status, body).into_response()
    }
}

/// Runs a synchronous store operation on the blocking pool.
async fn blocking<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&SessionStore) -> Result<T, SessionError> + Send + 'static,
    T: Send + 'static,
{
    let store = state.store().clone();
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|e| ApiError::Task(e.to_string()))?
        .map_err(ApiError::from)
}

/// GET /
///
/// Returns the service banner.
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "Clonebox Git Service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "online".to_string(),
    })
}

/// GET /health
///
/// Returns health status, the storage root, and the session count.
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, ApiError> {
    let active_sessions = blocking(&state, SessionStore::count).await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        repos_dir: state.store().root().display().to_string(),
        active_sessions,
    }))
}

/// POST /clone
///
/// Clone a repository into a new session.
pub async fn clone_repository(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CloneRequest>,
) -> Result<Json<CloneResponse>, ApiError> {
    let session = state
        .store()
        .create(&req.repo_url, req.branch.as_deref())
        .await?;

    Ok(Json(session_to_response(&session)))
}

/// GET /files/{session_id}
///
/// List every file in the session, `.git` excluded.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<FilesResponse>, ApiError> {
    let id = session_id.clone();
    let files = blocking(&state, move |store| store.list(&id)).await?;

    Ok(Json(FilesResponse { session_id, files }))
}

/// GET /files/{session_id}/{*file_path}
///
/// Stream one file's bytes verbatim as an attachment.
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path((session_id, file_path)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let opened = state.store().read_file(&session_id, &file_path).await?;

    let headers = [
        (header::CONTENT_TYPE, "text/plain".to_string()),
        (header::CONTENT_DISPOSITION, content_disposition(&opened.name)),
        (header::CONTENT_LENGTH, opened.size.to_string()),
    ];
    let body = Body::from_stream(ReaderStream::new(opened.file));

    Ok((StatusCode::OK, headers, body).into_response())
}

/// DELETE /cleanup/{session_id}
///
/// Delete a session and all of its files.
pub async fn cleanup_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = session_id.clone();
    blocking(&state, move |store| store.delete(&id)).await?;

    Ok(Json(DeleteResponse {
        session_id,
        status: "deleted".to_string(),
        message: "Repository cleaned up successfully".to_string(),
    }))
}

/// GET /sessions
///
/// List all sessions on disk with their creation time and size.
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let summaries = blocking(&state, SessionStore::enumerate_all).await?;

    let sessions: Vec<_> = summaries.into_iter().map(summary_to_response).collect();
    Ok(Json(SessionsResponse {
        active_sessions: sessions.len(),
        sessions,
    }))
}

/// Attachment disposition with an ASCII fallback name and an RFC 5987
/// `filename*` carrying the exact UTF-8 name.
fn content_disposition(name: &str) -> String {
    let fallback = header_safe(name);
    if fallback == name {
        format!("attachment; filename=\"{fallback}\"")
    } else {
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            urlencoding::encode(name)
        )
    }
}

/// Replaces characters that cannot appear in a quoted header parameter.
fn header_safe(name: &str) -> String {
    name.chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_status() {
        assert_eq!(status_for(ErrorKind::InvalidInput), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::SessionNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::AccessDenied), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(ErrorKind::CloneTimeout),
            StatusCode::REQUEST_TIMEOUT
        );
        assert_eq!(
            status_for(ErrorKind::CloneFailed),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_for(ErrorKind::IsADirectory), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn ascii_names_use_plain_filename() {
        assert_eq!(
            content_disposition("README.md"),
            "attachment; filename=\"README.md\""
        );
    }

    #[test]
    fn non_ascii_names_carry_encoded_filename() {
        assert_eq!(
            content_disposition("naïve.rs"),
            "attachment; filename=\"na_ve.rs\"; filename*=UTF-8''na%C3%AFve.rs"
        );
        assert_eq!(
            content_disposition("say \"hi\".txt"),
            "attachment; filename=\"say _hi_.txt\"; filename*=UTF-8''say%20%22hi%22.txt"
        );
    }

    #[test]
    fn header_safe_strips_quotes_and_non_ascii() {
        assert_eq!(header_safe("README.md"), "README.md");
        assert_eq!(header_safe("my \"file\".txt"), "my _file_.txt");
        assert_eq!(header_safe("naïve\n.rs"), "na_ve_.rs");
    }
}
