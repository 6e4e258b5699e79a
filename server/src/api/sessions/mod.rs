//! REST API endpoints for repository sessions.
//!
//! A session is one cloned repository on disk. These endpoints create,
//! inspect, read from, and remove sessions.

pub mod handlers;
pub mod routes;
pub mod types;

pub use handlers::ApiError;
pub use routes::routes;
pub use types::{
    CloneRequest, CloneResponse, DeleteResponse, FilesResponse, HealthResponse, ServiceInfo,
    SessionInfo, SessionsResponse,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::{Session, SessionId, SessionSummary};
    use chrono::Utc;
    use std::path::PathBuf;

    #[test]
    fn test_clone_request_branch_is_optional() {
        let req: CloneRequest =
            serde_json::from_str(r#"{"repo_url": "https://example.com/a/b"}"#).unwrap();
        assert_eq!(req.repo_url, "https://example.com/a/b");
        assert!(req.branch.is_none());

        let req: CloneRequest =
            serde_json::from_str(r#"{"repo_url": "https://example.com/a/b", "branch": "dev"}"#)
                .unwrap();
        assert_eq!(req.branch.as_deref(), Some("dev"));
    }

    #[test]
    fn test_clone_request_requires_url() {
        let result: Result<CloneRequest, _> = serde_json::from_str(r#"{"branch": "dev"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_clone_response_points_at_listing() {
        let id = SessionId::generate();
        let session = Session {
            id: id.clone(),
            root_path: PathBuf::from("/tmp/repos").join(id.as_str()),
        };

        let response = types::session_to_response(&session);
        assert_eq!(response.status, "cloned");
        assert_eq!(response.repo_path, format!("/files/{id}"));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["session_id"], id.as_str());
    }

    #[test]
    fn test_summary_reports_size_in_mb() {
        let summary = SessionSummary {
            id: SessionId::generate(),
            created_at: Utc::now(),
            total_size_bytes: 3 * 1024 * 1024,
        };

        let info = types::summary_to_response(summary);
        assert_eq!(info.size_bytes, 3 * 1024 * 1024);
        assert!((info.size_mb - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            repos_dir: "./repos".to_string(),
            active_sessions: 2,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"active_sessions\":2"));
    }
}
