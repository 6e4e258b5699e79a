//! Audit logging for security-relevant events.

use serde::Serialize;
use tracing::{info, info_span};

/// Domain event for audit logging.
/// Structured for JSON serialization to enable machine-readable audit trails.
#[derive(Debug, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// The service started.
    SystemStartup {
        /// Component that started.
        component: String,
    },
    /// The service is shutting down.
    SystemShutdown {
        /// Why it stopped.
        reason: String,
    },
    /// A repository was cloned into a new session.
    SessionCreated {
        /// New session id.
        session_id: String,
        /// Repository URL that was cloned.
        repository: String,
        /// Branch that was cloned.
        branch: String,
    },
    /// A session and its files were removed.
    SessionDeleted {
        /// Deleted session id.
        session_id: String,
    },
    /// A path resolved outside its session.
    AccessDenied {
        /// Session the request targeted.
        session_id: String,
        /// Path as supplied by the caller.
        requested_path: String,
    },
}

/// Logs an audit event to the dedicated audit channel as structured JSON.
/// This uses a specific `target` which can be filtered by the subscriber to redirect to a secure file.
pub fn log_audit(event: &AuditEvent) {
    let span = info_span!(target: "audit", "audit_event");
    let _enter = span.enter();

    let json = serde_json::to_string(event).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"));
    info!(target: "audit", audit_json = %json, "Security Audit Event");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_snake_case_tags() -> anyhow::Result<()> {
        let json = serde_json::to_value(AuditEvent::AccessDenied {
            session_id: "sess_0123".into(),
            requested_path: "../../etc/passwd".into(),
        })?;

        assert_eq!(json["event_type"], "access_denied");
        assert_eq!(json["requested_path"], "../../etc/passwd");
        Ok(())
    }

    #[test]
    fn test_log_audit_variants() {
        // These calls should not panic
        log_audit(&AuditEvent::SystemStartup {
            component: "Test".into(),
        });
        log_audit(&AuditEvent::SystemShutdown {
            reason: "Testing".into(),
        });
        log_audit(&AuditEvent::SessionCreated {
            session_id: "sess_0123".into(),
            repository: "https://example.com/repo.git".into(),
            branch: "main".into(),
        });
        log_audit(&AuditEvent::SessionDeleted {
            session_id: "sess_0123".into(),
        });
    }
}
