//! Read access to files inside a session.

use std::io;
use std::path::PathBuf;

use metrics::counter;
use tokio::fs::File;
use tracing::{instrument, warn};

use super::policy::{PathResolver, PolicyError};
use super::store::SessionStore;
use super::types::SessionError;
use crate::infrastructure::audit::{self, AuditEvent};

/// An open file handle plus the metadata needed to serve it.
#[derive(Debug)]
pub struct OpenedFile {
    /// Open handle on the resolved path.
    pub file: File,
    /// Final path component, for a content-disposition filename.
    pub name: String,
    /// Size in bytes at open time.
    pub size: u64,
}

impl SessionStore {
    /// Resolves `relative_path` inside the session and checks it names a file.
    ///
    /// Returns the canonical path that passed the containment check.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The session does not exist
    /// - The path escapes the session or cannot be canonicalized
    /// - The target does not exist or is a directory
    pub fn locate_file(&self, id: &str, relative_path: &str) -> Result<PathBuf, SessionError> {
        let session = self.session(id)?;

        let resolver = PathResolver::new(&session.root_path).map_err(|e| match e {
            PolicyError::InvalidRoot { .. } => SessionError::SessionNotFound(id.to_string()),
            other => other.into(),
        })?;

        let path = resolver.resolve(relative_path).map_err(|e| {
            if let PolicyError::AccessDenied { target, .. } = &e {
                warn!(
                    session_id = id,
                    requested = relative_path,
                    target = %target.display(),
                    "path escapes session root"
                );
                counter!("clonebox_access_denied_total").increment(1);
                audit::log_audit(&AuditEvent::AccessDenied {
                    session_id: id.to_string(),
                    requested_path: relative_path.to_string(),
                });
            }
            SessionError::from(e)
        })?;

        match std::fs::metadata(&path) {
            Ok(metadata) if metadata.is_dir() => {
                Err(SessionError::IsADirectory(relative_path.to_string()))
            }
            Ok(_) => Ok(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(SessionError::FileNotFound(relative_path.to_string()))
            }
            Err(e) => Err(SessionError::internal(
                format!("failed to stat {relative_path}"),
                e,
            )),
        }
    }

    /// Opens a file inside the session for streaming.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`SessionStore::locate_file`], plus an internal
    /// error if the file cannot be opened.
    #[instrument(skip(self))]
    pub async fn read_file(
        &self,
        id: &str,
        relative_path: &str,
    ) -> Result<OpenedFile, SessionError> {
        let store = self.clone();
        let (owned_id, owned_path) = (id.to_string(), relative_path.to_string());
        let path = tokio::task::spawn_blocking(move || store.locate_file(&owned_id, &owned_path))
            .await
            .map_err(|e| SessionError::internal("file lookup task failed", io::Error::other(e)))??;

        let file = File::open(&path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SessionError::FileNotFound(relative_path.to_string()),
            _ => SessionError::internal(format!("failed to open {relative_path}"), e),
        })?;
        let metadata = file
            .metadata()
            .await
            .map_err(|e| SessionError::internal(format!("failed to stat {relative_path}"), e))?;
        if metadata.is_dir() {
            return Err(SessionError::IsADirectory(relative_path.to_string()));
        }

        let name = path
            .file_name()
            .map_or_else(|| "file".to_string(), |n| n.to_string_lossy().into_owned());

        counter!("clonebox_file_reads_total").increment(1);
        Ok(OpenedFile {
            file,
            name,
            size: metadata.len(),
        })
    }
}
