//! Directory-backed session store.
//!
//! The filesystem is the only source of truth: a session exists exactly when
//! a directory named after its id exists under the store root. Clones land in
//! a hidden staging directory and are renamed into place on success; deletes
//! rename the session to a hidden tombstone before removing it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::listing;
use super::types::{FileEntry, Session, SessionError, SessionId, SessionSummary};
use super::validate;
use crate::infrastructure::audit::{self, AuditEvent};
use crate::infrastructure::config::CloneSettings;
use crate::vcs::RepositoryCloner;

const STAGING_PREFIX: &str = ".staging-";
const TRASH_PREFIX: &str = ".trash-";
const CLEANUP_ATTEMPTS: u32 = 3;
const CLEANUP_BACKOFF: Duration = Duration::from_millis(100);

/// Registry of sessions rooted at a single directory.
#[derive(Clone)]
pub struct SessionStore {
    root: PathBuf,
    cloner: Arc<dyn RepositoryCloner>,
    clone_timeout: Duration,
    default_branch: String,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("root", &self.root)
            .field("cloner", &self.cloner)
            .field("clone_timeout", &self.clone_timeout)
            .field("default_branch", &self.default_branch)
            .finish()
    }
}

impl SessionStore {
    /// Opens (creating if needed) the store rooted at `root`.
    ///
    /// Leftover staging and tombstone directories from an earlier run are
    /// removed; session directories are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be created or canonicalized.
    #[instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn open(
        root: impl AsRef<Path>,
        cloner: Arc<dyn RepositoryCloner>,
        settings: &CloneSettings,
    ) -> Result<Self, SessionError> {
        let root = root.as_ref();
        fs::create_dir_all(root).map_err(|e| {
            SessionError::internal(format!("failed to create {}", root.display()), e)
        })?;
        let root = dunce::canonicalize(root).map_err(|e| {
            SessionError::internal(format!("failed to canonicalize {}", root.display()), e)
        })?;

        let store = Self {
            root,
            cloner,
            clone_timeout: Duration::from_secs(settings.timeout_secs),
            default_branch: settings.default_branch.clone(),
        };
        store.reconcile();
        Ok(store)
    }

    /// Canonical store root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Clones `repository_url` into a new session.
    ///
    /// `branch` falls back to the configured default branch. On any failure
    /// no directory is left behind.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URL or branch is malformed (nothing is spawned or created)
    /// - The clone fails, is classified, or times out
    /// - Partial output cannot be removed or the session cannot be published
    #[instrument(skip(self, repository_url), fields(session_id = tracing::field::Empty))]
    pub async fn create(
        &self,
        repository_url: &str,
        branch: Option<&str>,
    ) -> Result<Session, SessionError> {
        let url = validate::repository_url(repository_url)?;
        let branch = match branch {
            Some(branch) => validate::branch(branch)?,
            None => self.default_branch.as_str(),
        };

        let id = SessionId::generate();
        tracing::Span::current().record("session_id", id.as_str());
        let staging = self.root.join(format!("{STAGING_PREFIX}{id}"));
        let target = self.root.join(id.as_str());
        let guard = StagingGuard::new(staging.clone());

        info!(url = %url, branch, "cloning repository");
        let started = Instant::now();
        let outcome = match tokio::time::timeout(
            self.clone_timeout,
            self.cloner
                .clone_repository(&url, branch, &staging, self.clone_timeout),
        )
        .await
        {
            Ok(result) => result.map_err(|e| SessionError::from_clone(e, url.as_str())),
            Err(_) => Err(SessionError::CloneTimeout(self.clone_timeout.as_secs())),
        };
        histogram!("clonebox_clone_duration_seconds").record(started.elapsed().as_secs_f64());

        if let Err(err) = outcome {
            counter!("clonebox_clones_total", "outcome" => err.kind().as_str()).increment(1);
            warn!(error = %err, "clone failed");
            discard(&staging).await?;
            guard.disarm();
            return Err(err);
        }

        if let Err(e) = tokio::fs::rename(&staging, &target).await {
            error!(error = %e, "failed to publish cloned session");
            discard(&staging).await?;
            guard.disarm();
            return Err(SessionError::internal(
                format!("failed to publish session {id}"),
                e,
            ));
        }

        guard.disarm();

        counter!("clonebox_clones_total", "outcome" => "cloned").increment(1);
        info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            "repository cloned"
        );
        audit::log_audit(&AuditEvent::SessionCreated {
            session_id: id.to_string(),
            repository: url.to_string(),
            branch: branch.to_string(),
        });

        Ok(Session {
            id,
            root_path: target,
        })
    }

    /// Whether a session directory exists for `id`.
    #[must_use]
    pub fn exists(&self, id: &str) -> bool {
        self.session_dir(id).is_some_and(|path| path.is_dir())
    }

    /// Looks up an existing session.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` if the id is malformed or has no directory.
    pub fn session(&self, id: &str) -> Result<Session, SessionError> {
        let parsed = SessionId::parse(id).ok_or_else(|| not_found(id))?;
        let root_path = self.root.join(parsed.as_str());
        if !root_path.is_dir() {
            return Err(not_found(id));
        }
        Ok(Session {
            id: parsed,
            root_path,
        })
    }

    /// Lists every file and directory in the session except `.git`.
    ///
    /// Order is depth-first with siblings sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` if the session is absent, or an internal
    /// error if traversal fails for another reason.
    #[instrument(skip(self))]
    pub fn list(&self, id: &str) -> Result<Vec<FileEntry>, SessionError> {
        let session = self.session(id)?;
        listing::collect_entries(&session.root_path).map_err(|e| {
            if session.root_path.is_dir() {
                SessionError::internal(format!("failed to list session {id}"), e.into())
            } else {
                not_found(id)
            }
        })
    }

    /// Deletes the session directory.
    ///
    /// The directory is renamed to a hidden tombstone first, so the session
    /// disappears atomically for every other caller.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` if absent, or an internal error if the
    /// directory cannot be removed.
    #[instrument(skip(self))]
    pub fn delete(&self, id: &str) -> Result<(), SessionError> {
        let session = self.session(id)?;
        let tombstone = self
            .root
            .join(format!("{TRASH_PREFIX}{id}-{}", Uuid::new_v4().simple()));

        match fs::rename(&session.root_path, &tombstone) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found(id)),
            Err(e) => {
                return Err(SessionError::internal(
                    format!("failed to delete session {id}"),
                    e,
                ))
            }
        }

        fs::remove_dir_all(&tombstone).map_err(|e| {
            SessionError::internal(format!("failed to remove files of session {id}"), e)
        })?;

        counter!("clonebox_sessions_deleted_total").increment(1);
        info!("session deleted");
        audit::log_audit(&AuditEvent::SessionDeleted {
            session_id: id.to_string(),
        });
        Ok(())
    }

    /// Summarizes every session under the root, sorted by id.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the root or a session cannot be read.
    #[instrument(skip(self))]
    pub fn enumerate_all(&self) -> Result<Vec<SessionSummary>, SessionError> {
        let mut summaries = Vec::new();

        for (id, path) in self.session_dirs()? {
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(SessionError::internal(
                        format!("failed to stat session {id}"),
                        e,
                    ))
                }
            };
            let created_at: DateTime<Utc> = metadata
                .created()
                .or_else(|_| metadata.modified())
                .map_err(|e| {
                    SessionError::internal(format!("failed to read timestamps of {id}"), e)
                })?
                .into();

            let total_size_bytes = match listing::total_size(&path) {
                Ok(total) => total,
                Err(_) if !path.is_dir() => continue,
                Err(e) => {
                    return Err(SessionError::internal(
                        format!("failed to measure session {id}"),
                        e.into(),
                    ))
                }
            };

            summaries.push(SessionSummary {
                id,
                created_at,
                total_size_bytes,
            });
        }

        Ok(summaries)
    }

    /// Number of session directories under the root.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the root cannot be read.
    pub fn count(&self) -> Result<usize, SessionError> {
        Ok(self.session_dirs()?.len())
    }

    fn session_dir(&self, id: &str) -> Option<PathBuf> {
        SessionId::parse(id).map(|id| self.root.join(id.as_str()))
    }

    /// Session directories under the root, sorted by id.
    fn session_dirs(&self) -> Result<Vec<(SessionId, PathBuf)>, SessionError> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            SessionError::internal(format!("failed to read {}", self.root.display()), e)
        })?;

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SessionError::internal(format!("failed to read {}", self.root.display()), e)
            })?;
            let Some(id) = entry.file_name().to_str().and_then(SessionId::parse) else {
                continue;
            };
            let path = entry.path();
            if path.is_dir() {
                dirs.push((id, path));
            }
        }
        dirs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(dirs)
    }

    /// Removes staging and tombstone directories left by an interrupted run.
    fn reconcile(&self) {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "failed to scan store root for leftovers");
                return;
            }
        };

        let mut cleaned = 0usize;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !(name.starts_with(STAGING_PREFIX) || name.starts_with(TRASH_PREFIX)) {
                continue;
            }
            let path = entry.path();
            match fs::remove_dir_all(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "removed leftover directory");
                    cleaned += 1;
                }
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove leftover directory"),
            }
        }

        if cleaned > 0 {
            info!(cleaned, "cleaned up leftover staging and tombstone directories");
        }
    }
}

/// Removes a staging directory when `create` is dropped before it finishes,
/// e.g. on client disconnect. Disarmed once the directory is published or
/// already cleaned up.
struct StagingGuard {
    path: Option<PathBuf>,
}

impl StagingGuard {
    fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn disarm(mut self) {
        self.path = None;
    }
}

impl Drop for StagingGuard {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        warn!(path = %path.display(), "clone abandoned, removing staging directory");

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                // `discard` logs its own failure.
                let _ = discard(&path).await;
            });
        } else if let Err(e) = fs::remove_dir_all(&path) {
            if e.kind() != io::ErrorKind::NotFound {
                error!(path = %path.display(), error = %e, "failed to remove staging directory");
            }
        }
    }
}

fn not_found(id: &str) -> SessionError {
    SessionError::SessionNotFound(id.to_string())
}

/// Removes partial clone output, retrying briefly for killed helpers that
/// are still flushing into the directory.
async fn discard(path: &Path) -> Result<(), SessionError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match tokio::fs::remove_dir_all(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "removed partial clone");
                return Ok(());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) if attempt >= CLEANUP_ATTEMPTS => {
                error!(path = %path.display(), error = %e, "failed to remove partial clone");
                return Err(SessionError::internal(
                    format!("failed to remove partial clone {}", path.display()),
                    e,
                ));
            }
            Err(e) => {
                debug!(attempt, error = %e, "retrying partial clone removal");
                tokio::time::sleep(CLEANUP_BACKOFF).await;
            }
        }
    }
}
