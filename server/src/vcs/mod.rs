//! Version-control capability used to populate sessions.
//!
//! The store only depends on the [`RepositoryCloner`] trait, so tests can
//! substitute a fake and production uses [`GitCloner`].

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub mod git;

pub use git::GitCloner;

/// Outcome of a failed clone, classified from the tool's diagnostics.
#[derive(Debug, Error)]
pub enum CloneError {
    /// The remote repository does not exist.
    #[error("repository not found")]
    RepositoryNotFound,
    /// The remote refused access (private repository or bad credentials).
    #[error("access denied by remote")]
    AccessDenied,
    /// The requested branch does not exist on the remote.
    #[error("branch '{branch}' not found")]
    BranchNotFound {
        /// Branch that was requested.
        branch: String,
    },
    /// The clone did not finish in time and was killed.
    #[error("clone timed out after {}s", after.as_secs())]
    TimedOut {
        /// Time budget that was exceeded.
        after: Duration,
    },
    /// The tool failed for an unrecognized reason.
    #[error("clone failed: {stderr}")]
    Failed {
        /// Trimmed diagnostic output of the tool.
        stderr: String,
    },
    /// The tool could not be launched or awaited.
    #[error("{context}: {source}")]
    Io {
        /// What was being attempted.
        context: String,
        /// Source error.
        #[source]
        source: std::io::Error,
    },
}

/// Fetches a shallow, single-branch snapshot of a remote repository.
#[async_trait]
pub trait RepositoryCloner: Send + Sync + std::fmt::Debug {
    /// Clones `branch` of `url` into `destination`, which must not exist yet.
    ///
    /// Implementations must stop all work they started once `timeout` elapses
    /// or the returned future is dropped. Cleaning up `destination` after a
    /// failure is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns a classified [`CloneError`] when the clone does not complete.
    async fn clone_repository(
        &self,
        url: &Url,
        branch: &str,
        destination: &Path,
        timeout: Duration,
    ) -> Result<(), CloneError>;
}
