//! Types for workspace session management.
//!
//! This module provides the session identifier, the session and file entry
//! records, and the error taxonomy shared by the store and file access.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::vcs::CloneError;
use crate::workspace::policy::PolicyError;

const SESSION_ID_PREFIX: &str = "sess_";
const SESSION_ID_HEX_LEN: usize = 32;

/// Opaque, unguessable session identifier (`sess_` + 32 lowercase hex digits).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh identifier from a random v4 UUID.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{SESSION_ID_PREFIX}{}", Uuid::new_v4().simple()))
    }

    /// Parses a caller-supplied identifier.
    ///
    /// Returns `None` for anything that is not a well-formed session id, which
    /// keeps separators and dot segments from ever being joined onto the root.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let hex = raw.strip_prefix(SESSION_ID_PREFIX)?;
        let well_formed = hex.len() == SESSION_ID_HEX_LEN
            && hex
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        well_formed.then(|| Self(raw.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cloned repository backed by a single directory under the store root.
#[derive(Debug, Clone)]
pub struct Session {
    /// Session identifier, also the directory name.
    pub id: SessionId,
    /// Absolute path of the session directory.
    pub root_path: PathBuf,
}

/// A file or directory inside a session, relative to the session root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Forward-slash separated path relative to the session root.
    pub path: String,
    /// Size in bytes; zero for directories.
    pub size: u64,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

/// Administrative summary of one session directory.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    /// Session identifier.
    pub id: SessionId,
    /// Creation time taken from directory metadata.
    pub created_at: DateTime<Utc>,
    /// Sum of all regular file sizes in the session, metadata included.
    pub total_size_bytes: u64,
}

/// Stable error categories exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed repository URL or branch.
    InvalidInput,
    /// The requested path could not be canonicalized.
    InvalidPath,
    /// No session with the given id exists.
    SessionNotFound,
    /// The path escapes the session, or the upstream refused access.
    AccessDenied,
    /// The remote repository does not exist.
    RepositoryNotFound,
    /// The requested branch does not exist on the remote.
    BranchNotFound,
    /// The clone did not finish within the configured timeout.
    CloneTimeout,
    /// The clone failed for an unrecognized reason.
    CloneFailed,
    /// A file was requested but the path names a directory.
    IsADirectory,
    /// The resolved path does not exist.
    FileNotFound,
    /// Unexpected filesystem or runtime failure.
    InternalFailure,
}

impl ErrorKind {
    /// Wire name of the category.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::InvalidPath => "invalid_path",
            Self::SessionNotFound => "session_not_found",
            Self::AccessDenied => "access_denied",
            Self::RepositoryNotFound => "repository_not_found",
            Self::BranchNotFound => "branch_not_found",
            Self::CloneTimeout => "clone_timeout",
            Self::CloneFailed => "clone_failed",
            Self::IsADirectory => "is_a_directory",
            Self::FileNotFound => "file_not_found",
            Self::InternalFailure => "internal_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The repository URL or branch was rejected before cloning.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The session ID was not found on disk.
    #[error("Session {0} not found")]
    SessionNotFound(String),
    /// Path resolution failed.
    #[error(transparent)]
    Policy(#[from] PolicyError),
    /// The remote repository does not exist.
    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),
    /// The remote refused access.
    #[error("Access denied - repository may be private: {0}")]
    RepositoryAccessDenied(String),
    /// The branch does not exist on the remote.
    #[error("Branch '{0}' not found")]
    BranchNotFound(String),
    /// The clone exceeded its time budget.
    #[error("Clone operation timed out after {0}s")]
    CloneTimeout(u64),
    /// The clone failed for an unrecognized reason.
    #[error("Clone failed: {0}")]
    CloneFailed(String),
    /// The requested path names a directory.
    #[error("Path is a directory, not a file: {0}")]
    IsADirectory(String),
    /// The requested file does not exist.
    #[error("File {0} not found")]
    FileNotFound(String),
    /// Unexpected I/O failure.
    #[error("{context}: {source}")]
    Internal {
        /// What was being attempted.
        context: String,
        /// Source error.
        #[source]
        source: std::io::Error,
    },
}

impl SessionError {
    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::SessionNotFound(_) => ErrorKind::SessionNotFound,
            Self::Policy(PolicyError::AccessDenied { .. }) | Self::RepositoryAccessDenied(_) => {
                ErrorKind::AccessDenied
            }
            Self::Policy(PolicyError::InvalidPath { .. }) => ErrorKind::InvalidPath,
            Self::Policy(PolicyError::InvalidRoot { .. }) | Self::Internal { .. } => {
                ErrorKind::InternalFailure
            }
            Self::RepositoryNotFound(_) => ErrorKind::RepositoryNotFound,
            Self::BranchNotFound(_) => ErrorKind::BranchNotFound,
            Self::CloneTimeout(_) => ErrorKind::CloneTimeout,
            Self::CloneFailed(_) => ErrorKind::CloneFailed,
            Self::IsADirectory(_) => ErrorKind::IsADirectory,
            Self::FileNotFound(_) => ErrorKind::FileNotFound,
        }
    }

    pub(crate) fn internal(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Internal {
            context: context.into(),
            source,
        }
    }

    /// Maps a cloner failure onto the session taxonomy.
    pub(crate) fn from_clone(err: CloneError, repository: &str) -> Self {
        match err {
            CloneError::RepositoryNotFound => Self::RepositoryNotFound(repository.to_string()),
            CloneError::AccessDenied => Self::RepositoryAccessDenied(repository.to_string()),
            CloneError::BranchNotFound { branch } => Self::BranchNotFound(branch),
            CloneError::TimedOut { after } => Self::CloneTimeout(after.as_secs()),
            CloneError::Failed { stderr } => Self::CloneFailed(stderr),
            CloneError::Io { context, source } => Self::Internal { context, source },
        }
    }
}
