//! Containment policy for paths inside a session.
//!
//! Every caller-supplied path is resolved against the canonical session root
//! and rejected unless the canonical result stays inside that root.

use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Errors produced while resolving a path inside a session.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Canonicalization of the requested path failed.
    #[error("Invalid file path '{}': {source}", path.display())]
    InvalidPath {
        /// Path as supplied by the caller.
        path: PathBuf,
        /// Source error.
        #[source]
        source: io::Error,
    },
    /// The requested path resolves outside the session root.
    #[error("Access denied: '{}' resolves outside the session", requested.display())]
    AccessDenied {
        /// Path as supplied by the caller.
        requested: PathBuf,
        /// Canonical target the path resolved to.
        target: PathBuf,
    },
    /// The session root itself could not be canonicalized.
    #[error("Invalid session root '{}': {source}", path.display())]
    InvalidRoot {
        /// Session root path.
        path: PathBuf,
        /// Source error.
        #[source]
        source: io::Error,
    },
}

/// Resolves relative paths against a canonical session root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Creates a resolver for the given session root.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be canonicalized, typically because
    /// it no longer exists.
    pub fn new(root: &Path) -> Result<Self, PolicyError> {
        let root = dunce::canonicalize(root).map_err(|source| PolicyError::InvalidRoot {
            path: root.to_path_buf(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Canonical session root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `relative` to a canonical absolute path inside the session.
    ///
    /// The target does not need to exist; missing trailing components are
    /// applied lexically on top of the deepest existing ancestor.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path cannot be canonicalized
    /// - The canonical path is outside the session root
    pub fn resolve(&self, relative: impl AsRef<Path>) -> Result<PathBuf, PolicyError> {
        let relative = relative.as_ref();
        let joined = self.root.join(relative);

        let target = canonicalize_lenient(&joined).map_err(|source| PolicyError::InvalidPath {
            path: relative.to_path_buf(),
            source,
        })?;

        // Component-wise, so `/repos/sess_a` never admits `/repos/sess_ab`.
        if target.starts_with(&self.root) {
            Ok(target)
        } else {
            Err(PolicyError::AccessDenied {
                requested: relative.to_path_buf(),
                target,
            })
        }
    }
}

/// Canonicalizes `path`, tolerating a missing tail.
fn canonicalize_lenient(path: &Path) -> io::Result<PathBuf> {
    let not_found = match dunce::canonicalize(path) {
        Ok(canonical) => return Ok(canonical),
        Err(e) if e.kind() == io::ErrorKind::NotFound => e,
        Err(e) => return Err(e),
    };

    for ancestor in path.ancestors().skip(1) {
        let mut resolved = match dunce::canonicalize(ancestor) {
            Ok(canonical) => canonical,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        let Ok(tail) = path.strip_prefix(ancestor) else {
            continue;
        };
        let mut climbed = false;
        for component in tail.components() {
            match component {
                Component::Normal(name) => resolved.push(name),
                Component::ParentDir => {
                    resolved.pop();
                    climbed = true;
                }
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }
        // `..` may have climbed back onto existing entries, symlinks included.
        if climbed {
            return canonicalize_lenient(&resolved);
        }
        return Ok(resolved);
    }

    Err(not_found)
}
