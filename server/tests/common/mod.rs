//! Shared fixtures for the HTTP tests.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clonebox_server::infrastructure::config::{CloneSettings, CorsSettings};
use clonebox_server::infrastructure::server::{build_router, cors_layer};
use clonebox_server::state::AppState;
use clonebox_server::vcs::{CloneError, RepositoryCloner};
use clonebox_server::workspace::SessionStore;
use tempfile::TempDir;
use url::Url;

/// Cloner that writes a fixed tree, or fails the way its URL asks it to.
///
/// URLs ending in `/missing` report a missing repository, `/private` an
/// access denial, and branch `ghost` a missing branch.
#[derive(Debug, Default)]
pub struct FixtureCloner;

#[async_trait]
impl RepositoryCloner for FixtureCloner {
    async fn clone_repository(
        &self,
        url: &Url,
        branch: &str,
        destination: &Path,
        _timeout: Duration,
    ) -> Result<(), CloneError> {
        if url.path().ends_with("/missing") {
            return Err(CloneError::RepositoryNotFound);
        }
        if url.path().ends_with("/private") {
            return Err(CloneError::AccessDenied);
        }
        if branch == "ghost" {
            return Err(CloneError::BranchNotFound {
                branch: branch.to_string(),
            });
        }

        let io = |source| CloneError::Io {
            context: "fixture write failed".to_string(),
            source,
        };
        fs::create_dir_all(destination.join(".git")).map_err(io)?;
        fs::create_dir_all(destination.join("docs")).map_err(io)?;
        fs::write(destination.join(".git/config"), "[core]\n").map_err(io)?;
        fs::write(destination.join("README.md"), "# Hello\n").map_err(io)?;
        fs::write(destination.join("docs/guide.txt"), "guide").map_err(io)?;
        Ok(())
    }
}

/// A router over a fresh store in a temporary directory.
pub struct TestApp {
    /// Keeps the store root alive.
    pub dir: TempDir,
    /// Router with every route mounted.
    pub router: axum::Router,
}

/// Builds an app backed by [`FixtureCloner`].
pub fn app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::open(
        dir.path(),
        Arc::new(FixtureCloner),
        &CloneSettings::default(),
    )
    .unwrap();
    let state = Arc::new(AppState::new(store));
    let router = build_router(state, cors_layer(&CorsSettings::default()).unwrap(), None);
    TestApp { dir, router }
}
