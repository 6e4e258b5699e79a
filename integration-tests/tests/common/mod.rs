//! Shared test utilities for integration tests.
//!
//! Builds throwaway git repositories on local disk so clones can run
//! without network access.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::Command;
use url::Url;

/// Whether a usable `git` executable is on `PATH`.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|out| out.status.success())
}

fn git(dir: &Path, args: &[&str]) -> Result<()> {
    let output = Command::new("git")
        .args(["-c", "user.name=Fixture", "-c", "user.email=fixture@example.com"])
        .args(["-c", "commit.gpgsign=false", "-c", "init.defaultBranch=main"])
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("failed to run git {args:?}"))?;
    if !output.status.success() {
        bail!(
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}

/// Creates a repository with one commit on `main` and a `feature` branch.
///
/// `main` holds `README.md` and `src/lib.rs`; `feature` adds `NOTES.md`.
pub fn fixture_repo(parent: &Path) -> Result<PathBuf> {
    let repo = parent.join("fixture");
    std::fs::create_dir_all(repo.join("src"))?;
    git(&repo, &["init", "--quiet"])?;
    git(&repo, &["checkout", "--quiet", "-B", "main"])?;

    std::fs::write(repo.join("README.md"), "# Fixture\n")?;
    std::fs::write(repo.join("src/lib.rs"), "pub fn answer() -> u32 { 42 }\n")?;
    git(&repo, &["add", "."])?;
    git(&repo, &["commit", "--quiet", "-m", "initial"])?;

    git(&repo, &["checkout", "--quiet", "-b", "feature"])?;
    std::fs::write(repo.join("NOTES.md"), "feature notes\n")?;
    git(&repo, &["add", "."])?;
    git(&repo, &["commit", "--quiet", "-m", "notes"])?;
    git(&repo, &["checkout", "--quiet", "main"])?;

    Ok(repo)
}

/// `file://` URL for a local repository path.
pub fn file_url(path: &Path) -> Result<Url> {
    Url::from_file_path(path).map_err(|()| anyhow::anyhow!("not an absolute path: {}", path.display()))
}
