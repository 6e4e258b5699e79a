//! Integration tests for the git cloner.
//!
//! Tests shallow single-branch clones, failure classification, and the
//! timeout kill path against real `git` processes.

use anyhow::Result;
use clonebox_server::vcs::{CloneError, GitCloner, RepositoryCloner};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

mod common;

const TIMEOUT: Duration = Duration::from_secs(60);

/// Test cloning the default branch of a local repository.
#[tokio::test]
async fn test_clone_local_repository() -> Result<()> {
    if !common::git_available() {
        eprintln!("git not installed; skipping");
        return Ok(());
    }
    let dir = TempDir::new()?;
    let repo = common::fixture_repo(dir.path())?;
    let dest = dir.path().join("clone");

    GitCloner::default()
        .clone_repository(&common::file_url(&repo)?, "main", &dest, TIMEOUT)
        .await?;

    assert_eq!(std::fs::read_to_string(dest.join("README.md"))?, "# Fixture\n");
    assert!(dest.join("src/lib.rs").is_file());
    assert!(dest.join(".git").is_dir());
    assert!(
        !dest.join("NOTES.md").exists(),
        "Only the requested branch should be checked out"
    );
    Ok(())
}

/// Test cloning a named branch.
#[tokio::test]
async fn test_clone_named_branch() -> Result<()> {
    if !common::git_available() {
        eprintln!("git not installed; skipping");
        return Ok(());
    }
    let dir = TempDir::new()?;
    let repo = common::fixture_repo(dir.path())?;
    let dest = dir.path().join("clone");

    GitCloner::default()
        .clone_repository(&common::file_url(&repo)?, "feature", &dest, TIMEOUT)
        .await?;

    assert!(dest.join("NOTES.md").is_file());
    Ok(())
}

/// Test that an unknown branch is reported as such.
#[tokio::test]
async fn test_missing_branch_is_classified() -> Result<()> {
    if !common::git_available() {
        eprintln!("git not installed; skipping");
        return Ok(());
    }
    let dir = TempDir::new()?;
    let repo = common::fixture_repo(dir.path())?;

    let result = GitCloner::default()
        .clone_repository(
            &common::file_url(&repo)?,
            "does-not-exist",
            &dir.path().join("clone"),
            TIMEOUT,
        )
        .await;

    match result {
        Err(CloneError::BranchNotFound { branch }) => assert_eq!(branch, "does-not-exist"),
        other => panic!("expected BranchNotFound, got {other:?}"),
    }
    Ok(())
}

/// Test that a missing repository is reported as such.
#[tokio::test]
async fn test_missing_repository_is_classified() -> Result<()> {
    if !common::git_available() {
        eprintln!("git not installed; skipping");
        return Ok(());
    }
    let dir = TempDir::new()?;

    let result = GitCloner::default()
        .clone_repository(
            &common::file_url(&dir.path().join("nowhere"))?,
            "main",
            &dir.path().join("clone"),
            TIMEOUT,
        )
        .await;

    assert!(
        matches!(result, Err(CloneError::RepositoryNotFound)),
        "expected RepositoryNotFound, got {result:?}"
    );
    Ok(())
}

/// Test that a hung clone is killed once its budget runs out.
#[cfg(unix)]
#[tokio::test]
async fn test_hung_clone_times_out() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new()?;
    let script = dir.path().join("slow-git");
    std::fs::write(&script, "#!/bin/sh\nsleep 30\n")?;
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))?;

    let started = std::time::Instant::now();
    let result = GitCloner::new(&script)
        .clone_repository(
            &Url::parse("https://example.com/repo.git")?,
            "main",
            &dir.path().join("clone"),
            Duration::from_millis(500),
        )
        .await;

    assert!(
        matches!(result, Err(CloneError::TimedOut { .. })),
        "expected TimedOut, got {result:?}"
    );
    assert!(
        started.elapsed() < Duration::from_secs(10),
        "Timeout should not wait for the child to finish"
    );
    Ok(())
}

/// Test a real clone over HTTPS.
#[tokio::test]
#[ignore = "requires network access"]
async fn test_clone_public_github_repository() -> Result<()> {
    let dir = TempDir::new()?;
    let dest = dir.path().join("clone");

    GitCloner::default()
        .clone_repository(
            &Url::parse("https://github.com/octocat/Hello-World")?,
            "master",
            &dest,
            TIMEOUT,
        )
        .await?;

    assert!(dest.join("README").is_file());
    Ok(())
}
