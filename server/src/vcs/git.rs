//! `git` command-line implementation of [`RepositoryCloner`].

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};
use url::Url;

use super::{CloneError, RepositoryCloner};

/// Upper bound on diagnostic text carried inside [`CloneError::Failed`].
const MAX_STDERR_BYTES: usize = 4 * 1024;

/// Clones repositories by running the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCloner {
    program: PathBuf,
}

impl GitCloner {
    /// Creates a cloner that invokes `program` (usually `git`).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, url: &Url, branch: &str, destination: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("clone")
            .args(["--depth", "1", "--single-branch", "--branch"])
            .arg(branch)
            .arg("--")
            .arg(url.as_str())
            .arg(destination)
            // Never block on a credential prompt.
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group so helpers like git-remote-https die with the clone.
        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }
}

impl Default for GitCloner {
    fn default() -> Self {
        Self::new("git")
    }
}

#[async_trait]
impl RepositoryCloner for GitCloner {
    async fn clone_repository(
        &self,
        url: &Url,
        branch: &str,
        destination: &Path,
        timeout: Duration,
    ) -> Result<(), CloneError> {
        debug!(
            url = %url,
            branch,
            destination = %destination.display(),
            timeout_secs = timeout.as_secs(),
            "git clone"
        );

        let child = self
            .command(url, branch, destination)
            .spawn()
            .map_err(|source| CloneError::Io {
                context: format!("failed to launch {}", self.program.display()),
                source,
            })?;
        let group = ProcessGroupGuard::new(child.id());
        let started = Instant::now();

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                group.disarm();
                debug!(
                    exit_code = output.status.code(),
                    elapsed_secs = started.elapsed().as_secs_f64(),
                    "git clone done"
                );
                if output.status.success() {
                    Ok(())
                } else {
                    Err(classify_failure(
                        &String::from_utf8_lossy(&output.stderr),
                        branch,
                    ))
                }
            }
            Ok(Err(source)) => Err(CloneError::Io {
                context: "failed to wait for git".to_string(),
                source,
            }),
            Err(_) => {
                warn!(url = %url, branch, "git clone timeout");
                drop(group);
                Err(CloneError::TimedOut { after: timeout })
            }
        }
    }
}

/// Maps git's diagnostic output onto a [`CloneError`].
///
/// Branch errors are checked first: git reports them as "remote branch X not
/// found", which would otherwise match the generic not-found rule.
#[must_use]
pub fn classify_failure(stderr: &str, branch: &str) -> CloneError {
    let lower = stderr.to_lowercase();

    if (lower.contains("remote branch") && lower.contains("not found"))
        || lower.contains("couldn't find remote ref")
    {
        return CloneError::BranchNotFound {
            branch: branch.to_string(),
        };
    }

    if lower.contains("not found")
        || lower.contains("does not appear to be a git repository")
        || (lower.contains("repository") && lower.contains("does not exist"))
    {
        return CloneError::RepositoryNotFound;
    }

    if lower.contains("permission denied")
        || lower.contains("authentication failed")
        || lower.contains("could not read username")
    {
        return CloneError::AccessDenied;
    }

    let mut stderr = stderr.trim().to_string();
    if stderr.len() > MAX_STDERR_BYTES {
        let mut cut = MAX_STDERR_BYTES;
        while !stderr.is_char_boundary(cut) {
            cut -= 1;
        }
        stderr.truncate(cut);
        stderr.push_str("... [truncated]");
    }
    CloneError::Failed { stderr }
}

/// Kills the child's whole process group when dropped, unless disarmed.
struct ProcessGroupGuard {
    pgid: Option<u32>,
}

impl ProcessGroupGuard {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    fn disarm(mut self) {
        self.pgid = None;
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_process_group(pgid);
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // SAFETY: kill(2) only sends a signal; a negative pid targets the group
    // created for the child by `process_group(0)`.
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc != 0 {
        debug!(
            pgid,
            error = %std::io::Error::last_os_error(),
            "process group already gone"
        );
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {
    // kill_on_drop terminates the direct child.
}
