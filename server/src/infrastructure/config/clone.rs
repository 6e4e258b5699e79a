//! Clone configuration for the clonebox service.
//!
//! This module defines how repositories are fetched into new sessions.

use serde::Deserialize;

/// Settings for the external clone.
#[derive(Debug, Deserialize, Clone)]
pub struct CloneSettings {
    /// Hard limit on a single clone, in seconds (default: 180)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Branch cloned when a request names none (default: "main")
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Executable used for cloning (default: "git")
    #[serde(default = "default_git_binary")]
    pub git_binary: String,
}

fn default_timeout_secs() -> u64 {
    180
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_git_binary() -> String {
    "git".to_string()
}

impl Default for CloneSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            default_branch: default_branch(),
            git_binary: default_git_binary(),
        }
    }
}
