//! Storage configuration for the clonebox service.

use serde::Deserialize;
use std::path::PathBuf;

/// Where session directories live.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    /// Directory holding one subdirectory per session.
    pub root_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("./repos"),
        }
    }
}
