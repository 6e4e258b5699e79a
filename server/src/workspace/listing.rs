//! Recursive file listing and size accounting for session directories.

use std::path::{Component, Path};
use walkdir::WalkDir;

use super::types::FileEntry;

/// Name of the version-control metadata directory hidden from listings.
pub const METADATA_DIR: &str = ".git";

/// Walks `root` depth-first, siblings sorted by file name, pruning `.git`.
pub(crate) fn collect_entries(root: &Path) -> Result<Vec<FileEntry>, walkdir::Error> {
    let mut entries = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_name() != METADATA_DIR);

    for entry in walker {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let is_dir = entry.file_type().is_dir();
        let size = if is_dir { 0 } else { entry.metadata()?.len() };

        entries.push(FileEntry {
            path: to_slash_path(relative),
            size,
            is_dir,
        });
    }

    Ok(entries)
}

/// Sums the sizes of every regular file under `root`, metadata included.
pub(crate) fn total_size(root: &Path) -> Result<u64, walkdir::Error> {
    let mut total = 0u64;
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() {
            total = total.saturating_add(entry.metadata()?.len());
        }
    }
    Ok(total)
}

fn to_slash_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
