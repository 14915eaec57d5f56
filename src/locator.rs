//! Project root discovery.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File whose presence marks a directory as a project root
pub const MANIFEST_FILE: &str = "package.json";

/// Immediate children of a directory, split into files and subdirectories.
/// Both lists are sorted by file name. Unreadable directories yield empty lists.
fn list_children(dir: &Path) -> (Vec<String>, Vec<PathBuf>) {
    let mut files = Vec::new();
    let mut dirs = Vec::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), %err, "cannot list directory");
            return (files, dirs);
        }
    };

    for entry in entries.flatten() {
        // file_type() does not follow symlinks, so a link to a directory is a file here
        let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
        if is_dir {
            dirs.push(entry.path());
        } else {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    files.sort();
    dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    (files, dirs)
}

/// Depth-first search for project roots starting at `start`.
///
/// A directory holding a manifest is reported and not descended into, so
/// nested projects inside a discovered root are never reported. Roots are
/// returned in discovery order.
pub fn discover_projects(start: &Path) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    collect_roots(start, &mut roots);
    roots
}

fn collect_roots(dir: &Path, roots: &mut Vec<PathBuf>) {
    let (files, dirs) = list_children(dir);

    if files.iter().any(|name| name == MANIFEST_FILE) {
        debug!(root = %dir.display(), "found project root");
        roots.push(dir.to_path_buf());
        return;
    }

    for subdir in dirs {
        collect_roots(&subdir, roots);
    }
}
