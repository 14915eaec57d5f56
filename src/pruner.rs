//! Removal of UI components that nothing references.

use crate::pipeline::SkipReason;
use crate::scanner::split_extension;
use colored::Colorize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Options controlling how pruning touches the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct PruneOptions {
    pub dry_run: bool,
    pub verbose: bool,
}

/// A UI directory entry that was not referenced anywhere
#[derive(Debug)]
pub struct PrunedEntry {
    pub path: PathBuf,
    pub size: u64,
    /// False in dry-run mode or when the removal failed
    pub removed: bool,
}

/// Outcome of pruning one UI directory
#[derive(Debug, Default)]
pub struct PruneReport {
    pub pruned: Vec<PrunedEntry>,
    pub kept: Vec<PathBuf>,
}

impl PruneReport {
    pub fn removed_count(&self) -> usize {
        self.pruned.iter().filter(|e| e.removed).count()
    }

    pub fn removed_bytes(&self) -> u64 {
        self.pruned
            .iter()
            .filter(|e| e.removed)
            .map(|e| e.size)
            .sum()
    }
}

/// Key under which an entry is looked up in the used set:
/// the name without its extension, lowercased
pub fn component_key(file_name: &str) -> String {
    let (stem, _) = split_extension(file_name);
    stem.to_lowercase()
}

/// On-disk size of a file or directory tree, not following symlinks.
/// A symlink counts as zero since removal only unlinks it.
fn entry_size(path: &Path) -> u64 {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_symlink() => return 0,
        Ok(_) => {}
        Err(_) => return 0,
    }

    walkdir::WalkDir::new(path)
        .follow_root_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter_map(|e| e.metadata().ok())
        .filter(|m| m.is_file())
        .map(|m| m.len())
        .sum()
}

fn remove_entry(path: &Path) -> std::io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Delete every immediate entry of `ui_dir` whose component key is not in `used`.
///
/// Removal failures are not retried and do not stop the pass. Failing to
/// list `ui_dir` itself aborts the project.
pub fn prune_unused(
    ui_dir: &Path,
    used: &HashSet<String>,
    options: PruneOptions,
) -> Result<PruneReport, SkipReason> {
    let read_dir = match fs::read_dir(ui_dir) {
        Ok(entries) => entries,
        Err(err) => {
            println!("Failed to read ui directory: {}", err);
            return Err(SkipReason::UiDirectoryUnreadable(err.to_string()));
        }
    };

    let mut entries: Vec<PathBuf> = read_dir.flatten().map(|e| e.path()).collect();
    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut report = PruneReport::default();

    for path in entries {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if used.contains(&component_key(&name)) {
            if options.verbose {
                println!("DEBUG: Keeping used: {}", path.display());
            }
            report.kept.push(path);
            continue;
        }

        let size = entry_size(&path);

        let removed = if options.dry_run {
            println!("Would delete: {}", path.display());
            false
        } else {
            println!("{} {}", "Deleting unused:".red(), path.display());
            match remove_entry(&path) {
                Ok(()) => true,
                Err(err) => {
                    warn!(path = %path.display(), %err, "failed to delete unused entry");
                    false
                }
            }
        };

        report.pruned.push(PrunedEntry {
            path,
            size,
            removed,
        });
    }

    Ok(report)
}
