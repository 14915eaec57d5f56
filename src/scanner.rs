//! UI directory discovery and component usage scanning.

use ignore::{Walk, WalkBuilder};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// Name of the directory holding the UI components
pub const UI_DIR_NAME: &str = "ui";

/// Required name of the UI directory's parent
pub const COMPONENTS_DIR_NAME: &str = "components";

/// Extensions of files scanned for component references
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

/// A reference is `components/ui/<name>` directly preceded by one of `.`, `/`, `@` or `"`.
/// Single-quoted and templated import paths are deliberately not recognised.
static COMPONENT_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[./@"](?i:components/ui/)([A-Za-z0-9_-]+)"#)
        .expect("component reference pattern is valid")
});

/// Result of scanning a project for component references
#[derive(Debug, Default)]
pub struct UsageScan {
    /// Lowercased identifiers referenced anywhere in the scanned sources
    pub used: HashSet<String>,
    pub files_scanned: usize,
    pub files_unreadable: usize,
}

/// Build a walker over the whole project tree.
/// Hidden entries and ignored paths are included, symlinks are not followed,
/// and entries come in file name order so "first match" is stable.
fn project_walker(project_root: &Path) -> Walk {
    WalkBuilder::new(project_root)
        .hidden(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
}

/// Split a file name at its last dot. The dot stays with the extension,
/// so `.gitkeep` has an empty stem and `button.stories.tsx` has stem `button.stories`.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    }
}

/// Check whether a file name carries one of the scanned source extensions
pub fn is_source_file(name: &str) -> bool {
    let (_, ext) = split_extension(name);
    ext.strip_prefix('.')
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

fn is_ui_dir(path: &Path) -> bool {
    let named_ui = path.file_name().is_some_and(|name| name == UI_DIR_NAME);
    named_ui
        && path
            .parent()
            .and_then(|parent| parent.file_name())
            .is_some_and(|name| name == COMPONENTS_DIR_NAME)
}

/// Find the first `components/ui` directory in walk order
pub fn find_ui_dir(project_root: &Path) -> Option<PathBuf> {
    for result in project_walker(project_root) {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                debug!(%err, "skipping unreadable entry while looking for ui directory");
                continue;
            }
        };

        let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
        if is_dir && is_ui_dir(entry.path()) {
            return Some(entry.into_path());
        }
    }

    None
}

/// Extract every referenced component identifier from source text, lowercased
pub fn extract_component_refs(source: &str) -> impl Iterator<Item = String> + '_ {
    COMPONENT_REF
        .captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
}

/// Walk the project and collect the components referenced by its sources.
/// Imports, comments and string literals all count as references.
pub fn collect_used_components(project_root: &Path) -> UsageScan {
    let mut scan = UsageScan::default();

    for result in project_walker(project_root) {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                debug!(%err, "skipping unreadable entry during usage scan");
                continue;
            }
        };

        if entry.file_type().is_none_or(|ft| ft.is_dir()) {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !is_source_file(&name) {
            continue;
        }

        let bytes = match fs::read(entry.path()) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(path = %entry.path().display(), %err, "cannot read source file");
                scan.files_unreadable += 1;
                continue;
            }
        };

        scan.files_scanned += 1;
        let text = String::from_utf8_lossy(&bytes);
        scan.used.extend(extract_component_refs(&text));
    }

    scan
}
