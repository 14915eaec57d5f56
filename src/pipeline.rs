//! Per-project cleaning pipeline.
//!
//! Each discovered root goes through the gates in order: manifest check,
//! UI directory lookup, usage scan, pruning, then build and commit. A gate
//! that fails ends that project with [`ProjectOutcome::Skipped`]; other
//! projects are unaffected and nothing already done is rolled back.

use crate::locator::discover_projects;
use crate::manifest::inspect_manifest;
use crate::pruner::{prune_unused, PruneOptions, PruneReport};
use crate::runner::{BuildReport, BuildRunner};
use crate::scanner::{collect_used_components, find_ui_dir};
use colored::Colorize;
use humansize::{format_size, BINARY};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a project root was left alone
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("manifest could not be read: {0}")]
    ManifestUnreadable(String),
    #[error("manifest does not declare react and react-dom")]
    MissingLibraries,
    #[error("no components/ui directory")]
    NoUiDirectory,
    #[error("ui directory could not be listed: {0}")]
    UiDirectoryUnreadable(String),
}

/// Options for a whole run
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    pub prune: PruneOptions,
    pub runner: BuildRunner,
}

/// What happened in a project that passed every gate
#[derive(Debug)]
pub struct ProjectReport {
    pub ui_dir: PathBuf,
    pub used: usize,
    pub prune: PruneReport,
    /// `None` in dry-run mode
    pub build: Option<BuildReport>,
}

#[derive(Debug)]
pub enum ProjectOutcome {
    Cleaned(ProjectReport),
    Skipped(SkipReason),
}

/// Outcome of every discovered project, in discovery order
#[derive(Debug, Default)]
pub struct RunSummary {
    pub projects: Vec<(PathBuf, ProjectOutcome)>,
}

impl RunSummary {
    pub fn cleaned(&self) -> impl Iterator<Item = (&PathBuf, &ProjectReport)> {
        self.projects.iter().filter_map(|(root, outcome)| match outcome {
            ProjectOutcome::Cleaned(report) => Some((root, report)),
            ProjectOutcome::Skipped(_) => None,
        })
    }

    pub fn removed_count(&self) -> usize {
        self.cleaned().map(|(_, r)| r.prune.removed_count()).sum()
    }

    pub fn removed_bytes(&self) -> u64 {
        self.cleaned().map(|(_, r)| r.prune.removed_bytes()).sum()
    }

    /// Print the totals after all projects have been handled
    pub fn print(&self, dry_run: bool) {
        if self.projects.is_empty() {
            return;
        }

        println!("========================================");
        println!(
            "Projects found: {}, cleaned: {}",
            self.projects.len(),
            self.cleaned().count()
        );
        if dry_run {
            let would_remove: usize = self.cleaned().map(|(_, r)| r.prune.pruned.len()).sum();
            println!("Dry run mode: {} entries would be deleted.", would_remove);
        } else {
            println!("Entries deleted: {}", self.removed_count());
            println!(
                "Total Size Removed: {}",
                format_size(self.removed_bytes(), BINARY).bold().green()
            );
        }
    }
}

/// Run every gate for a single project root
pub fn clean_project(project_root: &Path, options: &CleanOptions) -> ProjectOutcome {
    match try_clean_project(project_root, options) {
        Ok(report) => ProjectOutcome::Cleaned(report),
        Err(reason) => {
            if options.prune.verbose {
                println!("DEBUG: Skipping {}: {}", project_root.display(), reason);
            }
            ProjectOutcome::Skipped(reason)
        }
    }
}

fn try_clean_project(
    project_root: &Path,
    options: &CleanOptions,
) -> Result<ProjectReport, SkipReason> {
    inspect_manifest(project_root)?;

    let ui_dir = find_ui_dir(project_root).ok_or(SkipReason::NoUiDirectory)?;
    println!("{} {}", "Cleaning UI in:".bold(), ui_dir.display());

    let scan = collect_used_components(project_root);
    if options.prune.verbose {
        println!(
            "DEBUG: Scanned {} source files ({} unreadable), {} components referenced",
            scan.files_scanned,
            scan.files_unreadable,
            scan.used.len()
        );
    }

    let prune = prune_unused(&ui_dir, &scan.used, options.prune)?;

    let build = if options.prune.dry_run {
        None
    } else {
        Some(options.runner.run(project_root))
    };

    Ok(ProjectReport {
        ui_dir,
        used: scan.used.len(),
        prune,
        build,
    })
}

/// Discover every project under `start` and clean them one after another
pub fn run(start: &Path, options: &CleanOptions) -> RunSummary {
    println!("Starting in: {}", start.display());

    let mut summary = RunSummary::default();
    for root in discover_projects(start) {
        let outcome = clean_project(&root, options);
        summary.projects.push((root, outcome));
    }
    summary
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::locator::MANIFEST_FILE;
    use std::fs;
    use tempfile::tempdir;

    const REACT_MANIFEST: &str = r#"{"dependencies": {"react": "^18.0.0", "react-dom": "^18.0.0"}}"#;

    fn options() -> CleanOptions {
        CleanOptions {
            prune: PruneOptions::default(),
            runner: BuildRunner {
                build_command: "touch .built".to_string(),
                commit_command: "touch .committed".to_string(),
                ..BuildRunner::default()
            },
        }
    }

    fn react_project(root: &Path, ui_files: &[&str], source: &str) {
        fs::create_dir_all(root.join("src/components/ui")).unwrap();
        fs::write(root.join(MANIFEST_FILE), REACT_MANIFEST).unwrap();
        for file in ui_files {
            fs::write(root.join("src/components/ui").join(file), "export {};").unwrap();
        }
        fs::write(root.join("src/page.tsx"), source).unwrap();
    }

    #[test]
    fn test_gate_order_missing_libraries() {
        let dir = tempdir().unwrap();
        react_project(dir.path(), &["card.tsx"], "");
        fs::write(dir.path().join(MANIFEST_FILE), r#"{"name": "plain"}"#).unwrap();

        let outcome = clean_project(dir.path(), &options());

        assert!(matches!(
            outcome,
            ProjectOutcome::Skipped(SkipReason::MissingLibraries)
        ));
        assert!(dir.path().join("src/components/ui/card.tsx").exists());
        assert!(!dir.path().join(".built").exists());
    }

    #[test]
    fn test_no_ui_directory_runs_nothing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), REACT_MANIFEST).unwrap();

        let outcome = clean_project(dir.path(), &options());

        assert!(matches!(
            outcome,
            ProjectOutcome::Skipped(SkipReason::NoUiDirectory)
        ));
        assert!(!dir.path().join(".built").exists());
        assert!(!dir.path().join(".committed").exists());
    }

    #[test]
    fn test_cleaned_project_builds_and_commits() {
        let dir = tempdir().unwrap();
        react_project(
            dir.path(),
            &["Alert.tsx", "Badge.tsx"],
            r#"import { Alert } from "@/components/ui/alert";"#,
        );

        let outcome = clean_project(dir.path(), &options());

        let ProjectOutcome::Cleaned(report) = outcome else {
            panic!("expected project to be cleaned");
        };
        assert_eq!(report.prune.removed_count(), 1);
        assert_eq!(report.used, 1);
        assert!(dir.path().join("src/components/ui/Alert.tsx").exists());
        assert!(!dir.path().join("src/components/ui/Badge.tsx").exists());
        assert!(dir.path().join(".built").exists());
        assert!(dir.path().join(".committed").exists());
    }

    #[test]
    fn test_dry_run_skips_build() {
        let dir = tempdir().unwrap();
        react_project(dir.path(), &["Badge.tsx"], "");
        let mut options = options();
        options.prune.dry_run = true;

        let outcome = clean_project(dir.path(), &options);

        let ProjectOutcome::Cleaned(report) = outcome else {
            panic!("expected project to be cleaned");
        };
        assert!(report.build.is_none());
        assert!(dir.path().join("src/components/ui/Badge.tsx").exists());
        assert!(!dir.path().join(".built").exists());
    }

    #[test]
    fn test_skip_in_one_sibling_does_not_stop_the_other() {
        let dir = tempdir().unwrap();
        let broken = dir.path().join("a-broken");
        let good = dir.path().join("b-good");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join(MANIFEST_FILE), REACT_MANIFEST).unwrap();
        react_project(&good, &["card.tsx"], "");

        let summary = run(dir.path(), &options());

        assert_eq!(summary.projects.len(), 2);
        assert!(matches!(
            summary.projects[0].1,
            ProjectOutcome::Skipped(SkipReason::NoUiDirectory)
        ));
        assert_eq!(summary.cleaned().count(), 1);
        assert_eq!(summary.removed_count(), 1);
        assert!(!good.join("src/components/ui/card.tsx").exists());
    }

    #[test]
    fn test_skip_reason_messages() {
        assert_eq!(
            SkipReason::NoUiDirectory.to_string(),
            "no components/ui directory"
        );
        assert_eq!(
            SkipReason::ManifestUnreadable("denied".into()).to_string(),
            "manifest could not be read: denied"
        );
    }

    /// Apply `mode` to `dir` and report whether the kernel enforces it for us
    fn restrict(dir: &Path, mode: u32) -> bool {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(dir, fs::Permissions::from_mode(mode)).unwrap();
        let enforced = if mode & 0o400 == 0 {
            fs::read_dir(dir).is_err()
        } else {
            let check = dir.join(".write-check");
            let writable = fs::write(&check, "").is_ok();
            if writable {
                fs::remove_file(&check).unwrap();
            }
            !writable
        };
        if !enforced {
            relax(dir);
            eprintln!("skipping: directory permissions are not enforced");
        }
        enforced
    }

    fn relax(dir: &Path) {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_failed_deletion_still_builds_and_commits() {
        let dir = tempdir().unwrap();
        react_project(dir.path(), &["Badge.tsx"], "");
        let ui = dir.path().join("src/components/ui");
        if !restrict(&ui, 0o555) {
            return;
        }

        let outcome = clean_project(dir.path(), &options());
        relax(&ui);

        let ProjectOutcome::Cleaned(report) = outcome else {
            panic!("expected project to be cleaned");
        };
        assert_eq!(report.prune.pruned.len(), 1);
        assert!(!report.prune.pruned[0].removed);
        assert!(ui.join("Badge.tsx").exists());
        assert!(dir.path().join(".built").exists());
        assert!(dir.path().join(".committed").exists());
    }

    #[test]
    fn test_unlistable_ui_dir_skips_build() {
        let dir = tempdir().unwrap();
        react_project(dir.path(), &["Badge.tsx"], "");
        let ui = dir.path().join("src/components/ui");
        if !restrict(&ui, 0o000) {
            return;
        }

        let outcome = clean_project(dir.path(), &options());
        relax(&ui);

        assert!(matches!(
            outcome,
            ProjectOutcome::Skipped(SkipReason::UiDirectoryUnreadable(_))
        ));
        assert!(ui.join("Badge.tsx").exists());
        assert!(!dir.path().join(".built").exists());
        assert!(!dir.path().join(".committed").exists());
    }
}
