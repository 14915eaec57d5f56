//! uiprune - Unused UI Component Cleaner
//!
//! uiprune finds React projects below a start directory, removes entries of their
//! `components/ui` directory that no source file references, then reinstalls,
//! rebuilds and commits the result.
//!
//! ## Pipeline
//!
//! For every directory holding a `package.json` (nested projects are not searched):
//! 1. the manifest must mention both `react` and `react-dom`
//! 2. the first `components/ui` directory in the tree is located
//! 3. `.ts`, `.tsx`, `.js` and `.jsx` files are scanned for `components/ui/<name>` references
//! 4. unreferenced UI entries are deleted
//! 5. the install/build command and the commit command run in the project root
//!
//! A failed gate skips that project silently; build and commit failures are reported, not fatal.

pub mod locator;
pub mod logging;
pub mod manifest;
pub mod pipeline;
pub mod pruner;
pub mod runner;
pub mod scanner;

// Re-export commonly used items
pub use locator::{discover_projects, MANIFEST_FILE};
pub use manifest::{declares_required_libraries, inspect_manifest, REQUIRED_LIBRARIES};
pub use pipeline::{clean_project, run, CleanOptions, ProjectOutcome, ProjectReport, RunSummary, SkipReason};
pub use pruner::{component_key, prune_unused, PruneOptions, PruneReport, PrunedEntry};
pub use runner::{BuildReport, BuildRunner, CommitPolicy, StepOutcome};
pub use scanner::{collect_used_components, extract_component_refs, find_ui_dir, UsageScan};
