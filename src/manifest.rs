//! Manifest gate: does the project declare the UI libraries we know how to clean?

use crate::locator::MANIFEST_FILE;
use crate::pipeline::SkipReason;
use std::fs;
use std::path::Path;

/// Library names that must all appear in the manifest text
pub const REQUIRED_LIBRARIES: &[&str] = &["react", "react-dom"];

/// Check whether manifest text mentions every required library.
/// Plain substring search: comments, versions and unrelated keys all count.
pub fn declares_required_libraries(manifest: &str) -> bool {
    REQUIRED_LIBRARIES
        .iter()
        .all(|library| manifest.contains(library))
}

/// Read the project's manifest and gate on the required libraries.
/// Bytes that are not valid UTF-8 are replaced, not rejected.
pub fn inspect_manifest(project_root: &Path) -> Result<(), SkipReason> {
    let bytes = fs::read(project_root.join(MANIFEST_FILE))
        .map_err(|err| SkipReason::ManifestUnreadable(err.to_string()))?;
    let manifest = String::from_utf8_lossy(&bytes);

    if declares_required_libraries(&manifest) {
        Ok(())
    } else {
        Err(SkipReason::MissingLibraries)
    }
}
