//! Recursive discovery of `.json` input files.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Enumerate every `.json` file under `root`, recursively, as a sorted
/// list of absolute paths. No filtering by content, size, or age.
pub fn discover_json_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if !is_json {
            continue;
        }
        let absolute = path
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", path.display()))?;
        files.push(absolute);
    }
    files.sort();
    Ok(files)
}
