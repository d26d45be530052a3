//! Directory scanner for archive collections.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Container extensions audited when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["zip"];

/// Build a lowercase extension set.
pub fn extension_set<S: AsRef<str>>(extensions: &[S]) -> HashSet<String> {
    extensions
        .iter()
        .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
        .collect()
}

/// List the archive files directly inside `folder`, sorted by path.
///
/// Only regular files whose extension is in `extensions` (case-insensitive)
/// are returned; subdirectories are not descended into.
pub fn scan_archives(folder: &Path, extensions: &HashSet<String>) -> std::io::Result<Vec<PathBuf>> {
    let mut archives: Vec<PathBuf> = std::fs::read_dir(folder)?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_matching_extension(p, extensions))
        .collect();
    archives.sort();
    Ok(archives)
}

/// The set name an archive file stands for: its file name without extension.
pub fn archive_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Check if a path has an extension in the allowed set.
fn has_matching_extension(path: &Path, extensions: &HashSet<String>) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_lowercase()))
        .unwrap_or(false)
}
