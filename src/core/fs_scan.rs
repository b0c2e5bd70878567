//! Filesystem discovery for the pipeline inputs.
//!
//! Three kinds of files are collected: `.comp` build manifests and
//! already-minified pass-through assets under the static root, and
//! `.comp.html` templates under the templates root. Paths containing any of
//! the configured exclude substrings are skipped. Results are sorted so the
//! global encoding counters stay deterministic across runs.

use crate::core::expand::COMP_EXTENSION;
use crate::errors::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ScanResult {
    /// `.comp` manifests, sorted.
    pub manifests: Vec<PathBuf>,
    /// `.min.js` / `.min.css` files taken over as-is, sorted.
    pub preminified: Vec<PathBuf>,
}

/// Collect manifests and pre-minified assets under the static root.
pub fn scan_static(static_dir: &Path, exclude: &[String]) -> Result<ScanResult> {
    if !static_dir.exists() {
        return Err(Error::MissingDirectory {
            role: "static",
            path: static_dir.display().to_string(),
        });
    }

    info!("fs_scan: start -> {}", static_dir.display());

    let mut manifests = Vec::new();
    let mut preminified = Vec::new();
    let mut skipped_excluded = 0usize;

    for entry in WalkDir::new(static_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = absolute(entry.path());
        let path_str = path.to_string_lossy();

        if is_excluded(&path_str, exclude) {
            skipped_excluded += 1;
            debug!("fs_scan: exclude {}", path.display());
            continue;
        }

        if path_str.ends_with(COMP_EXTENSION) {
            manifests.push(path);
        } else if path_str.ends_with(".min.js") || path_str.ends_with(".min.css") {
            preminified.push(path);
        }
    }

    manifests.sort();
    preminified.sort();

    info!(
        "fs_scan: done, manifests={} preminified={} (excluded={})",
        manifests.len(),
        preminified.len(),
        skipped_excluded
    );

    Ok(ScanResult {
        manifests,
        preminified,
    })
}

/// Collect `.comp.html` templates under the templates root, sorted.
pub fn scan_templates(templates_dir: &Path, exclude: &[String]) -> Result<Vec<PathBuf>> {
    if !templates_dir.exists() {
        return Err(Error::MissingDirectory {
            role: "templates",
            path: templates_dir.display().to_string(),
        });
    }

    let suffix = format!("{COMP_EXTENSION}.html");
    let mut templates = Vec::new();

    for entry in WalkDir::new(templates_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = absolute(entry.path());
        let path_str = path.to_string_lossy();

        if is_excluded(&path_str, exclude) {
            debug!("fs_scan: exclude {}", path.display());
            continue;
        }
        if path_str.ends_with(&suffix) {
            templates.push(path);
        }
    }

    templates.sort();
    info!("fs_scan: templates={}", templates.len());
    Ok(templates)
}

/// Whether a path contains any of the exclude substrings.
pub fn is_excluded(path: &str, exclude: &[String]) -> bool {
    exclude.iter().any(|needle| path.contains(needle.as_str()))
}

/// Best-effort absolute path with stable separators.
pub fn absolute(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusion_is_substring_based() {
        let exclude = vec!["node_modules".to_string(), ".bak".to_string()];
        assert!(is_excluded("/srv/app/node_modules/x.comp", &exclude));
        assert!(is_excluded("/srv/app/js/old.comp.bak", &exclude));
        assert!(!is_excluded("/srv/app/js/app.min.js.comp", &exclude));
        assert!(!is_excluded("/srv/app/js/app.min.js.comp", &[]));
    }
}
