//! `.comp` manifest expansion.
//!
//! A manifest is a thin build script read line by line. Directive lines are
//! prefix-matched; everything else is carried into the output (blank lines
//! dropped in inline mode). Include paths may start with the `STATIC_PATH/`
//! sentinel, which resolves against the configured static root; a
//! non-existent include path is fatal and cites the manifest.

use crate::{
    config::PipelineConfig,
    core::{comments, minify},
    errors::{Error, Result},
};
use chrono::Local;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

/// Manifest file suffix.
pub const COMP_EXTENSION: &str = ".comp";
/// Replaced with a generation timestamp wherever it appears. To be avoided
/// on integrity-bound artifacts: the timestamp changes every run.
pub const INFO_TAG: &str = "@GENERATION_INFO";
/// Path sentinel resolved against the static root. The trailing slash is
/// part of the sentinel.
pub const STATIC_PATH: &str = "STATIC_PATH/";

const INCLUDE_JS: &str = "includeJS:";
const INCLUDE_CSS: &str = "includeCSS:";
const INCLUDE: &str = "include:";
const REDUCE_PUBLIC_EXCEPT: &str = "reducePublicJSExcept:";

/// The assembled text of one manifest plus the reduction switches its
/// directives configured.
#[derive(Debug)]
pub struct ExpandedManifest {
    pub data: String,
    pub reduce_public: bool,
    pub skip_items: Vec<String>,
}

/// Expand one `.comp` manifest into concatenated JS/CSS text.
pub fn expand_manifest(comp_path: &Path, cfg: &PipelineConfig) -> Result<ExpandedManifest> {
    if cfg.features.verbose {
        info!("expand: {}", comp_path.display());
    }

    let raw = fs::read_to_string(comp_path)?;
    let static_dir = Path::new(&cfg.paths.static_dir);

    let mut parts: Vec<String> = Vec::new();
    let mut reduce_public = false;
    let mut skip_items: Vec<String> = Vec::new();

    for line in raw.lines() {
        if line.contains(INFO_TAG) {
            let stamp = format!("@Generated at: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
            parts.push(line.replace(INFO_TAG, &stamp));
        } else if let Some(rest) = line.strip_prefix(REDUCE_PUBLIC_EXCEPT) {
            reduce_public = true;
            for item in rest.split(';') {
                let item = item.trim();
                if !item.is_empty() {
                    skip_items.push(item.to_string());
                }
            }
        } else if line.starts_with(INCLUDE_JS) {
            let include_path = resolve_include(line, INCLUDE_JS, static_dir);
            ensure_exists(comp_path, &include_path)?;

            let data = format!(
                "/* {INCLUDE_JS}{} */\n{}",
                include_path.display(),
                fs::read_to_string(&include_path)?
            );

            let mut compressed = if cfg.features.minify {
                minify::minify_js(&data)
            } else if cfg.features.reduce {
                // The reducer cannot see comments; strip them up front.
                comments::strip_js_comments(&data)
            } else {
                data
            };

            compressed = compressed
                .replace("\"use strict\";", "")
                .replace("'use strict';", "")
                .replace(";}", "}");

            if cfg.features.inline && !compressed.ends_with(';') {
                compressed.push(';');
            }

            if cfg.features.minify && compressed.lines().count() > 1 {
                info!(
                    "expand: minified include still spans lines -> {}",
                    include_path.display()
                );
                for minified_line in compressed.lines() {
                    info!("\t{}", minified_line.chars().take(50).collect::<String>());
                }
            }

            parts.push(compressed);
        } else if line.starts_with(INCLUDE_CSS) {
            let include_path = resolve_include(line, INCLUDE_CSS, static_dir);
            ensure_exists(comp_path, &include_path)?;

            let data = format!(
                "/* {INCLUDE_CSS}{} */\n{}",
                include_path.display(),
                fs::read_to_string(&include_path)?
            );

            let compressed = if cfg.features.minify {
                minify::minify_css(&data)?
            } else {
                data
            };

            let compressed = compressed
                .replace('+', " + ")
                .replace("  ", " ")
                .replace("opacity:0", "opacity: 0");

            parts.push(compressed);
        } else if line.starts_with(INCLUDE) {
            let include_path = resolve_include(line, INCLUDE, static_dir);
            ensure_exists(comp_path, &include_path)?;

            let data = fs::read_to_string(&include_path)?;
            for read_line in data.split_inclusive('\n') {
                parts.push(read_line.to_string());
            }
        } else {
            if cfg.features.inline && line.trim().is_empty() {
                continue;
            }
            parts.push(line.to_string());
        }
    }

    let data = if cfg.features.inline {
        parts.concat()
    } else {
        parts.join("\n")
    };

    Ok(ExpandedManifest {
        data,
        reduce_public,
        skip_items,
    })
}

/// Collapse indentation: tabs become four spaces, then every four-space run
/// becomes a tab again, repeated until no run is left.
pub fn normalize_indentation(data: &str) -> String {
    let mut data = data.replace('\t', "    ");
    while data.contains("    ") {
        data = data.replace("    ", "\t");
    }
    data
}

fn resolve_include(line: &str, tag: &str, static_dir: &Path) -> PathBuf {
    let path = line.strip_prefix(tag).unwrap_or_default().trim();
    match path.strip_prefix(STATIC_PATH) {
        Some(rest) => static_dir.join(rest),
        None => PathBuf::from(path),
    }
}

fn ensure_exists(manifest: &Path, include: &Path) -> Result<()> {
    if !include.exists() {
        return Err(Error::MissingIncludePath {
            manifest: manifest.display().to_string(),
            include: include.display().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_path_sentinel_resolves_against_the_static_root() {
        let resolved = resolve_include(
            "includeJS:STATIC_PATH/js/app.js",
            INCLUDE_JS,
            Path::new("/srv/static"),
        );
        assert_eq!(resolved, PathBuf::from("/srv/static/js/app.js"));
    }

    #[test]
    fn plain_paths_pass_through() {
        let resolved = resolve_include(
            "includeCSS:/opt/shared/reset.css",
            INCLUDE_CSS,
            Path::new("/srv/static"),
        );
        assert_eq!(resolved, PathBuf::from("/opt/shared/reset.css"));
    }

    #[test]
    fn indentation_collapses_to_tabs() {
        assert_eq!(normalize_indentation("        x"), "\t\tx");
        assert_eq!(normalize_indentation("\t    y"), "\t\ty");
        assert_eq!(normalize_indentation("   z"), "   z");
    }
}
