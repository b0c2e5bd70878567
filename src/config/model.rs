//! Configuration data structures for the asset pipeline.
//!
//! These are split into logical groups for easier maintenance:
//! - [`PipelineConfig`]: top-level container for all config groups
//! - [`Paths`]: input/output directory roots
//! - [`Filters`]: which files to skip
//! - [`Features`]: toggles for minification, reduction, layout
//! - [`Output`]: map file, integrity key prefix, artifact headers
//!
//! All structs are `serde`-friendly so they can be loaded from JSON.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{env, str::FromStr};

/// Top-level configuration for the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Input/output directory roots.
    pub paths: Paths,
    /// Which files to skip.
    pub filters: Filters,
    /// Feature toggles.
    pub features: Features,
    /// Output-shaping settings.
    pub output: Output,
    /// Artifact filename versioning, or `None` to keep original names.
    pub versioning: Option<Versioning>,
}

impl PipelineConfig {
    /// Load configuration from environment variables or fallback to defaults.
    ///
    /// This method is intentionally tolerant: unknown variables are ignored,
    /// and parsing errors fall back to defaults — except `ASSET_PREP_VERSIONING`,
    /// where an unknown value is a hard error. After load, a basic validation
    /// is performed to ensure sane values.
    ///
    /// Supported ENV vars (all optional):
    /// - `ASSET_PREP_STATIC_DIR`            (path)
    /// - `ASSET_PREP_TEMPLATES_DIR`         (path)
    /// - `ASSET_PREP_GENERATION_DIR`        (path)
    /// - `ASSET_PREP_MAP_FILE`              (filename; empty suppresses the map)
    /// - `ASSET_PREP_INTEGRITY_KEY_REMOVAL` (prefix string)
    /// - `ASSET_PREP_EXCLUDE_PATHS`         (comma-separated substrings)
    /// - `ASSET_PREP_MINIFY`                (bool: true/false/1/0)
    /// - `ASSET_PREP_REDUCE`                (bool)
    /// - `ASSET_PREP_VERSIONING`            (md5 | content | git)
    /// - `ASSET_PREP_VERBOSE`               (bool)
    /// - `ASSET_PREP_HEADER_JS`             (literal string)
    /// - `ASSET_PREP_HEADER_CSS`            (literal string)
    /// - `ASSET_PREP_INLINE`                (bool)
    /// - `ASSET_PREP_CLEAN`                 (bool)
    /// - `ASSET_PREP_KEEP_TREE`             (bool)
    pub fn load_from_env_or_default() -> Result<Self> {
        let mut cfg = Self::default();

        // Paths
        if let Some(v) = env_str("ASSET_PREP_STATIC_DIR") {
            cfg.paths.static_dir = v;
        }
        if let Some(v) = env_str("ASSET_PREP_TEMPLATES_DIR") {
            cfg.paths.templates_dir = v;
        }
        if let Some(v) = env_str("ASSET_PREP_GENERATION_DIR") {
            cfg.paths.generation_dir = v;
        }

        // Filters
        if let Some(v) = env_list("ASSET_PREP_EXCLUDE_PATHS") {
            cfg.filters.exclude_paths = v;
        }

        // Features
        if let Some(v) = env_bool("ASSET_PREP_MINIFY") {
            cfg.features.minify = v;
        }
        if let Some(v) = env_bool("ASSET_PREP_REDUCE") {
            cfg.features.reduce = v;
        }
        if let Some(v) = env_bool("ASSET_PREP_VERBOSE") {
            cfg.features.verbose = v;
        }
        if let Some(v) = env_bool("ASSET_PREP_INLINE") {
            cfg.features.inline = v;
        }
        if let Some(v) = env_bool("ASSET_PREP_CLEAN") {
            cfg.features.clean = v;
        }
        if let Some(v) = env_bool("ASSET_PREP_KEEP_TREE") {
            cfg.features.keep_tree = v;
        }

        // Output
        if let Some(v) = env_str("ASSET_PREP_MAP_FILE") {
            cfg.output.map_file_name = if v.is_empty() { None } else { Some(v) };
        }
        if let Some(v) = env_str("ASSET_PREP_INTEGRITY_KEY_REMOVAL") {
            cfg.output.integrity_key_removal = v;
        }
        if let Some(v) = env_str("ASSET_PREP_HEADER_JS") {
            cfg.output.header_js = v;
        }
        if let Some(v) = env_str("ASSET_PREP_HEADER_CSS") {
            cfg.output.header_css = v;
        }

        // Versioning
        if let Some(v) = env_str("ASSET_PREP_VERSIONING") {
            cfg.versioning = if v.is_empty() {
                None
            } else {
                Some(v.parse::<Versioning>()?)
            };
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Basic config validation — ensures the directory roots are set.
    pub fn validate(&self) -> Result<()> {
        if self.paths.static_dir.is_empty() {
            return Err(Error::Config("static_dir must be set"));
        }
        if self.paths.templates_dir.is_empty() {
            return Err(Error::Config("templates_dir must be set"));
        }
        if self.paths.generation_dir.is_empty() {
            return Err(Error::Config("generation_dir must be set"));
        }
        Ok(())
    }
}

/// Input/output directory roots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paths {
    /// Root under which `.comp` manifests are discovered.
    pub static_dir: String,
    /// Root under which `.comp.html` templates are discovered.
    pub templates_dir: String,
    /// Output directory; must exist; wiped when `clean` is enabled.
    pub generation_dir: String,
}

/// File filtering rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Filters {
    /// Substrings; any path containing one is skipped.
    pub exclude_paths: Vec<String>,
}

/// Feature toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Features {
    /// Run the external minifiers on included JS/CSS.
    pub minify: bool,
    /// Run the identifier reducer on emitted JS.
    pub reduce: bool,
    /// Per-file progress logging.
    pub verbose: bool,
    /// Collapse blank lines and omit line breaks around includes.
    pub inline: bool,
    /// Wipe the generation directory before running.
    pub clean: bool,
    /// Preserve the template tree structure under the generation directory.
    pub keep_tree: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            minify: true,
            reduce: true,
            verbose: true,
            inline: true,
            clean: true,
            keep_tree: false,
        }
    }
}

/// Output-shaping settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Output {
    /// Filename for the emitted JSON map, or `None` to suppress it.
    pub map_file_name: Option<String>,
    /// Prefix stripped from pre-rename paths to form map keys.
    pub integrity_key_removal: String,
    /// Literal string prepended to each emitted JS artifact.
    pub header_js: String,
    /// Literal string prepended to each emitted CSS artifact.
    pub header_css: String,
}

/// Artifact filename versioning mode.
///
/// `Content` embeds the base64 SHA-384 of the artifact in its name, so the
/// browser only reloads when the content changes. `Git` embeds the VCS short
/// revision, which forces a reload of every artifact on any commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Versioning {
    Content,
    Git,
}

impl FromStr for Versioning {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" | "content" => Ok(Versioning::Content),
            "git" => Ok(Versioning::Git),
            other => Err(Error::InvalidVersioning(other.to_string())),
        }
    }
}

/* ------------------------- ENV helpers ------------------------- */

fn env_bool(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|s| {
        let v = s.trim().to_ascii_lowercase();
        match v.as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    })
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok().map(|s| s.trim().to_string())
}

fn env_list(key: &str) -> Option<Vec<String>> {
    let raw = env::var(key).ok()?;
    let list = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect::<Vec<_>>();
    Some(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versioning_accepts_the_documented_spellings() {
        assert_eq!("md5".parse::<Versioning>().unwrap(), Versioning::Content);
        assert_eq!(
            "content".parse::<Versioning>().unwrap(),
            Versioning::Content
        );
        assert_eq!("git".parse::<Versioning>().unwrap(), Versioning::Git);
        assert!("svn".parse::<Versioning>().is_err());
    }

    #[test]
    fn validate_rejects_missing_roots() {
        let cfg = PipelineConfig::default();
        assert!(cfg.validate().is_err());

        let mut cfg = PipelineConfig::default();
        cfg.paths.static_dir = "static".into();
        cfg.paths.templates_dir = "templates".into();
        cfg.paths.generation_dir = "generated".into();
        assert!(cfg.validate().is_ok());
    }
}
