//! `.comp.html` template expansion.
//!
//! Templates reference assets by symbolic key: `{{<key>.integrity}}` and
//! `{{<key>.static}}` are literally substituted from the asset map, and
//! `{{git_versioning}}` from the VCS short revision when git versioning is
//! active. The output path is the template path minus the `.comp` infix;
//! overwriting an existing file is fatal.

use crate::{
    config::PipelineConfig,
    core::fs_scan,
    errors::{Error, Result},
    export::map::AssetMap,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

/// Expand every template against the asset map. Returns the number of files
/// written.
pub fn render_templates(
    templates: &[PathBuf],
    cfg: &PipelineConfig,
    map: &AssetMap,
    git_short_hash: Option<&str>,
) -> Result<usize> {
    let generation_dir = fs_scan::absolute(Path::new(&cfg.paths.generation_dir));
    let templates_dir = fs_scan::absolute(Path::new(&cfg.paths.templates_dir));
    let mut written = 0usize;

    for template_path in templates {
        let mut template = fs::read_to_string(template_path)?;

        if let Some(hash) = git_short_hash {
            template = template.replace("{{git_versioning}}", hash);
        }

        template = template.replace(
            "<!DOCTYPE html>",
            "<!DOCTYPE html>\n\n<!-- File dynamically generated -->\n",
        );

        for (key, entry) in map {
            template = template.replace(&format!("{{{{{key}.integrity}}}}"), &entry.integrity);
            template = template.replace(&format!("{{{{{key}.static}}}}"), &entry.static_url);
        }

        let file_name = template_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .replace(".comp.", ".");

        let write_path = if cfg.features.keep_tree {
            // Keep the source tree, rooted at the templates directory's own
            // name, beneath the generation directory.
            let base_name = templates_dir.file_name().unwrap_or_default();
            let rel = template_path
                .strip_prefix(&templates_dir)
                .unwrap_or(template_path);
            let write_dir = generation_dir
                .join(base_name)
                .join(rel.parent().unwrap_or(Path::new("")));
            fs::create_dir_all(&write_dir)?;
            write_dir.join(&file_name)
        } else {
            generation_dir.join(&file_name)
        };

        if write_path.exists() {
            return Err(Error::OutputCollision(write_path.display().to_string()));
        }

        fs::write(&write_path, template)?;
        written += 1;

        if cfg.features.verbose {
            info!("template: {}", write_path.display());
        }
    }

    Ok(written)
}
