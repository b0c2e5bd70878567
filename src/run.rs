//! High-level orchestration for one pipeline invocation.
//!
//! This module contains the single public entry point [`run`]. It wipes the
//! generation directory when asked, takes over already-minified assets,
//! expands every `.comp` manifest (minifying and reducing per config),
//! binds each emitted artifact to an integrity tag and a versioned name,
//! expands `.comp.html` templates against the asset map, and finally
//! serializes the map.
//!
//! Files are processed in sorted-path order and a single [`ReduceContext`]
//! is threaded through the whole invocation, so the global encoding
//! counters (`C`, `f`, `CL`, `mp`) are deterministic and collision-free
//! across every artifact of a run.

use crate::{
    config::{PipelineConfig, Versioning},
    core::{expand, fs_scan, hashing, versioning},
    errors::{Error, Result},
    export::{map, map::AssetMap, templates},
    reduce::{self, ReduceContext, ReduceOptions},
};
use serde::Serialize;
use std::{fs, path::Path};
use tracing::{error, info, warn};

/// Counts and output locations of one finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub out_dir: String,
    pub assets: usize,
    pub preminified: usize,
    pub templates: usize,
    pub map_file: Option<String>,
}

/// Execute the full pipeline for `cfg`.
pub fn run(cfg: &PipelineConfig) -> Result<RunSummary> {
    cfg.validate()?;

    info!(
        "run: minify={} reduce={} versioning={:?} inline={} clean={} keep_tree={}",
        cfg.features.minify,
        cfg.features.reduce,
        cfg.versioning,
        cfg.features.inline,
        cfg.features.clean,
        cfg.features.keep_tree,
    );
    info!(
        "run: static_dir={} templates_dir={} generation_dir={}",
        cfg.paths.static_dir, cfg.paths.templates_dir, cfg.paths.generation_dir,
    );

    let generation_dir = Path::new(&cfg.paths.generation_dir);
    if !generation_dir.exists() {
        return Err(Error::MissingDirectory {
            role: "generation",
            path: generation_dir.display().to_string(),
        });
    }

    // VCS short revision, only resolved when git versioning asks for it.
    let git_short_hash = match cfg.versioning {
        Some(Versioning::Git) => Some(versioning::git_short_hash(Path::new("."))?),
        _ => None,
    };

    // 1. Optionally wipe the generation directory.
    if cfg.features.clean {
        info!("run: cleaning {}", generation_dir.display());
        fs::remove_dir_all(generation_dir)?;
        fs::create_dir(generation_dir)?;
    }

    let gen_dir = fs_scan::absolute(generation_dir);
    let gen_dir_str = gen_dir.to_string_lossy().into_owned();
    let gen_basename = gen_dir
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();

    let mut asset_map = AssetMap::new();

    // 2. Scan the static root.
    let scan = fs_scan::scan_static(Path::new(&cfg.paths.static_dir), &cfg.filters.exclude_paths)?;

    // 3. Already-minified files pass through: hashed and mapped, not rebuilt.
    for path in &scan.preminified {
        if cfg.features.verbose {
            info!("preminified: {}", path.display());
        }
        let path_str = path.to_string_lossy();
        let file_hash = hashing::hash_file(path)?;

        let static_url = match path_str.split_once("static/") {
            Some((_, rest)) => format!("/static/{rest}"),
            None => {
                warn!(
                    "preminified: no static/ segment in {}, keying by file name",
                    path.display()
                );
                format!("/{}", path.file_name().unwrap_or_default().to_string_lossy())
            }
        };

        map::add_entry(
            &mut asset_map,
            &path_str,
            &static_url,
            &file_hash,
            &path_str,
            &cfg.output.integrity_key_removal,
            cfg.features.verbose,
        );
    }

    // 4. Expand, reduce, and bind every manifest.
    let mut ctx = ReduceContext::new();
    let mut assets = 0usize;

    for comp_path in &scan.manifests {
        let expanded = expand::expand_manifest(comp_path, cfg)?;
        let mut data = expand::normalize_indentation(&expanded.data);

        // The emitted name is the manifest name minus the `.comp` suffix;
        // the pre-rename path is what the map key derives from.
        let comp_str = comp_path.to_string_lossy();
        let stem = match comp_str.rfind(expand::COMP_EXTENSION) {
            Some(at) => &comp_str[..at],
            None => comp_str.as_ref(),
        };
        let pre_rename_path = stem.to_string();
        let file_name = Path::new(stem)
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        let mut write_path = gen_dir.join(&file_name);

        let is_js = file_name.ends_with(".js");
        let is_css = file_name.ends_with(".css");

        // Reduce (encode) the data.
        let mut dictionary = String::new();
        if cfg.features.reduce && is_js {
            let opts = ReduceOptions {
                public: expanded.reduce_public,
                skip_items: expanded.skip_items.clone(),
                ..ReduceOptions::default()
            };
            let outcome = reduce::reduce_source(&data, &mut ctx, &opts);

            for warning in &outcome.warnings {
                warn!("reduce: {warning}");
            }
            if !outcome.errors.is_empty() {
                for err in &outcome.errors {
                    error!("reduce: {err}");
                }
                return Err(Error::Reduction {
                    path: comp_path.display().to_string(),
                    count: outcome.errors.len(),
                });
            }

            data = outcome.text;
            dictionary = outcome.dictionary;
        }

        // Prepend the configured header and write.
        if is_css {
            data = format!("{}{}", cfg.output.header_css, data);
        } else if is_js {
            data = format!("{}{}", cfg.output.header_js, data);
        }
        fs::write(&write_path, &data)?;

        let file_hash = hashing::hash_file(&write_path)?;

        // Versioned rename.
        if let Some(mode) = cfg.versioning {
            let token = match mode {
                Versioning::Content => file_hash.as_str(),
                Versioning::Git => git_short_hash.as_deref().unwrap_or_default(),
            };
            let versioned = versioning::versioned_name(&file_name, token)?;
            let renamed = gen_dir.join(&versioned);
            fs::rename(&write_path, &renamed)?;
            write_path = renamed;
        }

        // The dictionary lands next to the artifact, extension `.min.dict`.
        let write_path_str = write_path.to_string_lossy().into_owned();
        if cfg.features.reduce && write_path_str.ends_with(".js") {
            let dict_path = write_path_str.replacen("min.js", "min.dict", 1);
            if dict_path != write_path_str {
                fs::write(&dict_path, &dictionary)?;
            }
        }

        let static_url = format!(
            "/{}{}",
            gen_basename,
            write_path_str.replace(&gen_dir_str, "")
        );
        map::add_entry(
            &mut asset_map,
            &write_path_str,
            &static_url,
            &file_hash,
            &pre_rename_path,
            &cfg.output.integrity_key_removal,
            cfg.features.verbose,
        );

        assets += 1;
    }
    info!("run: {} artifact(s) generated", assets);

    // 5. Expand HTML templates against the asset map.
    let template_paths = fs_scan::scan_templates(
        Path::new(&cfg.paths.templates_dir),
        &cfg.filters.exclude_paths,
    )?;
    let templates_written =
        templates::render_templates(&template_paths, cfg, &asset_map, git_short_hash.as_deref())?;
    info!("run: {} template(s) generated", templates_written);

    // 6. Serialize the map.
    let mut map_file = None;
    if let Some(name) = &cfg.output.map_file_name {
        let map_path = gen_dir.join(name);
        map::write_map(&map_path, &asset_map)?;
        info!("run: map written -> {}", map_path.display());
        map_file = Some(map_path.to_string_lossy().into_owned());
    }

    Ok(RunSummary {
        out_dir: gen_dir_str,
        assets,
        preminified: scan.preminified.len(),
        templates: templates_written,
        map_file,
    })
}
