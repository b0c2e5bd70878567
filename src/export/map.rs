//! The key-to-asset map binding symbolic keys to emitted artifacts.
//!
//! Keys are normalized pre-rename paths (see [`crate::core::hashing::map_key`]);
//! values carry the on-disk path, the subresource-integrity tag, and the
//! URL path the asset is served under. The map is a `BTreeMap` so the
//! serialized JSON is sorted by key regardless of insertion order.

use crate::core::hashing;
use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, io::BufWriter, path::Path};
use tracing::info;

/// One emitted asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetEntry {
    /// Absolute on-disk path of the (possibly renamed) artifact.
    pub abs_path: String,
    /// `"sha384-<base64>"` tag of the bytes on disk.
    pub integrity: String,
    /// URL path the asset is served under, starting with `/`.
    #[serde(rename = "static")]
    pub static_url: String,
}

pub type AssetMap = BTreeMap<String, AssetEntry>;

/// Register one artifact under its normalized key.
pub fn add_entry(
    map: &mut AssetMap,
    system_path: &str,
    static_url: &str,
    file_hash: &str,
    pre_rename_path: &str,
    integrity_key_removal: &str,
    verbose: bool,
) {
    let key = hashing::map_key(pre_rename_path, integrity_key_removal);

    if verbose {
        info!("map: key={key} static={static_url} sha384={file_hash}");
    }

    map.insert(
        key,
        AssetEntry {
            abs_path: system_path.to_string(),
            integrity: hashing::integrity_tag(file_hash),
            static_url: static_url.to_string(),
        },
    );
}

/// Serialize the map as pretty-printed JSON, keys ascending.
pub fn write_map(path: &Path, map: &AssetMap) -> Result<()> {
    let file = fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, map)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_keyed_by_normalized_path() {
        let mut map = AssetMap::new();
        add_entry(
            &mut map,
            "/out/abc.min.js",
            "/generated/abc.min.js",
            "HASH",
            "/srv/static/js/app.min.js",
            "/srv/",
            false,
        );
        let entry = map.get("static_js_app_min_js").unwrap();
        assert_eq!(entry.integrity, "sha384-HASH");
        assert_eq!(entry.static_url, "/generated/abc.min.js");
        assert_eq!(entry.abs_path, "/out/abc.min.js");
    }

    #[test]
    fn serialized_keys_are_sorted() {
        let mut map = AssetMap::new();
        add_entry(&mut map, "/b", "/b", "H", "zeta", "", false);
        add_entry(&mut map, "/a", "/a", "H", "alpha", "", false);
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.find("alpha").unwrap() < json.find("zeta").unwrap());
    }
}
