//! Content hashing and map-key normalization for the integrity binder.

use crate::errors::Result;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha384};
use std::{fs, path::Path};

/// Base64 of the SHA-384 digest of `bytes`.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha384::new();
    hasher.update(bytes);
    STANDARD.encode(hasher.finalize())
}

/// Base64 of the SHA-384 digest of the bytes on disk at `path`.
pub fn hash_file(path: &Path) -> Result<String> {
    Ok(hash_bytes(&fs::read(path)?))
}

/// Subresource-integrity tag for a base64 SHA-384 hash.
pub fn integrity_tag(hash_b64: &str) -> String {
    format!("sha384-{hash_b64}")
}

/// Map key for an artifact: the pre-rename path with `removal_prefix`
/// stripped (first occurrence), lowercased, and `/`, `-`, `.` collapsed to
/// `_`. The normalization is idempotent: applying it twice yields the same
/// key.
pub fn map_key(pre_rename_path: &str, removal_prefix: &str) -> String {
    let mut key = if removal_prefix.is_empty() {
        pre_rename_path.to_string()
    } else {
        pre_rename_path.replacen(removal_prefix, "", 1)
    };
    key = key.to_lowercase();
    for forbidden in ['/', '-', '.'] {
        key = key.replace(forbidden, "_");
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_tag_matches_the_digest_of_the_bytes() {
        // SHA-384("") is a fixed vector.
        assert_eq!(
            integrity_tag(&hash_bytes(b"")),
            "sha384-OLBgp1GsljhM2TJ+sbHjaiH9txEUvgdDTAzHv2P24donTt6/529l+9Ua0vFImLlb"
        );
    }

    #[test]
    fn map_key_strips_the_prefix_once_and_normalizes() {
        let key = map_key("/srv/app/static/js/app.min.js", "/srv/app/");
        assert_eq!(key, "static_js_app_min_js");
    }

    #[test]
    fn map_key_is_idempotent() {
        let once = map_key("/srv/app/static/js/App-v2.min.js", "/srv/app/");
        let twice = map_key(&once, "");
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_removal_prefix_is_a_no_op() {
        assert_eq!(map_key("a/b.js", ""), "a_b_js");
    }
}
