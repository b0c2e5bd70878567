//! Artifact filename versioning: content hash or VCS short revision.

use crate::errors::{Error, Result};
use git2::Repository;
use std::path::Path;

/// Short revision of `HEAD` for the repository containing `dir`.
pub fn git_short_hash(dir: &Path) -> Result<String> {
    let repo = Repository::discover(dir)?;
    let head = repo.revparse_single("HEAD")?;
    let short = head.short_id()?;
    Ok(short.as_str().unwrap_or_default().to_string())
}

/// Versioned artifact name: `<token>.min.<ext>`.
///
/// The original stem is dropped, the `.min.<ext>` suffix preserved. A token
/// containing `/` (base64 hashes do) would break the system path, so
/// slashes become dashes.
pub fn versioned_name(file_name: &str, token: &str) -> Result<String> {
    if !file_name.contains(".min.") {
        return Err(Error::InvalidFilename(file_name.to_string()));
    }
    let token = token.replace('/', "-");
    let extension = file_name.rsplitn(2, ".min.").next().unwrap_or_default();
    Ok(format!("{token}.min.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versioned_name_swaps_the_stem_and_keeps_the_extension() {
        assert_eq!(
            versioned_name("app.min.js", "abc123").unwrap(),
            "abc123.min.js"
        );
        assert_eq!(
            versioned_name("theme.min.css", "deadbeef").unwrap(),
            "deadbeef.min.css"
        );
    }

    #[test]
    fn slashes_in_the_token_become_dashes() {
        assert_eq!(
            versioned_name("app.min.js", "a/b+c/d").unwrap(),
            "a-b+c-d.min.js"
        );
    }

    #[test]
    fn a_name_without_min_infix_is_rejected() {
        assert!(matches!(
            versioned_name("app.js", "abc"),
            Err(Error::InvalidFilename(_))
        ));
    }
}
