//! External minifier collaborators.
//!
//! The pipeline invokes minifiers but does not implement them. The
//! `minifier` crate does jsmin/cssmin-grade whitespace minification and
//! leaves identifiers alone, which matters: identifier renaming is the
//! reducer's job, and the reducer must be able to trust that the minifier
//! output still contains the declared names.

use crate::errors::{Error, Result};

/// Minify JavaScript text.
pub fn minify_js(source: &str) -> String {
    minifier::js::minify(source).to_string()
}

/// Minify CSS text.
pub fn minify_css(source: &str) -> Result<String> {
    minifier::css::minify(source)
        .map(|minified| minified.to_string())
        .map_err(|err| Error::CssMinify(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_minification_keeps_identifiers() {
        let out = minify_js("function __foo( bar )  {\n    return bar;\n}\n");
        assert!(out.contains("__foo"));
        assert!(out.contains("bar"));
        assert!(out.len() < "function __foo( bar )  {\n    return bar;\n}\n".len());
    }

    #[test]
    fn css_minification_shrinks_whitespace() {
        let out = minify_css("body {\n    color :  red ;\n}\n").unwrap();
        assert!(out.len() < "body {\n    color :  red ;\n}\n".len());
        assert!(out.contains("body"));
    }
}
