//! JS comment stripping for unminified-but-reducible input.
//!
//! The reducer's token scan does not understand comments, so whenever the
//! reducer is enabled and the minifier (which drops comments itself) is not,
//! this pre-pass runs unconditionally before tokenization.

/// Remove `/* ... */` and `// ...` comments from JavaScript text.
///
/// Block comment markers are recognized at whitespace boundaries; line
/// comments are cut at the first `//` that is not inside a quoted string,
/// so URLs like `'https://'` survive.
pub fn strip_js_comments(text: &str) -> String {
    let without_blocks = strip_block_comments(text);

    let mut lines: Vec<String> = Vec::new();
    for line in without_blocks.split('\n') {
        if line.contains("//") {
            lines.push(strip_line_comment(line));
        } else {
            lines.push(line.to_string());
        }
    }
    lines.join("\n")
}

fn strip_block_comments(text: &str) -> String {
    let mut kept = String::with_capacity(text.len());
    let mut inside = false;

    for piece in split_whitespace_runs(text) {
        if piece.starts_with("/*") {
            inside = true;
        } else if piece.ends_with("*/") {
            inside = false;
        } else if !inside {
            kept.push_str(piece);
        }
    }
    kept
}

fn strip_line_comment(line: &str) -> String {
    let mut kept = String::with_capacity(line.len());
    let mut active: Option<char> = None;

    for piece in split_on_space_and_quotes(line) {
        let quote = piece.chars().next().filter(|c| piece.len() == c.len_utf8());

        match (quote, active) {
            (Some(c @ ('\'' | '"')), None) => {
                active = Some(c);
                kept.push_str(piece);
            }
            (Some(c), Some(open)) if c == open => {
                active = None;
                kept.push_str(piece);
            }
            _ => {
                if active.is_none() && piece.contains("//") {
                    kept.push_str(piece.split("//").next().unwrap_or(""));
                    break;
                }
                kept.push_str(piece);
            }
        }
    }
    kept.trim().to_string()
}

/// Split into alternating whitespace and non-whitespace runs.
fn split_whitespace_runs(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (idx, c) in text.char_indices() {
        let ws = c.is_whitespace();
        match current {
            None => current = Some(ws),
            Some(prev) if prev != ws => {
                out.push(&text[start..idx]);
                start = idx;
                current = Some(ws);
            }
            _ => {}
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

/// Split so that every whitespace character and every quote is its own
/// piece, with the runs in between kept whole.
fn split_on_space_and_quotes(line: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;

    for (idx, c) in line.char_indices() {
        if c.is_whitespace() || c == '\'' || c == '"' {
            if idx > start {
                out.push(&line[start..idx]);
            }
            out.push(&line[idx..idx + c.len_utf8()]);
            start = idx + c.len_utf8();
        }
    }
    if start < line.len() {
        out.push(&line[start..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_comments_are_removed() {
        let out = strip_js_comments("var a = 1; /* a counter */ var b = 2;");
        assert!(!out.contains("counter"));
        assert!(out.contains("var a = 1;"));
        assert!(out.contains("var b = 2;"));
    }

    #[test]
    fn line_comments_are_cut_at_the_marker() {
        let out = strip_js_comments("var a = 1; // the answer\nvar b = 2;");
        assert_eq!(out, "var a = 1;\nvar b = 2;");
    }

    #[test]
    fn urls_inside_strings_survive() {
        let out = strip_js_comments("var url = 'https://example.com'; // remote\n");
        assert!(out.contains("'https://example.com'"));
        assert!(!out.contains("remote"));
    }

    #[test]
    fn double_slash_inside_double_quotes_survives() {
        let out = strip_js_comments("var u = \"//cdn.example.com\";");
        assert!(out.contains("\"//cdn.example.com\""));
    }
}
