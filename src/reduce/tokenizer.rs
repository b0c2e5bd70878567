//! Lexical splitting of assembled JavaScript into an ordered token stream.
//!
//! The split is delimiter-driven, not grammatical: every character from a
//! fixed single-character class (plus any whitespace character) becomes its
//! own token, and the runs between them become identifier/number/keyword
//! tokens. Two reassembly passes then glue back the pieces the split is not
//! allowed to look inside:
//! 1. the two fixed regex-literal artifacts `/"/g` and `/'/g`, whose embedded
//!    quote would otherwise open a string join at the wrong place;
//! 2. quoted string literals, joined into single opaque tokens so their
//!    contents are never analyzed or rewritten.
//!
//! Comments are not understood here; callers strip them beforehand.

use crate::reduce::symbols::SymbolTable;

/// Sequences whose single-character tokens are glued back together before
/// string joining runs.
const REGEX_ARTIFACTS: [&str; 2] = ["/\"/g", "/'/g"];

fn is_delimiter(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '[' | ']'
                | '('
                | ')'
                | '{'
                | '}'
                | '\''
                | '*'
                | '"'
                | '?'
                | '+'
                | '.'
                | '-'
                | ':'
                | ';'
                | ','
                | '%'
                | '/'
                | '!'
                | '&'
                | '|'
                | '='
                | '<'
                | '>'
        )
}

/// Split `text` on the delimiter class, keeping each delimiter as its own
/// token and dropping empty fragments.
fn split_source(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();

    for c in text.chars() {
        if is_delimiter(c) {
            if !word.is_empty() {
                tokens.push(std::mem::take(&mut word));
            }
            tokens.push(c.to_string());
        } else {
            word.push(c);
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }
    tokens
}

/// Glue the fixed regex-literal artifacts back into single tokens.
fn join_fixed_sequences(tokens: Vec<String>) -> Vec<String> {
    let mut out = tokens;

    for artifact in REGEX_ARTIFACTS {
        let parts: Vec<String> = artifact.chars().map(|c| c.to_string()).collect();
        let mut joined = Vec::with_capacity(out.len());
        let mut i = 0;

        while i < out.len() {
            if i + parts.len() <= out.len() && out[i..i + parts.len()] == parts[..] {
                joined.push(artifact.to_string());
                i += parts.len();
            } else {
                joined.push(out[i].clone());
                i += 1;
            }
        }
        out = joined;
    }
    out
}

/// Join quoted string literals into single opaque tokens.
///
/// A single active delimiter (`'` or `"`) is carried left-to-right; tokens
/// accumulate in a buffer until a token ending with the active delimiter
/// closes the literal. Single-token literals (`"hello"`) and empty literals
/// (`""`) are emitted directly without buffering. A newline inside a joined
/// literal is reported as a warning, not a failure.
fn join_string_literals(tokens: Vec<String>, table: &mut SymbolTable) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut buffer: Vec<String> = Vec::new();
    let mut delimiter: Option<char> = None;

    for word in tokens {
        if buffer.is_empty() {
            if word.starts_with('\'') {
                delimiter = Some('\'');
            } else if word.starts_with('"') {
                delimiter = Some('"');
            } else if delimiter.is_some() {
                delimiter = None;
            }
        }

        let Some(d) = delimiter else {
            out.push(word);
            continue;
        };

        if word.starts_with(d) && buffer.is_empty() {
            let bare = d.to_string();
            let empty_literal = format!("{d}{d}");

            if (word != bare && word.ends_with(d)) || word == empty_literal {
                out.push(word);
                delimiter = None;
            } else {
                buffer.push(word);
            }
        } else if word.ends_with(d) && !buffer.is_empty() {
            buffer.push(word);
            let literal: String = buffer.concat();

            if literal.contains('\n') {
                table.push_warning(format!(
                    "joined string crosses a line boundary: {}",
                    literal.escape_debug()
                ));
            }

            buffer.clear();
            delimiter = None;
            out.push(literal);
        } else if !buffer.is_empty() {
            buffer.push(word);
        } else {
            out.push(word);
        }
    }

    // An unterminated literal means malformed input; keep the raw tokens
    // rather than dropping text.
    out.append(&mut buffer);
    out
}

/// Tokenize assembled JavaScript for the reducer.
pub fn tokenize(text: &str, table: &mut SymbolTable) -> Vec<String> {
    let words = split_source(text);
    let words = join_fixed_sequences(words);
    join_string_literals(words, table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize_silent(text: &str) -> Vec<String> {
        let mut table = SymbolTable::default();
        tokenize(text, &mut table)
    }

    #[test]
    fn split_keeps_delimiters_as_tokens() {
        let tokens = tokenize_silent("var x=1;");
        assert_eq!(tokens, vec!["var", " ", "x", "=", "1", ";"]);
    }

    #[test]
    fn string_literal_is_one_opaque_token() {
        let tokens = tokenize_silent("var url = \"https://example.com/__foo\";");
        assert!(tokens.contains(&"\"https://example.com/__foo\"".to_string()));
        assert!(!tokens.contains(&"__foo".to_string()));
    }

    #[test]
    fn single_quoted_literal_with_embedded_double_quote() {
        let tokens = tokenize_silent("a = 'say \"hi\"';");
        assert!(tokens.contains(&"'say \"hi\"'".to_string()));
    }

    #[test]
    fn empty_literal_is_emitted_without_buffering() {
        let tokens = tokenize_silent("a = \"\";b = '';");
        assert!(tokens.contains(&"\"\"".to_string()));
        assert!(tokens.contains(&"''".to_string()));
    }

    #[test]
    fn regex_artifacts_are_reassembled() {
        let tokens = tokenize_silent("s.replace(/'/g, \"x\")");
        assert!(tokens.contains(&"/'/g".to_string()));

        let tokens = tokenize_silent("s.replace(/\"/g, 'x')");
        assert!(tokens.contains(&"/\"/g".to_string()));
    }

    #[test]
    fn newline_inside_literal_is_a_warning_not_a_failure() {
        let mut table = SymbolTable::default();
        let tokens = tokenize("a = \"first\nsecond\";", &mut table);
        assert!(tokens.contains(&"\"first\nsecond\"".to_string()));
        assert_eq!(table.warnings().len(), 1);
        assert!(table.errors().is_empty());
    }

    #[test]
    fn roundtrip_preserves_every_byte() {
        let src = "function __f(a, b) { return 'x-y' + \"z\"; }\n";
        let tokens = tokenize_silent(src);
        assert_eq!(tokens.concat(), src);
    }
}
