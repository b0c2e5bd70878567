//! Token-stream navigation helpers shared by the scope walker and the
//! rewriter.
//!
//! Lookups skip whitespace-only tokens but never consume them; positions out
//! of range yield empty strings so callers can compare against expected
//! tokens without bounds bookkeeping.

/// The nearest non-whitespace token before `start`, or `""` when none exists.
pub fn prev_word(tokens: &[String], start: usize) -> String {
    prev_words(tokens, start, 1).pop().unwrap_or_default()
}

/// The `n` nearest non-whitespace tokens before `start`, oldest first,
/// front-padded with `""` when the stream begins too early.
pub fn prev_words(tokens: &[String], start: usize, n: usize) -> Vec<String> {
    let mut found = Vec::with_capacity(n);
    let mut i = start;

    while found.len() < n && i > 0 {
        i -= 1;
        if !tokens[i].trim().is_empty() {
            found.push(tokens[i].clone());
        }
    }
    while found.len() < n {
        found.push(String::new());
    }
    found.reverse();
    found
}

/// The `n` nearest non-whitespace tokens after `start`, nearest first,
/// back-padded with `""` when the stream ends too early.
pub fn next_words(tokens: &[String], start: usize, n: usize) -> Vec<String> {
    let mut found = Vec::with_capacity(n);
    let mut i = start;

    while found.len() < n {
        i += 1;
        match tokens.get(i) {
            Some(t) if !t.trim().is_empty() => found.push(t.clone()),
            Some(_) => {}
            None => break,
        }
    }
    while found.len() < n {
        found.push(String::new());
    }
    found
}

/// Scan backwards from `from` (inclusive) for the nearest token equal to
/// `needle` and overwrite it with `value`. Used when the exact index is not
/// known because whitespace lookups do not report positions.
pub fn replace_backwards(tokens: &mut [String], needle: &str, value: &str, from: usize) -> bool {
    let mut i = from + 1;
    while i > 0 {
        i -= 1;
        if tokens[i] == needle {
            tokens[i] = value.to_string();
            return true;
        }
    }
    false
}

/// Whether `word` is a plain alphanumeric run (class-name shape).
pub fn is_alnum(word: &str) -> bool {
    !word.is_empty() && word.chars().all(char::is_alphanumeric)
}

/// Whether `word` is alphanumeric once underscores are ignored
/// (identifier shape; rejects pure-underscore runs).
pub fn is_alnum_name(word: &str) -> bool {
    let mut seen = false;
    for c in word.chars() {
        if c == '_' {
            continue;
        }
        if !c.is_alphanumeric() {
            return false;
        }
        seen = true;
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn prev_word_skips_whitespace() {
        let t = toks(&["const", " ", "\n", "__A"]);
        assert_eq!(prev_word(&t, 3), "const");
    }

    #[test]
    fn prev_word_at_stream_start_is_empty() {
        let t = toks(&["const"]);
        assert_eq!(prev_word(&t, 0), "");
    }

    #[test]
    fn prev_words_are_oldest_first_and_front_padded() {
        let t = toks(&["const", " ", "__A", " ", "="]);
        assert_eq!(prev_words(&t, 4, 3), vec!["", "const", "__A"]);
    }

    #[test]
    fn next_words_skip_whitespace_and_back_pad() {
        let t = toks(&["this", " ", ".", " ", "__p", " ", "="]);
        assert_eq!(next_words(&t, 0, 3), vec![".", "__p", "="]);
        assert_eq!(next_words(&t, 5, 3), vec!["=", "", ""]);
    }

    #[test]
    fn replace_backwards_hits_the_nearest_match() {
        let mut t = toks(&["a", "x", "b", "x", "c"]);
        assert!(replace_backwards(&mut t, "x", "Y", 4));
        assert_eq!(t, toks(&["a", "x", "b", "Y", "c"]));
        assert!(!replace_backwards(&mut t, "zz", "Y", 4));
    }

    #[test]
    fn identifier_shapes() {
        assert!(is_alnum("Widget2"));
        assert!(!is_alnum("__Widget"));
        assert!(is_alnum_name("__foo"));
        assert!(is_alnum_name("foo_bar3"));
        assert!(!is_alnum_name("___"));
        assert!(!is_alnum_name("a-b"));
    }
}
