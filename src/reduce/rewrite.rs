//! Global rewrite passes executed after the scope walks.
//!
//! Pass order is fixed: top-level constants, constant usages, function
//! names, public method unification, class names. Within a pass, symbol
//! iteration is by sorted name (constants, functions) or insertion order
//! (classes), and token scans are strictly left-to-right, so two runs over
//! the same input produce byte-identical output.

use crate::reduce::{
    ReduceContext,
    stream::{is_alnum_name, prev_word, prev_words, replace_backwards},
    symbols::SymbolTable,
};

/// Method and function names that are never renamed in public mode; the DOM
/// and the runtime call these by their literal names.
pub const EXCLUDE_PUBLIC_NAMES: [&str; 5] = [
    "constructor",
    "addEventListener",
    "display",
    "onclick",
    "onreadystatechange",
];

/// Pass 1: detect top-level constants and the keys of their dictionary
/// initializers.
///
/// At brace depth zero, `const <name>` declares a constant when `<name>` is
/// private (or, in public mode, alphanumeric modulo underscores) and off the
/// skip list. A following `= {` opens the nested-dictionary state: every
/// `k : v` key inside the outermost braces is registered as `p<i>` and the
/// key token rewritten in place.
pub fn detect_constants(
    tokens: &mut Vec<String>,
    table: &mut SymbolTable,
    ctx: &mut ReduceContext,
    public: bool,
    skip: &[String],
) {
    let mut current_constant = String::new();
    let mut inside_dict = false;
    let mut dict_depth: i64 = 0;
    let mut depth: i64 = 0;

    for i in 0..tokens.len() {
        let word = tokens[i].clone();

        if word.trim().is_empty() {
            continue;
        }

        let prev = prev_words(tokens, i, 3);

        if word == "{" {
            depth += 1;
        } else if word == "}" {
            depth -= 1;
        }

        if depth == 0
            && prev[2] == "const"
            && (word.starts_with("__") || (public && is_alnum_name(&word)))
            && !skip.contains(&word)
        {
            let encode = format!("C{}", ctx.next_constant());
            table.add_constant(&word, &encode);
            current_constant = word.clone();
        } else if word == "{"
            && prev[2] == "="
            && !current_constant.is_empty()
            && prev[1] == current_constant
            && prev[0] == "const"
        {
            inside_dict = true;
        }

        if inside_dict {
            if word == "{" {
                dict_depth += 1;
            } else if word == "}" {
                dict_depth -= 1;
            }

            if dict_depth <= 0 {
                inside_dict = false;
                current_constant.clear();
                continue;
            }

            if word == ":" {
                let key = prev[2].clone();
                if let Some(encode) = table.add_constant_parameter(&current_constant, &key) {
                    if !replace_backwards(tokens, &key, &encode, i.saturating_sub(1)) {
                        table.push_error(format!(
                            "constant key not rewritten: {current_constant}.{key}:{encode}"
                        ));
                    }
                }
            }
        }
    }
}

/// Pass 2: rewrite constant usages.
///
/// For every declared constant (sorted by name): `<name> . <key>` accesses
/// first, logging a miss and leaving the token unchanged when the key was
/// never registered; then every bare occurrence of `<name>`.
pub fn rewrite_constants(tokens: &mut Vec<String>, table: &mut SymbolTable) {
    let mut names: Vec<String> = table.constants().iter().map(|c| c.name.clone()).collect();
    names.sort();

    for name in names {
        let Some(record) = table.constant(&name).cloned() else {
            continue;
        };

        if !record.parameters.is_empty() {
            for i in 0..tokens.len() {
                if tokens[i].trim().is_empty() {
                    continue;
                }
                let prev = prev_words(tokens, i, 2);
                if prev[0] == name && prev[1] == "." {
                    let word = tokens[i].clone();
                    match record.parameter(&word) {
                        Some(encode) => tokens[i] = encode.to_string(),
                        None => {
                            table.push_error(format!("key {word} not found in constant {name}"))
                        }
                    }
                }
            }
        }

        for token in tokens.iter_mut() {
            if *token == name {
                *token = record.encode.clone();
            }
        }
    }
}

/// Pass 3: rewrite function names.
///
/// Private functions carry the encoding assigned at declaration; eligible
/// public functions (public mode, off the skip list and the fixed exclusion
/// set) are assigned the next global `f` index here. Returns the names of
/// all public functions for the shadow check of the public-method pass.
pub fn rewrite_function_names(
    tokens: &mut [String],
    table: &mut SymbolTable,
    ctx: &mut ReduceContext,
    public: bool,
    skip: &[String],
) -> Vec<String> {
    let mut names: Vec<String> = table.functions().iter().map(|f| f.name.clone()).collect();
    names.sort();

    let mut public_function_names = Vec::new();

    for name in names {
        if !name.starts_with("__") {
            public_function_names.push(name.clone());

            if !public
                || skip.contains(&name)
                || EXCLUDE_PUBLIC_NAMES.contains(&name.as_str())
            {
                continue;
            }
        }

        let encode = match table.function(&name).and_then(|f| f.encode.clone()) {
            Some(encode) => encode,
            None => {
                let encode = format!("f{}", ctx.next_function());
                table.set_function_encode(&name, &encode);
                encode
            }
        };

        for token in tokens.iter_mut() {
            if *token == name {
                *token = encode.clone();
            }
        }
    }

    public_function_names
}

/// Pass 4 (public mode): unify public method names across classes.
///
/// The first class to declare a public method wins the global `mp<k>`
/// encoding; every later class reuses it. Declaration sites are detected as
/// `<name> (`, member accesses as `. <name>`. A name that collides with a
/// public function is a warning and that replacement is skipped.
pub fn rewrite_public_methods(
    tokens: &mut Vec<String>,
    table: &mut SymbolTable,
    public_function_names: &[String],
    skip: &[String],
) {
    let mut public_methods: Vec<(String, String)> = Vec::new();
    let mut assignments: Vec<(String, String, String)> = Vec::new();

    for class in table.classes() {
        for method in &class.methods {
            let name = &method.name;
            if !name.starts_with("__")
                && !EXCLUDE_PUBLIC_NAMES.contains(&name.as_str())
                && !public_methods.iter().any(|(n, _)| n == name)
                && !skip.contains(name)
            {
                let encode = format!("mp{}", public_methods.len());
                public_methods.push((name.clone(), encode.clone()));
                assignments.push((class.name.clone(), name.clone(), encode));
            }
        }
    }
    for (class, method, encode) in &assignments {
        table.set_method_encode(class, method, encode);
    }

    for i in 0..tokens.len() {
        let word = tokens[i].clone();
        let prev = prev_word(tokens, i);

        if word == "(" {
            let Some((_, encode)) = public_methods.iter().find(|(n, _)| *n == prev) else {
                continue;
            };
            if public_function_names.contains(&prev) {
                table.push_warning(format!(
                    "public method name shadows public function: {prev}"
                ));
                continue;
            }
            let encode = encode.clone();
            if !replace_backwards(tokens, &prev, &encode, i.saturating_sub(1)) {
                table.push_error(format!("public method name not rewritten: {prev}:{encode}"));
            }
        } else if prev == "." {
            let Some((_, encode)) = public_methods.iter().find(|(n, _)| *n == word) else {
                continue;
            };
            if public_function_names.contains(&word) {
                table.push_warning(format!(
                    "public method name shadows public function: {word}"
                ));
                continue;
            }
            tokens[i] = encode.clone();
        }
    }
}

/// Pass 5 (public mode): rename classes.
pub fn rewrite_class_names(
    tokens: &mut [String],
    table: &mut SymbolTable,
    ctx: &mut ReduceContext,
    skip: &[String],
) {
    let names: Vec<String> = table.classes().iter().map(|c| c.name.clone()).collect();

    for name in names {
        if skip.contains(&name) {
            continue;
        }
        let encode = format!("CL{}", ctx.next_class());
        table.set_class_encode(&name, &encode);

        for token in tokens.iter_mut() {
            if *token == name {
                *token = encode.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn method_shadowing_a_public_function_is_a_warning_and_skipped() {
        let mut table = SymbolTable::default();
        table.add_class("A");
        table.add_method("A", "print");

        let mut tokens = toks(&["a", ".", "print", "(", ")", ";"]);
        let public_functions = vec!["print".to_string()];

        rewrite_public_methods(&mut tokens, &mut table, &public_functions, &[]);

        assert_eq!(tokens[2], "print");
        assert!(!table.warnings().is_empty());
        assert!(table.errors().is_empty());
    }

    #[test]
    fn first_class_wins_the_public_method_encoding() {
        let mut table = SymbolTable::default();
        table.add_class("A");
        table.add_method("A", "draw");
        table.add_class("B");
        table.add_method("B", "draw");

        let mut tokens = toks(&["x", ".", "draw", "(", ")", ";"]);
        rewrite_public_methods(&mut tokens, &mut table, &[], &[]);

        assert_eq!(tokens[2], "mp0");
        assert_eq!(
            table
                .class("A")
                .unwrap()
                .method("draw")
                .unwrap()
                .encode
                .as_deref(),
            Some("mp0")
        );
    }
}
