//! Single-pass scope discovery over the token stream.
//!
//! Two complementary walks, both O(n):
//! - [`walk_functions`] finds free `function` declarations and hands each
//!   accumulated block to the shared function-block reducer;
//! - [`walk_classes`] finds classes, their properties and methods. It runs
//!   twice with identical traversal: `Collect` populates the symbol table
//!   and reduces method bodies, `Rename` rewrites private method names and
//!   `this.`/`self.`-qualified private properties once every class is known.
//!
//! The walker is delimiter-driven and trusts well-formed, comment-free
//! input; it never builds a syntax tree.

use crate::reduce::{
    ReduceContext,
    stream::{is_alnum, is_alnum_name, next_words, prev_word, prev_words},
    symbols::{BindingKind, SymbolTable},
};

/// Bindings shorter than this stay untouched; renaming them would not pay
/// for the dictionary entry.
const MIN_BINDING_LEN: usize = 3;

/// Which of the two class-walk runs is executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassWalkMode {
    Collect,
    Rename,
}

/// Reduce the slice of tokens for one function or method.
///
/// Registers the scope (free functions only; methods were registered at
/// their opening), extracts the argument list between the first `(` and the
/// first `)`, registers `var`/`let`/`const` bindings of the body, and
/// replaces every occurrence of each binding except property accesses
/// (occurrences whose previous non-whitespace token is `.`).
fn reduce_function_block(
    mut block: Vec<String>,
    name: &str,
    class: Option<&str>,
    table: &mut SymbolTable,
    ctx: &mut ReduceContext,
) -> Vec<String> {
    if class.is_none() {
        let encode = if name.starts_with("__") {
            Some(format!("f{}", ctx.next_function()))
        } else {
            None
        };
        table.add_function(name, encode);
    }

    // Argument list: everything between the first '(' and the first ')'.
    let mut header = String::new();
    let mut inside_args = false;
    for word in &block {
        if word == "(" {
            inside_args = true;
            continue;
        }
        if inside_args {
            if word == ")" {
                break;
            }
            header.push_str(word);
        }
    }

    for part in header.split(',') {
        let arg = match part.split_once('=') {
            Some((before_default, _)) => before_default,
            None => part,
        };
        let arg = arg.trim();
        if !arg.is_empty() && arg != "self" {
            match class {
                None => table.bind_in_function(name, BindingKind::Argument, arg),
                Some(class) => table.bind_in_method(class, name, BindingKind::Argument, arg),
            }
        }
    }

    // Body bindings: var / let / const followed by a long-enough identifier.
    for i in 0..block.len() {
        if block[i].trim().chars().count() < MIN_BINDING_LEN {
            continue;
        }
        let kind = match prev_word(&block, i).as_str() {
            "var" => BindingKind::Var,
            "let" => BindingKind::Let,
            "const" => BindingKind::Const,
            _ => continue,
        };
        let binding = block[i].clone();
        match class {
            None => table.bind_in_function(name, kind, &binding),
            Some(class) => table.bind_in_method(class, name, kind, &binding),
        }
    }

    // Replacement, skipping property accesses on other objects.
    let renames = match class {
        None => table.function_bindings(name),
        Some(class) => table.method_bindings(class, name),
    };
    for (source, encode) in &renames {
        for j in 0..block.len() {
            if block[j] == *source && prev_word(&block, j) != "." {
                block[j] = encode.clone();
            }
        }
    }

    block
}

/// Walk 1: free functions.
///
/// A `function` token whose previous non-whitespace token is not `=` (which
/// would make it an anonymous assignment or a nested function expression)
/// opens a block when the next two non-whitespace tokens look like
/// `<ident> (`. The block accumulates until brace depth returns to zero
/// after the first opening brace; braces are counted over the whole token
/// text, so braces inside joined literals participate here.
pub fn walk_functions(
    tokens: Vec<String>,
    table: &mut SymbolTable,
    ctx: &mut ReduceContext,
) -> Vec<String> {
    let mut new_words: Vec<String> = Vec::with_capacity(tokens.len());
    let mut block: Vec<String> = Vec::new();
    let mut depth: i64 = 0;
    let mut inside = false;
    let mut opened = false;
    let mut name = String::new();

    for i in 0..tokens.len() {
        let word = &tokens[i];

        if word == "function" && !inside {
            if prev_word(&tokens, i) != "=" {
                let next = next_words(&tokens, i, 2);
                if is_alnum_name(&next[0]) && next[1] == "(" {
                    name = next[0].clone();
                    inside = true;
                    opened = false;
                    block = vec![word.clone()];
                }
            }
            if !inside {
                name.clear();
                new_words.push(word.clone());
            }
        } else if inside {
            if !opened && word.contains('{') {
                opened = true;
            }
            depth += word.matches('{').count() as i64;
            depth -= word.matches('}').count() as i64;
            block.push(word.clone());

            if depth <= 0 && opened {
                let reduced =
                    reduce_function_block(std::mem::take(&mut block), &name, None, table, ctx);
                new_words.extend(reduced);
                inside = false;
                depth = 0;
            }
        } else {
            new_words.push(word.clone());
        }
    }

    // Unterminated block means malformed input; keep the raw tokens.
    new_words.append(&mut block);
    new_words
}

/// Walk 2: classes.
///
/// `Collect` registers classes, `this.`/`self.` private property
/// declarations and methods (handing each method body to the block
/// reducer); `Rename` replaces private method names and qualified private
/// property accesses using the populated table.
pub fn walk_classes(
    tokens: Vec<String>,
    table: &mut SymbolTable,
    ctx: &mut ReduceContext,
    mode: ClassWalkMode,
) -> Vec<String> {
    let mut tokens = tokens;
    let mut new_words: Vec<String> = Vec::with_capacity(tokens.len());
    let mut method_words: Vec<String> = Vec::new();

    let mut class_tag = false;
    let mut class_depth: i64 = -1;
    let mut class_name = String::new();

    let mut method_renames: Vec<(String, String)> = Vec::new();
    let mut property_renames: Vec<(String, String)> = Vec::new();

    let mut inside_method = false;
    let mut method_depth: i64 = 0;
    let mut method_name = String::new();
    let mut sequence = String::new();

    let collect = mode == ClassWalkMode::Collect;

    for i in 0..tokens.len() {
        let word = tokens[i].clone();

        if word == "class" && !class_tag {
            class_tag = true;
            class_depth = -1;
            class_name.clear();

            inside_method = false;
            method_depth = 0;
            sequence.clear();
            method_name.clear();

            if collect {
                new_words.push(word);
            }
            continue;
        }

        // Not suspecting a class: pass through.
        if !class_tag {
            if collect {
                new_words.push(word);
            }
            continue;
        }

        // Still searching for the class name.
        if class_name.is_empty() {
            if word.trim().is_empty() {
                // keep looking
            } else if !is_alnum(&word) {
                class_tag = false;
            } else {
                class_name = word.clone();
            }
            if collect {
                new_words.push(word);
            }
            continue;
        }

        // A stray token between the name and the body abandons the class
        // bit (comment-like artifacts around the `class` keyword).
        if !matches!(word.trim(), "{" | "") && class_depth == -1 {
            class_tag = false;
            class_name.clear();
            if collect {
                new_words.push(word);
            }
            continue;
        }

        if word == "{" {
            if class_depth == -1 {
                match mode {
                    ClassWalkMode::Collect => {
                        table.add_class(&class_name);
                        method_renames.clear();
                        property_renames.clear();
                    }
                    ClassWalkMode::Rename => {
                        method_renames = table.method_renames(&class_name);
                        property_renames = table.property_renames(&class_name);
                    }
                }
                class_depth = 1;
            } else {
                class_depth += 1;
            }
        } else if word == "}" {
            class_depth -= 1;
            if class_depth <= 0 {
                class_depth = -1;
                class_tag = false;
                class_name.clear();
                method_renames.clear();
                property_renames.clear();
            }
        }

        if mode == ClassWalkMode::Rename {
            if word.starts_with("__") {
                if let Some((_, encode)) = method_renames.iter().find(|(n, _)| *n == word) {
                    tokens[i] = encode.clone();
                } else if let Some((_, encode)) =
                    property_renames.iter().find(|(n, _)| *n == word)
                {
                    let prev = prev_words(&tokens, i, 2);
                    if (prev[0] == "this" || prev[0] == "self") && prev[1] == "." {
                        tokens[i] = encode.clone();
                    }
                }
            }
            continue;
        }

        // Property declarations, inside or outside a method body:
        // this.__name = ... / self.__name = ...
        if word == "self" || word == "this" {
            let next = next_words(&tokens, i, 3);
            if next[0] == "." && next[2] == "=" && next[1].starts_with("__") {
                table.add_property(&class_name, &next[1]);
            }
        }

        // Method openings: <name> ( args ) { tracked as the 3-step
        // sequence "(" -> "()" -> "(){".
        if !matches!(word.trim(), "" | "(") && sequence.is_empty() {
            method_name = word.clone();
        }

        if matches!(word.as_str(), "(" | ")" | "{") && !inside_method {
            if word == "{" && !sequence.contains(')') {
                // A '{' before the ')' belongs to a default-valued
                // argument (name(opt = {}) {...}) and must not open the
                // method body.
            } else {
                sequence.push_str(&word);
            }

            if !matches!(sequence.as_str(), "(" | "()" | "(){") {
                sequence.clear();
                new_words.push(word);
                continue;
            }
            if sequence == "(){" {
                inside_method = true;
                method_depth = 0;
                method_words.clear();

                // Pull back the already-emitted header: name ( args )
                if let Some(pos) = new_words.iter().rposition(|t| *t == method_name) {
                    method_words.extend(new_words.drain(pos..));
                }
                table.add_method(&class_name, &method_name);
            }
        }

        if !inside_method {
            new_words.push(word);
            continue;
        }

        method_words.push(word.clone());

        if word == "{" {
            method_depth += 1;
        } else if word == "}" {
            method_depth -= 1;
            if method_depth <= 0 {
                method_depth = 0;
                sequence.clear();
                inside_method = false;

                let reduced = reduce_function_block(
                    std::mem::take(&mut method_words),
                    &method_name,
                    Some(&class_name),
                    table,
                    ctx,
                );
                new_words.extend(reduced);
            }
        }
    }

    match mode {
        ClassWalkMode::Collect => {
            // Unterminated method means malformed input; keep the raw tokens.
            new_words.append(&mut method_words);
            new_words
        }
        ClassWalkMode::Rename => tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduce::tokenizer::tokenize;

    fn walk_free(src: &str) -> (String, SymbolTable) {
        let mut table = SymbolTable::default();
        let mut ctx = ReduceContext::new();
        let tokens = tokenize(src, &mut table);
        let out = walk_functions(tokens, &mut table, &mut ctx);
        (out.concat(), table)
    }

    fn walk_class_both(src: &str) -> (String, SymbolTable) {
        let mut table = SymbolTable::default();
        let mut ctx = ReduceContext::new();
        let tokens = tokenize(src, &mut table);
        let tokens = walk_classes(tokens, &mut table, &mut ctx, ClassWalkMode::Collect);
        let tokens = walk_classes(tokens, &mut table, &mut ctx, ClassWalkMode::Rename);
        (tokens.concat(), table)
    }

    #[test]
    fn free_function_arguments_and_vars_are_reduced() {
        let (out, table) = walk_free("function __foo(bar, baz){ var zzz = bar; }");
        assert_eq!(out, "function __foo(a1, a2){ var v1 = a1; }");
        let record = table.function("__foo").unwrap();
        assert_eq!(record.encode.as_deref(), Some("f1"));
    }

    #[test]
    fn short_bindings_are_left_alone() {
        let (out, _) = walk_free("function __g(){ var ab = 1; }");
        assert_eq!(out, "function __g(){ var ab = 1; }");
    }

    #[test]
    fn default_values_are_stripped_from_arguments() {
        let (out, _) = walk_free("function __f(opt = 1, rest){ return opt + rest; }");
        assert_eq!(out, "function __f(a1 = 1, a2){ return a1 + a2; }");
    }

    #[test]
    fn anonymous_assignment_is_not_a_declaration() {
        let (_, table) = walk_free("toto = function(){ var abc = 1; };");
        assert!(table.functions().is_empty());
    }

    #[test]
    fn property_access_is_preserved_inside_blocks() {
        let (out, _) = walk_free("function __f(data){ other.data = data; }");
        assert_eq!(out, "function __f(a1){ other.data = a1; }");
    }

    #[test]
    fn public_function_is_recorded_without_encoding() {
        let (_, table) = walk_free("function setup(a){ }");
        let record = table.function("setup").unwrap();
        assert_eq!(record.encode, None);
    }

    #[test]
    fn class_private_method_and_property() {
        let (out, table) = walk_class_both("class K { __m(x){ this.__p = x; } }");
        assert_eq!(out, "class K { m1(a1){ this.p0 = a1; } }");
        let class = table.class("K").unwrap();
        assert_eq!(class.method("__m").unwrap().encode.as_deref(), Some("m1"));
        assert_eq!(class.properties, vec![("__p".to_string(), "p0".to_string())]);
    }

    #[test]
    fn self_qualified_property_is_registered_and_renamed() {
        let (out, _) =
            walk_class_both("class K { __m(x){ self.__state = x; other.__state = x; } }");
        assert!(out.contains("self.p0"));
        assert!(out.contains("other.__state"));
    }

    #[test]
    fn default_valued_argument_does_not_open_the_body_early() {
        let (out, table) = walk_class_both("class K { __m(opt = {}){ var value = opt; } }");
        assert_eq!(out, "class K { m1(a1 = {}){ var v1 = a1; } }");
        let class = table.class("K").unwrap();
        assert_eq!(
            class.method("__m").unwrap().arguments,
            vec![("opt".to_string(), "a1".to_string())]
        );
    }

    #[test]
    fn non_alphanumeric_token_abandons_the_class_bit() {
        let (out, table) = walk_class_both("class __K { __m(x){ } }");
        assert_eq!(out, "class __K { __m(x){ } }");
        assert!(table.classes().is_empty());
    }

    #[test]
    fn methods_after_the_first_are_numbered_per_class() {
        let (out, table) = walk_class_both(
            "class K { __a(){ } render(){ } __b(){ } } class L { __z(){ } }",
        );
        assert_eq!(out, "class K { m1(){ } render(){ } m2(){ } } class L { m1(){ } }");
        assert_eq!(table.classes().len(), 2);
    }
}
