//! The identifier reducer: rewrites user-chosen private constants,
//! functions, classes, methods, properties, arguments and block-scoped
//! variables into short encoded aliases, and emits a textual dictionary
//! describing every substitution.
//!
//! The reducer trusts well-formed, comment-free input (the template
//! expander strips comments before handing JS over). It performs a shallow,
//! delimiter-driven scan, never a real parse.

pub mod rewrite;
pub mod scope;
pub mod stream;
pub mod symbols;
pub mod tokenizer;

use scope::ClassWalkMode;
use symbols::SymbolTable;
use tracing::debug;

/// Per-run encoding counters for the globally numbered namespaces
/// (`C`, `f`, `CL`).
///
/// One context is constructed per pipeline invocation and threaded through
/// every artifact, so several JS files emitted together never collide even
/// when one loads the other in the browser.
#[derive(Debug, Default)]
pub struct ReduceContext {
    function_index: usize,
    constant_index: usize,
    class_index: usize,
}

impl ReduceContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next_function(&mut self) -> usize {
        self.function_index += 1;
        self.function_index
    }

    pub(crate) fn next_constant(&mut self) -> usize {
        self.constant_index += 1;
        self.constant_index
    }

    pub(crate) fn next_class(&mut self) -> usize {
        self.class_index += 1;
        self.class_index
    }
}

/// Options for one reduction.
#[derive(Debug, Clone)]
pub struct ReduceOptions {
    /// Extend reduction to public functions, methods and classes.
    pub public: bool,
    /// Names that are never renamed (per-file skip list).
    pub skip_items: Vec<String>,
    /// Reduce arguments and variables inside free functions.
    pub vars_on_functions: bool,
    /// Reduce arguments and variables inside class methods.
    pub vars_on_methods: bool,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            public: false,
            skip_items: Vec::new(),
            vars_on_functions: true,
            vars_on_methods: true,
        }
    }
}

/// The rewritten text, the dictionary dump, and the diagnostic logs of one
/// reduction. Errors are sticky: every pass ran regardless, so the logs
/// carry the maximum diagnostic surface of one invocation.
#[derive(Debug)]
pub struct ReduceOutcome {
    pub text: String,
    pub dictionary: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Reduce one assembled JavaScript artifact.
pub fn reduce_source(text: &str, ctx: &mut ReduceContext, opts: &ReduceOptions) -> ReduceOutcome {
    let mut table = SymbolTable::default();

    let mut tokens = tokenizer::tokenize(text, &mut table);

    // Local variables in free functions: var foo = ...
    if opts.vars_on_functions {
        tokens = scope::walk_functions(tokens, &mut table, ctx);
    }

    // Classes: first populate, then rewrite method names and properties.
    if opts.vars_on_methods {
        tokens = scope::walk_classes(tokens, &mut table, ctx, ClassWalkMode::Collect);
        tokens = scope::walk_classes(tokens, &mut table, ctx, ClassWalkMode::Rename);
    }

    // Global passes, strictly ordered.
    rewrite::detect_constants(&mut tokens, &mut table, ctx, opts.public, &opts.skip_items);
    rewrite::rewrite_constants(&mut tokens, &mut table);
    let public_function_names =
        rewrite::rewrite_function_names(&mut tokens, &mut table, ctx, opts.public, &opts.skip_items);
    if opts.public {
        rewrite::rewrite_public_methods(
            &mut tokens,
            &mut table,
            &public_function_names,
            &opts.skip_items,
        );
        rewrite::rewrite_class_names(&mut tokens, &mut table, ctx, &opts.skip_items);
    }

    let reduced = tokens.concat();

    if !text.is_empty() {
        let ratio = (1.0 - reduced.len() as f64 / text.len() as f64) * 100.0;
        debug!("reduce: {:.1}% smaller", ratio);
    }

    ReduceOutcome {
        text: reduced,
        dictionary: table.to_string(),
        errors: table.errors().to_vec(),
        warnings: table.warnings().to_vec(),
    }
}
