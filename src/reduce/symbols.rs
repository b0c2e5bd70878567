//! Scoped symbol table for the identifier reducer.
//!
//! A passive structure: the scope walker and the rewriter drive it through
//! narrow operations, and every diagnostic lands in an append-only log
//! instead of aborting the pass. Per-scope collections keep insertion order
//! so encodings are derived from container sizes at insertion time and stay
//! stable for the lifetime of a run.
//!
//! The `Display` impl is the emitted dictionary: a column-aligned, human
//! readable dump of every substitution, errors first.

use std::fmt;

/// Binding kinds tracked inside one function or method scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Argument,
    Var,
    Const,
    Let,
}

impl BindingKind {
    fn prefix(self) -> char {
        match self {
            BindingKind::Argument => 'a',
            BindingKind::Var => 'v',
            BindingKind::Const => 'c',
            BindingKind::Let => 'l',
        }
    }

    fn label(self) -> &'static str {
        match self {
            BindingKind::Argument => "argument",
            BindingKind::Var => "var",
            BindingKind::Const => "const",
            BindingKind::Let => "let",
        }
    }
}

/// Outcome of registering a binding in a scope.
///
/// `Idempotent` covers the var/let/const same-kind redeclaration that the
/// brace-unaware body scan produces when both branches of an if/else declare
/// the same name; `Conflict` is a hard error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    Added,
    Idempotent,
    Conflict,
}

/// One top-level constant, with the keys of its dictionary initializer.
#[derive(Debug, Clone)]
pub struct ConstantRecord {
    pub name: String,
    pub encode: String,
    /// key name -> `p<i>` encoding, insertion-ordered.
    pub parameters: Vec<(String, String)>,
}

impl ConstantRecord {
    fn add_parameter(&mut self, key: &str) -> Option<String> {
        if self.parameters.iter().any(|(name, _)| name == key) {
            return None;
        }
        let encode = format!("p{}", self.parameters.len());
        self.parameters.push((key.to_string(), encode.clone()));
        Some(encode)
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, enc)| enc.as_str())
    }
}

/// One free function or class method. Methods are function records owned by
/// a [`ClassRecord`]; the block reducer treats both identically.
#[derive(Debug, Clone)]
pub struct FunctionRecord {
    pub name: String,
    pub encode: Option<String>,
    pub arguments: Vec<(String, String)>,
    pub variables: Vec<(String, String)>,
    pub constants: Vec<(String, String)>,
    pub lets: Vec<(String, String)>,
}

impl FunctionRecord {
    fn new(name: &str, encode: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            encode,
            arguments: Vec::new(),
            variables: Vec::new(),
            constants: Vec::new(),
            lets: Vec::new(),
        }
    }

    fn bind(&mut self, kind: BindingKind, name: &str) -> BindOutcome {
        let contains = |list: &[(String, String)]| list.iter().any(|(n, _)| n == name);

        let own: &[(String, String)] = match kind {
            BindingKind::Argument => &self.arguments,
            BindingKind::Var => &self.variables,
            BindingKind::Const => &self.constants,
            BindingKind::Let => &self.lets,
        };
        let others: [&[(String, String)]; 3] = match kind {
            BindingKind::Argument => [&self.variables, &self.constants, &self.lets],
            BindingKind::Var => [&self.arguments, &self.constants, &self.lets],
            BindingKind::Const => [&self.arguments, &self.variables, &self.lets],
            BindingKind::Let => [&self.arguments, &self.variables, &self.constants],
        };

        if others.into_iter().any(|list| contains(list)) {
            return BindOutcome::Conflict;
        }
        if contains(own) {
            return if kind == BindingKind::Argument {
                BindOutcome::Conflict
            } else {
                BindOutcome::Idempotent
            };
        }

        let encode = format!("{}{}", kind.prefix(), own.len() + 1);
        match kind {
            BindingKind::Argument => self.arguments.push((name.to_string(), encode)),
            BindingKind::Var => self.variables.push((name.to_string(), encode)),
            BindingKind::Const => self.constants.push((name.to_string(), encode)),
            BindingKind::Let => self.lets.push((name.to_string(), encode)),
        }
        BindOutcome::Added
    }

    /// Every binding of this scope in replacement order: arguments, vars,
    /// consts, lets.
    pub fn bindings(&self) -> Vec<(String, String)> {
        let mut all = Vec::with_capacity(
            self.arguments.len() + self.variables.len() + self.constants.len() + self.lets.len(),
        );
        all.extend(self.arguments.iter().cloned());
        all.extend(self.variables.iter().cloned());
        all.extend(self.constants.iter().cloned());
        all.extend(self.lets.iter().cloned());
        all
    }
}

/// One class: properties plus methods, insertion-ordered.
#[derive(Debug, Clone)]
pub struct ClassRecord {
    pub name: String,
    pub encode: Option<String>,
    /// property name -> `p<i>` encoding.
    pub properties: Vec<(String, String)>,
    pub methods: Vec<FunctionRecord>,
}

impl ClassRecord {
    fn add_property(&mut self, name: &str) -> bool {
        if self.properties.iter().any(|(n, _)| n == name) {
            return false;
        }
        let encode = format!("p{}", self.properties.len());
        self.properties.push((name.to_string(), encode));
        true
    }

    fn add_method(&mut self, name: &str) -> bool {
        if self.methods.iter().any(|m| m.name == name) {
            return false;
        }
        let encode = if name.starts_with("__") {
            let private_count = self
                .methods
                .iter()
                .filter(|m| m.name.starts_with("__"))
                .count();
            Some(format!("m{}", private_count + 1))
        } else {
            None
        };
        self.methods.push(FunctionRecord::new(name, encode));
        true
    }

    pub fn method(&self, name: &str) -> Option<&FunctionRecord> {
        self.methods.iter().find(|m| m.name == name)
    }

    fn method_mut(&mut self, name: &str) -> Option<&mut FunctionRecord> {
        self.methods.iter_mut().find(|m| m.name == name)
    }
}

/// The per-artifact symbol table: constants, free functions, classes, and
/// the append-only diagnostic logs.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    errors: Vec<String>,
    warnings: Vec<String>,
    constants: Vec<ConstantRecord>,
    functions: Vec<FunctionRecord>,
    classes: Vec<ClassRecord>,
}

impl SymbolTable {
    pub fn push_error(&mut self, text: impl Into<String>) {
        self.errors.push(format!("[Error] {}", text.into()));
    }

    pub fn push_warning(&mut self, text: impl Into<String>) {
        self.warnings.push(format!("[Warning] {}", text.into()));
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /* ---------------------------- constants ---------------------------- */

    pub fn add_constant(&mut self, name: &str, encode: &str) {
        if self.constants.iter().any(|c| c.name == name) {
            self.push_error(format!("constant already declared: {name}"));
            return;
        }
        self.constants.push(ConstantRecord {
            name: name.to_string(),
            encode: encode.to_string(),
            parameters: Vec::new(),
        });
    }

    /// Register a dictionary key of `constant` and return its encoding, or
    /// `None` when the constant is unknown or the key already registered.
    pub fn add_constant_parameter(&mut self, constant: &str, key: &str) -> Option<String> {
        let Some(record) = self.constants.iter_mut().find(|c| c.name == constant) else {
            self.push_error(format!("constant not found: {constant}"));
            return None;
        };
        match record.add_parameter(key) {
            Some(encode) => Some(encode),
            None => {
                self.push_error(format!("constant key already registered: {constant}.{key}"));
                None
            }
        }
    }

    pub fn constant(&self, name: &str) -> Option<&ConstantRecord> {
        self.constants.iter().find(|c| c.name == name)
    }

    pub fn constants(&self) -> &[ConstantRecord] {
        &self.constants
    }

    /* ---------------------------- functions ---------------------------- */

    pub fn add_function(&mut self, name: &str, encode: Option<String>) {
        if self.functions.iter().any(|f| f.name == name) {
            self.push_error(format!("function already declared: {name}"));
            return;
        }
        self.functions.push(FunctionRecord::new(name, encode));
    }

    pub fn function(&self, name: &str) -> Option<&FunctionRecord> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn functions(&self) -> &[FunctionRecord] {
        &self.functions
    }

    pub fn set_function_encode(&mut self, name: &str, encode: &str) {
        match self.functions.iter_mut().find(|f| f.name == name) {
            Some(f) => f.encode = Some(encode.to_string()),
            None => self.push_error(format!("function not found: {name}")),
        }
    }

    pub fn bind_in_function(&mut self, function: &str, kind: BindingKind, name: &str) {
        let Some(record) = self.functions.iter_mut().find(|f| f.name == function) else {
            self.push_error(format!("function not found: {function}"));
            return;
        };
        match record.bind(kind, name) {
            BindOutcome::Added | BindOutcome::Idempotent => {}
            BindOutcome::Conflict => {
                self.push_error(format!(
                    "{} redeclared in {function}: {name}",
                    kind.label()
                ));
            }
        }
    }

    /// Replacement pairs for one free function, or an empty list (with a
    /// logged error) when it was never declared.
    pub fn function_bindings(&mut self, function: &str) -> Vec<(String, String)> {
        match self.functions.iter().find(|f| f.name == function) {
            Some(f) => f.bindings(),
            None => {
                self.push_error(format!("function not found: {function}"));
                Vec::new()
            }
        }
    }

    /* ----------------------------- classes ----------------------------- */

    pub fn add_class(&mut self, name: &str) {
        if self.classes.iter().any(|c| c.name == name) {
            self.push_error(format!("class already declared: {name}"));
            return;
        }
        self.classes.push(ClassRecord {
            name: name.to_string(),
            encode: None,
            properties: Vec::new(),
            methods: Vec::new(),
        });
    }

    pub fn class(&self, name: &str) -> Option<&ClassRecord> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn classes(&self) -> &[ClassRecord] {
        &self.classes
    }

    pub fn set_class_encode(&mut self, name: &str, encode: &str) {
        match self.classes.iter_mut().find(|c| c.name == name) {
            Some(c) => c.encode = Some(encode.to_string()),
            None => self.push_error(format!("class not found: {name}")),
        }
    }

    pub fn add_method(&mut self, class: &str, method: &str) {
        let Some(record) = self.classes.iter_mut().find(|c| c.name == class) else {
            self.push_error(format!("class not found: {class}"));
            return;
        };
        if !record.add_method(method) {
            self.push_error(format!("method already declared: {class}.{method}"));
        }
    }

    pub fn set_method_encode(&mut self, class: &str, method: &str, encode: &str) {
        let Some(record) = self.classes.iter_mut().find(|c| c.name == class) else {
            self.push_error(format!("class not found: {class}"));
            return;
        };
        match record.method_mut(method) {
            Some(m) => m.encode = Some(encode.to_string()),
            None => self.push_error(format!("method not found: {class}.{method}")),
        }
    }

    /// Properties are registered tolerantly: a repeated declaration keeps the
    /// first encoding.
    pub fn add_property(&mut self, class: &str, property: &str) {
        let Some(record) = self.classes.iter_mut().find(|c| c.name == class) else {
            self.push_error(format!("class not found: {class}"));
            return;
        };
        record.add_property(property);
    }

    pub fn bind_in_method(&mut self, class: &str, method: &str, kind: BindingKind, name: &str) {
        let Some(class_record) = self.classes.iter_mut().find(|c| c.name == class) else {
            self.push_error(format!("class not found: {class}"));
            return;
        };
        let Some(record) = class_record.method_mut(method) else {
            self.push_error(format!("method not found: {class}.{method}"));
            return;
        };
        match record.bind(kind, name) {
            BindOutcome::Added | BindOutcome::Idempotent => {}
            BindOutcome::Conflict => {
                self.push_error(format!(
                    "{} redeclared in {class}.{method}: {name}",
                    kind.label()
                ));
            }
        }
    }

    /// Replacement pairs for one method, or an empty list (with a logged
    /// error) when either the class or the method was never declared.
    pub fn method_bindings(&mut self, class: &str, method: &str) -> Vec<(String, String)> {
        let Some(class_record) = self.classes.iter().find(|c| c.name == class) else {
            self.push_error(format!("class not found: {class}"));
            return Vec::new();
        };
        match class_record.method(method) {
            Some(m) => m.bindings(),
            None => {
                self.push_error(format!("method not found: {class}.{method}"));
                Vec::new()
            }
        }
    }

    /// Method-name replacement pairs for one class: every method that holds
    /// an encoding.
    pub fn method_renames(&self, class: &str) -> Vec<(String, String)> {
        match self.classes.iter().find(|c| c.name == class) {
            Some(record) => record
                .methods
                .iter()
                .filter_map(|m| m.encode.as_ref().map(|e| (m.name.clone(), e.clone())))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Property replacement pairs for one class.
    pub fn property_renames(&self, class: &str) -> Vec<(String, String)> {
        match self.classes.iter().find(|c| c.name == class) {
            Some(record) => record.properties.clone(),
            None => Vec::new(),
        }
    }
}

/* ---------------------------- dictionary dump ---------------------------- */

const ALIGN: usize = 150;

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.errors.is_empty() || !self.warnings.is_empty() {
            writeln!(f)?;
            for line in self.errors.iter().chain(self.warnings.iter()) {
                writeln!(f, "{line}")?;
            }
        }

        if !self.constants.is_empty() {
            writeln!(f)?;
            for constant in &self.constants {
                writeln!(f, "{constant}")?;
            }
        }

        if !self.functions.is_empty() {
            writeln!(f)?;
            for function in &self.functions {
                writeln!(f, "{}", fmt_function(function))?;
            }
        }

        if !self.classes.is_empty() {
            writeln!(f)?;
            for class in &self.classes {
                writeln!(f, "{class}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for ConstantRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\n const {:<ALIGN$} {}", self.encode, self.name)?;
        for (key, encode) in &self.parameters {
            write!(f, "\n    {encode}:{key}")?;
        }
        Ok(())
    }
}

fn fmt_bindings(out: &mut String, indent: &str, list: &[(String, String)]) {
    if list.is_empty() {
        return;
    }
    out.push('\n');
    let lines: Vec<String> = list
        .iter()
        .map(|(name, encode)| format!("{indent}{encode}:{name}"))
        .collect();
    out.push_str(&lines.join("\n"));
    out.push('\n');
}

fn fmt_args(record: &FunctionRecord) -> String {
    record
        .arguments
        .iter()
        .map(|(name, encode)| format!("{encode}:{name}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn fmt_function(record: &FunctionRecord) -> String {
    let args = fmt_args(record);
    let mut out = match &record.encode {
        None => format!(" function {}({args})", record.name),
        Some(encode) => {
            let head = format!("{encode}({args})");
            format!(" function {head:<ALIGN$} {}", record.name)
        }
    };
    fmt_bindings(&mut out, "\t", &record.variables);
    fmt_bindings(&mut out, "\t", &record.constants);
    fmt_bindings(&mut out, "\t", &record.lets);
    out
}

fn fmt_method(record: &FunctionRecord) -> String {
    let args = fmt_args(record);
    let mut out = match &record.encode {
        None => format!("\t{}({args})", record.name),
        Some(encode) => {
            let head = format!("\t{encode}({args})");
            format!("{head:<ALIGN$} {}", record.name)
        }
    };
    fmt_bindings(&mut out, "\t   ", &record.variables);
    fmt_bindings(&mut out, "\t   ", &record.constants);
    fmt_bindings(&mut out, "\t   ", &record.lets);
    out
}

impl fmt::Display for ClassRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.encode {
            None => write!(f, "{}:", self.name)?,
            Some(encode) => write!(f, "{encode}:{}", self.name)?,
        }

        if !self.properties.is_empty() {
            writeln!(f)?;
            for (name, encode) in &self.properties {
                let encoded = format!("\n\tthis.{encode}");
                write!(f, "{encoded:<ALIGN$} \tthis.{name}")?;
            }
            writeln!(f)?;
        }

        if !self.methods.is_empty() {
            writeln!(f)?;
            for method in &self.methods {
                writeln!(f, "{}", fmt_method(method))?;
            }
        }
        Ok(())
    }
}
