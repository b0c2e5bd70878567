//! End-to-end reducer scenarios: one assembled artifact in, rewritten text
//! and dictionary out.

use asset_prep::reduce::{ReduceContext, ReduceOptions, reduce_source};

fn reduce(src: &str) -> String {
    let mut ctx = ReduceContext::new();
    reduce_source(src, &mut ctx, &ReduceOptions::default()).text
}

fn reduce_public(src: &str, skip: &[&str]) -> String {
    let mut ctx = ReduceContext::new();
    let opts = ReduceOptions {
        public: true,
        skip_items: skip.iter().map(|s| s.to_string()).collect(),
        ..ReduceOptions::default()
    };
    reduce_source(src, &mut ctx, &opts).text
}

#[test]
fn constant_with_parameters() {
    let out = reduce("const __S = { created : 10, uploading : 20 }; x = __S.created;");
    assert_eq!(out, "const C1 = { p0 : 10, p1 : 20 }; x = C1.p0;");
}

#[test]
fn private_function() {
    let out = reduce("function __foo(bar, baz){ var zzz = bar; }");
    assert_eq!(out, "function f1(a1, a2){ var v1 = a1; }");
}

#[test]
fn too_short_var_is_kept() {
    let out = reduce("function __g(){ var ab = 1; }");
    assert_eq!(out, "function f1(){ var ab = 1; }");
}

#[test]
fn class_private_method_and_property() {
    let out = reduce("class K { __m(x){ this.__p = x; } }");
    assert_eq!(out, "class K { m1(a1){ this.p0 = a1; } }");
}

#[test]
fn public_method_unification_across_classes() {
    let src = "class A { print(){ return 1; } } class B { print(){ return 2; } } a.print(); b.print();";
    let out = reduce_public(src, &[]);
    assert_eq!(
        out,
        "class CL1 { mp0(){ return 1; } } class CL2 { mp0(){ return 2; } } a.mp0(); b.mp0();"
    );
}

#[test]
fn nested_dictionary_keys_share_the_parameter_namespace() {
    let out = reduce("const __CFG = { outer : { inner : 1 } };");
    assert_eq!(out, "const C1 = { p0 : { p1 : 1 } };");
}

#[test]
fn string_contents_are_untouched() {
    let src = "var url = \"https://example.com/__foo\";";
    assert_eq!(reduce(src), src);
}

#[test]
fn constructor_is_never_renamed_in_public_mode() {
    let src = "class A { constructor(){ } step(){ } } a.constructor();";
    let out = reduce_public(src, &[]);
    assert!(out.contains("constructor"));
    assert!(out.contains("mp0"));
    assert!(!out.contains("step"));
}

#[test]
fn skip_list_protects_names_in_public_mode() {
    let src = "const SETTINGS = { mode : 1 }; class App { refresh(){ } }";
    let out = reduce_public(src, &["SETTINGS", "App", "refresh"]);
    assert!(out.contains("SETTINGS"));
    assert!(out.contains("App"));
    assert!(out.contains("refresh"));
}

#[test]
fn public_function_renaming_in_public_mode() {
    let out = reduce_public("function setup(a){ return a; } setup();", &[]);
    assert_eq!(out, "function f1(a1){ return a1; } f1();");
}

#[test]
fn public_names_stay_put_without_public_mode() {
    let src = "function setup(arg){ return arg; } class App { refresh(){ } }";
    let out = reduce(src);
    assert!(out.contains("function setup(a1)"));
    assert!(out.contains("class App"));
    assert!(out.contains("refresh"));
}

#[test]
fn global_counters_are_monotone_across_artifacts() {
    let mut ctx = ReduceContext::new();
    let opts = ReduceOptions::default();

    let first = reduce_source("function __a(){ }", &mut ctx, &opts);
    let second = reduce_source("function __b(){ } const __K = 1;", &mut ctx, &opts);

    assert_eq!(first.text, "function f1(){ }");
    assert_eq!(second.text, "function f2(){ } const C1 = 1;");
}

#[test]
fn unknown_constant_key_is_logged_and_left_alone() {
    let mut ctx = ReduceContext::new();
    let outcome = reduce_source(
        "const __S = { created : 10 }; x = __S.missing;",
        &mut ctx,
        &ReduceOptions::default(),
    );
    assert!(outcome.text.contains("C1.missing"));
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("missing"));
}

#[test]
fn cross_kind_redeclaration_is_reported() {
    let mut ctx = ReduceContext::new();
    let outcome = reduce_source(
        "function __f(){ var value = 1; let value = 2; }",
        &mut ctx,
        &ReduceOptions::default(),
    );
    assert_eq!(outcome.errors.len(), 1);
}

#[test]
fn if_else_redeclaration_is_silent() {
    let mut ctx = ReduceContext::new();
    let outcome = reduce_source(
        "function __f(flag){ if (flag){ var value = 1; } else { var value = 2; } }",
        &mut ctx,
        &ReduceOptions::default(),
    );
    assert!(outcome.errors.is_empty());
    assert!(outcome.text.contains("var v1 = 1;"));
    assert!(outcome.text.contains("var v1 = 2;"));
}

#[test]
fn determinism_two_runs_are_byte_identical() {
    let src = "const __S = { a1k : 1, b2k : 2 };\nfunction __go(input){ var result = __S.a1k + input; return result; }\nclass Widget { __paint(ctx){ this.__dirty = ctx; } }\n";

    let mut ctx_a = ReduceContext::new();
    let a = reduce_source(src, &mut ctx_a, &ReduceOptions::default());
    let mut ctx_b = ReduceContext::new();
    let b = reduce_source(src, &mut ctx_b, &ReduceOptions::default());

    assert_eq!(a.text, b.text);
    assert_eq!(a.dictionary, b.dictionary);
}

#[test]
fn dictionary_lists_every_substitution() {
    let mut ctx = ReduceContext::new();
    let outcome = reduce_source(
        "const __S = { created : 10 }; function __go(input){ var result = input; } class K { __m(x){ this.__p = x; } }",
        &mut ctx,
        &ReduceOptions::default(),
    );

    let dict = outcome.dictionary;
    assert!(dict.contains("C1"));
    assert!(dict.contains("__S"));
    assert!(dict.contains("p0:created"));
    assert!(dict.contains("f1"));
    assert!(dict.contains("a1:input"));
    assert!(dict.contains("v1:result"));
    assert!(dict.contains("K:"));
    assert!(dict.contains("__m"));
    assert!(dict.contains("this.p0"));
}

#[test]
fn regex_artifact_does_not_derail_string_joining() {
    let src = "function __clean(text){ return text.replace(/'/g, \"x\"); }";
    let out = reduce(src);
    assert!(out.contains("/'/g"));
    assert!(out.contains("\"x\""));
    assert!(out.contains("a1.replace"));
}
