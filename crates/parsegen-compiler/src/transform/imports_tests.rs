use indoc::indoc;

use crate::ast::NodeKind;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::Grammar;
use crate::pipeline::{Compiler, MapResolver};
use crate::test_utils::assert_diagnostic;

fn compile_with_import(root: &str, import_name: &str, import_src: &str) -> (Grammar, Diagnostics) {
    let mut resolver = MapResolver::new();
    resolver.add(import_name, &format!("{import_name}.g4"), import_src);
    let mut diags = Diagnostics::new();
    let compiled = Compiler::new(&resolver)
        .compile("T.g4", root, &mut diags)
        .expect("grammar should compile");
    (compiled.grammar, diags)
}

#[test]
fn imported_rules_fill_in_missing_names() {
    let (g, diags) = compile_with_import(
        "parser grammar T; import Base; s : helper A ;",
        "Base",
        "parser grammar Base; tokens { A } helper : A ; s : A ;",
    );
    assert!(diags.is_empty(), "{diags:?}");
    // `helper` came from the import; the root's `s` won.
    assert!(g.rule("helper").is_some());
    let s = g.rule("s").unwrap();
    let refs = g
        .tree
        .find_all(s.node, |k| matches!(k, NodeKind::RuleRef));
    assert_eq!(refs.len(), 1);
}

#[test]
fn root_rule_wins_over_import() {
    let (g, diags) = compile_with_import(
        "parser grammar T; import Base; tokens { A, B } s : A ;",
        "Base",
        "parser grammar Base; s : B B B ;",
    );
    assert!(diags.is_empty(), "{diags:?}");
    let s = g.rule("s").unwrap();
    assert_eq!(g.rule_alts(s.node).len(), 1);
    let tokens = g
        .tree
        .find_all(s.node, |k| matches!(k, NodeKind::TokenRef));
    assert_eq!(tokens.len(), 1, "root body should survive");
}

#[test]
fn channels_union_by_name() {
    let (g, diags) = compile_with_import(
        indoc! {r"
            lexer grammar T;
            import Base;
            channels { ALPHA }
            A : 'a' ;
        "},
        "Base",
        "lexer grammar Base; channels { ALPHA, BETA } B : 'b' ;",
    );
    assert!(diags.is_empty(), "{diags:?}");
    assert!(g.channel_value("ALPHA").is_some());
    assert!(g.channel_value("BETA").is_some());
    // No duplicate ALPHA entry.
    let channels = g
        .tree
        .children(g.root)
        .iter()
        .copied()
        .filter(|&c| matches!(g.tree.kind(c), NodeKind::Channels))
        .count();
    assert_eq!(channels, 1);
}

#[test]
fn tokens_concatenate() {
    let (g, diags) = compile_with_import(
        "parser grammar T; import Base; tokens { A } s : A B ;",
        "Base",
        "parser grammar Base; tokens { B } x : B ;",
    );
    assert!(diags.is_empty(), "{diags:?}");
    assert!(g.token_type("A") > 0);
    assert!(g.token_type("B") > 0);
}

#[test]
fn named_actions_concatenate_across_grammars() {
    let (g, diags) = compile_with_import(
        "parser grammar T; import Base; @members { int root; } s : A ;",
        "Base",
        "parser grammar Base; tokens { A } @members { int base; } x : A ;",
    );
    assert!(diags.is_empty(), "{diags:?}");
    let key = ("parser".to_string(), "members".to_string());
    let action = g.named_actions.get(&key).copied().unwrap();
    let body_id = *g.tree.children(action).last().unwrap();
    let body = g.tree.text(body_id);
    assert!(body.contains("int root;"), "{body}");
    assert!(body.contains("int base;"), "{body}");
}

#[test]
fn differing_import_option_warns() {
    let (_, diags) = compile_with_import(
        "parser grammar T; import Base; options { language = Rust; } s : A ;",
        "Base",
        "parser grammar Base; options { language = Java; } tokens { A } x : A ;",
    );
    assert_diagnostic(&diags, DiagnosticKind::OptionsInDelegate, "Base");
}

#[test]
fn matching_import_option_is_quiet() {
    let (_, diags) = compile_with_import(
        "parser grammar T; options { language = Rust; } import Base; s : A ;",
        "Base",
        "parser grammar Base; options { language = Rust; } tokens { A } x : A ;",
    );
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn missing_import_is_reported() {
    let mut diags = Diagnostics::new();
    let _ = Compiler::default()
        .compile("T.g4", "parser grammar T; import Nowhere; s : A ;", &mut diags)
        .unwrap();
    assert_diagnostic(&diags, DiagnosticKind::NoSuchGrammar, "Nowhere");
}

#[test]
fn imported_modes_merge_into_lexer() {
    let (g, diags) = compile_with_import(
        indoc! {r"
            lexer grammar T;
            import Base;
            A : 'a' ;
            mode ISLAND;
            IN : 'i' ;
        "},
        "Base",
        indoc! {r"
            lexer grammar Base;
            B : 'b' ;
            mode ISLAND;
            OUT : 'o' ;
            mode OTHER;
            X : 'x' ;
        "},
    );
    assert!(diags.is_empty(), "{diags:?}");
    // Shared mode gained the import's rule; new mode arrived whole.
    assert!(g.modes["ISLAND"].contains(&"IN".to_string()));
    assert!(g.modes["ISLAND"].contains(&"OUT".to_string()));
    assert!(g.modes.contains_key("OTHER"));
    assert!(g.rule("B").is_some());
}
