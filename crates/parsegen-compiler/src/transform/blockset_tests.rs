use crate::ast::NodeKind;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::Grammar;
use crate::syntax::parse_grammar;

use super::blockset::reduce_blocks_to_sets;

fn transformed(src: &str) -> (Grammar, Diagnostics) {
    let mut diags = Diagnostics::new();
    let (tree, root) = parse_grammar("T.g4", src, &mut diags).unwrap();
    assert!(diags.is_empty(), "{diags:?}");
    let mut g = Grammar::new("T.g4", tree, root);
    reduce_blocks_to_sets(&mut g, &mut diags);
    (g, diags)
}

fn set_count(g: &Grammar) -> usize {
    g.tree
        .find_all(g.root, |k| matches!(k, NodeKind::Set))
        .len()
}

#[test]
fn parser_token_alternatives_collapse() {
    let (g, diags) = transformed("parser grammar P; s : (A | B | C) D ;");
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(set_count(&g), 1);

    let set = g.tree.find_all(g.root, |k| matches!(k, NodeKind::Set))[0];
    let names: Vec<&str> = g
        .tree
        .children(set)
        .iter()
        .map(|&c| g.tree.text(c))
        .collect();
    assert_eq!(names, vec!["A", "B", "C"]);
    assert!(g.tree.check_parents(g.root));
}

#[test]
fn literal_alternatives_collapse_in_parser() {
    let (g, diags) = transformed("parser grammar P; s : ('+' | '-') A ;");
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(set_count(&g), 1);
}

#[test]
fn rule_ref_blocks_do_not_collapse() {
    let (g, diags) = transformed("parser grammar P; s : (A | b) ; b : B ;");
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(set_count(&g), 0);
}

#[test]
fn multi_element_alternatives_do_not_collapse() {
    let (g, diags) = transformed("parser grammar P; s : (A | B C) ;");
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(set_count(&g), 0);
}

#[test]
fn eof_blocks_do_not_collapse() {
    let (g, diags) = transformed("parser grammar P; s : (A | EOF) ;");
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(set_count(&g), 0);
}

#[test]
fn lexer_char_alternatives_collapse() {
    let (g, diags) = transformed(r"lexer grammar L; A : ('a' | 'b'..'d' | [xyz]) ;");
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(set_count(&g), 1);
}

#[test]
fn lexer_multichar_literals_do_not_collapse() {
    let (g, diags) = transformed("lexer grammar L; A : ('ab' | 'c') ;");
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(set_count(&g), 0);
}

#[test]
fn collisions_in_merged_lexer_set_warn() {
    let (g, diags) = transformed("lexer grammar L; A : ('a'..'f' | 'e') ;");
    assert_eq!(set_count(&g), 1);
    assert_eq!(
        diags.kinds(),
        vec![DiagnosticKind::CharactersCollisionInSet]
    );
}

#[test]
fn labeled_block_still_collapses() {
    // The label wraps the block; the block itself reduces.
    let (g, diags) = transformed("parser grammar P; s : x=(A | B) ;");
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(set_count(&g), 1);
    let labels = g.tree.find_all(g.root, |k| matches!(k, NodeKind::Label { .. }));
    assert!(matches!(
        g.tree.kind(g.tree.child(labels[0], 0)),
        NodeKind::Set
    ));
}

#[test]
fn suffixed_set_blocks_collapse() {
    let (g, diags) = transformed("parser grammar P; s : (A | B)* C ;");
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(set_count(&g), 1);
    // The star now wraps a set, not a block.
    let stars = g.tree.find_all(g.root, |k| matches!(k, NodeKind::Star { .. }));
    assert!(matches!(
        g.tree.kind(g.tree.child(stars[0], 0)),
        NodeKind::Set
    ));
}
