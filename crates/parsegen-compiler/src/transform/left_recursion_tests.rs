use indoc::indoc;

use crate::ast::NodeKind;
use crate::diagnostics::DiagnosticKind;
use crate::grammar::Assoc;
use crate::test_utils::{assert_diagnostic, compile, compile_clean};

#[test]
fn direct_left_recursion_rewrites() {
    let compiled = compile_clean(indoc! {r"
        grammar T;
        e : e '*' e
          | e '+' e
          | INT
          ;
        INT : [0-9]+ ;
    "});
    let g = &compiled.grammar;
    let info = g.rule("e").unwrap().left_recursion.as_ref().unwrap();

    assert_eq!(info.primary_alts, vec![3]);
    assert_eq!(info.op_alts.len(), 2);

    // Alt 1 binds tighter than alt 2.
    assert_eq!(info.op_alts[0].alt, 1);
    assert_eq!(info.op_alts[0].precedence, 3);
    assert_eq!(info.op_alts[1].alt, 2);
    assert_eq!(info.op_alts[1].precedence, 2);
    assert!(info.op_alts.iter().all(|op| op.binary));
    assert!(info.op_alts.iter().all(|op| op.assoc == Assoc::Left));

    // The rewritten body is primary block followed by a star loop.
    let rule_node = g.rule("e").unwrap().node;
    let stars = g
        .tree
        .find_all(rule_node, |k| matches!(k, NodeKind::Star { .. }));
    assert_eq!(stars.len(), 1);
    let guards = g
        .tree
        .find_all(rule_node, |k| matches!(k, NodeKind::PrecPredicate { .. }));
    assert_eq!(guards.len(), 2);
}

#[test]
fn right_assoc_is_recorded() {
    let compiled = compile_clean(indoc! {r"
        grammar T;
        e : e '^'<assoc=right> e
          | ID
          ;
        ID : [a-z]+ ;
    "});
    let info = compiled
        .grammar
        .rule("e")
        .unwrap()
        .left_recursion
        .clone()
        .unwrap();
    assert_eq!(info.op_alts[0].assoc, Assoc::Right);
}

#[test]
fn dropped_self_ref_label_is_recorded() {
    let compiled = compile_clean(indoc! {r"
        grammar T;
        e : lhs=e '+' rhs=e
          | INT
          ;
        INT : [0-9]+ ;
    "});
    let info = compiled
        .grammar
        .rule("e")
        .unwrap()
        .left_recursion
        .clone()
        .unwrap();
    assert_eq!(info.op_alts[0].dropped_label.as_deref(), Some("lhs"));
    assert!(!info.op_alts[0].is_list_label);
}

#[test]
fn alt_labels_survive_on_op_alts() {
    let compiled = compile_clean(indoc! {r"
        grammar T;
        e : e '*' e # Mult
          | e '+' e # Add
          | INT     # Literal
          ;
        INT : [0-9]+ ;
    "});
    let info = compiled
        .grammar
        .rule("e")
        .unwrap()
        .left_recursion
        .clone()
        .unwrap();
    assert_eq!(info.op_alts[0].label.as_deref(), Some("Mult"));
    assert_eq!(info.op_alts[1].label.as_deref(), Some("Add"));
}

#[test]
fn unary_op_alts_are_not_binary() {
    let compiled = compile_clean(indoc! {r"
        grammar T;
        e : e '!'
          | INT
          ;
        INT : [0-9]+ ;
    "});
    let info = compiled
        .grammar
        .rule("e")
        .unwrap()
        .left_recursion
        .clone()
        .unwrap();
    assert!(!info.op_alts[0].binary);
}

#[test]
fn non_recursive_rules_are_untouched() {
    let compiled = compile_clean("grammar T; s : A | B ; A : 'a' ; B : 'b' ;");
    assert!(compiled.grammar.rule("s").unwrap().left_recursion.is_none());
}

#[test]
fn all_recursive_alternatives_cannot_seed() {
    let (_, diags) = compile("grammar T; e : e '+' e | e '*' e ; s : e A ; A : 'a' ;");
    assert_diagnostic(&diags, DiagnosticKind::LeftRecursionCycles, "e");
}

#[test]
fn indirect_cycles_are_detected() {
    let (_, diags) = compile(indoc! {r"
        grammar T;
        a : b A | A ;
        b : a B | B ;
        A : 'a' ;
        B : 'b' ;
    "});
    assert_diagnostic(&diags, DiagnosticKind::LeftRecursionCycles, "a");
    assert_diagnostic(&diags, DiagnosticKind::LeftRecursionCycles, "b");
}
