use indoc::indoc;
use parsegen_core::GrammarKind;

use crate::ast::{NodeKind, Tree};
use crate::diagnostics::Diagnostics;

use super::parser::parse_grammar;

fn parse(src: &str) -> (Tree, crate::ast::NodeId, Diagnostics) {
    let mut diags = Diagnostics::new();
    let (tree, root) = parse_grammar("T.g4", src, &mut diags).expect("grammar should parse");
    (tree, root, diags)
}

fn rule_names(tree: &Tree, root: crate::ast::NodeId) -> Vec<String> {
    tree.find_all(root, |k| matches!(k, NodeKind::Rule { .. }))
        .into_iter()
        .map(|id| tree.text(id).to_string())
        .collect()
}

#[test]
fn combined_grammar_header() {
    let (tree, root, diags) = parse("grammar T; a : A ;");
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(tree.text(root), "T");
    assert!(matches!(
        tree.kind(root),
        NodeKind::GrammarRoot {
            kind: GrammarKind::Combined
        }
    ));
}

#[test]
fn lexer_and_parser_headers() {
    let (tree, root, _) = parse("lexer grammar L; A : 'a' ;");
    assert!(matches!(
        tree.kind(root),
        NodeKind::GrammarRoot {
            kind: GrammarKind::Lexer
        }
    ));
    let _ = tree;

    let (tree, root, _) = parse("parser grammar P; a : B ;");
    assert!(matches!(
        tree.kind(root),
        NodeKind::GrammarRoot {
            kind: GrammarKind::Parser
        }
    ));
}

#[test]
fn prequels_options_tokens_channels_import() {
    let src = indoc! {r"
        lexer grammar L;
        options { superClass = Base; caseInsensitive = true; }
        tokens { X, Y }
        channels { WS_CHANNEL }
        import Common;
        A : 'a' ;
    "};
    let (tree, root, diags) = parse(src);
    assert!(diags.is_empty(), "{diags:?}");

    let options = tree.find_all(root, |k| matches!(k, NodeKind::Options));
    assert_eq!(options.len(), 1);
    let opts = tree.children(options[0]);
    assert_eq!(opts.len(), 2);
    assert_eq!(tree.text(opts[0]), "superClass");
    assert_eq!(tree.text(tree.child(opts[0], 0)), "Base");
    assert_eq!(tree.text(opts[1]), "caseInsensitive");

    let tokens = tree.find_all(root, |k| matches!(k, NodeKind::Tokens));
    let names: Vec<_> = tree
        .children(tokens[0])
        .iter()
        .map(|&c| tree.text(c))
        .collect();
    assert_eq!(names, vec!["X", "Y"]);

    let channels = tree.find_all(root, |k| matches!(k, NodeKind::Channels));
    assert_eq!(tree.children(channels[0]).len(), 1);

    let imports = tree.find_all(root, |k| matches!(k, NodeKind::Import));
    assert_eq!(tree.children(imports[0]).len(), 1);
    assert_eq!(tree.text(tree.child(imports[0], 0)), "Common");
}

#[test]
fn named_actions_with_and_without_scope() {
    let (tree, root, diags) = parse("grammar T; @header { import x; } @parser::members { int i; } a : A ;");
    assert!(diags.is_empty(), "{diags:?}");
    let actions = tree.find_all(root, |k| matches!(k, NodeKind::NamedAction));
    assert_eq!(actions.len(), 2);
    assert_eq!(tree.children(actions[0]).len(), 2); // name + body
    assert_eq!(tree.children(actions[1]).len(), 3); // scope + name + body
    assert_eq!(tree.text(tree.child(actions[1], 0)), "parser");
    assert_eq!(tree.text(tree.child(actions[1], 1)), "members");
}

#[test]
fn rule_with_args_returns_locals_options() {
    let (tree, root, diags) =
        parse("grammar T; a[int x] returns [int y] locals [int z] options {p=q;} : A ;");
    assert!(diags.is_empty(), "{diags:?}");
    let rule = tree.find_all(root, |k| matches!(k, NodeKind::Rule { .. }))[0];
    let kinds: Vec<_> = tree
        .children(rule)
        .iter()
        .map(|&c| tree.kind(c).clone())
        .collect();
    assert!(matches!(kinds[0], NodeKind::ArgAction));
    assert!(matches!(kinds[1], NodeKind::Returns));
    assert!(matches!(kinds[2], NodeKind::Locals));
    assert!(matches!(kinds[3], NodeKind::Options));
    assert!(matches!(kinds[4], NodeKind::Block));
}

#[test]
fn alternatives_and_labels() {
    let (tree, root, diags) = parse("grammar T; a : x=A | y+=B # Second ;");
    assert!(diags.is_empty(), "{diags:?}");
    let rule = tree.find_all(root, |k| matches!(k, NodeKind::Rule { .. }))[0];
    let block = *tree
        .children(rule)
        .iter()
        .find(|&&c| matches!(tree.kind(c), NodeKind::Block))
        .unwrap();
    let alts = tree.children(block);
    assert_eq!(alts.len(), 2);

    let first_label = tree.child(alts[0], 0);
    assert!(matches!(tree.kind(first_label), NodeKind::Label { list: false }));
    assert_eq!(tree.text(first_label), "x");

    let second_label = tree.child(alts[1], 0);
    assert!(matches!(tree.kind(second_label), NodeKind::Label { list: true }));
    match tree.kind(alts[1]) {
        NodeKind::Alt { label } => assert_eq!(label.as_deref(), Some("Second")),
        k => panic!("expected alt, got {k:?}"),
    }
}

#[test]
fn ebnf_suffixes_and_greediness() {
    let (tree, root, diags) = parse("grammar T; a : A? B* C+ D?? E*? F+? ;");
    assert!(diags.is_empty(), "{diags:?}");
    let opt = tree.find_all(root, |k| matches!(k, NodeKind::Optional { .. }));
    let star = tree.find_all(root, |k| matches!(k, NodeKind::Star { .. }));
    let plus = tree.find_all(root, |k| matches!(k, NodeKind::Plus { .. }));
    assert_eq!(opt.len(), 2);
    assert_eq!(star.len(), 2);
    assert_eq!(plus.len(), 2);
    assert!(matches!(tree.kind(opt[0]), NodeKind::Optional { greedy: true }));
    assert!(matches!(tree.kind(opt[1]), NodeKind::Optional { greedy: false }));
    assert!(matches!(tree.kind(star[1]), NodeKind::Star { greedy: false }));
    assert!(matches!(tree.kind(plus[1]), NodeKind::Plus { greedy: false }));
}

#[test]
fn lexer_rule_shapes() {
    let src = indoc! {r"
        lexer grammar L;
        A : 'a'..'z' [0-9]+ ~[\r\n] . ;
        WS : [ \t]+ -> skip ;
        KW : 'kw' -> type(A), channel(HIDDEN) ;
        mode ISLAND;
        B : 'b' -> popMode ;
    "};
    let (tree, root, diags) = parse(src);
    assert!(diags.is_empty(), "{diags:?}");

    assert_eq!(rule_names(&tree, root), vec!["A", "WS", "KW", "B"]);

    let ranges = tree.find_all(root, |k| matches!(k, NodeKind::Range));
    assert_eq!(ranges.len(), 1);
    let nots = tree.find_all(root, |k| matches!(k, NodeKind::Not));
    assert_eq!(nots.len(), 1);
    let wildcards = tree.find_all(root, |k| matches!(k, NodeKind::Wildcard));
    assert_eq!(wildcards.len(), 1);

    let commands = tree.find_all(root, |k| matches!(k, NodeKind::LexerCommand));
    let names: Vec<_> = commands.iter().map(|&c| tree.text(c)).collect();
    assert_eq!(names, vec!["skip", "type", "channel", "popMode"]);
    // `type(A)` carries its argument.
    assert_eq!(tree.text(tree.child(commands[1], 0)), "A");

    let modes = tree.find_all(root, |k| matches!(k, NodeKind::Mode));
    assert_eq!(modes.len(), 1);
    assert_eq!(tree.text(modes[0]), "ISLAND");
    assert_eq!(tree.children(modes[0]).len(), 1);
}

#[test]
fn element_options_attach_to_nodes() {
    let (tree, root, diags) = parse("grammar T; e : e '^'<assoc=right> e | ID ;");
    assert!(diags.is_empty(), "{diags:?}");
    let lits = tree.find_all(root, |k| matches!(k, NodeKind::StringLiteral));
    assert_eq!(tree.option(lits[0], "assoc"), Some("right"));
}

#[test]
fn predicates_and_actions() {
    let (tree, root, diags) = parse("grammar T; a : {pred}? A {action();} ;");
    assert!(diags.is_empty(), "{diags:?}");
    let preds = tree.find_all(root, |k| matches!(k, NodeKind::Predicate));
    let actions = tree.find_all(root, |k| matches!(k, NodeKind::Action));
    assert_eq!(preds.len(), 1);
    assert_eq!(actions.len(), 1);
    assert_eq!(tree.text(preds[0]), "{pred}");
    assert_eq!(tree.text(actions[0]), "{action();}");
}

#[test]
fn syntax_error_recovers_to_next_rule() {
    let mut diags = Diagnostics::new();
    let parsed = parse_grammar("T.g4", "grammar T; a : ) ; b : A ;", &mut diags);
    let (tree, root) = parsed.unwrap();
    assert!(diags.error_count() > 0);
    // The second rule still parses.
    assert!(rule_names(&tree, root).contains(&"b".to_string()));
}

#[test]
fn parent_links_hold_after_parse() {
    let (tree, root, _) = parse("grammar T; a : (A | B)+ c ; c : C ;");
    assert!(tree.check_parents(root));
}
