use super::{NodeKind, SrcToken, Tree};
use parsegen_core::GrammarKind;

fn tok(text: &str) -> SrcToken {
    SrcToken::new(text, 1, 0)
}

#[test]
fn parent_links_follow_edits() {
    let mut t = Tree::new();
    let root = t.add(
        NodeKind::GrammarRoot {
            kind: GrammarKind::Parser,
        },
        tok("G"),
    );
    let rules = t.add(NodeKind::Rules, tok(""));
    let rule = t.add(NodeKind::Rule { fragment: false }, tok("a"));
    t.add_child(root, rules);
    t.add_child(rules, rule);

    assert_eq!(t.node(rule).parent, Some(rules));
    assert_eq!(t.child_index(rule), Some(0));
    assert!(t.check_parents(root));

    let rule2 = t.add(NodeKind::Rule { fragment: false }, tok("b"));
    t.insert_child(rules, 0, rule2);
    assert_eq!(t.child_index(rule), Some(1));
    assert_eq!(t.child_index(rule2), Some(0));
    assert!(t.check_parents(root));

    let removed = t.remove_child(rules, 0);
    assert_eq!(removed, rule2);
    assert_eq!(t.node(rule2).parent, None);
    assert!(t.check_parents(root));
}

#[test]
fn replace_child_rewires_both_nodes() {
    let mut t = Tree::new();
    let alt = t.add(NodeKind::Alt { label: None }, tok(""));
    let a = t.add(NodeKind::TokenRef, tok("A"));
    let b = t.add(NodeKind::TokenRef, tok("B"));
    t.add_child(alt, a);

    let old = t.replace_child(alt, 0, b);
    assert_eq!(old, a);
    assert_eq!(t.children(alt), &[b]);
    assert_eq!(t.node(b).parent, Some(alt));
    assert_eq!(t.node(a).parent, None);
}

#[test]
fn descendants_are_preorder() {
    let mut t = Tree::new();
    let block = t.add(NodeKind::Block, tok(""));
    let alt1 = t.add(NodeKind::Alt { label: None }, tok(""));
    let alt2 = t.add(NodeKind::Alt { label: None }, tok(""));
    let x = t.add(NodeKind::TokenRef, tok("X"));
    t.add_child(block, alt1);
    t.add_child(block, alt2);
    t.add_child(alt1, x);

    assert_eq!(t.descendants(block), vec![block, alt1, x, alt2]);
    let refs = t.find_all(block, |k| matches!(k, NodeKind::TokenRef));
    assert_eq!(refs, vec![x]);
}

#[test]
fn option_scope_climbs_ancestors() {
    let mut t = Tree::new();
    let root = t.add(
        NodeKind::GrammarRoot {
            kind: GrammarKind::Lexer,
        },
        tok("L"),
    );
    let rule = t.add(NodeKind::Rule { fragment: false }, tok("A"));
    t.add_child(root, rule);

    t.set_option(root, "caseInsensitive", "true");
    assert_eq!(t.option_in_scope(rule, "caseInsensitive"), Some("true"));

    t.set_option(rule, "caseInsensitive", "false");
    assert_eq!(t.option_in_scope(rule, "caseInsensitive"), Some("false"));
    assert_eq!(t.option(root, "caseInsensitive"), Some("true"));
}

#[test]
fn import_subtree_deep_copies() {
    let mut src = Tree::new();
    let rule = src.add(NodeKind::Rule { fragment: false }, tok("a"));
    let block = src.add(NodeKind::Block, tok(""));
    let alt = src.add(NodeKind::Alt { label: None }, tok(""));
    src.add_child(rule, block);
    src.add_child(block, alt);
    src.set_option(rule, "k", "v");

    let mut dst = Tree::new();
    let copied = dst.import_subtree(&src, rule);
    assert_eq!(dst.text(copied), "a");
    assert_eq!(dst.option(copied, "k"), Some("v"));
    assert_eq!(dst.children(copied).len(), 1);
    assert!(dst.check_parents(copied));

    // Source is untouched.
    assert_eq!(src.len(), 3);
}

#[test]
fn refresh_parents_restores_invariant_after_splice() {
    let mut t = Tree::new();
    let block = t.add(NodeKind::Block, tok(""));
    let alt = t.add(NodeKind::Alt { label: None }, tok(""));
    let x = t.add(NodeKind::TokenRef, tok("X"));

    // Splice children directly, bypassing add_child.
    t.node_mut(block).children.push(alt);
    t.node_mut(alt).children.push(x);
    assert!(!t.check_parents(block));

    t.refresh_parents(block);
    assert!(t.check_parents(block));
}
