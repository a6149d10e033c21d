//! Implicit lexer extraction for combined grammars.
//!
//! Splits `grammar T;` into its parser half (kept in place) and a new
//! `TLexer` grammar holding the lexer rules, the eligible options, the
//! named actions, and synthesized rules for literals the parser references.

use parsegen_core::GrammarKind;

use crate::ast::{NodeId, NodeKind, SrcToken, Tree};
use crate::grammar::{Grammar, LEXER_OPTION_BLACKLIST};
use crate::literals::unescape_string;

/// Extract the implicit lexer from a combined grammar.
///
/// Returns `None` when the resulting lexer would have no rules. The
/// combined grammar keeps its parser rules and loses the lexer rules and
/// lexer-scoped actions.
pub fn extract_implicit_lexer(combined: &mut Grammar) -> Option<Grammar> {
    let mut tree = Tree::new();
    let name_token = {
        let t = &combined.tree.node(combined.root).token;
        SrcToken::new(format!("{}Lexer", t.text), t.line, t.col)
    };
    let root = tree.add(
        NodeKind::GrammarRoot {
            kind: GrammarKind::Lexer,
        },
        name_token,
    );

    copy_options(combined, &mut tree, root);
    copy_named_actions(combined, &mut tree, root);
    move_channels(combined, &mut tree, root);

    let rules = tree.add(NodeKind::Rules, SrcToken::default());
    tree.add_child(root, rules);

    let moved = move_lexer_rules(combined, &mut tree, rules);

    // Literals already matched by a moved `X : 'lit' ;` rule need no
    // synthesized rule.
    let aliased: Vec<String> = moved
        .iter()
        .filter_map(|&r| single_literal_of_rule(&tree, r))
        .collect();
    synthesize_literal_rules(combined, &mut tree, rules, &aliased);

    if tree.children(rules).is_empty() {
        return None;
    }

    tree.refresh_parents(root);
    combined.tree.refresh_parents(combined.root);

    Some(Grammar::new(&combined.file_name, tree, root))
}

/// Grammar options propagate minus the parser-only blacklist.
fn copy_options(combined: &Grammar, tree: &mut Tree, root: NodeId) {
    let Some(options) = combined
        .tree
        .children(combined.root)
        .iter()
        .copied()
        .find(|&c| matches!(combined.tree.kind(c), NodeKind::Options))
    else {
        return;
    };

    // The grammar object mirrors these entries into its option map when it
    // is constructed over the finished tree.
    let node = tree.add(NodeKind::Options, SrcToken::new("options", 0, 0));
    let mut any = false;
    for &opt in combined.tree.children(options) {
        let key = combined.tree.text(opt);
        if LEXER_OPTION_BLACKLIST.contains(&key) {
            continue;
        }
        let copied = tree.import_subtree(&combined.tree, opt);
        tree.add_child(node, copied);
        any = true;
    }
    if any {
        tree.add_child(root, node);
    }
}

/// All named actions are copied; lexer-scoped ones are moved.
fn copy_named_actions(combined: &mut Grammar, tree: &mut Tree, root: NodeId) {
    let actions: Vec<NodeId> = combined
        .tree
        .children(combined.root)
        .iter()
        .copied()
        .filter(|&c| matches!(combined.tree.kind(c), NodeKind::NamedAction))
        .collect();

    let mut to_remove = Vec::new();
    for action in actions {
        let copied = tree.import_subtree(&combined.tree, action);
        tree.add_child(root, copied);

        let children = combined.tree.children(action);
        let lexer_scoped =
            children.len() == 3 && combined.tree.text(children[0]) == "lexer";
        if lexer_scoped {
            to_remove.push(action);
        }
    }

    for action in to_remove {
        if let Some(at) = combined.tree.child_index(action) {
            combined.tree.remove_child(combined.root, at);
        }
    }
}

/// `channels {}` only means something to the lexer; move it wholesale.
fn move_channels(combined: &mut Grammar, tree: &mut Tree, root: NodeId) {
    let Some(channels) = combined
        .tree
        .children(combined.root)
        .iter()
        .copied()
        .find(|&c| matches!(combined.tree.kind(c), NodeKind::Channels))
    else {
        return;
    };
    let copied = tree.import_subtree(&combined.tree, channels);
    tree.add_child(root, copied);
    if let Some(at) = combined.tree.child_index(channels) {
        combined.tree.remove_child(combined.root, at);
    }
}

/// Move every uppercase-named rule to the lexer.
fn move_lexer_rules(combined: &mut Grammar, tree: &mut Tree, rules: NodeId) -> Vec<NodeId> {
    let mut moved = Vec::new();

    if let Some(combined_rules) = combined
        .tree
        .children(combined.root)
        .iter()
        .copied()
        .find(|&c| matches!(combined.tree.kind(c), NodeKind::Rules))
    {
        let mut at = 0;
        while at < combined.tree.children(combined_rules).len() {
            let rule = combined.tree.child(combined_rules, at);
            let is_lexer_rule = combined
                .tree
                .text(rule)
                .chars()
                .next()
                .is_some_and(char::is_uppercase);
            if is_lexer_rule {
                let copied = tree.import_subtree(&combined.tree, rule);
                tree.add_child(rules, copied);
                moved.push(copied);
                combined.tree.remove_child(combined_rules, at);
            } else {
                at += 1;
            }
        }
    }

    moved
}

/// `X : 'lit' ;` pattern: the literal the rule aliases.
fn single_literal_of_rule(tree: &Tree, rule: NodeId) -> Option<String> {
    let block = tree
        .children(rule)
        .iter()
        .copied()
        .find(|&c| matches!(tree.kind(c), NodeKind::Block))?;
    let [alt] = tree.children(block) else {
        return None;
    };
    let [element] = tree.children(*alt) else {
        return None;
    };
    matches!(tree.kind(*element), NodeKind::StringLiteral)
        .then(|| tree.text(*element).to_string())
}

/// Create `T__<n> : 'lit' ;` for every literal the parser references that
/// no lexer rule aliases. Synthesized rules go at the head of the rule
/// list so literals win over broader rules.
fn synthesize_literal_rules(
    combined: &Grammar,
    tree: &mut Tree,
    rules: NodeId,
    aliased: &[String],
) {
    let mut seen: Vec<String> = aliased.to_vec();
    let mut next = 0usize;
    let mut insert_at = 0usize;

    for lit in combined
        .tree
        .find_all(combined.root, |k| matches!(k, NodeKind::StringLiteral))
    {
        let text = combined.tree.text(lit).to_string();
        if seen.iter().any(|s| s == &text) {
            continue;
        }
        // Skip malformed literals; the semantic stage diagnoses them.
        if unescape_string(&text).is_none() {
            continue;
        }
        seen.push(text.clone());

        let token = combined.tree.node(lit).token.clone();
        let rule = tree.add(
            NodeKind::Rule { fragment: false },
            SrcToken::new(format!("T__{next}"), token.line, token.col),
        );
        let block = tree.add(NodeKind::Block, SrcToken::default());
        let alt = tree.add(NodeKind::Alt { label: None }, SrcToken::default());
        let literal = tree.add(NodeKind::StringLiteral, token);
        tree.add_child(alt, literal);
        tree.add_child(block, alt);
        tree.add_child(rule, block);
        tree.insert_child(rules, insert_at, rule);

        next += 1;
        insert_at += 1;
    }
}
