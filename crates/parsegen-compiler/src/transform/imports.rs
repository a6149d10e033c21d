//! Merging imported grammars into the root.
//!
//! The root always wins on conflicts. Channels union by name, tokens
//! concatenate, named actions of the same scoped name concatenate across
//! grammars, and rules/modes are only added when the root does not already
//! declare the name.

use crate::ast::{NodeId, NodeKind, SrcToken};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::Grammar;

/// Merge every grammar in `root.imports` into `root`'s AST.
///
/// Imports are expected in dependency order (depth-first); each one is
/// folded in sequence, so an earlier import wins over a later one the same
/// way the root wins over all of them.
pub fn merge_imports(root: &mut Grammar, diags: &mut Diagnostics) {
    if root.imports.is_empty() {
        return;
    }
    let imports = std::mem::take(&mut root.imports);
    for import in &imports {
        merge_one(root, import, diags);
    }
    root.imports = imports;
    root.tree.refresh_parents(root.root);
}

fn merge_one(root: &mut Grammar, import: &Grammar, diags: &mut Diagnostics) {
    merge_options(root, import, diags);
    merge_channels(root, import);
    merge_tokens(root, import);
    merge_named_actions(root, import);
    merge_rules(root, import);
    merge_modes(root, import);
}

/// Prequel node of the given kind directly under the grammar root.
fn prequel(g: &Grammar, pred: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
    g.tree
        .children(g.root)
        .iter()
        .copied()
        .find(|&c| pred(g.tree.kind(c)))
}

fn rules_node(g: &Grammar) -> Option<NodeId> {
    prequel(g, |k| matches!(k, NodeKind::Rules))
}

/// Imported options never apply; warn when one disagrees with the root.
fn merge_options(root: &mut Grammar, import: &Grammar, diags: &mut Diagnostics) {
    let Some(import_options) = prequel(import, |k| matches!(k, NodeKind::Options)) else {
        return;
    };
    for &opt in import.tree.children(import_options) {
        let key = import.tree.text(opt);
        let value = import.tree.text(import.tree.child(opt, 0));
        let root_value = root.option(key);
        if root_value != Some(value) {
            diags.emit(
                DiagnosticKind::OptionsInDelegate,
                &import.file_name,
                import.tree.node(opt).pos(),
                &[&import.name],
            );
        }
    }
}

/// Union channels by name, creating the root's channels block if needed.
fn merge_channels(root: &mut Grammar, import: &Grammar) {
    let Some(import_channels) = prequel(import, |k| matches!(k, NodeKind::Channels)) else {
        return;
    };

    let root_channels = prequel(root, |k| matches!(k, NodeKind::Channels)).unwrap_or_else(|| {
        let node = root
            .tree
            .add(NodeKind::Channels, SrcToken::new("channels", 0, 0));
        root.tree.insert_child(root.root, 0, node);
        node
    });

    let existing: Vec<String> = root
        .tree
        .children(root_channels)
        .iter()
        .map(|&c| root.tree.text(c).to_string())
        .collect();

    for &channel in import.tree.children(import_channels) {
        let name = import.tree.text(channel);
        if !existing.iter().any(|e| e == name) {
            let copied = root.tree.import_subtree(&import.tree, channel);
            root.tree.add_child(root_channels, copied);
        }
    }
}

/// Tokens concatenate into a single block.
fn merge_tokens(root: &mut Grammar, import: &Grammar) {
    let Some(import_tokens) = prequel(import, |k| matches!(k, NodeKind::Tokens)) else {
        return;
    };

    let root_tokens = prequel(root, |k| matches!(k, NodeKind::Tokens)).unwrap_or_else(|| {
        let node = root
            .tree
            .add(NodeKind::Tokens, SrcToken::new("tokens", 0, 0));
        root.tree.insert_child(root.root, 0, node);
        node
    });

    for &token in import.tree.children(import_tokens) {
        let copied = root.tree.import_subtree(&import.tree, token);
        root.tree.add_child(root_tokens, copied);
    }
}

/// Same scoped name from a different grammar: concatenate the bodies.
fn merge_named_actions(root: &mut Grammar, import: &Grammar) {
    let import_actions: Vec<NodeId> = import
        .tree
        .children(import.root)
        .iter()
        .copied()
        .filter(|&c| matches!(import.tree.kind(c), NodeKind::NamedAction))
        .collect();

    for action in import_actions {
        let (scope, name) = named_action_key_of(import, action);
        let existing = root
            .tree
            .children(root.root)
            .iter()
            .copied()
            .filter(|&c| matches!(root.tree.kind(c), NodeKind::NamedAction))
            .find(|&c| named_action_key_of(root, c) == (scope.clone(), name.clone()));

        match existing {
            Some(root_action) => {
                // Concatenate body text inside one brace block.
                let import_body = action_body(import, action);
                let root_body_id = *root
                    .tree
                    .children(root_action)
                    .last()
                    .expect("named action has a body");
                let merged = concat_action_text(
                    &root.tree.text(root_body_id).to_string(),
                    &import_body,
                );
                root.tree.node_mut(root_body_id).token.text = merged;
            }
            None => {
                let copied = root.tree.import_subtree(&import.tree, action);
                let rules = rules_node(root);
                let at = rules
                    .and_then(|r| root.tree.child_index(r))
                    .unwrap_or(root.tree.children(root.root).len());
                root.tree.insert_child(root.root, at, copied);
            }
        }
    }
}

/// `(scope, name)` with the grammar-type default scope applied.
fn named_action_key_of(g: &Grammar, action: NodeId) -> (String, String) {
    let children = g.tree.children(action);
    match children.len() {
        3 => (
            g.tree.text(children[0]).to_string(),
            g.tree.text(children[1]).to_string(),
        ),
        _ => (
            g.default_action_scope().to_string(),
            g.tree.text(children[0]).to_string(),
        ),
    }
}

fn action_body(g: &Grammar, action: NodeId) -> String {
    let body = *g
        .tree
        .children(action)
        .last()
        .expect("named action has a body");
    g.tree.text(body).to_string()
}

/// `{a}` + `{b}` = `{a\nb}`.
fn concat_action_text(a: &str, b: &str) -> String {
    let a_inner = a.trim_start_matches('{').trim_end_matches('}');
    let b_inner = b.trim_start_matches('{').trim_end_matches('}');
    format!("{{{a_inner}\n{b_inner}}}")
}

/// Add import rules the root does not declare.
fn merge_rules(root: &mut Grammar, import: &Grammar) {
    let (Some(root_rules), Some(import_rules)) = (rules_node(root), rules_node(import)) else {
        return;
    };

    let root_names: Vec<String> = root
        .tree
        .children(root_rules)
        .iter()
        .map(|&r| root.tree.text(r).to_string())
        .collect();

    for &rule in import.tree.children(import_rules) {
        let name = import.tree.text(rule);
        if !root_names.iter().any(|n| n == name) {
            let copied = root.tree.import_subtree(&import.tree, rule);
            root.tree.add_child(root_rules, copied);
        }
    }
}

/// Add import modes (or missing rules of shared modes); drop empty results.
fn merge_modes(root: &mut Grammar, import: &Grammar) {
    let import_modes: Vec<NodeId> = import
        .tree
        .children(import.root)
        .iter()
        .copied()
        .filter(|&c| matches!(import.tree.kind(c), NodeKind::Mode))
        .collect();

    for mode in import_modes {
        let mode_name = import.tree.text(mode).to_string();
        let root_mode = root
            .tree
            .children(root.root)
            .iter()
            .copied()
            .filter(|&c| matches!(root.tree.kind(c), NodeKind::Mode))
            .find(|&c| root.tree.text(c) == mode_name);

        // Rule names already declared anywhere in the root win.
        let root_rule_names: Vec<String> = root
            .tree
            .find_all(root.root, |k| matches!(k, NodeKind::Rule { .. }))
            .into_iter()
            .map(|r| root.tree.text(r).to_string())
            .collect();

        let new_rules: Vec<NodeId> = import
            .tree
            .children(mode)
            .iter()
            .copied()
            .filter(|&r| {
                let name = import.tree.text(r);
                !root_rule_names.iter().any(|n| n == name)
            })
            .collect();

        match root_mode {
            Some(target) => {
                for rule in new_rules {
                    let copied = root.tree.import_subtree(&import.tree, rule);
                    root.tree.add_child(target, copied);
                }
            }
            None if !new_rules.is_empty() => {
                let target = root
                    .tree
                    .add(NodeKind::Mode, import.tree.node(mode).token.clone());
                root.tree.add_child(root.root, target);
                for rule in new_rules {
                    let copied = root.tree.import_subtree(&import.tree, rule);
                    root.tree.add_child(target, copied);
                }
            }
            // An empty merged mode is not added at all.
            None => {}
        }
    }
}
