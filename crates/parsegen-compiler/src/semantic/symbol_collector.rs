//! Pass 4: record every symbol occurrence the later checks need.

use crate::ast::{NodeId, NodeKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::{Grammar, LabelOccurrence, LabelType};

/// Walk the grammar and fill in:
/// - grammar-level named actions (diagnosing same-scope redefinition)
/// - per-rule labels, actions, and predicate indices
/// - start-rule flags (rules referenced by no other rule)
pub fn collect_symbols(g: &mut Grammar, diags: &mut Diagnostics) {
    collect_named_actions(g, diags);

    let rule_list: Vec<(String, NodeId)> = g
        .rules
        .values()
        .map(|r| (r.name.clone(), r.node))
        .collect();

    let mut referenced: Vec<String> = Vec::new();

    for (name, rule_node) in &rule_list {
        let alts = g.rule_alts(*rule_node);
        let mut labels = Vec::new();
        let mut actions = Vec::new();
        let mut sempred_nodes = Vec::new();

        for (i, &alt) in alts.iter().enumerate() {
            let alt_label = match g.tree.kind(alt) {
                NodeKind::Alt { label } => label.clone(),
                _ => None,
            };
            for id in g.tree.descendants(alt) {
                match g.tree.kind(id) {
                    NodeKind::Label { list } => {
                        let target = g.tree.child(id, 0);
                        let label_type = label_type_of(g, target, *list);
                        labels.push(LabelOccurrence {
                            name: g.tree.text(id).to_string(),
                            label_type,
                            node: id,
                            alt: i + 1,
                            alt_label: alt_label.clone(),
                        });
                    }
                    NodeKind::Action => actions.push(id),
                    NodeKind::Predicate => {
                        actions.push(id);
                        sempred_nodes.push(id);
                    }
                    NodeKind::RuleRef => {
                        let target = g.tree.text(id).to_string();
                        if !referenced.contains(&target) {
                            referenced.push(target);
                        }
                    }
                    NodeKind::TokenRef => {
                        // Lexer rule calls count as references too.
                        let target = g.tree.text(id).to_string();
                        if !referenced.contains(&target) {
                            referenced.push(target);
                        }
                    }
                    _ => {}
                }
            }
        }

        for node in sempred_nodes {
            let next = g.sempreds.len();
            g.sempreds.entry(node).or_insert(next);
        }
        if let Some(rule) = g.rule_mut(name) {
            rule.labels = labels;
            rule.actions = actions;
        }
    }

    for (name, _) in &rule_list {
        let is_start = !referenced.contains(name);
        if let Some(rule) = g.rule_mut(name) {
            rule.is_start_rule = is_start;
        }
    }
}

fn label_type_of(g: &Grammar, target: NodeId, list: bool) -> LabelType {
    let token_like = matches!(
        g.tree.kind(target),
        NodeKind::TokenRef | NodeKind::StringLiteral | NodeKind::CharSet | NodeKind::Set
    );
    match (token_like, list) {
        (true, false) => LabelType::Token,
        (true, true) => LabelType::TokenList,
        (false, false) => LabelType::Rule,
        (false, true) => LabelType::RuleList,
    }
}

fn collect_named_actions(g: &mut Grammar, diags: &mut Diagnostics) {
    let actions: Vec<NodeId> = g
        .tree
        .children(g.root)
        .iter()
        .copied()
        .filter(|&c| matches!(g.tree.kind(c), NodeKind::NamedAction))
        .collect();

    for action in actions {
        let children = g.tree.children(action);
        let (scope, name) = if children.len() == 3 {
            (
                g.tree.text(children[0]).to_string(),
                g.tree.text(children[1]).to_string(),
            )
        } else {
            (
                g.default_action_scope().to_string(),
                g.tree.text(children[0]).to_string(),
            )
        };

        let key = (scope, name.clone());
        if g.named_actions.contains_key(&key) {
            let pos = g.tree.node(action).pos();
            let file = g.file_name.clone();
            diags.emit(DiagnosticKind::ActionRedefinition, &file, pos, &[&name]);
        } else {
            g.named_actions.insert(key, action);
        }
    }
}
