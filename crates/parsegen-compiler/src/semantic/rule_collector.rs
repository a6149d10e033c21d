//! Pass 1: build the rule table from the AST.

use crate::ast::{NodeId, NodeKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::{parse_attr_defs, Grammar, Rule, DEFAULT_MODE};

/// Collect every rule under the root (and under each mode section) into
/// the grammar's ordered rule table.
pub fn collect_rules(g: &mut Grammar, diags: &mut Diagnostics) {
    let mut sections: Vec<(Option<String>, Vec<NodeId>)> = Vec::new();

    for &child in g.tree.children(g.root) {
        match g.tree.kind(child) {
            NodeKind::Rules => {
                sections.push((None, g.tree.children(child).to_vec()));
            }
            NodeKind::Mode => {
                let name = g.tree.text(child).to_string();
                if g.modes.contains_key(&name) && name != DEFAULT_MODE {
                    let pos = g.tree.node(child).pos();
                    let file = g.file_name.clone();
                    diags.emit(DiagnosticKind::ModeRedefinition, &file, pos, &[&name]);
                } else {
                    g.modes.entry(name.clone()).or_default();
                }
                sections.push((Some(name), g.tree.children(child).to_vec()));
            }
            _ => {}
        }
    }

    for (mode, rule_nodes) in sections {
        for rule_node in rule_nodes {
            collect_one(g, rule_node, mode.as_deref(), diags);
        }
    }
}

fn collect_one(g: &mut Grammar, rule_node: NodeId, mode: Option<&str>, diags: &mut Diagnostics) {
    let &NodeKind::Rule { fragment } = g.tree.kind(rule_node) else {
        return;
    };
    let name = g.tree.text(rule_node).to_string();
    let pos = g.tree.node(rule_node).pos();
    let file = g.file_name.clone();

    let is_token_rule = name.chars().next().is_some_and(char::is_uppercase);
    if is_token_rule && g.is_parser() {
        diags.emit(DiagnosticKind::LexerRulesNotAllowed, &file, pos, &[&name]);
        return;
    }
    if !is_token_rule && g.is_lexer() {
        diags.emit(DiagnosticKind::ParserRulesNotAllowed, &file, pos, &[&name]);
        return;
    }

    let alts = g.rule_alts(rule_node);
    let mut rule = Rule::new(&name, rule_node, alts.len());
    rule.is_fragment = fragment;
    if is_token_rule && (g.is_lexer() || g.is_combined()) {
        rule.mode = Some(mode.unwrap_or(DEFAULT_MODE).to_string());
    }

    for &child in g.tree.children(rule_node) {
        match g.tree.kind(child) {
            NodeKind::ArgAction => {
                let arg_pos = g.tree.node(child).pos();
                for decl in parse_attr_defs(g.tree.text(child), arg_pos) {
                    rule.args.insert(decl.name.clone(), decl);
                }
            }
            NodeKind::Returns => {
                let arg = g.tree.child(child, 0);
                let arg_pos = g.tree.node(arg).pos();
                for decl in parse_attr_defs(g.tree.text(arg), arg_pos) {
                    rule.retvals.insert(decl.name.clone(), decl);
                }
            }
            NodeKind::Locals => {
                let arg = g.tree.child(child, 0);
                let arg_pos = g.tree.node(arg).pos();
                for decl in parse_attr_defs(g.tree.text(arg), arg_pos) {
                    rule.locals.insert(decl.name.clone(), decl);
                }
            }
            _ => {}
        }
    }

    for (i, &alt) in alts.iter().enumerate() {
        if let NodeKind::Alt { label: Some(label) } = g.tree.kind(alt) {
            rule.alt_labels
                .entry(label.clone())
                .or_default()
                .push(i + 1);
        }
    }

    if g.define_rule(rule).is_none() {
        let prev_line = g
            .rule(&name)
            .map(|r| g.tree.node(r.node).pos().line.to_string())
            .unwrap_or_default();
        diags.emit(
            DiagnosticKind::RuleRedefinition,
            &file,
            pos,
            &[&name, &prev_line],
        );
    }
}
