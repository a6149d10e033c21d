//! Pass 5: symbol conflict and reference checks.

use std::collections::HashMap;

use parsegen_core::COMMON_CONSTANTS;

use crate::ast::{NodeId, NodeKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics, SrcPos};
use crate::grammar::{Grammar, LabelType};

pub fn check(g: &mut Grammar, diags: &mut Diagnostics) {
    check_reserved_rule_names(g, diags);
    check_declaration_conflicts(g, diags);
    check_label_conflicts(g, diags);
    check_rule_refs(g, diags);
    check_labeled_blocks(g, diags);
}

fn emit(g: &Grammar, diags: &mut Diagnostics, kind: DiagnosticKind, pos: SrcPos, args: &[&str]) {
    diags.emit(kind, &g.file_name, pos, args);
}

fn check_reserved_rule_names(g: &Grammar, diags: &mut Diagnostics) {
    for rule in g.rules.values() {
        if COMMON_CONSTANTS.contains(&rule.name.as_str()) {
            emit(
                g,
                diags,
                DiagnosticKind::ReservedRuleName,
                g.tree.node(rule.node).pos(),
                &[&rule.name],
            );
        }
    }
}

/// Arguments, return values, and locals may not shadow rules or each other.
fn check_declaration_conflicts(g: &Grammar, diags: &mut Diagnostics) {
    use DiagnosticKind::*;

    for rule in g.rules.values() {
        let checks: [(&indexmap::IndexMap<String, crate::grammar::AttrDecl>, DiagnosticKind); 3] = [
            (&rule.args, ArgConflictsWithRule),
            (&rule.retvals, RetvalConflictsWithRule),
            (&rule.locals, LocalConflictsWithRule),
        ];
        for (attrs, rule_conflict) in checks {
            for decl in attrs.values() {
                if g.rules.contains_key(&decl.name) {
                    emit(g, diags, rule_conflict, decl.pos, &[&decl.name]);
                }
            }
        }

        for decl in rule.retvals.values() {
            if rule.args.contains_key(&decl.name) {
                emit(g, diags, RetvalConflictsWithArg, decl.pos, &[&decl.name]);
            }
        }
        for decl in rule.locals.values() {
            if rule.args.contains_key(&decl.name) {
                emit(g, diags, LocalConflictsWithArg, decl.pos, &[&decl.name]);
            }
            if rule.retvals.contains_key(&decl.name) {
                emit(g, diags, LocalConflictsWithRetval, decl.pos, &[&decl.name]);
            }
        }
    }
}

/// Token names visible to label-conflict checking: declared in `tokens {}`
/// or referenced anywhere as a terminal.
fn known_token_names(g: &Grammar) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for id in g.tree.find_all(g.root, |k| matches!(k, NodeKind::TokenRef)) {
        let name = g.tree.text(id).to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

fn check_label_conflicts(g: &Grammar, diags: &mut Diagnostics) {
    use DiagnosticKind::*;
    let token_names = known_token_names(g);

    for rule in g.rules.values() {
        // Label space is per alt-label group when the rule labels its
        // alternatives, grammar-wide per rule otherwise.
        let mut first_typed: HashMap<(Option<String>, String), LabelType> = HashMap::new();

        for occurrence in &rule.labels {
            let pos = g.tree.node(occurrence.node).pos();
            let name = occurrence.name.as_str();

            if g.rules.contains_key(name) {
                emit(g, diags, LabelConflictsWithRule, pos, &[name]);
            }
            if token_names.iter().any(|t| t == name) {
                emit(g, diags, LabelConflictsWithToken, pos, &[name]);
            }
            if rule.args.contains_key(name) {
                emit(g, diags, LabelConflictsWithArg, pos, &[name]);
            }
            if rule.retvals.contains_key(name) {
                emit(g, diags, LabelConflictsWithRetval, pos, &[name]);
            }
            if rule.locals.contains_key(name) {
                emit(g, diags, LabelConflictsWithLocal, pos, &[name]);
            }

            let scope = if rule.has_alt_labels() {
                occurrence.alt_label.clone()
            } else {
                None
            };
            let key = (scope, occurrence.name.clone());
            match first_typed.get(&key) {
                Some(&prior) if prior != occurrence.label_type => {
                    emit(
                        g,
                        diags,
                        LabelTypeConflict,
                        pos,
                        &[name, prior.describe()],
                    );
                }
                Some(_) => {}
                None => {
                    first_typed.insert(key, occurrence.label_type);
                }
            }
        }
    }
}

/// Undefined references, argument arity, and lexer/parser crossings.
fn check_rule_refs(g: &Grammar, diags: &mut Diagnostics) {
    let rule_list: Vec<(String, NodeId)> = g
        .rules
        .values()
        .map(|r| (r.name.clone(), r.node))
        .collect();

    for (rule_name, rule_node) in rule_list {
        for id in g
            .tree
            .find_all(rule_node, |k| matches!(k, NodeKind::RuleRef))
        {
            let target = g.tree.text(id).to_string();
            let pos = g.tree.node(id).pos();

            if g.is_lexer() {
                emit(
                    g,
                    diags,
                    DiagnosticKind::ParserRuleRefInLexerRule,
                    pos,
                    &[&target, &rule_name],
                );
                continue;
            }

            let Some(callee) = g.rule(&target) else {
                emit(g, diags, DiagnosticKind::UndefinedRuleRef, pos, &[&target]);
                continue;
            };

            let has_args = g
                .tree
                .children(id)
                .iter()
                .any(|&c| matches!(g.tree.kind(c), NodeKind::ArgAction));
            if has_args && callee.args.is_empty() {
                emit(g, diags, DiagnosticKind::RuleHasNoArgs, pos, &[&target]);
            }
            if !has_args && !callee.args.is_empty() {
                emit(g, diags, DiagnosticKind::MissingRuleArgs, pos, &[&target]);
            }
        }
    }
}

/// A label may only bind a block that reduced to a set.
fn check_labeled_blocks(g: &Grammar, diags: &mut Diagnostics) {
    for id in g.tree.find_all(g.root, |k| matches!(k, NodeKind::Label { .. })) {
        let target = g.tree.child(id, 0);
        if matches!(g.tree.kind(target), NodeKind::Block) {
            emit(
                g,
                diags,
                DiagnosticKind::LabelBlockNotASet,
                g.tree.node(id).pos(),
                &[g.tree.text(id)],
            );
        }
    }
}
