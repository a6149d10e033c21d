//! Pass 6: token-type assignment.

use parsegen_core::COMMON_CONSTANTS;

use crate::ast::{NodeId, NodeKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::Grammar;

pub fn assign(g: &mut Grammar, diags: &mut Diagnostics) {
    if g.is_lexer() {
        assign_lexer(g);
    } else {
        assign_parser(g, diags);
    }
}

/// Lexer grammars: every non-fragment rule that still produces a token of
/// its own name gets a type; `X : 'lit' ;` also aliases the literal.
fn assign_lexer(g: &mut Grammar) {
    let rules: Vec<(String, NodeId, bool)> = g
        .rules
        .values()
        .map(|r| (r.name.clone(), r.node, r.is_fragment))
        .collect();

    let mut alias_owner: Vec<(String, String)> = Vec::new();

    for (name, node, is_fragment) in rules {
        if is_fragment || rule_retypes_its_token(g, node) {
            continue;
        }
        g.define_token_name(&name);

        if let Some(literal) = single_literal_rule_body(g, node) {
            match alias_owner.iter().find(|(lit, _)| lit == &literal) {
                Some(_) => {
                    // Two rules alias the same literal: the alias is
                    // ambiguous and is dropped again.
                    g.undefine_string_literal(&literal);
                }
                None => {
                    g.define_token_alias(&name, &literal);
                    alias_owner.push((literal, name));
                }
            }
        }
    }
}

/// Commands that stop a rule from defining a token of its own name.
fn rule_retypes_its_token(g: &Grammar, rule_node: NodeId) -> bool {
    g.tree
        .find_all(rule_node, |k| matches!(k, NodeKind::LexerCommand))
        .iter()
        .any(|&c| matches!(g.tree.text(c), "type" | "more"))
}

/// `X : 'lit' ;` with a single alternative and no commands.
fn single_literal_rule_body(g: &Grammar, rule_node: NodeId) -> Option<String> {
    let alts = g.rule_alts(rule_node);
    let [alt] = alts.as_slice() else { return None };
    let [element] = g.tree.children(*alt) else {
        return None;
    };
    matches!(g.tree.kind(*element), NodeKind::StringLiteral)
        .then(|| g.tree.text(*element).to_string())
}

/// Parser and combined grammars: `tokens {}` declarations first, then
/// implicit definitions for referenced-but-undeclared names.
fn assign_parser(g: &mut Grammar, diags: &mut Diagnostics) {
    let file = g.file_name.clone();

    // tokens {} declarations.
    for tokens in g.tree.find_all(g.root, |k| matches!(k, NodeKind::Tokens)) {
        for &entry in g.tree.children(tokens).to_vec().iter() {
            let name = g.tree.text(entry).to_string();
            if name.chars().next().is_some_and(char::is_lowercase) {
                // Reported by the basic checks; don't define it.
                continue;
            }
            let pos = g.tree.node(entry).pos();
            if COMMON_CONSTANTS.contains(&name.as_str()) {
                diags.emit(
                    DiagnosticKind::TokenConflictsWithCommonConstants,
                    &file,
                    pos,
                    &[&name],
                );
                continue;
            }
            if g.token_name_to_type.contains_key(&name) {
                diags.emit(DiagnosticKind::TokenNameReassignment, &file, pos, &[&name]);
                continue;
            }
            g.define_token_name(&name);
        }
    }

    // References.
    let rule_nodes: Vec<NodeId> = g.rules.values().map(|r| r.node).collect();
    for rule_node in rule_nodes {
        for id in g.tree.find_all(rule_node, |k| {
            matches!(k, NodeKind::TokenRef | NodeKind::StringLiteral)
        }) {
            let text = g.tree.text(id).to_string();
            let pos = g.tree.node(id).pos();
            let kind = g.tree.kind(id).clone();
            match kind {
                NodeKind::TokenRef => {
                    if text == "EOF" {
                        continue;
                    }
                    if !g.token_name_to_type.contains_key(&text) {
                        diags.emit(
                            DiagnosticKind::ImplicitTokenDefinition,
                            &file,
                            pos,
                            &[&text],
                        );
                        g.define_token_name(&text);
                    }
                }
                NodeKind::StringLiteral => {
                    if g.string_literal_to_type.contains_key(&text) {
                        continue;
                    }
                    if g.is_combined() {
                        // The extracted lexer normally supplies the type;
                        // cover literals it has not seen.
                        g.define_string_literal(&text);
                    } else {
                        diags.emit(
                            DiagnosticKind::ImplicitStringDefinition,
                            &file,
                            pos,
                            &[&text],
                        );
                    }
                }
                _ => {}
            }
        }
    }
}
