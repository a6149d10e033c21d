//! Pass 2: structural sanity checks that need no symbol information.

use crate::ast::{NodeId, NodeKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics, SrcPos};
use crate::grammar::{Grammar, GRAMMAR_OPTIONS, RULE_OPTIONS};

pub fn check(g: &mut Grammar, diags: &mut Diagnostics) {
    check_repeated_prequels(g, diags);
    check_options(g, diags);
    check_token_names(g, diags);
    check_channels_placement(g, diags);
    check_lexer_commands(g, diags);
    check_empty_matches(g, diags);
}

fn emit(g: &Grammar, diags: &mut Diagnostics, kind: DiagnosticKind, pos: SrcPos, args: &[&str]) {
    diags.emit(kind, &g.file_name, pos, args);
}

/// Each prequel section may appear once; every extra occurrence (including
/// the first of a repeated kind) is flagged so the user sees both sites.
fn check_repeated_prequels(g: &Grammar, diags: &mut Diagnostics) {
    let kinds: [(&str, fn(&NodeKind) -> bool); 4] = [
        ("options", |k| matches!(k, NodeKind::Options)),
        ("tokens", |k| matches!(k, NodeKind::Tokens)),
        ("channels", |k| matches!(k, NodeKind::Channels)),
        ("import", |k| matches!(k, NodeKind::Import)),
    ];

    for (name, pred) in kinds {
        let occurrences: Vec<NodeId> = g
            .tree
            .children(g.root)
            .iter()
            .copied()
            .filter(|&c| pred(g.tree.kind(c)))
            .collect();
        if occurrences.len() > 1 {
            for node in occurrences {
                emit(
                    g,
                    diags,
                    DiagnosticKind::RepeatedPrequel,
                    g.tree.node(node).pos(),
                    &[name],
                );
            }
        }
    }
}

/// Unknown grammar- and rule-level options.
fn check_options(g: &Grammar, diags: &mut Diagnostics) {
    for options in g.tree.find_all(g.root, |k| matches!(k, NodeKind::Options)) {
        let owner = g.tree.node(options).parent;
        let allowed: &[&str] = match owner.map(|o| g.tree.kind(o)) {
            Some(NodeKind::GrammarRoot { .. }) => GRAMMAR_OPTIONS,
            Some(NodeKind::Rule { .. }) => RULE_OPTIONS,
            _ => continue,
        };
        for &opt in g.tree.children(options) {
            let key = g.tree.text(opt);
            if !allowed.contains(&key) {
                emit(
                    g,
                    diags,
                    DiagnosticKind::IllegalOption,
                    g.tree.node(opt).pos(),
                    &[key],
                );
            }
        }
    }
}

/// `tokens {}` names must be capitalized token names.
fn check_token_names(g: &Grammar, diags: &mut Diagnostics) {
    for tokens in g.tree.find_all(g.root, |k| matches!(k, NodeKind::Tokens)) {
        for &entry in g.tree.children(tokens) {
            let name = g.tree.text(entry);
            if name.chars().next().is_some_and(char::is_lowercase) {
                emit(
                    g,
                    diags,
                    DiagnosticKind::TokenNamesMustStartUpper,
                    g.tree.node(entry).pos(),
                    &[name],
                );
            }
        }
    }
}

/// `channels {}` belongs to lexer grammars.
fn check_channels_placement(g: &Grammar, diags: &mut Diagnostics) {
    if g.is_lexer() {
        return;
    }
    for channels in g
        .tree
        .children(g.root)
        .iter()
        .copied()
        .filter(|&c| matches!(g.tree.kind(c), NodeKind::Channels))
    {
        emit(
            g,
            diags,
            DiagnosticKind::ChannelsWithoutLexer,
            g.tree.node(channels).pos(),
            &[],
        );
    }
}

/// Names and arities of lexer commands, plus their pairwise compatibility.
fn check_lexer_commands(g: &Grammar, diags: &mut Diagnostics) {
    const NO_ARG: &[&str] = &["skip", "more", "popMode"];
    const WITH_ARG: &[&str] = &["type", "channel", "mode", "pushMode"];

    let rules: Vec<(String, NodeId, bool)> = g
        .rules
        .values()
        .map(|r| (r.name.clone(), r.node, r.is_fragment))
        .collect();

    for (rule_name, rule_node, is_fragment) in rules {
        let command_lists = g
            .tree
            .find_all(rule_node, |k| matches!(k, NodeKind::LexerCommands));

        if is_fragment && !command_lists.is_empty() {
            emit(
                g,
                diags,
                DiagnosticKind::FragmentActionIgnored,
                g.tree.node(rule_node).pos(),
                &[&rule_name],
            );
        }

        for commands in command_lists {
            let mut seen: Vec<String> = Vec::new();
            for &command in g.tree.children(commands) {
                let name = g.tree.text(command).to_string();
                let pos = g.tree.node(command).pos();
                let has_arg = !g.tree.children(command).is_empty();

                if NO_ARG.contains(&name.as_str()) {
                    if has_arg {
                        emit(g, diags, DiagnosticKind::UnwantedLexerCommandArgument, pos, &[&name]);
                    }
                } else if WITH_ARG.contains(&name.as_str()) {
                    if !has_arg {
                        emit(g, diags, DiagnosticKind::MissingLexerCommandArgument, pos, &[&name]);
                    }
                } else {
                    emit(g, diags, DiagnosticKind::InvalidLexerCommand, pos, &[&name]);
                    continue;
                }

                if seen.iter().any(|s| s == &name) {
                    emit(g, diags, DiagnosticKind::DuplicatedCommand, pos, &[&name]);
                }

                // `skip`, `more`, and `type` all decide the token's fate.
                let fate = |n: &str| matches!(n, "skip" | "more" | "type");
                if fate(&name) {
                    if let Some(other) = seen.iter().find(|s| fate(s) && *s != &name) {
                        emit(
                            g,
                            diags,
                            DiagnosticKind::IncompatibleCommands,
                            pos,
                            &[other, &name],
                        );
                    }
                }
                seen.push(name);
            }
        }
    }
}

/// Non-fragment lexer rules that can match the empty string.
fn check_empty_matches(g: &Grammar, diags: &mut Diagnostics) {
    if !g.is_lexer() {
        return;
    }
    let rules: Vec<(String, NodeId, bool)> = g
        .rules
        .values()
        .map(|r| (r.name.clone(), r.node, r.is_fragment))
        .collect();

    for (name, node, is_fragment) in &rules {
        if *is_fragment {
            continue;
        }
        let mut visiting = Vec::new();
        if rule_can_be_empty(g, *node, &mut visiting) {
            emit(
                g,
                diags,
                DiagnosticKind::EpsilonToken,
                g.tree.node(*node).pos(),
                &[name],
            );
        }
    }
}

fn rule_can_be_empty(g: &Grammar, rule_node: NodeId, visiting: &mut Vec<String>) -> bool {
    g.rule_alts(rule_node)
        .iter()
        .any(|&alt| alt_can_be_empty(g, alt, visiting))
}

fn alt_can_be_empty(g: &Grammar, alt: NodeId, visiting: &mut Vec<String>) -> bool {
    g.tree
        .children(alt)
        .iter()
        .all(|&e| element_can_be_empty(g, e, visiting))
}

fn element_can_be_empty(g: &Grammar, element: NodeId, visiting: &mut Vec<String>) -> bool {
    match g.tree.kind(element) {
        NodeKind::Action
        | NodeKind::Predicate
        | NodeKind::PrecPredicate { .. }
        | NodeKind::LexerCommands => true,
        NodeKind::Optional { .. } | NodeKind::Star { .. } => true,
        NodeKind::Plus { .. } => element_can_be_empty(g, g.tree.child(element, 0), visiting),
        NodeKind::Label { .. } => element_can_be_empty(g, g.tree.child(element, 0), visiting),
        NodeKind::Block => g
            .tree
            .children(element)
            .iter()
            .any(|&a| alt_can_be_empty(g, a, visiting)),
        NodeKind::StringLiteral => crate::literals::unescape_string(g.tree.text(element))
            .is_some_and(|s| s.is_empty()),
        NodeKind::TokenRef => {
            // In a lexer grammar an uppercase ref calls another rule.
            let name = g.tree.text(element).to_string();
            if name == "EOF" || visiting.contains(&name) {
                return false;
            }
            match g.rule(&name) {
                Some(rule) => {
                    visiting.push(name);
                    let empty = rule_can_be_empty(g, rule.node, visiting);
                    visiting.pop();
                    empty
                }
                None => false,
            }
        }
        _ => false,
    }
}
