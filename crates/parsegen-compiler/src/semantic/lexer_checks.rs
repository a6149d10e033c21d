//! Passes 8-11: lexer-specific checks.

use parsegen_core::COMMON_CONSTANTS;

use crate::ast::{NodeId, NodeKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics, SrcPos};
use crate::grammar::Grammar;
use crate::literals::{decode_charset, unescape_string};

fn emit(g: &Grammar, diags: &mut Diagnostics, kind: DiagnosticKind, pos: SrcPos, args: &[&str]) {
    diags.emit(kind, &g.file_name, pos, args);
}

/// Pass 8: mode names and contents, plus lexer-command argument targets.
pub fn check_mode_conflicts(g: &mut Grammar, diags: &mut Diagnostics) {
    if !g.is_lexer() {
        return;
    }

    let mode_nodes: Vec<NodeId> = g
        .tree
        .children(g.root)
        .iter()
        .copied()
        .filter(|&c| matches!(g.tree.kind(c), NodeKind::Mode))
        .collect();

    for &mode in &mode_nodes {
        let name = g.tree.text(mode).to_string();
        let pos = g.tree.node(mode).pos();
        if COMMON_CONSTANTS.contains(&name.as_str()) {
            emit(
                g,
                diags,
                DiagnosticKind::ModeConflictsWithCommonConstants,
                pos,
                &[&name],
            );
        }
        if g.token_name_to_type.contains_key(&name) {
            emit(g, diags, DiagnosticKind::ModeConflictsWithToken, pos, &[&name]);
        }
    }

    // Every mode needs a rule that can actually emit a token.
    for (mode_name, rule_names) in &g.modes {
        let has_token_rule = rule_names
            .iter()
            .any(|r| g.rule(r).is_some_and(|rule| !rule.is_fragment));
        if has_token_rule {
            continue;
        }
        // The default mode of an empty grammar is a different problem.
        if mode_name == crate::grammar::DEFAULT_MODE {
            continue;
        }
        let pos = mode_nodes
            .iter()
            .find(|&&m| g.tree.text(m) == mode_name)
            .map(|&m| g.tree.node(m).pos())
            .unwrap_or_default();
        emit(g, diags, DiagnosticKind::ModeWithoutRules, pos, &[mode_name]);
    }

    check_command_arguments(g, diags);
}

/// `type(X)`, `channel(X)`, `mode(X)`, `pushMode(X)` arguments must name
/// a known token, channel, or mode.
fn check_command_arguments(g: &Grammar, diags: &mut Diagnostics) {
    for command in g
        .tree
        .find_all(g.root, |k| matches!(k, NodeKind::LexerCommand))
    {
        let [arg] = g.tree.children(command) else {
            continue;
        };
        let command_name = g.tree.text(command);
        let value = g.tree.text(*arg).to_string();
        let pos = g.tree.node(*arg).pos();

        match command_name {
            "type" => {
                let known = g.token_name_to_type.contains_key(&value) || value == "EOF";
                if !known {
                    emit(
                        g,
                        diags,
                        DiagnosticKind::ConstantValueIsNotARecognizedTokenName,
                        pos,
                        &[&value],
                    );
                }
            }
            "channel" => {
                let known = g.channel_name_to_value.contains_key(&value)
                    || matches!(value.as_str(), "HIDDEN" | "DEFAULT_TOKEN_CHANNEL");
                if !known {
                    emit(
                        g,
                        diags,
                        DiagnosticKind::ConstantValueIsNotARecognizedChannelName,
                        pos,
                        &[&value],
                    );
                }
            }
            "mode" | "pushMode" => {
                let known = g.modes.contains_key(&value) || value == "DEFAULT_MODE";
                if !known {
                    emit(
                        g,
                        diags,
                        DiagnosticKind::ConstantValueIsNotARecognizedModeName,
                        pos,
                        &[&value],
                    );
                }
            }
            _ => {}
        }
    }
}

/// Pass 9: literal tokens shadowed by an earlier rule in the same mode.
pub fn check_unreachable_tokens(g: &mut Grammar, diags: &mut Diagnostics) {
    if !g.is_lexer() {
        return;
    }

    for rule_names in g.modes.values() {
        // Literal strings matched so far in this mode, with their owner.
        let mut matched: Vec<(String, String)> = Vec::new();

        for rule_name in rule_names {
            let Some(rule) = g.rule(rule_name) else { continue };
            if rule.is_fragment {
                continue;
            }
            let rule_pos = g.tree.node(rule.node).pos();

            for literal in simple_literal_alts(g, rule.node) {
                let shadowed_by = matched
                    .iter()
                    .find(|(lit, _)| lit == &literal)
                    .map(|(_, owner)| owner.clone());
                match shadowed_by {
                    Some(owner) => {
                        emit(
                            g,
                            diags,
                            DiagnosticKind::TokenUnreachable,
                            rule_pos,
                            &[rule_name, &literal, &owner],
                        );
                    }
                    None => matched.push((literal, rule_name.clone())),
                }
            }
        }
    }
}

/// The literal strings a rule matches through alternatives made only of
/// string literals. Alts with ranges, sets, refs, or quantifiers yield
/// nothing; concatenated literals fold into one string.
fn simple_literal_alts(g: &Grammar, rule_node: NodeId) -> Vec<String> {
    let mut out = Vec::new();
    'alts: for alt in g.rule_alts(rule_node) {
        let mut s = String::new();
        let mut any = false;
        for &element in g.tree.children(alt) {
            match g.tree.kind(element) {
                NodeKind::StringLiteral => {
                    match unescape_string(g.tree.text(element)) {
                        Some(body) => s.push_str(&body),
                        None => continue 'alts,
                    }
                    any = true;
                }
                NodeKind::Action | NodeKind::Predicate | NodeKind::LexerCommands => {}
                _ => continue 'alts,
            }
        }
        if any {
            out.push(s);
        }
    }
    out
}

/// Pass 10: `caseInsensitive` option hygiene.
pub fn check_case_insensitive_options(g: &mut Grammar, diags: &mut Diagnostics) {
    let file = g.file_name.clone();
    let global = g.option("caseInsensitive").map(str::to_string);

    if let Some(value) = &global {
        if value != "true" && value != "false" {
            let pos = g.tree.node(g.root).pos();
            diags.emit(
                DiagnosticKind::IllegalOptionValue,
                &file,
                pos,
                &["caseInsensitive", value],
            );
        }
    }

    let rules: Vec<(String, NodeId, bool)> = g
        .rules
        .values()
        .map(|r| (r.name.clone(), r.node, r.is_token_rule()))
        .collect();

    for (_, node, is_token_rule) in rules {
        let Some(value) = g.tree.option(node, "caseInsensitive").map(str::to_string) else {
            continue;
        };
        let pos = g.tree.node(node).pos();
        if !is_token_rule {
            diags.emit(DiagnosticKind::IllegalOption, &file, pos, &["caseInsensitive"]);
            continue;
        }
        if value != "true" && value != "false" {
            diags.emit(
                DiagnosticKind::IllegalOptionValue,
                &file,
                pos,
                &["caseInsensitive", &value],
            );
            continue;
        }
        if global.as_deref() == Some(value.as_str()) {
            diags.emit(
                DiagnosticKind::RedundantCaseInsensitiveLexerRuleOption,
                &file,
                pos,
                &[&value],
            );
        }
    }
}

/// Pass 11: ranges whose bounds sit in different letter-case classes.
pub fn check_ranges(g: &mut Grammar, diags: &mut Diagnostics) {
    if !g.is_lexer() {
        return;
    }

    let mut suspicious: Vec<(SrcPos, char, char)> = Vec::new();

    for id in g.tree.find_all(g.root, |k| matches!(k, NodeKind::Range)) {
        let lo = unescape_string(g.tree.text(g.tree.child(id, 0)))
            .and_then(|s| s.chars().next());
        let hi = unescape_string(g.tree.text(g.tree.child(id, 1)))
            .and_then(|s| s.chars().next());
        if let (Some(lo), Some(hi)) = (lo, hi) {
            if mixed_case_range(lo, hi) {
                suspicious.push((g.tree.node(id).pos(), lo, hi));
            }
        }
    }

    for id in g.tree.find_all(g.root, |k| matches!(k, NodeKind::CharSet)) {
        if let Some(decoded) = decode_charset(g.tree.text(id)) {
            for (lo, hi) in decoded.ranges {
                if mixed_case_range(lo, hi) {
                    suspicious.push((g.tree.node(id).pos(), lo, hi));
                }
            }
        }
    }

    for (pos, lo, hi) in suspicious {
        emit(
            g,
            diags,
            DiagnosticKind::RangeProbablyContainsNotImpliedCharacters,
            pos,
            &[&lo.to_string(), &hi.to_string()],
        );
    }
}

fn mixed_case_range(lo: char, hi: char) -> bool {
    lo.is_ascii_alphabetic()
        && hi.is_ascii_alphabetic()
        && lo.is_ascii_uppercase() != hi.is_ascii_uppercase()
}
