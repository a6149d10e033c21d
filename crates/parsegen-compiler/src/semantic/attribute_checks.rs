//! Pass 12: `$attribute` references inside actions and predicates.

use crate::ast::{NodeId, NodeKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::Grammar;

/// Attributes the runtime defines on every rule context.
const BUILTIN_ATTRIBUTES: &[&str] = &[
    "text", "start", "stop", "ctx", "parser", "type", "channel", "mode", "index",
];

/// Validate `$x` and `$x.y` against the enclosing rule's argument, return
/// value, local, label, and reference names.
pub fn check(g: &mut Grammar, diags: &mut Diagnostics) {
    let file = g.file_name.clone();
    let rules: Vec<String> = g.rules.keys().cloned().collect();

    for rule_name in rules {
        let rule = &g.rules[&rule_name];
        let rule_node = rule.node;

        let mut visible: Vec<String> = Vec::new();
        visible.extend(rule.args.keys().cloned());
        visible.extend(rule.retvals.keys().cloned());
        visible.extend(rule.locals.keys().cloned());
        visible.extend(rule.labels.iter().map(|l| l.name.clone()));
        visible.push(rule_name.clone());

        // Unlabeled references are addressable by name: `$ID`, `$expr`.
        for id in g.tree.find_all(rule_node, |k| {
            matches!(k, NodeKind::TokenRef | NodeKind::RuleRef)
        }) {
            visible.push(g.tree.text(id).to_string());
        }

        for action in action_nodes(g, rule_node) {
            let text = g.tree.text(action).to_string();
            let pos = g.tree.node(action).pos();
            for reference in attribute_refs(&text) {
                let known = visible.iter().any(|v| v == &reference)
                    || BUILTIN_ATTRIBUTES.contains(&reference.as_str());
                if !known {
                    let display = format!("${reference}");
                    diags.emit(
                        DiagnosticKind::UnknownAttributeReference,
                        &file,
                        pos,
                        &[&display, &rule_name],
                    );
                }
            }
        }
    }
}

fn action_nodes(g: &Grammar, rule_node: NodeId) -> Vec<NodeId> {
    g.tree.find_all(rule_node, |k| {
        matches!(k, NodeKind::Action | NodeKind::Predicate)
    })
}

/// The base names of `$name` and `$name.attr` references in action text.
fn attribute_refs(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        let start = i + 1;
        let mut end = start;
        while end < bytes.len()
            && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_')
        {
            end += 1;
        }
        if end > start {
            out.push(text[start..end].to_string());
        }
        i = end.max(i + 1);
    }
    out
}

#[cfg(test)]
mod attribute_refs_tests {
    use super::attribute_refs;

    #[test]
    fn finds_simple_and_dotted_refs() {
        assert_eq!(
            attribute_refs("{ $x = $y.text; print($ctx); }"),
            vec!["x", "y", "ctx"]
        );
    }

    #[test]
    fn ignores_bare_dollars() {
        assert!(attribute_refs("{ cost = 5 $; }").is_empty());
    }
}
