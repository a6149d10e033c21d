//! Direct left-recursion elimination.
//!
//! A rule whose alternatives start with a reference to itself is rewritten
//! into precedence-climbing form: one alternative holding the primary
//! block, followed by a star loop over the operator block. Each operator
//! alternative is guarded by a precedence predicate; operator metadata
//! (association, precedence, labels) is recorded on the rule for the code
//! generator.
//!
//! Indirect cycles are left alone here; the analysis stage reports them.

use crate::ast::{NodeId, NodeKind, SrcToken};
use crate::grammar::{Assoc, Grammar, LeftRecursionInfo, OpAltInfo};

/// True when any alternative of the rule starts with a self-reference.
pub fn is_left_recursive(g: &Grammar, rule_node: NodeId, rule_name: &str) -> bool {
    g.rule_alts(rule_node)
        .iter()
        .any(|&alt| leading_self_ref(g, alt, rule_name).is_some())
}

/// The leading element of an alternative, looking through labels and
/// skipping actions and predicates (they match nothing).
fn leading_element(g: &Grammar, alt: NodeId) -> Option<NodeId> {
    for &element in g.tree.children(alt) {
        match g.tree.kind(element) {
            NodeKind::Action | NodeKind::Predicate | NodeKind::PrecPredicate { .. } => continue,
            NodeKind::Label { .. } => return Some(g.tree.child(element, 0)),
            NodeKind::LexerCommands => return None,
            _ => return Some(element),
        }
    }
    None
}

/// The leading self-reference of an alternative, if there is one.
fn leading_self_ref(g: &Grammar, alt: NodeId, rule_name: &str) -> Option<NodeId> {
    let element = leading_element(g, alt)?;
    (matches!(g.tree.kind(element), NodeKind::RuleRef) && g.tree.text(element) == rule_name)
        .then_some(element)
}

/// Whether the alternative also ends with a self-reference (binary op).
fn trailing_self_ref(g: &Grammar, alt: NodeId, rule_name: &str) -> Option<NodeId> {
    for &element in g.tree.children(alt).iter().rev() {
        match g.tree.kind(element) {
            NodeKind::Action | NodeKind::Predicate | NodeKind::LexerCommands => continue,
            NodeKind::Label { .. } => {
                let inner = g.tree.child(element, 0);
                return (matches!(g.tree.kind(inner), NodeKind::RuleRef)
                    && g.tree.text(inner) == rule_name)
                    .then_some(inner);
            }
            _ => {
                return (matches!(g.tree.kind(element), NodeKind::RuleRef)
                    && g.tree.text(element) == rule_name)
                    .then_some(element)
            }
        }
    }
    None
}

/// Association declared via `<assoc=...>` on any element of the alt.
fn alt_assoc(g: &Grammar, alt: NodeId) -> Assoc {
    for id in g.tree.descendants(alt) {
        if g.tree.option(id, "assoc") == Some("right") {
            return Assoc::Right;
        }
    }
    Assoc::Left
}

/// Rewrite one directly left-recursive rule in place.
///
/// Returns `None` when every alternative is left-recursive (no primary
/// alternative to seed the loop), which the caller reports as an
/// unresolvable cycle.
pub fn rewrite_left_recursive_rule(
    g: &mut Grammar,
    rule_name: &str,
) -> Option<LeftRecursionInfo> {
    let rule_node = g.rule(rule_name)?.node;
    let block = g.rule_block(rule_node)?;
    let alts: Vec<NodeId> = g.tree.children(block).to_vec();
    let num_alts = alts.len();

    let mut info = LeftRecursionInfo::default();
    let mut primary: Vec<NodeId> = Vec::new();
    let mut ops: Vec<(NodeId, OpAltInfo)> = Vec::new();

    for (i, &alt) in alts.iter().enumerate() {
        let alt_number = i + 1;
        match leading_self_ref(g, alt, rule_name) {
            Some(_) => {
                let label = match g.tree.kind(alt) {
                    NodeKind::Alt { label } => label.clone(),
                    _ => None,
                };
                let (dropped_label, is_list_label) = drop_leading_self_ref(g, alt);
                let precedence = (num_alts - i) as u32;
                let op = OpAltInfo {
                    alt: alt_number,
                    precedence,
                    assoc: alt_assoc(g, alt),
                    binary: trailing_self_ref(g, alt, rule_name).is_some(),
                    label,
                    is_list_label,
                    dropped_label,
                };
                info.op_alts.push(op.clone());
                ops.push((alt, op));
            }
            None => {
                info.primary_alts.push(alt_number);
                primary.push(alt);
            }
        }
    }

    if primary.is_empty() {
        return None;
    }
    if ops.is_empty() {
        // Not actually left-recursive; nothing to do.
        return Some(info);
    }

    // Guard each operator alternative with its precedence predicate.
    for (alt, op) in &ops {
        let guard = g.tree.add(
            NodeKind::PrecPredicate {
                precedence: op.precedence,
            },
            SrcToken::default(),
        );
        g.tree.insert_child(*alt, 0, guard);
    }

    // New body: Alt [ Block(primary alts), Star(Block(op alts)) ].
    let primary_block = g.tree.add(NodeKind::Block, SrcToken::default());
    for alt in primary {
        g.tree.add_child(primary_block, alt);
    }
    let op_block = g.tree.add(NodeKind::Block, SrcToken::default());
    for (alt, _) in &ops {
        g.tree.add_child(op_block, *alt);
    }
    let star = g.tree.add(NodeKind::Star { greedy: true }, SrcToken::default());
    g.tree.add_child(star, op_block);

    let outer_alt = g.tree.add(NodeKind::Alt { label: None }, SrcToken::default());
    g.tree.add_child(outer_alt, primary_block);
    g.tree.add_child(outer_alt, star);

    g.tree.node_mut(block).children.clear();
    g.tree.add_child(block, outer_alt);
    g.tree.refresh_parents(rule_node);

    Some(info)
}

/// Remove the leading self-reference (and its label wrapper, if any) from
/// an operator alternative. Returns the dropped label and its list-ness.
fn drop_leading_self_ref(g: &mut Grammar, alt: NodeId) -> (Option<String>, bool) {
    let children: Vec<NodeId> = g.tree.children(alt).to_vec();
    for (i, &element) in children.iter().enumerate() {
        match g.tree.kind(element).clone() {
            NodeKind::Action | NodeKind::Predicate | NodeKind::PrecPredicate { .. } => continue,
            NodeKind::Label { list } => {
                let label = g.tree.text(element).to_string();
                g.tree.remove_child(alt, i);
                return (Some(label), list);
            }
            _ => {
                g.tree.remove_child(alt, i);
                return (None, false);
            }
        }
    }
    (None, false)
}
