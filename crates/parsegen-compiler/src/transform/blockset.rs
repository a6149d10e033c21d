//! Block-set reduction.
//!
//! A block whose alternatives are each a single mergeable terminal collapses
//! into one `Set` node, so the ATN gets a single set transition instead of a
//! decision. Lexer blocks merge single-character literals, ranges, and
//! character sets; parser blocks merge token references and literals.

use parsegen_core::IntervalSet;

use crate::ast::{NodeId, NodeKind, Tree};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::Grammar;
use crate::literals::{decode_charset, literal_char};

/// Collapse every eligible block under every rule of `g`.
pub fn reduce_blocks_to_sets(g: &mut Grammar, diags: &mut Diagnostics) {
    let blocks: Vec<NodeId> = g
        .tree
        .find_all(g.root, |k| matches!(k, NodeKind::Block));
    let lexer = g.is_lexer();

    for block in blocks {
        if !is_reducible(&g.tree, block, lexer) {
            continue;
        }
        reduce(g, block, lexer, diags);
    }
    g.tree.refresh_parents(g.root);
}

/// A block reduces when it has at least two alternatives and every
/// alternative is exactly one unadorned set element. Rule bodies keep
/// their block shape; their trivial decisions collapse in the ATN
/// optimizer instead.
fn is_reducible(tree: &Tree, block: NodeId, lexer: bool) -> bool {
    if let Some(parent) = tree.node(block).parent {
        if matches!(tree.kind(parent), NodeKind::Rule { .. }) {
            return false;
        }
    }
    let alts = tree.children(block);
    if alts.len() < 2 {
        return false;
    }
    alts.iter().all(|&alt| {
        let elements = tree.children(alt);
        let [element] = elements else { return false };
        if !matches!(tree.kind(alt), NodeKind::Alt { label: None }) {
            return false;
        }
        element_is_mergeable(tree, *element, lexer)
    })
}

fn element_is_mergeable(tree: &Tree, element: NodeId, lexer: bool) -> bool {
    if tree.node(element).options.is_some() {
        return false;
    }
    match tree.kind(element) {
        NodeKind::TokenRef => !lexer && tree.text(element) != "EOF",
        NodeKind::StringLiteral => {
            if lexer {
                // Only single code points fit in a character set.
                literal_char(tree.text(element)).is_some()
            } else {
                true
            }
        }
        NodeKind::Range | NodeKind::CharSet => lexer,
        _ => false,
    }
}

/// Rewrite the block in place into a `Set` node holding the terminals.
fn reduce(g: &mut Grammar, block: NodeId, lexer: bool, diags: &mut Diagnostics) {
    let alts: Vec<NodeId> = g.tree.children(block).to_vec();
    let terminals: Vec<NodeId> = alts.iter().map(|&alt| g.tree.child(alt, 0)).collect();

    if lexer {
        check_char_collisions(g, block, &terminals, diags);
    }

    let node = g.tree.node_mut(block);
    node.kind = NodeKind::Set;
    node.children = terminals;
}

/// Merge the terminals' code points, reporting duplicates.
fn check_char_collisions(
    g: &Grammar,
    block: NodeId,
    terminals: &[NodeId],
    diags: &mut Diagnostics,
) {
    let mut merged = IntervalSet::new();
    let mut collided = IntervalSet::new();
    for &t in terminals {
        let part = match g.tree.kind(t) {
            NodeKind::StringLiteral => literal_char(g.tree.text(t))
                .map(|c| IntervalSet::of(c as i32))
                .unwrap_or_default(),
            NodeKind::Range => range_set(g, t).unwrap_or_default(),
            NodeKind::CharSet => decode_charset(g.tree.text(t))
                .map(|d| d.set)
                .unwrap_or_default(),
            _ => IntervalSet::new(),
        };
        for iv in part.intervals() {
            for overlap in merged.add_range(iv.a, iv.b) {
                collided.add_range(overlap.a, overlap.b);
            }
        }
    }

    if !collided.is_empty() {
        let pos = g.tree.node(block).pos();
        diags.emit(
            DiagnosticKind::CharactersCollisionInSet,
            &g.file_name,
            pos,
            &[&collided.to_string(), &merged.to_string()],
        );
    }
}

/// Interval for an `'a'..'z'` range node.
pub(crate) fn range_set(g: &Grammar, range: NodeId) -> Option<IntervalSet> {
    let lo = literal_char(g.tree.text(g.tree.child(range, 0)))?;
    let hi = literal_char(g.tree.text(g.tree.child(range, 1)))?;
    ((lo as u32) <= (hi as u32)).then(|| IntervalSet::of_range(lo as i32, hi as i32))
}

/// Expand a post-reduction `Set` node back into its interval set (lexer).
pub(crate) fn lexer_set_intervals(g: &Grammar, set: NodeId) -> IntervalSet {
    let mut out = IntervalSet::new();
    for &t in g.tree.children(set) {
        match g.tree.kind(t) {
            NodeKind::StringLiteral => {
                if let Some(c) = literal_char(g.tree.text(t)) {
                    out.add(c as i32);
                }
            }
            NodeKind::Range => {
                if let Some(s) = range_set(g, t) {
                    out.union(&s);
                }
            }
            NodeKind::CharSet => {
                if let Some(d) = decode_charset(g.tree.text(t)) {
                    out.union(&d.set);
                }
            }
            _ => {}
        }
    }
    out
}
