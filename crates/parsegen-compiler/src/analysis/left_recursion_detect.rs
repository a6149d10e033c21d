//! Detection of left-recursion cycles the transform could not remove.
//!
//! Direct left recursion is rewritten before this runs, so any cycle found
//! here is mutual (indirect) recursion, which has no mechanical rewrite.

use indexmap::IndexMap;

use crate::ast::{NodeId, NodeKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::Grammar;

/// Report every set of mutually left-recursive rules.
pub fn check_left_recursion_cycles(g: &Grammar, diags: &mut Diagnostics) {
    if g.is_lexer() {
        return;
    }

    // Edges: rule -> rules reachable at its leftmost position.
    let mut edges: IndexMap<String, Vec<String>> = IndexMap::new();
    for rule in g.rules.values() {
        let mut targets = Vec::new();
        for alt in g.rule_alts(rule.node) {
            leftmost_rule_refs(g, alt, &mut targets);
        }
        edges.insert(rule.name.clone(), targets);
    }

    for cycle in cycles(&edges) {
        let display = cycle.join(", ");
        let pos = g
            .rule(&cycle[0])
            .map(|r| g.tree.node(r.node).pos())
            .unwrap_or_default();
        diags.emit(
            DiagnosticKind::LeftRecursionCycles,
            &g.file_name,
            pos,
            &[&display],
        );
    }
}

/// Rule references reachable before any token is consumed in `alt`.
fn leftmost_rule_refs(g: &Grammar, alt: NodeId, out: &mut Vec<String>) {
    for &element in g.tree.children(alt) {
        match g.tree.kind(element) {
            NodeKind::Action
            | NodeKind::Predicate
            | NodeKind::PrecPredicate { .. }
            | NodeKind::LexerCommands => continue,
            NodeKind::Label { .. } => {
                let inner = g.tree.child(element, 0);
                if leftmost_element(g, inner, out) {
                    continue;
                }
                return;
            }
            _ => {
                if leftmost_element(g, element, out) {
                    continue;
                }
                return;
            }
        }
    }
}

/// Collect leftmost refs of one element; `true` when it can match empty
/// (so the walk continues into the next element).
fn leftmost_element(g: &Grammar, element: NodeId, out: &mut Vec<String>) -> bool {
    match g.tree.kind(element) {
        NodeKind::RuleRef => {
            let name = g.tree.text(element).to_string();
            if !out.contains(&name) {
                out.push(name);
            }
            false
        }
        NodeKind::Optional { .. } | NodeKind::Star { .. } => {
            let inner = g.tree.child(element, 0);
            leftmost_element(g, inner, out);
            true
        }
        NodeKind::Plus { .. } => {
            let inner = g.tree.child(element, 0);
            leftmost_element(g, inner, out)
        }
        NodeKind::Block => {
            let mut all_empty = true;
            for &a in g.tree.children(element) {
                let before = out.len();
                leftmost_rule_refs(g, a, out);
                // An alt that added nothing and has matchable content is
                // still opaque; treat the block as non-empty unless every
                // alt is empty of terminals.
                let alt_empty = g.tree.children(a).is_empty() && out.len() == before;
                all_empty = all_empty && alt_empty;
            }
            all_empty
        }
        NodeKind::Alt { .. } => {
            leftmost_rule_refs(g, element, out);
            false
        }
        NodeKind::Action | NodeKind::Predicate | NodeKind::PrecPredicate { .. } => true,
        _ => false,
    }
}

/// Strongly connected components with more than one member, plus direct
/// self-loops (Tarjan).
fn cycles(edges: &IndexMap<String, Vec<String>>) -> Vec<Vec<String>> {
    struct Tarjan<'a> {
        edges: &'a IndexMap<String, Vec<String>>,
        index: IndexMap<&'a str, usize>,
        low: IndexMap<&'a str, usize>,
        on_stack: Vec<&'a str>,
        next: usize,
        sccs: Vec<Vec<String>>,
    }

    impl<'a> Tarjan<'a> {
        fn visit(&mut self, v: &'a str) {
            self.index.insert(v, self.next);
            self.low.insert(v, self.next);
            self.next += 1;
            self.on_stack.push(v);

            if let Some(targets) = self.edges.get(v) {
                for w in targets {
                    let w = w.as_str();
                    if !self.edges.contains_key(w) {
                        continue;
                    }
                    if !self.index.contains_key(w) {
                        self.visit(w);
                        let low_w = self.low[w];
                        let low_v = self.low[v];
                        self.low.insert(v, low_v.min(low_w));
                    } else if self.on_stack.contains(&w) {
                        let idx_w = self.index[w];
                        let low_v = self.low[v];
                        self.low.insert(v, low_v.min(idx_w));
                    }
                }
            }

            if self.low[v] == self.index[v] {
                let at = self
                    .on_stack
                    .iter()
                    .position(|&s| s == v)
                    .expect("root is on stack");
                let scc: Vec<String> = self.on_stack.split_off(at).iter().map(|s| s.to_string()).collect();
                let is_cycle = scc.len() > 1
                    || self
                        .edges
                        .get(v)
                        .is_some_and(|targets| targets.iter().any(|t| t == v));
                if is_cycle {
                    self.sccs.push(scc);
                }
            }
        }
    }

    let mut t = Tarjan {
        edges,
        index: IndexMap::new(),
        low: IndexMap::new(),
        on_stack: Vec::new(),
        next: 0,
        sccs: Vec::new(),
    };
    let names: Vec<&str> = edges.keys().map(String::as_str).collect();
    for name in names {
        if !t.index.contains_key(name) {
            t.visit(name);
        }
    }
    t.sccs
}
