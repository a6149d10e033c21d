//! Per-decision lookahead collection and LL(1) classification.

use parsegen_core::IntervalSet;

use crate::grammar::Grammar;

use super::look::look;

/// Compute the lookahead set of every alternative of every decision and
/// record which decisions are LL(1).
///
/// Results land in `grammar.decision_lookahead[decision][alt]` and
/// `grammar.decision_ll1[decision]`. Non-LL(1) decisions are not errors;
/// they fall back to adaptive prediction at runtime.
pub fn analyze_decisions(g: &mut Grammar) {
    let Some(atn) = g.atn.as_ref() else { return };

    let mut lookahead = Vec::with_capacity(atn.num_decisions());
    let mut ll1 = Vec::with_capacity(atn.num_decisions());

    for decision in 0..atn.num_decisions() {
        let state = atn.decision_state(decision);
        let alt_sets: Vec<IntervalSet> = state
            .transitions
            .iter()
            .map(|t| look(atn, t.target()))
            .collect();
        ll1.push(disjoint(&alt_sets));
        lookahead.push(alt_sets);
    }

    g.decision_lookahead = lookahead;
    g.decision_ll1 = ll1;
}

/// True when the sets are pairwise disjoint.
pub fn disjoint(sets: &[IntervalSet]) -> bool {
    for (i, a) in sets.iter().enumerate() {
        for b in &sets[i + 1..] {
            if a.intersects(b) {
                return false;
            }
        }
    }
    true
}
