//! ATN optimization: set merging and state compaction.

use parsegen_core::{Atn, IntervalSet, StateId, StateKind, Transition};

/// Run both optimizations in place.
pub fn optimize(atn: &mut Atn) {
    merge_set_decisions(atn);
    atn.compact();
}

/// Collapse decisions whose alternatives are each a lone atom, range, or
/// set transition to the shared block end into a single set transition.
///
/// The pattern left by the factory is:
/// `BlockStart -ε-> Basic -label-> Basic -ε-> BlockEnd` per alternative.
fn merge_set_decisions(atn: &mut Atn) {
    let candidates: Vec<StateId> = atn
        .iter_states()
        .filter(|s| s.kind == StateKind::BlockStart && s.decision.is_some())
        .map(|s| s.number)
        .collect();

    let mut removed_decisions = Vec::new();

    for start in candidates {
        let Some(end) = atn.state(start).end_state else {
            continue;
        };
        let Some(plan) = merge_plan(atn, start, end) else {
            continue;
        };

        // Rewrite: one set edge straight to the block end.
        let state = atn.state_mut(start);
        state.transitions = vec![Transition::Set {
            target: end,
            set: plan.set,
        }];
        if let Some(d) = state.decision.take() {
            removed_decisions.push(d);
        }
        for dead in plan.dead_states {
            atn.remove_state(dead);
        }
    }

    // Renumber surviving decisions.
    removed_decisions.sort_unstable();
    for &d in removed_decisions.iter().rev() {
        atn.decision_to_state.remove(d);
    }
    let decision_states: Vec<StateId> = atn.decision_to_state.clone();
    for (i, s) in decision_states.into_iter().enumerate() {
        atn.state_mut(s).decision = Some(i);
    }
}

struct MergePlan {
    set: IntervalSet,
    dead_states: Vec<StateId>,
}

/// Check every alternative of the decision fits the mergeable pattern and
/// compute the union set.
fn merge_plan(atn: &Atn, start: StateId, end: StateId) -> Option<MergePlan> {
    let mut set = IntervalSet::new();
    let mut dead_states = Vec::new();

    let alts = &atn.state(start).transitions;
    if alts.len() < 2 {
        return None;
    }

    for t in alts {
        let Transition::Epsilon { target } = t else {
            return None;
        };
        let first = atn.state(*target);
        if first.kind != StateKind::Basic || first.transitions.len() != 1 {
            return None;
        }
        let inner = &first.transitions[0];
        let label = match inner {
            Transition::Atom { label, .. } => IntervalSet::of(*label),
            Transition::Range { from, to, .. } => IntervalSet::of_range(*from, *to),
            Transition::Set { set, .. } => set.clone(),
            _ => return None,
        };
        let second = atn.state(inner.target());
        if second.kind != StateKind::Basic || second.transitions.len() != 1 {
            return None;
        }
        let Transition::Epsilon { target: out } = &second.transitions[0] else {
            return None;
        };
        if *out != end {
            return None;
        }

        set.union(&label);
        dead_states.push(first.number);
        dead_states.push(second.number);
    }

    Some(MergePlan { set, dead_states })
}
