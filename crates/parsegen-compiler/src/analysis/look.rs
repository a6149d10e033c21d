//! k=1 lookahead over the ATN.

use std::collections::HashSet;

use parsegen_core::{Atn, IntervalSet, StateId, StateKind, Transition, TOKEN_EOF};

use crate::atn::universe_of;

/// Call-depth bound for rule chains the cycle detector could not rule out.
const MAX_CALL_DEPTH: usize = 100;

/// Tokens (or code points) that can be matched first from `state`.
///
/// Rule transitions push their follow state; a rule stop with an empty
/// stack falls back to the follow links wired during construction, or EOF
/// when the rule is never called. Predicates and actions are crossed as
/// epsilon. A busy set over `(state, depth)` pairs guards recursion.
pub fn look(atn: &Atn, state: StateId) -> IntervalSet {
    let mut out = IntervalSet::new();
    let mut busy = HashSet::new();
    walk(atn, state, &mut Vec::new(), &mut busy, &mut out);
    out
}

fn walk(
    atn: &Atn,
    state: StateId,
    ctx: &mut Vec<StateId>,
    busy: &mut HashSet<(StateId, usize)>,
    out: &mut IntervalSet,
) {
    if !busy.insert((state, ctx.len())) {
        return;
    }

    let s = atn.state(state);
    if s.kind == StateKind::RuleStop {
        match ctx.pop() {
            Some(follow) => {
                walk(atn, follow, ctx, busy, out);
                ctx.push(follow);
            }
            None => {
                // Unknown caller: follow the context-free links, or EOF
                // when nothing references the rule.
                let mut any = false;
                for t in &s.transitions {
                    if let Transition::Epsilon { target } = t {
                        any = true;
                        walk(atn, *target, ctx, busy, out);
                    }
                }
                if !any {
                    out.add(TOKEN_EOF);
                }
            }
        }
        busy.remove(&(state, ctx.len()));
        return;
    }

    for t in &s.transitions {
        match t {
            Transition::Epsilon { target }
            | Transition::Action { target, .. }
            | Transition::Predicate { target, .. }
            | Transition::PrecedencePredicate { target, .. } => {
                walk(atn, *target, ctx, busy, out);
            }
            Transition::Rule { target, follow, .. } => {
                if ctx.len() < MAX_CALL_DEPTH {
                    ctx.push(*follow);
                    walk(atn, *target, ctx, busy, out);
                    ctx.pop();
                }
            }
            Transition::Atom { label, .. } => {
                out.add(*label);
            }
            Transition::Range { from, to, .. } => {
                out.add_range(*from, *to);
            }
            Transition::Set { set, .. } => {
                out.union(set);
            }
            Transition::NotSet { set, .. } => {
                let (lo, hi) = universe_of(atn.grammar_kind.is_lexer(), atn.max_token_type);
                out.union(&set.complement(lo, hi));
            }
            Transition::Wildcard { .. } => {
                let (lo, hi) = universe_of(atn.grammar_kind.is_lexer(), atn.max_token_type);
                if lo <= hi {
                    out.add_range(lo, hi);
                }
            }
        }
    }

    busy.remove(&(state, ctx.len()));
}
