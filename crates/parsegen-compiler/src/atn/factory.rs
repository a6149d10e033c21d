//! The ATN factory.

use parsegen_core::{
    Atn, IntervalSet, StateId, StateKind, Transition, MAX_CHAR_VALUE, MIN_CHAR_VALUE,
    MIN_USER_TOKEN_TYPE, TOKEN_EOF,
};

use crate::ast::{NodeId, NodeKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::Grammar;
use crate::literals::{decode_charset, unescape_string};

use super::optimizer;

/// Sub-network for one element: enter at `left`, leave at `right`.
#[derive(Debug, Clone, Copy)]
struct Handle {
    left: StateId,
    right: StateId,
}

/// Build (and optimize) the ATN for a grammar whose rule table is complete.
pub fn build_atn(g: &mut Grammar, diags: &mut Diagnostics) -> Atn {
    let mut atn = Atn::new(g.kind, g.max_token_type);

    // All rule start/stop states exist before any body, so rule references
    // can be wired in one pass.
    for rule in g.rules.values() {
        let start = atn.add_state(StateKind::RuleStart, rule.index);
        let stop = atn.add_state(StateKind::RuleStop, rule.index);
        atn.rule_to_start.push(start);
        atn.rule_to_stop.push(stop);
    }

    let mut factory = Factory { g, atn, diags };
    factory.build_rule_bodies();
    factory.build_mode_starts();

    let mut atn = factory.atn;
    optimizer::optimize(&mut atn);
    atn
}

struct Factory<'a> {
    g: &'a mut Grammar,
    atn: Atn,
    diags: &'a mut Diagnostics,
}

impl Factory<'_> {
    fn build_rule_bodies(&mut self) {
        let rules: Vec<(usize, NodeId)> = self
            .g
            .rules
            .values()
            .map(|r| (r.index, r.node))
            .collect();

        for (index, node) in rules {
            let block = match self.g.rule_block(node) {
                Some(b) => b,
                None => continue,
            };
            let body = self.block(block, index);
            let start = self.atn.rule_to_start[index];
            let stop = self.atn.rule_to_stop[index];
            self.epsilon(start, body.left);
            self.epsilon(body.right, stop);
            self.g.tree.node_mut(node).atn_state = Some(start);
        }
    }

    /// Lexer mode dispatch: one `TokensStart` state per mode with an
    /// epsilon edge to each of its non-fragment rules.
    fn build_mode_starts(&mut self) {
        if !self.g.kind.is_lexer() {
            return;
        }
        let modes: Vec<Vec<usize>> = self
            .g
            .modes
            .values()
            .map(|rule_names| {
                rule_names
                    .iter()
                    .filter_map(|name| {
                        let rule = self.g.rule(name)?;
                        (!rule.is_fragment).then_some(rule.index)
                    })
                    .collect()
            })
            .collect();

        for rule_indices in modes {
            let start = self.atn.add_state(StateKind::TokensStart, 0);
            self.atn.define_decision(start);
            self.atn.mode_to_start.push(start);
            for index in rule_indices {
                let rule_start = self.atn.rule_to_start[index];
                self.epsilon(start, rule_start);
            }
        }
    }

    fn epsilon(&mut self, from: StateId, to: StateId) {
        self.atn
            .add_transition(from, Transition::Epsilon { target: to });
    }

    fn basic_pair(&mut self, rule: usize) -> Handle {
        let left = self.atn.add_state(StateKind::Basic, rule);
        let right = self.atn.add_state(StateKind::Basic, rule);
        Handle { left, right }
    }

    // ------------------------------------------------------------------
    // Blocks and alternatives
    // ------------------------------------------------------------------

    /// A block of alternatives. Single-alternative blocks inline; larger
    /// ones get a decision.
    fn block(&mut self, block: NodeId, rule: usize) -> Handle {
        let alts: Vec<NodeId> = self.g.tree.children(block).to_vec();
        if let [alt] = alts.as_slice() {
            return self.alternative(*alt, rule);
        }

        let start = self.atn.add_state(StateKind::BlockStart, rule);
        let end = self.atn.add_state(StateKind::BlockEnd, rule);
        self.atn.state_mut(start).end_state = Some(end);
        self.atn.define_decision(start);

        for alt in alts {
            let handle = self.alternative(alt, rule);
            self.epsilon(start, handle.left);
            self.epsilon(handle.right, end);
        }
        self.g.tree.node_mut(block).atn_state = Some(start);
        Handle { left: start, right: end }
    }

    /// One alternative: elements chained left to right.
    fn alternative(&mut self, alt: NodeId, rule: usize) -> Handle {
        let elements: Vec<NodeId> = self
            .g
            .tree
            .children(alt)
            .iter()
            .copied()
            .filter(|&e| !matches!(self.g.tree.kind(e), NodeKind::LexerCommands))
            .collect();

        let commands: Option<NodeId> = self
            .g
            .tree
            .children(alt)
            .iter()
            .copied()
            .find(|&e| matches!(self.g.tree.kind(e), NodeKind::LexerCommands));

        let mut handle: Option<Handle> = None;
        for element in elements {
            let next = self.element(element, rule);
            handle = Some(match handle {
                None => next,
                Some(prev) => {
                    self.epsilon(prev.right, next.left);
                    Handle {
                        left: prev.left,
                        right: next.right,
                    }
                }
            });
        }

        let mut handle = handle.unwrap_or_else(|| {
            // Empty alternative: a lone state crossed by epsilon.
            let s = self.atn.add_state(StateKind::Basic, rule);
            Handle { left: s, right: s }
        });

        // Lexer commands run when the rule accepts.
        if let Some(commands) = commands {
            let action = self.lexer_action_transition(commands, rule);
            self.epsilon(handle.right, action.left);
            handle.right = action.right;
        }

        self.g.tree.node_mut(alt).atn_state = Some(handle.left);
        handle
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    fn element(&mut self, element: NodeId, rule: usize) -> Handle {
        let kind = self.g.tree.kind(element).clone();
        let handle = match kind {
            NodeKind::Block => self.block(element, rule),
            NodeKind::Alt { .. } => self.alternative(element, rule),
            NodeKind::Label { .. } => {
                let target = self.g.tree.child(element, 0);
                self.element(target, rule)
            }
            NodeKind::Optional { greedy } => self.optional(element, rule, greedy),
            NodeKind::Star { greedy } => self.star(element, rule, greedy),
            NodeKind::Plus { greedy } => self.plus(element, rule, greedy),
            NodeKind::TokenRef => self.token_ref(element, rule),
            NodeKind::StringLiteral => self.string_literal(element, rule),
            NodeKind::Range => self.char_range(element, rule),
            NodeKind::CharSet => self.char_set(element, rule),
            NodeKind::Set => self.set_node(element, rule),
            NodeKind::Not => self.not_set(element, rule),
            NodeKind::Wildcard => {
                let h = self.basic_pair(rule);
                self.atn
                    .add_transition(h.left, Transition::Wildcard { target: h.right });
                h
            }
            NodeKind::RuleRef => self.rule_ref(element, rule),
            NodeKind::Predicate => {
                let h = self.basic_pair(rule);
                let index = self.g.sempreds.get(&element).copied().unwrap_or(0);
                self.atn.add_transition(
                    h.left,
                    Transition::Predicate {
                        target: h.right,
                        index,
                        dependent: false,
                    },
                );
                h
            }
            NodeKind::PrecPredicate { precedence } => {
                let h = self.basic_pair(rule);
                self.atn.add_transition(
                    h.left,
                    Transition::PrecedencePredicate {
                        target: h.right,
                        precedence,
                    },
                );
                h
            }
            NodeKind::Action => {
                if self.g.kind.is_lexer() {
                    self.lexer_action_transition(element, rule)
                } else {
                    // Parser actions live in generated code; the ATN just
                    // steps over them.
                    let h = self.basic_pair(rule);
                    self.epsilon(h.left, h.right);
                    h
                }
            }
            _ => {
                let h = self.basic_pair(rule);
                self.epsilon(h.left, h.right);
                h
            }
        };
        self.g.tree.node_mut(element).atn_state = Some(handle.left);
        handle
    }

    fn lexer_action_transition(&mut self, node: NodeId, rule: usize) -> Handle {
        let next = self.g.lexer_actions.len();
        let index = *self.g.lexer_actions.entry(node).or_insert(next);
        let h = self.basic_pair(rule);
        self.atn.add_transition(
            h.left,
            Transition::Action {
                target: h.right,
                index,
            },
        );
        h
    }

    fn token_ref(&mut self, element: NodeId, rule: usize) -> Handle {
        let name = self.g.tree.text(element).to_string();
        if self.g.kind.is_lexer() && name != "EOF" {
            // In a lexer, an uppercase reference calls that rule.
            return self.call_rule(&name, rule);
        }
        let label = if name == "EOF" {
            TOKEN_EOF
        } else {
            self.g.token_type(&name)
        };
        let h = self.basic_pair(rule);
        self.atn.add_transition(
            h.left,
            Transition::Atom {
                target: h.right,
                label,
            },
        );
        h
    }

    fn rule_ref(&mut self, element: NodeId, rule: usize) -> Handle {
        let name = self.g.tree.text(element).to_string();
        self.call_rule(&name, rule)
    }

    fn call_rule(&mut self, name: &str, rule: usize) -> Handle {
        let Some(callee) = self.g.rule(name) else {
            // Undefined references were already diagnosed; emit a dead end.
            let h = self.basic_pair(rule);
            self.epsilon(h.left, h.right);
            return h;
        };
        let callee_index = callee.index;
        let h = self.basic_pair(rule);
        let target = self.atn.rule_to_start[callee_index];
        self.atn.add_transition(
            h.left,
            Transition::Rule {
                target,
                rule: callee_index,
                follow: h.right,
            },
        );
        // Follow link: the callee's stop state can continue here.
        let stop = self.atn.rule_to_stop[callee_index];
        self.epsilon(stop, h.right);
        h
    }

    fn string_literal(&mut self, element: NodeId, rule: usize) -> Handle {
        let text = self.g.tree.text(element).to_string();
        if !self.g.kind.is_lexer() {
            let label = self.g.token_type(&text);
            let h = self.basic_pair(rule);
            self.atn.add_transition(
                h.left,
                Transition::Atom {
                    target: h.right,
                    label,
                },
            );
            return h;
        }

        // Lexer: one transition per code point.
        let Some(body) = unescape_string(&text) else {
            self.empty_or_invalid(element, &text);
            let h = self.basic_pair(rule);
            self.epsilon(h.left, h.right);
            return h;
        };
        if body.is_empty() {
            self.empty_or_invalid(element, &text);
            let h = self.basic_pair(rule);
            self.epsilon(h.left, h.right);
            return h;
        }

        let case_insensitive = self.case_insensitive(element);
        let mut handle: Option<Handle> = None;
        for c in body.chars() {
            let h = self.basic_pair(rule);
            let transition = match case_pair(c).filter(|_| case_insensitive) {
                Some((lower, upper)) => {
                    let mut set = IntervalSet::of(lower as i32);
                    set.add(upper as i32);
                    Transition::Set {
                        target: h.right,
                        set,
                    }
                }
                None => Transition::Atom {
                    target: h.right,
                    label: c as i32,
                },
            };
            self.atn.add_transition(h.left, transition);
            handle = Some(match handle {
                None => h,
                Some(prev) => {
                    self.epsilon(prev.right, h.left);
                    Handle {
                        left: prev.left,
                        right: h.right,
                    }
                }
            });
        }
        handle.expect("literal has at least one char")
    }

    fn char_range(&mut self, element: NodeId, rule: usize) -> Handle {
        let lo_text = self.g.tree.text(self.g.tree.child(element, 0)).to_string();
        let hi_text = self.g.tree.text(self.g.tree.child(element, 1)).to_string();
        let lo = unescape_string(&lo_text).and_then(|s| s.chars().next());
        let hi = unescape_string(&hi_text).and_then(|s| s.chars().next());

        let (Some(lo), Some(hi)) = (lo, hi) else {
            self.empty_or_invalid(element, &format!("{lo_text}..{hi_text}"));
            let h = self.basic_pair(rule);
            self.epsilon(h.left, h.right);
            return h;
        };
        if (hi as u32) < (lo as u32) {
            self.empty_or_invalid(element, &format!("{lo_text}..{hi_text}"));
            let h = self.basic_pair(rule);
            self.epsilon(h.left, h.right);
            return h;
        }

        let h = self.basic_pair(rule);
        if self.case_insensitive(element) {
            if let (Some((ll, lu)), Some((hl, hu))) = (case_pair(lo), case_pair(hi)) {
                let mut set = IntervalSet::of_range(ll as i32, hl as i32);
                set.add_range(lu as i32, hu as i32);
                self.atn.add_transition(
                    h.left,
                    Transition::Set {
                        target: h.right,
                        set,
                    },
                );
                return h;
            }
        }
        self.atn.add_transition(
            h.left,
            Transition::Range {
                target: h.right,
                from: lo as i32,
                to: hi as i32,
            },
        );
        h
    }

    fn char_set(&mut self, element: NodeId, rule: usize) -> Handle {
        let text = self.g.tree.text(element).to_string();
        let h = self.basic_pair(rule);
        match decode_charset(&text) {
            Some(decoded) if !decoded.set.is_empty() => {
                if !decoded.collisions.is_empty() {
                    let collided: IntervalSet = decoded
                        .collisions
                        .iter()
                        .flat_map(|iv| iv.a..=iv.b)
                        .collect();
                    let pos = self.g.tree.node(element).pos();
                    self.diags.emit(
                        DiagnosticKind::CharactersCollisionInSet,
                        &self.g.file_name,
                        pos,
                        &[&collided.to_string(), &text],
                    );
                }
                let mut set = decoded.set;
                if self.case_insensitive(element) {
                    set = expand_case(&set);
                }
                self.atn.add_transition(
                    h.left,
                    Transition::Set {
                        target: h.right,
                        set,
                    },
                );
            }
            _ => {
                self.empty_or_invalid(element, &text);
                self.epsilon(h.left, h.right);
            }
        }
        h
    }

    /// A `Set` node produced by block-set reduction.
    fn set_node(&mut self, element: NodeId, rule: usize) -> Handle {
        let h = self.basic_pair(rule);
        let set = if self.g.kind.is_lexer() {
            let mut set = crate::transform::lexer_set_intervals(self.g, element);
            if self.case_insensitive(element) {
                set = expand_case(&set);
            }
            set
        } else {
            self.g
                .tree
                .children(element)
                .iter()
                .map(|&t| self.g.token_type(self.g.tree.text(t)))
                .filter(|&t| t != parsegen_core::TOKEN_INVALID_TYPE)
                .collect()
        };
        self.atn.add_transition(
            h.left,
            Transition::Set {
                target: h.right,
                set,
            },
        );
        h
    }

    fn not_set(&mut self, element: NodeId, rule: usize) -> Handle {
        let inner = self.g.tree.child(element, 0);
        let set = match self.g.tree.kind(inner) {
            NodeKind::CharSet => decode_charset(self.g.tree.text(inner))
                .map(|d| d.set)
                .unwrap_or_default(),
            NodeKind::StringLiteral => unescape_string(self.g.tree.text(inner))
                .and_then(|s| {
                    let mut chars = s.chars();
                    let c = chars.next()?;
                    chars.next().is_none().then(|| IntervalSet::of(c as i32))
                })
                .unwrap_or_default(),
            NodeKind::TokenRef if !self.g.kind.is_lexer() => {
                IntervalSet::of(self.g.token_type(self.g.tree.text(inner)))
            }
            NodeKind::Set => crate::transform::lexer_set_intervals(self.g, inner),
            _ => IntervalSet::new(),
        };

        let h = self.basic_pair(rule);
        if set.is_empty() {
            self.empty_or_invalid(element, self.g.tree.text(inner).to_string().as_str());
            self.epsilon(h.left, h.right);
        } else {
            self.atn.add_transition(
                h.left,
                Transition::NotSet {
                    target: h.right,
                    set,
                },
            );
        }
        h
    }

    // ------------------------------------------------------------------
    // EBNF shapes
    // ------------------------------------------------------------------

    fn subrule_body(&mut self, element: NodeId, rule: usize) -> Handle {
        let child = self.g.tree.child(element, 0);
        self.element(child, rule)
    }

    /// `X?`: a decision between the body and an epsilon path.
    fn optional(&mut self, element: NodeId, rule: usize, greedy: bool) -> Handle {
        let start = self.atn.add_state(StateKind::BlockStart, rule);
        let end = self.atn.add_state(StateKind::BlockEnd, rule);
        self.atn.state_mut(start).end_state = Some(end);
        self.atn.state_mut(start).nongreedy = !greedy;
        self.atn.define_decision(start);

        let body = self.subrule_body(element, rule);
        if greedy {
            self.epsilon(start, body.left);
            self.epsilon(start, end);
        } else {
            self.epsilon(start, end);
            self.epsilon(start, body.left);
        }
        self.epsilon(body.right, end);
        Handle { left: start, right: end }
    }

    /// `X*`: loop entry decides between entering the body and exiting.
    fn star(&mut self, element: NodeId, rule: usize, greedy: bool) -> Handle {
        let entry = self.atn.add_state(StateKind::StarLoopEntry, rule);
        let loop_back = self.atn.add_state(StateKind::StarLoopBack, rule);
        let end = self.atn.add_state(StateKind::LoopEnd, rule);
        self.atn.state_mut(entry).end_state = Some(end);
        self.atn.state_mut(entry).loop_back = Some(loop_back);
        self.atn.state_mut(entry).nongreedy = !greedy;
        self.atn.define_decision(entry);

        let body = self.subrule_body(element, rule);
        if greedy {
            self.epsilon(entry, body.left);
            self.epsilon(entry, end);
        } else {
            self.epsilon(entry, end);
            self.epsilon(entry, body.left);
        }
        self.epsilon(body.right, loop_back);
        self.epsilon(loop_back, entry);
        Handle { left: entry, right: end }
    }

    /// `X+`: the body runs once, then the loop-back decides.
    fn plus(&mut self, element: NodeId, rule: usize, greedy: bool) -> Handle {
        let start = self.atn.add_state(StateKind::PlusBlockStart, rule);
        let loop_back = self.atn.add_state(StateKind::PlusLoopBack, rule);
        let end = self.atn.add_state(StateKind::LoopEnd, rule);
        self.atn.state_mut(start).end_state = Some(end);
        self.atn.state_mut(start).loop_back = Some(loop_back);
        self.atn.state_mut(loop_back).nongreedy = !greedy;
        self.atn.define_decision(loop_back);

        let body = self.subrule_body(element, rule);
        self.epsilon(start, body.left);
        self.epsilon(body.right, loop_back);
        if greedy {
            self.epsilon(loop_back, body.left);
            self.epsilon(loop_back, end);
        } else {
            self.epsilon(loop_back, end);
            self.epsilon(loop_back, body.left);
        }
        Handle { left: start, right: end }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn case_insensitive(&self, element: NodeId) -> bool {
        self.g.tree.option_in_scope(element, "caseInsensitive") == Some("true")
    }

    fn empty_or_invalid(&mut self, element: NodeId, text: &str) {
        let pos = self.g.tree.node(element).pos();
        self.diags.emit(
            DiagnosticKind::EmptyStringsAndSetsNotAllowed,
            &self.g.file_name,
            pos,
            &[text],
        );
    }
}

/// Lower/upper pair for a cased character, when both case mappings are a
/// single code point. Characters whose case-mapped forms change length are
/// left unexpanded.
fn case_pair(c: char) -> Option<(char, char)> {
    if !c.is_alphabetic() {
        return None;
    }
    let mut lower = c.to_lowercase();
    let mut upper = c.to_uppercase();
    let (l, u) = (lower.next()?, upper.next()?);
    if lower.next().is_some() || upper.next().is_some() {
        return None;
    }
    (l != u).then_some((l, u))
}

/// Union a set with the case-mapped mates of its characters.
fn expand_case(set: &IntervalSet) -> IntervalSet {
    let mut out = set.clone();
    for iv in set.intervals() {
        // Bounded scan; giant ranges keep only their original span.
        if iv.len() > 1024 {
            continue;
        }
        for v in iv.a..=iv.b {
            let Some(c) = char::from_u32(v as u32) else { continue };
            if let Some((l, u)) = case_pair(c) {
                out.add(l as i32);
                out.add(u as i32);
            }
        }
    }
    out
}

/// The full-universe bounds for wildcard/complement handling.
pub(crate) fn universe_of(lexer: bool, max_token_type: i32) -> (i32, i32) {
    if lexer {
        (MIN_CHAR_VALUE, MAX_CHAR_VALUE)
    } else {
        (MIN_USER_TOKEN_TYPE, max_token_type)
    }
}
