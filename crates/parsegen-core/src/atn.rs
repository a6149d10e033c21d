//! The augmented transition network.
//!
//! A directed graph of numbered states connected by labeled transitions.
//! Rule entry/exit, decision, and loop states carry their own kinds so the
//! analysis passes and code generators can recover the grammar shape from
//! the graph alone.
//!
//! States are stored in a slot array: removal leaves a hole, and
//! [`Atn::compact`] renumbers everything once the optimizer is done.

use crate::interval::IntervalSet;

pub type StateId = usize;
pub type RuleIdx = usize;
pub type DecisionIdx = usize;

/// Which kind of grammar produced an ATN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GrammarKind {
    Lexer,
    Parser,
    Combined,
}

impl GrammarKind {
    pub fn is_lexer(self) -> bool {
        matches!(self, GrammarKind::Lexer)
    }
}

/// Structural role of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StateKind {
    Basic,
    RuleStart,
    RuleStop,
    BlockStart,
    BlockEnd,
    PlusBlockStart,
    PlusLoopBack,
    StarLoopEntry,
    StarLoopBack,
    LoopEnd,
    /// Lexer mode dispatch state; one per mode.
    TokensStart,
}

/// Edge label of a transition.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Transition {
    Epsilon {
        target: StateId,
    },
    /// Single token type or code point.
    Atom {
        target: StateId,
        label: i32,
    },
    Range {
        target: StateId,
        from: i32,
        to: i32,
    },
    Set {
        target: StateId,
        set: IntervalSet,
    },
    NotSet {
        target: StateId,
        set: IntervalSet,
    },
    /// Call into another rule; `follow` is the caller-side return state.
    Rule {
        target: StateId,
        rule: RuleIdx,
        follow: StateId,
    },
    Action {
        target: StateId,
        index: usize,
    },
    Predicate {
        target: StateId,
        index: usize,
        dependent: bool,
    },
    PrecedencePredicate {
        target: StateId,
        precedence: u32,
    },
    Wildcard {
        target: StateId,
    },
}

impl Transition {
    pub fn target(&self) -> StateId {
        match *self {
            Transition::Epsilon { target }
            | Transition::Atom { target, .. }
            | Transition::Range { target, .. }
            | Transition::Set { target, .. }
            | Transition::NotSet { target, .. }
            | Transition::Rule { target, .. }
            | Transition::Action { target, .. }
            | Transition::Predicate { target, .. }
            | Transition::PrecedencePredicate { target, .. }
            | Transition::Wildcard { target } => target,
        }
    }

    pub fn set_target(&mut self, new: StateId) {
        match self {
            Transition::Epsilon { target }
            | Transition::Atom { target, .. }
            | Transition::Range { target, .. }
            | Transition::Set { target, .. }
            | Transition::NotSet { target, .. }
            | Transition::Rule { target, .. }
            | Transition::Action { target, .. }
            | Transition::Predicate { target, .. }
            | Transition::PrecedencePredicate { target, .. }
            | Transition::Wildcard { target } => *target = new,
        }
    }

    /// Transitions crossed without consuming input.
    pub fn is_epsilon(&self) -> bool {
        matches!(
            self,
            Transition::Epsilon { .. }
                | Transition::Action { .. }
                | Transition::Predicate { .. }
                | Transition::PrecedencePredicate { .. }
        )
    }
}

/// A single ATN state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AtnState {
    pub number: StateId,
    pub kind: StateKind,
    /// Index of the rule this state belongs to.
    pub rule: RuleIdx,
    pub transitions: Vec<Transition>,
    /// Set for states that introduce nondeterminism.
    pub decision: Option<DecisionIdx>,
    /// Block starts point at their block end; loop entries at their loop end.
    pub end_state: Option<StateId>,
    /// Loop entries point at their loop-back state.
    pub loop_back: Option<StateId>,
    /// Non-greedy subrules prefer the exit alternative.
    pub nongreedy: bool,
}

impl AtnState {
    pub fn epsilon_only(&self) -> bool {
        self.transitions.iter().all(Transition::is_epsilon)
    }
}

/// The network: slot array of states plus the rule/decision/mode registries.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Atn {
    pub grammar_kind: GrammarKind,
    states: Vec<Option<AtnState>>,
    pub rule_to_start: Vec<StateId>,
    pub rule_to_stop: Vec<StateId>,
    pub decision_to_state: Vec<StateId>,
    /// Lexer only: mode index to its `TokensStart` state.
    pub mode_to_start: Vec<StateId>,
    pub max_token_type: i32,
}

impl Atn {
    pub fn new(grammar_kind: GrammarKind, max_token_type: i32) -> Self {
        Self {
            grammar_kind,
            states: Vec::new(),
            rule_to_start: Vec::new(),
            rule_to_stop: Vec::new(),
            decision_to_state: Vec::new(),
            mode_to_start: Vec::new(),
            max_token_type,
        }
    }

    pub fn add_state(&mut self, kind: StateKind, rule: RuleIdx) -> StateId {
        let number = self.states.len();
        self.states.push(Some(AtnState {
            number,
            kind,
            rule,
            transitions: Vec::new(),
            decision: None,
            end_state: None,
            loop_back: None,
            nongreedy: false,
        }));
        number
    }

    /// Number of slots, including holes left by removal.
    pub fn num_slots(&self) -> usize {
        self.states.len()
    }

    pub fn num_states(&self) -> usize {
        self.states.iter().flatten().count()
    }

    pub fn state(&self, id: StateId) -> &AtnState {
        self.states[id].as_ref().expect("state was removed")
    }

    pub fn state_mut(&mut self, id: StateId) -> &mut AtnState {
        self.states[id].as_mut().expect("state was removed")
    }

    pub fn try_state(&self, id: StateId) -> Option<&AtnState> {
        self.states.get(id).and_then(Option::as_ref)
    }

    pub fn add_transition(&mut self, from: StateId, transition: Transition) {
        self.state_mut(from).transitions.push(transition);
    }

    /// Register `state` as a decision, returning its decision number.
    pub fn define_decision(&mut self, state: StateId) -> DecisionIdx {
        let idx = self.decision_to_state.len();
        self.decision_to_state.push(state);
        self.state_mut(state).decision = Some(idx);
        idx
    }

    pub fn num_decisions(&self) -> usize {
        self.decision_to_state.len()
    }

    pub fn decision_state(&self, decision: DecisionIdx) -> &AtnState {
        self.state(self.decision_to_state[decision])
    }

    /// Remove a state, leaving a hole until [`Atn::compact`] runs.
    pub fn remove_state(&mut self, id: StateId) {
        self.states[id] = None;
    }

    pub fn iter_states(&self) -> impl Iterator<Item = &AtnState> {
        self.states.iter().flatten()
    }

    /// Renumber states to eliminate holes and rewrite every reference.
    pub fn compact(&mut self) {
        let mut remap = vec![usize::MAX; self.states.len()];
        let mut next = 0;
        for (old, slot) in self.states.iter().enumerate() {
            if slot.is_some() {
                remap[old] = next;
                next += 1;
            }
        }

        let old_states = std::mem::take(&mut self.states);
        self.states = Vec::with_capacity(next);
        for slot in old_states {
            let Some(mut st) = slot else { continue };
            st.number = remap[st.number];
            for t in &mut st.transitions {
                t.set_target(remap[t.target()]);
                if let Transition::Rule { follow, .. } = t {
                    *follow = remap[*follow];
                }
            }
            st.end_state = st.end_state.map(|s| remap[s]);
            st.loop_back = st.loop_back.map(|s| remap[s]);
            self.states.push(Some(st));
        }

        for s in self
            .rule_to_start
            .iter_mut()
            .chain(self.rule_to_stop.iter_mut())
            .chain(self.decision_to_state.iter_mut())
            .chain(self.mode_to_start.iter_mut())
        {
            *s = remap[*s];
        }
    }
}
