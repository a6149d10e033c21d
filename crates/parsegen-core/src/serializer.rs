//! Serialized ATN codec.
//!
//! The wire form is a sequence of 16-bit words. A value below `0x8000` is
//! one word. Larger values set the high bit of the first word and span two
//! words, big-endian, carrying 31 bits. `-1` is the sentinel `0xFFFF 0xFFFF`.
//! `0x7FFF_FFFF` is reserved for the sentinel, so the largest payload is
//! `0x7FFF_FFFE`; anything outside that range is a fatal overflow.

use crate::atn::{Atn, AtnState, GrammarKind, StateKind, Transition};
use crate::interval::IntervalSet;

const SERIALIZED_VERSION: i32 = 1;

const SENTINEL_WORD: u16 = 0xFFFF;
const MAX_PAYLOAD: i32 = 0x7FFF_FFFE;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializeError {
    #[error("serialized value {0} exceeds the 31-bit payload range")]
    Overflow(i64),

    #[error("cannot serialize an ATN with removed states; run compact() first")]
    Hole,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeserializeError {
    #[error("serialized ATN truncated at word {0}")]
    Truncated(usize),

    #[error("unsupported serialized ATN version {0}")]
    Version(i32),

    #[error("invalid {what} code {code} at word {at}")]
    BadCode {
        what: &'static str,
        code: i32,
        at: usize,
    },

    #[error("state reference {0} out of range")]
    BadStateRef(i32),
}

fn write_int(out: &mut Vec<u16>, v: i32) -> Result<(), SerializeError> {
    if v == -1 {
        out.push(SENTINEL_WORD);
        out.push(SENTINEL_WORD);
        return Ok(());
    }
    if !(0..=MAX_PAYLOAD).contains(&v) {
        return Err(SerializeError::Overflow(v as i64));
    }
    if v < 0x8000 {
        out.push(v as u16);
    } else {
        out.push(0x8000 | ((v >> 16) as u16));
        out.push((v & 0xFFFF) as u16);
    }
    Ok(())
}

fn write_usize(out: &mut Vec<u16>, v: usize) -> Result<(), SerializeError> {
    i32::try_from(v)
        .map_err(|_| SerializeError::Overflow(v as i64))
        .and_then(|v| write_int(out, v))
}

/// `Option<StateId>` as `id + 1`, with 0 meaning absent.
fn write_opt_state(out: &mut Vec<u16>, v: Option<usize>) -> Result<(), SerializeError> {
    write_usize(out, v.map_or(0, |s| s + 1))
}

struct Reader<'a> {
    words: &'a [u16],
    pos: usize,
}

impl Reader<'_> {
    fn read_int(&mut self) -> Result<i32, DeserializeError> {
        let first = *self
            .words
            .get(self.pos)
            .ok_or(DeserializeError::Truncated(self.pos))?;
        self.pos += 1;
        if first & 0x8000 == 0 {
            return Ok(first as i32);
        }
        let second = *self
            .words
            .get(self.pos)
            .ok_or(DeserializeError::Truncated(self.pos))?;
        self.pos += 1;
        if first == SENTINEL_WORD && second == SENTINEL_WORD {
            return Ok(-1);
        }
        Ok((((first & 0x7FFF) as i32) << 16) | second as i32)
    }

    fn read_usize(&mut self) -> Result<usize, DeserializeError> {
        let v = self.read_int()?;
        usize::try_from(v).map_err(|_| DeserializeError::BadStateRef(v))
    }

    fn read_opt_state(&mut self) -> Result<Option<usize>, DeserializeError> {
        Ok(match self.read_usize()? {
            0 => None,
            v => Some(v - 1),
        })
    }

    fn read_bool(&mut self) -> Result<bool, DeserializeError> {
        Ok(self.read_int()? != 0)
    }
}

fn kind_code(kind: StateKind) -> i32 {
    match kind {
        StateKind::Basic => 0,
        StateKind::RuleStart => 1,
        StateKind::RuleStop => 2,
        StateKind::BlockStart => 3,
        StateKind::BlockEnd => 4,
        StateKind::PlusBlockStart => 5,
        StateKind::PlusLoopBack => 6,
        StateKind::StarLoopEntry => 7,
        StateKind::StarLoopBack => 8,
        StateKind::LoopEnd => 9,
        StateKind::TokensStart => 10,
    }
}

fn kind_from_code(code: i32, at: usize) -> Result<StateKind, DeserializeError> {
    Ok(match code {
        0 => StateKind::Basic,
        1 => StateKind::RuleStart,
        2 => StateKind::RuleStop,
        3 => StateKind::BlockStart,
        4 => StateKind::BlockEnd,
        5 => StateKind::PlusBlockStart,
        6 => StateKind::PlusLoopBack,
        7 => StateKind::StarLoopEntry,
        8 => StateKind::StarLoopBack,
        9 => StateKind::LoopEnd,
        10 => StateKind::TokensStart,
        _ => {
            return Err(DeserializeError::BadCode {
                what: "state kind",
                code,
                at,
            })
        }
    })
}

fn write_set(out: &mut Vec<u16>, set: &IntervalSet) -> Result<(), SerializeError> {
    write_usize(out, set.intervals().len())?;
    for iv in set.intervals() {
        write_int(out, iv.a)?;
        write_int(out, iv.b)?;
    }
    Ok(())
}

fn read_set(r: &mut Reader<'_>) -> Result<IntervalSet, DeserializeError> {
    let n = r.read_usize()?;
    let mut set = IntervalSet::new();
    for _ in 0..n {
        let a = r.read_int()?;
        let b = r.read_int()?;
        set.add_range(a, b);
    }
    Ok(set)
}

fn write_transition(out: &mut Vec<u16>, t: &Transition) -> Result<(), SerializeError> {
    match t {
        Transition::Epsilon { target } => {
            write_int(out, 0)?;
            write_usize(out, *target)?;
        }
        Transition::Atom { target, label } => {
            write_int(out, 1)?;
            write_usize(out, *target)?;
            write_int(out, *label)?;
        }
        Transition::Range { target, from, to } => {
            write_int(out, 2)?;
            write_usize(out, *target)?;
            write_int(out, *from)?;
            write_int(out, *to)?;
        }
        Transition::Set { target, set } => {
            write_int(out, 3)?;
            write_usize(out, *target)?;
            write_set(out, set)?;
        }
        Transition::NotSet { target, set } => {
            write_int(out, 4)?;
            write_usize(out, *target)?;
            write_set(out, set)?;
        }
        Transition::Rule {
            target,
            rule,
            follow,
        } => {
            write_int(out, 5)?;
            write_usize(out, *target)?;
            write_usize(out, *rule)?;
            write_usize(out, *follow)?;
        }
        Transition::Action { target, index } => {
            write_int(out, 6)?;
            write_usize(out, *target)?;
            write_usize(out, *index)?;
        }
        Transition::Predicate {
            target,
            index,
            dependent,
        } => {
            write_int(out, 7)?;
            write_usize(out, *target)?;
            write_usize(out, *index)?;
            write_int(out, i32::from(*dependent))?;
        }
        Transition::PrecedencePredicate { target, precedence } => {
            write_int(out, 8)?;
            write_usize(out, *target)?;
            write_usize(out, *precedence as usize)?;
        }
        Transition::Wildcard { target } => {
            write_int(out, 9)?;
            write_usize(out, *target)?;
        }
    }
    Ok(())
}

fn read_transition(r: &mut Reader<'_>) -> Result<Transition, DeserializeError> {
    let at = r.pos;
    let tag = r.read_int()?;
    let target = r.read_usize()?;
    Ok(match tag {
        0 => Transition::Epsilon { target },
        1 => Transition::Atom {
            target,
            label: r.read_int()?,
        },
        2 => Transition::Range {
            target,
            from: r.read_int()?,
            to: r.read_int()?,
        },
        3 => Transition::Set {
            target,
            set: read_set(r)?,
        },
        4 => Transition::NotSet {
            target,
            set: read_set(r)?,
        },
        5 => Transition::Rule {
            target,
            rule: r.read_usize()?,
            follow: r.read_usize()?,
        },
        6 => Transition::Action {
            target,
            index: r.read_usize()?,
        },
        7 => Transition::Predicate {
            target,
            index: r.read_usize()?,
            dependent: r.read_bool()?,
        },
        8 => Transition::PrecedencePredicate {
            target,
            precedence: r.read_usize()? as u32,
        },
        9 => Transition::Wildcard { target },
        _ => {
            return Err(DeserializeError::BadCode {
                what: "transition",
                code: tag,
                at,
            })
        }
    })
}

/// Serialize a compacted ATN to its integer stream.
pub fn serialize(atn: &Atn) -> Result<Vec<u16>, SerializeError> {
    let mut out = Vec::new();
    write_int(&mut out, SERIALIZED_VERSION)?;
    write_int(
        &mut out,
        match atn.grammar_kind {
            GrammarKind::Lexer => 0,
            GrammarKind::Parser => 1,
            GrammarKind::Combined => 2,
        },
    )?;
    write_int(&mut out, atn.max_token_type)?;

    if atn.num_states() != atn.num_slots() {
        return Err(SerializeError::Hole);
    }

    write_usize(&mut out, atn.num_slots())?;
    for state in atn.iter_states() {
        write_int(&mut out, kind_code(state.kind))?;
        write_usize(&mut out, state.rule)?;
        write_opt_state(&mut out, state.decision)?;
        write_opt_state(&mut out, state.end_state)?;
        write_opt_state(&mut out, state.loop_back)?;
        write_int(&mut out, i32::from(state.nongreedy))?;
        write_usize(&mut out, state.transitions.len())?;
        for t in &state.transitions {
            write_transition(&mut out, t)?;
        }
    }

    write_usize(&mut out, atn.rule_to_start.len())?;
    for (start, stop) in atn.rule_to_start.iter().zip(&atn.rule_to_stop) {
        write_usize(&mut out, *start)?;
        write_usize(&mut out, *stop)?;
    }

    write_usize(&mut out, atn.decision_to_state.len())?;
    for s in &atn.decision_to_state {
        write_usize(&mut out, *s)?;
    }

    write_usize(&mut out, atn.mode_to_start.len())?;
    for s in &atn.mode_to_start {
        write_usize(&mut out, *s)?;
    }

    Ok(out)
}

/// Rebuild an ATN from its integer stream.
pub fn deserialize(words: &[u16]) -> Result<Atn, DeserializeError> {
    let mut r = Reader { words, pos: 0 };

    let version = r.read_int()?;
    if version != SERIALIZED_VERSION {
        return Err(DeserializeError::Version(version));
    }
    let at = r.pos;
    let kind_code = r.read_int()?;
    let grammar_kind = match kind_code {
        0 => GrammarKind::Lexer,
        1 => GrammarKind::Parser,
        2 => GrammarKind::Combined,
        _ => {
            return Err(DeserializeError::BadCode {
                what: "grammar kind",
                code: kind_code,
                at,
            })
        }
    };
    let max_token_type = r.read_int()?;

    let mut atn = Atn::new(grammar_kind, max_token_type);

    let num_states = r.read_usize()?;
    for number in 0..num_states {
        let at = r.pos;
        let kind = kind_from_code(r.read_int()?, at)?;
        let rule = r.read_usize()?;
        let id = atn.add_state(kind, rule);
        debug_assert_eq!(id, number);
        let decision = r.read_opt_state()?;
        let end_state = r.read_opt_state()?;
        let loop_back = r.read_opt_state()?;
        let nongreedy = r.read_bool()?;
        let num_transitions = r.read_usize()?;
        let mut transitions = Vec::with_capacity(num_transitions);
        for _ in 0..num_transitions {
            transitions.push(read_transition(&mut r)?);
        }
        let state: &mut AtnState = atn.state_mut(id);
        state.decision = decision;
        state.end_state = end_state;
        state.loop_back = loop_back;
        state.nongreedy = nongreedy;
        state.transitions = transitions;
    }

    let num_rules = r.read_usize()?;
    for _ in 0..num_rules {
        atn.rule_to_start.push(check_ref(r.read_usize()?, num_states)?);
        atn.rule_to_stop.push(check_ref(r.read_usize()?, num_states)?);
    }

    let num_decisions = r.read_usize()?;
    for _ in 0..num_decisions {
        atn.decision_to_state
            .push(check_ref(r.read_usize()?, num_states)?);
    }

    let num_modes = r.read_usize()?;
    for _ in 0..num_modes {
        atn.mode_to_start
            .push(check_ref(r.read_usize()?, num_states)?);
    }

    Ok(atn)
}

fn check_ref(s: usize, num_states: usize) -> Result<usize, DeserializeError> {
    if s >= num_states {
        return Err(DeserializeError::BadStateRef(s as i32));
    }
    Ok(s)
}
