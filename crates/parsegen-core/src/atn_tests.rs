use crate::atn::{Atn, GrammarKind, StateKind, Transition};

fn two_rule_atn() -> Atn {
    let mut atn = Atn::new(GrammarKind::Parser, 3);
    for rule in 0..2 {
        let start = atn.add_state(StateKind::RuleStart, rule);
        let stop = atn.add_state(StateKind::RuleStop, rule);
        atn.rule_to_start.push(start);
        atn.rule_to_stop.push(stop);
    }
    atn
}

#[test]
fn state_numbers_match_slots() {
    let atn = two_rule_atn();
    for state in atn.iter_states() {
        assert_eq!(atn.state(state.number).number, state.number);
    }
}

#[test]
fn define_decision_registers_state() {
    let mut atn = two_rule_atn();
    let d0 = atn.add_state(StateKind::BlockStart, 0);
    let d1 = atn.add_state(StateKind::PlusLoopBack, 1);
    assert_eq!(atn.define_decision(d0), 0);
    assert_eq!(atn.define_decision(d1), 1);
    assert_eq!(atn.decision_state(0).number, d0);
    assert_eq!(atn.decision_state(1).number, d1);
    assert_eq!(atn.decision_state(1).decision, Some(1));
}

#[test]
fn compact_renumbers_and_rewrites_references() {
    let mut atn = two_rule_atn();
    let mid = atn.add_state(StateKind::Basic, 0); // 4
    let tail = atn.add_state(StateKind::Basic, 0); // 5
    atn.add_transition(atn.rule_to_start[0], Transition::Epsilon { target: mid });
    atn.add_transition(
        mid,
        Transition::Rule {
            target: atn.rule_to_start[1],
            rule: 1,
            follow: tail,
        },
    );
    atn.add_transition(tail, Transition::Epsilon { target: atn.rule_to_stop[0] });

    // Punch a hole before the states that matter.
    let dead = atn.add_state(StateKind::Basic, 0);
    atn.remove_state(dead);
    let dead2 = atn.add_state(StateKind::Basic, 1);
    atn.remove_state(dead2);
    assert_ne!(atn.num_states(), atn.num_slots());

    atn.compact();
    assert_eq!(atn.num_states(), atn.num_slots());
    assert_eq!(atn.num_states(), 6);

    // Every state's slot index equals its number again.
    for state in atn.iter_states() {
        assert_eq!(atn.state(state.number).number, state.number);
        for t in &state.transitions {
            assert!(t.target() < atn.num_states());
        }
    }

    // The rule transition's follow state still points at the tail state.
    let mid_state = atn.state(atn.state(atn.rule_to_start[0]).transitions[0].target());
    match &mid_state.transitions[0] {
        Transition::Rule { target, follow, .. } => {
            assert_eq!(*target, atn.rule_to_start[1]);
            let follow_state = atn.state(*follow);
            assert!(matches!(follow_state.transitions[0], Transition::Epsilon { target } if target == atn.rule_to_stop[0]));
        }
        other => panic!("expected rule transition, got {other:?}"),
    }
}

#[test]
fn epsilon_classification() {
    let t = Transition::Epsilon { target: 0 };
    assert!(t.is_epsilon());
    assert!(Transition::Action { target: 0, index: 0 }.is_epsilon());
    assert!(Transition::PrecedencePredicate { target: 0, precedence: 2 }.is_epsilon());
    assert!(!Transition::Atom { target: 0, label: 5 }.is_epsilon());
    assert!(!Transition::Rule { target: 0, rule: 0, follow: 1 }.is_epsilon());
    assert!(!Transition::Wildcard { target: 0 }.is_epsilon());
}
