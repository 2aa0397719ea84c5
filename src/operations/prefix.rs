use crate::{
    error::MachineError,
    machine::{state_of, Machine},
};

/// Given a finite automaton `m`, constructs a finite automaton accepting all prefixes of words
/// accepted by `m`. The transitions stay the same, and every state from which an accept state
/// can be reached becomes an accept state.
pub fn prefix(m: &Machine) -> Result<Machine, MachineError> {
    if !m.is_finite() {
        return Err(MachineError::NotFinite);
    }

    let edges = m
        .transitions()
        .iter()
        .map(|t| Ok((state_of(&t.lhs()[0])?, state_of(&t.rhs()[0])?)))
        .collect::<Result<Vec<_>, MachineError>>()?;

    let mut accepting = m.accept_states()?;
    loop {
        let before = accepting.len();
        for (q, r) in &edges {
            if accepting.contains(r) {
                accepting.insert(q.clone());
            }
        }
        if accepting.len() == before {
            break;
        }
    }

    let mut mp = Machine::finite_automaton();
    mp.set_start_state(m.start_state()?)?;
    for t in m.transitions() {
        mp.add_raw_transition(t.clone())?;
    }
    mp.add_accept_states(accepting)?;
    Ok(mp)
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::tests::{from_regexp, word};

    #[test]
    fn prefixes_are_accepted() {
        let m = Machine::builder()
            .with_start("q1")
            .with_accepting(["q3"])
            .with_transitions(["q1, a -> q2", "q2, b -> q3", "q1, b -> q4"])
            .into_finite()
            .unwrap();
        let mp = prefix(&m).unwrap();
        assert_eq!(
            mp.accept_states().unwrap(),
            ["q1", "q2", "q3"].into_iter().map(Symbol::new).collect()
        );
        for (w, expected) in [("", true), ("a", true), ("ab", true), ("b", false), ("aa", false)] {
            let g = run(&mp, &word(w), RunSettings::default()).unwrap();
            assert_eq!(g.accepts(), expected, "{w}");
        }
    }

    #[test]
    fn prefixes_of_regular_expressions() {
        let m = from_regexp("ab*c");
        let mp = determinize(&prefix(&m).unwrap()).unwrap();
        assert!(equivalent(&mp, &determinize(&from_regexp("ε|ab*|ab*c")).unwrap()).unwrap());
        assert_eq!(prefix(&Machine::pushdown_automaton()), Err(MachineError::NotFinite));
    }
}
