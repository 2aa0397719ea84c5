use crate::{
    configuration::{cell, Configuration, Transition},
    error::MachineError,
    machine::{state_of, Machine, StoreType},
    store::Store,
    symbol::Symbol,
};

/// Checks that `m` has a start configuration, a state in store 0 and an input stream in
/// store 1, and that no transition reads more than one symbol.
fn check_product_shape(m: &Machine) -> Result<(), MachineError> {
    if m.start_config().is_none() {
        return Err(MachineError::NoStartState);
    }
    let shaped = m.store_types().starts_with(&[StoreType::Base, StoreType::Stream])
        && m.state_store() == Some(0)
        && m.input_store() == Some(1)
        && m.has_cell(0)
        && m.has_input_stream(1);
    if !shaped {
        return Err(MachineError::UnsupportedShape(
            "machine must have a state in store 0 and an input stream in store 1".into(),
        ));
    }
    match m.transitions().iter().find(|t| t.lhs()[1].len() > 1) {
        Some(t) => Err(MachineError::MultipleSymbols(t.to_string())),
        None => Ok(()),
    }
}

/// The stores following the state and the input.
fn extra(config: &Configuration) -> Configuration {
    config.slice(2..config.arity())
}

fn paired(q1: &Store, q2: &Store) -> Result<Store, MachineError> {
    Ok(cell(Symbol::pair(&state_of(q1)?, &state_of(q2)?)))
}

/// Builds `(state, input) ++ extra1 ++ extra2`.
fn assemble(
    state: Store,
    input: Store,
    extra1: &Configuration,
    extra2: &Configuration,
) -> Configuration {
    &(&Configuration::new([state, input]) + extra1) + extra2
}

/// Intersects two machines with the product construction. Both machines need a state in
/// store 0 and an input stream in store 1, and their transitions may read at most one symbol;
/// their remaining stores are carried over, those of `m1` first. For example, two finite
/// automata give a finite automaton, and a finite automaton and a pushdown automaton give a
/// pushdown automaton.
///
/// The states of the result are pairs `(q1,q2)`. Transitions reading a symbol move both
/// machines at once, while an ε-transition of one machine moves it alone and leaves the stores
/// of the other machine untouched.
pub fn intersect(m1: &Machine, m2: &Machine) -> Result<Machine, MachineError> {
    check_product_shape(m1)?;
    check_product_shape(m2)?;

    let store_types = [StoreType::Base, StoreType::Stream]
        .into_iter()
        .chain(m1.store_types()[2..].iter().copied())
        .chain(m2.store_types()[2..].iter().copied());
    let mut m = Machine::new(store_types, Some(0), Some(1))?;
    let idle1 = Configuration::empty(m1.num_stores() - 2);
    let idle2 = Configuration::empty(m2.num_stores() - 2);

    let start1 = m1.start_config().ok_or(MachineError::NoStartState)?;
    let start2 = m2.start_config().ok_or(MachineError::NoStartState)?;
    m.set_start_config(assemble(
        paired(&start1[0], &start2[0])?,
        Store::empty(),
        &extra(start1),
        &extra(start2),
    ))?;

    for c1 in m1.accept_configs() {
        for c2 in m2.accept_configs() {
            m.add_accept_config(assemble(
                paired(&c1[0], &c2[0])?,
                cell(Symbol::blank()),
                &extra(c1),
                &extra(c2),
            ))?;
        }
    }

    for t1 in m1.transitions() {
        for t2 in m2.transitions() {
            let read = &t1.lhs()[1];
            if read.is_empty() || read != &t2.lhs()[1] {
                continue;
            }
            m.add_raw_transition(Transition::new(
                assemble(
                    paired(&t1.lhs()[0], &t2.lhs()[0])?,
                    read.clone(),
                    &extra(t1.lhs()),
                    &extra(t2.lhs()),
                ),
                assemble(
                    paired(&t1.rhs()[0], &t2.rhs()[0])?,
                    Store::empty(),
                    &extra(t1.rhs()),
                    &extra(t2.rhs()),
                ),
            ))?;
        }
    }

    let (states1, states2) = (m1.states()?, m2.states()?);
    for t1 in m1.transitions().iter().filter(|t| t.lhs()[1].is_empty()) {
        for q2 in &states2 {
            let q2 = cell(q2.clone());
            m.add_raw_transition(Transition::new(
                assemble(paired(&t1.lhs()[0], &q2)?, Store::empty(), &extra(t1.lhs()), &idle2),
                assemble(paired(&t1.rhs()[0], &q2)?, Store::empty(), &extra(t1.rhs()), &idle2),
            ))?;
        }
    }
    for t2 in m2.transitions().iter().filter(|t| t.lhs()[1].is_empty()) {
        for q1 in &states1 {
            let q1 = cell(q1.clone());
            m.add_raw_transition(Transition::new(
                assemble(paired(&q1, &t2.lhs()[0])?, Store::empty(), &idle1, &extra(t2.lhs())),
                assemble(paired(&q1, &t2.rhs()[0])?, Store::empty(), &idle1, &extra(t2.rhs())),
            ))?;
        }
    }

    Ok(m)
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::tests::word;

    fn even() -> Machine {
        Machine::builder()
            .with_start("q1")
            .with_accepting(["q1"])
            .with_transitions(["q1, a -> q2", "q2, a -> q1"])
            .into_finite()
            .unwrap()
    }

    /// Counts `a`s modulo 3 on the stack, with an ε-loop that keeps pushing junk.
    fn multiple_of_three() -> Machine {
        Machine::builder()
            .with_start("p0")
            .with_accepting(["p0"])
            .with_transitions([
                "p0, a, & -> p1, x",
                "p1, a, & -> p2, x",
                "p2, a, x -> p0, &",
                "p0, &, & -> p0, y",
            ])
            .into_pushdown()
            .unwrap()
    }

    #[test_log::test]
    fn finite_automaton_and_pushdown_automaton() {
        let m = intersect(&even(), &multiple_of_three()).unwrap();
        assert_eq!(
            m.store_types(),
            [StoreType::Base, StoreType::Stream, StoreType::Base]
        );
        assert!(m.is_pushdown());
        assert_eq!(m.start_state().unwrap(), Symbol::new("(q1,p0)"));

        for (n, expected) in [(0, true), (1, false), (2, false), (3, false), (6, true)] {
            let w: Word = std::iter::repeat("a").take(n).collect();
            assert_eq!(run_pda(&m, &w).unwrap().accepts(), expected, "a^{n}");
        }
    }

    #[test]
    fn finite_automata() {
        let ends_in_b = Machine::builder()
            .with_start("s")
            .with_accepting(["t"])
            .with_transitions(["s, a -> s", "s, b -> s", "s, b -> t"])
            .into_finite()
            .unwrap();
        let starts_with_a = Machine::builder()
            .with_start("u")
            .with_accepting(["v"])
            .with_transitions(["u, a -> v", "v, a -> v", "v, b -> v"])
            .into_finite()
            .unwrap();
        let m = intersect(&ends_in_b, &starts_with_a).unwrap();
        assert!(m.is_finite());
        for (w, expected) in [("ab", true), ("aab", true), ("b", false), ("aba", false), ("", false)] {
            let g = run(&m, &word(w), RunSettings::default()).unwrap();
            assert_eq!(g.accepts(), expected, "{w}");
        }
    }

    #[test]
    fn epsilon_transitions_interleave() {
        let delayed = Machine::builder()
            .with_start("s")
            .with_accepting(["t"])
            .with_transitions(["s, & -> t", "t, a -> t"])
            .into_finite()
            .unwrap();
        let m = intersect(&even(), &delayed).unwrap();
        let moves_alone = |from: &str, to: &str| {
            Transition::new(
                Configuration::new([Store::new([Symbol::new(from)]), Store::empty()]),
                Configuration::new([Store::new([Symbol::new(to)]), Store::empty()]),
            )
        };
        assert!(m.transitions().contains(&moves_alone("(q1,s)", "(q1,t)")));
        assert!(m.transitions().contains(&moves_alone("(q2,s)", "(q2,t)")));
        assert!(run(&m, &word("aa"), RunSettings::default())
            .unwrap()
            .accepts());
        assert!(!run(&m, &word("a"), RunSettings::default())
            .unwrap()
            .accepts());
    }

    #[test]
    fn unsupported_shapes() {
        let tm = Machine::builder()
            .with_start("q")
            .with_transitions(["q, a -> q, b, R"])
            .into_turing()
            .unwrap();
        assert!(matches!(
            intersect(&even(), &tm),
            Err(MachineError::UnsupportedShape(_))
        ));

        let mut long = even();
        long.add_transition("q1, a a -> q1").unwrap();
        assert!(matches!(
            intersect(&long, &even()),
            Err(MachineError::MultipleSymbols(_))
        ));

        let mut unstarted = Machine::finite_automaton();
        unstarted.add_transition("q1, a -> q2").unwrap();
        assert_eq!(intersect(&even(), &unstarted), Err(MachineError::NoStartState));
        assert_eq!(intersect(&unstarted, &even()), Err(MachineError::NoStartState));
    }
}
