use std::collections::VecDeque;

use bit_set::BitSet;
use tracing::trace;

use crate::{
    configuration::{cell, Configuration, Transition},
    error::MachineError,
    machine::{state_of, Machine},
    math::{Bijection, Map, OrderedSet, Set},
    store::Store,
    symbol::Symbol,
};

/// Successors of each state, by the symbol read (`None` for ε).
type Table = Map<(usize, Option<Symbol>), BitSet>;

fn eclosure(table: &Table, mut states: BitSet) -> BitSet {
    let mut queue: Vec<usize> = states.iter().collect();
    while let Some(q) = queue.pop() {
        for r in table.get(&(q, None)).into_iter().flatten() {
            if states.insert(r) {
                queue.push(r);
            }
        }
    }
    states
}

/// Determinizes a finite automaton with the subset construction. The states of the result are
/// named by the sets of states they stand for, like `{q1,q2}`; the result is complete, so it has
/// a state `{}` if some symbol leads nowhere.
///
/// Fails with [`MachineError::NotFinite`] if `m` is not a finite automaton and with
/// [`MachineError::MultipleSymbols`] if a transition reads more than one symbol.
pub fn determinize(m: &Machine) -> Result<Machine, MachineError> {
    if !m.is_finite() {
        return Err(MachineError::NotFinite);
    }

    let states: Bijection<Symbol, usize> = m
        .states()?
        .into_iter()
        .enumerate()
        .map(|(i, q)| (q, i))
        .collect();
    let index = |store: &Store| -> Result<usize, MachineError> {
        let q = state_of(store)?;
        states
            .get_by_left(&q)
            .copied()
            .ok_or_else(|| MachineError::NotACell(q.to_string()))
    };

    let mut table = Table::default();
    let mut alphabet = OrderedSet::new();
    for t in m.transitions() {
        let read = match t.lhs()[1].values().symbols() {
            [] => None,
            [a] => Some(a.clone()),
            _ => return Err(MachineError::MultipleSymbols(t.to_string())),
        };
        alphabet.extend(read.clone());
        table
            .entry((index(&t.lhs()[0])?, read))
            .or_default()
            .insert(index(&t.rhs()[0])?);
    }

    let mut accepting = BitSet::new();
    for q in m.accept_states()? {
        if let Some(&i) = states.get_by_left(&q) {
            accepting.insert(i);
        }
    }

    let name = |subset: &BitSet| Symbol::set(subset.iter().filter_map(|i| states.get_by_right(&i)));

    let mut dm = Machine::finite_automaton();
    let mut start = BitSet::new();
    start.insert(index(&cell(m.start_state()?))?);
    let start = eclosure(&table, start);
    dm.set_start_state(name(&start))?;

    let mut visited: Set<BitSet> = Set::default();
    let mut queue = VecDeque::from([start]);
    while let Some(subset) = queue.pop_front() {
        if !visited.insert(subset.clone()) {
            continue;
        }
        let source = name(&subset);
        trace!("expanding {source}");

        for a in &alphabet {
            let mut successors = BitSet::new();
            for q in &subset {
                if let Some(rs) = table.get(&(q, Some(a.clone()))) {
                    successors.union_with(rs);
                }
            }
            let successors = eclosure(&table, successors);
            dm.add_transition(Transition::new(
                Configuration::new([cell(source.clone()), cell(a.clone())]),
                Configuration::new([cell(name(&successors))]),
            ))?;
            queue.push_back(successors);
        }

        if !subset.is_disjoint(&accepting) {
            dm.add_accept_state(source)?;
        }
    }

    Ok(dm)
}
