use petgraph::unionfind::UnionFind;
use tracing::debug;

use crate::{
    error::MachineError,
    machine::{state_of, Machine},
    math::{Map, OrderedSet},
    symbol::Symbol,
};

/// A deterministic finite automaton with states numbered `0..sink`. Missing transitions lead to
/// the non-accepting state `sink`, which loops on every symbol.
struct Indexed {
    start: usize,
    sink: usize,
    accepting: Vec<bool>,
    successors: Vec<Map<Symbol, usize>>,
}

impl Indexed {
    fn new(m: &Machine) -> Result<Self, MachineError> {
        if !m.is_finite() {
            return Err(MachineError::NotFinite);
        }
        if !m.is_deterministic() {
            return Err(MachineError::NotDeterministic);
        }

        let mut ids: Map<Symbol, usize> = Map::default();
        let mut id = |q: Symbol| {
            let next = ids.len();
            *ids.entry(q).or_insert(next)
        };

        let start = id(m.start_state()?);
        let mut edges = vec![];
        for t in m.transitions() {
            let a = match t.lhs()[1].values().symbols() {
                [a] => a.clone(),
                [] => return Err(MachineError::EpsilonTransition(t.to_string())),
                _ => return Err(MachineError::MultipleSymbols(t.to_string())),
            };
            edges.push((id(state_of(&t.lhs()[0])?), a, id(state_of(&t.rhs()[0])?)));
        }
        let accept_states: Vec<usize> = m.accept_states()?.into_iter().map(&mut id).collect();

        let sink = ids.len();
        let mut successors = vec![Map::default(); sink];
        for (q, a, r) in edges {
            successors[q].insert(a, r);
        }
        let mut accepting = vec![false; sink + 1];
        for q in accept_states {
            accepting[q] = true;
        }

        Ok(Self {
            start,
            sink,
            accepting,
            successors,
        })
    }

    fn len(&self) -> usize {
        self.sink + 1
    }

    fn step(&self, q: usize, a: &Symbol) -> usize {
        self.successors
            .get(q)
            .and_then(|out| out.get(a))
            .copied()
            .unwrap_or(self.sink)
    }

    fn alphabet(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.successors.iter().flat_map(|out| out.keys())
    }
}

/// Tests whether two deterministic finite automata accept the same language, using the
/// algorithm of Hopcroft and Karp. Both machines may be partial: a missing transition rejects.
///
/// Fails with [`MachineError::NotFinite`] or [`MachineError::NotDeterministic`] if one of the
/// machines is not a deterministic finite automaton, and if a transition does not read exactly
/// one symbol.
pub fn equivalent(m1: &Machine, m2: &Machine) -> Result<bool, MachineError> {
    let (d1, d2) = (Indexed::new(m1)?, Indexed::new(m2)?);
    let offset = d1.len();
    let alphabet: OrderedSet<&Symbol> = d1.alphabet().chain(d2.alphabet()).collect();

    // states of m2 are numbered after those of m1
    let accepting = |x: usize| {
        if x < offset {
            d1.accepting[x]
        } else {
            d2.accepting[x - offset]
        }
    };
    let step = |x: usize, a: &Symbol| {
        if x < offset {
            d1.step(x, a)
        } else {
            offset + d2.step(x - offset, a)
        }
    };

    let mut classes = UnionFind::<usize>::new(offset + d2.len());
    let (s1, s2) = (d1.start, offset + d2.start);
    classes.union(s1, s2);
    let mut pending = vec![(s1, s2)];

    while let Some((x, y)) = pending.pop() {
        if accepting(x) != accepting(y) {
            debug!("states {x} and {y} are merged but only one of them accepts");
            return Ok(false);
        }
        for &a in &alphabet {
            let (x, y) = (step(x, a), step(y, a));
            if classes.union(x, y) {
                pending.push((x, y));
            }
        }
    }
    Ok(true)
}
