//! Structural predicates which recognize the classic kinds of machines among general
//! multi-store machines.
use tracing::debug;

use super::{Machine, StoreType};
use crate::{configuration::Configuration, store::Store};

impl Machine {
    /// Tests whether store `s` is a stack, i.e. its head never moves from position 0. This
    /// requires a start configuration.
    pub fn has_stack(&self, s: usize) -> bool {
        let Some(start) = &self.start else {
            return false;
        };
        start[s].position() == 0
            && self
                .transitions
                .iter()
                .all(|t| t.lhs()[s].position() == 0 && t.rhs()[s].position() == 0)
            && self.accepting.iter().all(|c| c[s].position() == 0)
    }

    /// Tests whether store `s` always holds exactly one symbol, and therefore can only take on
    /// finitely many values.
    pub fn has_cell(&self, s: usize) -> bool {
        self.has_stack(s)
            && self
                .transitions
                .iter()
                .all(|t| t.lhs()[s].len() == 1 && t.rhs()[s].len() == 1)
    }

    /// Tests whether store `s` is an input stream: a stack that is only ever read from, and
    /// which has to be exhausted to accept.
    pub fn has_input_stream(&self, s: usize) -> bool {
        self.has_stack(s)
            && self.transitions.iter().all(|t| t.rhs()[s].is_empty())
            && self
                .accepting
                .iter()
                .all(|c| c[s].values().iter().all(|x| x.is_blank()))
    }

    /// Tests whether store `s` is a tape, i.e. no transition inserts or deletes symbols.
    pub fn has_tape(&self, s: usize) -> bool {
        self.transitions
            .iter()
            .all(|t| t.lhs()[s].len() == t.rhs()[s].len())
    }

    /// Tests whether store `s` is never written to.
    pub fn has_readonly(&self, s: usize) -> bool {
        self.transitions
            .iter()
            .all(|t| t.lhs()[s].values() == t.rhs()[s].values())
    }

    fn has_shape(&self, store_types: &[StoreType]) -> bool {
        self.store_types == store_types
            && self.state == Some(0)
            && self.input == Some(1)
            && self.has_cell(0)
    }

    /// Tests whether `self` is a finite automaton.
    pub fn is_finite(&self) -> bool {
        self.has_shape(&[StoreType::Base, StoreType::Stream]) && self.has_input_stream(1)
    }

    /// Tests whether `self` is a pushdown automaton.
    pub fn is_pushdown(&self) -> bool {
        self.has_shape(&[StoreType::Base, StoreType::Stream, StoreType::Base])
            && self.has_input_stream(1)
            && self.has_stack(2)
    }

    /// Tests whether `self` is a Turing machine.
    pub fn is_turing(&self) -> bool {
        self.has_shape(&[StoreType::Base, StoreType::Tape]) && self.has_tape(1)
    }

    /// Tests whether `self` is deterministic, i.e. no two patterns (left-hand sides of
    /// transitions and accept configurations) can match the same configuration.
    pub fn is_deterministic(&self) -> bool {
        match self.conflicting_patterns() {
            Some((p1, p2)) => {
                debug!("conflicting patterns {p1:?} and {p2:?}");
                false
            }
            None => true,
        }
    }

    /// Returns the first pair of patterns that overlap, if there is one. Two patterns overlap if
    /// in every store, their symbols agree wherever they are both defined once the patterns are
    /// aligned by their heads.
    pub fn conflicting_patterns(&self) -> Option<(&Configuration, &Configuration)> {
        let patterns: Vec<&Configuration> = self
            .transitions
            .iter()
            .map(|t| t.lhs())
            .chain(self.accepting.iter())
            .collect();
        for (i, p1) in patterns.iter().enumerate() {
            for p2 in &patterns[..i] {
                if p1.iter().zip(p2.iter()).all(|(s1, s2)| overlap(s1, s2)) {
                    return Some((p1, p2));
                }
            }
        }
        None
    }
}

fn overlap(s1: &Store, s2: &Store) -> bool {
    // offsets relative to the heads
    let start = (-s1.position()).max(-s2.position());
    let end = (s1.len() as isize - s1.position()).min(s2.len() as isize - s2.position());
    (start..end).all(|i| {
        s1.values()[(i + s1.position()) as usize] == s2.values()[(i + s2.position()) as usize]
    })
}
