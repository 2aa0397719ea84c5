//! Library for simulating abstract machines (finite automata, pushdown automata and
//! Turing-machine-like multi-store automata) and answering structural questions about them.
//!
//! Every machine is described uniformly. A [`Machine`] has a fixed number of _stores_, each of
//! which is a [`Store`]: a [`Word`] of [`Symbol`]s together with a head position. A tuple of
//! stores is a [`Configuration`], and a [`Transition`] rewrites a configuration by matching its
//! left-hand side as a pattern and splicing in its right-hand side. A finite automaton is then
//! just a machine with a state store and an input store, a pushdown automaton has an additional
//! stack store and a Turing machine has a tape in place of the input.
//!
//! The stores of a machine carry a [`StoreType`]. A `Stream` store is consumed from left to right
//! and must be exhausted for the machine to accept, a `Tape` store is rewritten in place while the
//! head moves, and a `Base` store has no constraints at all.
//!
//! Machines are classified structurally (see [`Machine::is_finite`], [`Machine::is_pushdown`],
//! [`Machine::is_deterministic`] and friends) and run on input words with one of two recognizers:
//! - [`run::run_bfs`] explores the configuration graph breadth first, with a budget on the number
//!   of steps along each path. It works for any machine.
//! - [`run::run_pda`] simulates nondeterministic pushdown automata in time cubic in the length of
//!   the input, by only keeping a bounded window of the stack visible and reconstructing elided
//!   stack symbols lazily.
//!
//! Both produce a [`RunGraph`] of the visited configurations. For finite automata, the
//! [`operations`] module offers subset construction, language equivalence, intersection and
//! prefix closure.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use machines::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        configuration::{AlignedTransition, Configuration, Transition},
        error::{Inapplicable, MachineError, ParseError},
        machine::{Machine, MachineBuilder, StoreType},
        math,
        operations::{determinize, equivalent, intersect, prefix},
        run::{
            run, run_bfs, run_pda, run_pda_with, BfsSettings, NodeIndex, PdaSettings, RunEdge,
            RunGraph, RunNode, RunSettings,
        },
        store::Store,
        symbol::{Symbol, Word, BLANK},
    };
}

/// Collection type aliases.
pub mod math;

/// Error types shared by the whole crate.
pub mod error;
pub use error::{Inapplicable, MachineError, ParseError};

/// Symbols and words, the atoms every store is made of.
pub mod symbol;
pub use symbol::{Symbol, Word};

/// Stores, i.e. words with a head position.
pub mod store;
pub use store::Store;

/// Configurations and transitions between them.
pub mod configuration;
pub use configuration::{Configuration, Transition};

/// The text syntax used for parsing and printing stores, configurations and transitions.
pub mod syntax;

/// The [`Machine`] type, its construction API and its classification predicates.
pub mod machine;
pub use machine::{Machine, StoreType};

/// Recognizers which run a machine on an input word.
pub mod run;
pub use run::RunGraph;

/// Operations on finite automata and their combinations.
pub mod operations;

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    /// Compiles a regular expression over single-character symbols into a nondeterministic
    /// finite automaton. `ε` or `&` stand for the empty word, whitespace is ignored.
    pub fn from_regexp(pattern: &str) -> Machine {
        struct Compiler {
            chars: Vec<char>,
            pos: usize,
            fresh: usize,
            machine: Machine,
        }

        impl Compiler {
            fn peek(&self) -> Option<char> {
                self.chars.get(self.pos).copied()
            }

            fn state(&mut self) -> Symbol {
                self.fresh += 1;
                Symbol::new(format!("r{}", self.fresh))
            }

            fn edge(&mut self, from: &Symbol, read: Option<char>, to: &Symbol) {
                let read = match read {
                    Some(c) => Store::new([Symbol::new(c.to_string())]),
                    None => Store::empty(),
                };
                self.machine
                    .add_transition(Transition::new(
                        Configuration::new([Store::new([from.clone()]), read]),
                        Configuration::new([Store::new([to.clone()])]),
                    ))
                    .unwrap();
            }

            fn union(&mut self) -> (Symbol, Vec<Symbol>) {
                let (mut initial, mut finals) = self.concat();
                if self.peek() == Some('|') {
                    let fresh = self.state();
                    self.edge(&fresh, None, &initial);
                    while self.peek() == Some('|') {
                        self.pos += 1;
                        let (other, other_finals) = self.concat();
                        self.edge(&fresh, None, &other);
                        finals.extend(other_finals);
                    }
                    initial = fresh;
                }
                (initial, finals)
            }

            fn concat(&mut self) -> (Symbol, Vec<Symbol>) {
                let (initial, mut finals) = self.star();
                while matches!(self.peek(), Some(c) if c != '|' && c != ')') {
                    let (next, next_finals) = self.star();
                    for q in &finals {
                        self.edge(q, None, &next);
                    }
                    finals = next_finals;
                }
                (initial, finals)
            }

            fn star(&mut self) -> (Symbol, Vec<Symbol>) {
                let (mut initial, mut finals) = self.base();
                while self.peek() == Some('*') {
                    self.pos += 1;
                    let fresh = self.state();
                    self.edge(&fresh, None, &initial);
                    for q in finals.clone() {
                        self.edge(&q, None, &initial);
                    }
                    finals.push(fresh.clone());
                    initial = fresh;
                }
                (initial, finals)
            }

            fn base(&mut self) -> (Symbol, Vec<Symbol>) {
                match self.peek() {
                    Some('(') => {
                        self.pos += 1;
                        let out = self.union();
                        assert_eq!(self.peek(), Some(')'), "unbalanced parentheses");
                        self.pos += 1;
                        out
                    }
                    Some('ε') | Some('&') => {
                        self.pos += 1;
                        let q = self.state();
                        (q.clone(), vec![q])
                    }
                    Some(c) => {
                        self.pos += 1;
                        let (q, r) = (self.state(), self.state());
                        self.edge(&q, Some(c), &r);
                        (q, vec![r])
                    }
                    None => panic!("expected symbol, found end of pattern"),
                }
            }
        }

        let mut compiler = Compiler {
            chars: pattern.chars().filter(|c| !c.is_whitespace()).collect(),
            pos: 0,
            fresh: 0,
            machine: Machine::finite_automaton(),
        };
        let (initial, finals) = compiler.union();
        assert_eq!(compiler.pos, compiler.chars.len(), "trailing input");
        let mut machine = compiler.machine;
        machine.set_start_state(initial).unwrap();
        machine.add_accept_states(finals).unwrap();
        machine
    }

    /// Splits a word like `"a b"` or `"ab"` into single-character symbols.
    pub fn word(input: &str) -> Word {
        input
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| Symbol::new(c.to_string()))
            .collect()
    }

    #[test]
    fn regexp_compiles_to_finite_automaton() {
        let m = from_regexp("(a|b)*c");
        assert!(m.is_finite());
        assert!(!m.is_deterministic());
        assert!(run(&m, &word("abac"), RunSettings::default())
            .unwrap()
            .accepts());
        assert!(!run(&m, &word("aba"), RunSettings::default())
            .unwrap()
            .accepts());
    }
}
