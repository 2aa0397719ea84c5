use std::fmt::Display;

use itertools::Itertools;
use tracing::trace;

use crate::{
    configuration::{cell, AlignedTransition, Configuration, Transition},
    error::MachineError,
    math::{OrderedSet, Set},
    store::Store,
    symbol::{Symbol, Word},
};

mod builder;
pub use builder::MachineBuilder;

mod classify;

/// The role a store plays in a [`Machine`]. It determines how transitions for the store are
/// written and what accepting means for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreType {
    /// No constraints. Transitions give a left- and a right-hand side for the store.
    Base,
    /// Consumed from left to right. Transitions only give a left-hand side (the right-hand side
    /// is implicitly ε), and accepting requires the store to be exhausted.
    Stream,
    /// Read and written in place. Transitions give a left-hand side, a write and a move, which
    /// is one of `L`, `S` and `R`.
    Tape,
}

/// A machine (automaton) that accepts or rejects words. It has one or more stores, which act as
/// states, input streams, stacks, tapes and so on. When it is run on a word, the stores are
/// initialized to the start configuration (with the input store holding the word) and rewritten
/// by transitions until an accept configuration is matched or no more rewrites are possible.
///
/// Machines are built once, through the methods of this type or a [`MachineBuilder`], and only
/// read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    store_types: Vec<StoreType>,
    state: Option<usize>,
    input: Option<usize>,
    transitions: Vec<Transition>,
    known: Set<Transition>,
    start: Option<Configuration>,
    accepting: OrderedSet<Configuration>,
}

impl Machine {
    /// Creates a machine without transitions. `state` is the index of the store that holds the
    /// state, `input` the index of the store that is initialized to the input word.
    pub fn new<I: IntoIterator<Item = StoreType>>(
        store_types: I,
        state: Option<usize>,
        input: Option<usize>,
    ) -> Result<Self, MachineError> {
        let store_types: Vec<_> = store_types.into_iter().collect();
        for index in [state, input].into_iter().flatten() {
            if index >= store_types.len() {
                return Err(MachineError::StoreOutOfRange {
                    index,
                    stores: store_types.len(),
                });
            }
        }
        Ok(Self {
            store_types,
            state,
            input,
            transitions: vec![],
            known: Set::default(),
            start: None,
            accepting: OrderedSet::new(),
        })
    }

    fn with_shape(store_types: Vec<StoreType>) -> Self {
        Self {
            store_types,
            state: Some(0),
            input: Some(1),
            transitions: vec![],
            known: Set::default(),
            start: None,
            accepting: OrderedSet::new(),
        }
    }

    /// A (deterministic or nondeterministic) finite automaton: a state and an input stream.
    pub fn finite_automaton() -> Self {
        Self::with_shape(vec![StoreType::Base, StoreType::Stream])
    }

    /// A (deterministic or nondeterministic) pushdown automaton: a state, an input stream and a
    /// stack.
    pub fn pushdown_automaton() -> Self {
        Self::with_shape(vec![StoreType::Base, StoreType::Stream, StoreType::Base])
    }

    /// A (deterministic or nondeterministic) Turing machine: a state and a tape holding the input.
    pub fn turing_machine() -> Self {
        Self::with_shape(vec![StoreType::Base, StoreType::Tape])
    }

    /// Instantiates a new [`MachineBuilder`].
    pub fn builder() -> MachineBuilder {
        MachineBuilder::default()
    }

    /// How many stores the machine has.
    pub fn num_stores(&self) -> usize {
        self.store_types.len()
    }

    /// The types of the stores, one per store.
    pub fn store_types(&self) -> &[StoreType] {
        &self.store_types
    }

    /// Index of the store holding the state, if there is one.
    pub fn state_store(&self) -> Option<usize> {
        self.state
    }

    /// Index of the store holding the input, if there is one.
    pub fn input_store(&self) -> Option<usize> {
        self.input
    }

    pub(crate) fn state_index(&self) -> Result<usize, MachineError> {
        self.state.ok_or(MachineError::NoStateStore)
    }

    pub(crate) fn input_index(&self) -> Result<usize, MachineError> {
        self.input.ok_or(MachineError::NoInputStore)
    }

    /// The transitions, normalized so that both sides have one store per store of the machine.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// The start configuration, if one was set.
    pub fn start_config(&self) -> Option<&Configuration> {
        self.start.as_ref()
    }

    /// The accept configurations. These are patterns: a configuration is accepting if one of
    /// them matches it.
    pub fn accept_configs(&self) -> &OrderedSet<Configuration> {
        &self.accepting
    }

    fn check_arity(&self, config: &Configuration) -> Result<(), MachineError> {
        if config.arity() != self.num_stores() {
            return Err(MachineError::ArityMismatch {
                expected: self.num_stores(),
                found: config.arity(),
            });
        }
        Ok(())
    }

    /// Sets the start configuration to have `q` as its state and all other stores empty. When
    /// the machine runs, the input store is initialized to the input word.
    pub fn set_start_state(&mut self, q: impl Into<Symbol>) -> Result<(), MachineError> {
        let state = self.state_index()?;
        let config = Configuration::empty(self.num_stores()).with_store(state, cell(q.into()));
        self.start = Some(config);
        Ok(())
    }

    /// Sets the start configuration.
    pub fn set_start_config(&mut self, config: Configuration) -> Result<(), MachineError> {
        self.check_arity(&config)?;
        self.start = Some(config);
        Ok(())
    }

    /// Returns the start state.
    pub fn start_state(&self) -> Result<Symbol, MachineError> {
        let state = self.state_index()?;
        let config = self.start.as_ref().ok_or(MachineError::NoStartState)?;
        state_of(&config[state])
    }

    /// Adds an accept configuration with `q` as the state. A stream input store must be
    /// exhausted (the head on a blank) for the machine to accept, all other stores are
    /// unconstrained.
    pub fn add_accept_state(&mut self, q: impl Into<Symbol>) -> Result<(), MachineError> {
        let state = self.state_index()?;
        let mut config = Configuration::empty(self.num_stores()).with_store(state, cell(q.into()));
        if let Some(input) = self.input {
            if self.store_types[input] == StoreType::Stream {
                config = config.with_store(input, cell(Symbol::blank()));
            }
        }
        self.accepting.insert(config);
        Ok(())
    }

    /// Adds a list of accept states (see [`Machine::add_accept_state`]).
    pub fn add_accept_states<I, S>(&mut self, states: I) -> Result<(), MachineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        states
            .into_iter()
            .try_for_each(|q| self.add_accept_state(q))
    }

    /// Adds an accept configuration.
    pub fn add_accept_config(&mut self, config: Configuration) -> Result<(), MachineError> {
        self.check_arity(&config)?;
        self.accepting.insert(config);
        Ok(())
    }

    /// Returns the set of accept states.
    pub fn accept_states(&self) -> Result<OrderedSet<Symbol>, MachineError> {
        let state = self.state_index()?;
        self.accepting
            .iter()
            .map(|config| state_of(&config[state]))
            .collect()
    }

    /// The set of all states, i.e. the start state, the accept states and every state occurring
    /// on a transition.
    pub fn states(&self) -> Result<OrderedSet<Symbol>, MachineError> {
        let state = self.state_index()?;
        let mut states = self.accept_states()?;
        if self.start.is_some() {
            states.insert(self.start_state()?);
        }
        for t in &self.transitions {
            states.insert(state_of(&t.lhs()[state])?);
            states.insert(state_of(&t.rhs()[state])?);
        }
        Ok(states)
    }

    /// The symbols read from the input store by some transition, without the blank.
    pub fn alphabet(&self) -> OrderedSet<Symbol> {
        let Some(input) = self.input else {
            return OrderedSet::new();
        };
        self.transitions
            .iter()
            .flat_map(|t| t.lhs()[input].values().iter())
            .filter(|x| !x.is_blank())
            .cloned()
            .collect()
    }

    /// Adds a transition as it is written: the argument is either a [`Transition`] or its text
    /// form like `"q1, a -> q2"`.
    ///
    /// - A `Stream` store only has a left-hand side; the right-hand side is implicitly ε.
    /// - A `Tape` store has a write and a move (`L`, `S` or `R`) on the right-hand side.
    ///
    /// Adding a transition that is already present has no effect.
    pub fn add_transition<T>(&mut self, transition: T) -> Result<(), MachineError>
    where
        T: TryInto<Transition>,
        MachineError: From<T::Error>,
    {
        let transition = self.normalize(transition.try_into()?)?;
        self.add_raw_transition(transition)
    }

    /// Adds a list of transitions (see [`Machine::add_transition`]).
    pub fn add_transitions<I, T>(&mut self, transitions: I) -> Result<(), MachineError>
    where
        I: IntoIterator<Item = T>,
        T: TryInto<Transition>,
        MachineError: From<T::Error>,
    {
        transitions
            .into_iter()
            .try_for_each(|t| self.add_transition(t))
    }

    /// Adds a transition that already has one store per store of the machine on both sides.
    /// The right-hand side of a `Stream` store must be ε, and a `Tape` store must move its head
    /// to `-1`, `0` or the end of the written word.
    pub fn add_raw_transition(&mut self, transition: Transition) -> Result<(), MachineError> {
        self.check_arity(transition.lhs())?;
        self.check_arity(transition.rhs())?;
        for (s, store_type) in self.store_types.iter().enumerate() {
            let rhs = &transition.rhs()[s];
            match store_type {
                StoreType::Base => {}
                StoreType::Stream if rhs.is_empty() => {}
                StoreType::Stream => return Err(MachineError::StreamRewrite(s)),
                StoreType::Tape => {
                    if ![-1, 0, rhs.len() as isize].contains(&rhs.position()) {
                        return Err(MachineError::InvalidMove(rhs.to_string()));
                    }
                }
            }
        }
        if self.known.insert(transition.clone()) {
            self.transitions.push(transition);
        } else {
            trace!("ignoring duplicate transition {transition}");
        }
        Ok(())
    }

    fn normalize(&self, written: Transition) -> Result<Transition, MachineError> {
        let mut left = written.lhs().iter();
        let mut right = written.rhs().iter();
        let mut lhs = Vec::with_capacity(self.num_stores());
        let mut rhs = Vec::with_capacity(self.num_stores());

        for store_type in &self.store_types {
            lhs.push(left.next().ok_or(MachineError::TooFewLeft)?.clone());
            match store_type {
                StoreType::Base => {
                    rhs.push(right.next().ok_or(MachineError::TooFewRight)?.clone());
                }
                StoreType::Stream => rhs.push(Store::empty()),
                StoreType::Tape => {
                    let write = right.next().ok_or(MachineError::TooFewRight)?;
                    let direction = right.next().ok_or(MachineError::TooFewRight)?;
                    let position = match direction.single().map(Symbol::as_str) {
                        Some("L") => -1,
                        Some("S") => 0,
                        Some("R") => write.len() as isize,
                        _ => return Err(MachineError::InvalidMove(direction.to_string())),
                    };
                    rhs.push(Store::from_parts(write.values().clone(), position));
                }
            }
        }

        if left.next().is_some() {
            return Err(MachineError::TooManyLeft);
        }
        if right.next().is_some() {
            return Err(MachineError::TooManyRight);
        }
        Ok(Transition::new(Configuration::new(lhs), Configuration::new(rhs)))
    }

    /// Returns the transitions in the form they are written, as [`AlignedTransition`]s with one
    /// piece per store. `Stream` pieces have no right-hand side and `Tape` pieces carry a move.
    pub fn written_transitions(&self) -> Vec<AlignedTransition> {
        self.transitions
            .iter()
            .map(|t| {
                AlignedTransition::new(self.store_types.iter().enumerate().map(
                    |(s, store_type)| {
                        let lhs = Configuration::new([t.lhs()[s].clone()]);
                        let rhs = &t.rhs()[s];
                        match store_type {
                            StoreType::Base => {
                                Transition::new(lhs, Configuration::new([rhs.clone()]))
                            }
                            StoreType::Stream => Transition::new(lhs, Configuration::default()),
                            StoreType::Tape => {
                                let direction = match rhs.position() {
                                    -1 => "L",
                                    0 => "S",
                                    _ => "R",
                                };
                                Transition::new(
                                    lhs,
                                    Configuration::new([
                                        Store::new(rhs.values().clone()),
                                        cell(Symbol::new(direction)),
                                    ]),
                                )
                            }
                        }
                    },
                ))
            })
            .collect()
    }

    /// The configuration a run on `input` starts in: the start configuration with the input
    /// store holding `input`.
    pub fn initial_config(&self, input: &Word) -> Result<Configuration, MachineError> {
        let index = self.input_index()?;
        let start = self.start.as_ref().ok_or(MachineError::NoStartState)?;
        Ok(start.with_store(index, Store::new(input.clone())))
    }

    /// Returns true if some accept configuration matches `config`.
    pub fn is_accepting(&self, config: &Configuration) -> bool {
        self.accepting.iter().any(|pattern| pattern.matches(config))
    }

    /// Creates a machine from written transitions, guessing what kind of machine is intended.
    ///
    /// - Store 0 is the state and store 1 is the input.
    /// - A store is a `Tape` if the right-hand side field following its write only ever holds
    ///   `L`, `S` or `R`.
    /// - The input is a `Stream` if the right-hand sides are one field shorter than the
    ///   left-hand sides.
    pub fn from_transitions<I, S, A>(
        transitions: I,
        start_state: S,
        accept_states: A,
    ) -> Result<Machine, MachineError>
    where
        I: IntoIterator<Item = Transition>,
        S: Into<Symbol>,
        A: IntoIterator,
        A::Item: Into<Symbol>,
    {
        let transitions = transitions.into_iter().collect_vec();
        let lhs_sizes: Set<usize> = transitions.iter().map(|t| t.lhs().arity()).collect();
        let rhs_sizes: Set<usize> = transitions.iter().map(|t| t.rhs().arity()).collect();
        let (Ok(lhs_size), Ok(mut rhs_size)) = (
            lhs_sizes.into_iter().exactly_one(),
            rhs_sizes.into_iter().exactly_one(),
        ) else {
            return Err(MachineError::MalformedTransitions(
                "all left-hand sides and all right-hand sides must have the same size",
            ));
        };

        let mut rhs_vocab: Vec<OrderedSet<&Symbol>> = vec![OrderedSet::new(); rhs_size];
        for t in &transitions {
            for (s, store) in t.rhs().iter().enumerate() {
                rhs_vocab[s].extend(store.values().iter());
            }
        }

        let moves = ["L", "S", "R"];
        let mut store_types = Vec::with_capacity(lhs_size);
        for s in 0..lhs_size {
            let is_move_field = s + 1 < rhs_size
                && !rhs_vocab[s + 1].is_empty()
                && rhs_vocab[s + 1].iter().all(|x| moves.contains(&x.as_str()));
            if is_move_field {
                store_types.push(StoreType::Tape);
                rhs_size -= 1;
                rhs_vocab.remove(s + 1);
            } else {
                store_types.push(StoreType::Base);
            }
        }

        if lhs_size == rhs_size + 1 && lhs_size >= 2 {
            store_types[1] = StoreType::Stream;
        } else if lhs_size != rhs_size {
            return Err(MachineError::MalformedTransitions(
                "right-hand sides must either be same size or one smaller than left-hand sides",
            ));
        }

        let mut machine = Machine::new(store_types, Some(0), Some(1))?;
        machine.set_start_state(start_state)?;
        machine.add_accept_states(accept_states)?;
        machine.add_transitions(transitions)?;
        Ok(machine)
    }
}

/// Reads the state held by a state store, which has to be exactly one symbol.
pub(crate) fn state_of(store: &Store) -> Result<Symbol, MachineError> {
    store
        .single()
        .cloned()
        .ok_or_else(|| MachineError::NotACell(store.to_string()))
}

impl Display for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.written_transitions().iter().join("\n"))
    }
}
