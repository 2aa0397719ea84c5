use crate::{configuration::Transition, error::MachineError, symbol::Symbol};

use super::Machine;

/// Helper struct for the construction of machines. It collects a start state, a list of accept
/// states and a list of transitions in their written form, and turns them into a [`Machine`] of
/// the requested kind.
///
/// # Example
///
/// We want to build a finite automaton that accepts words over `a` and `b` ending in `b`.
/// ```
/// use machines::prelude::*;
///
/// let m = Machine::builder()
///     .with_start("q1")
///     .with_accepting(["q2"])
///     .with_transitions(["q1, a -> q1", "q1, b -> q2", "q2, b -> q2", "q2, a -> q1"])
///     .into_finite()
///     .unwrap();
/// assert!(m.is_finite());
/// assert!(m.is_deterministic());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MachineBuilder {
    start: Option<Symbol>,
    accepting: Vec<Symbol>,
    transitions: Vec<Result<Transition, MachineError>>,
}

impl MachineBuilder {
    /// Sets the start state.
    pub fn with_start(mut self, q: impl Into<Symbol>) -> Self {
        self.start = Some(q.into());
        self
    }

    /// Adds a list of accept states.
    pub fn with_accepting<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        self.accepting.extend(states.into_iter().map(Into::into));
        self
    }

    /// Adds a list of transitions in their written form. Errors are reported when the machine is
    /// built.
    pub fn with_transitions<I, T>(mut self, transitions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: TryInto<Transition>,
        MachineError: From<T::Error>,
    {
        self.transitions.extend(
            transitions
                .into_iter()
                .map(|t| t.try_into().map_err(MachineError::from)),
        );
        self
    }

    /// Adds everything collected so far to `machine`, which determines the store types.
    pub fn into_machine(self, mut machine: Machine) -> Result<Machine, MachineError> {
        if let Some(q) = self.start {
            machine.set_start_state(q)?;
        }
        machine.add_accept_states(self.accepting)?;
        for t in self.transitions {
            machine.add_transition(t?)?;
        }
        Ok(machine)
    }

    /// Builds a finite automaton.
    pub fn into_finite(self) -> Result<Machine, MachineError> {
        self.into_machine(Machine::finite_automaton())
    }

    /// Builds a pushdown automaton.
    pub fn into_pushdown(self) -> Result<Machine, MachineError> {
        self.into_machine(Machine::pushdown_automaton())
    }

    /// Builds a Turing machine.
    pub fn into_turing(self) -> Result<Machine, MachineError> {
        self.into_machine(Machine::turing_machine())
    }

    /// Builds a machine whose kind is guessed from the transitions, see
    /// [`Machine::from_transitions`].
    pub fn into_guessed(self) -> Result<Machine, MachineError> {
        let start = self.start.ok_or(MachineError::NoStartState)?;
        let transitions = self
            .transitions
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;
        Machine::from_transitions(transitions, start, self.accepting)
    }
}
