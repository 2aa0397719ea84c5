use std::convert::Infallible;

use thiserror::Error;

/// Errors that can occur when reading stores, configurations or transitions from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A character that cannot start any token.
    #[error("couldn't understand input at offset {offset}: `{character}`")]
    UnexpectedCharacter {
        /// The offending character.
        character: char,
        /// Byte offset of the character in the input.
        offset: usize,
    },
    /// The tokens do not form the requested value.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// A store carried more than one head marker.
    #[error("head is only allowed to be in one position")]
    MultipleHeads,
}

/// Errors raised when building a [`crate::Machine`] or when an algorithm is invoked on a machine
/// of the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    /// A head position outside of `-1..=len`.
    #[error("head position {position} out of range for a store of length {len}")]
    InvalidPosition {
        /// The requested position.
        position: isize,
        /// Length of the store.
        len: usize,
    },
    /// A configuration or transition with the wrong number of stores.
    #[error("expected {expected} stores, found {found}")]
    ArityMismatch {
        /// Number of stores of the machine.
        expected: usize,
        /// Number of stores that were given.
        found: usize,
    },
    /// A store index that the machine does not have.
    #[error("store {index} out of range for a machine with {stores} stores")]
    StoreOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of stores of the machine.
        stores: usize,
    },
    /// A written transition whose left-hand side is too short for the machine.
    #[error("too few things on left-hand side of arrow")]
    TooFewLeft,
    /// A written transition whose left-hand side is too long for the machine.
    #[error("too many things on left-hand side of arrow")]
    TooManyLeft,
    /// A written transition whose right-hand side is too short for the machine.
    #[error("too few things on right-hand side of arrow")]
    TooFewRight,
    /// A written transition whose right-hand side is too long for the machine.
    #[error("too many things on right-hand side of arrow")]
    TooManyRight,
    /// A tape move other than `L`, `S` or `R`.
    #[error("invalid move `{0}` (allowed moves are L, S, and R)")]
    InvalidMove(String),
    /// A transition that rewrites a stream store.
    #[error("store {0} is a stream and cannot be rewritten")]
    StreamRewrite(usize),
    /// An operation that needs a state store was invoked on a machine without one.
    #[error("this machine doesn't have a state")]
    NoStateStore,
    /// An operation that needs an input store was invoked on a machine without one.
    #[error("this machine doesn't have an input")]
    NoInputStore,
    /// An operation that needs a start configuration was invoked before one was set.
    #[error("this machine doesn't have a start state")]
    NoStartState,
    /// A state store holding something other than exactly one symbol.
    #[error("state `{0}` must consist of exactly one symbol")]
    NotACell(String),
    /// The designated stack store moves its head.
    #[error("store {0} must be a stack")]
    NotAStack(usize),
    /// The machine cannot be run by the pushdown recognizer.
    #[error("machine is not a pushdown automaton: {0}")]
    NotPushdown(String),
    /// The machine does not have the shape an operation requires.
    #[error("unsupported machine shape: {0}")]
    UnsupportedShape(String),
    /// The machine is not a finite automaton.
    #[error("machine must be a finite automaton")]
    NotFinite,
    /// The machine is not a deterministic finite automaton.
    #[error("machine must be a deterministic finite automaton")]
    NotDeterministic,
    /// A transition reads more than one input symbol at once.
    #[error("multiple input symbols on transition `{0}` not supported")]
    MultipleSymbols(String),
    /// A transition reads no input symbol where one is required.
    #[error("transition `{0}` must read an input symbol")]
    EpsilonTransition(String),
    /// A list of transitions from which no machine can be inferred.
    #[error("malformed transitions: {0}")]
    MalformedTransitions(&'static str),
    /// Text that could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl From<Infallible> for MachineError {
    fn from(value: Infallible) -> Self {
        match value {}
    }
}

/// Signals that a [`crate::Transition`] does not match the configuration it is applied to.
///
/// This is expected during search: recognizers simply move on to the next transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("transition cannot apply")]
pub struct Inapplicable;
