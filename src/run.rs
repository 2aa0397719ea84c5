use tracing::debug;

use crate::{error::MachineError, machine::Machine, symbol::Word};

mod graph;
pub use graph::{NodeIndex, RunEdge, RunGraph, RunNode};

mod bfs;
pub use bfs::{run_bfs, BfsSettings};

mod pda;
pub use pda::{run_pda, run_pda_with, PdaSettings};

/// Settings of both recognizers, used by [`run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSettings {
    /// Settings used if the machine is run breadth first.
    pub bfs: BfsSettings,
    /// Settings used if the machine is run as a pushdown automaton.
    pub pda: PdaSettings,
}

/// Runs `machine` on `input`, choosing the recognizer by the shape of the machine. If the input
/// is a stream, one store is a stack and all others are cells, [`run_pda_with`] is used, which
/// always terminates. Otherwise the machine is explored with [`run_bfs`].
pub fn run(machine: &Machine, input: &Word, settings: RunSettings) -> Result<RunGraph, MachineError> {
    match pda::pushdown_layout(machine, settings.pda.stack) {
        Ok(stack) => {
            debug!("using modified Lang algorithm with stack {stack}");
            run_pda_with(machine, input, settings.pda)
        }
        Err(reason) => {
            debug!("using breadth-first search: {reason}");
            run_bfs(machine, input, settings.bfs)
        }
    }
}
