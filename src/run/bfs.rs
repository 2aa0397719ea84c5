use std::collections::VecDeque;

use tracing::trace;

use super::{NodeIndex, RunGraph};
use crate::{
    configuration::Configuration, error::MachineError, machine::Machine, math::Map, symbol::Word,
};

/// Settings of the breadth-first recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BfsSettings {
    /// Maximum number of transitions applied along any path. Configurations at this depth are
    /// not expanded and are marked incomplete.
    pub steps: usize,
}

impl Default for BfsSettings {
    fn default() -> Self {
        Self { steps: 1000 }
    }
}

/// Runs `machine` on `input` by exploring its configurations breadth first, starting from the
/// start configuration with the input store holding `input`. Works for any kind of machine, but
/// may not terminate on its own: paths longer than `settings.steps` are cut off.
///
/// Every configuration is visited at most once, at the smallest depth it can be reached at.
pub fn run_bfs(
    machine: &Machine,
    input: &Word,
    settings: BfsSettings,
) -> Result<RunGraph, MachineError> {
    let start = machine.initial_config(input)?;
    let mut graph = RunGraph::default();
    let mut chart: Map<Configuration, NodeIndex> = Map::default();
    let mut queue = VecDeque::new();

    let node = graph.add_node(start.clone());
    graph.mark_start(node);
    chart.insert(start.clone(), node);
    queue.push_back((start, node, 0usize));

    while let Some((config, node, depth)) = queue.pop_front() {
        trace!("trigger: {config}");

        if machine.is_accepting(&config) {
            graph.mark_accept(node);
        }

        if depth == settings.steps {
            trace!("maximum number of steps reached");
            graph.mark_incomplete(node);
            continue;
        }

        for transition in machine.transitions() {
            let Ok(next) = transition.apply(&config) else {
                continue;
            };
            let target = match chart.get(&next) {
                Some(&target) => {
                    trace!("merge: {next}");
                    target
                }
                None => {
                    trace!("add: {next}");
                    let target = graph.add_node(next.clone());
                    chart.insert(next.clone(), target);
                    queue.push_back((next, target, depth + 1));
                    target
                }
            };
            graph.add_edge(node, target, transition);
        }
    }

    Ok(graph)
}
