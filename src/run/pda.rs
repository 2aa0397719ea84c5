//! Cubic-time recognizer for nondeterministic pushdown automata, after B. Lang, "Deterministic
//! techniques for efficient non-deterministic parsers" (1974).
//!
//! Only the top `D` symbols of the stack are kept visible. The chart holds items `(parent,
//! child)` of configurations, where either the parent is absent and the child shows the whole
//! stack, or the child has one more elided stack symbol than the parent. Items are derived by
//! three rules:
//! - Push: if the child shows more than `D` symbols, its bottom-most visible symbol is elided,
//!   giving the item `(child, child')`.
//! - Pop: if the child shows fewer than `D` symbols, the symbol elided by its parent is restored,
//!   giving `(grandparent, aunt)` for every item `(grandparent, parent)`.
//! - Apply: if the child shows exactly `D` symbols (or has no parent), transitions are applied to
//!   it and the results keep the parent.
//!
//! Since items range over pairs of configurations whose stacks are bounded by `D + 1` symbols,
//! the chart is finite and the search terminates.
use std::collections::VecDeque;

use tracing::trace;

use super::{NodeIndex, RunGraph};
use crate::{
    configuration::Configuration,
    error::MachineError,
    machine::{Machine, StoreType},
    math::{Map, Set},
    symbol::{Symbol, Word},
};

/// Symbol shown at the bottom of a stack whose lower part is not visible.
const ELIDED: &str = "…";

/// Settings of the pushdown recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdaSettings {
    /// Index of the stack store. If `None`, the unique store that is a stack without being a
    /// cell is used.
    pub stack: Option<usize>,
    /// Minimum number of stack symbols kept visible. The recognizer raises it to the longest
    /// stack pattern occurring on a transition or accept configuration.
    pub visible_depth: usize,
}

impl Default for PdaSettings {
    fn default() -> Self {
        Self {
            stack: None,
            visible_depth: 3,
        }
    }
}

/// Finds the stack store of a machine that the pushdown recognizer can run. The input store
/// must be a stream that is only read and exhausted on acceptance, one store must be a stack
/// and every other store must be a cell.
pub(super) fn pushdown_layout(
    machine: &Machine,
    stack: Option<usize>,
) -> Result<usize, MachineError> {
    let input = machine.input_index()?;
    if machine.store_types()[input] != StoreType::Stream {
        return Err(MachineError::NotPushdown(format!(
            "input store {input} is not a stream"
        )));
    }
    if !machine.has_input_stream(input) {
        return Err(MachineError::NotPushdown(format!(
            "input store {input} is not an input stream"
        )));
    }

    if let Some(stack) = stack {
        if stack >= machine.num_stores() {
            return Err(MachineError::StoreOutOfRange {
                index: stack,
                stores: machine.num_stores(),
            });
        }
        if stack == input || !machine.has_stack(stack) {
            return Err(MachineError::NotAStack(stack));
        }
        if let Some(s) = (0..machine.num_stores())
            .find(|&s| s != input && s != stack && !machine.has_cell(s))
        {
            return Err(MachineError::NotPushdown(format!("store {s} is not a cell")));
        }
        return Ok(stack);
    }

    let mut found = None;
    for s in (0..machine.num_stores()).filter(|&s| s != input) {
        if machine.has_cell(s) {
            continue;
        }
        if !machine.has_stack(s) {
            return Err(MachineError::NotPushdown(format!(
                "store {s} is neither a cell nor a stack"
            )));
        }
        if let Some(other) = found.replace(s) {
            return Err(MachineError::NotPushdown(format!(
                "stores {other} and {s} are both stacks"
            )));
        }
    }
    found.ok_or_else(|| MachineError::NotPushdown("there is no stack".into()))
}

type ConfigId = usize;
type ItemId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Item {
    parent: Option<ConfigId>,
    child: ConfigId,
}

/// The chart of derived items. Configurations are interned so that items are pairs of ids.
#[derive(Default)]
struct Chart {
    configs: Vec<Configuration>,
    config_ids: Map<Configuration, ConfigId>,
    items: Vec<Item>,
    item_ids: Map<Item, ItemId>,
    agenda: VecDeque<ItemId>,
    /// Items derived from an item by the push and pop rules. In the run graph, an item is
    /// represented by the items it aliases.
    aliases: Vec<Vec<ItemId>>,
}

impl Chart {
    fn intern(&mut self, config: Configuration) -> ConfigId {
        if let Some(&id) = self.config_ids.get(&config) {
            return id;
        }
        let id = self.configs.len();
        self.configs.push(config.clone());
        self.config_ids.insert(config, id);
        id
    }

    fn add(&mut self, parent: Option<ConfigId>, child: Configuration) -> ItemId {
        let item = Item {
            parent,
            child: self.intern(child),
        };
        if let Some(&id) = self.item_ids.get(&item) {
            trace!("merge: {}", self.show(item));
            return id;
        }
        trace!("add: {}", self.show(item));
        let id = self.items.len();
        self.items.push(item);
        self.item_ids.insert(item, id);
        self.aliases.push(vec![]);
        self.agenda.push_back(id);
        id
    }

    fn show(&self, item: Item) -> String {
        match item.parent {
            Some(parent) => format!("{} => {}", self.configs[parent], self.configs[item.child]),
            None => format!("⊥ => {}", self.configs[item.child]),
        }
    }

    /// The items that eventually stand in for `item`, i.e. those reachable through aliases that
    /// are represented in the run graph.
    fn resolve(&self, item: ItemId, nodes: &Map<ItemId, NodeIndex>) -> Vec<NodeIndex> {
        let mut out = vec![];
        let mut seen = Set::default();
        let mut stack = vec![item];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            match nodes.get(&id) {
                Some(&node) => out.push(node),
                None => stack.extend(self.aliases[id].iter().copied()),
            }
        }
        out
    }
}

/// Runs a nondeterministic pushdown automaton on `input` with the default [`PdaSettings`].
pub fn run_pda(machine: &Machine, input: &Word) -> Result<RunGraph, MachineError> {
    run_pda_with(machine, input, PdaSettings::default())
}

/// Runs a nondeterministic pushdown automaton on `input` in time cubic in the length of the
/// input. The machine may have any number of cell stores besides its input stream and stack.
///
/// The nodes of the resulting graph are configurations showing exactly the visible part of the
/// stack, followed by a `…` if there are hidden symbols beneath. Nodes are kept apart by the
/// context of their hidden symbols, so the same configuration may be shown more than once.
pub fn run_pda_with(
    machine: &Machine,
    input: &Word,
    settings: PdaSettings,
) -> Result<RunGraph, MachineError> {
    let stack = pushdown_layout(machine, settings.stack)?;
    let start = machine.initial_config(input)?;
    let visible = machine
        .transitions()
        .iter()
        .map(|t| t.lhs()[stack].len())
        .chain(machine.accept_configs().iter().map(|c| c[stack].len()))
        .fold(settings.visible_depth, usize::max);

    let mut chart = Chart::default();
    let mut graph = RunGraph::default();
    // parent -> pop items having it as their parent
    let mut index_left: Map<ConfigId, Vec<ItemId>> = Map::default();
    // child of a push item -> parents of that push item
    let mut index_right: Map<ConfigId, Vec<Option<ConfigId>>> = Map::default();
    let mut nodes: Map<ItemId, NodeIndex> = Map::default();
    let mut steps: Vec<(ItemId, ItemId, usize)> = vec![];

    let axiom = chart.add(None, start);

    while let Some(id) = chart.agenda.pop_front() {
        let Item { parent, child } = chart.items[id];
        trace!("trigger: {}", chart.show(chart.items[id]));
        let config = chart.configs[child].clone();
        let depth = config[stack].len();

        if depth > visible {
            // push
            let hidden = config[stack].values()[depth - 1].clone();
            let pushed = chart.add(
                Some(child),
                config.with_store(stack, config[stack].without_last()),
            );
            chart.aliases[id].push(pushed);
            index_right.entry(child).or_default().push(parent);

            for &popped in index_left.get(&child).into_iter().flatten() {
                let restored = &chart.configs[chart.items[popped].child];
                let aunt = restored.with_store(stack, restored[stack].with_last(hidden.clone()));
                let aunt = chart.add(parent, aunt);
                chart.aliases[popped].push(aunt);
            }
        } else if let Some(parent) = parent.filter(|_| depth < visible) {
            // pop
            index_left.entry(parent).or_default().push(id);
            let hidden = chart.configs[parent][stack]
                .values()
                .last()
                .cloned()
                .expect("parents hide a stack symbol");
            let aunt = config.with_store(stack, config[stack].with_last(hidden));

            for &grandparent in index_right.get(&parent).into_iter().flatten() {
                let derived = chart.add(grandparent, aunt.clone());
                chart.aliases[id].push(derived);
            }
        } else {
            // just right
            let shown = match parent {
                Some(_) => config.with_store(stack, config[stack].with_last(Symbol::new(ELIDED))),
                None => config.clone(),
            };
            let node = graph.add_node(shown);
            nodes.insert(id, node);
            if machine.is_accepting(&config) {
                graph.mark_accept(node);
            }

            for (i, transition) in machine.transitions().iter().enumerate() {
                if let Ok(next) = transition.apply(&config) {
                    let next = chart.add(parent, next);
                    steps.push((id, next, i));
                }
            }
        }
    }

    for node in chart.resolve(axiom, &nodes) {
        graph.mark_start(node);
    }
    for (source, produced, i) in steps {
        let transition = &machine.transitions()[i];
        for target in chart.resolve(produced, &nodes) {
            graph.add_edge(nodes[&source], target, transition);
        }
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn word(input: &str) -> Word {
        input.parse().unwrap()
    }

    fn anbn() -> Machine {
        Machine::builder()
            .with_start("q0")
            .with_accepting(["q3"])
            .with_transitions([
                "q0, &, & -> q1, $",
                "q1, a, & -> q1, x",
                "q1, &, & -> q2, &",
                "q2, b, x -> q2, &",
                "q2, &, $ -> q3, &",
            ])
            .into_pushdown()
            .unwrap()
    }

    /// Even-length palindromes over `a` and `b`, with a bottom marker so that accepting requires
    /// an empty stack.
    fn palindromes() -> Machine {
        Machine::builder()
            .with_start("q0")
            .with_accepting(["q3"])
            .with_transitions([
                "q0, &, & -> q1, $",
                "q1, a, & -> q1, a",
                "q1, b, & -> q1, b",
                "q1, &, & -> q2, &",
                "q2, a, a -> q2, &",
                "q2, b, b -> q2, &",
                "q2, &, $ -> q3, &",
            ])
            .into_pushdown()
            .unwrap()
    }

    #[test_log::test]
    fn unbounded_pushes() {
        // pushes an x forever, which breadth-first search could never finish
        let m = Machine::builder()
            .with_start("q1")
            .with_accepting(["q2"])
            .with_transitions(["q1, &, & -> q1, x", "q1, a, & -> q2, &", "q2, &, x -> q2, &"])
            .into_pushdown()
            .unwrap();
        let g = run_pda(&m, &word("a")).unwrap();
        assert!(g.accepts());
        assert_eq!(g.shortest_path().unwrap().len(), 2);
        assert!(!run_pda(&m, &word("a a")).unwrap().accepts());
    }

    #[test_log::test]
    fn deep_stacks() {
        let m = anbn();
        for n in [0, 1, 2, 5, 8] {
            let w: Word = std::iter::repeat("a")
                .take(n)
                .chain(std::iter::repeat("b").take(n))
                .collect();
            let g = run_pda(&m, &w).unwrap();
            assert!(g.accepts(), "{w}");
            assert!(g.has_path(), "{w}");
            assert!(!g.is_incomplete());
        }
        for rejected in ["a", "b", "a a b", "a b b", "b a", "a a a a a b b b b"] {
            assert!(!run_pda(&m, &word(rejected)).unwrap().accepts(), "{rejected}");
        }
    }

    #[test]
    fn hidden_stack_content_is_shown() {
        let g = run_pda(&anbn(), &word("a a a a a b b b b b")).unwrap();
        let elided = |n: &RunNode| {
            n.config[2]
                .values()
                .last()
                .is_some_and(|x| x.as_str() == "…")
        };
        assert!(g.nodes().iter().any(elided));
        // nodes showing the whole stack never show more than the visible depth plus one
        assert!(g
            .nodes()
            .iter()
            .all(|n| n.config[2].len() <= PdaSettings::default().visible_depth + 1));
        assert_eq!(g.start().count(), 1);
    }

    #[test_log::test]
    fn agrees_with_breadth_first_search() {
        let m = palindromes();
        for (w, expected) in [
            ("&", true),
            ("a a", true),
            ("a b b a", true),
            ("b a a a a b", true),
            ("a b", false),
            ("a b a", false),
            ("a a b b", false),
        ] {
            let w = word(w);
            let bfs = run_bfs(&m, &w, BfsSettings::default()).unwrap();
            assert_eq!(bfs.accepts(), expected, "{w}");
            for visible_depth in [0, 1, 3] {
                let settings = PdaSettings {
                    stack: None,
                    visible_depth,
                };
                let pda = run_pda_with(&m, &w, settings).unwrap();
                assert_eq!(pda.accepts(), expected, "{w} with depth {visible_depth}");
                assert_eq!(pda.has_path(), expected, "{w} with depth {visible_depth}");
            }
        }
    }

    #[test]
    fn run_dispatches_on_shape() {
        let pda = anbn();
        let g = run(&pda, &word("a a b b"), RunSettings::default()).unwrap();
        assert!(g.accepts());

        let mut fa = Machine::finite_automaton();
        fa.set_start_state("q").unwrap();
        fa.add_accept_state("q").unwrap();
        assert_eq!(
            run_pda(&fa, &word("a")).unwrap_err(),
            MachineError::NotPushdown("there is no stack".into())
        );
        assert!(run(&fa, &Word::epsilon(), RunSettings::default())
            .unwrap()
            .accepts());
    }

    #[test]
    fn input_must_be_exhausted() {
        let mut m = anbn();
        m.add_accept_config("q1, a, &".parse().unwrap()).unwrap();
        assert_eq!(
            run_pda(&m, &word("a b")).unwrap_err(),
            MachineError::NotPushdown("input store 1 is not an input stream".into())
        );
        assert!(run(&m, &word("a b"), RunSettings::default())
            .unwrap()
            .accepts());
    }

    #[test]
    fn at_most_one_stack() {
        let mut m = Machine::new(
            [StoreType::Base, StoreType::Stream, StoreType::Base, StoreType::Base],
            Some(0),
            Some(1),
        )
        .unwrap();
        m.set_start_state("q").unwrap();
        m.add_accept_state("q").unwrap();
        m.add_transition("q, a, &, & -> q, x, y").unwrap();
        assert_eq!(
            run_pda(&m, &word("a")).unwrap_err(),
            MachineError::NotPushdown("stores 2 and 3 are both stacks".into())
        );
        let g = run(&m, &word("a a"), RunSettings::default()).unwrap();
        assert!(g.accepts());
    }

    #[test]
    fn stack_must_not_move() {
        let mut m = anbn();
        m.add_raw_transition("q1, &, x ^ -> q1, &, x ^".parse().unwrap())
            .unwrap();
        let settings = PdaSettings {
            stack: Some(2),
            ..Default::default()
        };
        assert_eq!(
            run_pda_with(&m, &word("a b"), settings).unwrap_err(),
            MachineError::NotAStack(2)
        );
        assert!(matches!(
            run_pda(&m, &word("a b")),
            Err(MachineError::NotPushdown(_))
        ));
    }
}
