use std::collections::VecDeque;

use crate::{
    configuration::{Configuration, Transition},
    math::Set,
};

/// Index of a node in a [`RunGraph`].
pub type NodeIndex = usize;

/// A configuration visited by a run, together with flags describing its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunNode {
    /// The configuration. Runs of the pushdown recognizer may show a `…` at the bottom of the
    /// stack, standing for stack content that is not visible.
    pub config: Configuration,
    /// The run starts here.
    pub start: bool,
    /// The configuration is matched by an accept configuration.
    pub accept: bool,
    /// Exploration stopped here because the step budget was exhausted.
    pub incomplete: bool,
}

/// A step of a run from one node to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunEdge {
    /// Node the step leaves from.
    pub source: NodeIndex,
    /// Node the step leads to.
    pub target: NodeIndex,
    /// The transition that was applied.
    pub transition: Transition,
}

/// The graph of configurations visited while running a machine on a word. The machine accepts
/// the word iff some accepting node is reachable from a start node, and since recognizers only
/// add nodes they reach, this is the case iff there is an accepting node at all.
#[derive(Debug, Clone, Default)]
pub struct RunGraph {
    nodes: Vec<RunNode>,
    edges: Vec<RunEdge>,
    outgoing: Vec<Vec<usize>>,
    seen_edges: Set<(NodeIndex, NodeIndex, Transition)>,
}

impl RunGraph {
    pub(crate) fn add_node(&mut self, config: Configuration) -> NodeIndex {
        self.nodes.push(RunNode {
            config,
            start: false,
            accept: false,
            incomplete: false,
        });
        self.outgoing.push(vec![]);
        self.nodes.len() - 1
    }

    pub(crate) fn mark_start(&mut self, node: NodeIndex) {
        self.nodes[node].start = true;
    }

    pub(crate) fn mark_accept(&mut self, node: NodeIndex) {
        self.nodes[node].accept = true;
    }

    pub(crate) fn mark_incomplete(&mut self, node: NodeIndex) {
        self.nodes[node].incomplete = true;
    }

    /// Adds an edge unless the same edge is already present.
    pub(crate) fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, transition: &Transition) {
        if !self
            .seen_edges
            .insert((source, target, transition.clone()))
        {
            return;
        }
        self.outgoing[source].push(self.edges.len());
        self.edges.push(RunEdge {
            source,
            target,
            transition: transition.clone(),
        });
    }

    /// All nodes, indexed by [`NodeIndex`].
    pub fn nodes(&self) -> &[RunNode] {
        &self.nodes
    }

    /// Returns the node with index `node`, if there is one.
    pub fn node(&self, node: NodeIndex) -> Option<&RunNode> {
        self.nodes.get(node)
    }

    /// All edges.
    pub fn edges(&self) -> &[RunEdge] {
        &self.edges
    }

    /// The edges leaving `node`.
    pub fn edges_from(&self, node: NodeIndex) -> impl Iterator<Item = &RunEdge> + '_ {
        self.outgoing
            .get(node)
            .into_iter()
            .flatten()
            .map(|&e| &self.edges[e])
    }

    /// The start nodes.
    pub fn start(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        (0..self.nodes.len()).filter(|&n| self.nodes[n].start)
    }

    /// The accepting nodes.
    pub fn accepting_nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        (0..self.nodes.len()).filter(|&n| self.nodes[n].accept)
    }

    /// Returns true if the run reached an accepting configuration.
    pub fn accepts(&self) -> bool {
        self.nodes.iter().any(|n| n.accept)
    }

    /// Returns true if exploration was cut off somewhere, so that a rejecting run is not
    /// conclusive.
    pub fn is_incomplete(&self) -> bool {
        self.nodes.iter().any(|n| n.incomplete)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns a shortest path of nodes from a start node to an accepting node, if there is one.
    pub fn shortest_path(&self) -> Option<Vec<NodeIndex>> {
        let mut predecessor: Vec<Option<NodeIndex>> = vec![None; self.nodes.len()];
        let mut seen = vec![false; self.nodes.len()];
        let mut queue: VecDeque<NodeIndex> = self.start().collect();
        for &n in &queue {
            seen[n] = true;
        }

        while let Some(n) = queue.pop_front() {
            if self.nodes[n].accept {
                let mut path = vec![n];
                let mut current = n;
                while let Some(p) = predecessor[current] {
                    path.push(p);
                    current = p;
                }
                path.reverse();
                return Some(path);
            }
            for edge in self.edges_from(n) {
                if !seen[edge.target] {
                    seen[edge.target] = true;
                    predecessor[edge.target] = Some(n);
                    queue.push_back(edge.target);
                }
            }
        }
        None
    }

    /// Returns true if a start node reaches an accepting node.
    pub fn has_path(&self) -> bool {
        self.shortest_path().is_some()
    }
}
