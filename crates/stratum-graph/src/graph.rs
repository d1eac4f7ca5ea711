//! Dependency graph structure with bidirectional indexing.

use std::collections::{BTreeMap, BTreeSet};

use crate::edge::DependencyEdge;
use crate::error::GraphError;
use crate::node::{ComponentDescriptor, ComponentId};

/// Components plus the dependency edges between them.
///
/// Every edge endpoint is a node of the graph. Edges are unique and kept
/// sorted, and the graph maintains indices for both directions so that
/// dependencies and dependents can be queried cheaply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    /// All nodes, keyed by component id.
    nodes: BTreeMap<ComponentId, ComponentDescriptor>,
    /// All edges in `(from, to, origin)` order.
    edges: Vec<DependencyEdge>,
    /// Indices of edges leaving each node (its dependencies).
    outgoing: BTreeMap<ComponentId, Vec<usize>>,
    /// Indices of edges entering each node (its dependents).
    incoming: BTreeMap<ComponentId, Vec<usize>>,
}

impl DependencyGraph {
    /// Builds a graph from nodes and edges whose endpoints were already
    /// validated.
    pub(crate) fn from_parts(
        nodes: BTreeMap<ComponentId, ComponentDescriptor>,
        edges: BTreeSet<DependencyEdge>,
    ) -> Self {
        let mut graph = Self {
            outgoing: nodes.keys().map(|id| (id.clone(), Vec::new())).collect(),
            incoming: nodes.keys().map(|id| (id.clone(), Vec::new())).collect(),
            nodes,
            edges: Vec::with_capacity(edges.len()),
        };
        for edge in edges {
            graph.push_edge(edge);
        }
        graph
    }

    fn push_edge(&mut self, edge: DependencyEdge) {
        let index = self.edges.len();
        self.outgoing
            .entry(edge.from().clone())
            .or_default()
            .push(index);
        self.incoming
            .entry(edge.to().clone())
            .or_default()
            .push(index);
        self.edges.push(edge);
    }

    /// Returns a copy of this graph without the given edges.
    #[must_use]
    pub fn without_edges(&self, removed: &BTreeSet<DependencyEdge>) -> Self {
        let kept = self
            .edges
            .iter()
            .filter(|edge| !removed.contains(*edge))
            .cloned()
            .collect();
        Self::from_parts(self.nodes.clone(), kept)
    }

    /// Returns the descriptor of the given node.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&ComponentDescriptor> {
        self.nodes.get(id)
    }

    /// Returns the descriptor of the given node, or an error if not found.
    ///
    /// # Errors
    /// Returns `GraphError::NodeNotFound` if no node with the given id exists.
    pub fn get_node(&self, id: &str) -> Result<&ComponentDescriptor, GraphError> {
        self.node(id).ok_or_else(|| GraphError::node_not_found(id))
    }

    /// Iterates over all nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.nodes.values()
    }

    /// Iterates over all node ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &ComponentId> {
        self.nodes.keys()
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterates over all edges in sorted order.
    pub fn edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.edges.iter()
    }

    /// Returns the number of edges.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the edges leaving `id`, i.e. the ones naming its
    /// dependencies.
    pub fn outgoing_edges(&self, id: &str) -> impl Iterator<Item = &DependencyEdge> {
        self.outgoing
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|&index| self.edges.get(index))
    }

    /// Returns the edges entering `id`, i.e. the ones naming its
    /// dependents.
    pub fn incoming_edges(&self, id: &str) -> impl Iterator<Item = &DependencyEdge> {
        self.incoming
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|&index| self.edges.get(index))
    }

    /// Returns the distinct components `id` must be initialised after.
    #[must_use]
    pub fn dependencies_of(&self, id: &str) -> BTreeSet<&ComponentId> {
        self.outgoing_edges(id).map(DependencyEdge::to).collect()
    }

    /// Returns the distinct components that must be initialised after `id`.
    #[must_use]
    pub fn dependents_of(&self, id: &str) -> BTreeSet<&ComponentId> {
        self.incoming_edges(id).map(DependencyEdge::from).collect()
    }

    /// Returns whether the graph contains a node with the given id.
    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Returns whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
