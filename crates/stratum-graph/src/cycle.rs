//! Cycle detection and forced-order cycle breaking.
//!
//! A cycle among static or manual edges leaves no valid load order. The
//! only automatic remedy is a forced override: a static or manual edge that
//! exactly reverses a forced edge is suppressed, trusting the explicit
//! order over the inferred one. Whatever cycles survive that step are
//! fatal and are reported with their full path.

use std::collections::{BTreeMap, BTreeSet, btree_set};
use std::fmt;

use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::LOG_TARGET;
use crate::edge::{DependencyEdge, EdgeOrigin};
use crate::error::CycleError;
use crate::graph::DependencyGraph;
use crate::node::ComponentId;

/// A cycle in traversal order, closed by repeating its first node.
///
/// `[X, Y, X]` reads "X depends on Y, which depends on X".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CyclePath(Vec<ComponentId>);

impl CyclePath {
    /// Creates a path from its entries, closing repeat included.
    #[must_use]
    pub const fn new(path: Vec<ComponentId>) -> Self {
        Self(path)
    }

    /// Returns the full path, including the closing repeat.
    #[must_use]
    pub fn path(&self) -> &[ComponentId] {
        &self.0
    }

    /// Returns the distinct members of the cycle in traversal order.
    #[must_use]
    pub fn members(&self) -> &[ComponentId] {
        self.0
            .split_last()
            .map(|(_, members)| members)
            .unwrap_or_default()
    }

    /// Returns the number of entries in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the path is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CyclePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<&str> = self.0.iter().map(ComponentId::as_str).collect();
        f.write_str(&rendered.join(" -> "))
    }
}

/// A static or manual edge set aside because a forced edge reverses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suppression {
    edge: DependencyEdge,
    forced_by: DependencyEdge,
}

impl Suppression {
    /// Returns the suppressed edge.
    #[must_use]
    pub const fn edge(&self) -> &DependencyEdge {
        &self.edge
    }

    /// Returns the forced edge that overrides it.
    #[must_use]
    pub const fn forced_by(&self) -> &DependencyEdge {
        &self.forced_by
    }
}

/// A graph after forced overrides were applied.
#[derive(Debug, Clone)]
pub struct ResolvedGraph {
    graph: DependencyGraph,
    suppressions: Vec<Suppression>,
}

impl ResolvedGraph {
    /// Returns the effective graph, without suppressed edges.
    #[must_use]
    pub const fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Returns the suppressed edges in edge order.
    #[must_use]
    pub fn suppressions(&self) -> &[Suppression] {
        &self.suppressions
    }

    /// Consumes the wrapper and returns the effective graph.
    #[must_use]
    pub fn into_graph(self) -> DependencyGraph {
        self.graph
    }

    /// Fails if any cycle remains in the effective graph.
    ///
    /// # Errors
    ///
    /// Returns a [`CycleError`] listing one path per remaining cycle.
    pub fn ensure_acyclic(self) -> Result<Self, CycleError> {
        let cycles = find_cycles(&self.graph);
        if cycles.is_empty() {
            return Ok(self);
        }
        for cycle in &cycles {
            warn!(target: LOG_TARGET, path = %cycle, "unresolvable dependency cycle");
        }
        Err(CycleError::new(cycles))
    }
}

/// Suppresses every static or manual edge that a forced edge reverses.
///
/// Forced edges themselves are never suppressed.
#[must_use]
pub fn apply_forced_overrides(graph: &DependencyGraph) -> ResolvedGraph {
    let forced: Vec<&DependencyEdge> = graph
        .edges()
        .filter(|edge| edge.origin() == EdgeOrigin::Forced)
        .collect();

    let suppressions: Vec<Suppression> = graph
        .edges()
        .filter(|edge| edge.origin() != EdgeOrigin::Forced)
        .filter_map(|edge| {
            forced
                .iter()
                .find(|forced_edge| forced_edge.is_reverse_of(edge))
                .map(|forced_edge| Suppression {
                    edge: edge.clone(),
                    forced_by: (*forced_edge).clone(),
                })
        })
        .collect();

    for suppression in &suppressions {
        debug!(
            target: LOG_TARGET,
            edge = %suppression.edge,
            forced_by = %suppression.forced_by,
            "edge suppressed by forced order"
        );
    }

    let removed: BTreeSet<DependencyEdge> = suppressions
        .iter()
        .map(|suppression| suppression.edge.clone())
        .collect();
    ResolvedGraph {
        graph: graph.without_edges(&removed),
        suppressions,
    }
}

/// Applies forced overrides and checks that the result is acyclic.
///
/// # Errors
///
/// Returns a [`CycleError`] when cycles remain after every forced override
/// has been applied.
pub fn resolve_cycles(graph: &DependencyGraph) -> Result<ResolvedGraph, CycleError> {
    apply_forced_overrides(graph).ensure_acyclic()
}

/// Returns the first cycle met by a depth-first search, if any.
///
/// Start nodes and neighbours are visited in ascending id order, so the
/// result is deterministic.
#[must_use]
pub fn find_cycle(graph: &DependencyGraph) -> Option<CyclePath> {
    let mut search = CycleSearch::new(graph, None);
    for id in graph.ids() {
        if search.visited.contains(id) {
            continue;
        }
        if let Some(cycle) = search.visit(id) {
            return Some(cycle);
        }
    }
    None
}

/// Returns every strongly connected component with more than one member.
///
/// Members are sorted within each component and components are sorted.
#[must_use]
pub fn cyclic_components(graph: &DependencyGraph) -> Vec<Vec<ComponentId>> {
    let mut digraph = DiGraph::<&ComponentId, ()>::new();
    let indices: BTreeMap<&ComponentId, _> = graph
        .ids()
        .map(|id| (id, digraph.add_node(id)))
        .collect();
    for edge in graph.edges() {
        if let (Some(&from), Some(&to)) = (indices.get(edge.from()), indices.get(edge.to())) {
            digraph.update_edge(from, to, ());
        }
    }

    let mut components: Vec<Vec<ComponentId>> = tarjan_scc(&digraph)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| {
            let mut members: Vec<ComponentId> = component
                .into_iter()
                .filter_map(|index| digraph.node_weight(index).map(|id| (*id).clone()))
                .collect();
            members.sort();
            members
        })
        .collect();
    components.sort();
    components
}

/// Returns one traversal-order path per cyclic component.
///
/// Each search is restricted to the component and starts from its smallest
/// id.
#[must_use]
pub fn find_cycles(graph: &DependencyGraph) -> Vec<CyclePath> {
    cyclic_components(graph)
        .iter()
        .filter_map(|component| {
            let members: BTreeSet<&ComponentId> = component.iter().collect();
            let start = component.first()?;
            let mut search = CycleSearch::new(graph, Some(&members));
            search.visit(start)
        })
        .collect()
}

struct CycleSearch<'g, 'm> {
    graph: &'g DependencyGraph,
    members: Option<&'m BTreeSet<&'m ComponentId>>,
    visited: BTreeSet<&'g ComponentId>,
    stack: Vec<&'g ComponentId>,
    on_stack: BTreeSet<&'g ComponentId>,
}

impl<'g, 'm> CycleSearch<'g, 'm> {
    const fn new(
        graph: &'g DependencyGraph,
        members: Option<&'m BTreeSet<&'m ComponentId>>,
    ) -> Self {
        Self {
            graph,
            members,
            visited: BTreeSet::new(),
            stack: Vec::new(),
            on_stack: BTreeSet::new(),
        }
    }

    fn admits(&self, id: &ComponentId) -> bool {
        self.members.is_none_or(|members| members.contains(id))
    }

    /// Depth-first search from `root` with an explicit frame stack, so long
    /// dependency chains cannot exhaust the call stack.
    fn visit(&mut self, root: &'g ComponentId) -> Option<CyclePath> {
        let mut pending = vec![self.enter(root)];
        while let Some(neighbours) = pending.last_mut() {
            let Some(next) = neighbours.next() else {
                pending.pop();
                if let Some(done) = self.stack.pop() {
                    self.on_stack.remove(done);
                }
                continue;
            };
            if !self.admits(next) {
                continue;
            }
            if self.on_stack.contains(next)
                && let Some(start) = self.stack.iter().position(|id| *id == next)
            {
                let mut path: Vec<ComponentId> = self
                    .stack
                    .get(start..)
                    .unwrap_or_default()
                    .iter()
                    .map(|id| (*id).clone())
                    .collect();
                path.push(next.clone());
                return Some(CyclePath(path));
            }
            if !self.visited.contains(next) {
                pending.push(self.enter(next));
            }
        }
        None
    }

    fn enter(&mut self, node: &'g ComponentId) -> btree_set::IntoIter<&'g ComponentId> {
        self.visited.insert(node);
        self.on_stack.insert(node);
        self.stack.push(node);
        self.graph.dependencies_of(node.as_str()).into_iter()
    }
}
