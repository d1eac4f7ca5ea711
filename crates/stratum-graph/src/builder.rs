//! Merging of scanned, declared and forced dependencies into one graph.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::LOG_TARGET;
use crate::edge::{DependencyEdge, EdgeOrigin};
use crate::error::{EdgeRejection, GraphError};
use crate::graph::DependencyGraph;
use crate::node::ComponentId;
use crate::registry::ComponentRegistry;

/// A centrally maintained ordering override: `after` initialises after
/// `before`.
///
/// The textual form is `after>before`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ForcedOrder {
    after: ComponentId,
    before: ComponentId,
}

impl ForcedOrder {
    /// Creates an override placing `after` behind `before`.
    #[must_use]
    pub fn new(after: impl Into<ComponentId>, before: impl Into<ComponentId>) -> Self {
        Self {
            after: after.into(),
            before: before.into(),
        }
    }

    /// Returns the component that loads later.
    #[must_use]
    pub const fn after(&self) -> &ComponentId {
        &self.after
    }

    /// Returns the component that loads earlier.
    #[must_use]
    pub const fn before(&self) -> &ComponentId {
        &self.before
    }

    /// Returns the forced edge this override contributes.
    #[must_use]
    pub fn edge(&self) -> DependencyEdge {
        DependencyEdge::new(self.after.clone(), self.before.clone(), EdgeOrigin::Forced)
    }
}

impl fmt::Display for ForcedOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}>{}", self.after, self.before)
    }
}

impl FromStr for ForcedOrder {
    type Err = GraphError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (after, before) = input
            .split_once('>')
            .ok_or_else(|| GraphError::invalid_forced_order(input, "expected 'after>before'"))?;
        let after_id = after.trim();
        let before_id = before.trim();
        if after_id.is_empty() || before_id.is_empty() {
            return Err(GraphError::invalid_forced_order(
                input,
                "both component ids must be non-empty",
            ));
        }
        if before_id.contains('>') {
            return Err(GraphError::invalid_forced_order(
                input,
                "exactly one '>' separator is allowed",
            ));
        }
        Ok(Self::new(after_id, before_id))
    }
}

/// Result of building a graph: the graph plus every edge left out of it.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// The validated dependency graph.
    pub graph: DependencyGraph,
    /// Edges dropped during the build, in discovery order.
    pub rejected: Vec<EdgeRejection>,
}

/// Builds a [`DependencyGraph`] from a registry and forced-order overrides.
///
/// Static and manual dependencies come from each descriptor, forced edges
/// from the override list. Edges are deduplicated per `(from, to, origin)`,
/// so one pair may carry several origins.
#[derive(Debug)]
pub struct GraphBuilder<'a> {
    registry: &'a ComponentRegistry,
    forced: Vec<ForcedOrder>,
}

impl<'a> GraphBuilder<'a> {
    /// Creates a builder over the given registry.
    #[must_use]
    pub const fn new(registry: &'a ComponentRegistry) -> Self {
        Self {
            registry,
            forced: Vec::new(),
        }
    }

    /// Adds forced-order overrides.
    #[must_use]
    pub fn with_forced_orders(mut self, orders: impl IntoIterator<Item = ForcedOrder>) -> Self {
        self.forced.extend(orders);
        self
    }

    /// Validates every candidate edge and assembles the graph.
    #[must_use]
    pub fn build(self) -> BuildOutcome {
        let mut edges = BTreeSet::new();
        let mut rejected = Vec::new();
        let mut seen_rejections = BTreeSet::new();

        for candidate in self.candidates() {
            match self.validate(&candidate) {
                Ok(()) => {
                    edges.insert(candidate);
                }
                Err(rejection) => {
                    if seen_rejections.insert(candidate) {
                        warn!(target: LOG_TARGET, reason = %rejection, "edge rejected");
                        rejected.push(rejection);
                    }
                }
            }
        }

        let nodes = self
            .registry
            .iter()
            .map(|descriptor| (descriptor.id().clone(), descriptor.clone()))
            .collect();
        let graph = DependencyGraph::from_parts(nodes, edges);
        debug!(
            target: LOG_TARGET,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            rejected = rejected.len(),
            "dependency graph built"
        );
        BuildOutcome { graph, rejected }
    }

    fn candidates(&self) -> Vec<DependencyEdge> {
        let declared = self.registry.iter().flat_map(|descriptor| {
            let statics = descriptor.static_dependencies().iter().map(|to| {
                DependencyEdge::new(descriptor.id().clone(), to.clone(), EdgeOrigin::Static)
            });
            let manuals = descriptor.manual_dependencies().iter().map(|to| {
                DependencyEdge::new(descriptor.id().clone(), to.clone(), EdgeOrigin::Manual)
            });
            statics.chain(manuals)
        });
        declared
            .chain(self.forced.iter().map(ForcedOrder::edge))
            .collect()
    }

    fn validate(&self, edge: &DependencyEdge) -> Result<(), EdgeRejection> {
        if edge.is_self_loop() {
            return Err(EdgeRejection::SelfReferential { edge: edge.clone() });
        }
        let missing = [edge.from(), edge.to()]
            .into_iter()
            .find(|id| !self.registry.contains(id.as_str()));
        missing.map_or(Ok(()), |id| {
            Err(EdgeRejection::Dangling {
                edge: edge.clone(),
                missing: id.clone(),
            })
        })
    }
}
