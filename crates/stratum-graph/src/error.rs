//! Error types for dependency graph operations.

use thiserror::Error;

use crate::cycle::CyclePath;
use crate::edge::DependencyEdge;
use crate::node::ComponentId;

/// Errors returned by registry and graph operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A component with the same identifier was already registered.
    #[error("duplicate component id '{id}'")]
    DuplicateComponent {
        /// The identifier registered twice.
        id: ComponentId,
    },

    /// The requested node was not found in the graph.
    #[error("component not found: {0}")]
    NodeNotFound(ComponentId),

    /// A force-order declaration could not be parsed.
    #[error("invalid forced order '{input}': {reason}")]
    InvalidForcedOrder {
        /// The rejected declaration.
        input: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

impl GraphError {
    /// Creates a new `DuplicateComponent` error.
    #[must_use]
    pub fn duplicate_component(id: impl Into<ComponentId>) -> Self {
        Self::DuplicateComponent { id: id.into() }
    }

    /// Creates a new `NodeNotFound` error.
    #[must_use]
    pub fn node_not_found(id: impl Into<ComponentId>) -> Self {
        Self::NodeNotFound(id.into())
    }

    /// Creates a new `InvalidForcedOrder` error.
    #[must_use]
    pub fn invalid_forced_order(input: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidForcedOrder {
            input: input.into(),
            reason,
        }
    }
}

/// An edge dropped while building the graph.
///
/// Rejections are per-edge: the offending edge is excluded and the build
/// carries on with the rest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EdgeRejection {
    /// One endpoint names a component that is not registered.
    #[error("edge {edge} references unknown component '{missing}'")]
    Dangling {
        /// The rejected edge.
        edge: DependencyEdge,
        /// The endpoint that could not be resolved.
        missing: ComponentId,
    },

    /// The edge points from a component to itself.
    #[error("component '{}' cannot depend on itself ({})", .edge.from(), .edge.origin())]
    SelfReferential {
        /// The rejected edge.
        edge: DependencyEdge,
    },
}

impl EdgeRejection {
    /// Returns the rejected edge.
    #[must_use]
    pub const fn edge(&self) -> &DependencyEdge {
        match self {
            Self::Dangling { edge, .. } | Self::SelfReferential { edge } => edge,
        }
    }
}

/// No acyclic load order exists, even after forced overrides were applied.
///
/// This is the only error fatal to a resolution run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dependency cycle detected: {}", render_cycles(.cycles))]
pub struct CycleError {
    cycles: Vec<CyclePath>,
}

impl CycleError {
    /// Creates a cycle error from the remaining cycle paths.
    #[must_use]
    pub const fn new(cycles: Vec<CyclePath>) -> Self {
        Self { cycles }
    }

    /// Returns every remaining cycle, one path per strongly connected
    /// component.
    #[must_use]
    pub fn cycles(&self) -> &[CyclePath] {
        &self.cycles
    }
}

fn render_cycles(cycles: &[CyclePath]) -> String {
    cycles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
