//! Dependency graph construction and load ordering for Stratum.
//!
//! This crate holds the graph half of the resolver pipeline:
//!
//! - [`ComponentRegistry`] - explicit snapshot of the components in a run
//! - [`GraphBuilder`] - merges static, manual and forced dependencies into a
//!   validated [`DependencyGraph`], rejecting dangling and self edges
//! - [`resolve_cycles`] - applies forced overrides and reports any cycle that
//!   survives them as a [`CycleError`]
//! - [`sequence`] - Kahn's algorithm with a lexicographic tie-break,
//!   producing a [`LoadPlan`]
//!
//! An edge `A -> B` always means "A is initialised after B".
//!
//! # Example
//!
//! ```
//! use stratum_graph::{ComponentDescriptor, ComponentRegistry, GraphBuilder, sequence};
//!
//! let (registry, duplicates) = ComponentRegistry::from_descriptors([
//!     ComponentDescriptor::new("a").with_static_dependencies(["b"]),
//!     ComponentDescriptor::new("b").with_static_dependencies(["c"]),
//!     ComponentDescriptor::new("c"),
//! ]);
//! assert!(duplicates.is_empty());
//!
//! let outcome = GraphBuilder::new(&registry).build();
//! let plan = sequence(&outcome.graph)?;
//! let order: Vec<&str> = plan.iter().map(|id| id.as_str()).collect();
//! assert_eq!(order, ["c", "b", "a"]);
//! # Ok::<(), stratum_graph::CycleError>(())
//! ```

mod builder;
mod cycle;
mod edge;
mod error;
mod graph;
mod node;
mod registry;
mod sequence;

pub use builder::{BuildOutcome, ForcedOrder, GraphBuilder};
pub use cycle::{
    CyclePath, ResolvedGraph, Suppression, apply_forced_overrides, cyclic_components, find_cycle,
    find_cycles, resolve_cycles,
};
pub use edge::{DependencyEdge, EdgeOrigin};
pub use error::{CycleError, EdgeRejection, GraphError};
pub use graph::DependencyGraph;
pub use node::{ComponentDescriptor, ComponentId};
pub use registry::ComponentRegistry;
pub use sequence::{LoadPlan, sequence};

/// Tracing target for graph construction and ordering.
pub(crate) const LOG_TARGET: &str = "stratum::graph";

#[cfg(test)]
mod tests;
