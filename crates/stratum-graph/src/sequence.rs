//! Deterministic topological sequencing.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::LOG_TARGET;
use crate::cycle::find_cycles;
use crate::error::CycleError;
use crate::graph::DependencyGraph;
use crate::node::ComponentId;

/// The initialisation order produced by a successful run.
///
/// Every component appears exactly once and after everything it depends
/// on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct LoadPlan {
    ids: Vec<ComponentId>,
}

impl LoadPlan {
    /// Returns the ordered ids.
    #[must_use]
    pub fn ids(&self) -> &[ComponentId] {
        &self.ids
    }

    /// Returns the number of planned components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns whether the plan is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the zero-based position of `id` in the plan.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|planned| planned.as_str() == id)
    }

    /// Iterates over the plan in load order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentId> {
        self.ids.iter()
    }

    /// Consumes the plan and returns the ordered ids.
    #[must_use]
    pub fn into_ids(self) -> Vec<ComponentId> {
        self.ids
    }

    /// Returns whether the plan lists every node of `graph` exactly once and
    /// places each edge target strictly before its source.
    #[must_use]
    pub fn satisfies(&self, graph: &DependencyGraph) -> bool {
        let positions: BTreeMap<&ComponentId, usize> = self
            .ids
            .iter()
            .enumerate()
            .map(|(index, id)| (id, index))
            .collect();
        let complete = positions.len() == self.ids.len()
            && self.ids.len() == graph.node_count()
            && graph.ids().all(|id| positions.contains_key(id));
        complete
            && graph.edges().all(|edge| {
                match (positions.get(edge.to()), positions.get(edge.from())) {
                    (Some(to), Some(from)) => to < from,
                    _ => false,
                }
            })
    }
}

impl<'a> IntoIterator for &'a LoadPlan {
    type Item = &'a ComponentId;
    type IntoIter = std::slice::Iter<'a, ComponentId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

/// Produces the load plan with Kahn's algorithm.
///
/// Among components whose dependencies are all placed, the smallest id is
/// always taken first, so unchanged inputs always yield the same plan.
///
/// # Errors
///
/// Returns a [`CycleError`] if some components can never be placed.
pub fn sequence(graph: &DependencyGraph) -> Result<LoadPlan, CycleError> {
    let mut pending: BTreeMap<&ComponentId, usize> = graph
        .ids()
        .map(|id| (id, graph.dependencies_of(id.as_str()).len()))
        .collect();
    let mut ready: BTreeSet<&ComponentId> = pending
        .iter()
        .filter(|(_, remaining)| **remaining == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut ids = Vec::with_capacity(graph.node_count());

    while let Some(next) = ready.pop_first() {
        ids.push(next.clone());
        for dependent in graph.dependents_of(next.as_str()) {
            if let Some(remaining) = pending.get_mut(dependent) {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    ready.insert(dependent);
                }
            }
        }
    }

    if ids.len() < graph.node_count() {
        return Err(CycleError::new(find_cycles(graph)));
    }

    debug!(target: LOG_TARGET, components = ids.len(), "load plan sequenced");
    Ok(LoadPlan { ids })
}
