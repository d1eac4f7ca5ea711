//! Explicit registry of the components taking part in a run.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::error::GraphError;
use crate::node::{ComponentDescriptor, ComponentId};

/// Snapshot of the components available to one resolution run.
///
/// The registry is passed to whoever needs it rather than living in global
/// state, and iterates in ascending id order.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: BTreeMap<ComponentId, ComponentDescriptor>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every descriptor, keeping the first of any duplicate id.
    ///
    /// Returns the registry together with one error per rejected duplicate.
    #[must_use]
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = ComponentDescriptor>,
    ) -> (Self, Vec<GraphError>) {
        let mut registry = Self::new();
        let errors = descriptors
            .into_iter()
            .filter_map(|descriptor| registry.register(descriptor).err())
            .collect();
        (registry, errors)
    }

    /// Registers a component.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateComponent`] if the id is already
    /// registered; the existing descriptor is kept.
    pub fn register(&mut self, descriptor: ComponentDescriptor) -> Result<(), GraphError> {
        match self.components.entry(descriptor.id().clone()) {
            Entry::Occupied(existing) => Err(GraphError::duplicate_component(existing.key().clone())),
            Entry::Vacant(slot) => {
                slot.insert(descriptor);
                Ok(())
            }
        }
    }

    /// Returns the descriptor registered under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ComponentDescriptor> {
        self.components.get(id)
    }

    /// Returns whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    /// Iterates over registered ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &ComponentId> {
        self.components.keys()
    }

    /// Iterates over descriptors in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.components.values()
    }

    /// Returns the number of registered components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns whether no component is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
