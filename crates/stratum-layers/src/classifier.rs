//! Assignment of components to layers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use stratum_graph::{ComponentDescriptor, ComponentId, DependencyGraph};
use tracing::{debug, warn};

use crate::LOG_TARGET;
use crate::layer::{Layer, LayerTable};
use crate::prefix::PrefixTable;

/// Where a component's layer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSource {
    /// The descriptor declared its layer explicitly.
    Declared,
    /// The layer was inferred from the id prefix table.
    Prefix,
    /// No layer applies; the component is exempt from violation checks.
    Unclassified,
}

impl LayerSource {
    /// Returns the lower-case label used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Declared => "declared",
            Self::Prefix => "prefix",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The layer assigned to one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    layer: Option<Layer>,
    source: LayerSource,
    unknown_declared: Option<String>,
}

impl Classification {
    /// Returns the assigned layer, if any.
    #[must_use]
    pub const fn layer(&self) -> Option<&Layer> {
        self.layer.as_ref()
    }

    /// Returns where the layer came from.
    #[must_use]
    pub const fn source(&self) -> LayerSource {
        self.source
    }

    /// Returns a declared layer name that was not found in the table.
    ///
    /// Such a declaration is ignored and classification falls back to the
    /// prefix table.
    #[must_use]
    pub fn unknown_declared(&self) -> Option<&str> {
        self.unknown_declared.as_deref()
    }
}

/// Layer of every component in a graph, in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerAssignments {
    entries: BTreeMap<ComponentId, Classification>,
}

impl LayerAssignments {
    /// Returns the classification of `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Classification> {
        self.entries.get(id)
    }

    /// Returns the layer of `id`, if it is classified.
    #[must_use]
    pub fn layer_of(&self, id: &str) -> Option<&Layer> {
        self.get(id).and_then(Classification::layer)
    }

    /// Iterates over every classification.
    pub fn iter(&self) -> impl Iterator<Item = (&ComponentId, &Classification)> {
        self.entries.iter()
    }

    /// Iterates over components whose declared layer is unknown, with the
    /// declared name.
    pub fn unknown_declared(&self) -> impl Iterator<Item = (&ComponentId, &str)> {
        self.entries.iter().filter_map(|(id, classification)| {
            classification.unknown_declared().map(|name| (id, name))
        })
    }

    /// Returns the number of classified entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Assigns layers by declaration, then by id prefix.
///
/// The classifier only reads its inputs; classifying the same graph twice
/// yields identical assignments.
#[derive(Debug, Clone, Copy)]
pub struct LayerClassifier<'a> {
    layers: &'a LayerTable,
    prefixes: &'a PrefixTable,
}

impl<'a> LayerClassifier<'a> {
    /// Creates a classifier over the given tables.
    #[must_use]
    pub const fn new(layers: &'a LayerTable, prefixes: &'a PrefixTable) -> Self {
        Self { layers, prefixes }
    }

    /// Classifies a single component.
    #[must_use]
    pub fn classify(&self, descriptor: &ComponentDescriptor) -> Classification {
        let declared = descriptor.declared_layer();
        if let Some(layer) = declared.and_then(|name| self.layers.get(name)) {
            return Classification {
                layer: Some(layer.clone()),
                source: LayerSource::Declared,
                unknown_declared: None,
            };
        }

        let inferred = self
            .prefixes
            .lookup(descriptor.id().as_str())
            .and_then(|name| self.layers.get(name));
        Classification {
            source: if inferred.is_some() {
                LayerSource::Prefix
            } else {
                LayerSource::Unclassified
            },
            layer: inferred.cloned(),
            unknown_declared: declared.map(str::to_owned),
        }
    }

    /// Classifies every node of `graph`.
    #[must_use]
    pub fn classify_all(&self, graph: &DependencyGraph) -> LayerAssignments {
        let entries: BTreeMap<ComponentId, Classification> = graph
            .nodes()
            .map(|descriptor| (descriptor.id().clone(), self.classify(descriptor)))
            .collect();
        let assignments = LayerAssignments { entries };

        for (id, name) in assignments.unknown_declared() {
            warn!(target: LOG_TARGET, component = %id, layer = name, "declared layer is unknown");
        }
        debug!(
            target: LOG_TARGET,
            components = assignments.len(),
            unclassified = assignments
                .iter()
                .filter(|(_, c)| c.source() == LayerSource::Unclassified)
                .count(),
            "layers assigned"
        );
        assignments
    }
}
