//! Validated resolver policy.

use std::collections::{BTreeMap, BTreeSet};

use stratum_config::Manifest;
use stratum_graph::{ComponentId, ForcedOrder};
use stratum_layers::{LayerTable, PrefixTable, SeverityThresholds};
use stratum_syntax::MarkerSet;

use crate::error::PolicyError;

/// Everything the resolver needs besides the component sources.
///
/// [`ResolverPolicy::default`] has no layers, no prefixes, no forced orders,
/// the default severity thresholds and the default marker set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverPolicy {
    layers: LayerTable,
    prefixes: PrefixTable,
    forced_orders: Vec<ForcedOrder>,
    thresholds: SeverityThresholds,
    markers: MarkerSet,
    package_roots: Vec<String>,
    declared_layers: BTreeMap<ComponentId, String>,
    manual_dependencies: BTreeMap<ComponentId, BTreeSet<ComponentId>>,
}

impl ResolverPolicy {
    /// Builds a policy from a parsed manifest.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Layers`] when the layer list, prefix rules or
    /// severity thresholds are inconsistent.
    pub fn from_manifest(manifest: &Manifest) -> Result<Self, PolicyError> {
        let layers = LayerTable::from_ordered(manifest.layers.iter().cloned())?;
        let prefixes = PrefixTable::new(manifest.prefixes.clone(), &layers)?;
        let thresholds = SeverityThresholds::new(
            manifest
                .severity
                .medium_from
                .unwrap_or(SeverityThresholds::DEFAULT_MEDIUM_FROM),
            manifest
                .severity
                .high_from
                .unwrap_or(SeverityThresholds::DEFAULT_HIGH_FROM),
        )?;
        let markers = manifest
            .markers
            .as_ref()
            .map_or_else(MarkerSet::default, |names| MarkerSet::new(names.iter().cloned()));

        Ok(Self {
            layers,
            prefixes,
            forced_orders: manifest.forced_order.clone(),
            thresholds,
            markers,
            package_roots: manifest.package_roots.clone(),
            declared_layers: manifest
                .declared_layers
                .iter()
                .map(|(id, layer)| (ComponentId::new(id.as_str()), layer.clone()))
                .collect(),
            manual_dependencies: manifest
                .manual_dependencies
                .iter()
                .map(|(id, deps)| {
                    (
                        ComponentId::new(id.as_str()),
                        deps.iter().map(|dep| ComponentId::new(dep.as_str())).collect(),
                    )
                })
                .collect(),
        })
    }

    /// Replaces the layer and prefix tables.
    #[must_use]
    pub fn with_layers(mut self, layers: LayerTable, prefixes: PrefixTable) -> Self {
        self.layers = layers;
        self.prefixes = prefixes;
        self
    }

    /// Adds forced orders.
    #[must_use]
    pub fn with_forced_orders(mut self, orders: impl IntoIterator<Item = ForcedOrder>) -> Self {
        self.forced_orders.extend(orders);
        self
    }

    /// Replaces the severity thresholds.
    #[must_use]
    pub const fn with_thresholds(mut self, thresholds: SeverityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Replaces the marker set.
    #[must_use]
    pub fn with_markers(mut self, markers: MarkerSet) -> Self {
        self.markers = markers;
        self
    }

    /// Adds dotted package roots stripped from references before matching.
    #[must_use]
    pub fn with_package_roots(mut self, roots: impl IntoIterator<Item = String>) -> Self {
        self.package_roots.extend(roots);
        self
    }

    /// Returns the layer table.
    #[must_use]
    pub const fn layers(&self) -> &LayerTable {
        &self.layers
    }

    /// Returns the prefix table.
    #[must_use]
    pub const fn prefixes(&self) -> &PrefixTable {
        &self.prefixes
    }

    /// Returns the forced orders.
    #[must_use]
    pub fn forced_orders(&self) -> &[ForcedOrder] {
        &self.forced_orders
    }

    /// Returns the severity thresholds.
    #[must_use]
    pub const fn thresholds(&self) -> SeverityThresholds {
        self.thresholds
    }

    /// Returns the marker set.
    #[must_use]
    pub const fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// Returns the package roots, such as `addon` for `addon.ui_panel`.
    #[must_use]
    pub fn package_roots(&self) -> &[String] {
        &self.package_roots
    }

    /// Returns the manifest layer for `id`, used when the component declares
    /// none itself.
    #[must_use]
    pub fn declared_layer(&self, id: &str) -> Option<&str> {
        self.declared_layers.get(id).map(String::as_str)
    }

    /// Returns the manifest's manual dependencies for `id`.
    pub fn manual_dependencies(&self, id: &str) -> impl Iterator<Item = &ComponentId> {
        self.manual_dependencies.get(id).into_iter().flatten()
    }
}
