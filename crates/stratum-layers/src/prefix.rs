//! Id-prefix naming convention, kept as a lookup table.

use std::collections::BTreeMap;

use crate::error::LayerError;
use crate::layer::LayerTable;

/// Maps component id prefixes onto layer names.
///
/// When several prefixes match an id, the longest one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixTable {
    rules: BTreeMap<String, String>,
}

impl PrefixTable {
    /// Creates a table that matches nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a table from `(prefix, layer)` rules, checked against `layers`.
    ///
    /// A repeated prefix keeps its last mapping.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::EmptyPrefix`] for an empty prefix and
    /// [`LayerError::UnknownLayer`] when a rule names a layer missing from
    /// `layers`.
    pub fn new<I, P, L>(rules: I, layers: &LayerTable) -> Result<Self, LayerError>
    where
        I: IntoIterator<Item = (P, L)>,
        P: Into<String>,
        L: Into<String>,
    {
        let mut table = BTreeMap::new();
        for (raw_prefix, raw_layer) in rules {
            let prefix: String = raw_prefix.into();
            let layer: String = raw_layer.into();
            if prefix.is_empty() {
                return Err(LayerError::EmptyPrefix);
            }
            if !layers.contains(&layer) {
                return Err(LayerError::unknown_layer(prefix, layer));
            }
            table.insert(prefix, layer);
        }
        Ok(Self { rules: table })
    }

    /// Returns the layer name for `id` by longest matching prefix.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<&str> {
        self.rules
            .iter()
            .filter(|(prefix, _)| id.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, layer)| layer.as_str())
    }

    /// Iterates over the rules in prefix order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules
            .iter()
            .map(|(prefix, layer)| (prefix.as_str(), layer.as_str()))
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns whether the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
