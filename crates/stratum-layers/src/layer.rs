//! Architectural tiers and their ranking.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LayerError;

/// One architectural tier.
///
/// Higher ranks may depend on lower ranks, never the reverse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Layer {
    name: String,
    rank: u32,
}

impl Layer {
    /// Creates a layer.
    #[must_use]
    pub fn new(name: impl Into<String>, rank: u32) -> Self {
        Self {
            name: name.into(),
            rank,
        }
    }

    /// Returns the layer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the layer rank.
    #[must_use]
    pub const fn rank(&self) -> u32 {
        self.rank
    }

    /// Returns how many tiers separate `self` from `other`.
    #[must_use]
    pub const fn distance(&self, other: &Self) -> u32 {
        self.rank.abs_diff(other.rank)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The ordered set of tiers, held as data rather than code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerTable {
    by_name: BTreeMap<String, Layer>,
}

impl LayerTable {
    /// Builds a table from names listed lowest tier first.
    ///
    /// # Errors
    ///
    /// Returns a [`LayerError`] for empty or repeated names.
    pub fn from_ordered<I>(names: I) -> Result<Self, LayerError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let ranked = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| {
                u32::try_from(index)
                    .map(|rank| (name, rank))
                    .map_err(|_| LayerError::TooManyLayers)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_ranks(ranked)
    }

    /// Builds a table from explicit `(name, rank)` pairs.
    ///
    /// # Errors
    ///
    /// Returns a [`LayerError`] for empty names, repeated names or repeated
    /// ranks.
    pub fn from_ranks<I, N>(pairs: I) -> Result<Self, LayerError>
    where
        I: IntoIterator<Item = (N, u32)>,
        N: Into<String>,
    {
        let mut by_name = BTreeMap::new();
        let mut by_rank: BTreeMap<u32, String> = BTreeMap::new();

        for (raw_name, rank) in pairs {
            let name: String = raw_name.into();
            if name.trim().is_empty() {
                return Err(LayerError::EmptyName);
            }
            if let Some(first) = by_rank.get(&rank) {
                return Err(LayerError::DuplicateRank {
                    rank,
                    first: first.clone(),
                    second: name,
                });
            }
            match by_name.entry(name.clone()) {
                Entry::Occupied(_) => return Err(LayerError::duplicate_layer(name)),
                Entry::Vacant(slot) => {
                    slot.insert(Layer::new(name.clone(), rank));
                }
            }
            by_rank.insert(rank, name);
        }

        Ok(Self { by_name })
    }

    /// Returns the layer with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.by_name.get(name)
    }

    /// Returns whether a layer with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Iterates over the layers, lowest rank first.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        let mut layers: Vec<&Layer> = self.by_name.values().collect();
        layers.sort_by_key(|layer| layer.rank());
        layers.into_iter()
    }

    /// Returns the number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns whether the table has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
