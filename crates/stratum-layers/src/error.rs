//! Error types for layer configuration.

use thiserror::Error;

/// Errors raised while building layer, prefix or threshold tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    /// A layer was declared with an empty name.
    #[error("layer names must be non-empty")]
    EmptyName,

    /// The same layer name was declared twice.
    #[error("layer '{name}' is declared more than once")]
    DuplicateLayer {
        /// The repeated name.
        name: String,
    },

    /// Two layers share a rank, so the tiers would not be totally ordered.
    #[error("layers '{first}' and '{second}' share rank {rank}")]
    DuplicateRank {
        /// The shared rank.
        rank: u32,
        /// The layer that claimed the rank first.
        first: String,
        /// The layer that claimed it again.
        second: String,
    },

    /// A prefix rule maps onto a layer that is not in the table.
    #[error("prefix '{prefix}' maps to unknown layer '{layer}'")]
    UnknownLayer {
        /// The prefix of the offending rule.
        prefix: String,
        /// The layer name that was not found.
        layer: String,
    },

    /// A prefix rule has an empty prefix.
    #[error("prefix rules must have a non-empty prefix")]
    EmptyPrefix,

    /// Severity thresholds are out of order.
    #[error(
        "invalid severity thresholds: need 1 <= medium_from ({medium_from}) <= high_from ({high_from})"
    )]
    InvalidThresholds {
        /// Distance at which violations become medium.
        medium_from: u32,
        /// Distance at which violations become high.
        high_from: u32,
    },

    /// The table has more layers than ranks can represent.
    #[error("too many layers to rank")]
    TooManyLayers,
}

impl LayerError {
    /// Creates a new `DuplicateLayer` error.
    #[must_use]
    pub fn duplicate_layer(name: impl Into<String>) -> Self {
        Self::DuplicateLayer { name: name.into() }
    }

    /// Creates a new `UnknownLayer` error.
    #[must_use]
    pub fn unknown_layer(prefix: impl Into<String>, layer: impl Into<String>) -> Self {
        Self::UnknownLayer {
            prefix: prefix.into(),
            layer: layer.into(),
        }
    }
}
