//! Violation severity and the distance thresholds that select it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LayerError;

/// How far a violating edge reaches across the layer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Crossing below the medium threshold.
    Low,
    /// Crossing at or above the medium threshold.
    Medium,
    /// Crossing at or above the high threshold.
    High,
}

impl Severity {
    /// Returns the lower-case label used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tier distances at which a violation escalates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeverityThresholds {
    medium_from: u32,
    high_from: u32,
}

impl SeverityThresholds {
    /// Default distance at which a violation becomes [`Severity::Medium`].
    pub const DEFAULT_MEDIUM_FROM: u32 = 2;
    /// Default distance at which a violation becomes [`Severity::High`].
    pub const DEFAULT_HIGH_FROM: u32 = 3;

    /// Creates thresholds, requiring `1 <= medium_from <= high_from`.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::InvalidThresholds`] when the bounds are out of
    /// order.
    pub const fn new(medium_from: u32, high_from: u32) -> Result<Self, LayerError> {
        if medium_from == 0 || medium_from > high_from {
            return Err(LayerError::InvalidThresholds {
                medium_from,
                high_from,
            });
        }
        Ok(Self {
            medium_from,
            high_from,
        })
    }

    /// Returns the distance at which violations become medium.
    #[must_use]
    pub const fn medium_from(&self) -> u32 {
        self.medium_from
    }

    /// Returns the distance at which violations become high.
    #[must_use]
    pub const fn high_from(&self) -> u32 {
        self.high_from
    }

    /// Maps a tier distance to a severity.
    #[must_use]
    pub const fn classify(&self, distance: u32) -> Severity {
        if distance >= self.high_from {
            Severity::High
        } else if distance >= self.medium_from {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            medium_from: Self::DEFAULT_MEDIUM_FROM,
            high_from: Self::DEFAULT_HIGH_FROM,
        }
    }
}
