//! Dependency edge representation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::node::ComponentId;

/// Provenance of a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeOrigin {
    /// Discovered by scanning component source.
    Static,
    /// Declared by the component as an explicit "depends-on".
    Manual,
    /// Imposed by the central force-order override list.
    Forced,
}

impl EdgeOrigin {
    /// Returns the lower-case label used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Manual => "manual",
            Self::Forced => "forced",
        }
    }
}

impl fmt::Display for EdgeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed dependency: `from` must be initialised strictly after `to`.
///
/// Edges order by `(from, to, origin)`, which is the order they are stored
/// and emitted in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct DependencyEdge {
    from: ComponentId,
    to: ComponentId,
    origin: EdgeOrigin,
}

impl DependencyEdge {
    /// Creates a new edge.
    #[must_use]
    pub fn new(from: impl Into<ComponentId>, to: impl Into<ComponentId>, origin: EdgeOrigin) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            origin,
        }
    }

    /// Returns the dependent component.
    #[must_use]
    pub const fn from(&self) -> &ComponentId {
        &self.from
    }

    /// Returns the component depended upon.
    #[must_use]
    pub const fn to(&self) -> &ComponentId {
        &self.to
    }

    /// Returns how the edge was discovered.
    #[must_use]
    pub const fn origin(&self) -> EdgeOrigin {
        self.origin
    }

    /// Returns whether both endpoints are the same component.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    /// Returns whether `other` connects the same endpoints in the opposite
    /// direction, regardless of origin.
    #[must_use]
    pub fn is_reverse_of(&self, other: &Self) -> bool {
        self.from == other.to && self.to == other.from
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.from, self.to, self.origin)
    }
}
