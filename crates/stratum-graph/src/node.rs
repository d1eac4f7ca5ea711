//! Component identities and descriptors.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Globally unique, stable identity of a loadable component.
///
/// Identifiers order lexicographically, which is the tie-break used
/// everywhere a deterministic order is required.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Creates a component identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ComponentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for ComponentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One loadable unit as seen by the resolver.
///
/// Descriptors are created once per run and not mutated after they are
/// registered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ComponentDescriptor {
    id: ComponentId,
    declared_layer: Option<String>,
    static_dependencies: BTreeSet<ComponentId>,
    manual_dependencies: BTreeSet<ComponentId>,
}

impl ComponentDescriptor {
    /// Creates a descriptor with no layer and no dependencies.
    #[must_use]
    pub fn new(id: impl Into<ComponentId>) -> Self {
        Self {
            id: id.into(),
            declared_layer: None,
            static_dependencies: BTreeSet::new(),
            manual_dependencies: BTreeSet::new(),
        }
    }

    /// Sets the explicitly declared layer name.
    #[must_use]
    pub fn with_declared_layer(mut self, layer: impl Into<String>) -> Self {
        self.declared_layer = Some(layer.into());
        self
    }

    /// Adds dependencies discovered by the source scanner.
    #[must_use]
    pub fn with_static_dependencies<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ComponentId>,
    {
        self.static_dependencies
            .extend(ids.into_iter().map(Into::into));
        self
    }

    /// Adds explicitly declared "depends-on" dependencies.
    #[must_use]
    pub fn with_manual_dependencies<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ComponentId>,
    {
        self.manual_dependencies
            .extend(ids.into_iter().map(Into::into));
        self
    }

    /// Returns the component identifier.
    #[must_use]
    pub const fn id(&self) -> &ComponentId {
        &self.id
    }

    /// Returns the declared layer name, if any.
    #[must_use]
    pub fn declared_layer(&self) -> Option<&str> {
        self.declared_layer.as_deref()
    }

    /// Returns the statically discovered dependencies.
    #[must_use]
    pub const fn static_dependencies(&self) -> &BTreeSet<ComponentId> {
        &self.static_dependencies
    }

    /// Returns the manually declared dependencies.
    #[must_use]
    pub const fn manual_dependencies(&self) -> &BTreeSet<ComponentId> {
        &self.manual_dependencies
    }
}
