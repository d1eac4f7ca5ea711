//! Input records handed to the resolver by the host.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use stratum_graph::ComponentId;
use stratum_syntax::SupportedLanguage;

/// One component as supplied by the host: identity, source and overrides.
///
/// Only the id, optional declared layer and manual dependencies are read
/// from the component itself; everything else is derived from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSource {
    id: ComponentId,
    language: Option<SupportedLanguage>,
    path: Option<PathBuf>,
    source_text: String,
    declared_layer: Option<String>,
    manual_dependencies: BTreeSet<ComponentId>,
}

impl ComponentSource {
    /// Creates a Python component from its id and source text.
    #[must_use]
    pub fn new(id: impl Into<ComponentId>, source_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            language: Some(SupportedLanguage::default()),
            path: None,
            source_text: source_text.into(),
            declared_layer: None,
            manual_dependencies: BTreeSet::new(),
        }
    }

    /// Sets the source language explicitly.
    #[must_use]
    pub fn with_language(mut self, language: SupportedLanguage) -> Self {
        self.language = Some(language);
        self
    }

    /// Records the file the source came from and detects the language from
    /// its extension. An unrecognised extension leaves the language unknown,
    /// which fails the scan for this component only.
    #[must_use]
    pub fn with_path(mut self, file: impl Into<PathBuf>) -> Self {
        let path: PathBuf = file.into();
        self.language = SupportedLanguage::from_path(&path);
        self.path = Some(path);
        self
    }

    /// Sets the declared layer name.
    #[must_use]
    pub fn with_declared_layer(mut self, layer: impl Into<String>) -> Self {
        self.declared_layer = Some(layer.into());
        self
    }

    /// Adds dependencies that static analysis cannot see.
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

    /// Returns the component id.
    #[must_use]
    pub const fn id(&self) -> &ComponentId {
        &self.id
    }

    /// Returns the source language, if known.
    #[must_use]
    pub const fn language(&self) -> Option<SupportedLanguage> {
        self.language
    }

    /// Returns the originating file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the source text.
    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// Returns the declared layer name.
    #[must_use]
    pub fn declared_layer(&self) -> Option<&str> {
        self.declared_layer.as_deref()
    }

    /// Returns the manual dependencies.
    #[must_use]
    pub const fn manual_dependencies(&self) -> &BTreeSet<ComponentId> {
        &self.manual_dependencies
    }
}
