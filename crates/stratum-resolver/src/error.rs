//! Error types for a resolution run.

use std::io;

use camino::Utf8PathBuf;
use stratum_graph::{ComponentId, CycleError};
use stratum_layers::LayerError;
use stratum_syntax::SyntaxError;
use thiserror::Error;

/// A component whose source could not be analysed.
///
/// The component stays in the graph without static dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to scan '{id}': {message}")]
pub struct ScanError {
    id: ComponentId,
    message: String,
    line: Option<u32>,
    column: Option<u32>,
}

impl ScanError {
    /// Creates a scan error without a source location.
    #[must_use]
    pub fn new(id: impl Into<ComponentId>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Creates a scan error from a parser failure, keeping its location.
    #[must_use]
    pub fn from_syntax(id: impl Into<ComponentId>, error: &SyntaxError) -> Self {
        let location = error.location();
        Self {
            id: id.into(),
            message: error.to_string(),
            line: location.map(|(line, _)| line),
            column: location.map(|(_, column)| column),
        }
    }

    /// Returns the component that failed to scan.
    #[must_use]
    pub const fn id(&self) -> &ComponentId {
        &self.id
    }

    /// Returns the failure description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the one-based line of the failure, when known.
    #[must_use]
    pub const fn line(&self) -> Option<u32> {
        self.line
    }

    /// Returns the one-based column of the failure, when known.
    #[must_use]
    pub const fn column(&self) -> Option<u32> {
        self.column
    }
}

/// Errors raised while turning a manifest into a resolver policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The layer, prefix or severity tables are inconsistent.
    #[error("invalid layer policy: {0}")]
    Layers(#[from] LayerError),
}

/// Errors raised while writing diagnostic events.
#[derive(Debug, Error)]
pub enum EmitError {
    /// An event could not be serialised.
    #[error("failed to serialise diagnostic event: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The sink could not be written.
    #[error("failed to write diagnostic event: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while persisting the scan cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache could not be serialised.
    #[error("failed to serialise scan cache: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The cache file could not be written.
    #[error("failed to write scan cache '{path}': {source}")]
    Write {
        /// Destination of the cache.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Failure of [`crate::resolve_and_emit`].
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No load order exists, even after forced overrides.
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// The diagnostic stream could not be written.
    #[error(transparent)]
    Emit(#[from] EmitError),
}
