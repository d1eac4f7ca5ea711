//! The YAML policy manifest consumed by the resolver.
//!
//! ```yaml
//! layers: [core, infra, service, ui]
//! prefixes:
//!   infra_: infra
//!   ui_: ui
//! forced_order:
//!   - legacy_menu>ui_panel
//! declared_layers:
//!   widget: ui
//! manual_dependencies:
//!   ui_panel: [core_registry]
//! markers: [requires, depends_on]
//! package_roots: [my_addon]
//! severity:
//!   medium_from: 2
//!   high_from: 3
//! ```
//!
//! Every key is optional. The manifest is only parsed here; checking layer
//! names against each other is left to the resolver policy.

use std::collections::BTreeMap;
use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use stratum_graph::{ForcedOrder, GraphError};
use thiserror::Error;

const INLINE_ORIGIN: &str = "<inline>";

/// Severity threshold overrides. Missing values keep the resolver defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeveritySettings {
    /// Distance at which a violation becomes medium.
    #[serde(default)]
    pub medium_from: Option<u32>,
    /// Distance at which a violation becomes high.
    #[serde(default)]
    pub high_from: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    layers: Vec<String>,
    #[serde(default)]
    prefixes: BTreeMap<String, String>,
    #[serde(default)]
    forced_order: Vec<String>,
    #[serde(default)]
    declared_layers: BTreeMap<String, String>,
    #[serde(default)]
    manual_dependencies: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    markers: Option<Vec<String>>,
    #[serde(default)]
    package_roots: Vec<String>,
    #[serde(default)]
    severity: SeveritySettings,
}

/// Resolver policy as written by the host maintainers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Layer names, lowest tier first.
    pub layers: Vec<String>,
    /// Component id prefix to layer name.
    pub prefixes: BTreeMap<String, String>,
    /// Centrally maintained ordering overrides.
    pub forced_order: Vec<ForcedOrder>,
    /// Explicit layer per component id, applied when the component does not
    /// declare one itself.
    pub declared_layers: BTreeMap<String, String>,
    /// Dependencies invisible to the scanner, per component id.
    pub manual_dependencies: BTreeMap<String, Vec<String>>,
    /// Side-effect marker names. `None` keeps the scanner default.
    pub markers: Option<Vec<String>>,
    /// Dotted package names under which components are also imported, as
    /// in `my_addon.ui_panel`.
    pub package_roots: Vec<String>,
    /// Severity threshold overrides.
    pub severity: SeveritySettings,
}

impl Manifest {
    /// Parses a manifest from YAML text. Blank text yields an empty manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] for malformed YAML or unknown keys and
    /// [`ManifestError::ForcedOrder`] for an entry not shaped `after>before`.
    pub fn from_yaml_str(text: &str) -> Result<Self, ManifestError> {
        Self::parse(text, INLINE_ORIGIN)
    }

    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Read`] when the file cannot be read, otherwise
    /// the errors of [`Manifest::from_yaml_str`].
    pub fn load(path: &Utf8Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path.as_str())
    }

    fn parse(text: &str, origin: &str) -> Result<Self, ManifestError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawManifest =
            serde_saphyr::from_str(text).map_err(|source| ManifestError::Parse {
                origin: origin.to_owned(),
                source: Box::new(source),
            })?;

        let forced_order = raw
            .forced_order
            .iter()
            .map(|entry| {
                entry
                    .parse::<ForcedOrder>()
                    .map_err(|source| ManifestError::ForcedOrder {
                        origin: origin.to_owned(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            layers: raw.layers,
            prefixes: raw.prefixes,
            forced_order,
            declared_layers: raw.declared_layers,
            manual_dependencies: raw.manual_dependencies,
            markers: raw.markers,
            package_roots: raw.package_roots,
            severity: raw.severity,
        })
    }
}

/// Errors raised while loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest '{path}': {source}")]
    Read {
        /// Path of the manifest.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The manifest is not valid YAML or has an unexpected shape.
    #[error("failed to parse manifest '{origin}': {source}")]
    Parse {
        /// Path of the manifest, or `<inline>` for text.
        origin: String,
        /// Underlying YAML failure.
        #[source]
        source: Box<serde_saphyr::Error>,
    },

    /// A `forced_order` entry is malformed.
    #[error("invalid forced order in manifest '{origin}': {source}")]
    ForcedOrder {
        /// Path of the manifest, or `<inline>` for text.
        origin: String,
        /// The parse failure.
        #[source]
        source: GraphError,
    },
}
