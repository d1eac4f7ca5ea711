//! Configuration for the Stratum resolver.
//!
//! Two kinds of configuration live here:
//!
//! - [`Config`] holds runtime settings for the binary (log filter and format,
//!   manifest and scan cache locations). It is layered by `ortho_config`
//!   from defaults, an optional TOML file (`--config-path` or
//!   `STRATUM_CONFIG_PATH`), `STRATUM_*` environment variables and CLI flags,
//!   with later layers winning.
//! - [`Manifest`] is the YAML policy document describing the layer order,
//!   prefix conventions, forced orders and per-component overrides that the
//!   resolver consumes.

mod defaults;
mod logging;
mod manifest;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, default_log_filter, default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use manifest::{Manifest, ManifestError, SeveritySettings};

/// Runtime settings shared by the `stratum` binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "STRATUM")]
pub struct Config {
    /// Tracing filter expression, in `EnvFilter` syntax.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format of the log stream written to stderr.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Path of the YAML policy manifest. No manifest means an empty policy.
    #[serde(default)]
    pub manifest: Option<Utf8PathBuf>,
    /// Path of the persisted scan cache. No path disables persistence.
    #[serde(default)]
    pub scan_cache: Option<Utf8PathBuf>,
}

impl Config {
    /// Returns the tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the manifest path, if configured.
    #[must_use]
    pub fn manifest(&self) -> Option<&camino::Utf8Path> {
        self.manifest.as_deref()
    }

    /// Returns the scan cache path, if configured.
    #[must_use]
    pub fn scan_cache(&self) -> Option<&camino::Utf8Path> {
        self.scan_cache.as_deref()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            manifest: None,
            scan_cache: None,
        }
    }
}
