//! Error types and exit codes for the CLI runtime.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8PathBuf;
use stratum_config::ManifestError;
use stratum_resolver::{CacheError, CycleError, EmitError, PolicyError};
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Exit status when no acyclic load order exists.
pub(crate) const EXIT_CYCLE: u8 = 1;

/// Exit status for usage, configuration and I/O failures.
pub(crate) const EXIT_FAILURE: u8 = 2;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Manifest(#[from] Box<ManifestError>),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error("failed to read components from '{path}': {source}")]
    Discover { path: Utf8PathBuf, source: io::Error },
    #[error("failed to create event file '{path}': {source}")]
    CreateEvents { path: Utf8PathBuf, source: io::Error },
    #[error(transparent)]
    Emit(#[from] EmitError),
    #[error(transparent)]
    SaveCache(#[from] CacheError),
    #[error("failed to write summary: {0}")]
    WriteSummary(io::Error),
    #[error(transparent)]
    Cycle(#[from] CycleError),
}

impl AppError {
    /// Returns the process exit code for this failure.
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::Cycle(_) => ExitCode::from(EXIT_CYCLE),
            Self::CliUsage(error) if !error.use_stderr() => ExitCode::SUCCESS,
            _ => ExitCode::from(EXIT_FAILURE),
        }
    }
}

impl From<ManifestError> for AppError {
    fn from(error: ManifestError) -> Self {
        Self::Manifest(Box::new(error))
    }
}
