//! CLI argument definitions for the Stratum resolver.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Command-line interface for the Stratum load-order resolver.
///
/// Configuration flags (`--config-path`, `--log-filter`, `--log-format`,
/// `--manifest`, `--scan-cache`) are split off before this parser runs, so
/// they must precede the subcommand.
#[derive(Parser, Debug)]
#[command(name = "stratum", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// The action to perform.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Structured subcommands for the Stratum CLI.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Resolves the components in a directory and writes the event stream.
    Resolve {
        /// Directory holding the components.
        #[arg(value_name = "DIR")]
        dir: Utf8PathBuf,
        /// Writes events to this file instead of stdout.
        #[arg(long, value_name = "FILE")]
        events: Option<Utf8PathBuf>,
    },
    /// Resolves the components in a directory and prints a short summary.
    Check {
        /// Directory holding the components.
        #[arg(value_name = "DIR")]
        dir: Utf8PathBuf,
    },
}

impl CliCommand {
    /// Returns the component directory of either subcommand.
    pub(crate) const fn dir(&self) -> &Utf8PathBuf {
        match self {
            Self::Resolve { dir, .. } | Self::Check { dir } => dir,
        }
    }
}
