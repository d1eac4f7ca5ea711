//! Command-line interface runtime for the Stratum resolver.
//!
//! The module owns argument parsing, configuration bootstrapping, component
//! discovery and output. The interface is designed to be exercised both from
//! the binary entrypoint and from tests where configuration loading and IO
//! streams can be substituted.
//!
//! Exit codes: `0` when a load plan was produced, `1` when a dependency
//! cycle prevents one, `2` for usage, configuration, manifest or I/O
//! failures.

use std::ffi::OsString;
use std::io::{BufWriter, Write};
use std::process::ExitCode;

use camino::Utf8Path;
use cap_std::ambient_authority;
use clap::Parser;
use stratum_config::{Config, Manifest};
use stratum_resolver::{JsonLinesSink, Resolution, Resolver, ResolverPolicy, ScanCache};
use tracing::debug;

mod cli;
mod config;
mod discovery;
mod errors;
mod summary;
mod telemetry;

use cli::{Cli, CliCommand};
use config::split_config_arguments;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;

/// Tracing target for the command-line front end.
pub(crate) const LOG_TARGET: &str = "stratum::cli";

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);

    let result = Cli::try_parse_from(&split.command_arguments)
        .map_err(AppError::CliUsage)
        .and_then(|cli| {
            loader
                .load(&split.config_arguments)
                .map(|config| (cli, config))
        })
        .and_then(|(cli, config)| {
            telemetry::initialise(&config)?;
            execute(&cli.command, &config, stdout)
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::CliUsage(error)) if !error.use_stderr() => {
            drop(write!(stdout, "{error}"));
            ExitCode::SUCCESS
        }
        Err(error) => {
            drop(writeln!(stderr, "{error}"));
            error.exit_code()
        }
    }
}

fn execute<W: Write>(command: &CliCommand, config: &Config, stdout: &mut W) -> Result<(), AppError> {
    let policy = load_policy(config)?;
    let sources = discovery::discover(command.dir())?;
    let mut cache = config.scan_cache().map(ScanCache::load);

    let resolution = Resolver::new(&policy)
        .with_cache(cache.as_mut())
        .resolve(sources);

    if let (Some(path), Some(store)) = (config.scan_cache(), cache.as_ref()) {
        store.save(path)?;
    }

    match command {
        CliCommand::Resolve { events, .. } => write_events(&resolution, events.as_deref(), stdout)?,
        CliCommand::Check { .. } => {
            summary::write_summary(&resolution, stdout).map_err(AppError::WriteSummary)?;
        }
    }

    resolution.into_plan().map(drop).map_err(AppError::from)
}

fn load_policy(config: &Config) -> Result<ResolverPolicy, AppError> {
    let Some(path) = config.manifest() else {
        debug!(target: LOG_TARGET, "no manifest configured; using an empty policy");
        return Ok(ResolverPolicy::default());
    };
    let manifest = Manifest::load(path)?;
    Ok(ResolverPolicy::from_manifest(&manifest)?)
}

fn write_events<W: Write>(
    resolution: &Resolution,
    target: Option<&Utf8Path>,
    stdout: &mut W,
) -> Result<(), AppError> {
    let Some(path) = target else {
        return resolution
            .emit(&mut JsonLinesSink::new(stdout))
            .map_err(AppError::from);
    };
    let file = cap_std::fs::File::create_ambient(path, ambient_authority()).map_err(|source| {
        AppError::CreateEvents {
            path: path.to_path_buf(),
            source,
        }
    })?;
    resolution.emit(&mut JsonLinesSink::new(BufWriter::new(file)))?;
    Ok(())
}
