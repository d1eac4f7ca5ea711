//! CLI entrypoint for the Stratum load-order resolver.
//!
//! The binary delegates to [`stratum_cli::run`], which loads configuration,
//! discovers components, resolves them and streams diagnostic events.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    stratum_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
