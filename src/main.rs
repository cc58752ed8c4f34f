use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod audit;
mod cli;
mod config;
mod errors;
mod generator;
mod model;
mod prompt;
mod session;
mod templates;

/// Diagnostics go to stderr so prompts on stdout stay clean.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let stdin = io::stdin();
    if let Err(err) = cli::run(&args, stdin.lock(), io::stdout()) {
        // console failures end the session but never the exit status
        tracing::error!(error = %format!("{err:#}"), "session aborted");
    }
    ExitCode::SUCCESS
}
