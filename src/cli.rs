//! Command-line handling for the session.
//!
//! Arguments are acted on strictly left to right, so `-c` must come before
//! `-i` for the interactive session to use the parsed config. Unrecognized
//! arguments are ignored.
use crate::config::{read_config, ParserOptions};
use crate::errors::ConfigError;
use crate::generator::ScenarioGenerator;
use crate::model::{Scenario, SpeciesRegistry};
use crate::session::{InteractiveDriver, ScenarioSource, SessionOptions};
use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::io::{BufRead, Write};
use std::path::PathBuf;

pub const BIN_NAME: &str = "ethical-engine";

/// One action requested on the command line, in argument order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// `-c/--config <path>`: parse the config immediately.
    Config(PathBuf),
    /// `-r/--results <path>`: where consented statistics are written.
    Results(PathBuf),
    /// `-i/--interactive`: run the session; nothing after it is read.
    Interactive,
    /// `-h/--help`, or a value option with no value; nothing after it is read.
    Help,
}

/// Translate raw arguments (without the program name) into ordered steps.
pub fn parse_invocation(args: &[String]) -> Vec<Step> {
    let mut steps = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let step = match arg.as_str() {
            "-c" | "--config" => match iter.next() {
                Some(path) => Step::Config(PathBuf::from(path)),
                None => Step::Help,
            },
            "-r" | "--results" => match iter.next() {
                Some(path) => Step::Results(PathBuf::from(path)),
                None => Step::Help,
            },
            "-h" | "--help" => Step::Help,
            "-i" | "--interactive" => Step::Interactive,
            other => {
                tracing::debug!(arg = other, "ignoring unrecognized argument");
                continue;
            }
        };
        let terminal = matches!(step, Step::Help | Step::Interactive);
        steps.push(step);
        if terminal {
            break;
        }
    }
    steps
}

fn help_command(args: &[String]) -> Command {
    let mut usage = BIN_NAME.to_string();
    for arg in args {
        usage.push(' ');
        usage.push_str(arg);
    }
    Command::new(BIN_NAME)
        .override_usage(usage)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Optional: path to config file"),
        )
        .arg(
            Arg::new("help")
                .short('h')
                .long("help")
                .action(ArgAction::SetTrue)
                .help("Print help (this message) and exit"),
        )
        .arg(
            Arg::new("results")
                .short('r')
                .long("results")
                .value_name("PATH")
                .help("Optional: path to result log file"),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .action(ArgAction::SetTrue)
                .help("Optional: launches interactive mode"),
        )
}

/// Help text whose usage line echoes the arguments actually received.
pub fn help_text(args: &[String]) -> String {
    help_command(args).render_help().to_string()
}

/// Run the steps for `args` against the given console.
pub fn run<R: BufRead, W: Write>(args: &[String], input: R, mut output: W) -> Result<()> {
    let mut species = SpeciesRegistry::default();
    let mut scenarios: Option<Vec<Scenario>> = None;
    let mut results_path: Option<PathBuf> = None;

    for step in parse_invocation(args) {
        match step {
            Step::Config(path) => {
                match read_config(&path, &mut species, ParserOptions::default()) {
                    Ok(report) => {
                        for warning in &report.warnings {
                            writeln!(output, "{}", warning.message())?;
                        }
                        tracing::info!(
                            path = %path.display(),
                            scenarios = report.scenarios.len(),
                            "loaded scenario config"
                        );
                        scenarios = Some(report.scenarios);
                    }
                    Err(err) => {
                        match &err {
                            ConfigError::NotFound(missing) => {
                                tracing::warn!(path = %missing.display(), "config file not found");
                            }
                            ConfigError::Io { .. } => {
                                tracing::error!(error = %err, "config could not be opened");
                            }
                        }
                        writeln!(output, "{err}")?;
                        return Ok(());
                    }
                }
            }
            Step::Results(path) => results_path = Some(path),
            Step::Help => {
                write!(output, "{}", help_text(args))?;
                return Ok(());
            }
            Step::Interactive => {
                let source = match scenarios.take() {
                    Some(scenarios) => ScenarioSource::Configured(scenarios),
                    None => ScenarioSource::Generated(ScenarioGenerator::new(&species)),
                };
                let options = SessionOptions {
                    results_path: results_path.take(),
                    ..SessionOptions::default()
                };
                let mut driver = InteractiveDriver::new(input, output, options);
                let outcome = driver.run(source)?;
                tracing::info!(
                    ?outcome,
                    runs = driver.audit().run_count(),
                    batches = driver.batch_reports(),
                    consent = driver.consent(),
                    "session ended"
                );
                driver.into_output().flush()?;
                return Ok(());
            }
        }
    }
    Ok(())
}
