//! Interactive decision session.
//!
//! The driver owns the prompt loop: consent, one decision per scenario, a
//! statistics report after every batch, and the continue/quit gate for
//! generated scenarios. Input and output are injected so sessions can be
//! scripted.
use crate::audit::{Audit, USER_AUDIT};
use crate::errors::InvalidInput;
use crate::generator::ScenarioGenerator;
use crate::model::{Decision, Scenario};
use crate::prompt::{
    parse_consent, parse_continue, parse_decision, Continue, CLOSING_MESSAGE, CONSENT_PROMPT,
    CONTINUE_PROMPT, DECISION_PROMPT,
};
use crate::templates::WELCOME_ASCII;
use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Scenarios decided between two statistics reports.
pub const BATCH_SIZE: usize = 3;
/// Report destination when consent is given without `--results`.
pub const DEFAULT_RESULTS_PATH: &str = "results.log";

/// Where a session's scenarios come from.
pub enum ScenarioSource {
    /// Parsed config, presented once in file order.
    Configured(Vec<Scenario>),
    /// A fresh batch is generated for every round until the operator quits.
    Generated(ScenarioGenerator),
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub batch_size: usize,
    pub results_path: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE,
            results_path: None,
        }
    }
}

/// How a session ended. Every variant is a normal, successful exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every configured scenario was decided.
    Finished,
    /// The operator declined to continue after a batch.
    Quit,
    /// Input ended while a prompt was waiting.
    InputClosed,
}

pub struct InteractiveDriver<R, W> {
    input: R,
    output: W,
    options: SessionOptions,
    audit: Audit,
    consent: bool,
    batch_counter: usize,
    batch_reports: usize,
}

impl<R: BufRead, W: Write> InteractiveDriver<R, W> {
    pub fn new(input: R, output: W, options: SessionOptions) -> Self {
        Self {
            input,
            output,
            options,
            audit: Audit::new(USER_AUDIT),
            consent: false,
            batch_counter: 0,
            batch_reports: 0,
        }
    }

    pub fn audit(&self) -> &Audit {
        &self.audit
    }

    pub fn consent(&self) -> bool {
        self.consent
    }

    /// Number of batch boundaries reached so far.
    pub fn batch_reports(&self) -> usize {
        self.batch_reports
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn run(&mut self, source: ScenarioSource) -> Result<SessionOutcome> {
        self.print_banner()?;
        match self.ask(CONSENT_PROMPT, parse_consent)? {
            Some(consent) => self.consent = consent,
            None => return Ok(SessionOutcome::InputClosed),
        }
        tracing::debug!(consent = self.consent, "session consent recorded");

        match source {
            ScenarioSource::Configured(scenarios) => self.run_configured(&scenarios),
            ScenarioSource::Generated(generator) => self.run_generated(generator),
        }
    }

    fn batch_size(&self) -> usize {
        self.options.batch_size.max(1)
    }

    fn run_configured(&mut self, scenarios: &[Scenario]) -> Result<SessionOutcome> {
        for scenario in scenarios {
            if !self.decide(scenario)? {
                return Ok(SessionOutcome::InputClosed);
            }
            if self.end_of_batch() {
                self.report()?;
            }
        }

        self.report()?;
        writeln!(self.output, "{CLOSING_MESSAGE}")?;
        self.output.flush()?;
        // any answer, including end of input, closes the session
        self.read_answer()?;
        Ok(SessionOutcome::Finished)
    }

    fn run_generated(&mut self, mut generator: ScenarioGenerator) -> Result<SessionOutcome> {
        loop {
            let scenarios = generator.generate_batch(self.batch_size());
            for scenario in &scenarios {
                if !self.decide(scenario)? {
                    return Ok(SessionOutcome::InputClosed);
                }
                if !self.end_of_batch() {
                    continue;
                }
                self.report()?;
                match self.ask(CONTINUE_PROMPT, parse_continue)? {
                    Some(Continue::Yes) => {}
                    Some(Continue::No) => return Ok(SessionOutcome::Quit),
                    None => return Ok(SessionOutcome::InputClosed),
                }
            }
        }
    }

    fn print_banner(&mut self) -> Result<()> {
        for line in WELCOME_ASCII.lines() {
            writeln!(self.output, "{line}")?;
        }
        Ok(())
    }

    /// Present one scenario and record the operator's decision.
    ///
    /// Returns `false` when input ends before a valid answer.
    fn decide(&mut self, scenario: &Scenario) -> Result<bool> {
        writeln!(self.output, "{scenario}")?;
        let Some(decision) = self.ask(DECISION_PROMPT, parse_decision)? else {
            return Ok(false);
        };
        self.record(scenario, decision);
        Ok(true)
    }

    fn record(&mut self, scenario: &Scenario, decision: Decision) {
        tracing::debug!(
            %decision,
            legal = scenario.legal,
            characters = scenario.character_count(),
            "decision recorded"
        );
        self.audit.record(scenario, decision);
        self.batch_counter += 1;
    }

    /// Reset the batch counter when a batch completes.
    fn end_of_batch(&mut self) -> bool {
        if self.batch_counter < self.batch_size() {
            return false;
        }
        self.batch_counter = 0;
        self.batch_reports += 1;
        true
    }

    fn report(&mut self) -> Result<()> {
        tracing::info!(runs = self.audit.run_count(), "reporting audit statistics");
        self.audit.print_statistic(&mut self.output)?;
        if self.consent {
            let path = self
                .options
                .results_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_PATH));
            self.persist(&path)?;
        }
        Ok(())
    }

    fn persist(&mut self, path: &Path) -> Result<()> {
        if let Err(err) = self.audit.print_to_file(path) {
            tracing::error!(error = %err, "failed to persist statistics");
            writeln!(
                self.output,
                "ERROR: could not save results to {}.",
                path.display()
            )?;
        }
        Ok(())
    }

    /// Prompt until `parse` accepts an answer; `None` when input ends.
    fn ask<T>(
        &mut self,
        prompt: &str,
        parse: fn(&str) -> Result<T, InvalidInput>,
    ) -> Result<Option<T>> {
        loop {
            writeln!(self.output, "{prompt}")?;
            self.output.flush()?;
            let Some(answer) = self.read_answer()? else {
                return Ok(None);
            };
            match parse(&answer) {
                Ok(value) => return Ok(Some(value)),
                Err(err) => {
                    tracing::debug!(answer = %err.answer, "rejected answer");
                    write!(self.output, "{err}")?;
                }
            }
        }
    }

    /// One line of input with its line ending removed; bytes that are not
    /// valid UTF-8 are replaced so the answer is rejected like any other.
    fn read_answer(&mut self) -> Result<Option<String>> {
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&buf);
        Ok(Some(line.trim_end_matches(&['\n', '\r'][..]).to_string()))
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
