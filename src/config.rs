//! Scenario config parsing.
//!
//! A config is a CSV-like file: one caption row, then rows that either open a
//! scenario (`scenario:green`, `scenario:red`) or describe one character.
//! Bad rows are reported and skipped; only a missing file stops the parse.
use crate::errors::{ConfigError, RecordError};
use crate::model::{
    Animal, BodyType, Character, Gender, Person, Profession, Scenario, SpeciesRegistry,
    DEFAULT_AGE,
};
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Number of comma-separated fields every data row must carry.
pub const FIELD_COUNT: usize = 10;
/// Token in field 0 that opens a new scenario.
pub const SCENARIO_MARKER: &str = "scenario:";
/// Species recorded for animal rows that leave the species column empty.
pub const UNKNOWN_SPECIES: &str = "unknown";

const CLASS: usize = 0;
const GENDER: usize = 1;
const AGE: usize = 2;
const BODY_TYPE: usize = 3;
const PROFESSION: usize = 4;
const PREGNANT: usize = 5;
const IS_YOU: usize = 6;
const SPECIES: usize = 7;
const IS_PET: usize = 8;
const ROLE: usize = 9;

/// What to do with the accumulated characters when a scenario marker appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryAction {
    /// Emit the accumulated scenario and start empty.
    Flush,
    /// Keep the accumulated characters for the next scenario.
    Carry,
}

/// Transition table applied at every scenario marker.
///
/// | policy             | both sides filled | one side filled | nothing |
/// |--------------------|-------------------|-----------------|---------|
/// | `RequireBothSides` | Flush             | Carry           | Carry   |
/// | `RequireAnySide`   | Flush             | Flush           | Carry   |
///
/// End of input always flushes, whatever has accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushPolicy {
    #[default]
    RequireBothSides,
    #[cfg_attr(not(test), allow(dead_code))]
    RequireAnySide,
}

impl FlushPolicy {
    pub fn on_boundary(&self, passengers: usize, pedestrians: usize) -> BoundaryAction {
        let ready = match self {
            FlushPolicy::RequireBothSides => passengers > 0 && pedestrians > 0,
            FlushPolicy::RequireAnySide => passengers > 0 || pedestrians > 0,
        };
        if ready {
            BoundaryAction::Flush
        } else {
            BoundaryAction::Carry
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParserOptions {
    pub flush_policy: FlushPolicy,
}

/// A recovered problem in one data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// Data-row number, counting from 1 after the caption row.
    pub line: usize,
    pub error: RecordError,
}

impl ParseWarning {
    pub fn message(&self) -> String {
        self.error.warning(self.line)
    }
}

/// Parsed scenarios in file order plus every warning raised on the way.
#[derive(Debug, Default)]
pub struct ConfigReport {
    pub scenarios: Vec<Scenario>,
    pub warnings: Vec<ParseWarning>,
}

/// Side of the crossing a character row is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Passenger,
    Pedestrian,
}

#[derive(Debug)]
struct PendingScenario {
    passengers: Vec<Character>,
    pedestrians: Vec<Character>,
    legal: bool,
}

impl PendingScenario {
    fn new() -> Self {
        Self {
            passengers: Vec::new(),
            pedestrians: Vec::new(),
            legal: true,
        }
    }

    fn push(&mut self, role: Role, character: Character) {
        match role {
            Role::Passenger => self.passengers.push(character),
            Role::Pedestrian => self.pedestrians.push(character),
        }
    }

    fn take(&mut self) -> Scenario {
        Scenario::new(
            std::mem::take(&mut self.passengers),
            std::mem::take(&mut self.pedestrians),
            self.legal,
        )
    }
}

/// Open and parse the config at `path`.
pub fn read_config(
    path: &Path,
    species: &mut SpeciesRegistry,
    options: ParserOptions,
) -> Result<ConfigReport, ConfigError> {
    let file = File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source: err,
        },
    })?;
    tracing::debug!(path = %path.display(), "reading scenario config");
    Ok(parse_config(BufReader::new(file), species, options))
}

/// Parse config rows from any line source.
///
/// Bytes that are not valid UTF-8 are replaced and the row is parsed as
/// usual. A read failure part-way through is logged and ends the parse with
/// the scenarios completed so far.
pub fn parse_config<R: BufRead>(
    mut reader: R,
    species: &mut SpeciesRegistry,
    options: ParserOptions,
) -> ConfigReport {
    let mut report = ConfigReport::default();
    let mut pending = PendingScenario::new();
    let mut buf = Vec::new();

    // caption row
    if let Err(err) = reader.read_until(b'\n', &mut buf) {
        tracing::error!(error = %err, "failed to read config caption row");
        return report;
    }

    let mut line_number = 0;
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                tracing::error!(error = %err, line = line_number + 1, "config read failed");
                return report;
            }
        }
        line_number += 1;

        let decoded = String::from_utf8_lossy(&buf);
        if matches!(decoded, Cow::Owned(_)) {
            tracing::debug!(line = line_number, "replaced invalid UTF-8 in config row");
        }
        let line = strip_line_ending(&decoded);

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != FIELD_COUNT {
            warn(
                &mut report,
                line_number,
                RecordError::InvalidDataFormat {
                    line: line_number,
                    fields: fields.len(),
                },
            );
            continue;
        }

        if fields[CLASS].contains(SCENARIO_MARKER) {
            let action = options
                .flush_policy
                .on_boundary(pending.passengers.len(), pending.pedestrians.len());
            if action == BoundaryAction::Flush {
                report.scenarios.push(pending.take());
            } else if !pending.passengers.is_empty() || !pending.pedestrians.is_empty() {
                tracing::debug!(
                    line = line_number,
                    passengers = pending.passengers.len(),
                    pedestrians = pending.pedestrians.len(),
                    "carrying characters past scenario marker"
                );
            }
            pending.legal = marker_is_legal(fields[CLASS]);
            continue;
        }

        let (role, character) = parse_character(&fields, line_number, species, &mut report);
        pending.push(role, character);
    }

    report.scenarios.push(pending.take());
    tracing::debug!(
        scenarios = report.scenarios.len(),
        warnings = report.warnings.len(),
        "config parsed"
    );
    report
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// `scenario:green` is a legal crossing; anything else is not.
fn marker_is_legal(class: &str) -> bool {
    class.split(':').nth(1).unwrap_or("").contains("green")
}

fn is_affirmative(raw: &str) -> bool {
    raw == "yes" || raw == "true"
}

fn warn(report: &mut ConfigReport, line: usize, error: RecordError) {
    tracing::warn!(line, %error, "recovered config row");
    report.warnings.push(ParseWarning { line, error });
}

fn parse_character(
    fields: &[&str],
    line: usize,
    species: &mut SpeciesRegistry,
    report: &mut ConfigReport,
) -> (Role, Character) {
    let gender = Gender::lookup(fields[GENDER]).unwrap_or_else(|err| {
        warn(report, line, err);
        Gender::Unknown
    });
    let age = fields[AGE].parse::<i32>().unwrap_or_else(|_| {
        warn(
            report,
            line,
            RecordError::InvalidNumberFormat {
                field: "age",
                value: fields[AGE].to_string(),
            },
        );
        DEFAULT_AGE
    });

    let character = if fields[CLASS] == "person" {
        let body_type = BodyType::lookup(fields[BODY_TYPE]).unwrap_or_else(|err| {
            warn(report, line, err);
            BodyType::Unspecified
        });
        let profession = if fields[PROFESSION].is_empty() {
            Profession::None
        } else {
            Profession::lookup(fields[PROFESSION]).unwrap_or_else(|err| {
                warn(report, line, err);
                Profession::Unknown
            })
        };
        let mut person = Person::new(
            gender,
            body_type,
            age,
            is_affirmative(fields[PREGNANT]),
            profession,
        );
        person.set_as_you(is_affirmative(fields[IS_YOU]));
        Character::Person(person)
    } else {
        let name = if fields[SPECIES].is_empty() {
            warn(
                report,
                line,
                RecordError::InvalidCharacteristic {
                    field: "species",
                    value: String::new(),
                },
            );
            UNKNOWN_SPECIES
        } else {
            fields[SPECIES]
        };
        if species.insert(name) {
            tracing::debug!(species = name, line, "registered new species");
        }
        let mut animal = Animal::new(name);
        animal.set_pet(is_affirmative(fields[IS_PET]));
        Character::Animal(animal)
    };

    let role = if fields[ROLE] == "passenger" {
        Role::Passenger
    } else {
        Role::Pedestrian
    };
    (role, character)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
