//! Decision audit: records each judged scenario and reports survival ratios.
//!
//! Every characteristic of every character counts as "seen" once per recorded
//! scenario and as "saved" when that character's group was chosen.
use crate::model::{Character, Decision, Scenario};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Audit type used for operator-driven sessions.
pub const USER_AUDIT: &str = "User";

const RULE: &str = "======================================";

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    seen: u32,
    saved: u32,
}

/// One characteristic and the share of its bearers that were saved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurvivalRatio {
    pub tag: String,
    pub ratio: f64,
}

/// Snapshot of the audit at a point in the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub audit_type: String,
    pub runs: usize,
    pub ratios: Vec<SurvivalRatio>,
    pub average_saved_age: f64,
}

impl Statistics {
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(RULE);
        out.push('\n');
        out.push_str(&format!("# {} Audit\n", self.audit_type));
        out.push_str(RULE);
        out.push('\n');
        out.push_str(&format!("- % SAVED AFTER {} RUNS\n", self.runs));
        for entry in &self.ratios {
            out.push_str(&format!("{}: {:.2}\n", entry.tag, entry.ratio));
        }
        out.push_str("--\n");
        out.push_str(&format!("average age: {:.2}\n", self.average_saved_age));
        out
    }
}

pub struct Audit {
    audit_type: String,
    records: Vec<(Scenario, Decision)>,
    tallies: BTreeMap<String, Tally>,
    saved_age_total: i64,
    saved_people: u32,
}

impl Audit {
    pub fn new(audit_type: &str) -> Self {
        Self {
            audit_type: audit_type.to_string(),
            records: Vec::new(),
            tallies: BTreeMap::new(),
            saved_age_total: 0,
            saved_people: 0,
        }
    }

    pub fn run_count(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub fn records(&self) -> &[(Scenario, Decision)] {
        &self.records
    }

    pub fn record(&mut self, scenario: &Scenario, decision: Decision) {
        let (saved, lost) = match decision {
            Decision::Passengers => (&scenario.passengers, &scenario.pedestrians),
            Decision::Pedestrians => (&scenario.pedestrians, &scenario.passengers),
        };
        let legality = if scenario.legal { "green" } else { "red" };
        let (saved_side, lost_side) = match decision {
            Decision::Passengers => ("passenger", "pedestrian"),
            Decision::Pedestrians => ("pedestrian", "passenger"),
        };

        for character in saved {
            self.tally_character(character, &[legality, saved_side], true);
            if let Some(person) = character.as_person() {
                self.saved_age_total += i64::from(person.age);
                self.saved_people += 1;
            }
        }
        for character in lost {
            self.tally_character(character, &[legality, lost_side], false);
        }
        self.records.push((scenario.clone(), decision));
    }

    fn tally_character(&mut self, character: &Character, context: &[&str], saved: bool) {
        let mut tags: Vec<String> = context.iter().map(|tag| tag.to_string()).collect();
        tags.extend(characteristic_tags(character));
        for tag in tags {
            let tally = self.tallies.entry(tag).or_default();
            tally.seen += 1;
            if saved {
                tally.saved += 1;
            }
        }
    }

    pub fn statistics(&self) -> Statistics {
        let mut ratios: Vec<SurvivalRatio> = self
            .tallies
            .iter()
            .filter(|(_, tally)| tally.seen > 0)
            .map(|(tag, tally)| SurvivalRatio {
                tag: tag.clone(),
                ratio: f64::from(tally.saved) / f64::from(tally.seen),
            })
            .collect();
        // BTreeMap order already sorts tags; a stable sort keeps it for ties.
        ratios.sort_by(|a, b| b.ratio.total_cmp(&a.ratio));
        let average_saved_age = if self.saved_people == 0 {
            0.0
        } else {
            self.saved_age_total as f64 / f64::from(self.saved_people)
        };
        Statistics {
            audit_type: self.audit_type.clone(),
            runs: self.records.len(),
            ratios,
            average_saved_age,
        }
    }

    /// Print the current statistics to `out`.
    pub fn print_statistic<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(self.statistics().render().as_bytes())
            .context("write statistics")?;
        Ok(())
    }

    /// Append the current statistics to the report at `path`.
    ///
    /// A `.json` path receives one JSON snapshot per line instead of the text
    /// report.
    pub fn print_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create results dir {}", parent.display()))?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open {}", path.display()))?;
        let stats = self.statistics();
        let text = if path.extension().is_some_and(|ext| ext == "json") {
            let mut line = serde_json::to_string(&stats).context("serialize statistics")?;
            line.push('\n');
            line
        } else {
            stats.render()
        };
        file.write_all(text.as_bytes())
            .with_context(|| format!("write {}", path.display()))?;
        tracing::info!(path = %path.display(), runs = stats.runs, "persisted audit statistics");
        Ok(())
    }
}

fn characteristic_tags(character: &Character) -> Vec<String> {
    match character {
        Character::Person(person) => {
            let mut tags = vec![
                "person".to_string(),
                person.age_category().as_str().to_string(),
                person.gender.as_str().to_string(),
                person.body_type.as_str().to_string(),
            ];
            if let Some(profession) = person.reported_profession() {
                tags.push(profession.as_str().to_string());
            }
            if person.pregnant {
                tags.push("pregnant".to_string());
            }
            if person.is_you {
                tags.push("you".to_string());
            }
            tags
        }
        Character::Animal(animal) => {
            let mut tags = vec!["animal".to_string(), animal.species.clone()];
            if animal.is_pet {
                tags.push("pet".to_string());
            }
            tags
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Animal, BodyType, Gender, Person, Profession};

    fn doctor() -> Character {
        Person::new(Gender::Female, BodyType::Athletic, 40, false, Profession::Doctor).into()
    }

    fn dog() -> Character {
        let mut animal = Animal::new("dog");
        animal.set_pet(true);
        animal.into()
    }

    fn ratio(stats: &Statistics, tag: &str) -> f64 {
        stats
            .ratios
            .iter()
            .find(|entry| entry.tag == tag)
            .map(|entry| entry.ratio)
            .unwrap_or_else(|| panic!("missing tag {tag}"))
    }

    #[test]
    fn ratios_reflect_saved_groups() {
        let mut audit = Audit::new(USER_AUDIT);
        let scenario = Scenario::new(vec![doctor()], vec![dog()], true);
        audit.record(&scenario, Decision::Passengers);
        audit.record(&scenario, Decision::Pedestrians);

        let stats = audit.statistics();
        assert_eq!(stats.runs, 2);
        assert_eq!(ratio(&stats, "doctor"), 0.5);
        assert_eq!(ratio(&stats, "pet"), 0.5);
        assert_eq!(ratio(&stats, "green"), 0.5);
        assert_eq!(ratio(&stats, "passenger"), 0.5);
        assert_eq!(stats.average_saved_age, 40.0);
    }

    #[test]
    fn ratios_are_sorted_descending() {
        let mut audit = Audit::new(USER_AUDIT);
        audit.record(&Scenario::new(vec![doctor()], vec![dog()], false), Decision::Passengers);
        let stats = audit.statistics();
        let values: Vec<f64> = stats.ratios.iter().map(|entry| entry.ratio).collect();
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| b.total_cmp(a));
        assert_eq!(values, sorted);
        assert_eq!(ratio(&stats, "dog"), 0.0);
        assert_eq!(ratio(&stats, "red"), 0.5);
    }

    #[test]
    fn empty_scenario_is_recorded_without_tags() {
        let mut audit = Audit::new(USER_AUDIT);
        audit.record(&Scenario::new(Vec::new(), Vec::new(), true), Decision::Pedestrians);
        let stats = audit.statistics();
        assert_eq!(stats.runs, 1);
        assert!(stats.ratios.is_empty());
        assert!(stats.render().contains("- % SAVED AFTER 1 RUNS"));
    }

    #[test]
    fn report_is_appended_to_results_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("logs").join("results.log");
        let mut audit = Audit::new("Test");
        audit.record(&Scenario::new(vec![doctor()], vec![dog()], true), Decision::Passengers);
        audit.print_to_file(&path).expect("first write");
        audit.print_to_file(&path).expect("second write");

        let text = std::fs::read_to_string(&path).expect("read results");
        assert_eq!(text.matches("# Test Audit").count(), 2);
        assert!(text.contains("doctor: 1.00"));
    }

    #[test]
    fn json_results_path_gets_snapshots() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("results.json");
        let mut audit = Audit::new(USER_AUDIT);
        audit.record(&Scenario::new(vec![doctor()], vec![dog()], true), Decision::Pedestrians);
        audit.print_to_file(&path).expect("write json");

        let text = std::fs::read_to_string(&path).expect("read results");
        let value: serde_json::Value =
            serde_json::from_str(text.lines().next().expect("one line")).expect("parse json");
        assert_eq!(value["runs"], 1);
        assert_eq!(value["audit_type"], "User");
    }
}
