//! Scenario and character model.
//!
//! Enumerated characteristics resolve from raw config text through `lookup`,
//! which fails on unknown values so callers can substitute their fallback.
use crate::errors::RecordError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Age substituted when a config row carries an unparsable age.
pub const DEFAULT_AGE: i32 = 18;

/// Species known before any config is read.
pub const DEFAULT_SPECIES: [&str; 5] = ["cat", "dog", "bird", "ferret", "rabbit"];

/// Which group the operator chose to save.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Passengers,
    Pedestrians,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Passengers => "passengers",
            Decision::Pedestrians => "pedestrians",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn lookup_token<T: Copy>(
    field: &'static str,
    raw: &str,
    table: &[(&str, T)],
) -> Result<T, RecordError> {
    let needle = raw.trim();
    table
        .iter()
        .find(|(token, _)| token.eq_ignore_ascii_case(needle))
        .map(|(_, value)| *value)
        .ok_or_else(|| RecordError::InvalidCharacteristic {
            field,
            value: raw.to_string(),
        })
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }

    pub fn lookup(raw: &str) -> Result<Self, RecordError> {
        let table = Self::ALL.map(|value| (value.as_str(), value));
        lookup_token("gender", raw, &table)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BodyType {
    Average,
    Athletic,
    Overweight,
    Unspecified,
}

impl BodyType {
    pub const ALL: [BodyType; 4] = [
        BodyType::Average,
        BodyType::Athletic,
        BodyType::Overweight,
        BodyType::Unspecified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyType::Average => "average",
            BodyType::Athletic => "athletic",
            BodyType::Overweight => "overweight",
            BodyType::Unspecified => "unspecified",
        }
    }

    pub fn lookup(raw: &str) -> Result<Self, RecordError> {
        let table = Self::ALL.map(|value| (value.as_str(), value));
        lookup_token("body type", raw, &table)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Profession {
    Doctor,
    Ceo,
    Criminal,
    Homeless,
    Unemployed,
    Student,
    Professor,
    None,
    Unknown,
}

impl Profession {
    pub const ALL: [Profession; 9] = [
        Profession::Doctor,
        Profession::Ceo,
        Profession::Criminal,
        Profession::Homeless,
        Profession::Unemployed,
        Profession::Student,
        Profession::Professor,
        Profession::None,
        Profession::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profession::Doctor => "doctor",
            Profession::Ceo => "ceo",
            Profession::Criminal => "criminal",
            Profession::Homeless => "homeless",
            Profession::Unemployed => "unemployed",
            Profession::Student => "student",
            Profession::Professor => "professor",
            Profession::None => "none",
            Profession::Unknown => "unknown",
        }
    }

    pub fn lookup(raw: &str) -> Result<Self, RecordError> {
        let table = Self::ALL.map(|value| (value.as_str(), value));
        lookup_token("profession", raw, &table)
    }

    /// Whether the profession names an actual occupation.
    pub fn is_reported(&self) -> bool {
        !matches!(self, Profession::None | Profession::Unknown)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AgeCategory {
    Baby,
    Child,
    Adult,
    Senior,
}

impl AgeCategory {
    pub fn from_age(age: i32) -> Self {
        match age {
            i32::MIN..=4 => AgeCategory::Baby,
            5..=16 => AgeCategory::Child,
            17..=68 => AgeCategory::Adult,
            _ => AgeCategory::Senior,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeCategory::Baby => "baby",
            AgeCategory::Child => "child",
            AgeCategory::Adult => "adult",
            AgeCategory::Senior => "senior",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub gender: Gender,
    pub body_type: BodyType,
    pub age: i32,
    pub pregnant: bool,
    pub profession: Profession,
    pub is_you: bool,
}

impl Person {
    /// Pregnancy is only retained for female persons.
    pub fn new(
        gender: Gender,
        body_type: BodyType,
        age: i32,
        pregnant: bool,
        profession: Profession,
    ) -> Self {
        Self {
            gender,
            body_type,
            age,
            pregnant: pregnant && gender == Gender::Female,
            profession,
            is_you: false,
        }
    }

    pub fn set_as_you(&mut self, is_you: bool) {
        self.is_you = is_you;
    }

    pub fn age_category(&self) -> AgeCategory {
        AgeCategory::from_age(self.age)
    }

    /// Profession shown in reports; only adults carry one.
    pub fn reported_profession(&self) -> Option<Profession> {
        if self.age_category() == AgeCategory::Adult && self.profession.is_reported() {
            Some(self.profession)
        } else {
            None
        }
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_you {
            f.write_str("you ")?;
        }
        write!(f, "{} {}", self.body_type.as_str(), self.age_category().as_str())?;
        if let Some(profession) = self.reported_profession() {
            write!(f, " {}", profession.as_str())?;
        }
        write!(f, " {}", self.gender.as_str())?;
        if self.pregnant {
            f.write_str(" pregnant")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animal {
    pub species: String,
    pub is_pet: bool,
}

impl Animal {
    pub fn new(species: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            is_pet: false,
        }
    }

    pub fn set_pet(&mut self, is_pet: bool) {
        self.is_pet = is_pet;
    }
}

impl fmt::Display for Animal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.species)?;
        if self.is_pet {
            f.write_str(" is pet")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Character {
    Person(Person),
    Animal(Animal),
}

impl Character {
    pub fn as_person(&self) -> Option<&Person> {
        match self {
            Character::Person(person) => Some(person),
            Character::Animal(_) => None,
        }
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Character::Person(person) => fmt::Display::fmt(person, f),
            Character::Animal(animal) => fmt::Display::fmt(animal, f),
        }
    }
}

impl From<Person> for Character {
    fn from(person: Person) -> Self {
        Character::Person(person)
    }
}

impl From<Animal> for Character {
    fn from(animal: Animal) -> Self {
        Character::Animal(animal)
    }
}

/// One crash scenario: two groups and the legality of the crossing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub passengers: Vec<Character>,
    pub pedestrians: Vec<Character>,
    pub legal: bool,
}

impl Scenario {
    pub fn new(passengers: Vec<Character>, pedestrians: Vec<Character>, legal: bool) -> Self {
        Self {
            passengers,
            pedestrians,
            legal,
        }
    }

    pub fn character_count(&self) -> usize {
        self.passengers.len() + self.pedestrians.len()
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "======================================")?;
        writeln!(f, "# Scenario")?;
        writeln!(f, "======================================")?;
        writeln!(
            f,
            "Legal Crossing: {}",
            if self.legal { "yes" } else { "no" }
        )?;
        writeln!(f, "Passengers ({})", self.passengers.len())?;
        for character in &self.passengers {
            writeln!(f, "- {character}")?;
        }
        write!(f, "Pedestrians ({})", self.pedestrians.len())?;
        for character in &self.pedestrians {
            write!(f, "\n- {character}")?;
        }
        Ok(())
    }
}

/// Species accepted for animals, grown as configs name new ones.
///
/// One registry lives for the whole process; the config parser is its only
/// writer.
#[derive(Debug, Clone)]
pub struct SpeciesRegistry {
    known: BTreeSet<String>,
}

impl Default for SpeciesRegistry {
    fn default() -> Self {
        Self {
            known: DEFAULT_SPECIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SpeciesRegistry {
    pub fn contains(&self, species: &str) -> bool {
        self.known.contains(species)
    }

    /// Add a species, returning `true` when it was not known before.
    pub fn insert(&mut self, species: &str) -> bool {
        if self.contains(species) {
            return false;
        }
        self.known.insert(species.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.known.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_ignore_case_and_surrounding_space() {
        assert_eq!(Gender::lookup("Female").unwrap(), Gender::Female);
        assert_eq!(BodyType::lookup(" athletic ").unwrap(), BodyType::Athletic);
        assert_eq!(Profession::lookup("CEO").unwrap(), Profession::Ceo);
        assert!(Gender::lookup("robot").is_err());
        assert!(Profession::lookup("").is_err());
    }

    #[test]
    fn age_categories_cover_boundaries() {
        assert_eq!(AgeCategory::from_age(-5), AgeCategory::Baby);
        assert_eq!(AgeCategory::from_age(4), AgeCategory::Baby);
        assert_eq!(AgeCategory::from_age(5), AgeCategory::Child);
        assert_eq!(AgeCategory::from_age(17), AgeCategory::Adult);
        assert_eq!(AgeCategory::from_age(69), AgeCategory::Senior);
    }

    #[test]
    fn pregnancy_only_sticks_to_females() {
        let male = Person::new(Gender::Male, BodyType::Average, 30, true, Profession::None);
        assert!(!male.pregnant);
        let female = Person::new(Gender::Female, BodyType::Average, 30, true, Profession::None);
        assert!(female.pregnant);
    }

    #[test]
    fn person_display_lists_visible_traits() {
        let mut person = Person::new(
            Gender::Female,
            BodyType::Athletic,
            30,
            true,
            Profession::Doctor,
        );
        person.set_as_you(true);
        assert_eq!(person.to_string(), "you athletic adult doctor female pregnant");

        let child = Person::new(Gender::Male, BodyType::Average, 8, false, Profession::Doctor);
        assert_eq!(child.to_string(), "average child male");
    }

    #[test]
    fn species_registry_reports_new_entries_once() {
        let mut registry = SpeciesRegistry::default();
        assert!(registry.contains("dog"));
        assert!(registry.insert("platypus"));
        assert!(!registry.insert("platypus"));
        assert!(registry.contains("platypus"));
        assert_eq!(registry.iter().count(), DEFAULT_SPECIES.len() + 1);
    }

    #[test]
    fn scenario_display_lists_both_groups() {
        let mut pet = Animal::new("dog");
        pet.set_pet(true);
        let scenario = Scenario::new(
            vec![pet.into()],
            vec![Person::new(Gender::Male, BodyType::Average, 40, false, Profession::Ceo).into()],
            false,
        );
        let text = scenario.to_string();
        assert!(text.contains("Legal Crossing: no"));
        assert!(text.contains("Passengers (1)\n- dog is pet"));
        assert!(text.contains("Pedestrians (1)\n- average adult ceo male"));
    }
}
