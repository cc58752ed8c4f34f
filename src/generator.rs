//! Random scenario generation for sessions without a config.
use crate::model::{
    AgeCategory, Animal, BodyType, Character, Gender, Person, Profession, Scenario,
    SpeciesRegistry,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

const GROUP_SIZE: RangeInclusive<usize> = 1..=5;
const AGE_RANGE: RangeInclusive<i32> = 0..=90;
const PERSON_PROBABILITY: f64 = 0.75;
const PET_PROBABILITY: f64 = 0.5;
const PREGNANT_PROBABILITY: f64 = 0.15;
const YOU_PROBABILITY: f64 = 0.2;

const GENDERS: [Gender; 2] = [Gender::Male, Gender::Female];
const BODY_TYPES: [BodyType; 3] = [BodyType::Average, BodyType::Athletic, BodyType::Overweight];
const PROFESSIONS: [Profession; 8] = [
    Profession::Doctor,
    Profession::Ceo,
    Profession::Criminal,
    Profession::Homeless,
    Profession::Unemployed,
    Profession::Student,
    Profession::Professor,
    Profession::None,
];

pub struct ScenarioGenerator {
    rng: StdRng,
    species: Vec<String>,
}

impl ScenarioGenerator {
    pub fn new(species: &SpeciesRegistry) -> Self {
        Self::from_rng(StdRng::from_entropy(), species)
    }

    #[cfg(test)]
    pub fn with_seed(seed: u64, species: &SpeciesRegistry) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), species)
    }

    fn from_rng(rng: StdRng, species: &SpeciesRegistry) -> Self {
        Self {
            rng,
            species: species.iter().map(str::to_string).collect(),
        }
    }

    pub fn generate(&mut self) -> Scenario {
        let legal = self.rng.gen_bool(0.5);
        let passenger_count = self.rng.gen_range(GROUP_SIZE);
        let pedestrian_count = self.rng.gen_range(GROUP_SIZE);
        let mut passengers: Vec<Character> =
            (0..passenger_count).map(|_| self.character()).collect();
        let mut pedestrians: Vec<Character> =
            (0..pedestrian_count).map(|_| self.character()).collect();

        if self.rng.gen_bool(YOU_PROBABILITY) {
            let side = if self.rng.gen_bool(0.5) {
                &mut passengers
            } else {
                &mut pedestrians
            };
            let people: Vec<usize> = side
                .iter()
                .enumerate()
                .filter(|(_, c)| c.as_person().is_some())
                .map(|(idx, _)| idx)
                .collect();
            if let Some(&idx) = people.choose(&mut self.rng) {
                if let Character::Person(person) = &mut side[idx] {
                    person.set_as_you(true);
                }
            }
        }

        Scenario::new(passengers, pedestrians, legal)
    }

    /// Generate `count` scenarios in one go.
    pub fn generate_batch(&mut self, count: usize) -> Vec<Scenario> {
        (0..count).map(|_| self.generate()).collect()
    }

    fn character(&mut self) -> Character {
        if self.species.is_empty() || self.rng.gen_bool(PERSON_PROBABILITY) {
            Character::Person(self.person())
        } else {
            Character::Animal(self.animal())
        }
    }

    fn person(&mut self) -> Person {
        let gender = *GENDERS.choose(&mut self.rng).unwrap_or(&Gender::Unknown);
        let body_type = *BODY_TYPES
            .choose(&mut self.rng)
            .unwrap_or(&BodyType::Unspecified);
        let age = self.rng.gen_range(AGE_RANGE);
        let profession = if AgeCategory::from_age(age) == AgeCategory::Adult {
            *PROFESSIONS.choose(&mut self.rng).unwrap_or(&Profession::None)
        } else {
            Profession::None
        };
        let pregnant = gender == Gender::Female
            && AgeCategory::from_age(age) == AgeCategory::Adult
            && self.rng.gen_bool(PREGNANT_PROBABILITY);
        Person::new(gender, body_type, age, pregnant, profession)
    }

    fn animal(&mut self) -> Animal {
        let species = self
            .species
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| "dog".to_string());
        let mut animal = Animal::new(species);
        animal.set_pet(self.rng.gen_bool(PET_PROBABILITY));
        animal
    }
}
