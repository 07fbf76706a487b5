//! Synthetic dataset generation
//!
//! Produces the rows of one seeding pass as plain data. Nothing here touches
//! the store, and the output depends only on the random source, the
//! [`SeedConfig`] and the reference date, so a seeded RNG plus a pinned date
//! reproduces the same dataset.
//!
//! Per student the grade list is built in two steps:
//! 1. `grades_per_subject` mandatory grades for every subject, so no subject is
//!    ever left uncovered.
//! 2. A target total drawn from `[min_grades, max_grades]`; extra grades on
//!    random subjects fill the gap. When the mandatory grades already reach the
//!    target the gap is zero, never negative.

use std::collections::HashSet;
use chrono::{Datelike, Days, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::config::SeedConfig;
use crate::model::{GradeCandidate, StudentCandidate, SyntheticDataset, MAX_GRADE, MIN_GRADE};
use crate::Result;

const FIRST_NAMES: &[&str] = &[
    "Adam", "Agnieszka", "Alicja", "Amelia", "Anna", "Bartosz", "Beata", "Cezary", "Dawid",
    "Dominika", "Emil", "Ewa", "Filip", "Gabriela", "Hubert", "Iga", "Jakub", "Joanna",
    "Kacper", "Karolina", "Leon", "Lena", "Maciej", "Maja", "Natalia", "Oskar", "Patryk",
    "Paulina", "Szymon", "Wiktoria", "Zofia", "Tomasz",
];

const LAST_NAMES: &[&str] = &[
    "Adamczyk", "Baran", "Czarnecki", "Dudek", "Gajewski", "Jankowski", "Kaczmarek",
    "Kowalczyk", "Kozlowski", "Krawczyk", "Lewandowski", "Mazur", "Michalski", "Nowak",
    "Olszewski", "Pawlak", "Piotrowski", "Rutkowski", "Sikora", "Sobczak", "Szewczyk",
    "Walczak", "Wieczorek", "Wojcik", "Wozniak", "Zajac", "Zielinski", "Krol",
];

/// Attempts at a fresh first/last pairing before falling back to a suffixed name
const NAME_ATTEMPTS: usize = 64;

/// Random-source driven generator for a [`SyntheticDataset`]
pub struct SyntheticDataGenerator<R: Rng> {
    config: SeedConfig,
    rng: R,
}

impl SyntheticDataGenerator<StdRng> {
    /// Build a generator from config, seeding from `rng_seed` when present
    pub fn from_config(config: SeedConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(config, rng)
    }

    /// Deterministic generator for a fixed seed
    pub fn seeded(config: SeedConfig, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SyntheticDataGenerator<R> {
    pub fn new(config: SeedConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &SeedConfig {
        &self.config
    }

    /// Generate a dataset whose grade dates run up to the local date
    pub fn generate(&mut self) -> Result<SyntheticDataset> {
        self.generate_as_of(Local::now().date_naive())
    }

    /// Generate a dataset with grade dates in `[Jan 1 of today's year, today]`
    pub fn generate_as_of(&mut self, today: NaiveDate) -> Result<SyntheticDataset> {
        self.config.validate()?;

        let mut taken = HashSet::new();
        let groups = self.config.groups.clone();
        let subjects = self.config.subjects.clone();
        let lecturers = self.unique_names(self.config.lecturers, &mut taken);

        let student_names = self.unique_names(self.config.students, &mut taken);
        let students: Vec<StudentCandidate> = student_names
            .into_iter()
            .map(|name| {
                let group = groups[self.rng.gen_range(0..groups.len())].clone();
                StudentCandidate { name, group }
            })
            .collect();

        let mut grades = Vec::new();
        for student in &students {
            let student_grades = self.grades_for(&student.name, &subjects, today);
            grades.extend(student_grades);
        }

        tracing::debug!(
            groups = groups.len(),
            lecturers = lecturers.len(),
            subjects = subjects.len(),
            students = students.len(),
            grades = grades.len(),
            "Generated synthetic dataset"
        );

        Ok(SyntheticDataset {
            groups,
            lecturers,
            subjects,
            students,
            grades,
        })
    }

    fn grades_for(&mut self, student: &str, subjects: &[String], today: NaiveDate) -> Vec<GradeCandidate> {
        let mut grades = Vec::with_capacity(self.config.max_grades.max(self.config.mandatory_grades()));

        for subject in subjects {
            for _ in 0..self.config.grades_per_subject {
                grades.push(self.random_grade(student, subject, today));
            }
        }

        let target = self.rng.gen_range(self.config.min_grades..=self.config.max_grades);
        let additional = target.saturating_sub(grades.len());
        for _ in 0..additional {
            let subject = &subjects[self.rng.gen_range(0..subjects.len())];
            grades.push(self.random_grade(student, subject, today));
        }

        grades
    }

    fn random_grade(&mut self, student: &str, subject: &str, today: NaiveDate) -> GradeCandidate {
        GradeCandidate {
            student: student.to_string(),
            subject: subject.to_string(),
            grade: self.rng.gen_range(MIN_GRADE..=MAX_GRADE),
            date: self.random_date(today),
        }
    }

    /// Uniform date between the first day of `today`'s year and `today`
    fn random_date(&mut self, today: NaiveDate) -> NaiveDate {
        let start = today.with_ordinal(1).unwrap_or(today);
        let span = today.ordinal0() as u64;
        let offset = self.rng.gen_range(0..=span);
        start.checked_add_days(Days::new(offset)).unwrap_or(today)
    }

    fn unique_names(&mut self, count: usize, taken: &mut HashSet<String>) -> Vec<String> {
        let mut names = Vec::with_capacity(count);
        while names.len() < count {
            let name = self.fresh_name(taken);
            taken.insert(name.clone());
            names.push(name);
        }
        names
    }

    fn fresh_name(&mut self, taken: &HashSet<String>) -> String {
        for _ in 0..NAME_ATTEMPTS {
            let name = self.random_name();
            if !taken.contains(&name) {
                return name;
            }
        }

        // Pool is crowded: disambiguate with a counter
        let base = self.random_name();
        (2..)
            .map(|n| format!("{} {}", base, n))
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or(base)
    }

    fn random_name(&mut self) -> String {
        let first = FIRST_NAMES[self.rng.gen_range(0..FIRST_NAMES.len())];
        let last = LAST_NAMES[self.rng.gen_range(0..LAST_NAMES.len())];
        format!("{} {}", first, last)
    }
}
