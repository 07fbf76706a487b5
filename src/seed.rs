//! Seeding orchestration
//!
//! Inserts a [`SyntheticDataset`] parents-first inside one transaction:
//! groups, lecturers, subjects, students, grades. Each phase returns an
//! [`IdMap`] from name to store id that the later phases resolve against, so
//! no child is written before its parent's id is known. Any failure drops the
//! transaction and leaves the store untouched.

use std::collections::HashMap;
use std::path::Path;
use rusqlite::Connection;
use crate::config::SeedConfig;
use crate::generator::SyntheticDataGenerator;
use crate::model::{EntityKind, GradeCandidate, RowId, StudentCandidate, SyntheticDataset};
use crate::repo::{GradeRepository, GroupRepository, LecturerRepository, StudentRepository, SubjectRepository};
use crate::storage::{DbStats, SqliteStore};
use crate::{Error, Result};

/// Name → id lookup produced by one insertion phase
#[derive(Debug, Clone)]
pub struct IdMap {
    kind: EntityKind,
    ids: HashMap<String, RowId>,
    order: Vec<RowId>,
}

impl IdMap {
    fn new(kind: EntityKind) -> Self {
        Self { kind, ids: HashMap::new(), order: Vec::new() }
    }

    /// Remember `name` → `id`; a name may only be recorded once per phase
    fn record(&mut self, name: &str, id: RowId) -> Result<()> {
        if self.ids.contains_key(name) {
            return Err(Error::DuplicateName { kind: self.kind, name: name.to_string() });
        }
        self.ids.insert(name.to_string(), id);
        self.order.push(id);
        Ok(())
    }

    /// Id for `name`, or `UnknownReference` when the phase never inserted it
    pub fn resolve(&self, name: &str) -> Result<RowId> {
        self.ids.get(name).copied().ok_or_else(|| Error::UnknownReference {
            kind: self.kind,
            name: name.to_string(),
        })
    }

    /// Ids in insertion order
    pub fn ids_in_order(&self) -> &[RowId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// What a bootstrap run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Fresh store, these rows were inserted
    Seeded(DbStats),
    /// Store already existed, nothing written
    Skipped(DbStats),
}

impl SeedOutcome {
    pub fn stats(&self) -> DbStats {
        match self {
            SeedOutcome::Seeded(stats) | SeedOutcome::Skipped(stats) => *stats,
        }
    }

    pub fn was_seeded(&self) -> bool {
        matches!(self, SeedOutcome::Seeded(_))
    }
}

/// Insert the whole dataset in one transaction and return per-table counts
pub fn seed(store: &mut SqliteStore, dataset: &SyntheticDataset) -> Result<DbStats> {
    let tx = store.transaction()?;

    let stats = match insert_dataset(&tx, dataset) {
        Ok(stats) => stats,
        Err(err) => {
            tracing::warn!("Seeding failed, rolling back: {}", err);
            return Err(err);
        }
    };

    tx.commit()?;
    tracing::info!(
        groups = stats.groups,
        lecturers = stats.lecturers,
        subjects = stats.subjects,
        students = stats.students,
        grades = stats.grades,
        "Seeding committed"
    );
    Ok(stats)
}

/// Seed only when the store holds no rows yet
pub fn seed_if_empty(store: &mut SqliteStore, dataset: &SyntheticDataset) -> Result<SeedOutcome> {
    if store.is_populated()? {
        tracing::info!("Store already populated, skipping seeding");
        return Ok(SeedOutcome::Skipped(store.stats()?));
    }
    seed(store, dataset).map(SeedOutcome::Seeded)
}

/// Open the store at `path`, seeding it with generated data if the file is new.
///
/// An existing file is taken as already seeded and left alone. If seeding a
/// new file fails, the half-created file is removed again so the next run
/// starts from scratch.
pub fn bootstrap(path: &Path, config: &SeedConfig) -> Result<(SqliteStore, SeedOutcome)> {
    if path.exists() {
        tracing::info!("Database {} exists, skipping seeding", path.display());
        let store = SqliteStore::open(path)?;
        let stats = store.stats()?;
        return Ok((store, SeedOutcome::Skipped(stats)));
    }

    let seeded = SqliteStore::open(path).and_then(|mut store| {
        let dataset = SyntheticDataGenerator::from_config(config.clone()).generate()?;
        let outcome = seed_if_empty(&mut store, &dataset)?;
        Ok((store, outcome))
    });

    if seeded.is_err() {
        if let Err(err) = std::fs::remove_file(path) {
            tracing::warn!("Could not remove partial database {}: {}", path.display(), err);
        }
    }
    seeded
}

fn insert_dataset(conn: &Connection, dataset: &SyntheticDataset) -> Result<DbStats> {
    let groups = insert_groups(conn, &dataset.groups)?;
    let lecturers = insert_lecturers(conn, &dataset.lecturers)?;
    let subjects = insert_subjects(conn, &dataset.subjects, &lecturers)?;
    let students = insert_students(conn, &dataset.students, &groups)?;
    let grades = insert_grades(conn, &dataset.grades, &students, &subjects)?;

    Ok(DbStats {
        groups: groups.len(),
        lecturers: lecturers.len(),
        subjects: subjects.len(),
        students: students.len(),
        grades,
    })
}

fn insert_groups(conn: &Connection, names: &[String]) -> Result<IdMap> {
    let repo = GroupRepository::new(conn);
    let mut ids = IdMap::new(EntityKind::Group);
    for name in names {
        ids.record(name, repo.insert(name)?)?;
    }
    Ok(ids)
}

fn insert_lecturers(conn: &Connection, names: &[String]) -> Result<IdMap> {
    let repo = LecturerRepository::new(conn);
    let mut ids = IdMap::new(EntityKind::Lecturer);
    for name in names {
        ids.record(name, repo.insert(name)?)?;
    }
    Ok(ids)
}

/// The i-th subject goes to the (i mod n)-th lecturer
fn insert_subjects(conn: &Connection, names: &[String], lecturers: &IdMap) -> Result<IdMap> {
    let lecturer_ids = lecturers.ids_in_order();
    if lecturer_ids.is_empty() && !names.is_empty() {
        return Err(Error::InvalidConfig("subjects need at least one lecturer".into()));
    }

    let repo = SubjectRepository::new(conn);
    let mut ids = IdMap::new(EntityKind::Subject);
    for (i, name) in names.iter().enumerate() {
        let lecturer_id = lecturer_ids[i % lecturer_ids.len()];
        ids.record(name, repo.insert(name, lecturer_id)?)?;
    }
    Ok(ids)
}

fn insert_students(conn: &Connection, students: &[StudentCandidate], groups: &IdMap) -> Result<IdMap> {
    let repo = StudentRepository::new(conn);
    let mut ids = IdMap::new(EntityKind::Student);
    for student in students {
        let group_id = groups.resolve(&student.group)?;
        ids.record(&student.name, repo.insert(&student.name, group_id)?)?;
    }
    Ok(ids)
}

fn insert_grades(conn: &Connection, grades: &[GradeCandidate], students: &IdMap, subjects: &IdMap) -> Result<usize> {
    let repo = GradeRepository::new(conn);
    for grade in grades {
        let student_id = students.resolve(&grade.student)?;
        let subject_id = subjects.resolve(&grade.subject)?;
        repo.insert(student_id, subject_id, grade.grade, grade.date)?;
    }
    Ok(grades.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
    }

    fn tiny_dataset() -> SyntheticDataset {
        SyntheticDataset {
            groups: vec!["Group A".into(), "Group B".into()],
            lecturers: vec!["Ada Lovelace".into(), "Alan Turing".into()],
            subjects: vec!["Mathematics".into(), "Physics".into(), "History".into()],
            students: vec![
                StudentCandidate { name: "Anna Nowak".into(), group: "Group A".into() },
                StudentCandidate { name: "Leon Mazur".into(), group: "Group B".into() },
            ],
            grades: vec![
                GradeCandidate { student: "Anna Nowak".into(), subject: "Mathematics".into(), grade: 5, date: day() },
                GradeCandidate { student: "Leon Mazur".into(), subject: "History".into(), grade: 2, date: day() },
            ],
        }
    }

    #[test]
    fn test_seed_counts() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let stats = seed(&mut store, &tiny_dataset()).unwrap();
        assert_eq!(stats, store.stats().unwrap());
        assert_eq!(stats.grades, 2);
        assert_eq!(store.orphan_count().unwrap(), 0);
    }

    #[test]
    fn test_subjects_assigned_round_robin() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        seed(&mut store, &tiny_dataset()).unwrap();

        let lecturers = store.lecturers().unwrap();
        let subjects = store.subjects().unwrap();
        assert_eq!(subjects[0].lecturer_id, lecturers[0].id);
        assert_eq!(subjects[1].lecturer_id, lecturers[1].id);
        assert_eq!(subjects[2].lecturer_id, lecturers[0].id);
    }

    #[test]
    fn test_unknown_group_rolls_back_everything() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut dataset = tiny_dataset();
        dataset.students[1].group = "Group Z".into();

        let err = seed(&mut store, &dataset).unwrap_err();
        assert!(matches!(err, Error::UnknownReference { kind: EntityKind::Group, .. }));
        assert!(!store.is_populated().unwrap());
    }

    #[test]
    fn test_store_rejection_rolls_back_everything() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut dataset = tiny_dataset();
        dataset.grades[1].grade = 9;

        let err = seed(&mut store, &dataset).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation { kind: EntityKind::Grade, .. }));
        assert_eq!(store.stats().unwrap(), DbStats { groups: 0, lecturers: 0, subjects: 0, students: 0, grades: 0 });
    }

    #[test]
    fn test_seed_if_empty_skips_second_pass() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let first = seed_if_empty(&mut store, &tiny_dataset()).unwrap();
        assert!(first.was_seeded());

        let second = seed_if_empty(&mut store, &tiny_dataset()).unwrap();
        assert!(!second.was_seeded());
        assert_eq!(second.stats(), first.stats());
    }

    #[test]
    fn test_id_map_resolution() {
        let mut ids = IdMap::new(EntityKind::Subject);
        ids.record("Physics", 4).unwrap();
        assert!(matches!(
            ids.record("Physics", 5),
            Err(Error::DuplicateName { kind: EntityKind::Subject, .. })
        ));
        assert_eq!(ids.resolve("Physics").unwrap(), 4);
        assert!(matches!(
            ids.resolve("Art"),
            Err(Error::UnknownReference { kind: EntityKind::Subject, .. })
        ));
    }

    #[test]
    fn test_duplicate_student_name_rolls_back_everything() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut dataset = tiny_dataset();
        dataset.students[1].name = "Anna Nowak".into();
        dataset.grades[1].student = "Anna Nowak".into();

        let err = seed(&mut store, &dataset).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateName { kind: EntityKind::Student, ref name } if name == "Anna Nowak"
        ));
        assert!(!store.is_populated().unwrap());
        assert_eq!(store.count(EntityKind::Student).unwrap(), 0);
    }
}
