use std::collections::HashSet;
use chrono::{Datelike, Local, NaiveDate};
use gradebook::config::SeedConfig;
use gradebook::repo::{LecturerRepository, SubjectRepository};
use gradebook::storage::SqliteStore;
use gradebook::{bootstrap, seed, QueryCatalog, QueryGateway, SyntheticDataGenerator};

fn seeded_store(rng_seed: u64) -> SqliteStore {
    let dataset = SyntheticDataGenerator::seeded(SeedConfig::default(), rng_seed)
        .generate_as_of(NaiveDate::from_ymd_opt(2025, 9, 15).unwrap())
        .unwrap();
    let mut store = SqliteStore::open_in_memory().unwrap();
    seed(&mut store, &dataset).unwrap();
    store
}

#[test]
fn default_seed_produces_expected_volumes() {
    let store = seeded_store(2024);
    let stats = store.stats().unwrap();

    assert_eq!(stats.groups, 3);
    assert_eq!(stats.lecturers, 5);
    assert_eq!(stats.subjects, 6);
    assert_eq!(stats.students, 40);
    assert!((400..=800).contains(&stats.grades), "grades = {}", stats.grades);

    for student in store.students().unwrap() {
        let grades = store.grades_for_student(student.id).unwrap();
        assert!((10..=20).contains(&grades.len()), "{} has {}", student.name, grades.len());
    }
}

#[test]
fn every_student_is_graded_in_every_subject() {
    let store = seeded_store(5);
    let subject_ids: HashSet<i64> = store.subjects().unwrap().iter().map(|s| s.id).collect();

    for student in store.students().unwrap() {
        let covered: HashSet<i64> = store
            .grades_for_student(student.id)
            .unwrap()
            .iter()
            .map(|g| g.subject_id)
            .collect();
        assert_eq!(covered, subject_ids, "student {}", student.name);
    }
}

#[test]
fn referential_integrity_holds() {
    let store = seeded_store(77);
    assert_eq!(store.orphan_count().unwrap(), 0);

    let group_ids: HashSet<i64> = store.groups().unwrap().iter().map(|g| g.id).collect();
    let lecturer_ids: HashSet<i64> = store.lecturers().unwrap().iter().map(|l| l.id).collect();
    assert!(store.students().unwrap().iter().all(|s| group_ids.contains(&s.group_id)));
    assert!(store.subjects().unwrap().iter().all(|s| lecturer_ids.contains(&s.lecturer_id)));
}

#[test]
fn bootstrap_seeds_once_per_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("university.db");

    let (store, first) = bootstrap(&path, &SeedConfig::default()).unwrap();
    assert!(first.was_seeded());
    let before = store.stats().unwrap();
    drop(store);

    let (store, second) = bootstrap(&path, &SeedConfig::default()).unwrap();
    assert!(!second.was_seeded());
    assert_eq!(store.stats().unwrap(), before);
}

#[test]
fn bootstrap_dates_fall_in_current_year() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("university.db");
    let config = SeedConfig { students: 10, rng_seed: Some(3), ..SeedConfig::default() };

    let (store, _) = bootstrap(&path, &config).unwrap();
    let today = Local::now().date_naive();
    for student in store.students().unwrap() {
        for grade in store.grades_for_student(student.id).unwrap() {
            assert!((1..=6).contains(&grade.grade));
            assert_eq!(grade.date.year(), today.year());
            assert!(grade.date <= today);
        }
    }
}

#[test]
fn bootstrap_rejects_invalid_config_without_leaving_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("university.db");
    let config = SeedConfig { subjects: Vec::new(), ..SeedConfig::default() };

    assert!(bootstrap(&path, &config).is_err());
    assert!(!path.exists());
}

#[test]
fn predicates_after_seeding() {
    let store = seeded_store(9);
    let catalog = QueryCatalog::builtin().unwrap();
    let gateway = QueryGateway::new(&store, &catalog);

    assert!(gateway.subject_exists("Mathematics").unwrap());
    assert!(!gateway.subject_exists("Art").unwrap());

    let lecturers = store.lecturers().unwrap();
    for subject in store.subjects().unwrap() {
        for lecturer in &lecturers {
            let teaches = gateway.lecturer_teaches_subject(&lecturer.name, &subject.name).unwrap();
            assert_eq!(teaches, subject.lecturer_id == lecturer.id);
        }
    }
}

#[test]
fn subject_without_grades_has_no_group_averages() {
    let store = seeded_store(12);
    let lecturer_id = LecturerRepository::new(store.conn()).insert("Grace Hopper").unwrap();
    SubjectRepository::new(store.conn()).insert("Art", lecturer_id).unwrap();

    let catalog = QueryCatalog::builtin().unwrap();
    let gateway = QueryGateway::new(&store, &catalog);
    assert!(gateway.subject_exists("Art").unwrap());
    assert!(gateway.run(3, &["Art"]).unwrap().is_empty());
    assert!(gateway.run(8, &["Grace Hopper", "Art"]).unwrap().is_empty());
}
