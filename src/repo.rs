//! Entity repositories
//!
//! One repository per entity kind. Each writes a single row and hands back the
//! store-assigned id so dependent rows can reference it. Grades are leaves and
//! return nothing.
//!
//! Repositories borrow a `Connection`. Outside a transaction every insert is
//! committed on its own; a `rusqlite::Transaction` derefs to `Connection`, so
//! the same repositories take part in an enclosing transaction unchanged.
//! Foreign keys are not checked here; the store rejects dangling references
//! and the rejection surfaces as [`Error::ConstraintViolation`].

use chrono::NaiveDate;
use rusqlite::{params, Connection, ErrorCode, Params};
use crate::model::{EntityKind, RowId};
use crate::{Error, Result};

fn insert_row<P: Params>(conn: &Connection, kind: EntityKind, sql: &str, params: P) -> Result<RowId> {
    conn.execute(sql, params)
        .map_err(|err| classify_insert_error(kind, err))?;
    let id = conn.last_insert_rowid();
    tracing::trace!(kind = %kind, id, "inserted row");
    Ok(id)
}

/// Map store rejections of a row to `ConstraintViolation`, pass others through
fn classify_insert_error(kind: EntityKind, err: rusqlite::Error) -> Error {
    match err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            Error::ConstraintViolation {
                kind,
                message: message.unwrap_or_else(|| failure.to_string()),
            }
        }
        other => Error::Storage(other),
    }
}

pub struct GroupRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> GroupRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, name: &str) -> Result<RowId> {
        insert_row(self.conn, EntityKind::Group, "INSERT INTO groups (name) VALUES (?1)", params![name])
    }
}

pub struct LecturerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> LecturerRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, name: &str) -> Result<RowId> {
        insert_row(self.conn, EntityKind::Lecturer, "INSERT INTO lecturers (name) VALUES (?1)", params![name])
    }
}

pub struct SubjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SubjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Insert a subject taught by `lecturer_id`
    pub fn insert(&self, name: &str, lecturer_id: RowId) -> Result<RowId> {
        insert_row(
            self.conn,
            EntityKind::Subject,
            "INSERT INTO subjects (name, lecturer_id) VALUES (?1, ?2)",
            params![name, lecturer_id],
        )
    }
}

pub struct StudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> StudentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Insert a student belonging to `group_id`
    pub fn insert(&self, name: &str, group_id: RowId) -> Result<RowId> {
        insert_row(
            self.conn,
            EntityKind::Student,
            "INSERT INTO students (name, group_id) VALUES (?1, ?2)",
            params![name, group_id],
        )
    }
}

pub struct GradeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> GradeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, student_id: RowId, subject_id: RowId, grade: u8, date: NaiveDate) -> Result<()> {
        insert_row(
            self.conn,
            EntityKind::Grade,
            "INSERT INTO grades (student_id, subject_id, grade, date) VALUES (?1, ?2, ?3, ?4)",
            params![student_id, subject_id, grade, date.format("%Y-%m-%d").to_string()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    #[test]
    fn test_insert_chain_returns_ids() {
        let store = SqliteStore::open_in_memory().unwrap();
        let conn = store.conn();

        let group_id = GroupRepository::new(conn).insert("Group A").unwrap();
        let lecturer_id = LecturerRepository::new(conn).insert("Ada Lovelace").unwrap();
        let subject_id = SubjectRepository::new(conn).insert("Mathematics", lecturer_id).unwrap();
        let student_id = StudentRepository::new(conn).insert("Alan Turing", group_id).unwrap();
        GradeRepository::new(conn).insert(student_id, subject_id, 5, day()).unwrap();

        let subjects = store.subjects().unwrap();
        assert_eq!(subjects[0].lecturer_id, lecturer_id);
        let students = store.students().unwrap();
        assert_eq!(students[0].group_id, group_id);
        let grades = store.grades_for_student(student_id).unwrap();
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].grade, 5);
        assert_eq!(grades[0].date, day());
    }

    #[test]
    fn test_ids_are_distinct() {
        let store = SqliteStore::open_in_memory().unwrap();
        let repo = GroupRepository::new(store.conn());
        let a = repo.insert("Group A").unwrap();
        let b = repo.insert("Group B").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_dangling_parent_is_constraint_violation() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = StudentRepository::new(store.conn()).insert("Nobody", 42).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation { kind: EntityKind::Student, .. }));
    }

    #[test]
    fn test_duplicate_group_is_constraint_violation() {
        let store = SqliteStore::open_in_memory().unwrap();
        let repo = GroupRepository::new(store.conn());
        repo.insert("Group A").unwrap();
        let err = repo.insert("Group A").unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation { kind: EntityKind::Group, .. }));
    }

    #[test]
    fn test_out_of_range_grade_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let conn = store.conn();
        let group_id = GroupRepository::new(conn).insert("Group A").unwrap();
        let lecturer_id = LecturerRepository::new(conn).insert("Ada Lovelace").unwrap();
        let subject_id = SubjectRepository::new(conn).insert("Physics", lecturer_id).unwrap();
        let student_id = StudentRepository::new(conn).insert("Alan Turing", group_id).unwrap();

        let err = GradeRepository::new(conn).insert(student_id, subject_id, 0, day()).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation { kind: EntityKind::Grade, .. }));
    }
}
