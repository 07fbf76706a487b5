//! SQLite storage implementation

use std::path::Path;
use chrono::NaiveDate;
use rusqlite::{Connection, Transaction};
use crate::Result;
use crate::model::{EntityKind, Grade, Group, Lecturer, Student, Subject};
use super::schema;

/// SQLite-backed store for the gradebook tables
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.configure()?;
        store.ensure_schema()?;
        tracing::debug!("Opened store at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.configure()?;
        store.ensure_schema()?;
        Ok(store)
    }

    fn configure(&self) -> Result<()> {
        // Must run outside any transaction to take effect
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(())
    }

    /// Create the five tables and their indexes if absent.
    ///
    /// Every statement is `IF NOT EXISTS`, so calling this on an initialized
    /// store neither fails nor touches existing rows.
    pub fn ensure_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Borrow the underlying connection (autocommit mode)
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Start a transaction. Dropping it without `commit` rolls back.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }

    // ========== Counts ==========

    /// Count rows of one entity kind
    pub fn count(&self, kind: EntityKind) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Whether any entity rows exist at all
    pub fn is_populated(&self) -> Result<bool> {
        for kind in EntityKind::all() {
            if self.count(*kind)? > 0 {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            groups: self.count(EntityKind::Group)?,
            lecturers: self.count(EntityKind::Lecturer)?,
            subjects: self.count(EntityKind::Subject)?,
            students: self.count(EntityKind::Student)?,
            grades: self.count(EntityKind::Grade)?,
        })
    }

    // ========== Readers ==========

    pub fn groups(&self) -> Result<Vec<Group>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM groups ORDER BY id")?;
        let groups = stmt
            .query_map([], |row| Ok(Group { id: row.get(0)?, name: row.get(1)? }))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(groups)
    }

    pub fn lecturers(&self) -> Result<Vec<Lecturer>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM lecturers ORDER BY id")?;
        let lecturers = stmt
            .query_map([], |row| Ok(Lecturer { id: row.get(0)?, name: row.get(1)? }))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(lecturers)
    }

    pub fn subjects(&self) -> Result<Vec<Subject>> {
        let mut stmt = self.conn.prepare("SELECT id, name, lecturer_id FROM subjects ORDER BY id")?;
        let subjects = stmt
            .query_map([], |row| {
                Ok(Subject {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    lecturer_id: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(subjects)
    }

    pub fn students(&self) -> Result<Vec<Student>> {
        let mut stmt = self.conn.prepare("SELECT id, name, group_id FROM students ORDER BY id")?;
        let students = stmt
            .query_map([], |row| {
                Ok(Student {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    group_id: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(students)
    }

    /// All grades recorded for one student
    pub fn grades_for_student(&self, student_id: i64) -> Result<Vec<Grade>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, student_id, subject_id, grade, date FROM grades WHERE student_id = ?1 ORDER BY id",
        )?;
        let grades = stmt
            .query_map([student_id], |row| self.row_to_grade(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(grades)
    }

    /// Rows whose foreign keys do not resolve, per child table
    pub fn orphan_count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            r#"
            SELECT
                (SELECT COUNT(*) FROM students s LEFT JOIN groups g ON s.group_id = g.id WHERE g.id IS NULL)
              + (SELECT COUNT(*) FROM subjects s LEFT JOIN lecturers l ON s.lecturer_id = l.id WHERE l.id IS NULL)
              + (SELECT COUNT(*) FROM grades gr LEFT JOIN students s ON gr.student_id = s.id WHERE s.id IS NULL)
              + (SELECT COUNT(*) FROM grades gr LEFT JOIN subjects s ON gr.subject_id = s.id WHERE s.id IS NULL)
            "#,
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Helper to convert a row to a Grade
    fn row_to_grade(&self, row: &rusqlite::Row) -> rusqlite::Result<Grade> {
        let date_str: String = row.get(4)?;
        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Grade {
            id: row.get(0)?,
            student_id: row.get(1)?,
            subject_id: row.get(2)?,
            grade: row.get(3)?,
            date,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DbStats {
    pub groups: usize,
    pub lecturers: usize,
    pub subjects: usize,
    pub students: usize,
    pub grades: usize,
}

impl DbStats {
    /// Label/value pairs in table order
    pub fn rows(&self) -> [(&'static str, usize); 5] {
        [
            ("Groups", self.groups),
            ("Lecturers", self.lecturers),
            ("Subjects", self.subjects),
            ("Students", self.students),
            ("Grades", self.grades),
        ]
    }
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Groups: {}", self.groups)?;
        writeln!(f, "  Lecturers: {}", self.lecturers)?;
        writeln!(f, "  Subjects: {}", self.subjects)?;
        writeln!(f, "  Students: {}", self.students)?;
        writeln!(f, "  Grades: {}", self.grades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .conn()
            .execute("INSERT INTO groups (name) VALUES ('Group A')", [])
            .unwrap();

        store.ensure_schema().unwrap();
        store.ensure_schema().unwrap();

        assert_eq!(store.count(EntityKind::Group).unwrap(), 1);
    }

    #[test]
    fn test_empty_store_is_not_populated() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(!store.is_populated().unwrap());
        assert_eq!(store.stats().unwrap().grades, 0);
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = store
            .conn()
            .execute("INSERT INTO students (name, group_id) VALUES ('Ann', 99)", []);
        assert!(result.is_err());
        assert_eq!(store.count(EntityKind::Student).unwrap(), 0);
    }

    #[test]
    fn test_grade_range_checked() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.conn().execute_batch(
            "INSERT INTO groups (name) VALUES ('G');
             INSERT INTO lecturers (name) VALUES ('L');
             INSERT INTO students (name, group_id) VALUES ('S', 1);
             INSERT INTO subjects (name, lecturer_id) VALUES ('Math', 1);",
        ).unwrap();

        let bad = store.conn().execute(
            "INSERT INTO grades (student_id, subject_id, grade, date) VALUES (1, 1, 7, '2024-01-01')",
            [],
        );
        assert!(bad.is_err());

        store.conn().execute(
            "INSERT INTO grades (student_id, subject_id, grade, date) VALUES (1, 1, 6, '2024-01-01')",
            [],
        ).unwrap();
        let grades = store.grades_for_student(1).unwrap();
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(store.orphan_count().unwrap(), 0);
    }

    #[test]
    fn test_dropped_transaction_rolls_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        {
            let tx = store.transaction().unwrap();
            tx.execute("INSERT INTO groups (name) VALUES ('Group A')", []).unwrap();
        }
        assert_eq!(store.count(EntityKind::Group).unwrap(), 0);
    }
}
