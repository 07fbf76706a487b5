//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - groups(id, name)
//! - lecturers(id, name)
//! - students(id, name, group_id)
//! - subjects(id, name, lecturer_id)
//! - grades(id, student_id, subject_id, grade, date)

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteStore, DbStats};
