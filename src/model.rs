//! Domain types for the university gradebook
//!
//! Two families live here:
//! - Persisted rows (`Group`, `Lecturer`, `Subject`, `Student`, `Grade`) as read
//!   back from the store, keyed by store-assigned ids.
//! - Candidate rows produced by the generator, which reference their parents by
//!   name. Names are resolved to ids during seeding.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned row identifier
pub type RowId = i64;

/// Lowest grade on the scale
pub const MIN_GRADE: u8 = 1;
/// Highest grade on the scale
pub const MAX_GRADE: u8 = 6;

/// The five entity kinds held by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Group,
    Lecturer,
    Subject,
    Student,
    Grade,
}

impl EntityKind {
    /// Table backing this entity kind
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Group => "groups",
            EntityKind::Lecturer => "lecturers",
            EntityKind::Subject => "subjects",
            EntityKind::Student => "students",
            EntityKind::Grade => "grades",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Group => "group",
            EntityKind::Lecturer => "lecturer",
            EntityKind::Subject => "subject",
            EntityKind::Student => "student",
            EntityKind::Grade => "grade",
        }
    }

    /// All kinds in parent-before-child order
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Group,
            EntityKind::Lecturer,
            EntityKind::Subject,
            EntityKind::Student,
            EntityKind::Grade,
        ]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: RowId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecturer {
    pub id: RowId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: RowId,
    pub name: String,
    pub lecturer_id: RowId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: RowId,
    pub name: String,
    pub group_id: RowId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub id: RowId,
    pub student_id: RowId,
    pub subject_id: RowId,
    pub grade: u8,
    pub date: NaiveDate,
}

/// A student awaiting insertion, attached to a group by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentCandidate {
    pub name: String,
    pub group: String,
}

/// A grade awaiting insertion, attached to its student and subject by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCandidate {
    pub student: String,
    pub subject: String,
    pub grade: u8,
    pub date: NaiveDate,
}

/// Everything one seeding pass inserts, in plain data form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticDataset {
    pub groups: Vec<String>,
    pub lecturers: Vec<String>,
    pub subjects: Vec<String>,
    pub students: Vec<StudentCandidate>,
    pub grades: Vec<GradeCandidate>,
}

impl SyntheticDataset {
    /// Grades generated for one student, in generation order
    pub fn grades_of<'a>(&'a self, student: &'a str) -> impl Iterator<Item = &'a GradeCandidate> + 'a {
        self.grades.iter().filter(move |g| g.student == student)
    }
}
