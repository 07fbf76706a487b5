//! Query gateway
//!
//! Runs catalog contracts against the store and answers the existence and
//! relationship checks the menu uses to validate names before running a
//! contract. Contracts assume their referents exist; these checks are the
//! only guard.

use std::fmt;
use rusqlite::types::ValueRef;
use rusqlite::params_from_iter;
use serde::Serialize;
use crate::storage::SqliteStore;
use crate::{Error, Result};
use super::catalog::{ParamKind, QueryCatalog, QueryContract};

/// One result cell, as returned by SQLite
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    fn from_value(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Integer(i),
            ValueRef::Real(f) => Cell::Real(f),
            ValueRef::Text(t) | ValueRef::Blob(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
        }
    }

    /// Numeric view, used to rank rows by their metric column
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(i) => Some(*i as f64),
            Cell::Real(f) => Some(*f),
            Cell::Text(t) => t.parse().ok(),
            Cell::Null => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("-"),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Real(r) => write!(f, "{}", r),
            Cell::Text(t) => f.write_str(t),
        }
    }
}

/// One result row: id, display name, then an optional metric
pub type Row = Vec<Cell>;

/// Contract execution and name checks over one store
pub struct QueryGateway<'a> {
    store: &'a SqliteStore,
    catalog: &'a QueryCatalog,
}

impl<'a> QueryGateway<'a> {
    pub fn new(store: &'a SqliteStore, catalog: &'a QueryCatalog) -> Self {
        Self { store, catalog }
    }

    pub fn catalog(&self) -> &'a QueryCatalog {
        self.catalog
    }

    /// Run contract `number` with positional `params`.
    ///
    /// Zero rows is a valid answer, not an error.
    pub fn run(&self, number: u8, params: &[&str]) -> Result<Vec<Row>> {
        let contract = self.catalog.get(number)?;
        self.run_contract(contract, params)
    }

    pub fn run_contract(&self, contract: &QueryContract, params: &[&str]) -> Result<Vec<Row>> {
        if params.len() != contract.arity() {
            return Err(Error::ContractArity {
                contract: contract.name(),
                expected: contract.arity(),
                found: params.len(),
            });
        }

        let mut stmt = self.store.conn().prepare(&contract.sql)?;
        let columns = stmt.column_count();
        if columns < contract.shape.columns {
            return Err(Error::ContractShape {
                contract: contract.name(),
                expected: contract.shape.columns,
                found: columns,
            });
        }

        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                (0..columns)
                    .map(|i| row.get_ref(i).map(Cell::from_value))
                    .collect::<rusqlite::Result<Row>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        tracing::debug!(contract = %contract.name(), rows = rows.len(), "Ran query contract");
        Ok(rows)
    }

    pub fn subject_exists(&self, name: &str) -> Result<bool> {
        self.name_exists(table_for(ParamKind::Subject), name)
    }

    pub fn lecturer_exists(&self, name: &str) -> Result<bool> {
        self.name_exists(table_for(ParamKind::Lecturer), name)
    }

    pub fn student_exists(&self, name: &str) -> Result<bool> {
        self.name_exists(table_for(ParamKind::Student), name)
    }

    pub fn group_exists(&self, name: &str) -> Result<bool> {
        self.name_exists(table_for(ParamKind::Group), name)
    }

    /// True iff `subject`'s lecturer is `lecturer`
    pub fn lecturer_teaches_subject(&self, lecturer: &str, subject: &str) -> Result<bool> {
        let count: i64 = self.store.conn().query_row(
            r#"
            SELECT COUNT(*)
            FROM subjects
            WHERE lecturer_id = (SELECT id FROM lecturers WHERE name = ?1)
              AND name = ?2
            "#,
            [lecturer, subject],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Dispatch to the existence check for `kind`
    pub fn exists(&self, kind: ParamKind, name: &str) -> Result<bool> {
        match kind {
            ParamKind::Subject => self.subject_exists(name),
            ParamKind::Lecturer => self.lecturer_exists(name),
            ParamKind::Group => self.group_exists(name),
            ParamKind::Student => self.student_exists(name),
        }
    }

    /// Every name of one kind, in insertion order
    pub fn names(&self, kind: ParamKind) -> Result<Vec<String>> {
        let sql = format!("SELECT name FROM {} ORDER BY id", table_for(kind));
        let mut stmt = self.store.conn().prepare(&sql)?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn name_exists(&self, table: &str, name: &str) -> Result<bool> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE name = ?1", table);
        let count: i64 = self.store.conn().query_row(&sql, [name], |row| row.get(0))?;
        Ok(count > 0)
    }
}

fn table_for(kind: ParamKind) -> &'static str {
    match kind {
        ParamKind::Subject => "subjects",
        ParamKind::Lecturer => "lecturers",
        ParamKind::Group => "groups",
        ParamKind::Student => "students",
    }
}
