//! # Gradebook - synthetic university database with fixed analytical questions
//!
//! Gradebook provides:
//! - A five-table SQLite schema (groups, lecturers, subjects, students, grades)
//! - Seedable synthetic data generation with full subject coverage per student
//! - Parents-first seeding in a single transaction
//! - A catalog of ten parameterized query contracts and a gateway to run them
//! - An interactive question menu

pub mod model;
pub mod storage;
pub mod repo;
pub mod generator;
pub mod seed;
pub mod query;
pub mod menu;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use model::{EntityKind, RowId, SyntheticDataset};
pub use storage::SqliteStore;
pub use generator::SyntheticDataGenerator;
pub use seed::{bootstrap, seed, seed_if_empty, IdMap, SeedOutcome};
pub use query::{QueryCatalog, QueryGateway};

/// Result type alias for Gradebook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Gradebook operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Constraint violation on {kind}: {message}")]
    ConstraintViolation { kind: EntityKind, message: String },

    #[error("Unknown {kind} '{name}'")]
    UnknownReference { kind: EntityKind, name: String },

    #[error("Duplicate {kind} name '{name}'")]
    DuplicateName { kind: EntityKind, name: String },

    #[error("Unknown query contract: {0}")]
    UnknownContract(String),

    #[error("Contract {contract} takes {expected} parameter(s), got {found}")]
    ContractArity { contract: String, expected: usize, found: usize },

    #[error("Contract {contract} must return at least {expected} columns, returns {found}")]
    ContractShape { contract: String, expected: usize, found: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}
