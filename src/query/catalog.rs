//! Query contract catalog
//!
//! The ten analytical questions are fixed contracts: a number, the user inputs
//! they take (in placeholder order) and the columns they return. The SQL text
//! itself is opaque here. Defaults are compiled in from `queries/`; a
//! directory of `query_N.sql` files can override any of them.
//!
//! Loading checks every text's placeholder count against the declared inputs,
//! so a contract that cannot be bound fails at startup rather than mid-menu.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use regex::Regex;
use serde::Serialize;
use crate::{Error, Result};

/// Kind of user-supplied name a contract parameter expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Subject,
    Lecturer,
    Group,
    Student,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::Subject => "subject",
            ParamKind::Lecturer => "lecturer",
            ParamKind::Group => "group",
            ParamKind::Student => "student",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns a contract returns.
///
/// Column 0 is always the row id, column 1 the display name. Contracts with a
/// metric carry it in column 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResultShape {
    pub columns: usize,
}

impl ResultShape {
    pub const NAMED: ResultShape = ResultShape { columns: 2 };
    pub const NAMED_METRIC: ResultShape = ResultShape { columns: 3 };

    pub fn has_metric(&self) -> bool {
        self.columns >= 3
    }
}

/// One named, parameterized query
#[derive(Debug, Clone, Serialize)]
pub struct QueryContract {
    pub number: u8,
    pub title: &'static str,
    pub params: &'static [ParamKind],
    pub shape: ResultShape,
    #[serde(skip)]
    pub sql: String,
}

impl QueryContract {
    pub fn name(&self) -> String {
        format!("query_{}", self.number)
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

struct ContractDef {
    number: u8,
    title: &'static str,
    params: &'static [ParamKind],
    shape: ResultShape,
    default_sql: &'static str,
}

const CONTRACTS: &[ContractDef] = &[
    ContractDef {
        number: 1,
        title: "Top 5 students with the highest average grade across all subjects.",
        params: &[],
        shape: ResultShape::NAMED_METRIC,
        default_sql: include_str!("../../queries/query_1.sql"),
    },
    ContractDef {
        number: 2,
        title: "The student with the highest average grade in a chosen subject.",
        params: &[ParamKind::Subject],
        shape: ResultShape::NAMED_METRIC,
        default_sql: include_str!("../../queries/query_2.sql"),
    },
    ContractDef {
        number: 3,
        title: "Average grades in groups for a chosen subject.",
        params: &[ParamKind::Subject],
        shape: ResultShape::NAMED_METRIC,
        default_sql: include_str!("../../queries/query_3.sql"),
    },
    ContractDef {
        number: 4,
        title: "Average grades for all groups, considering all grades.",
        params: &[],
        shape: ResultShape::NAMED_METRIC,
        default_sql: include_str!("../../queries/query_4.sql"),
    },
    ContractDef {
        number: 5,
        title: "Subjects taught by a chosen lecturer.",
        params: &[ParamKind::Lecturer],
        shape: ResultShape::NAMED,
        default_sql: include_str!("../../queries/query_5.sql"),
    },
    ContractDef {
        number: 6,
        title: "List of students in a chosen group.",
        params: &[ParamKind::Group],
        shape: ResultShape::NAMED,
        default_sql: include_str!("../../queries/query_6.sql"),
    },
    ContractDef {
        number: 7,
        title: "Grades of students in a chosen group for a specific subject.",
        params: &[ParamKind::Group, ParamKind::Subject],
        shape: ResultShape::NAMED_METRIC,
        default_sql: include_str!("../../queries/query_7.sql"),
    },
    ContractDef {
        number: 8,
        title: "Average grades given by a lecturer for a specific subject.",
        params: &[ParamKind::Lecturer, ParamKind::Subject],
        shape: ResultShape::NAMED_METRIC,
        default_sql: include_str!("../../queries/query_8.sql"),
    },
    ContractDef {
        number: 9,
        title: "List of courses attended by a student.",
        params: &[ParamKind::Student],
        shape: ResultShape::NAMED,
        default_sql: include_str!("../../queries/query_9.sql"),
    },
    ContractDef {
        number: 10,
        title: "List of courses taught by a chosen lecturer for a specific student.",
        params: &[ParamKind::Lecturer, ParamKind::Student],
        shape: ResultShape::NAMED,
        default_sql: include_str!("../../queries/query_10.sql"),
    },
];

/// The loaded set of contracts plus a fingerprint of their texts
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    contracts: Vec<QueryContract>,
    version: String,
}

impl QueryCatalog {
    /// Catalog built only from the compiled-in texts
    pub fn builtin() -> Result<Self> {
        Self::load(None)
    }

    /// Load the catalog, preferring `dir/query_N.sql` over the built-in text
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let mut contracts = Vec::with_capacity(CONTRACTS.len());
        let mut hasher = blake3::Hasher::new();

        for def in CONTRACTS {
            let sql = match dir.map(|d| d.join(format!("query_{}.sql", def.number))) {
                Some(path) if path.is_file() => {
                    tracing::debug!("Loading contract {} from {}", def.number, path.display());
                    std::fs::read_to_string(&path)?
                }
                _ => def.default_sql.to_string(),
            };

            let contract = QueryContract {
                number: def.number,
                title: def.title,
                params: def.params,
                shape: def.shape,
                sql,
            };

            let found = placeholder_count(&contract.sql);
            if found != contract.arity() {
                return Err(Error::ContractArity {
                    contract: contract.name(),
                    expected: contract.arity(),
                    found,
                });
            }

            hasher.update(contract.name().as_bytes());
            hasher.update(&[0]);
            hasher.update(contract.sql.as_bytes());
            hasher.update(&[0]);
            contracts.push(contract);
        }

        let version = hasher.finalize().to_hex().as_str()[..12].to_string();
        tracing::info!(contracts = contracts.len(), version = %version, "Loaded query catalog");
        Ok(Self { contracts, version })
    }

    pub fn get(&self, number: u8) -> Result<&QueryContract> {
        self.contracts
            .iter()
            .find(|c| c.number == number)
            .ok_or_else(|| Error::UnknownContract(format!("query_{}", number)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryContract> {
        self.contracts.iter()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Short fingerprint of every contract text
    pub fn version(&self) -> &str {
        &self.version
    }
}

fn literal_or_comment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)'(?:[^']|'')*'|--[^\n]*|/\*.*?\*/").expect("valid regex"))
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\?(\d+)?|([:@$][A-Za-z_]\w*)").expect("valid regex"))
}

/// Number of parameters SQLite will expect for `sql`.
///
/// Follows SQLite numbering: `?NNN` takes index NNN, while a bare `?` and each
/// new `:name`, `@name` or `$name` take one more than the largest index so
/// far. A repeated name reuses its index. String literals and comments are
/// ignored.
pub fn placeholder_count(sql: &str) -> usize {
    let code = literal_or_comment().replace_all(sql, " ");
    let mut largest = 0usize;
    let mut named = HashSet::new();
    for cap in placeholder().captures_iter(&code) {
        if let Some(name) = cap.get(2) {
            if named.insert(name.as_str()) {
                largest += 1;
            }
            continue;
        }
        match cap.get(1).and_then(|n| n.as_str().parse::<usize>().ok()) {
            Some(n) => largest = largest.max(n),
            None => largest += 1,
        }
    }
    largest
}
