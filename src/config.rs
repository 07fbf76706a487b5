use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GradebookConfig {
    /// SQLite file; its presence marks the store as already seeded
    pub database: PathBuf,
    /// Directory with `query_N.sql` overrides for the built-in contracts
    pub queries_dir: Option<PathBuf>,
    pub seed: SeedConfig,
}

impl Default for GradebookConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            queries_dir: None,
            seed: SeedConfig::default(),
        }
    }
}

/// Shape of the synthetic dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub groups: Vec<String>,
    pub subjects: Vec<String>,
    pub lecturers: usize,
    pub students: usize,
    /// Mandatory grades per subject for every student
    pub grades_per_subject: usize,
    pub min_grades: usize,
    pub max_grades: usize,
    /// Fixed RNG seed; random when absent
    pub rng_seed: Option<u64>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            groups: ["Group A", "Group B", "Group C"].map(String::from).to_vec(),
            subjects: ["Mathematics", "Physics", "Chemistry", "Biology", "History", "English"]
                .map(String::from)
                .to_vec(),
            lecturers: 5,
            students: 40,
            grades_per_subject: 2,
            min_grades: 10,
            max_grades: 20,
            rng_seed: None,
        }
    }
}

impl SeedConfig {
    pub fn validate(&self) -> Result<()> {
        if self.groups.is_empty() {
            return Err(Error::InvalidConfig("at least one group is required".into()));
        }
        if self.subjects.is_empty() {
            return Err(Error::InvalidConfig("at least one subject is required".into()));
        }
        if self.lecturers == 0 {
            return Err(Error::InvalidConfig("at least one lecturer is required".into()));
        }
        if self.min_grades > self.max_grades {
            return Err(Error::InvalidConfig(format!(
                "min_grades ({}) exceeds max_grades ({})",
                self.min_grades, self.max_grades
            )));
        }
        if let Some(name) = first_duplicate(&self.groups).or_else(|| first_duplicate(&self.subjects)) {
            return Err(Error::InvalidConfig(format!("duplicate name '{}'", name)));
        }
        if let Some(name) = self.groups.iter().chain(&self.subjects).find(|n| n.trim().is_empty()) {
            return Err(Error::InvalidConfig(format!("blank name '{}'", name)));
        }
        Ok(())
    }

    /// Grades every student receives before any extra ones
    pub fn mandatory_grades(&self) -> usize {
        self.subjects.len() * self.grades_per_subject
    }
}

fn first_duplicate(names: &[String]) -> Option<&String> {
    names
        .iter()
        .enumerate()
        .find(|(i, name)| names[..*i].contains(name))
        .map(|(_, name)| name)
}

/// `gradebook.toml` in the working directory
pub fn default_config_path() -> PathBuf {
    PathBuf::from("gradebook.toml")
}

/// `university.db` in the working directory
pub fn default_database_path() -> PathBuf {
    PathBuf::from("university.db")
}

/// Read and validate the config at `path` (or the default path).
///
/// A missing file is not an error; callers fall back to defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<GradebookConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: GradebookConfig = toml::from_str(&contents)?;
    config.seed.validate()?;
    Ok(Some(config))
}

/// Serialize `config` as TOML, refusing to clobber an existing file unless `force`
pub fn write_config(path: &Path, config: &GradebookConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Create the database's parent directory if it does not exist yet
pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
