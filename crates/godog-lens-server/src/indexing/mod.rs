//! Feature document indexing.
//!
//! Only `Feature:`, `Scenario:` and `Scenario Outline:` headers are modelled.
//! Steps, tables, tags and backgrounds are ignored. A document is turned into
//! one [`FeatureRecord`] per `Feature:` header, and the [`FeatureIndex`] keeps
//! the records for every matching document in the workspace.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

mod feature;
mod index;

pub use feature::parse_feature_document;
pub use index::FeatureIndex;

/// One `Feature:` block and the scenarios declared beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRecord {
    /// Header text after `Feature:`, trimmed.
    pub name: String,
    /// Path of the document that declares the feature.
    pub file_path: PathBuf,
    /// Zero-based line of the `Feature:` header.
    pub line_number: u32,
    /// Scenario and scenario outline names in document order.
    ///
    /// Duplicates are kept.
    pub scenario_names: Vec<String>,
    /// Zero-based line of each scenario header. When a name repeats the last
    /// occurrence wins.
    pub scenario_line_numbers: HashMap<String, u32>,
}

impl FeatureRecord {
    /// Create a record with no scenarios.
    #[must_use]
    pub fn new(name: impl Into<String>, file_path: impl Into<PathBuf>, line_number: u32) -> Self {
        Self {
            name: name.into(),
            file_path: file_path.into(),
            line_number,
            scenario_names: Vec::new(),
            scenario_line_numbers: HashMap::new(),
        }
    }

    /// Record a scenario header at `line_number`.
    pub fn push_scenario(&mut self, name: impl Into<String>, line_number: u32) {
        let name = name.into();
        self.scenario_line_numbers.insert(name.clone(), line_number);
        self.scenario_names.push(name);
    }

    /// Whether a scenario with exactly this name is declared in the feature.
    #[must_use]
    pub fn has_scenario(&self, name: &str) -> bool {
        self.scenario_line_numbers.contains_key(name)
    }

    /// Recorded line of the named scenario.
    #[must_use]
    pub fn scenario_line(&self, name: &str) -> Option<u32> {
        self.scenario_line_numbers.get(name).copied()
    }
}

/// A feature document could not be read.
///
/// The index logs this and leaves the document out; it never reaches the
/// caller of a rebuild.
#[derive(Debug, Error)]
#[error("failed to read feature file {}: {source}", .path.display())]
pub struct ParseReadError {
    /// The document that could not be read.
    pub path: PathBuf,
    /// The underlying I/O error.
    #[source]
    pub source: io::Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_scenario_names_keep_last_line() {
        let mut record = FeatureRecord::new("Login", "/w/login.feature", 0);
        record.push_scenario("retry", 3);
        record.push_scenario("retry", 8);
        assert_eq!(record.scenario_names, vec!["retry", "retry"]);
        assert_eq!(record.scenario_line("retry"), Some(8));
        assert!(record.has_scenario("retry"));
        assert!(!record.has_scenario("Retry"));
    }

    #[test]
    fn read_error_names_the_file() {
        let err = ParseReadError {
            path: PathBuf::from("/w/gone.feature"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(
            err.to_string(),
            "failed to read feature file /w/gone.feature: no such file"
        );
    }
}
