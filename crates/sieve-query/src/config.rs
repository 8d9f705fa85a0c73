//! Engine configuration
//!
//! Policies for the cases the query pipeline cannot decide on its own:
//! objects that flatten to identical records, and numeric fields that hold
//! non-numeric values in some records.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// What to do when two input objects flatten to the same record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Only the earliest object is returned for the shared record
    KeepFirst,
    /// Only the most recent object is returned for the shared record
    #[default]
    KeepLast,
    /// Every object sharing the record is returned, in input order
    KeepAll,
    /// Fail the query
    Reject,
}

/// What to do when a numeric attribute meets a value that is not a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixedTypePolicy {
    /// Index and compare the value by its text
    #[default]
    TextFallback,
    /// Fail the query, naming the field
    Reject,
}

/// Query engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Collection name used when wrapping a bare predicate into a statement
    pub collection: String,
    pub duplicates: DuplicatePolicy,
    pub mixed_types: MixedTypePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            collection: "objects".to_string(),
            duplicates: DuplicatePolicy::default(),
            mixed_types: MixedTypePolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document; missing keys fall back to defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    pub fn with_mixed_types(mut self, policy: MixedTypePolicy) -> Self {
        self.mixed_types = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();

        assert_eq!(config.collection, "objects");
        assert_eq!(config.duplicates, DuplicatePolicy::KeepLast);
        assert_eq!(config.mixed_types, MixedTypePolicy::TextFallback);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = EngineConfig::from_toml_str(r#"duplicates = "keep_all""#).unwrap();

        assert_eq!(config.duplicates, DuplicatePolicy::KeepAll);
        assert_eq!(config.collection, "objects");
    }

    #[test]
    fn test_from_toml_full() {
        let config = EngineConfig::from_toml_str(
            r#"
            collection = "developers"
            duplicates = "reject"
            mixed_types = "reject"
            "#,
        )
        .unwrap();

        assert_eq!(
            config,
            EngineConfig::default()
                .with_collection("developers")
                .with_duplicates(DuplicatePolicy::Reject)
                .with_mixed_types(MixedTypePolicy::Reject)
        );
    }

    #[test]
    fn test_from_toml_rejects_unknown_policy() {
        let err = EngineConfig::from_toml_str(r#"duplicates = "merge""#).unwrap_err();
        assert!(err.to_string().starts_with("Invalid engine config"));
    }
}
