//! Configuration for metadata records

use serde::{Deserialize, Serialize};

/// What to do with input keys the schema does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnknownFieldPolicy {
    /// Fail with `MetadataError::UnknownField`
    #[default]
    Reject,
    /// Log a warning and skip the key
    Ignore,
}

/// Configuration for record ingestion and output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordConfig {
    /// Handling of keys missing from the schema
    pub unknown_fields: UnknownFieldPolicy,

    /// Indent JSON output
    pub pretty_json: bool,

    /// Wrap dict/JSON output in a single key named after the entity,
    /// e.g. `{"station": {...}}`
    pub include_root: bool,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            unknown_fields: UnknownFieldPolicy::Reject,
            pretty_json: false,
            include_root: false,
        }
    }
}

impl RecordConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> RecordConfigBuilder {
        RecordConfigBuilder::default()
    }
}

/// Builder for RecordConfig
#[derive(Debug, Default)]
pub struct RecordConfigBuilder {
    config: RecordConfig,
}

impl RecordConfigBuilder {
    /// Set the unknown-field policy
    pub fn unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.config.unknown_fields = policy;
        self
    }

    /// Enable or disable indented JSON
    pub fn pretty_json(mut self, pretty: bool) -> Self {
        self.config.pretty_json = pretty;
        self
    }

    /// Enable or disable the entity-name wrapper on output
    pub fn include_root(mut self, include: bool) -> Self {
        self.config.include_root = include;
        self
    }

    /// Build the configuration
    pub fn build(self) -> RecordConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RecordConfig::default();
        assert_eq!(config.unknown_fields, UnknownFieldPolicy::Reject);
        assert!(!config.pretty_json);
        assert!(!config.include_root);
    }

    #[test]
    fn test_builder() {
        let config = RecordConfig::builder()
            .unknown_fields(UnknownFieldPolicy::Ignore)
            .pretty_json(true)
            .include_root(true)
            .build();

        assert_eq!(config.unknown_fields, UnknownFieldPolicy::Ignore);
        assert!(config.pretty_json);
        assert!(config.include_root);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: RecordConfig = serde_json::from_str(r#"{"unknownFields": "ignore"}"#).unwrap();
        assert_eq!(config.unknown_fields, UnknownFieldPolicy::Ignore);
        assert!(!config.pretty_json);
    }
}
