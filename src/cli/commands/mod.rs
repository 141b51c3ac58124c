//! Command handlers
//!
//! Each handler returns the text to print so the binary stays a thin
//! dispatcher.

pub mod convert;
pub mod fields;
pub mod validate;

use std::io::Read;
use std::path::PathBuf;

use crate::cli::error::CliError;
use crate::config::{RecordConfig, UnknownFieldPolicy};
use crate::record::MetadataRecord;
use crate::schema::standard_catalog;

/// Load input content from file or stdin
pub(crate) fn load_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        Ok(content)
    } else {
        let path = PathBuf::from(input);
        std::fs::read_to_string(&path).map_err(|e| CliError::FileReadError(path, e.to_string()))
    }
}

/// Record configuration for command-line ingestion
pub(crate) fn record_config(ignore_unknown: bool, pretty: bool) -> RecordConfig {
    let policy = if ignore_unknown {
        UnknownFieldPolicy::Ignore
    } else {
        UnknownFieldPolicy::Reject
    };
    RecordConfig::builder()
        .unknown_fields(policy)
        .pretty_json(pretty)
        .build()
}

/// Parse JSON or XML content into a record of `entity`.
///
/// Content whose first non-blank character is `<` is read as XML.
pub(crate) fn load_record(
    entity: &str,
    content: &str,
    config: RecordConfig,
) -> Result<MetadataRecord, CliError> {
    let schema = standard_catalog()?.entity(entity)?;
    let mut record = MetadataRecord::with_config(schema, config);
    if content.trim_start().starts_with('<') {
        tracing::info!(entity, format = "xml", "Reading metadata");
        record.update_from_xml(content)?;
    } else {
        tracing::info!(entity, format = "json", "Reading metadata");
        record.update_from_json(content)?;
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_record_detects_xml() {
        let xml = "  <run><id>a</id><sample_rate>256</sample_rate></run>";
        let record = load_record("run", xml, RecordConfig::default()).unwrap();
        assert_eq!(record.get("sample_rate").unwrap(), &serde_json::json!(256.0));
    }

    #[test]
    fn test_load_record_unknown_entity() {
        let err = load_record("volcano", "{}", RecordConfig::default()).unwrap_err();
        assert!(err.to_string().contains("volcano"));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_input("/definitely/not/here.json"),
            Err(CliError::FileReadError(_, _))
        ));
    }
}
