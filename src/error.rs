//! Error types for metadata records
//!
//! Every fallible operation in the crate returns [`MetadataError`]. The
//! variants keep validation failures, missing required fields, malformed
//! input and unknown keys apart so callers can react to each one.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keys::KeyError;
use crate::schema::SchemaError;
use crate::validation::ValidationError;

/// Serialization format an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Xml,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Json => "JSON",
            Format::Xml => "XML",
        };
        f.write_str(name)
    }
}

/// Errors raised while building, mutating or converting metadata records
#[derive(Debug, Clone, Error)]
pub enum MetadataError {
    /// A value failed its field's type, vocabulary or format check
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Required fields were still unset when the record was finalized
    #[error("{entity} is missing required fields: {}", .paths.join(", "))]
    MissingRequired { entity: String, paths: Vec<String> },

    /// Input text was not well-formed
    #[error("{format} parse error: {message}")]
    Parse { format: Format, message: String },

    /// A key is not declared by the entity's schema
    #[error("Unknown field '{key}' for {entity}")]
    UnknownField { entity: String, key: String },

    /// A dotted key was malformed or the tree could not be (un)flattened
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The schema catalog is inconsistent or an entity is missing
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Output could not be produced
    #[error("{format} serialization error: {message}")]
    Serialization { format: Format, message: String },

    /// The attribute store rejected a read or write
    #[error("Attribute store error: {0}")]
    Store(String),
}

/// Result alias used throughout the crate
pub type Result<T, E = MetadataError> = std::result::Result<T, E>;

impl MetadataError {
    pub(crate) fn parse(format: Format, message: impl Into<String>) -> Self {
        MetadataError::Parse {
            format,
            message: message.into(),
        }
    }

    pub(crate) fn serialization(format: Format, message: impl Into<String>) -> Self {
        MetadataError::Serialization {
            format,
            message: message.into(),
        }
    }

    /// Prefix the field path carried by the error.
    ///
    /// Used when an item of an `object_list` field fails, so the error names
    /// the item (`filters[1].name`) rather than the bare item field.
    pub fn with_path_prefix(self, prefix: &str) -> Self {
        match self {
            MetadataError::Validation(err) => MetadataError::Validation(err.with_prefix(prefix)),
            MetadataError::UnknownField { entity, key } => MetadataError::UnknownField {
                entity,
                key: format!("{}.{}", prefix, key),
            },
            MetadataError::MissingRequired { entity, paths } => MetadataError::MissingRequired {
                entity,
                paths: paths
                    .into_iter()
                    .map(|p| format!("{}.{}", prefix, p))
                    .collect(),
            },
            other => other,
        }
    }

    /// Field path the error refers to, when there is one
    pub fn path(&self) -> Option<&str> {
        match self {
            MetadataError::Validation(err) => Some(&err.path),
            MetadataError::UnknownField { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Whether the error came from malformed input rather than bad values
    pub fn is_parse_error(&self) -> bool {
        matches!(self, MetadataError::Parse { .. })
    }

    /// Whether the error is a value validation failure
    pub fn is_validation_error(&self) -> bool {
        matches!(self, MetadataError::Validation(_))
    }
}
