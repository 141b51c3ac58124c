//! CLI error types

use std::path::PathBuf;

use thiserror::Error;

use crate::error::MetadataError;
use crate::schema::SchemaError;

/// Errors reported by `mt-metadata` commands
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read file {}: {1}", .0.display())]
    FileReadError(PathBuf, String),

    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        CliError::Metadata(e.into())
    }
}
