//! Attribute validation
//!
//! Coerces raw values into the semantic type declared by a [`FieldSpec`]:
//! - strings, floats, integers and booleans
//! - controlled vocabularies
//! - ISO-8601 dates and date-times
//! - comma-separated name lists
//! - lists of nested objects (shape only; items are checked by the record)
//!
//! [`FieldSpec`]: crate::schema::FieldSpec

mod coerce;
pub mod temporal;

pub use coerce::{validate, value_kind};

use serde::Serialize;
use thiserror::Error;

use crate::schema::FieldType;

/// What went wrong while coercing a value
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum ValidationErrorKind {
    /// The raw value has a JSON type that cannot become the target type
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: FieldType,
        found: &'static str,
    },

    /// A string could not be read as a number
    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),

    /// NaN or infinity
    #[error("{0} is not a finite number")]
    NotFinite(String),

    /// The value does not fit in a 64-bit signed integer
    #[error("{0} is out of range for an integer")]
    OutOfRange(String),

    /// Not one of the accepted boolean tokens
    #[error("'{0}' is not a recognised boolean")]
    InvalidBoolean(String),

    /// Controlled vocabulary miss
    #[error("'{value}' is not one of [{}]", .allowed.join(", "))]
    NotAllowed { value: String, allowed: Vec<String> },

    /// Unparseable date or date-time
    #[error("cannot parse '{value}' as {expected}: {reason}")]
    InvalidDateTime {
        value: String,
        expected: FieldType,
        reason: String,
    },
}

/// A value that failed validation for the field at `path`
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("Invalid value for '{path}': {kind}")]
pub struct ValidationError {
    /// Dotted path of the field
    pub path: String,
    /// Reason for the failure
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Prefix the path, e.g. `name` becomes `filters[0].name`
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.path = format!("{}.{}", prefix, self.path);
        self
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;
