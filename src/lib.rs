//! MT Metadata - schema-driven metadata for magnetotelluric surveys
//!
//! Provides:
//! - A catalog of field rules per entity (survey, station, run, channel, ...)
//! - Validation and coercion of attribute values against those rules
//! - Dotted-key access and flat/nested conversion
//! - JSON, XML and attribute-store (de)serialization of metadata records
//!
//! ## Example
//!
//! ```rust
//! use mt_metadata::{MetadataError, MetadataRecord};
//!
//! let mut run = MetadataRecord::for_entity("run")?;
//! run.set("id", "001")?;
//! run.set("sample_rate", "256")?;
//! run.finalize()?;
//!
//! let err = run.set("data_type", "seismic").unwrap_err();
//! assert!(matches!(err, MetadataError::Validation(_)));
//! # Ok::<(), MetadataError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod keys;
pub mod record;
pub mod schema;
pub mod store;
pub mod validation;
pub mod xml;

pub use config::{RecordConfig, RecordConfigBuilder, UnknownFieldPolicy};
pub use error::{Format, MetadataError, Result};
pub use keys::{DottedKey, KeyError, flatten, nest};
pub use record::MetadataRecord;
pub use schema::{
    EntityDefinition, EntitySchema, FieldSpec, FieldType, SchemaCatalog, SchemaError,
    standard_catalog,
};
pub use store::{AttributeStore, MemoryStore};
pub use validation::{ValidationError, ValidationErrorKind, validate};
