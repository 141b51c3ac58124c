//! FieldSpec catalog
//!
//! Declarative rules for every metadata attribute: semantic type, required
//! flag, default, units, controlled vocabulary and aliases. Entities are
//! defined in YAML (see `schemas/`) and expanded into a read-only
//! [`SchemaCatalog`] once per process.

mod catalog;

pub use catalog::{EntitySchema, SchemaCatalog, standard_catalog};

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Semantic type of a metadata field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Float,
    Integer,
    Boolean,
    /// ISO-8601 date-time, stored in UTC
    DateTime,
    /// ISO-8601 calendar date
    Date,
    /// String restricted to `allowed_values`
    ControlledVocabulary,
    /// Ordered list of names, accepted as a comma-separated string too
    NameList,
    /// Another entity inlined under this field's name
    Object,
    /// List of items that each conform to another entity
    ObjectList,
}

impl FieldType {
    /// Name used in YAML definitions and XML `type` attributes
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Float => "float",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::DateTime => "date_time",
            FieldType::Date => "date",
            FieldType::ControlledVocabulary => "controlled_vocabulary",
            FieldType::NameList => "name_list",
            FieldType::Object => "object",
            FieldType::ObjectList => "object_list",
        }
    }

    /// Whether the type references another entity through `schema`
    pub fn references_entity(&self) -> bool {
        matches!(self, FieldType::Object | FieldType::ObjectList)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule set for a single metadata attribute
///
/// `name` is a dotted key relative to the entity that declares it. After the
/// catalog expands `object` fields, names are full paths such as
/// `location.declination.model`.
///
/// # Example
///
/// ```rust
/// use mt_metadata::schema::{FieldSpec, FieldType};
///
/// let spec = FieldSpec::new("latitude", FieldType::Float)
///     .required()
///     .with_units("degrees")
///     .with_alias("lat");
/// assert_eq!(spec.units.as_deref(), Some("degrees"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Dotted field name
    pub name: String,
    /// Semantic type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Must be set before the record is finalized (default: false)
    #[serde(default)]
    pub required: bool,
    /// Value a new record starts with; absent means unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Physical units, informational
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    /// Permitted values for controlled vocabularies
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
    /// Alternate names accepted on input
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alias: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Referenced entity for `object` and `object_list` fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl FieldSpec {
    /// Create an optional field with no default
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            default: None,
            units: None,
            allowed_values: Vec::new(),
            alias: Vec::new(),
            description: String::new(),
            example: None,
            schema: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias.push(alias.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_schema(mut self, entity: impl Into<String>) -> Self {
        self.schema = Some(entity.into());
        self
    }

    /// Value a new record starts with (`null` when no default is declared)
    pub fn default_value(&self) -> Value {
        self.default.clone().unwrap_or(Value::Null)
    }
}

/// One entity as written in a YAML definition, before expansion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub fields: Vec<FieldSpec>,
}

impl EntityDefinition {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            fields,
        }
    }
}

/// Errors raised while building a schema catalog
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Failed to parse schema definition: {0}")]
    Parse(String),

    #[error("Entity '{0}' is defined more than once")]
    DuplicateEntity(String),

    #[error("Unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("Entity '{entity}' declares field '{field}' more than once")]
    DuplicateField { entity: String, field: String },

    #[error("Entity '{entity}', field '{field}': {reason}")]
    InvalidField {
        entity: String,
        field: String,
        reason: String,
    },

    #[error("Entity '{0}' references itself through nested fields")]
    Cycle(String),
}

impl From<serde_yaml::Error> for SchemaError {
    fn from(e: serde_yaml::Error) -> Self {
        SchemaError::Parse(e.to_string())
    }
}
