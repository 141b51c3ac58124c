//! Metadata records
//!
//! A [`MetadataRecord`] holds one value per field of an [`EntitySchema`], in
//! declaration order, addressed by dotted keys. Values are validated when
//! they are assigned; required fields are only enforced by
//! [`MetadataRecord::finalize`], so an incomplete record is a valid
//! intermediate state.
//!
//! ## Example
//!
//! ```rust
//! use mt_metadata::MetadataRecord;
//!
//! let mut station = MetadataRecord::for_entity("station")?;
//! station.set("id", "MT001")?;
//! station.set("location.latitude", "40.5")?;
//! assert_eq!(station.get("location.latitude")?, &serde_json::json!(40.5));
//!
//! let json = station.to_json(true)?;
//! assert!(json.contains("\"latitude\":40.5"));
//! # Ok::<(), mt_metadata::MetadataError>(())
//! ```

mod ingest;

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::RecordConfig;
use crate::error::{Format, MetadataError, Result};
use crate::keys;
use crate::schema::{EntitySchema, FieldType, standard_catalog};
use crate::store::AttributeStore;
use crate::xml;

/// Values for every field of one entity
#[derive(Debug, Clone)]
pub struct MetadataRecord {
    schema: Arc<EntitySchema>,
    config: RecordConfig,
    values: Vec<Value>,
}

impl PartialEq for MetadataRecord {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name() && self.values == other.values
    }
}

impl MetadataRecord {
    /// Create a record holding the schema's declared defaults
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        Self::with_config(schema, RecordConfig::default())
    }

    pub fn with_config(schema: Arc<EntitySchema>, config: RecordConfig) -> Self {
        let values = schema.fields().iter().map(|f| f.default_value()).collect();
        Self {
            schema,
            config,
            values,
        }
    }

    /// Create a record for an entity of the standard catalog
    pub fn for_entity(name: &str) -> Result<Self> {
        let schema = standard_catalog()?.entity(name)?;
        Ok(Self::new(schema))
    }

    /// Build a record from a flat, nested or mixed mapping
    pub fn from_dict(schema: Arc<EntitySchema>, data: &Value) -> Result<Self> {
        let mut record = Self::new(schema);
        record.update_from_dict(data)?;
        Ok(record)
    }

    pub fn from_json(schema: Arc<EntitySchema>, json: &str) -> Result<Self> {
        let mut record = Self::new(schema);
        record.update_from_json(json)?;
        Ok(record)
    }

    pub fn from_xml(schema: Arc<EntitySchema>, xml: &str) -> Result<Self> {
        let mut record = Self::new(schema);
        record.update_from_xml(xml)?;
        Ok(record)
    }

    /// Build a record from the attributes of a store node
    pub fn from_store<S: AttributeStore + ?Sized>(
        schema: Arc<EntitySchema>,
        store: &S,
        node: &str,
    ) -> Result<Self> {
        let mut record = Self::new(schema);
        record.read_attrs(store, node)?;
        Ok(record)
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    /// Entity name, e.g. `station`
    pub fn entity(&self) -> &str {
        self.schema.name()
    }

    pub fn config(&self) -> &RecordConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RecordConfig) {
        self.config = config;
    }

    fn position(&self, key: &str) -> Result<usize> {
        self.schema
            .position(key)
            .ok_or_else(|| MetadataError::UnknownField {
                entity: self.entity().to_string(),
                key: key.to_string(),
            })
    }

    /// Current value of a field (canonical name or alias)
    pub fn get(&self, key: &str) -> Result<&Value> {
        let position = self.position(key)?;
        Ok(&self.values[position])
    }

    /// Validate and assign a value. The record is unchanged on error.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let position = self.position(key)?;
        let coerced = ingest::coerce_field(&self.schema, position, &value.into(), &self.config)?;
        self.values[position] = coerced;
        Ok(())
    }

    /// Clear a field back to `null`
    pub fn unset(&mut self, key: &str) -> Result<()> {
        let position = self.position(key)?;
        self.values[position] = Value::Null;
        Ok(())
    }

    /// Restore every field to its declared default
    pub fn reset(&mut self) {
        self.values = self
            .schema
            .fields()
            .iter()
            .map(|f| f.default_value())
            .collect();
    }

    pub fn is_set(&self, key: &str) -> Result<bool> {
        Ok(!self.get(key)?.is_null())
    }

    /// `(dotted key, value)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .zip(self.values.iter())
    }

    /// Paths of required fields that are unset, including fields of
    /// `object_list` items (`filters[0].name`)
    pub fn missing_required(&self) -> Vec<String> {
        let values: Vec<Option<&Value>> = self.values.iter().map(Some).collect();
        let mut missing = Vec::new();
        collect_missing(&self.schema, &values, "", &mut missing);
        missing
    }

    /// Check that every required field is set
    pub fn finalize(&self) -> Result<()> {
        let missing = self.missing_required();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MetadataError::MissingRequired {
                entity: self.entity().to_string(),
                paths: missing,
            })
        }
    }

    /// Flat mapping of every field, unset fields as `null`
    pub fn to_flat(&self) -> Map<String, Value> {
        self.iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    /// Flat or nested mapping, wrapped in the entity name when configured
    pub fn to_dict(&self, nested: bool) -> Result<Value> {
        let flat = self.to_flat();
        let body = if nested {
            keys::nest(&flat)?
        } else {
            Value::Object(flat)
        };
        if !self.config.include_root {
            return Ok(body);
        }
        let mut root = Map::new();
        root.insert(self.entity().to_string(), body);
        Ok(Value::Object(root))
    }

    /// Flat or nested JSON; unset fields are emitted as `null`
    pub fn to_json(&self, nested: bool) -> Result<String> {
        let dict = self.to_dict(nested)?;
        let json = if self.config.pretty_json {
            serde_json::to_string_pretty(&dict)
        } else {
            serde_json::to_string(&dict)
        };
        json.map_err(|e| MetadataError::serialization(Format::Json, e.to_string()))
    }

    /// [`to_json`](Self::to_json) after [`finalize`](Self::finalize)
    pub fn to_json_checked(&self, nested: bool) -> Result<String> {
        self.finalize()?;
        self.to_json(nested)
    }

    /// XML with one element per dotted segment
    pub fn to_xml(&self) -> Result<String> {
        xml::write_record(self)
    }

    /// Validate and assign every value in a flat, nested or mixed mapping.
    ///
    /// A single top-level key equal to the entity name is unwrapped. Either
    /// every value is assigned or, on error, none is.
    pub fn update_from_dict(&mut self, data: &Value) -> Result<()> {
        let assignments =
            ingest::collect_assignments(&self.schema, data, self.config.unknown_fields)?;
        let mut staged = self.values.clone();
        for (position, raw) in assignments {
            staged[position] = ingest::coerce_field(&self.schema, position, raw, &self.config)?;
        }
        self.values = staged;
        Ok(())
    }

    pub fn update_from_json(&mut self, json: &str) -> Result<()> {
        let data: Value = serde_json::from_str(json)
            .map_err(|e| MetadataError::parse(Format::Json, e.to_string()))?;
        self.update_from_dict(&data)
    }

    pub fn update_from_xml(&mut self, xml: &str) -> Result<()> {
        let data = xml::read_dict(&self.schema, xml)?;
        self.update_from_dict(&data)
    }

    /// Write every field as an attribute of `node`, keyed by dotted name
    pub fn write_attrs<S: AttributeStore + ?Sized>(&self, store: &mut S, node: &str) -> Result<()> {
        for (key, value) in self.iter() {
            store.set_attr(node, key, value.clone())?;
        }
        Ok(())
    }

    /// Validate and assign the attributes stored on `node`
    pub fn read_attrs<S: AttributeStore + ?Sized>(&mut self, store: &S, node: &str) -> Result<()> {
        let mut flat = Map::new();
        for key in store.attr_keys(node)? {
            if let Some(value) = store.get_attr(node, &key)? {
                flat.insert(key, value);
            }
        }
        self.update_from_dict(&Value::Object(flat))
    }
}

/// Append the unset required fields of `schema` to `missing`.
///
/// `values` holds one entry per field; `None` means the key is absent.
/// Stored `object_list` items are nested mappings, so their fields are
/// looked up by JSON pointer.
fn collect_missing(
    schema: &EntitySchema,
    values: &[Option<&Value>],
    prefix: &str,
    missing: &mut Vec<String>,
) {
    for (spec, value) in schema.fields().iter().zip(values) {
        let path = format!("{}{}", prefix, spec.name);
        let value = match value {
            Some(value) if !value.is_null() => *value,
            _ => {
                if spec.required {
                    missing.push(path);
                }
                continue;
            }
        };
        if spec.field_type != FieldType::ObjectList {
            continue;
        }
        let (Some(item_schema), Some(items)) = (schema.item_schema(&spec.name), value.as_array())
        else {
            continue;
        };
        for (index, item) in items.iter().enumerate() {
            let item_values: Vec<Option<&Value>> = item_schema
                .fields()
                .iter()
                .map(|f| item.pointer(&format!("/{}", f.name.replace('.', "/"))))
                .collect();
            collect_missing(item_schema, &item_values, &format!("{}[{}].", path, index), missing);
        }
    }
}
