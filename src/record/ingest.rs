//! Schema-guided ingestion of flat, nested and mixed mappings

use serde_json::{Map, Value};

use super::MetadataRecord;
use crate::config::{RecordConfig, UnknownFieldPolicy};
use crate::error::{MetadataError, Result};
use crate::keys::{KeyError, join_path};
use crate::schema::{EntitySchema, FieldType};
use crate::validation::{validate, value_kind};

/// Resolve every key of `data` to a field position.
///
/// Keys may be canonical names, aliases, or nested objects under a known
/// prefix, in any mix. Unknown keys follow `policy`.
pub(crate) fn collect_assignments<'v>(
    schema: &EntitySchema,
    data: &'v Value,
    policy: UnknownFieldPolicy,
) -> Result<Vec<(usize, &'v Value)>> {
    let object = data
        .as_object()
        .ok_or_else(|| KeyError::NotAnObject(value_kind(data)))?;
    let object = unwrap_root(schema, object);

    let mut assignments = Vec::with_capacity(object.len());
    walk(schema, object, "", policy, &mut assignments)?;
    Ok(assignments)
}

/// `{"station": {...}}` is read as the inner object
fn unwrap_root<'v>(schema: &EntitySchema, object: &'v Map<String, Value>) -> &'v Map<String, Value> {
    let name = schema.name();
    if object.len() != 1 || schema.position(name).is_some() || schema.is_prefix(name) {
        return object;
    }
    match object.get(name) {
        Some(Value::Object(inner)) => inner,
        _ => object,
    }
}

fn walk<'v>(
    schema: &EntitySchema,
    object: &'v Map<String, Value>,
    prefix: &str,
    policy: UnknownFieldPolicy,
    assignments: &mut Vec<(usize, &'v Value)>,
) -> Result<()> {
    for (key, value) in object {
        let path = join_path(prefix, key);
        if let Some(position) = schema.position(&path) {
            assignments.push((position, value));
            continue;
        }
        match value {
            Value::Object(child) if schema.is_prefix(&path) => {
                walk(schema, child, &path, policy, assignments)?;
            }
            _ => match policy {
                UnknownFieldPolicy::Reject => {
                    return Err(MetadataError::UnknownField {
                        entity: schema.name().to_string(),
                        key: path,
                    });
                }
                UnknownFieldPolicy::Ignore => {
                    tracing::warn!(entity = schema.name(), key = %path, "Ignoring unknown metadata field");
                }
            },
        }
    }
    Ok(())
}

/// Validate a raw value for the field at `position`.
///
/// Items of `object_list` fields are validated against their entity and
/// stored as nested mappings holding every item field.
pub(crate) fn coerce_field(
    schema: &EntitySchema,
    position: usize,
    raw: &Value,
    config: &RecordConfig,
) -> Result<Value> {
    let spec = &schema.fields()[position];
    let value = validate(spec, raw)?;
    if spec.field_type != FieldType::ObjectList {
        return Ok(value);
    }
    let Some(item_schema) = schema.item_schema(&spec.name) else {
        return Ok(value);
    };
    let items = match value {
        Value::Array(items) => items,
        other => return Ok(other),
    };

    let items_config = item_config(config);
    let mut canonical = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let mut record = MetadataRecord::with_config(item_schema.clone(), items_config.clone());
        record
            .update_from_dict(item)
            .map_err(|e| e.with_path_prefix(&format!("{}[{}]", spec.name, index)))?;
        canonical.push(record.to_dict(true)?);
    }
    Ok(Value::Array(canonical))
}

/// Configuration for records built from `object_list` items
fn item_config(config: &RecordConfig) -> RecordConfig {
    RecordConfig {
        include_root: false,
        ..config.clone()
    }
}
