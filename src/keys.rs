//! Dotted keys and flat/nested conversion
//!
//! A dotted key such as `location.declination.value` addresses a leaf in a
//! nested metadata tree. [`flatten`] and [`nest`] convert between the two
//! shapes and are inverse operations: `nest(&flatten(&tree)?)? == tree`.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::validation::value_kind;

static SEGMENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").unwrap());

/// Errors raised by key parsing and tree conversion
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("Dotted key cannot be empty")]
    Empty,

    #[error("Invalid segment '{segment}' in key '{key}'")]
    InvalidSegment { key: String, segment: String },

    #[error("Key '{0}' contains '.' and cannot be flattened losslessly")]
    DottedSegment(String),

    #[error("Key '{0}' is both a value and the parent of other keys")]
    Conflict(String),

    #[error("Expected an object at the root, found {0}")]
    NotAnObject(&'static str),
}

/// A validated dotted path
///
/// Segments start with a letter or underscore and may contain letters,
/// digits, underscores and hyphens.
///
/// # Examples
///
/// ```
/// use mt_metadata::keys::DottedKey;
///
/// let key = DottedKey::parse("location.declination.value").unwrap();
/// assert_eq!(key.as_str(), "location.declination.value");
/// assert!(DottedKey::parse("location..latitude").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DottedKey(String);

impl DottedKey {
    pub fn parse(key: &str) -> Result<Self, KeyError> {
        if key.is_empty() {
            return Err(KeyError::Empty);
        }
        for segment in key.split('.') {
            if !SEGMENT_REGEX.is_match(segment) {
                return Err(KeyError::InvalidSegment {
                    key: key.to_string(),
                    segment: segment.to_string(),
                });
            }
        }
        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DottedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DottedKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DottedKey::parse(s)
    }
}

impl AsRef<str> for DottedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Join a prefix and a key with a dot, treating an empty prefix as the root
pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Flatten a nested object into dotted keys, preserving order.
///
/// Arrays and scalars are leaves. Empty objects are kept as `{}` leaves so
/// that [`nest`] can rebuild them. Keys that are empty or contain `.` are
/// rejected because they would not survive the round trip.
pub fn flatten(tree: &Value) -> Result<Map<String, Value>, KeyError> {
    let root = tree
        .as_object()
        .ok_or_else(|| KeyError::NotAnObject(value_kind(tree)))?;
    let mut flat = Map::new();
    flatten_into(root, "", &mut flat)?;
    Ok(flat)
}

fn flatten_into(
    object: &Map<String, Value>,
    prefix: &str,
    flat: &mut Map<String, Value>,
) -> Result<(), KeyError> {
    for (key, value) in object {
        if key.is_empty() {
            return Err(KeyError::Empty);
        }
        if key.contains('.') {
            return Err(KeyError::DottedSegment(join_path(prefix, key)));
        }
        let path = join_path(prefix, key);
        match value {
            Value::Object(child) if !child.is_empty() => flatten_into(child, &path, flat)?,
            _ => {
                flat.insert(path, value.clone());
            }
        }
    }
    Ok(())
}

/// Rebuild a nested object from dotted keys.
///
/// The first segment becomes a top-level key, intermediate segments become
/// sub-objects and the last segment holds the value.
pub fn nest(flat: &Map<String, Value>) -> Result<Value, KeyError> {
    let mut root = Map::new();
    for (key, value) in flat {
        insert_path(&mut root, key, value.clone())?;
    }
    Ok(Value::Object(root))
}

fn insert_path(root: &mut Map<String, Value>, key: &str, value: Value) -> Result<(), KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }
    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(KeyError::InvalidSegment {
            key: key.to_string(),
            segment: String::new(),
        });
    }
    let Some((leaf, parents)) = segments.split_last() else {
        return Err(KeyError::Empty);
    };

    let mut node = root;
    for segment in parents {
        node = match node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()))
        {
            Value::Object(child) => child,
            _ => return Err(KeyError::Conflict(key.to_string())),
        };
    }

    let existing_is_object = node.get(*leaf).map(Value::is_object);
    match existing_is_object {
        None => {
            node.insert(leaf.to_string(), value);
            Ok(())
        }
        // An empty-object leaf adds nothing to a parent that already exists
        Some(true) if value.as_object().is_some_and(|m| m.is_empty()) => Ok(()),
        Some(_) => Err(KeyError::Conflict(key.to_string())),
    }
}
