//! Schema catalog construction and lookup

use std::collections::{BTreeMap, HashMap, HashSet};
use std::iter;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::Value;

use super::{EntityDefinition, FieldSpec, FieldType, SchemaError};
use crate::keys::DottedKey;
use crate::validation::validate;

/// Entity definitions shipped with the crate
const STANDARD_DEFINITIONS: &[&str] = &[
    include_str!("../../schemas/person.yaml"),
    include_str!("../../schemas/citation.yaml"),
    include_str!("../../schemas/declination.yaml"),
    include_str!("../../schemas/location.yaml"),
    include_str!("../../schemas/time_period.yaml"),
    include_str!("../../schemas/electrode.yaml"),
    include_str!("../../schemas/filter.yaml"),
    include_str!("../../schemas/channel.yaml"),
    include_str!("../../schemas/run.yaml"),
    include_str!("../../schemas/station.yaml"),
    include_str!("../../schemas/survey.yaml"),
];

static STANDARD_CATALOG: OnceCell<SchemaCatalog> = OnceCell::new();

/// The built-in catalog, built on first use and shared for the process lifetime
pub fn standard_catalog() -> Result<&'static SchemaCatalog, SchemaError> {
    STANDARD_CATALOG.get_or_try_init(|| SchemaCatalog::from_yaml_definitions(STANDARD_DEFINITIONS))
}

/// Expanded, leaf-only field list of one entity
///
/// Fields keep declaration order; `object` fields are replaced by the leaves
/// of the entity they reference, prefixed with the field name.
#[derive(Debug)]
pub struct EntitySchema {
    name: String,
    description: String,
    fields: Vec<FieldSpec>,
    index: HashMap<String, usize>,
    aliases: HashMap<String, usize>,
    prefixes: HashSet<String>,
    item_schemas: HashMap<String, Arc<EntitySchema>>,
}

impl EntitySchema {
    fn new(
        definition: &EntityDefinition,
        fields: Vec<FieldSpec>,
        item_schemas: HashMap<String, Arc<EntitySchema>>,
    ) -> Result<Self, SchemaError> {
        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            if index.insert(field.name.clone(), position).is_some() {
                return Err(SchemaError::DuplicateField {
                    entity: definition.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        let mut aliases = HashMap::new();
        for (position, field) in fields.iter().enumerate() {
            for alias in &field.alias {
                if index.contains_key(alias) || aliases.insert(alias.clone(), position).is_some() {
                    return Err(SchemaError::InvalidField {
                        entity: definition.name.clone(),
                        field: field.name.clone(),
                        reason: format!("alias '{}' collides with another field", alias),
                    });
                }
            }
        }

        let mut prefixes = HashSet::new();
        for path in index.keys().chain(aliases.keys()) {
            for (dot, _) in path.match_indices('.') {
                prefixes.insert(path[..dot].to_string());
            }
        }
        if let Some(field) = fields.iter().find(|f| prefixes.contains(&f.name)) {
            return Err(SchemaError::InvalidField {
                entity: definition.name.clone(),
                field: field.name.clone(),
                reason: "is both a field and the parent of other fields".to_string(),
            });
        }

        Ok(Self {
            name: definition.name.clone(),
            description: definition.description.clone(),
            fields,
            index,
            aliases,
            prefixes,
            item_schemas,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Leaf fields in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of a field by canonical name or alias
    pub fn position(&self, key: &str) -> Option<usize> {
        self.index
            .get(key)
            .or_else(|| self.aliases.get(key))
            .copied()
    }

    /// Field spec by canonical name or alias
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.position(key).map(|position| &self.fields[position])
    }

    /// Whether `path` is the parent of at least one field (e.g. `location`)
    pub fn is_prefix(&self, path: &str) -> bool {
        self.prefixes.contains(path)
    }

    /// Entity the items of an `object_list` field conform to
    pub fn item_schema(&self, field: &str) -> Option<&Arc<EntitySchema>> {
        self.item_schemas.get(field)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }
}

/// Read-only registry of expanded entity schemas
#[derive(Debug, Default)]
pub struct SchemaCatalog {
    entities: BTreeMap<String, Arc<EntitySchema>>,
}

impl SchemaCatalog {
    /// Expand a set of entity definitions.
    ///
    /// Definitions may reference each other in any order; references are
    /// resolved recursively and cycles are rejected. Defaults are validated
    /// and stored in canonical form.
    pub fn from_definitions(definitions: Vec<EntityDefinition>) -> Result<Self, SchemaError> {
        let mut by_name = HashMap::with_capacity(definitions.len());
        let mut order = Vec::with_capacity(definitions.len());
        for definition in definitions {
            if by_name.contains_key(&definition.name) {
                return Err(SchemaError::DuplicateEntity(definition.name));
            }
            order.push(definition.name.clone());
            by_name.insert(definition.name.clone(), definition);
        }

        let mut builder = CatalogBuilder {
            definitions: &by_name,
            resolved: HashMap::new(),
            in_progress: Vec::new(),
        };
        for name in &order {
            builder.resolve(name)?;
        }

        let entities: BTreeMap<String, Arc<EntitySchema>> = builder.resolved.into_iter().collect();
        tracing::debug!(
            entities = entities.len(),
            fields = entities.values().map(|e| e.len()).sum::<usize>(),
            "Built metadata schema catalog"
        );
        Ok(Self { entities })
    }

    /// Parse YAML entity definitions (one entity per document) and expand them
    pub fn from_yaml_definitions(sources: &[&str]) -> Result<Self, SchemaError> {
        let definitions = sources
            .iter()
            .map(|source| serde_yaml::from_str::<EntityDefinition>(source))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_definitions(definitions)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<EntitySchema>> {
        self.entities.get(name)
    }

    /// Shared handle to an entity schema
    pub fn entity(&self, name: &str) -> Result<Arc<EntitySchema>, SchemaError> {
        self.entities
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownEntity(name.to_string()))
    }

    /// Entity names in sorted order
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Arc<EntitySchema>> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

struct CatalogBuilder<'a> {
    definitions: &'a HashMap<String, EntityDefinition>,
    resolved: HashMap<String, Arc<EntitySchema>>,
    in_progress: Vec<String>,
}

impl<'a> CatalogBuilder<'a> {
    fn resolve(&mut self, name: &str) -> Result<Arc<EntitySchema>, SchemaError> {
        if let Some(schema) = self.resolved.get(name) {
            return Ok(schema.clone());
        }
        if self.in_progress.iter().any(|n| n == name) {
            return Err(SchemaError::Cycle(name.to_string()));
        }
        let definitions = self.definitions;
        let definition = definitions
            .get(name)
            .ok_or_else(|| SchemaError::UnknownEntity(name.to_string()))?;

        self.in_progress.push(name.to_string());
        let schema = Arc::new(self.expand(definition)?);
        self.in_progress.pop();

        self.resolved.insert(name.to_string(), schema.clone());
        Ok(schema)
    }

    fn expand(&mut self, definition: &'a EntityDefinition) -> Result<EntitySchema, SchemaError> {
        let mut fields = Vec::with_capacity(definition.fields.len());
        let mut item_schemas = HashMap::new();

        for spec in &definition.fields {
            let invalid = |reason: String| SchemaError::InvalidField {
                entity: definition.name.clone(),
                field: spec.name.clone(),
                reason,
            };

            DottedKey::parse(&spec.name).map_err(|e| invalid(e.to_string()))?;
            for alias in &spec.alias {
                DottedKey::parse(alias).map_err(|e| invalid(e.to_string()))?;
            }
            if !spec.allowed_values.is_empty()
                && spec.field_type != FieldType::ControlledVocabulary
            {
                return Err(invalid(
                    "allowed_values only apply to controlled_vocabulary fields".to_string(),
                ));
            }
            let referenced = match (&spec.schema, spec.field_type.references_entity()) {
                (Some(entity), true) => Some(self.resolve(entity)?),
                (None, true) => {
                    return Err(invalid(format!(
                        "{} fields must name a schema",
                        spec.field_type
                    )));
                }
                (Some(_), false) => {
                    return Err(invalid(format!(
                        "{} fields cannot reference a schema",
                        spec.field_type
                    )));
                }
                (None, false) => None,
            };

            match (spec.field_type, referenced) {
                (FieldType::Object, Some(child)) => {
                    if spec.default.is_some() {
                        return Err(invalid("object fields cannot declare a default".to_string()));
                    }
                    for leaf in child.fields() {
                        let mut nested = leaf.clone();
                        nested.name = format!("{}.{}", spec.name, leaf.name);
                        nested.required = spec.required && leaf.required;
                        nested.alias = expand_aliases(spec, leaf);
                        fields.push(nested);
                    }
                    for (field, item) in &child.item_schemas {
                        item_schemas.insert(format!("{}.{}", spec.name, field), item.clone());
                    }
                }
                (FieldType::ObjectList, Some(item)) => {
                    match &spec.default {
                        None | Some(Value::Null) => {}
                        Some(Value::Array(items)) if items.is_empty() => {}
                        Some(_) => {
                            return Err(invalid(
                                "object_list defaults must be null or empty".to_string(),
                            ));
                        }
                    }
                    item_schemas.insert(spec.name.clone(), item);
                    fields.push(spec.clone());
                }
                _ => {
                    if spec.field_type == FieldType::ControlledVocabulary
                        && spec.allowed_values.is_empty()
                    {
                        return Err(invalid(
                            "controlled vocabularies must list allowed_values".to_string(),
                        ));
                    }
                    let mut leaf = spec.clone();
                    if let Some(default) = &spec.default {
                        let canonical = validate(spec, default)
                            .map_err(|e| invalid(format!("invalid default: {}", e.kind)))?;
                        leaf.default = Some(canonical).filter(|v| !v.is_null());
                    }
                    fields.push(leaf);
                }
            }
        }

        EntitySchema::new(definition, fields, item_schemas)
    }
}

/// Alias paths for a leaf inlined under `parent`: every combination of the
/// parent's names with the leaf's names, except the canonical one.
fn expand_aliases(parent: &FieldSpec, leaf: &FieldSpec) -> Vec<String> {
    let canonical = format!("{}.{}", parent.name, leaf.name);
    let parent_names: Vec<&str> = iter::once(parent.name.as_str())
        .chain(parent.alias.iter().map(String::as_str))
        .collect();
    let leaf_names: Vec<&str> = iter::once(leaf.name.as_str())
        .chain(leaf.alias.iter().map(String::as_str))
        .collect();

    let mut aliases = Vec::new();
    for parent_name in &parent_names {
        for leaf_name in &leaf_names {
            let alias = format!("{}.{}", parent_name, leaf_name);
            if alias != canonical && !aliases.contains(&alias) {
                aliases.push(alias);
            }
        }
    }
    aliases
}
