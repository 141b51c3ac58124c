//! Output formatting for CLI

use serde_json::Value;

use crate::schema::{EntitySchema, FieldSpec, SchemaCatalog};

const HEADERS: [&str; 5] = ["FIELD", "TYPE", "REQUIRED", "DEFAULT", "UNITS"];

fn field_row(field: &FieldSpec) -> [String; 5] {
    let default = match &field.default {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    [
        field.name.clone(),
        field.field_type.to_string(),
        if field.required { "yes" } else { "no" }.to_string(),
        default,
        field.units.clone().unwrap_or_default(),
    ]
}

/// Format the fields of an entity as an aligned table
pub fn format_field_table(schema: &EntitySchema) -> String {
    let rows: Vec<[String; 5]> = schema.fields().iter().map(field_row).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut output = format!("{} ({} fields)\n", schema.name(), rows.len());
    let header = HEADERS.map(str::to_string);
    for row in std::iter::once(&header).chain(&rows) {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        output.push_str(line.join("  ").trim_end());
        output.push('\n');
    }
    output
}

/// Format the entities of a catalog, one per line with their field counts
pub fn format_entity_list(catalog: &SchemaCatalog) -> String {
    let width = catalog.entity_names().map(str::len).max().unwrap_or(0);
    let mut output = String::new();
    for entity in catalog.entities() {
        output.push_str(&format!(
            "{:<width$}  {} fields\n",
            entity.name(),
            entity.len(),
            width = width
        ));
    }
    output
}
