//! Catalog inspection commands

use crate::cli::error::CliError;
use crate::cli::output::{format_entity_list, format_field_table};
use crate::schema::standard_catalog;

/// Handle the `fields <entity>` command
pub fn handle_fields(entity: &str) -> Result<String, CliError> {
    let schema = standard_catalog()?.entity(entity)?;
    Ok(format_field_table(&schema))
}

/// Handle the `entities` command
pub fn handle_entities() -> Result<String, CliError> {
    Ok(format_entity_list(standard_catalog()?))
}
