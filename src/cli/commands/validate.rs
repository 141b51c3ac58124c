//! Validate command implementation

use crate::cli::error::CliError;

use super::{load_input, load_record, record_config};

/// Arguments for the `validate` command
pub struct ValidateArgs {
    /// Entity the document describes (e.g. `station`)
    pub entity: String,
    /// Input file path, or `-` for stdin
    pub input: String,
    /// Skip unknown keys instead of failing
    pub ignore_unknown: bool,
}

/// Handle the validate command
///
/// Every value is validated against its field and every required field
/// must be set.
pub fn handle_validate(args: &ValidateArgs) -> Result<String, CliError> {
    let content = load_input(&args.input)?;
    let record = load_record(&args.entity, &content, record_config(args.ignore_unknown, false))?;
    record.finalize()?;

    let set = record.iter().filter(|(_, value)| !value.is_null()).count();
    Ok(format!(
        "Validation successful: {} ({} of {} fields set)",
        record.entity(),
        set,
        record.schema().len()
    ))
}
