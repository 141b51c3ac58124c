//! Convert command implementation

use clap::ValueEnum;

use crate::cli::error::CliError;

use super::{load_input, load_record, record_config};

/// Output format for the `convert` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Nested JSON
    Json,
    /// JSON with dotted keys
    FlatJson,
    Xml,
}

/// Arguments for the `convert` command
pub struct ConvertArgs {
    /// Entity the document describes
    pub entity: String,
    /// Input file path, or `-` for stdin
    pub input: String,
    pub to: OutputFormat,
    /// Indent JSON output
    pub pretty: bool,
    /// Skip unknown keys instead of failing
    pub ignore_unknown: bool,
}

/// Handle the convert command
///
/// Values are validated on the way in; required fields are not enforced so
/// partial documents can be converted.
pub fn handle_convert(args: &ConvertArgs) -> Result<String, CliError> {
    let content = load_input(&args.input)?;
    let record = load_record(
        &args.entity,
        &content,
        record_config(args.ignore_unknown, args.pretty),
    )?;

    let output = match args.to {
        OutputFormat::Json => record.to_json(true)?,
        OutputFormat::FlatJson => record.to_json(false)?,
        OutputFormat::Xml => record.to_xml()?,
    };
    Ok(output)
}
