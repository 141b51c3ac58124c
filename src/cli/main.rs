//! mt-metadata command line

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mt_metadata::cli::commands::convert::{ConvertArgs, OutputFormat, handle_convert};
use mt_metadata::cli::commands::fields::{handle_entities, handle_fields};
use mt_metadata::cli::commands::validate::{ValidateArgs, handle_validate};

#[derive(Parser)]
#[command(name = "mt-metadata", version, about = "Validate and convert magnetotelluric metadata")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a JSON or XML document against an entity schema
    Validate {
        /// Entity the document describes (e.g. station)
        #[arg(short, long)]
        entity: String,
        /// Skip unknown keys instead of failing
        #[arg(long)]
        ignore_unknown: bool,
        /// Input file, or - for stdin
        input: String,
    },
    /// Convert a document between nested JSON, flat JSON and XML
    Convert {
        #[arg(short, long)]
        entity: String,
        #[arg(long, value_enum, default_value = "json")]
        to: OutputFormat,
        /// Indent JSON output
        #[arg(long)]
        pretty: bool,
        #[arg(long)]
        ignore_unknown: bool,
        input: String,
    },
    /// List the fields of an entity
    Fields { entity: String },
    /// List the entities of the built-in catalog
    Entities,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let output = match cli.command {
        Commands::Validate {
            entity,
            ignore_unknown,
            input,
        } => handle_validate(&ValidateArgs {
            entity,
            input,
            ignore_unknown,
        })?,
        Commands::Convert {
            entity,
            to,
            pretty,
            ignore_unknown,
            input,
        } => handle_convert(&ConvertArgs {
            entity,
            input,
            to,
            pretty,
            ignore_unknown,
        })?,
        Commands::Fields { entity } => handle_fields(&entity)?,
        Commands::Entities => handle_entities()?,
    };

    println!("{}", output.trim_end());
    Ok(())
}
