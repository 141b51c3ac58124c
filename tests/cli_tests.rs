//! CLI command tests
#![cfg(feature = "cli")]

use std::fs;

use mt_metadata::cli::CliError;
use mt_metadata::cli::commands::convert::{ConvertArgs, OutputFormat, handle_convert};
use mt_metadata::cli::commands::fields::{handle_entities, handle_fields};
use mt_metadata::cli::commands::validate::{ValidateArgs, handle_validate};
use mt_metadata::{MetadataError, MetadataRecord, standard_catalog};
use tempfile::TempDir;

const RUN_JSON: &str = r#"{"run": {"id": "MT001a", "sample_rate": "256", "channels_recorded_electric": "ex, ey"}}"#;

fn write_input(temp: &TempDir, name: &str, content: &str) -> String {
    let path = temp.path().join(name);
    fs::write(&path, content).unwrap();
    path.display().to_string()
}

mod validate_command_tests {
    use super::*;

    #[test]
    fn test_valid_document() {
        let temp = TempDir::new().unwrap();
        let input = write_input(&temp, "run.json", RUN_JSON);
        let report = handle_validate(&ValidateArgs {
            entity: "run".to_string(),
            input,
            ignore_unknown: false,
        })
        .unwrap();
        assert!(report.starts_with("Validation successful: run"));
    }

    #[test]
    fn test_missing_required_fields() {
        let temp = TempDir::new().unwrap();
        let input = write_input(&temp, "station.json", r#"{"id": "MT001"}"#);
        let err = handle_validate(&ValidateArgs {
            entity: "station".to_string(),
            input,
            ignore_unknown: false,
        })
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::Metadata(MetadataError::MissingRequired { .. })
        ));
    }

    #[test]
    fn test_unknown_keys() {
        let temp = TempDir::new().unwrap();
        let input = write_input(
            &temp,
            "run.json",
            r#"{"id": "a", "sample_rate": 1, "logger_colour": "red"}"#,
        );
        let strict = handle_validate(&ValidateArgs {
            entity: "run".to_string(),
            input: input.clone(),
            ignore_unknown: false,
        });
        assert!(strict.is_err());

        let lenient = handle_validate(&ValidateArgs {
            entity: "run".to_string(),
            input,
            ignore_unknown: true,
        });
        assert!(lenient.is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = handle_validate(&ValidateArgs {
            entity: "run".to_string(),
            input: "/no/such/run.json".to_string(),
            ignore_unknown: false,
        })
        .unwrap_err();
        assert!(matches!(err, CliError::FileReadError(_, _)));
    }
}

mod convert_command_tests {
    use super::*;

    fn convert(input: String, to: OutputFormat) -> String {
        handle_convert(&ConvertArgs {
            entity: "run".to_string(),
            input,
            to,
            pretty: false,
            ignore_unknown: false,
        })
        .unwrap()
    }

    #[test]
    fn test_json_to_xml_and_back() {
        let temp = TempDir::new().unwrap();
        let json_input = write_input(&temp, "run.json", RUN_JSON);
        let xml = convert(json_input, OutputFormat::Xml);
        assert!(xml.contains("<run>"));

        let xml_input = write_input(&temp, "run.xml", &xml);
        let json = convert(xml_input, OutputFormat::Json);

        let schema = standard_catalog().unwrap().entity("run").unwrap();
        let expected = MetadataRecord::from_json(schema.clone(), RUN_JSON).unwrap();
        assert_eq!(MetadataRecord::from_json(schema, &json).unwrap(), expected);
    }

    #[test]
    fn test_flat_json() {
        let temp = TempDir::new().unwrap();
        let input = write_input(&temp, "run.json", RUN_JSON);
        let flat = convert(input, OutputFormat::FlatJson);
        assert!(flat.contains("\"time_period.start\":\"1980-01-01T00:00:00+00:00\""));
    }
}

mod catalog_command_tests {
    use super::*;

    #[test]
    fn test_fields() {
        let table = handle_fields("electrode").unwrap();
        assert!(table.starts_with("electrode ("));
        assert!(table.contains("latitude"));
        assert!(handle_fields("volcano").is_err());
    }

    #[test]
    fn test_entities() {
        let list = handle_entities().unwrap();
        for entity in ["channel", "run", "station", "survey"] {
            assert!(list.contains(entity));
        }
    }
}
