//! Attribute validation tests

use mt_metadata::{FieldSpec, FieldType, ValidationErrorKind, validate};
use serde_json::{Value, json};

fn spec(field_type: FieldType) -> FieldSpec {
    FieldSpec::new("field", field_type)
}

mod scalar_tests {
    use super::*;

    #[test]
    fn test_boolean_tokens() {
        let s = spec(FieldType::Boolean);
        for token in ["true", "True", "TRUE", "yes", "y", "1"] {
            assert_eq!(validate(&s, &json!(token)).unwrap(), json!(true), "{}", token);
        }
        for token in ["false", "False", "FALSE", "no", "n", "0"] {
            assert_eq!(validate(&s, &json!(token)).unwrap(), json!(false), "{}", token);
        }
        assert_eq!(validate(&s, &json!(1)).unwrap(), json!(true));
        assert!(matches!(
            validate(&s, &json!("maybe")).unwrap_err().kind,
            ValidationErrorKind::InvalidBoolean(_)
        ));
        assert!(validate(&s, &json!(2)).is_err());
    }

    #[test]
    fn test_string_field_takes_text_form_of_any_value() {
        let s = FieldSpec::new("comments", FieldType::String);
        assert_eq!(validate(&s, &json!(true)).unwrap(), json!("True"));
        assert_eq!(validate(&s, &json!(256)).unwrap(), json!("256"));
        assert_eq!(validate(&s, &json!(["a", "b"])).unwrap(), json!("['a', 'b']"));
        assert_eq!(
            validate(&s, &json!({"gain": 2.0, "note": null})).unwrap(),
            json!("{'gain': 2.0, 'note': None}")
        );
    }

    #[test]
    fn test_integer_from_text_and_floats() {
        let s = spec(FieldType::Integer);
        assert_eq!(validate(&s, &json!(10.9)).unwrap(), json!(10));
        assert_eq!(validate(&s, &json!(-10.9)).unwrap(), json!(-10));
        assert_eq!(validate(&s, &json!("7")).unwrap(), json!(7));
        assert!(validate(&s, &json!("seven")).is_err());
        assert!(validate(&s, &json!(false)).is_err());
    }

    #[test]
    fn test_type_mismatch_reports_kinds() {
        let s = spec(FieldType::Float);
        let err = validate(&s, &json!({"value": 1})).unwrap_err();
        assert_eq!(err.path, "field");
        assert_eq!(
            err.kind,
            ValidationErrorKind::TypeMismatch {
                expected: FieldType::Float,
                found: "object"
            }
        );
        assert_eq!(
            err.to_string(),
            "Invalid value for 'field': expected float, found object"
        );
    }

    #[test]
    fn test_null_means_unset() {
        let s = spec(FieldType::Float).required();
        assert_eq!(validate(&s, &Value::Null).unwrap(), Value::Null);
    }
}

mod vocabulary_tests {
    use super::*;

    fn datum() -> FieldSpec {
        FieldSpec::new("datum", FieldType::ControlledVocabulary)
            .with_allowed_values(["WGS84", "NAD83"])
    }

    #[test]
    fn test_allowed_value_passes() {
        assert_eq!(validate(&datum(), &json!("NAD83")).unwrap(), json!("NAD83"));
    }

    #[test]
    fn test_value_outside_vocabulary() {
        let err = validate(&datum(), &json!("wgs84")).unwrap_err();
        assert_eq!(
            err.kind,
            ValidationErrorKind::NotAllowed {
                value: "wgs84".to_string(),
                allowed: vec!["WGS84".to_string(), "NAD83".to_string()],
            }
        );
    }
}

mod temporal_tests {
    use super::*;

    #[test]
    fn test_date_time_normalized_to_utc() {
        let s = spec(FieldType::DateTime);
        assert_eq!(
            validate(&s, &json!("2020-06-01T12:00:00+02:00")).unwrap(),
            json!("2020-06-01T10:00:00+00:00")
        );
        assert_eq!(
            validate(&s, &json!("2020-06-01")).unwrap(),
            json!("2020-06-01T00:00:00+00:00")
        );
    }

    #[test]
    fn test_invalid_date_time() {
        let s = spec(FieldType::DateTime);
        let err = validate(&s, &json!("June 1st")).unwrap_err();
        assert!(matches!(
            err.kind,
            ValidationErrorKind::InvalidDateTime {
                expected: FieldType::DateTime,
                ..
            }
        ));
        assert!(validate(&s, &json!(20200601)).is_err());
    }

    #[test]
    fn test_date() {
        let s = spec(FieldType::Date);
        assert_eq!(validate(&s, &json!("2020-06-01")).unwrap(), json!("2020-06-01"));
        assert_eq!(
            validate(&s, &json!("2020-06-01T22:00:00-05:00")).unwrap(),
            json!("2020-06-02")
        );
        assert!(validate(&s, &json!("2020-02-30")).is_err());
    }
}

mod list_tests {
    use super::*;

    #[test]
    fn test_name_list_forms() {
        let s = spec(FieldType::NameList);
        assert_eq!(validate(&s, &json!("ex, ey")).unwrap(), json!(["ex", "ey"]));
        assert_eq!(validate(&s, &json!("[hx, hy]")).unwrap(), json!(["hx", "hy"]));
        assert_eq!(
            validate(&s, &json!([" hz ", null, ""])).unwrap(),
            json!(["hz"])
        );
        assert_eq!(validate(&s, &json!("")).unwrap(), json!([]));
        assert!(validate(&s, &json!([["nested"]])).is_err());
    }

    #[test]
    fn test_object_list_shape() {
        let s = spec(FieldType::ObjectList);
        assert!(validate(&s, &json!([{"name": "a"}, {"name": "b"}])).is_ok());
        assert!(validate(&s, &json!("not json")).is_err());
        assert!(validate(&s, &json!(true)).is_err());
    }
}
