//! ISO-8601 date and date-time parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

const NAIVE_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
const OFFSET_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];

/// Parse an ISO-8601 date or date-time into UTC.
///
/// Accepts `T` or a single space between date and time, optional fractional
/// seconds and an optional `Z` or numeric offset. Values without an offset
/// are taken to be UTC; a bare date is midnight UTC.
pub fn parse_date_time(input: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("empty value".to_string());
    }
    let text = normalize_separator(trimmed);

    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in OFFSET_DATE_TIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&text, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&text, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
        Ok(date) => date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .ok_or_else(|| "date is out of range".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Parse an ISO-8601 date; a full date-time is truncated to its UTC date.
pub fn parse_date(input: &str) -> Result<NaiveDate, String> {
    let trimmed = input.trim();
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => Ok(date),
        Err(_) => parse_date_time(trimmed).map(|dt| dt.date_naive()),
    }
}

/// Canonical text form: `YYYY-MM-DDTHH:MM:SS[.fff]+00:00`
pub fn format_date_time(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Canonical text form: `YYYY-MM-DD`
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn normalize_separator(text: &str) -> String {
    match text.get(10..11) {
        Some(" ") => format!("{}T{}", &text[..10], text[11..].trim_start()),
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_date_is_midnight_utc() {
        let dt = parse_date_time("2020-02-01").unwrap();
        assert_eq!(format_date_time(&dt), "2020-02-01T00:00:00+00:00");
    }

    #[test]
    fn test_offset_is_converted_to_utc() {
        let dt = parse_date_time("2020-02-01T09:00:00-07:00").unwrap();
        assert_eq!(format_date_time(&dt), "2020-02-01T16:00:00+00:00");
    }

    #[test]
    fn test_space_separator_and_fraction() {
        let dt = parse_date_time("2020-02-01 09:23:45.453670").unwrap();
        assert_eq!(format_date_time(&dt), "2020-02-01T09:23:45.453670+00:00");
    }

    #[test]
    fn test_zulu_suffix() {
        let dt = parse_date_time("2021-06-30T23:59:59Z").unwrap();
        assert_eq!(format_date_time(&dt), "2021-06-30T23:59:59+00:00");
    }

    #[test]
    fn test_compact_offset() {
        let dt = parse_date_time("2021-06-30T12:00:00+0200").unwrap();
        assert_eq!(format_date_time(&dt), "2021-06-30T10:00:00+00:00");
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(parse_date_time("").is_err());
        assert!(parse_date_time("yesterday").is_err());
        assert!(parse_date_time("2020-13-01").is_err());
        assert!(parse_date_time("2020-02-30T00:00:00").is_err());
    }

    #[test]
    fn test_parse_date_truncates_date_time() {
        let date = parse_date("2020-02-01T23:00:00+00:00").unwrap();
        assert_eq!(format_date(&date), "2020-02-01");
        assert!(parse_date("02/01/2020").is_err());
    }

    #[test]
    fn test_canonical_form_is_stable() {
        let first = format_date_time(&parse_date_time("2020-02-01T09:23:45.5Z").unwrap());
        let second = format_date_time(&parse_date_time(&first).unwrap());
        assert_eq!(first, second);
    }
}
