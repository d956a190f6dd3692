//! Field-level validation helpers for inbound payloads.
//!
//! Errors name the offending field in the `details` object so clients can
//! highlight the input without parsing the message.

use chrono::{NaiveDate, NaiveTime};
use serde_json::json;

use crate::domain::invitation::wall_time;
use crate::domain::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// `invalid_request` for a field that must be present and non-blank.
pub fn missing_field(field: &str) -> Error {
    Error::invalid_request("missing required field").with_details(json!({ "field": field }))
}

/// `invalid_request` for a field whose value failed parsing or validation.
pub fn invalid_field(field: &str, reason: impl Into<String>) -> Error {
    Error::invalid_request("invalid field value")
        .with_details(json!({ "field": field, "reason": reason.into() }))
}

/// Require a present, non-blank text field.
pub fn require_text(field: &str, value: Option<String>) -> Result<String, Error> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(missing_field(field)),
    }
}

/// Parse an ISO calendar date (`YYYY-MM-DD`).
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| invalid_field(field, format!("expected {DATE_FORMAT}")))
}

/// Parse a wall-clock time, accepting both `HH:MM:SS` and `HH:MM`.
pub fn parse_time(field: &str, raw: &str) -> Result<NaiveTime, Error> {
    wall_time::parse(raw.trim()).map_err(|reason| invalid_field(field, reason))
}

/// Parse an optional decimal coordinate.
pub fn parse_f64(field: &str, raw: &str) -> Result<f64, Error> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| invalid_field(field, "expected a decimal number"))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn missing_field_names_the_field() {
        let err = missing_field("title");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.details(), Some(&json!({ "field": "title" })));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(String::new()))]
    #[case(Some("   ".to_owned()))]
    fn require_text_rejects_blank_values(#[case] value: Option<String>) {
        assert!(require_text("title", value).is_err());
    }

    #[test]
    fn require_text_passes_values_through_untrimmed() {
        let value = require_text("title", Some(" Fiesta ".to_owned())).expect("present");
        assert_eq!(value, " Fiesta ");
    }

    #[rstest]
    #[case("2026-09-12", true)]
    #[case(" 2026-09-12 ", true)]
    #[case("12/09/2026", false)]
    #[case("2026-13-01", false)]
    fn date_parsing(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(parse_date("date", raw).is_ok(), ok);
    }

    #[rstest]
    #[case("18:30", true)]
    #[case("18:30:15", true)]
    #[case("6pm", false)]
    fn time_parsing(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(parse_time("time", raw).is_ok(), ok);
    }

    #[rstest]
    #[case("40.4168", true)]
    #[case("-3.7038", true)]
    #[case("north", false)]
    fn coordinate_parsing(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(parse_f64("lat", raw).is_ok(), ok);
    }
}
