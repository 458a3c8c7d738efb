//! Shared field-level parsing for the line-oriented readers.
//!
//! Every reader in this crate follows the same shape: split a line into
//! fields, pull typed values out of fixed positions, and turn any failure
//! into a [`ParseError`] that the caller either logs-and-skips or escalates.
//! The helpers here keep that last step uniform so each reader only has to
//! describe its column layout.

use std::str::FromStr;

use thiserror::Error;

use crate::timestamp::TimestampError;

/// Errors that can occur while parsing a single record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Invalid record format: {0}")]
    InvalidFormat(String),

    #[error("Invalid number for {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(#[from] TimestampError),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Result type for record parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Returns true for empty or whitespace-only lines.
#[inline]
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Split a line on commas, trimming each field.
pub fn comma_fields(line: &str) -> Vec<&str> {
    line.trim().split(',').map(str::trim).collect()
}

/// Split a line on runs of whitespace.
pub fn whitespace_fields(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Fetch the field at `index`, or report it as missing under `name`.
pub fn field<'a>(fields: &[&'a str], index: usize, name: &'static str) -> ParseResult<&'a str> {
    fields
        .get(index)
        .copied()
        .ok_or(ParseError::MissingField(name))
}

/// Parse a numeric value, reporting failures under `name`.
///
/// Surrounding whitespace is ignored; an empty value counts as missing.
pub fn parse_number<T: FromStr>(value: &str, name: &'static str) -> ParseResult<T> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ParseError::MissingField(name));
    }
    value.parse::<T>().map_err(|_| ParseError::InvalidNumber {
        field: name,
        value: value.to_string(),
    })
}

/// Fetch and parse the numeric field at `index`.
pub fn number_field<T: FromStr>(
    fields: &[&str],
    index: usize,
    name: &'static str,
) -> ParseResult<T> {
    parse_number(field(fields, index, name)?, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_fields_trims() {
        let fields = comma_fields("  ST01 , 2023-01-01T00:00:00Z,  \n");
        assert_eq!(fields, vec!["ST01", "2023-01-01T00:00:00Z", ""]);
    }

    #[test]
    fn test_whitespace_fields() {
        let fields = whitespace_fields("1  2023\t06 19\n");
        assert_eq!(fields, vec!["1", "2023", "06", "19"]);
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("   \t\r"));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn test_field_missing() {
        let fields = vec!["a", "b"];
        assert_eq!(field(&fields, 1, "second").unwrap(), "b");
        assert_eq!(
            field(&fields, 2, "third"),
            Err(ParseError::MissingField("third"))
        );
    }

    #[test]
    fn test_number_field() {
        let fields = vec!["38.08514", "abc", " 7 ", ""];
        assert!((number_field::<f64>(&fields, 0, "latitude").unwrap() - 38.08514).abs() < 1e-12);
        assert_eq!(
            number_field::<f64>(&fields, 1, "longitude"),
            Err(ParseError::InvalidNumber {
                field: "longitude",
                value: "abc".to_string()
            })
        );
        assert_eq!(number_field::<u32>(&fields, 2, "count").unwrap(), 7);
        assert_eq!(
            number_field::<f64>(&fields, 3, "depth"),
            Err(ParseError::MissingField("depth"))
        );
        assert_eq!(
            number_field::<f64>(&fields, 9, "magnitude"),
            Err(ParseError::MissingField("magnitude"))
        );
    }

    #[test]
    fn test_negative_and_exponent_numbers() {
        assert_eq!(parse_number::<f64>("-121.8229", "lon").unwrap(), -121.8229);
        assert_eq!(parse_number::<f64>("1e3", "depth").unwrap(), 1000.0);
        assert!(parse_number::<i64>("1.5", "index").is_err());
    }
}
