//! Header-versus-detail classification for the mixed-line formats.
//!
//! The phase and common-receiver files interleave event header lines with
//! the detail lines that belong to them. Each format has its own cheap test:
//!
//! ```text
//! Hypoinverse-Output   header starts with "202"       (year 202x)
//! TomoATT-Input        second token is 4 chars long   (a year)
//! common-receiver      header starts with '#'
//! ```
//!
//! The Hypoinverse test only recognizes events from 2020-2029. That is a
//! property of the format convention and is kept as is.

use std::fmt;

use crate::parser::{ParseError, ParseResult};

/// The line conventions that mix header and detail lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineFormat {
    HypoinverseOutput,
    TomoAttInput,
    CommonReceiver,
}

impl fmt::Display for LineFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineFormat::HypoinverseOutput => write!(f, "Hypoinverse-Output"),
            LineFormat::TomoAttInput => write!(f, "TomoATT-Input"),
            LineFormat::CommonReceiver => write!(f, "common-receiver"),
        }
    }
}

/// What a line is within its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header,
    Detail,
}

/// Check whether a line is an event header in the given format.
///
/// For [`LineFormat::TomoAttInput`] a line with fewer than two tokens cannot
/// be classified and yields [`ParseError::MissingField`]; callers skip blank
/// lines before asking.
pub fn is_event_line(line: &str, format: LineFormat) -> ParseResult<bool> {
    match format {
        LineFormat::HypoinverseOutput => Ok(line.starts_with("202")),
        LineFormat::TomoAttInput => line
            .split_whitespace()
            .nth(1)
            .map(|token| token.chars().count() == 4)
            .ok_or(ParseError::MissingField("second token")),
        LineFormat::CommonReceiver => Ok(line.starts_with('#')),
    }
}

/// Classify a line as header or detail.
#[inline]
pub fn classify(line: &str, format: LineFormat) -> ParseResult<LineKind> {
    Ok(if is_event_line(line, format)? {
        LineKind::Header
    } else {
        LineKind::Detail
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hypoinverse_classification() {
        let f = LineFormat::HypoinverseOutput;
        assert!(is_event_line("2023-05-04T23:23:05.759223Z,37.8,-122.0,8.1,2.1,ev1", f).unwrap());
        assert!(is_event_line("20230504232305.91,37.8,-122.0,8.1,2.1", f).unwrap());
        assert!(!is_event_line("BKS,2023-05-04T23:23:07Z,2023-05-04T23:23:09Z", f).unwrap());
        // Raw prefix only: leading whitespace defeats it.
        assert!(!is_event_line(" 2023-05-04T23:23:05Z,37.8,-122.0,8.1", f).unwrap());
        // Decade-specific.
        assert!(!is_event_line("2019-05-04T23:23:05Z,37.8,-122.0,8.1", f).unwrap());
    }

    #[test]
    fn test_tomoatt_classification() {
        let f = LineFormat::TomoAttInput;
        assert!(
            is_event_line(
                "1 2023 5 4 23 23 5.759223 37.8 -122.0 8.1 2.1 12 ev1",
                f
            )
            .unwrap()
        );
        assert!(
            !is_event_line("1 0 BKS 37.87 -122.24 243.0 P 3.21", f).unwrap()
        );
        // A four-character receiver index still looks like a year.
        assert!(is_event_line("1 1000 BKS 37.87 -122.24 243.0 P 3.21", f).unwrap());
    }

    #[test]
    fn test_tomoatt_short_line_is_an_error() {
        assert_eq!(
            is_event_line("lonely", LineFormat::TomoAttInput),
            Err(ParseError::MissingField("second token"))
        );
        assert!(is_event_line("", LineFormat::TomoAttInput).is_err());
    }

    #[test]
    fn test_common_receiver_classification() {
        let f = LineFormat::CommonReceiver;
        assert_eq!(classify("# 101 202 0.9", f).unwrap(), LineKind::Header);
        assert_eq!(classify("#101 202", f).unwrap(), LineKind::Header);
        assert_eq!(classify("BKS 3.2 3.1 P", f).unwrap(), LineKind::Detail);
        assert_eq!(classify("", f).unwrap(), LineKind::Detail);
    }

    #[test]
    fn test_display() {
        assert_eq!(LineFormat::TomoAttInput.to_string(), "TomoATT-Input");
        assert_eq!(LineFormat::HypoinverseOutput.to_string(), "Hypoinverse-Output");
    }
}
