//! Timestamp parsing for catalog and phase records.
//!
//! Three textual shapes show up in the supported formats:
//!
//! ```text
//! 2023-05-04T23:23:05.759223Z      ISO-8601 (catalogs, Hypoinverse arrivals)
//! 20230504232305.91                compact (Hypoinverse event headers)
//! 2023 05 04 23 23 5.759223        discrete fields (TomoATT event headers)
//! ```
//!
//! All of them resolve to a UTC instant with microsecond resolution.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use nom::{
    IResult, Parser,
    bytes::complete::take_while_m_n,
    character::complete::{char, digit0, digit1},
    combinator::{all_consuming, map_res, opt},
    sequence::preceded,
};
use thiserror::Error;
use tracing::warn;

/// Naive ISO layouts tried after RFC 3339. Seconds fractions are optional.
const NAIVE_ISO_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Errors produced while converting text into a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("unrecognized ISO-8601 timestamp '{0}'")]
    Iso(String),

    #[error("unrecognized compact timestamp '{0}' (expected YYYYMMDDHHMMSS.ffffff)")]
    Compact(String),

    #[error("invalid seconds field '{0}'")]
    Seconds(String),

    #[error("date/time fields out of range: {0:?}")]
    OutOfRange(TimeFields),
}

/// Discrete calendar fields of a UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub microsecond: u32,
}

impl TimeFields {
    /// Build the UTC instant, rejecting impossible dates and times.
    pub fn to_utc(self) -> Result<DateTime<Utc>, TimestampError> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .and_then(|date| {
                date.and_hms_micro_opt(self.hour, self.minute, self.second, self.microsecond)
            })
            .map(|naive| naive.and_utc())
            .ok_or(TimestampError::OutOfRange(self))
    }
}

/// Parse an ISO-8601-like timestamp.
///
/// Accepts RFC 3339 (with `Z` or an offset) and the common naive layouts,
/// which are taken as UTC. A bare date means midnight.
pub fn parse_iso(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let text = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc).trunc_subsecs(6));
    }

    let naive_text = text.strip_suffix('Z').unwrap_or(text);
    for format in NAIVE_ISO_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive_text, format) {
            return Ok(naive.and_utc().trunc_subsecs(6));
        }
    }

    if let Some(naive) = NaiveDate::parse_from_str(naive_text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }

    Err(TimestampError::Iso(text.to_string()))
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Parse a four-digit year.
fn year4(input: &str) -> IResult<&str, i32> {
    map_res(take_while_m_n(4, 4, is_digit), |s: &str| s.parse::<i32>()).parse(input)
}

/// Parse a two-digit calendar or clock field.
fn two_digits(input: &str) -> IResult<&str, u32> {
    map_res(take_while_m_n(2, 2, is_digit), |s: &str| s.parse::<u32>()).parse(input)
}

/// Parse an optional `.ffff` fraction, returning the digits after the dot.
fn fraction(input: &str) -> IResult<&str, Option<&str>> {
    opt(preceded(char('.'), digit0)).parse(input)
}

/// Scale fractional-second digits to microseconds, truncating past six digits.
fn fraction_to_micros(digits: &str) -> u32 {
    let mut micros = 0;
    let mut scale = 100_000;
    for b in digits.bytes().take(6) {
        micros += u32::from(b - b'0') * scale;
        scale /= 10;
    }
    micros
}

/// Parse a compact `YYYYMMDDHHMMSS[.f]` timestamp.
pub fn parse_compact(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let text = raw.trim();
    let parsed = all_consuming((
        year4, two_digits, two_digits, two_digits, two_digits, two_digits, fraction,
    ))
    .parse(text);

    let (_, (year, month, day, hour, minute, second, frac)) =
        parsed.map_err(|_| TimestampError::Compact(text.to_string()))?;

    TimeFields {
        year,
        month,
        day,
        hour,
        minute,
        second,
        microsecond: frac.map(fraction_to_micros).unwrap_or(0),
    }
    .to_utc()
}

/// Split a seconds token like `5.759223` into whole seconds and microseconds.
///
/// The split is textual, so `5.759223` yields exactly `(5, 759223)`.
pub fn split_seconds(raw: &str) -> Result<(u32, u32), TimestampError> {
    let text = raw.trim();
    let parsed: IResult<&str, (&str, Option<&str>)> =
        all_consuming((digit1, fraction)).parse(text);

    let (_, (whole, frac)) = parsed.map_err(|_| TimestampError::Seconds(text.to_string()))?;
    let second = whole
        .parse::<u32>()
        .map_err(|_| TimestampError::Seconds(text.to_string()))?;
    Ok((second, frac.map(fraction_to_micros).unwrap_or(0)))
}

/// Parse an event-header time: ISO if the text contains `-`, compact otherwise.
pub fn parse_event_time(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    if raw.contains('-') {
        parse_iso(raw)
    } else {
        parse_compact(raw)
    }
}

/// Parse an ISO arrival time, logging and returning `None` on failure.
///
/// `what` names the field in the diagnostic (e.g. "P arrival time").
pub fn parse_or_absent(raw: &str, what: &str) -> Option<DateTime<Utc>> {
    match parse_iso(raw) {
        Ok(time) => Some(time),
        Err(e) => {
            warn!("Error parsing {} '{}': {}", what, raw.trim(), e);
            None
        }
    }
}
