//! Reader for earthquake catalogs.
//!
//! Two layouts are supported. Delimited catalogs have no header and put
//! latitude before longitude:
//!
//! ```text
//! 2023-06-19T18:31:37.518071Z,38.08514,37.0428,10.0,4.5
//! ```
//!
//! Spreadsheet catalogs have a header row and put longitude first:
//!
//! ```text
//! | Time                        | Longitude | Latitude | Depth | Magnitude |
//! | 2023-06-19T18:31:37.518071Z | 37.0428   | 38.08514 | 10.0  | 4.5       |
//! ```
//!
//! A bad record aborts a delimited read but is only logged and skipped in a
//! spreadsheet.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{LineError, ReadError, ReadResult, read_file};
use crate::parser::{
    ParseError, ParseResult, comma_fields, field, is_blank, number_field, parse_number,
};
use crate::timestamp::parse_event_time;

/// Catalog file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogFormat {
    /// Comma-separated text, conventionally `.dat`.
    Delimited,
    /// First worksheet of a workbook.
    Spreadsheet,
}

impl CatalogFormat {
    /// Infer the layout from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for CatalogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogFormat::Delimited => write!(f, "delimited"),
            CatalogFormat::Spreadsheet => write!(f, "spreadsheet"),
        }
    }
}

impl FromStr for CatalogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "dat" | "delimited" | "csv" => Ok(CatalogFormat::Delimited),
            "xlsx" | "xls" | "xlsm" | "ods" | "spreadsheet" => Ok(CatalogFormat::Spreadsheet),
            _ => Err(format!("Unknown catalog format: {}", s)),
        }
    }
}

/// One catalog event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogRow {
    pub time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub depth: f64,
    pub magnitude: f64,
}

/// Flat event table. All columns share one length.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EventCatalog {
    pub time: Vec<DateTime<Utc>>,
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    pub depth: Vec<f64>,
    pub magnitude: Vec<f64>,
}

impl EventCatalog {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn push(&mut self, row: CatalogRow) {
        self.time.push(row.time);
        self.latitude.push(row.latitude);
        self.longitude.push(row.longitude);
        self.depth.push(row.depth);
        self.magnitude.push(row.magnitude);
    }
}

/// Parse `time,latitude,longitude,depth,magnitude`.
pub fn parse_delimited_line(line: &str) -> ParseResult<CatalogRow> {
    let fields = comma_fields(line);
    Ok(CatalogRow {
        time: parse_event_time(field(&fields, 0, "time")?)?,
        latitude: number_field(&fields, 1, "latitude")?,
        longitude: number_field(&fields, 2, "longitude")?,
        depth: number_field(&fields, 3, "depth")?,
        magnitude: number_field(&fields, 4, "magnitude")?,
    })
}

/// Parse a delimited catalog. The first bad line is returned as an error.
pub fn parse_delimited_catalog(content: &str) -> Result<EventCatalog, LineError> {
    let mut catalog = EventCatalog::default();

    for (index, line) in content.lines().enumerate() {
        if is_blank(line) {
            continue;
        }
        let row = parse_delimited_line(line).map_err(|e| LineError::new(index + 1, line, e))?;
        catalog.push(row);
    }

    Ok(catalog)
}

fn cell_time(cell: &Data) -> ParseResult<DateTime<Utc>> {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) => Ok(parse_event_time(s)?),
        Data::DateTime(dt) => dt.as_datetime().map(|naive| naive.and_utc()).ok_or_else(|| {
            ParseError::InvalidFormat(format!("spreadsheet date-time out of range: {:?}", dt))
        }),
        Data::Empty => Err(ParseError::MissingField("time")),
        other => Err(ParseError::InvalidFormat(format!(
            "expected a time cell, got '{}'",
            other
        ))),
    }
}

fn cell_number(cell: &Data, name: &'static str) -> ParseResult<f64> {
    match cell {
        Data::Float(v) => Ok(*v),
        Data::Int(v) => Ok(*v as f64),
        Data::String(s) => parse_number(s, name),
        Data::Empty => Err(ParseError::MissingField(name)),
        other => Err(ParseError::InvalidNumber {
            field: name,
            value: other.to_string(),
        }),
    }
}

/// Parse one spreadsheet row: `time, longitude, latitude, depth, magnitude`.
pub fn parse_sheet_row(cells: &[Data]) -> ParseResult<CatalogRow> {
    let cell = |index: usize, name: &'static str| -> ParseResult<&Data> {
        cells.get(index).ok_or(ParseError::MissingField(name))
    };

    Ok(CatalogRow {
        time: cell_time(cell(0, "time")?)?,
        longitude: cell_number(cell(1, "longitude")?, "longitude")?,
        latitude: cell_number(cell(2, "latitude")?, "latitude")?,
        depth: cell_number(cell(3, "depth")?, "depth")?,
        magnitude: cell_number(cell(4, "magnitude")?, "magnitude")?,
    })
}

/// Build a catalog from worksheet rows, skipping the header row.
///
/// `origin` is the zero-based sheet `(row, column)` of the first cell in
/// `rows`. Only sheet row 1 is the header, and columns count from column A
/// whatever the origin. Rows that fail to parse are logged and left out.
pub fn collect_sheet_rows<'a>(
    rows: impl IntoIterator<Item = &'a [Data]>,
    origin: (u32, u32),
) -> EventCatalog {
    let mut catalog = EventCatalog::default();
    let (first_row, first_col) = (origin.0 as usize, origin.1 as usize);

    for (offset, cells) in rows.into_iter().enumerate() {
        let sheet_row = first_row + offset;
        if sheet_row == 0 {
            continue;
        }

        let cells: Cow<'_, [Data]> = if first_col == 0 {
            Cow::Borrowed(cells)
        } else {
            std::iter::repeat_n(Data::Empty, first_col)
                .chain(cells.iter().cloned())
                .collect()
        };

        match parse_sheet_row(&cells) {
            Ok(row) => catalog.push(row),
            Err(e) => warn!("Skipping spreadsheet row {}: {}", sheet_row + 1, e),
        }
    }

    catalog
}

fn read_spreadsheet(path: &Path) -> ReadResult<EventCatalog> {
    let spreadsheet_error = |message: String| ReadError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };

    if !path.exists() {
        return Err(ReadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| spreadsheet_error("workbook has no worksheets".to_string()))?
        .map_err(|e| spreadsheet_error(e.to_string()))?;

    let origin = range.start().unwrap_or((0, 0));
    Ok(collect_sheet_rows(range.rows(), origin))
}

/// Read a catalog file in the given layout.
pub fn read_catalog(path: impl AsRef<Path>, format: CatalogFormat) -> ReadResult<EventCatalog> {
    let path = path.as_ref();

    let catalog = match format {
        CatalogFormat::Delimited => {
            let content = read_file(path)?;
            parse_delimited_catalog(&content).map_err(|source| ReadError::Line {
                path: path.to_path_buf(),
                source,
            })?
        }
        CatalogFormat::Spreadsheet => read_spreadsheet(path)?,
    };

    info!(
        "Read {} events from {} catalog {}",
        catalog.len(),
        format,
        path.display()
    );
    Ok(catalog)
}
