//! Reader for station inventory files.
//!
//! A station list lives at `<dir>/<array_name>.txt` and has one station per
//! line:
//!
//! ```text
//! index,station_name,latitude,longitude,elevation,scaling_factor
//! 0,BKS,37.8762,-122.2356,243.9,1.0
//! ```
//!
//! A missing file yields an empty table rather than an error, so callers
//! cannot tell "no file" from "no valid rows" except through the log.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ReadError, ReadResult, read_file};
use crate::parser::{ParseResult, comma_fields, field, is_blank, number_field};

/// A fully validated station row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRow {
    pub index: i64,
    pub station_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub scaling_factor: f64,
}

/// Station inventory, stored column-wise. All columns share one length.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StationTable {
    pub index: Vec<i64>,
    pub station_name: Vec<String>,
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    pub elevation: Vec<f64>,
    pub scaling_factor: Vec<f64>,
}

impl StationTable {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Position of the first station with the given name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.station_name.iter().position(|n| n == name)
    }

    /// Append a row to every column at once.
    pub fn push(&mut self, row: StationRow) {
        self.index.push(row.index);
        self.station_name.push(row.station_name);
        self.latitude.push(row.latitude);
        self.longitude.push(row.longitude);
        self.elevation.push(row.elevation);
        self.scaling_factor.push(row.scaling_factor);
    }
}

/// Parse `index,name,lat,lon,elevation,scaling_factor`.
///
/// Fields beyond the sixth are ignored.
pub fn parse_station_line(line: &str) -> ParseResult<StationRow> {
    let fields = comma_fields(line);
    Ok(StationRow {
        index: number_field(&fields, 0, "index")?,
        station_name: field(&fields, 1, "station_name")?.to_string(),
        latitude: number_field(&fields, 2, "latitude")?,
        longitude: number_field(&fields, 3, "longitude")?,
        elevation: number_field(&fields, 4, "elevation")?,
        scaling_factor: number_field(&fields, 5, "scaling_factor")?,
    })
}

/// Parse station list content that is already in memory.
///
/// With `skip_header`, the first line is discarded unread.
pub fn parse_station_list(content: &str, skip_header: bool) -> StationTable {
    let mut table = StationTable::default();
    let skip = usize::from(skip_header);

    for (index, line) in content.lines().enumerate().skip(skip) {
        if is_blank(line) {
            continue;
        }
        match parse_station_line(line) {
            Ok(row) => table.push(row),
            Err(e) => warn!("Invalid line {}: '{}': {}", index + 1, line.trim(), e),
        }
    }

    table
}

/// Location of the station file for an array.
pub fn station_file_path(dir: impl AsRef<Path>, array_name: &str) -> PathBuf {
    dir.as_ref().join(format!("{}.txt", array_name))
}

/// Read the station list for `array_name` from `dir`.
///
/// A missing file is logged and returns an empty table.
pub fn read_station_list(
    dir: impl AsRef<Path>,
    array_name: &str,
    skip_header: bool,
) -> ReadResult<StationTable> {
    let dir = dir.as_ref();
    let path = station_file_path(dir, array_name);

    let content = match read_file(&path) {
        Ok(content) => content,
        Err(ReadError::NotFound { .. }) => {
            warn!(
                "Station info file {}.txt not found in {}",
                array_name,
                dir.display()
            );
            return Ok(StationTable::default());
        }
        Err(e) => return Err(e),
    };

    let table = parse_station_list(&content, skip_header);
    info!("Read {} stations from {}", table.len(), path.display());
    Ok(table)
}
