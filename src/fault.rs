//! Reader for fault traces stored in KML-like files.
//!
//! Only the `<coordinates>` blocks matter; everything else in the file is
//! ignored. Each block is one fault polyline:
//!
//! ```text
//! <coordinates>-121.8229,37.7301 -122.0388,37.8771</coordinates>
//! <coordinates>-121.8229,37.7301,0 -122.0388,37.8771,0</coordinates>
//! ```
//!
//! Points are kept only if they fall inside the requested region, and a
//! fault with no remaining points is dropped without using up an index.

use std::path::Path;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::not_line_ending,
    combinator::verify,
    multi::many0,
    sequence::{preceded, terminated},
};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ReadResult, read_file};
use crate::parser::{ParseError, ParseResult, parse_number};
use crate::region::Region;

const OPEN_TAG: &str = "<coordinates>";
const CLOSE_TAG: &str = "</coordinates>";

/// Fault polylines clipped to a region.
///
/// `longitude[i]` and `latitude[i]` are the in-region points of fault
/// `index[i]`. Indices count recorded faults only, so they run 0, 1, 2, ...
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FaultTable {
    pub index: Vec<usize>,
    pub longitude: Vec<Vec<f64>>,
    pub latitude: Vec<Vec<f64>>,
}

impl FaultTable {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Total number of in-region points over all faults.
    pub fn num_points(&self) -> usize {
        self.longitude.iter().map(Vec::len).sum()
    }

    fn push(&mut self, longitude: Vec<f64>, latitude: Vec<f64>) {
        self.index.push(self.index.len());
        self.longitude.push(longitude);
        self.latitude.push(latitude);
    }
}

/// Parse the next `<coordinates>` block, returning its inner text.
///
/// A block may span lines up to its closing tag, as long as no other block
/// opens first. Otherwise it is unterminated and runs to the end of its line,
/// or up to the next opening tag on that line.
fn coordinates_block(input: &str) -> IResult<&str, &str> {
    preceded(
        (take_until(OPEN_TAG), tag(OPEN_TAG)),
        alt((
            terminated(
                verify(take_until(CLOSE_TAG), |s: &str| !s.contains(OPEN_TAG)),
                tag(CLOSE_TAG),
            ),
            verify(take_until(OPEN_TAG), |s: &str| !s.contains('\n')),
            not_line_ending,
        )),
    )
    .parse(input)
}

/// Extract the inner text of every `<coordinates>` block, in file order.
pub fn coordinate_blocks(content: &str) -> Vec<&str> {
    let parsed: IResult<&str, Vec<&str>> = many0(coordinates_block).parse(content);
    parsed.map(|(_, blocks)| blocks).unwrap_or_default()
}

/// Parse one `lon,lat[,elevation]` item. Elevation is ignored.
pub fn parse_coordinate(item: &str) -> ParseResult<(f64, f64)> {
    let mut parts = item.split(',');
    let lon = parse_number(parts.next().unwrap_or(""), "longitude")?;
    let lat = match parts.next() {
        Some(lat) => parse_number(lat, "latitude")?,
        None => return Err(ParseError::MissingField("latitude")),
    };
    Ok((lon, lat))
}

/// Parse fault content that is already in memory.
pub fn parse_faults(content: &str, region: &Region) -> FaultTable {
    let mut table = FaultTable::default();

    for (block_number, block) in coordinate_blocks(content).into_iter().enumerate() {
        let mut longitude = Vec::new();
        let mut latitude = Vec::new();

        for item in block.split_whitespace() {
            match parse_coordinate(item) {
                Ok((lon, lat)) if region.contains(lon, lat) => {
                    longitude.push(lon);
                    latitude.push(lat);
                }
                Ok(_) => {}
                Err(e) => warn!(
                    "Invalid coordinates '{}' in block {}: {}",
                    item,
                    block_number + 1,
                    e
                ),
            }
        }

        if !longitude.is_empty() {
            table.push(longitude, latitude);
        }
    }

    table
}

/// Read a fault file, keeping only points inside `region`.
pub fn read_faults(path: impl AsRef<Path>, region: &Region) -> ReadResult<FaultTable> {
    let path = path.as_ref();
    let content = read_file(path)?;
    let table = parse_faults(&content, region);
    info!(
        "Read {} faults ({} points) inside {} from {}",
        table.len(),
        table.num_points(),
        region,
        path.display()
    );
    Ok(table)
}
