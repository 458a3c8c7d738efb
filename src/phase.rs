//! Reader for event/phase files.
//!
//! Two incompatible conventions are supported. Both interleave an event
//! header line with the phase lines observed for that event:
//!
//! ```text
//! Hypoinverse-Output (comma separated, observed arrivals)
//!   2023-05-04T23:23:05.759223Z,37.8112,-122.0573,8.12,2.1,nc73891856
//!   BKS,2023-05-04T23:23:07.120000Z,2023-05-04T23:23:08.950000Z
//!
//! TomoATT-Input (whitespace separated, synthetic travel times)
//!   0 2023 5 4 23 23 5.759223 37.8112 -122.0573 8.12 2.1 2 ev0
//!   0 0 BKS 37.8735 -122.2610 243.0 P 3.2140
//! ```
//!
//! Lines are classified with [`classify`], headers open a new event group,
//! and detail lines are attached to the currently open event. Malformed
//! records are logged and skipped rather than failing the file.

use std::fmt;
use std::marker::PhantomData;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classify::{LineFormat, LineKind, classify};
use crate::error::{ReadResult, read_file};
use crate::parser::{
    ParseError, ParseResult, comma_fields, field, is_blank, number_field, whitespace_fields,
};
use crate::table::{GroupState, Grouped};
use crate::timestamp::{TimeFields, parse_event_time, parse_or_absent, split_seconds};

/// Seismic phase type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    P,
    S,
}

impl PhaseKind {
    /// Recognize the literal `P` or `S` token; anything else is `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "P" => Some(PhaseKind::P),
            "S" => Some(PhaseKind::S),
            _ => None,
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseKind::P => write!(f, "P"),
            PhaseKind::S => write!(f, "S"),
        }
    }
}

/// Hypocenter of an event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub depth_km: f64,
}

/// Position of a receiving station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: f64,
}

/// Phase file convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseFormat {
    /// Comma-separated event headers followed by `station,P_time,S_time` lines.
    HypoinverseOutput,
    /// Whitespace-separated TomoATT source/receiver input.
    TomoAttInput,
}

impl PhaseFormat {
    /// The line classification rule used by this convention.
    pub fn line_format(self) -> LineFormat {
        match self {
            PhaseFormat::HypoinverseOutput => LineFormat::HypoinverseOutput,
            PhaseFormat::TomoAttInput => LineFormat::TomoAttInput,
        }
    }
}

impl fmt::Display for PhaseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.line_format())
    }
}

impl FromStr for PhaseFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "hypoinverse-output" | "hypoinverse" => Ok(PhaseFormat::HypoinverseOutput),
            "tomoatt-input" | "tomoatt" => Ok(PhaseFormat::TomoAttInput),
            _ => Err(format!(
                "unknown phase format '{}' (expected Hypoinverse-Output or TomoATT-Input)",
                s
            )),
        }
    }
}

/// Events and their phase observations, stored column-wise.
///
/// Per-event columns (`event_*`, `num_recs`) have one entry per accepted
/// header. Grouped columns have one group per event; within an event all
/// grouped columns a convention fills have the same length. Columns a
/// convention does not produce stay empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PhaseTable {
    pub event_time: Vec<DateTime<Utc>>,
    pub event_id: Vec<Option<String>>,
    pub event_location: Vec<Location>,
    /// TomoATT only.
    pub event_magnitude: Vec<f64>,
    /// Expected receiver count per event. TomoATT only.
    pub num_recs: Vec<u32>,
    pub phase_stations: Grouped<String>,
    /// TomoATT only.
    pub station_locations: Grouped<StationLocation>,
    /// Hypoinverse only; `None` where the arrival time was unparseable.
    pub p_arrival_times: Grouped<Option<DateTime<Utc>>>,
    /// Hypoinverse only; `None` where the arrival time was unparseable.
    pub s_arrival_times: Grouped<Option<DateTime<Utc>>>,
    /// TomoATT only; `None` where the line carried no P travel time.
    pub p_travel_times: Grouped<Option<f64>>,
    /// TomoATT only; `None` where the line carried no S travel time.
    pub s_travel_times: Grouped<Option<f64>>,
}

impl PhaseTable {
    pub fn num_events(&self) -> usize {
        self.event_time.len()
    }

    /// Total number of phase lines accepted across all events.
    pub fn num_observations(&self) -> usize {
        self.phase_stations.total_len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_time.is_empty()
    }
}

/// One phase-file convention: how to parse its header and detail lines and
/// how each parsed record lands in a [`PhaseTable`].
pub trait PhaseConvention {
    type Header;
    type Detail;

    const LINE_FORMAT: LineFormat;

    fn parse_header(line: &str) -> ParseResult<Self::Header>;
    fn parse_detail(line: &str) -> ParseResult<Self::Detail>;

    /// Record the event and open a group in every column this convention fills.
    fn commit_header(table: &mut PhaseTable, header: Self::Header);

    /// Append one observation to the open group of every column this convention fills.
    fn commit_detail(table: &mut PhaseTable, detail: Self::Detail);
}

/// The Hypoinverse-Output convention.
#[derive(Debug, Clone, Copy)]
pub struct Hypoinverse;

#[derive(Debug, Clone, PartialEq)]
pub struct HypoinverseHeader {
    pub time: DateTime<Utc>,
    pub location: Location,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HypoinverseDetail {
    pub station: String,
    pub p_arrival: Option<DateTime<Utc>>,
    pub s_arrival: Option<DateTime<Utc>>,
}

impl PhaseConvention for Hypoinverse {
    type Header = HypoinverseHeader;
    type Detail = HypoinverseDetail;

    const LINE_FORMAT: LineFormat = LineFormat::HypoinverseOutput;

    /// `time, lat, lon, depth, ..., id`; the id is the last field when non-empty.
    fn parse_header(line: &str) -> ParseResult<HypoinverseHeader> {
        let fields = comma_fields(line);
        let time = parse_event_time(field(&fields, 0, "event_time")?)?;
        let location = Location {
            latitude: number_field(&fields, 1, "latitude")?,
            longitude: number_field(&fields, 2, "longitude")?,
            depth_km: number_field(&fields, 3, "depth")?,
        };
        let id = fields
            .last()
            .filter(|id| !id.is_empty())
            .map(|id| id.to_string());

        Ok(HypoinverseHeader { time, location, id })
    }

    /// `station, P_time, S_time`. P and S fail independently to `None`.
    fn parse_detail(line: &str) -> ParseResult<HypoinverseDetail> {
        let fields = comma_fields(line);
        let station = field(&fields, 0, "station")?.to_string();
        let p_arrival = parse_or_absent(fields.get(1).copied().unwrap_or(""), "P arrival time");
        let s_arrival = parse_or_absent(fields.get(2).copied().unwrap_or(""), "S arrival time");

        Ok(HypoinverseDetail {
            station,
            p_arrival,
            s_arrival,
        })
    }

    fn commit_header(table: &mut PhaseTable, header: HypoinverseHeader) {
        table.event_time.push(header.time);
        table.event_id.push(header.id);
        table.event_location.push(header.location);
        table.phase_stations.start_group();
        table.p_arrival_times.start_group();
        table.s_arrival_times.start_group();
    }

    fn commit_detail(table: &mut PhaseTable, detail: HypoinverseDetail) {
        table.phase_stations.append(detail.station);
        table.p_arrival_times.append(detail.p_arrival);
        table.s_arrival_times.append(detail.s_arrival);
    }
}

/// The TomoATT-Input convention.
#[derive(Debug, Clone, Copy)]
pub struct TomoAtt;

#[derive(Debug, Clone, PartialEq)]
pub struct TomoAttHeader {
    pub time: DateTime<Utc>,
    pub location: Location,
    pub magnitude: f64,
    pub num_recs: u32,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TomoAttDetail {
    pub station: String,
    pub location: StationLocation,
    pub p_travel_time: Option<f64>,
    pub s_travel_time: Option<f64>,
}

/// Token positions in a TomoATT detail line that may hold a phase type;
/// the travel time follows each one.
const TOMOATT_PHASE_SLOTS: [usize; 2] = [6, 8];

impl PhaseConvention for TomoAtt {
    type Header = TomoAttHeader;
    type Detail = TomoAttDetail;

    const LINE_FORMAT: LineFormat = LineFormat::TomoAttInput;

    /// `index year month day hour minute second lat lon depth mag num_recs ... id`
    fn parse_header(line: &str) -> ParseResult<TomoAttHeader> {
        let fields = whitespace_fields(line);
        let (second, microsecond) = split_seconds(field(&fields, 6, "second")?)?;
        let time = TimeFields {
            year: number_field(&fields, 1, "year")?,
            month: number_field(&fields, 2, "month")?,
            day: number_field(&fields, 3, "day")?,
            hour: number_field(&fields, 4, "hour")?,
            minute: number_field(&fields, 5, "minute")?,
            second,
            microsecond,
        }
        .to_utc()?;

        let location = Location {
            latitude: number_field(&fields, 7, "latitude")?,
            longitude: number_field(&fields, 8, "longitude")?,
            depth_km: number_field(&fields, 9, "depth")?,
        };
        let magnitude = number_field(&fields, 10, "magnitude")?;
        let num_recs = number_field(&fields, 11, "num_recs")?;
        let id = fields
            .last()
            .map(|id| id.to_string())
            .ok_or(ParseError::MissingField("event_id"))?;

        Ok(TomoAttHeader {
            time,
            location,
            magnitude,
            num_recs,
            id,
        })
    }

    /// `event_index receiver_index station lat lon elev phase time [phase time]`
    ///
    /// Only `P` and `S` phase tokens are recorded. Any failure rejects the
    /// whole line.
    fn parse_detail(line: &str) -> ParseResult<TomoAttDetail> {
        let fields = whitespace_fields(line);
        let station = field(&fields, 2, "station")?.to_string();
        let location = StationLocation {
            latitude: number_field(&fields, 3, "station latitude")?,
            longitude: number_field(&fields, 4, "station longitude")?,
            elevation_m: number_field(&fields, 5, "station elevation")?,
        };
        field(&fields, TOMOATT_PHASE_SLOTS[0], "phase_type")?;

        let mut detail = TomoAttDetail {
            station,
            location,
            p_travel_time: None,
            s_travel_time: None,
        };

        for slot in TOMOATT_PHASE_SLOTS {
            let Some(kind) = fields.get(slot).and_then(|t| PhaseKind::from_token(t)) else {
                continue;
            };
            let travel_time = number_field(&fields, slot + 1, "travel_time")?;
            let target = match kind {
                PhaseKind::P => &mut detail.p_travel_time,
                PhaseKind::S => &mut detail.s_travel_time,
            };
            if target.is_none() {
                *target = Some(travel_time);
            }
        }

        Ok(detail)
    }

    fn commit_header(table: &mut PhaseTable, header: TomoAttHeader) {
        table.event_time.push(header.time);
        table.event_id.push(Some(header.id));
        table.event_location.push(header.location);
        table.event_magnitude.push(header.magnitude);
        table.num_recs.push(header.num_recs);
        table.phase_stations.start_group();
        table.station_locations.start_group();
        table.p_travel_times.start_group();
        table.s_travel_times.start_group();
    }

    fn commit_detail(table: &mut PhaseTable, detail: TomoAttDetail) {
        table.phase_stations.append(detail.station);
        table.station_locations.append(detail.location);
        table.p_travel_times.append(detail.p_travel_time);
        table.s_travel_times.append(detail.s_travel_time);
    }
}

/// Accumulates a [`PhaseTable`] line by line for one convention.
#[derive(Debug)]
pub struct PhaseTableBuilder<C: PhaseConvention> {
    table: PhaseTable,
    state: GroupState,
    _convention: PhantomData<C>,
}

impl<C: PhaseConvention> Default for PhaseTableBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: PhaseConvention> PhaseTableBuilder<C> {
    pub fn new() -> Self {
        Self {
            table: PhaseTable::default(),
            state: GroupState::NoOpenGroup,
            _convention: PhantomData,
        }
    }

    /// Whether an event is currently open for detail lines.
    pub fn state(&self) -> GroupState {
        self.state
    }

    /// Feed one line. `line_number` is one-based and only used in diagnostics.
    pub fn push_line(&mut self, line_number: usize, line: &str) {
        if is_blank(line) {
            return;
        }

        let kind = match classify(line, C::LINE_FORMAT) {
            Ok(kind) => kind,
            Err(e) => {
                warn!(
                    "Skipping unclassifiable {} line {}: '{}': {}",
                    C::LINE_FORMAT,
                    line_number,
                    line.trim(),
                    e
                );
                return;
            }
        };

        match kind {
            LineKind::Header => match C::parse_header(line) {
                Ok(header) => {
                    C::commit_header(&mut self.table, header);
                    self.state = GroupState::Open;
                }
                Err(e) => {
                    warn!(
                        "Error parsing event line {}: '{}': {}",
                        line_number,
                        line.trim(),
                        e
                    );
                    self.state = GroupState::NoOpenGroup;
                }
            },
            LineKind::Detail => {
                if !self.state.is_open() {
                    debug!("Ignoring phase line {} outside an event", line_number);
                    return;
                }
                match C::parse_detail(line) {
                    Ok(detail) => C::commit_detail(&mut self.table, detail),
                    Err(e) => warn!(
                        "Error parsing phase line {}: '{}': {}",
                        line_number,
                        line.trim(),
                        e
                    ),
                }
            }
        }
    }

    pub fn finish(self) -> PhaseTable {
        self.table
    }
}

fn build<C: PhaseConvention>(content: &str) -> PhaseTable {
    let mut builder = PhaseTableBuilder::<C>::new();
    for (index, line) in content.lines().enumerate() {
        builder.push_line(index + 1, line);
    }
    builder.finish()
}

/// Parse phase file content that is already in memory.
pub fn parse_phases(content: &str, format: PhaseFormat) -> PhaseTable {
    match format {
        PhaseFormat::HypoinverseOutput => build::<Hypoinverse>(content),
        PhaseFormat::TomoAttInput => build::<TomoAtt>(content),
    }
}

/// Read a phase file.
///
/// Only a missing or unreadable file is an error; malformed lines are logged
/// and skipped.
pub fn read_phase(path: impl AsRef<Path>, format: PhaseFormat) -> ReadResult<PhaseTable> {
    let path = path.as_ref();
    let content = read_file(path)?;
    let table = parse_phases(&content, format);
    info!(
        "Read {} events with {} phase lines from {} ({})",
        table.num_events(),
        table.num_observations(),
        path.display(),
        format
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::parse_iso;
    use std::io::Write;

    const HYPOINVERSE: &str = "\
2023-05-04T23:23:05.759223Z,37.8112,-122.0573,8.12,2.1,nc73891856
BKS,2023-05-04T23:23:07.120000Z,2023-05-04T23:23:08.950000Z
CMB,2023-05-04T23:23:09.500000Z,not-a-time
20230504232510.91,37.9000,-122.1000,5.00,1.4,
MHC,,2023-05-04T23:25:15.000000Z
";

    const TOMOATT: &str = "\
0 2023 5 4 23 23 5.759223 37.8112 -122.0573 8.12 2.1 3 ev0
0 0 BKS 37.8735 -122.2610 243.0 P 3.2140
0 1 CMB 38.0346 -120.3865 697.0 S 9.8000
0 2 MHC 37.3416 -121.6426 1250.0 P 4.1000 S 7.2000
1 2023 5 5 01 02 03.5 36.0 -120.0 10.0 3.0 1 ev1
1 0 PKD 35.9452 -120.5416 583.0 P 2.5000
";

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn assert_hypoinverse_aligned(table: &PhaseTable) {
        assert_eq!(table.event_time.len(), table.phase_stations.len());
        assert_eq!(table.event_time.len(), table.event_id.len());
        assert_eq!(table.event_time.len(), table.event_location.len());
        for i in 0..table.num_events() {
            assert_eq!(table.phase_stations[i].len(), table.p_arrival_times[i].len());
            assert_eq!(table.phase_stations[i].len(), table.s_arrival_times[i].len());
        }
    }

    #[test]
    fn test_phase_format_from_str() {
        assert_eq!(
            "Hypoinverse-Output".parse::<PhaseFormat>().unwrap(),
            PhaseFormat::HypoinverseOutput
        );
        assert_eq!(
            "TomoATT-Input".parse::<PhaseFormat>().unwrap(),
            PhaseFormat::TomoAttInput
        );
        assert_eq!(
            "tomoatt_input".parse::<PhaseFormat>().unwrap(),
            PhaseFormat::TomoAttInput
        );
        assert!("PAL-Output".parse::<PhaseFormat>().is_err());
    }

    #[test]
    fn test_phase_kind_from_token() {
        assert_eq!(PhaseKind::from_token("P"), Some(PhaseKind::P));
        assert_eq!(PhaseKind::from_token("S"), Some(PhaseKind::S));
        assert_eq!(PhaseKind::from_token("p"), None);
        assert_eq!(PhaseKind::from_token("Pg"), None);
    }

    #[test]
    fn test_hypoinverse_basic() {
        let table = parse_phases(HYPOINVERSE, PhaseFormat::HypoinverseOutput);

        assert_eq!(table.num_events(), 2);
        assert_hypoinverse_aligned(&table);
        assert_eq!(
            table.event_time[0],
            parse_iso("2023-05-04T23:23:05.759223Z").unwrap()
        );
        assert_eq!(
            table.event_time[1],
            parse_iso("2023-05-04T23:25:10.91Z").unwrap()
        );
        assert_eq!(table.event_id[0].as_deref(), Some("nc73891856"));
        assert_eq!(table.event_id[1], None);
        assert_eq!(
            table.event_location[0],
            Location {
                latitude: 37.8112,
                longitude: -122.0573,
                depth_km: 8.12
            }
        );

        assert_eq!(table.phase_stations[0], vec!["BKS", "CMB"]);
        assert_eq!(table.phase_stations[1], vec!["MHC"]);
        assert_eq!(
            table.p_arrival_times[0][0],
            Some(parse_iso("2023-05-04T23:23:07.12Z").unwrap())
        );
        // S failed independently of P.
        assert!(table.p_arrival_times[0][1].is_some());
        assert_eq!(table.s_arrival_times[0][1], None);
        // Empty P field is absent, S still parsed.
        assert_eq!(table.p_arrival_times[1][0], None);
        assert!(table.s_arrival_times[1][0].is_some());

        // TomoATT-only columns untouched.
        assert!(table.event_magnitude.is_empty());
        assert!(table.num_recs.is_empty());
        assert!(table.station_locations.is_empty());
        assert!(table.p_travel_times.is_empty());
        assert_eq!(table.num_observations(), 3);
    }

    #[test]
    fn test_hypoinverse_bad_header_orphans_details() {
        let content = "\
2023-13-45T99:00:00Z,37.8,-122.0,8.0,1.0,bad
BKS,2023-05-04T23:23:07Z,2023-05-04T23:23:08Z
2023-05-04T23:30:00Z,37.8,-122.0,8.0,1.0,good
CMB,2023-05-04T23:30:02Z,2023-05-04T23:30:04Z
";
        let table = parse_phases(content, PhaseFormat::HypoinverseOutput);
        assert_eq!(table.num_events(), 1);
        assert_eq!(table.event_id[0].as_deref(), Some("good"));
        assert_eq!(table.phase_stations[0], vec!["CMB"]);
        assert_hypoinverse_aligned(&table);
    }

    #[test]
    fn test_hypoinverse_bad_location_drops_event() {
        let content = "\
2023-05-04T23:30:00Z,north,-122.0,8.0,1.0,ev
BKS,2023-05-04T23:30:02Z,2023-05-04T23:30:04Z
";
        let table = parse_phases(content, PhaseFormat::HypoinverseOutput);
        assert!(table.is_empty());
        assert_eq!(table.num_observations(), 0);
    }

    #[test]
    fn test_hypoinverse_detail_before_header_ignored() {
        let content = "\
BKS,2023-05-04T23:23:07Z,2023-05-04T23:23:08Z

2023-05-04T23:30:00Z,37.8,-122.0,8.0,1.0,ev
CMB
";
        let table = parse_phases(content, PhaseFormat::HypoinverseOutput);
        assert_eq!(table.num_events(), 1);
        assert_eq!(table.phase_stations[0], vec!["CMB"]);
        assert_eq!(table.p_arrival_times[0], vec![None]);
        assert_eq!(table.s_arrival_times[0], vec![None]);
    }

    #[test]
    fn test_tomoatt_basic() {
        let table = parse_phases(TOMOATT, PhaseFormat::TomoAttInput);

        assert_eq!(table.num_events(), 2);
        assert_eq!(table.event_id, vec![Some("ev0".to_string()), Some("ev1".to_string())]);
        assert_eq!(table.event_magnitude, vec![2.1, 3.0]);
        assert_eq!(table.num_recs, vec![3, 1]);
        assert_eq!(
            table.event_time[0],
            parse_iso("2023-05-04T23:23:05.759223Z").unwrap()
        );
        assert_eq!(
            table.event_time[1],
            parse_iso("2023-05-05T01:02:03.5Z").unwrap()
        );

        assert_eq!(table.phase_stations[0], vec!["BKS", "CMB", "MHC"]);
        assert_eq!(table.p_travel_times[0], vec![Some(3.214), None, Some(4.1)]);
        assert_eq!(table.s_travel_times[0], vec![None, Some(9.8), Some(7.2)]);
        assert_eq!(
            table.station_locations[0][2],
            StationLocation {
                latitude: 37.3416,
                longitude: -121.6426,
                elevation_m: 1250.0
            }
        );
        assert_eq!(table.phase_stations[1], vec!["PKD"]);

        for i in 0..table.num_events() {
            let n = table.phase_stations[i].len();
            assert_eq!(table.station_locations[i].len(), n);
            assert_eq!(table.p_travel_times[i].len(), n);
            assert_eq!(table.s_travel_times[i].len(), n);
        }
        assert!(table.p_arrival_times.is_empty());
    }

    #[test]
    fn test_tomoatt_bad_travel_time_excludes_whole_line() {
        let content = "\
0 2023 5 4 23 23 5.759223 37.8112 -122.0573 8.12 2.1 3 ev0
0 0 BKS 37.8735 -122.2610 243.0 P 3.2140
0 1 CMB 38.0346 -120.3865 697.0 P abc
0 2 MHC 37.3416 -121.6426 1250.0 P 4.1000 S oops
";
        let table = parse_phases(content, PhaseFormat::TomoAttInput);
        assert_eq!(table.phase_stations[0], vec!["BKS"]);
        assert_eq!(table.station_locations[0].len(), 1);
        assert_eq!(table.p_travel_times[0], vec![Some(3.214)]);
        assert_eq!(table.s_travel_times[0], vec![None]);
    }

    #[test]
    fn test_tomoatt_unrecognized_phase_ignored() {
        let content = "\
0 2023 5 4 23 23 5.759223 37.8112 -122.0573 8.12 2.1 3 ev0
0 0 BKS 37.8735 -122.2610 243.0 Pg 3.2140
0 1 CMB 38.0346 -120.3865 697.0 P 5.0 1.0
";
        let table = parse_phases(content, PhaseFormat::TomoAttInput);
        // An unknown phase token keeps the observation but records no time.
        assert_eq!(table.phase_stations[0], vec!["BKS", "CMB"]);
        assert_eq!(table.p_travel_times[0], vec![None, Some(5.0)]);
        assert_eq!(table.s_travel_times[0], vec![None, None]);
    }

    #[test]
    fn test_tomoatt_missing_phase_type_skips_line() {
        let content = "\
0 2023 5 4 23 23 5.759223 37.8112 -122.0573 8.12 2.1 3 ev0
0 0 BKS 37.8735 -122.2610 243.0
";
        let table = parse_phases(content, PhaseFormat::TomoAttInput);
        assert_eq!(table.num_events(), 1);
        assert!(table.phase_stations[0].is_empty());
    }

    #[test]
    fn test_tomoatt_bad_header_and_short_lines() {
        let content = "\
0 2023 5 4 23 23 xx 37.8112 -122.0573 8.12 2.1 3 ev0
0 0 BKS 37.8735 -122.2610 243.0 P 3.2140
orphan

1 2023 5 5 01 02 03.5 36.0 -120.0 10.0 3.0 1 ev1
1 0 PKD 35.9452 -120.5416 583.0 P 2.5000
";
        let table = parse_phases(content, PhaseFormat::TomoAttInput);
        assert_eq!(table.num_events(), 1);
        assert_eq!(table.event_id[0].as_deref(), Some("ev1"));
        assert_eq!(table.phase_stations[0], vec!["PKD"]);
    }

    #[test]
    fn test_builder_state_transitions() {
        let mut builder = PhaseTableBuilder::<Hypoinverse>::new();
        assert_eq!(builder.state(), GroupState::NoOpenGroup);
        builder.push_line(1, "2023-05-04T23:30:00Z,37.8,-122.0,8.0,1.0,ev");
        assert_eq!(builder.state(), GroupState::Open);
        builder.push_line(2, "2023-05-04T23:30:00Z,bad,-122.0,8.0,1.0,ev");
        assert_eq!(builder.state(), GroupState::NoOpenGroup);
        assert_eq!(builder.finish().num_events(), 1);
    }

    #[test]
    fn test_read_phase_file_and_idempotence() {
        let file = write_temp(TOMOATT);
        let first = read_phase(file.path(), PhaseFormat::TomoAttInput).unwrap();
        let second = read_phase(file.path(), PhaseFormat::TomoAttInput).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.num_events(), 2);
    }

    #[test]
    fn test_read_phase_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_phase(dir.path().join("missing.txt"), PhaseFormat::HypoinverseOutput);
        assert!(matches!(result, Err(crate::ReadError::NotFound { .. })));
    }
}
