//! Reader for common-receiver differential-time files.
//!
//! Each `#` header names an event pair; the lines below it give, per
//! station, the arrival times of both events and the phase type:
//!
//! ```text
//! # 73891856 73891901 0.87
//! BKS 12.3400 12.1100 P
//! BKS 21.0200 20.6500 S
//! ```
//!
//! The differential time is main minus paired (`12.34 - 12.11`).

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::classify::{LineFormat, LineKind, classify};
use crate::error::{ReadResult, read_file};
use crate::parser::{ParseResult, field, is_blank, number_field, whitespace_fields};
use crate::phase::PhaseKind;
use crate::table::{GroupState, Grouped};

/// Differential times grouped by event pair.
///
/// One group per accepted header. Within a group, P station names and P
/// differential times are parallel, as are the S ones.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CommonReceiverTable {
    pub main_event_id: Vec<String>,
    pub paired_event_id: Vec<String>,
    pub p_station_name: Grouped<String>,
    pub s_station_name: Grouped<String>,
    pub p_dt: Grouped<f64>,
    pub s_dt: Grouped<f64>,
}

impl CommonReceiverTable {
    pub fn num_pairs(&self) -> usize {
        self.main_event_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.main_event_id.is_empty()
    }

    /// Total differential times across all pairs, P and S combined.
    pub fn num_differentials(&self) -> usize {
        self.p_dt.total_len() + self.s_dt.total_len()
    }
}

/// Event ids from a `#` header line, kept as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairHeader {
    pub main_event_id: String,
    pub paired_event_id: String,
}

/// One station's differential time for an event pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialTime {
    pub station: String,
    pub phase: PhaseKind,
    pub dt: f64,
}

/// Parse a `# main paired ...` header.
pub fn parse_pair_header(line: &str) -> ParseResult<PairHeader> {
    let fields = whitespace_fields(line);
    Ok(PairHeader {
        main_event_id: field(&fields, 1, "main_event_id")?.to_string(),
        paired_event_id: field(&fields, 2, "paired_event_id")?.to_string(),
    })
}

/// Parse a `station t_main t_paired ... phase` detail line.
///
/// Returns `Ok(None)` when the trailing phase token is neither `P` nor `S`.
pub fn parse_differential(
    line: &str,
    network_code: Option<&str>,
) -> ParseResult<Option<DifferentialTime>> {
    let fields = whitespace_fields(line);
    let station = field(&fields, 0, "station")?;
    let Some(phase) = fields.last().and_then(|t| PhaseKind::from_token(t)) else {
        return Ok(None);
    };

    let main: f64 = number_field(&fields, 1, "main arrival time")?;
    let paired: f64 = number_field(&fields, 2, "paired arrival time")?;

    let station = match network_code.filter(|code| !code.is_empty()) {
        Some(code) => format!("{}.{}", code, station),
        None => station.to_string(),
    };

    Ok(Some(DifferentialTime {
        station,
        phase,
        dt: main - paired,
    }))
}

/// Accumulates a [`CommonReceiverTable`] line by line.
#[derive(Debug, Default)]
pub struct CommonReceiverBuilder {
    table: CommonReceiverTable,
    state: GroupState,
    network_code: Option<String>,
}

impl CommonReceiverBuilder {
    /// `network_code`, when non-empty, is prefixed to every station name as `NET.`.
    pub fn new(network_code: Option<&str>) -> Self {
        Self {
            table: CommonReceiverTable::default(),
            state: GroupState::NoOpenGroup,
            network_code: network_code
                .filter(|code| !code.is_empty())
                .map(str::to_string),
        }
    }

    pub fn state(&self) -> GroupState {
        self.state
    }

    /// Feed one line. `line_number` is one-based and only used in diagnostics.
    pub fn push_line(&mut self, line_number: usize, line: &str) {
        if is_blank(line) {
            return;
        }

        // Common-receiver classification cannot fail.
        let Ok(kind) = classify(line, LineFormat::CommonReceiver) else {
            return;
        };

        match kind {
            LineKind::Header => match parse_pair_header(line) {
                Ok(header) => self.open_pair(header),
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
                    debug!("Ignoring phase line {} outside an event pair", line_number);
                    return;
                }
                match parse_differential(line, self.network_code.as_deref()) {
                    Ok(Some(record)) => self.append(record),
                    Ok(None) => debug!(
                        "Ignoring phase line {} without a P/S phase: '{}'",
                        line_number,
                        line.trim()
                    ),
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

    fn open_pair(&mut self, header: PairHeader) {
        self.table.main_event_id.push(header.main_event_id);
        self.table.paired_event_id.push(header.paired_event_id);
        self.table.p_station_name.start_group();
        self.table.s_station_name.start_group();
        self.table.p_dt.start_group();
        self.table.s_dt.start_group();
        self.state = GroupState::Open;
    }

    fn append(&mut self, record: DifferentialTime) {
        let (names, dts) = match record.phase {
            PhaseKind::P => (&mut self.table.p_station_name, &mut self.table.p_dt),
            PhaseKind::S => (&mut self.table.s_station_name, &mut self.table.s_dt),
        };
        names.append(record.station);
        dts.append(record.dt);
    }

    pub fn finish(self) -> CommonReceiverTable {
        self.table
    }
}

/// Parse common-receiver content that is already in memory.
pub fn parse_common_receiver(content: &str, network_code: Option<&str>) -> CommonReceiverTable {
    let mut builder = CommonReceiverBuilder::new(network_code);
    for (index, line) in content.lines().enumerate() {
        builder.push_line(index + 1, line);
    }
    builder.finish()
}

/// Read a common-receiver differential-time file.
pub fn read_common_receiver(
    path: impl AsRef<Path>,
    network_code: Option<&str>,
) -> ReadResult<CommonReceiverTable> {
    let path = path.as_ref();
    let content = read_file(path)?;
    let table = parse_common_receiver(&content, network_code);
    info!(
        "Read {} event pairs with {} differential times from {}",
        table.num_pairs(),
        table.num_differentials(),
        path.display()
    );
    Ok(table)
}
