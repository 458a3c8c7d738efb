//! seisread - readers for seismological catalogs, phase picks and station data.
//!
//! This crate provides:
//! - Earthquake catalog readers for delimited text and spreadsheets
//! - A phase-pick reader for the Hypoinverse-Output and TomoATT-Input conventions
//! - Common-receiver differential-time, fault trace and station list readers
//!
//! Every reader loads its file into a columnar table. Malformed records are
//! logged through `tracing` and skipped; only whole-file failures (and a bad
//! line in a delimited catalog) come back as a [`ReadError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use seisread::{PhaseFormat, Summarize, read_phase};
//!
//! let table = read_phase("phases.txt", PhaseFormat::HypoinverseOutput)
//!     .expect("Failed to read phases");
//! for (time, stations) in table.event_time.iter().zip(table.phase_stations.iter()) {
//!     println!("{}: {} stations", time, stations.len());
//! }
//!
//! println!("{}", table.summary());
//! ```

pub mod catalog;
pub mod classify;
pub mod common_receiver;
pub mod config;
pub mod error;
pub mod fault;
pub mod parser;
pub mod phase;
pub mod region;
pub mod station;
pub mod summary;
pub mod table;
pub mod timestamp;

pub use catalog::{CatalogFormat, EventCatalog, read_catalog};
pub use classify::{LineFormat, LineKind, classify, is_event_line};
pub use common_receiver::{CommonReceiverTable, parse_common_receiver, read_common_receiver};
pub use config::Config;
pub use error::{LineError, ReadError, ReadResult};
pub use fault::{FaultTable, parse_faults, read_faults};
pub use parser::{ParseError, ParseResult};
pub use phase::{
    Location, PhaseFormat, PhaseKind, PhaseTable, StationLocation, parse_phases, read_phase,
};
pub use region::Region;
pub use station::{StationTable, parse_station_list, read_station_list};
pub use summary::{Summarize, TableSummary};
pub use table::{GroupState, Grouped};
pub use timestamp::{TimeFields, TimestampError, parse_event_time};
