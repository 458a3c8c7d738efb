//! Human-readable summaries of parsed tables.
//!
//! Every table type implements [`Summarize`], which reduces it to a few
//! counts plus its time span, geographic extent and magnitude range where
//! those apply. The CLI prints these unless full JSON output is requested.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::EventCatalog;
use crate::common_receiver::CommonReceiverTable;
use crate::fault::FaultTable;
use crate::phase::PhaseTable;
use crate::region::Region;
use crate::station::StationTable;

const RULE: &str = "═══════════════════════════════════════════════════════";

/// Snapshot of a table for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub title: String,
    /// Labelled counts, in display order.
    pub counts: Vec<(String, usize)>,
    pub time_span: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub extent: Option<Region>,
    pub magnitude_range: Option<(f64, f64)>,
}

impl TableSummary {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            counts: Vec::new(),
            time_span: None,
            extent: None,
            magnitude_range: None,
        }
    }

    fn count(mut self, label: &str, value: usize) -> Self {
        self.counts.push((label.to_string(), value));
        self
    }

    /// Look up a count by its label.
    pub fn get(&self, label: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, value)| *value)
    }
}

/// Types that can be reduced to a [`TableSummary`].
pub trait Summarize {
    fn summary(&self) -> TableSummary;
}

fn value_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
}

fn time_span<'a>(
    times: impl IntoIterator<Item = &'a DateTime<Utc>>,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    times.into_iter().fold(None, |acc, t| match acc {
        None => Some((*t, *t)),
        Some((first, last)) => Some((first.min(*t), last.max(*t))),
    })
}

impl Summarize for EventCatalog {
    fn summary(&self) -> TableSummary {
        let mut summary = TableSummary::new("EVENT CATALOG").count("Events", self.len());
        summary.time_span = time_span(&self.time);
        summary.extent = Region::enclosing(
            self.longitude
                .iter()
                .copied()
                .zip(self.latitude.iter().copied()),
        );
        summary.magnitude_range = value_range(self.magnitude.iter().copied());
        summary
    }
}

impl Summarize for PhaseTable {
    fn summary(&self) -> TableSummary {
        let p_picks = self.p_arrival_times.values().filter(|t| t.is_some()).count()
            + self.p_travel_times.values().filter(|t| t.is_some()).count();
        let s_picks = self.s_arrival_times.values().filter(|t| t.is_some()).count()
            + self.s_travel_times.values().filter(|t| t.is_some()).count();

        let mut summary = TableSummary::new("PHASE TABLE")
            .count("Events", self.num_events())
            .count("Phase lines", self.num_observations())
            .count("P picks", p_picks)
            .count("S picks", s_picks);
        summary.time_span = time_span(&self.event_time);
        summary.extent = Region::enclosing(
            self.event_location
                .iter()
                .map(|loc| (loc.longitude, loc.latitude)),
        );
        summary.magnitude_range = value_range(self.event_magnitude.iter().copied());
        summary
    }
}

impl Summarize for CommonReceiverTable {
    fn summary(&self) -> TableSummary {
        let stations: BTreeSet<&str> = self
            .p_station_name
            .values()
            .chain(self.s_station_name.values())
            .map(String::as_str)
            .collect();

        TableSummary::new("COMMON-RECEIVER PAIRS")
            .count("Event pairs", self.num_pairs())
            .count("P differentials", self.p_dt.total_len())
            .count("S differentials", self.s_dt.total_len())
            .count("Stations", stations.len())
    }
}

impl Summarize for FaultTable {
    fn summary(&self) -> TableSummary {
        let mut summary = TableSummary::new("FAULT TRACES")
            .count("Faults", self.len())
            .count("Points", self.num_points());
        summary.extent = Region::enclosing(
            self.longitude
                .iter()
                .flatten()
                .copied()
                .zip(self.latitude.iter().flatten().copied()),
        );
        summary
    }
}

impl Summarize for StationTable {
    fn summary(&self) -> TableSummary {
        let mut summary = TableSummary::new("STATIONS").count("Stations", self.len());
        summary.extent = Region::enclosing(
            self.longitude
                .iter()
                .copied()
                .zip(self.latitude.iter().copied()),
        );
        summary
    }
}

impl fmt::Display for TableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        writeln!(f, "{:^55}", self.title)?;
        writeln!(f, "{}", RULE)?;
        writeln!(f)?;

        for (label, value) in &self.counts {
            writeln!(f, "{}: {}", label, value)?;
        }

        if let Some((first, last)) = self.time_span {
            writeln!(f)?;
            writeln!(f, "Time span:")?;
            writeln!(f, "  First: {}", first.to_rfc3339())?;
            writeln!(f, "  Last:  {}", last.to_rfc3339())?;
        }

        if let Some(extent) = self.extent {
            writeln!(f)?;
            writeln!(f, "Extent:")?;
            writeln!(f, "  Longitude: {:.4} to {:.4}", extent.lon_min, extent.lon_max)?;
            writeln!(f, "  Latitude:  {:.4} to {:.4}", extent.lat_min, extent.lat_max)?;
        }

        if let Some((min, max)) = self.magnitude_range {
            writeln!(f)?;
            writeln!(f, "Magnitude: {:.1} to {:.1}", min, max)?;
        }

        writeln!(f, "{}", RULE)
    }
}
