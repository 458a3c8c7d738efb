//! Geographic bounding regions.
//!
//! A region is an inclusive longitude/latitude box. It filters fault traces
//! and also serves as the bounding box reported in table summaries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An inclusive longitude/latitude box, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl Region {
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }

    /// Check if a point lies inside the region. All bounds are inclusive.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.lon_min && lon <= self.lon_max && lat >= self.lat_min && lat <= self.lat_max
    }

    /// The smallest region containing every `(lon, lat)` point.
    ///
    /// Returns `None` for an empty iterator. Non-finite coordinates are skipped.
    pub fn enclosing(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        points
            .into_iter()
            .filter(|(lon, lat)| lon.is_finite() && lat.is_finite())
            .fold(None, |acc: Option<Region>, (lon, lat)| {
                Some(match acc {
                    None => Region::new(lon, lon, lat, lat),
                    Some(r) => Region::new(
                        r.lon_min.min(lon),
                        r.lon_max.max(lon),
                        r.lat_min.min(lat),
                        r.lat_max.max(lat),
                    ),
                })
            })
    }

    /// Validate the region bounds.
    ///
    /// Returns an error if a bound is not finite or a minimum exceeds its maximum.
    pub fn validate(&self) -> Result<(), String> {
        let bounds = [self.lon_min, self.lon_max, self.lat_min, self.lat_max];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(format!("Region {} has a non-finite bound", self));
        }
        if self.lon_min > self.lon_max {
            return Err(format!(
                "Region {} has lon_min greater than lon_max",
                self
            ));
        }
        if self.lat_min > self.lat_max {
            return Err(format!(
                "Region {} has lat_min greater than lat_max",
                self
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.lon_min, self.lon_max, self.lat_min, self.lat_max
        )
    }
}

impl FromStr for Region {
    type Err = String;

    /// Parse `lon_min,lon_max,lat_min,lat_max`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(format!(
                "expected lon_min,lon_max,lat_min,lat_max but got '{}'",
                s
            ));
        }

        let mut bounds = [0.0; 4];
        for (bound, part) in bounds.iter_mut().zip(&parts) {
            *bound = part
                .parse()
                .map_err(|_| format!("invalid number '{}' in region '{}'", part, s))?;
        }

        let region = Region::new(bounds[0], bounds[1], bounds[2], bounds[3]);
        region.validate()?;
        Ok(region)
    }
}
