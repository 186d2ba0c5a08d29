use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::track::Located;

/// A named lat/long rectangle. Points strictly inside are excluded from the
/// rendered output; points on an edge are kept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoFence {
    pub name: String,
    pub north_lat: f64,
    pub south_lat: f64,
    pub east_long: f64,
    pub west_long: f64,
    #[serde(default = "default_fill_color")]
    pub fill_color: String,
    #[serde(default)]
    pub altitude: f64,
}

fn default_fill_color() -> String {
    "7F0000FF".to_owned()
}

impl GeoFence {
    pub fn new(name: &str, north_lat: f64, south_lat: f64, east_long: f64, west_long: f64) -> Self {
        GeoFence {
            name: name.to_owned(),
            north_lat,
            south_lat,
            east_long,
            west_long,
            fill_color: default_fill_color(),
            altitude: 0.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.north_lat < self.south_lat {
            bail!(
                "geofence `{}`: north latitude {} is below south latitude {}",
                self.name,
                self.north_lat,
                self.south_lat
            );
        }
        if self.east_long < self.west_long {
            bail!(
                "geofence `{}`: east longitude {} is west of west longitude {}",
                self.name,
                self.east_long,
                self.west_long
            );
        }
        Ok(())
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.west_long < longitude
            && longitude < self.east_long
            && self.south_lat < latitude
            && latitude < self.north_lat
    }

    pub fn excludes<P: Located>(&self, point: &P) -> bool {
        self.contains(point.latitude(), point.longitude())
    }
}

/// Fences combined with a logical OR.
#[derive(Clone, Debug, Default)]
pub struct GeoFenceSet {
    fences: Vec<GeoFence>,
}

impl GeoFenceSet {
    pub fn new(fences: Vec<GeoFence>) -> Self {
        GeoFenceSet { fences }
    }

    pub fn is_empty(&self) -> bool {
        self.fences.is_empty()
    }

    pub fn fences(&self) -> &[GeoFence] {
        &self.fences
    }

    pub fn excludes<P: Located>(&self, point: &P) -> bool {
        self.fences.iter().any(|fence| fence.excludes(point))
    }

    /// Removes every excluded item in place and returns how many were removed.
    pub fn retain_outside<P: Located>(&self, points: &mut Vec<P>) -> usize {
        if self.fences.is_empty() {
            return 0;
        }
        let before = points.len();
        points.retain(|point| !self.excludes(point));
        before - points.len()
    }
}
