use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::geofence::GeoFence;
use crate::track::SpeedBand;

pub const DEFAULT_STOP_TOLERANCE_DEGREES: f64 = 1e-4;
pub const DEFAULT_LINE_WIDTH: f64 = 6.0;
pub const DEFAULT_PATH_DESCRIPTION: &str = "Altitude information is replaced with speed in knots";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandStyle {
    /// Inclusive upper bound in knots. `None` means unbounded and is only
    /// allowed on the last band.
    pub upper_bound_knots: Option<f64>,
    /// KML color, `aabbggrr`.
    pub color: String,
    #[serde(default = "default_line_width")]
    pub width: f64,
}

fn default_line_width() -> f64 {
    DEFAULT_LINE_WIDTH
}

impl BandStyle {
    fn new(upper_bound_knots: Option<f64>, color: &str) -> Self {
        BandStyle {
            upper_bound_knots,
            color: color.to_owned(),
            width: DEFAULT_LINE_WIDTH,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub stop_tolerance_degrees: f64,
    // 0.0 keeps the exact coordinate comparison
    pub move_epsilon_degrees: f64,
    pub bands: Vec<BandStyle>,
    pub geofences: Vec<GeoFence>,
    pub render_geofences: bool,
    pub path_description: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            stop_tolerance_degrees: DEFAULT_STOP_TOLERANCE_DEGREES,
            move_epsilon_degrees: 0.0,
            bands: vec![
                BandStyle::new(Some(4.345), "7FD278F0"),
                BandStyle::new(Some(8.689), "7F2828EC"),
                BandStyle::new(Some(13.034), "7F319CDE"),
                BandStyle::new(Some(17.379), "7F63EFF7"),
                BandStyle::new(None, "7F8DE087"),
            ],
            geofences: Vec::new(),
            render_geofences: true,
            path_description: DEFAULT_PATH_DESCRIPTION.to_owned(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.stop_tolerance_degrees.is_nan() || self.stop_tolerance_degrees < 0.0 {
            bail!(
                "stop tolerance must be non-negative, got {}",
                self.stop_tolerance_degrees
            );
        }
        if self.move_epsilon_degrees.is_nan() || self.move_epsilon_degrees < 0.0 {
            bail!(
                "move epsilon must be non-negative, got {}",
                self.move_epsilon_degrees
            );
        }
        if self.bands.is_empty() {
            bail!("at least one speed band is required");
        }
        if self.bands.len() > u8::MAX as usize {
            bail!("too many speed bands: {}", self.bands.len());
        }
        let last = self.bands.len() - 1;
        let mut previous: Option<f64> = None;
        for (i, band) in self.bands.iter().enumerate() {
            match band.upper_bound_knots {
                None if i != last => bail!("only the last speed band may be unbounded"),
                None => {}
                Some(bound) => {
                    if let Some(prev) = previous {
                        if bound <= prev {
                            bail!(
                                "speed band bounds must be increasing: {} after {}",
                                bound,
                                prev
                            );
                        }
                    }
                    previous = Some(bound);
                }
            }
        }
        for fence in &self.geofences {
            fence.validate()?;
        }
        Ok(())
    }

    /// Band for a given speed: the first band whose inclusive upper bound
    /// holds the speed, otherwise the last one.
    pub fn band_for_speed(&self, speed_knots: f64) -> SpeedBand {
        let index = self
            .bands
            .iter()
            .position(|band| match band.upper_bound_knots {
                Some(bound) => speed_knots <= bound,
                None => true,
            })
            .unwrap_or(self.bands.len().saturating_sub(1));
        SpeedBand(index as u8 + 1)
    }

    pub fn band_style(&self, band: SpeedBand) -> Option<&BandStyle> {
        self.bands.get(band.index())
    }
}
