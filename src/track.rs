use std::fmt;

use chrono::{NaiveDate, NaiveTime, Timelike};

/// One positional sample reported by the receiver.
#[derive(Clone, Debug, PartialEq)]
pub struct Fix {
    pub time: NaiveTime,
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_knots: f64,
    // receivers leave this empty while stationary
    pub course_degrees: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StopEvent {
    pub latitude: f64,
    pub longitude: f64,
    pub time: NaiveTime,
    pub date: NaiveDate,
}

impl StopEvent {
    pub fn from_fix(fix: &Fix) -> Self {
        StopEvent {
            latitude: fix.latitude,
            longitude: fix.longitude,
            time: fix.time,
            date: fix.date,
        }
    }

    /// `HH:MM:SS[.ffffff] YYYY-MM-DD`; the fraction only when there is one.
    pub fn description(&self) -> String {
        let time = if self.time.nanosecond() == 0 {
            self.time.format("%H:%M:%S")
        } else {
            self.time.format("%H:%M:%S%.6f")
        };
        format!("{} {}", time, self.date)
    }
}

/// 1-based ordinal of a speed band. Band 1 is the slowest.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpeedBand(pub u8);

impl SpeedBand {
    pub fn index(&self) -> usize {
        (self.0 as usize).saturating_sub(1)
    }

    pub fn style_id(&self) -> String {
        format!("band{}", self.0)
    }
}

impl fmt::Display for SpeedBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "band {}", self.0)
    }
}

/// A point of the rendered path. Speed takes the place of altitude.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub speed_knots: f64,
}

impl From<&Fix> for PathPoint {
    fn from(fix: &Fix) -> Self {
        PathPoint {
            longitude: fix.longitude,
            latitude: fix.latitude,
            speed_knots: fix.speed_knots,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PathSegment {
    pub band: SpeedBand,
    pub points: Vec<PathPoint>,
}

impl PathSegment {
    pub fn new(band: SpeedBand) -> Self {
        PathSegment {
            band,
            points: Vec::new(),
        }
    }
}

/// Anything with a position that the geofence filter can test.
pub trait Located {
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;
}

impl Located for Fix {
    fn latitude(&self) -> f64 {
        self.latitude
    }
    fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl Located for StopEvent {
    fn latitude(&self) -> f64 {
        self.latitude
    }
    fn longitude(&self) -> f64 {
        self.longitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop_at(time: NaiveTime) -> StopEvent {
        StopEvent {
            latitude: 45.0,
            longitude: -93.0,
            time,
            date: NaiveDate::from_ymd_opt(2023, 6, 15).unwrap(),
        }
    }

    #[test]
    fn stop_description() {
        let whole = stop_at(NaiveTime::from_hms_opt(13, 0, 16).unwrap());
        assert_eq!(whole.description(), "13:00:16 2023-06-15");

        let fractional = stop_at(NaiveTime::from_hms_milli_opt(13, 0, 16, 500).unwrap());
        assert_eq!(fractional.description(), "13:00:16.500000 2023-06-15");
    }
}
