use anyhow::Result;

use crate::config::Config;
use crate::track::{Fix, StopEvent};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProcessResult {
    /// Kept for the path.
    Moving,
    /// A new stop was recorded at this fix.
    Stop,
    // Stationary sample that continues an already recorded stop, or one that
    // is too close to the last stop.
    Ignore,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct LastMoving {
    latitude: f64,
    longitude: f64,
    speed_knots: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct LastStop {
    latitude: f64,
    longitude: f64,
}

/// Splits fixes into moving samples and stop events.
///
/// A fix is moving when its position differs from the last moving fix and
/// either it has a non-zero speed or its speed differs from the last moving
/// speed. Everything else is a stop candidate, which is recorded only if the
/// previous fix was not already part of a recorded stop and it is farther
/// than the stop tolerance from the last stop in both axes.
pub struct MotionClassifier {
    stop_tolerance_degrees: f64,
    move_epsilon_degrees: f64,
    last_moving: Option<LastMoving>,
    last_stop: Option<LastStop>,
    was_stop: bool,
}

impl MotionClassifier {
    pub fn new(config: &Config) -> Self {
        MotionClassifier {
            stop_tolerance_degrees: config.stop_tolerance_degrees,
            move_epsilon_degrees: config.move_epsilon_degrees,
            last_moving: None,
            last_stop: None,
            was_stop: false,
        }
    }

    pub fn was_stop(&self) -> bool {
        self.was_stop
    }

    pub fn last_stop_position(&self) -> Option<(f64, f64)> {
        self.last_stop.map(|stop| (stop.latitude, stop.longitude))
    }

    fn has_moved(&self, fix: &Fix) -> bool {
        match &self.last_moving {
            None => true,
            Some(last) => {
                (fix.latitude - last.latitude).abs() > self.move_epsilon_degrees
                    || (fix.longitude - last.longitude).abs() > self.move_epsilon_degrees
            }
        }
    }

    fn speed_says_moving(&self, fix: &Fix) -> bool {
        // With no previous moving fix this is the same as comparing against
        // a speed of zero.
        let last_speed = self.last_moving.map_or(0.0, |last| last.speed_knots);
        fix.speed_knots != 0.0 || fix.speed_knots != last_speed
    }

    fn is_new_stop_location(&self, fix: &Fix) -> bool {
        match &self.last_stop {
            None => true,
            Some(stop) => {
                (fix.latitude - stop.latitude).abs() > self.stop_tolerance_degrees
                    && (fix.longitude - stop.longitude).abs() > self.stop_tolerance_degrees
            }
        }
    }

    pub fn preprocess(&mut self, fix: &Fix) -> ProcessResult {
        if self.has_moved(fix) && self.speed_says_moving(fix) {
            self.was_stop = false;
            self.last_moving = Some(LastMoving {
                latitude: fix.latitude,
                longitude: fix.longitude,
                speed_knots: fix.speed_knots,
            });
            ProcessResult::Moving
        } else if !self.was_stop && self.is_new_stop_location(fix) {
            self.was_stop = true;
            self.last_stop = Some(LastStop {
                latitude: fix.latitude,
                longitude: fix.longitude,
            });
            ProcessResult::Stop
        } else {
            ProcessResult::Ignore
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct CleanedTrack {
    pub moving_fixes: Vec<Fix>,
    pub stop_events: Vec<StopEvent>,
    pub dropped: usize,
}

impl CleanedTrack {
    pub fn total(&self) -> usize {
        self.moving_fixes.len() + self.stop_events.len() + self.dropped
    }
}

pub fn classify_fixes(
    fixes: impl Iterator<Item = Result<Fix>>,
    config: &Config,
) -> Result<CleanedTrack> {
    let mut classifier = MotionClassifier::new(config);
    let mut cleaned = CleanedTrack::default();
    for fix in fixes {
        let fix = fix?;
        match classifier.preprocess(&fix) {
            ProcessResult::Moving => cleaned.moving_fixes.push(fix),
            ProcessResult::Stop => cleaned.stop_events.push(StopEvent::from_fix(&fix)),
            ProcessResult::Ignore => cleaned.dropped += 1,
        }
    }
    debug!(
        "classified {} fixes: {} moving, {} stops, {} dropped",
        cleaned.total(),
        cleaned.moving_fixes.len(),
        cleaned.stop_events.len(),
        cleaned.dropped
    );
    Ok(cleaned)
}
