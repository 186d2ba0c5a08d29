use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::config::Config;
use crate::track::{Fix, PathPoint, PathSegment, SpeedBand};

// Only elapsed time matters, so every time of day is pinned to the same date.
lazy_static! {
    static ref ANCHOR_DATE: NaiveDate = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
}

fn anchored(time: NaiveTime) -> NaiveDateTime {
    ANCHOR_DATE.and_time(time)
}

#[derive(Debug, Default, PartialEq)]
pub struct SegmentedPath {
    pub segments: Vec<PathSegment>,
    /// Sum of the durations of closed segments. Can be negative when the
    /// input is not in time order.
    pub elapsed_seconds: i64,
}

impl SegmentedPath {
    pub fn elapsed_minutes(&self) -> i64 {
        self.elapsed_seconds.div_euclid(60)
    }
}

/// Groups consecutive moving fixes into segments of the same speed band.
///
/// The fix that changes the band ends the old segment and also starts the
/// new one, so rendered lines join up without a gap.
pub struct SpeedBandSegmenter<'a> {
    config: &'a Config,
    current: Option<PathSegment>,
    anchor: Option<NaiveDateTime>,
    finished: Vec<PathSegment>,
    elapsed_seconds: i64,
}

impl<'a> SpeedBandSegmenter<'a> {
    pub fn new(config: &'a Config) -> Self {
        SpeedBandSegmenter {
            config,
            current: None,
            anchor: None,
            finished: Vec::new(),
            elapsed_seconds: 0,
        }
    }

    pub fn band_for_speed(&self, speed_knots: f64) -> SpeedBand {
        self.config.band_for_speed(speed_knots)
    }

    pub fn push(&mut self, fix: &Fix) {
        let band = self.band_for_speed(fix.speed_knots);
        let point = PathPoint::from(fix);
        let time = anchored(fix.time);

        if self.current.is_none() {
            self.anchor = Some(time);
            self.current = Some(PathSegment::new(band));
        }
        let band_changed = match self.current.as_mut() {
            Some(current) => {
                current.points.push(point);
                current.band != band
            }
            None => false,
        };

        if band_changed {
            if let Some(anchor) = self.anchor {
                self.elapsed_seconds += (time - anchor).num_seconds();
            }
            let mut next = PathSegment::new(band);
            next.points.push(point);
            if let Some(closed) = self.current.replace(next) {
                self.finished.push(closed);
            }
            self.anchor = Some(time);
        }
    }

    pub fn finish(mut self) -> SegmentedPath {
        if let Some(last) = self.current.take() {
            self.finished.push(last);
        }
        if self.elapsed_seconds < 0 {
            warn!(
                "segment durations add up to {}s, fixes are probably out of order",
                self.elapsed_seconds
            );
        }
        SegmentedPath {
            segments: self.finished,
            elapsed_seconds: self.elapsed_seconds,
        }
    }
}

pub fn build_path_segments<'f>(
    moving_fixes: impl IntoIterator<Item = &'f Fix>,
    config: &Config,
) -> SegmentedPath {
    let mut segmenter = SpeedBandSegmenter::new(config);
    for fix in moving_fixes {
        segmenter.push(fix);
    }
    segmenter.finish()
}
