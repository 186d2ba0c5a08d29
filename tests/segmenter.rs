pub mod test_utils;

use gps_track_core::config::Config;
use gps_track_core::segmenter::{build_path_segments, SpeedBandSegmenter};
use gps_track_core::track::{Fix, PathPoint, SpeedBand};
use test_utils::{fix_at, fixes};

fn speeds(speeds: &[f64]) -> Vec<Fix> {
    let samples: Vec<_> = speeds
        .iter()
        .enumerate()
        .map(|(i, &speed)| (45.0 + i as f64 * 0.001, -93.0, speed))
        .collect();
    fixes(&samples)
}

#[test]
fn empty_input_has_no_segments() {
    let config = Config::default();
    let path = build_path_segments(&Vec::<Fix>::new(), &config);
    assert!(path.segments.is_empty());
    assert_eq!(path.elapsed_seconds, 0);
}

#[test]
fn single_band() {
    let config = Config::default();
    let path = build_path_segments(&speeds(&[1.0, 2.0, 3.0, 4.345]), &config);
    assert_eq!(path.segments.len(), 1);
    assert_eq!(path.segments[0].band, SpeedBand(1));
    assert_eq!(path.segments[0].points.len(), 4);
}

#[test]
fn first_segment_takes_first_band() {
    let config = Config::default();
    let path = build_path_segments(&speeds(&[30.0, 30.0]), &config);
    assert_eq!(path.segments.len(), 1);
    assert_eq!(path.segments[0].band, SpeedBand(5));
}

#[test]
fn boundary_point_is_shared() {
    let config = Config::default();
    let input = speeds(&[2.0, 3.0, 6.0, 7.0, 2.0]);
    let path = build_path_segments(&input, &config);

    let bands: Vec<_> = path.segments.iter().map(|s| s.band).collect();
    assert_eq!(bands, vec![SpeedBand(1), SpeedBand(2), SpeedBand(1)]);
    let lens: Vec<_> = path.segments.iter().map(|s| s.points.len()).collect();
    assert_eq!(lens, vec![3, 3, 1]);

    assert_eq!(path.segments[0].points[2], PathPoint::from(&input[2]));
    assert_eq!(path.segments[1].points[0], PathPoint::from(&input[2]));
    assert_eq!(path.segments[1].points[2], PathPoint::from(&input[4]));
    assert_eq!(path.segments[2].points[0], PathPoint::from(&input[4]));
}

#[test]
fn segments_cover_all_moving_fixes() {
    let config = Config::default();
    let input = speeds(&[
        0.5, 3.0, 5.0, 9.0, 9.5, 14.0, 18.0, 25.0, 17.0, 12.0, 12.5, 4.0, 4.0, 100.0, 0.1,
    ]);
    let path = build_path_segments(&input, &config);

    let mut points: Vec<PathPoint> = Vec::new();
    for (i, segment) in path.segments.iter().enumerate() {
        let skip = if i == 0 { 0 } else { 1 };
        points.extend(segment.points.iter().skip(skip).copied());
    }
    let expected: Vec<PathPoint> = input.iter().map(PathPoint::from).collect();
    assert_eq!(points, expected);

    for segment in &path.segments {
        // every point but a closing boundary point is in the segment's band
        let body = &segment.points[..segment.points.len().max(2) - 1];
        for point in body {
            assert_eq!(config.band_for_speed(point.speed_knots), segment.band);
        }
    }
}

#[test]
fn elapsed_time_between_band_changes() {
    let config = Config::default();
    let input = vec![
        fix_at(0, 45.0, -93.0, 2.0),
        fix_at(10, 45.001, -93.0, 6.0),
        fix_at(60, 45.002, -93.0, 6.0),
        fix_at(130, 45.003, -93.0, 20.0),
        fix_at(500, 45.004, -93.0, 20.0),
    ];
    let path = build_path_segments(&input, &config);
    assert_eq!(path.segments.len(), 3);
    // the open last segment does not count
    assert_eq!(path.elapsed_seconds, 130);
    assert_eq!(path.elapsed_minutes(), 2);
}

#[test]
fn out_of_order_times_give_negative_duration() {
    let config = Config::default();
    let input = vec![
        fix_at(100, 45.0, -93.0, 2.0),
        fix_at(30, 45.001, -93.0, 6.0),
    ];
    let path = build_path_segments(&input, &config);
    assert_eq!(path.segments.len(), 2);
    assert_eq!(path.elapsed_seconds, -70);
    assert_eq!(path.elapsed_minutes(), -2);
}

#[test]
fn incremental_segmenter_matches_batch() {
    let config = Config::default();
    let input = speeds(&[1.0, 5.0, 5.0, 10.0, 1.0]);
    let mut segmenter = SpeedBandSegmenter::new(&config);
    for fix in &input {
        segmenter.push(fix);
    }
    assert_eq!(segmenter.finish(), build_path_segments(&input, &config));
}

#[test]
fn custom_bands() {
    let config: Config = serde_json::from_str(
        r#"{"bands": [
            {"upper_bound_knots": 10.0, "color": "FF0000FF"},
            {"upper_bound_knots": null, "color": "FF00FF00", "width": 3.0}
        ]}"#,
    )
    .unwrap();
    config.validate().unwrap();
    let path = build_path_segments(&speeds(&[5.0, 9.0, 11.0, 50.0]), &config);
    let bands: Vec<_> = path.segments.iter().map(|s| s.band).collect();
    assert_eq!(bands, vec![SpeedBand(1), SpeedBand(2)]);
    assert_eq!(config.band_style(SpeedBand(2)).unwrap().width, 3.0);
}
