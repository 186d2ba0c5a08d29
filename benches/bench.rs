use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion};

use gps_track_core::{
    config::Config, export_data, nmea::FixSource, pipeline::process_fixes,
};

#[path = "../tests/test_utils/mod.rs"]
mod test_utils;

// ten thousand fixes of stop-and-go driving
fn synthetic_log() -> String {
    let (mut lat, mut lng) = (45.0_f64, -93.0_f64);
    let samples: Vec<_> = (0..10_000u32)
        .map(|i| {
            let speed = if i % 50 < 5 { 0.0 } else { (i % 25) as f64 };
            lat += 0.00002 * speed;
            lng -= 0.00001 * speed;
            (lat, lng, speed)
        })
        .collect();
    test_utils::nmea_log(&samples)
}

fn pipeline(c: &mut Criterion) {
    let log = synthetic_log();
    let config = Config::default();

    c.bench_function("parse_and_classify", |b| {
        b.iter(|| {
            let source = FixSource::new(Cursor::new(log.as_bytes()));
            std::hint::black_box(process_fixes(source, &config, true).unwrap());
        });
    });

    let source = FixSource::new(Cursor::new(log.as_bytes()));
    let track = process_fixes(source, &config, true).unwrap();
    c.bench_function("write_path_kml", |b| {
        b.iter(|| {
            std::hint::black_box(
                export_data::write_path_kml(
                    Vec::new(),
                    "bench",
                    &track.path.segments,
                    &config,
                    &[],
                )
                .unwrap(),
            );
        });
    });
}

criterion_group!(benches, pipeline);
criterion_main!(benches);
