#![allow(dead_code)]

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use gps_track_core::track::Fix;
use kml::types::Placemark;
use kml::{Kml, KmlReader};

pub const SAMPLE_DRIVE: &str = "./tests/data/drive_with_stops.txt";

pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 6, 15).unwrap()
}

pub fn fix_at(seconds: u32, latitude: f64, longitude: f64, speed_knots: f64) -> Fix {
    Fix {
        time: NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap(),
        date: test_date(),
        latitude,
        longitude,
        speed_knots,
        course_degrees: None,
    }
}

/// Fixes one second apart, starting at midnight.
pub fn fixes(samples: &[(f64, f64, f64)]) -> Vec<Fix> {
    samples
        .iter()
        .enumerate()
        .map(|(i, &(lat, lng, speed))| fix_at(i as u32, lat, lng, speed))
        .collect()
}

pub fn as_results(fixes: Vec<Fix>) -> impl Iterator<Item = Result<Fix>> {
    fixes.into_iter().map(Ok)
}

fn nmea_coordinate(value: f64, degree_digits: usize) -> String {
    let value = value.abs();
    let degrees = value.trunc();
    let minutes = (value - degrees) * 60.0;
    format!(
        "{:0width$}{:07.4}",
        degrees as u32,
        minutes,
        width = degree_digits
    )
}

/// A checksummed `$GPRMC` sentence for the given fix data.
pub fn rmc_sentence(seconds: u32, latitude: f64, longitude: f64, speed_knots: f64) -> String {
    let body = format!(
        "GPRMC,{:02}{:02}{:02}.00,A,{},{},{},{},{:.1},,150623,,,A",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60,
        nmea_coordinate(latitude, 2),
        if latitude >= 0.0 { "N" } else { "S" },
        nmea_coordinate(longitude, 3),
        if longitude >= 0.0 { "E" } else { "W" },
        speed_knots
    );
    let checksum = body.bytes().fold(0u8, |acc, b| acc ^ b);
    format!("${body}*{checksum:02X}")
}

pub fn nmea_log(samples: &[(f64, f64, f64)]) -> String {
    samples
        .iter()
        .enumerate()
        .map(|(i, &(lat, lng, speed))| rmc_sentence(43200 + i as u32, lat, lng, speed) + "\n")
        .collect()
}

fn flatten_kml(kml: Vec<Kml>) -> Vec<Kml> {
    kml.into_iter()
        .flat_map(|k| match k {
            Kml::KmlDocument(d) => flatten_kml(d.elements),
            Kml::Document { attrs: _, elements } => flatten_kml(elements),
            Kml::Folder { attrs: _, elements } => flatten_kml(elements),
            k => vec![k],
        })
        .collect()
}

pub fn read_placemarks(kml_data: &[u8]) -> Vec<Placemark> {
    let kml = KmlReader::<_, f64>::from_reader(kml_data).read().unwrap();
    flatten_kml(vec![kml])
        .into_iter()
        .filter_map(|k| match k {
            Kml::Placemark(p) => Some(p),
            _ => None,
        })
        .collect()
}
