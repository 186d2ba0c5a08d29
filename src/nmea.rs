//! Reading `RMC` (recommended minimum) sentences from NMEA 0183 logs.
//!
//! Only sentences carrying an active fix become a [`Fix`]. Everything else in
//! the log, including corrupted lines, is skipped without raising an error.

use std::io::BufRead;

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use strum_macros::Display;

use crate::track::Fix;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum SkipReason {
    #[strum(to_string = "not an RMC sentence")]
    NotRmc,
    #[strum(to_string = "checksum mismatch")]
    BadChecksum,
    #[strum(to_string = "receiver reports no valid fix")]
    Inactive,
    #[strum(to_string = "malformed field")]
    Malformed,
}

fn checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, b| acc ^ b)
}

/// Splits `$BODY*hh` into the body and the declared checksum, if any.
fn split_sentence(line: &str) -> Result<(&str, Option<&str>), SkipReason> {
    let start = line.find('$').ok_or(SkipReason::NotRmc)?;
    let sentence = line[start + 1..].trim_end();
    Ok(match sentence.split_once('*') {
        None => (sentence, None),
        Some((body, declared)) => (body, Some(declared)),
    })
}

fn verify_checksum(body: &str, declared: &str) -> Result<(), SkipReason> {
    let declared = declared
        .get(..2)
        .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        .ok_or(SkipReason::BadChecksum)?;
    if checksum(body) == declared {
        Ok(())
    } else {
        Err(SkipReason::BadChecksum)
    }
}

fn is_rmc_id(id: &str) -> bool {
    id.len() == 5 && id.ends_with("RMC") && id.bytes().take(2).all(|b| b.is_ascii_uppercase())
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (value, ""),
    };
    if whole.len() != 6 || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour = whole[0..2].parse().ok()?;
    let min = whole[2..4].parse().ok()?;
    let sec = whole[4..6].parse().ok()?;
    let nano = if fraction.is_empty() {
        0
    } else {
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let digits = &fraction[..fraction.len().min(9)];
        let scale = 10u32.pow(9 - digits.len() as u32);
        digits.parse::<u32>().ok()? * scale
    };
    NaiveTime::from_hms_nano_opt(hour, min, sec, nano)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day = value[0..2].parse().ok()?;
    let month = value[2..4].parse().ok()?;
    let yy: i32 = value[4..6].parse().ok()?;
    let year = if yy >= 69 { 1900 + yy } else { 2000 + yy };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `ddmm.mmmm`/`dddmm.mmmm` plus hemisphere into signed decimal degrees.
fn parse_coordinate(value: &str, hemisphere: &str, positive: &str, negative: &str) -> Option<f64> {
    // the hemisphere alone carries the sign
    if !value.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    let dot = value.find('.').unwrap_or(value.len());
    if dot < 2 {
        return None;
    }
    let degrees: f64 = match &value[..dot - 2] {
        "" => 0.0,
        degrees => degrees.parse().ok()?,
    };
    let minutes: f64 = value[dot - 2..].parse().ok()?;
    if !degrees.is_finite() || !(0.0..60.0).contains(&minutes) {
        return None;
    }
    let magnitude = degrees + minutes / 60.0;
    if hemisphere == positive {
        Some(magnitude)
    } else if hemisphere == negative {
        Some(-magnitude)
    } else {
        None
    }
}

fn parse_optional_f64(value: &str) -> Result<Option<f64>, SkipReason> {
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(SkipReason::Malformed),
    }
}

/// Parses one line of a log into a fix.
pub fn parse_rmc(line: &str) -> Result<Fix, SkipReason> {
    let (body, declared) = split_sentence(line)?;
    let fields: Vec<&str> = body.split(',').collect();
    if !is_rmc_id(fields[0]) {
        return Err(SkipReason::NotRmc);
    }
    if let Some(declared) = declared {
        verify_checksum(body, declared)?;
    }
    if fields.len() < 10 {
        return Err(SkipReason::Malformed);
    }
    if fields[2] != "A" {
        return Err(SkipReason::Inactive);
    }

    let time = parse_time(fields[1]).ok_or(SkipReason::Malformed)?;
    let latitude = parse_coordinate(fields[3], fields[4], "N", "S").ok_or(SkipReason::Malformed)?;
    let longitude =
        parse_coordinate(fields[5], fields[6], "E", "W").ok_or(SkipReason::Malformed)?;
    let speed_knots = match parse_optional_f64(fields[7])? {
        Some(speed) if speed >= 0.0 => speed,
        _ => return Err(SkipReason::Malformed),
    };
    let course_degrees = parse_optional_f64(fields[8])?;
    let date = parse_date(fields[9]).ok_or(SkipReason::Malformed)?;

    Ok(Fix {
        time,
        date,
        latitude,
        longitude,
        speed_knots,
        course_degrees,
    })
}

/// Lazily yields the usable fixes of a log, in file order.
///
/// Only I/O failures are reported as errors. Lines are decoded lossily, so
/// binary garbage just spoils the record it is part of.
pub struct FixSource<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    line_number: usize,
    skipped: usize,
}

impl<R: BufRead> FixSource<R> {
    pub fn new(reader: R) -> Self {
        FixSource {
            reader,
            buf: Vec::new(),
            line_number: 0,
            skipped: 0,
        }
    }

    /// Number of RMC sentences dropped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<R: BufRead> Iterator for FixSource<R> {
    type Item = Result<Fix>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line_number += 1;
            let line = String::from_utf8_lossy(&self.buf);
            match parse_rmc(&line) {
                Ok(fix) => return Some(Ok(fix)),
                Err(SkipReason::NotRmc) => {}
                Err(reason) => {
                    self.skipped += 1;
                    trace!("line {}: skipped, {}", self.line_number, reason);
                }
            }
        }
    }
}
