#![allow(clippy::new_without_default)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate lazy_static;

pub mod config;
pub mod export_data;
pub mod geofence;
pub mod gps_processor;
pub mod import_data;
pub mod logs;
pub mod nmea;
pub mod pipeline;
pub mod segmenter;
pub mod track;
pub mod utils;
