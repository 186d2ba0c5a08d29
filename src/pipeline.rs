//! Per-file processing: fixes in, KML (and optionally GPX) artifacts out.
//!
//! Every file gets its own classifier and segmenter state, so one file never
//! influences another. Batch runs keep going when a single file fails.

use std::{
    collections::HashMap,
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::export_data;
use crate::geofence::{GeoFence, GeoFenceSet};
use crate::gps_processor::classify_fixes;
use crate::import_data;
use crate::segmenter::{build_path_segments, SegmentedPath};
use crate::track::{Fix, StopEvent};
use crate::utils::ArtifactPaths;

#[derive(Clone, Debug)]
pub struct ProcessOptions {
    pub apply_geofences: bool,
    pub write_gpx: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        ProcessOptions {
            apply_geofences: true,
            write_gpx: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct ProcessedTrack {
    pub moving_fixes: Vec<Fix>,
    pub stop_events: Vec<StopEvent>,
    pub path: SegmentedPath,
    pub dropped: usize,
    pub excluded_by_geofence: usize,
}

/// Classify, drop fenced points, then segment by speed band.
pub fn process_fixes(
    fixes: impl Iterator<Item = Result<Fix>>,
    config: &Config,
    apply_geofences: bool,
) -> Result<ProcessedTrack> {
    let cleaned = classify_fixes(fixes, config)?;
    let mut moving_fixes = cleaned.moving_fixes;
    let mut stop_events = cleaned.stop_events;

    let mut excluded_by_geofence = 0;
    if apply_geofences {
        let fences = GeoFenceSet::new(config.geofences.clone());
        excluded_by_geofence += fences.retain_outside(&mut moving_fixes);
        excluded_by_geofence += fences.retain_outside(&mut stop_events);
    }

    let path = build_path_segments(&moving_fixes, config);
    Ok(ProcessedTrack {
        moving_fixes,
        stop_events,
        path,
        dropped: cleaned.dropped,
        excluded_by_geofence,
    })
}

#[derive(Clone, Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub artifacts: ArtifactPaths,
    pub skipped_records: usize,
    pub moving_fixes: usize,
    pub stop_events: usize,
    pub dropped: usize,
    pub excluded_by_geofence: usize,
    pub segments: usize,
    pub elapsed_minutes: i64,
    pub wrote_gpx: bool,
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

pub fn write_artifacts(
    track: &ProcessedTrack,
    artifacts: &ArtifactPaths,
    config: &Config,
    write_gpx: bool,
) -> Result<()> {
    let overlays: &[GeoFence] = if config.render_geofences {
        config.geofences.as_slice()
    } else {
        &[]
    };
    export_data::write_path_kml(
        create_output(&artifacts.path_kml)?,
        &artifacts.name,
        &track.path.segments,
        config,
        overlays,
    )
    .with_context(|| format!("failed to write {}", artifacts.path_kml.display()))?;

    export_data::write_hazards_kml(
        create_output(&artifacts.hazards_kml)?,
        &artifacts.name,
        &track.stop_events,
    )
    .with_context(|| format!("failed to write {}", artifacts.hazards_kml.display()))?;

    if write_gpx {
        export_data::write_track_gpx(
            create_output(&artifacts.track_gpx)?,
            &artifacts.name,
            &track.path.segments,
        )
        .with_context(|| format!("failed to write {}", artifacts.track_gpx.display()))?;
    }
    Ok(())
}

pub fn process_file(
    input: &Path,
    artifacts: &ArtifactPaths,
    config: &Config,
    options: &ProcessOptions,
) -> Result<FileReport> {
    info!("Now parsing {}", input.display());
    let mut source = import_data::open_fixes(input)?;
    let track = process_fixes(source.by_ref(), config, options.apply_geofences)
        .with_context(|| format!("failed to read {}", input.display()))?;
    write_artifacts(&track, artifacts, config, options.write_gpx)?;

    let report = FileReport {
        input: input.to_path_buf(),
        artifacts: artifacts.clone(),
        skipped_records: source.skipped(),
        moving_fixes: track.moving_fixes.len(),
        stop_events: track.stop_events.len(),
        dropped: track.dropped,
        excluded_by_geofence: track.excluded_by_geofence,
        segments: track.path.segments.len(),
        elapsed_minutes: track.path.elapsed_minutes(),
        wrote_gpx: options.write_gpx,
    };
    info!(
        "{}: {} moving fixes in {} segments ({} min), {} stops, {} dropped, {} fenced, {} bad records",
        input.display(),
        report.moving_fixes,
        report.segments,
        report.elapsed_minutes,
        report.stop_events,
        report.dropped,
        report.excluded_by_geofence,
        report.skipped_records
    );
    Ok(report)
}

pub fn prepare_output_dir(output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            output_dir.display()
        )
    })
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<FileReport>,
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Processes each input in turn. Only a failure to create the output
/// directory aborts the run; per-file failures are logged and collected.
/// An input whose artifact names were already written by an earlier input
/// fails instead of overwriting them.
pub fn process_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    config: &Config,
    options: &ProcessOptions,
) -> Result<BatchReport> {
    prepare_output_dir(output_dir)?;
    let mut report = BatchReport::default();
    // inputs that differ only in their extension share a base name
    let mut claimed: HashMap<PathBuf, &PathBuf> = HashMap::new();
    for input in inputs {
        let artifacts = ArtifactPaths::for_input(output_dir, input);
        if let Some(owner) = claimed.get(&artifacts.path_kml) {
            let e = anyhow!(
                "artifact name `{}` is already used by {}",
                artifacts.name,
                owner.display()
            );
            error!("{}: {:#}", input.display(), e);
            report.failed.push((input.clone(), e));
            continue;
        }
        claimed.insert(artifacts.path_kml.clone(), input);
        match process_file(input, &artifacts, config, options) {
            Ok(file_report) => report.succeeded.push(file_report),
            Err(e) => {
                error!("{}: {:#}", input.display(), e);
                report.failed.push((input.clone(), e));
            }
        }
    }
    if inputs.is_empty() {
        warn!("no input files to process");
    }
    Ok(report)
}
