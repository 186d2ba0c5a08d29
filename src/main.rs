use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser, Subcommand, ValueHint};
use log::{error, info};

use gps_track_core::{
    config::Config,
    import_data, logs,
    pipeline::{self, BatchReport, ProcessOptions},
    utils::ArtifactPaths,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Turn NMEA RMC logs into speed-colored KML paths and stop markers", long_about = None)]
struct Cli {
    /// JSON configuration (speed bands, stop tolerance, geofences)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Directory for generated artifacts
    #[arg(long, global = true, default_value = "./kml", value_hint = ValueHint::DirPath)]
    output_dir: PathBuf,

    /// Also write the moving track as GPX
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    gpx: bool,

    /// Keep fixes inside configured geofences
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    no_geofence: bool,

    /// Also write a rotating log file into this directory
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    log_dir: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a single log file
    Convert {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,

        /// Path KML file name; the hazards file is named after it
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
    /// Convert every log in a directory
    Batch {
        #[arg(long, default_value = "./gps", value_hint = ValueHint::DirPath)]
        input_dir: PathBuf,

        #[arg(long, default_value = "txt")]
        extension: String,
    },
}

fn summarize(report: &BatchReport) -> Result<()> {
    for file in &report.succeeded {
        info!(
            "{} -> {}, {}",
            file.input.display(),
            file.artifacts.path_kml.display(),
            file.artifacts.hazards_kml.display()
        );
    }
    if report.is_success() {
        Ok(())
    } else {
        for (input, e) in &report.failed {
            error!("failed: {}: {:#}", input.display(), e);
        }
        Err(anyhow!(
            "{} of {} files failed",
            report.failed.len(),
            report.failed.len() + report.succeeded.len()
        ))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logs::init(logs::level_for_verbosity(cli.verbose), cli.log_dir.as_deref())?;

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let options = ProcessOptions {
        apply_geofences: !cli.no_geofence,
        write_gpx: cli.gpx,
    };

    match cli.command {
        Command::Convert { input, output } => {
            let artifacts = match output {
                Some(output) => ArtifactPaths::with_explicit_path(&output),
                None => {
                    pipeline::prepare_output_dir(&cli.output_dir)?;
                    ArtifactPaths::for_input(&cli.output_dir, &input)
                }
            };
            pipeline::process_file(&input, &artifacts, &config, &options)?;
            Ok(())
        }
        Command::Batch {
            input_dir,
            extension,
        } => {
            let inputs = import_data::find_input_files(&input_dir, &extension)?;
            info!("found {} files in {}", inputs.len(), input_dir.display());
            let report = pipeline::process_batch(&inputs, &cli.output_dir, &config, &options)?;
            summarize(&report)
        }
    }
}
