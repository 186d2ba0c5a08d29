use std::{
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use itertools::Itertools;

use crate::nmea::FixSource;
use crate::track::Fix;

/// Opens a log for reading. Calling this again restarts the sequence.
pub fn open_fixes(file_path: &Path) -> Result<FixSource<BufReader<File>>> {
    let file = File::open(file_path)
        .with_context(|| format!("failed to open {}", file_path.display()))?;
    Ok(FixSource::new(BufReader::new(file)))
}

pub fn load_fixes(file_path: &Path) -> Result<Vec<Fix>> {
    open_fixes(file_path)?.collect()
}

/// Files directly inside `dir` with the given extension (case-insensitive),
/// sorted by path.
pub fn find_input_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to list input directory {}", dir.display()))?;
    let files = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|x| x.to_str())
                .is_some_and(|x| x.eq_ignore_ascii_case(extension))
        })
        .sorted()
        .collect();
    Ok(files)
}
