use std::path::{Path, PathBuf};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    Path,
    Hazards,
    Track,
}

impl ArtifactKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            ArtifactKind::Path => "_Path.kml",
            ArtifactKind::Hazards => "_Hazards.kml",
            ArtifactKind::Track => "_Track.gpx",
        }
    }
}

/// File name without directories and without its last extension.
pub fn base_name(file_path: &Path) -> String {
    file_path
        .file_stem()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn artifact_file_name(base_name: &str, kind: ArtifactKind) -> String {
    format!("{}{}", base_name, kind.suffix())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub name: String,
    pub path_kml: PathBuf,
    pub hazards_kml: PathBuf,
    pub track_gpx: PathBuf,
}

impl ArtifactPaths {
    /// `<output_dir>/<input base name><suffix>` for every artifact kind.
    pub fn for_input(output_dir: &Path, input: &Path) -> Self {
        let name = base_name(input);
        ArtifactPaths {
            path_kml: output_dir.join(artifact_file_name(&name, ArtifactKind::Path)),
            hazards_kml: output_dir.join(artifact_file_name(&name, ArtifactKind::Hazards)),
            track_gpx: output_dir.join(artifact_file_name(&name, ArtifactKind::Track)),
            name,
        }
    }

    /// The path artifact goes exactly to `path_kml`; the other artifacts sit
    /// next to it, named after its stem.
    pub fn with_explicit_path(path_kml: &Path) -> Self {
        let name = base_name(path_kml);
        let dir = path_kml.parent().unwrap_or_else(|| Path::new(""));
        ArtifactPaths {
            path_kml: path_kml.to_path_buf(),
            hazards_kml: dir.join(artifact_file_name(&name, ArtifactKind::Hazards)),
            track_gpx: dir.join(artifact_file_name(&name, ArtifactKind::Track)),
            name,
        }
    }
}
