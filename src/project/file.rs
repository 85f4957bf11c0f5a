use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    assets::decode::decode_asset_file,
    encode::sink::write_output,
    foundation::{
        core::GridConfig,
        error::{ShowError, ShowResult},
    },
    project::model::{Analysis, Project},
};

/// Envelope version written by [`ProjectFile::new`].
pub const PROJECT_FILE_VERSION: &str = "1.0";

/// A saved project: the show plus editor-side settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    /// Envelope version.
    pub version: String,
    /// The show.
    pub project: Project,
    /// Grid used for matrix export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_config: Option<GridConfig>,
    /// Name of the audio file the show was timed against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file_name: Option<String>,
    /// Image files to decode into `project.assets`, relative to the project file.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub asset_sources: BTreeMap<String, PathBuf>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnyProjectJson {
    Envelope(ProjectFile),
    Bare(Project),
}

impl ProjectFile {
    /// Wrap a project in a fresh envelope.
    pub fn new(project: Project) -> Self {
        Self {
            version: PROJECT_FILE_VERSION.to_owned(),
            project,
            matrix_config: None,
            audio_file_name: None,
            asset_sources: BTreeMap::new(),
        }
    }

    /// Parse either a saved envelope or a bare project from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> ShowResult<Self> {
        let parsed: AnyProjectJson = serde_json::from_reader(r)
            .map_err(|e| ShowError::serde(format!("parse project JSON: {e}")))?;
        Ok(match parsed {
            AnyProjectJson::Envelope(file) => file,
            AnyProjectJson::Bare(project) => Self::new(project),
        })
    }

    /// Load a project file, decode its asset sources, and validate the result.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> ShowResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("open project JSON '{}'", path.display()))?;
        let mut file = Self::from_reader(BufReader::new(f))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for (id, source) in &file.asset_sources {
            let asset = decode_asset_file(&base.join(source))?;
            tracing::debug!(asset = %id, frames = asset.frames.len(), "decoded asset source");
            file.project.assets.insert(id.clone(), asset);
        }
        file.project.validate()?;
        Ok(file)
    }

    /// Serialize as pretty JSON.
    pub fn to_json_pretty(&self) -> ShowResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ShowError::serde(format!("serialize project JSON: {e}")))
    }

    /// Write the envelope as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> ShowResult<()> {
        let json = self.to_json_pretty()?;
        write_output(path.as_ref(), json.as_bytes())
    }
}

/// Read pre-computed audio analysis from a JSON file.
pub fn read_analysis(path: impl AsRef<Path>) -> ShowResult<Analysis> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open analysis JSON '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(f))
        .map_err(|e| ShowError::serde(format!("parse analysis JSON '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/project/file.rs"]
mod tests;
