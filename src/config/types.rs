//! Configuration types.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the archive lives and how it is stamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Word inserted before the document's extension to name the archive
    /// (`todo.taskpaper` -> `todoArchive.taskpaper`).
    #[serde(default = "default_archive_suffix")]
    pub suffix: String,

    /// Title of the top-level project that carries the last-updated marker.
    #[serde(default = "default_archive_header")]
    pub header: String,

    /// Tag holding the last-updated timestamp.
    #[serde(default = "default_marker_tag")]
    pub marker_tag: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            suffix: default_archive_suffix(),
            header: default_archive_header(),
            marker_tag: default_marker_tag(),
        }
    }
}

impl ArchiveConfig {
    /// Path of the archive that belongs to `document`.
    pub fn archive_path_for(&self, document: &Path) -> PathBuf {
        let stem = document
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match document.extension() {
            Some(ext) => format!("{}{}.{}", stem, self.suffix, ext.to_string_lossy()),
            None => format!("{}{}", stem, self.suffix),
        };
        document.with_file_name(name)
    }
}

fn default_archive_suffix() -> String {
    "Archive".to_string()
}

fn default_archive_header() -> String {
    "Archive".to_string()
}

fn default_marker_tag() -> String {
    "updated".to_string()
}

fn default_awareness_tags() -> Vec<String> {
    vec!["should".to_string()]
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Outline of recurring task templates (read-only).
    #[serde(default)]
    pub recurring: Option<PathBuf>,

    /// Resolve the next day's weekday items during today's run.
    #[serde(default)]
    pub carry_tomorrow: bool,

    /// Replay every day since the archive was last stamped.
    #[serde(default)]
    pub catch_up: bool,

    /// Print results instead of overwriting files.
    #[serde(default)]
    pub simulate: bool,

    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Tags cleared at the start of every simulated day.
    #[serde(default = "default_awareness_tags")]
    pub awareness_tags: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recurring: None,
            carry_tomorrow: false,
            catch_up: false,
            simulate: false,
            archive: ArchiveConfig::default(),
            awareness_tags: default_awareness_tags(),
        }
    }
}

impl Config {
    /// Load a single YAML file on top of the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parse YAML text; missing fields take their defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}
