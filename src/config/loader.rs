//! Configuration loader with tier-based merging.

use super::merge::merge_layers;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CONFIG_FILE: &str = "config.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Defaults = 0,
    Project = 1,
    User = 2,
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover directories from the environment, falling back to
    /// `./daily-update` and `~/.daily-update`.
    pub fn discover() -> Self {
        let project_dir = std::env::var("DAILY_UPDATE_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("daily-update")));

        let user_dir = std::env::var("DAILY_UPDATE_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".daily-update")));

        Self {
            project_dir,
            user_dir,
        }
    }

    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }
}

/// Loads [`Config`] from all tiers and remembers which files contributed.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    sources: Vec<(ConfigTier, PathBuf)>,
}

impl ConfigLoader {
    /// Load from the discovered tiers, or from `DAILY_UPDATE_CONFIG_PATH` when set.
    pub fn load() -> Result<Self> {
        if let Ok(explicit) = std::env::var("DAILY_UPDATE_CONFIG_PATH") {
            return Self::load_file(Path::new(&explicit));
        }
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load a single explicit file; environment overrides still apply.
    pub fn load_file(path: &Path) -> Result<Self> {
        let mut config = Config::load(path)?;
        apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        Ok(Self {
            paths: ConfigPaths::default(),
            config,
            sources: vec![(ConfigTier::User, path.to_path_buf())],
        })
    }

    /// Load defaults, then project and user files from `paths`, then environment.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        let mut layers: Vec<Value> = vec![serde_json::to_value(Config::default())?];
        let mut sources = Vec::new();

        let tiers = [
            (ConfigTier::Project, paths.project_dir.as_deref()),
            (ConfigTier::User, paths.user_dir.as_deref()),
        ];
        for (tier, dir) in tiers {
            let Some(dir) = dir else { continue };
            let file = dir.join(CONFIG_FILE);
            if let Some(layer) = read_layer(&file)? {
                debug!(tier = %tier, path = %file.display(), "Loaded config layer");
                layers.push(layer);
                sources.push((tier, file));
            }
        }

        let mut config: Config = serde_json::from_value(merge_layers(layers))
            .context("configuration does not match the expected shape")?;
        apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// Files that contributed, lowest tier first.
    pub fn sources(&self) -> &[(ConfigTier, PathBuf)] {
        &self.sources
    }
}

/// Read one YAML layer. A missing file is not an error; a malformed one is.
fn read_layer(path: &Path) -> Result<Option<Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Config file unreadable, skipping");
            return Ok(None);
        }
    };
    let value: Value = serde_yaml::from_str(&content)
        .with_context(|| format!("invalid YAML in {}", path.display()))?;
    Ok(Some(value))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("{key} must be a boolean, got '{other}'"),
    }
}

/// Apply `DAILY_UPDATE_*` overrides read through `lookup`.
pub(crate) fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let mut layer = Map::new();
    if let Some(recurring) = lookup("DAILY_UPDATE_RECURRING") {
        layer.insert("recurring".into(), Value::String(recurring));
    }
    for (key, field) in [
        ("DAILY_UPDATE_CATCH_UP", "catch_up"),
        ("DAILY_UPDATE_CARRY_TOMORROW", "carry_tomorrow"),
    ] {
        if let Some(raw) = lookup(key) {
            layer.insert(field.into(), Value::Bool(parse_flag(key, &raw)?));
        }
    }
    if layer.is_empty() {
        return Ok(());
    }
    let merged = merge_layers([serde_json::to_value(&*config)?, Value::Object(layer)]);
    *config = serde_json::from_value(merged)?;
    Ok(())
}
