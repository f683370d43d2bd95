use crate::error::{Result, SteelToesError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    /// Fixed branch, ahead of `STEEL_TOES_BRANCH` and git.
    pub branch: Option<String>,
    /// Print protected datasets when the catalog is created.
    pub announce: bool,
    /// Dataset types that are never branched.
    pub ignore_types: Vec<String>,
    /// Catalog files relative to the project directory, later ones win.
    pub catalog_files: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            branch: None,
            announce: false,
            ignore_types: Vec::new(),
            catalog_files: vec![
                PathBuf::from("conf/base/catalog.yml"),
                PathBuf::from("conf/local/catalog.yml"),
            ],
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>, project_dir: &Path) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        // Project-local: <project>/steel-toes.yml
        let project_config = project_dir.join(format!("{}.yml", PROJECT_NAME));
        if let Some(config) = Self::try_load(&project_config) {
            return Ok(config);
        }

        // User-wide: ~/.config/steel-toes/steel-toes.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(PROJECT_NAME).join(format!("{}.yml", PROJECT_NAME));
            if let Some(config) = Self::try_load(&user_config) {
                return Ok(config);
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn try_load(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config from {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SteelToesError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            SteelToesError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        log::info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Catalog files resolved against `project_dir`.
    pub fn catalog_paths(&self, project_dir: &Path) -> Vec<PathBuf> {
        self.catalog_files
            .iter()
            .map(|p| if p.is_absolute() { p.clone() } else { project_dir.join(p) })
            .collect()
    }
}
