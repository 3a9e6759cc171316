//! Runtime configuration loaded from TOML.
//!
//! ```toml
//! [engine]
//! selection = "rotate"     # or "display" (default)
//!
//! [storage]
//! data_dir = "/var/lib/mam-den"
//!
//! [display]
//! language = "en"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::engine::queue::SelectionMode;
use crate::i18n::Language;

/// Knobs the transition functions read.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    #[serde(default)]
    pub selection: SelectionMode,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DisplayConfig {
    /// Used when no language has been stored yet.
    pub language: Option<Language>,
}

/// Top-level TOML file structure.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineOptions,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Configured data dir, else the platform data dir, else `./.mam-den`.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.storage.data_dir {
            return dir.clone();
        }
        match dirs::data_dir() {
            Some(dir) => dir.join("mam-den"),
            None => PathBuf::from(".mam-den"),
        }
    }
}

/// Load config from a TOML file at the given path.
pub fn load_config(path: &Path) -> Result<AppConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("mam_den.toml"), PathBuf::from("../mam_den.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("mam-den").join("config.toml"));
    }
    paths
}

/// First candidate that exists and parses, with the path it came from.
/// Unreadable or malformed candidates are skipped with a warning.
pub fn load_first(candidates: &[PathBuf]) -> Option<(PathBuf, AppConfig)> {
    candidates.iter().filter(|p| p.exists()).find_map(|p| match load_config(p) {
        Ok(config) => Some((p.clone(), config)),
        Err(e) => {
            tracing::warn!(path = %p.display(), error = %e, "skipping config");
            None
        }
    })
}

/// Config from the well-known locations, or built-in defaults.
pub fn load_default_config() -> AppConfig {
    let Some((path, config)) = load_first(&candidate_paths()) else {
        tracing::info!("no mam_den.toml found, using built-in defaults");
        return AppConfig::default();
    };
    tracing::info!(
        path = %path.display(),
        selection = ?config.engine.selection,
        data_dir = %config.data_dir().display(),
        language = ?config.display.language,
        "loaded config"
    );
    config
}
