use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::remote::posts::{DEFAULT_POSTS_URL, POSTS_PER_PAGE};

pub const CONFIG_VERSION: u64 = 1;
pub const DEFAULT_STORAGE_KEY: &str = "plp-tasks";

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("plp-tasks")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub version: u64,
    pub data_directory: PathBuf,
    /// Name of the durable slot holding the task list.
    pub storage_key: String,
    pub posts_url: String,
    pub posts_per_page: usize,
    pub dark_mode: bool,
    pub debug_logging: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data_directory: default_data_dir(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            posts_url: DEFAULT_POSTS_URL.to_string(),
            posts_per_page: POSTS_PER_PAGE,
            dark_mode: false,
            debug_logging: false,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("plp-tasks")
            .join("config.json")
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.data_directory.join(format!("{}.json", self.storage_key))
    }

    /// Ensure the data directory exists.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_directory)
    }

    pub fn try_load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load from `path`, falling back to defaults. A missing file is not a
    /// problem; anything else unreadable comes back alongside the defaults so
    /// the caller can report it once logging is up.
    pub fn load_or_default(path: &Path) -> (Self, Option<ConfigError>) {
        match Self::try_load(path) {
            Ok(config) => (config, None),
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                (Self::default(), None)
            }
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn load(path: &Path) -> Self {
        let (config, problem) = Self::load_or_default(path);
        if let Some(e) = problem {
            log::warn!("Ignoring config at {}: {}", path.display(), e);
        }
        config
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
