use directories::BaseDirs;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Resolved runtime settings for the client core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub data_dir: PathBuf,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("configuration invalid: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Invalid(detail) => {
                format!("Mica is misconfigured—{detail}. Update mica.yaml.")
            }
        }
    }
}

impl Settings {
    /// Load settings: built-in defaults, overlaid by the first `mica.yaml`
    /// found in the candidate locations, overlaid by environment variables
    /// (`MICA_API_BASE_URL`, `MICA_DATA_DIR`). A missing config file is not
    /// an error.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match locate_config_file() {
            Some(path) => {
                let contents = fs::read_to_string(&path).map_err(|err| {
                    ConfigError::Invalid(format!("failed to read {}: {err}", path.display()))
                })?;
                serde_yaml::from_str(&contents)
                    .map_err(|err| ConfigError::Invalid(format!("invalid mica.yaml: {err}")))?
            }
            None => MicaConfig::default(),
        };
        let mut settings = resolve_settings(file);
        apply_env_overrides(&mut settings);
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            data_dir: default_data_dir(),
        }
    }
}

fn resolve_settings(config: MicaConfig) -> Settings {
    let mut settings = Settings::default();
    if let Some(server) = config.server {
        let base_url = server.base_url.trim();
        if !base_url.is_empty() {
            settings.api_base_url = base_url.to_string();
        }
    }
    if let Some(storage) = config.storage {
        let data_dir = storage.data_dir.trim();
        if !data_dir.is_empty() {
            settings.data_dir = PathBuf::from(data_dir);
        }
    }
    settings
}

fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(value) = std::env::var("MICA_API_BASE_URL") {
        if !value.trim().is_empty() {
            settings.api_base_url = value.trim().to_string();
        }
    }
    if let Ok(value) = std::env::var("MICA_DATA_DIR") {
        if !value.trim().is_empty() {
            settings.data_dir = PathBuf::from(value.trim());
        }
    }
}

fn default_data_dir() -> PathBuf {
    if let Some(base) = BaseDirs::new() {
        base.data_dir().join("mica")
    } else {
        PathBuf::from(".mica")
    }
}

fn locate_config_file() -> Option<PathBuf> {
    mica_yaml_candidates()
        .into_iter()
        .find(|path| path.exists())
}

fn mica_yaml_candidates() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(base) = BaseDirs::new() {
        let config_dir = base.config_dir().join("mica");
        paths.push(config_dir.join("mica.yaml"));
        paths.push(config_dir.join("mica.yml"));
        let home_dir = base.home_dir();
        paths.push(home_dir.join(".mica").join("mica.yaml"));
        paths.push(home_dir.join(".mica").join("mica.yml"));
    } else {
        paths.push(PathBuf::from("mica.yaml"));
        paths.push(PathBuf::from("mica.yml"));
    }
    paths
}

#[derive(Debug, Default, Deserialize)]
struct MicaConfig {
    server: Option<ServerSection>,
    storage: Option<StorageSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
    #[serde(default)]
    base_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct StorageSection {
    #[serde(default)]
    data_dir: String,
}
