use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Backend the client talks to unless configured otherwise
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Print the outgoing payload before each submission
    #[serde(default)]
    pub show_payload: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BACKEND_URL.to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Directory holding config and logs (`~/.qa-assist`)
    pub fn app_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".qa-assist")
    }

    pub fn get_config_path() -> PathBuf {
        Self::app_dir().join("config.yaml")
    }

    pub fn load_or_default() -> Self {
        let config_path = Self::get_config_path();

        if config_path.exists() {
            match Self::load_from_file(&config_path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(
                    path = %config_path.display(),
                    "ignoring unreadable config: {}",
                    e
                ),
            }
        }

        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        if let Some(url) = endpoint {
            self.backend.url = url;
        }
        self
    }
}
