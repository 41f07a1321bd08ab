use crate::client::FetchPolicy;
use crate::error::{BocchiError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".bocchi.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BocchiConfig {
    #[serde(default)]
    pub client: ClientSettings,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub demo: DemoSettings,

    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Target written into every outbound request.
    #[serde(default = "default_uri")]
    pub uri: String,

    /// Policy for client queries that do not name one.
    #[serde(default)]
    pub default_fetch_policy: FetchPolicy,
}

fn default_uri() -> String {
    "/graphql".to_string()
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            default_fetch_policy: FetchPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_introspection")]
    pub introspection: bool,

    #[serde(default)]
    pub limit_depth: Option<usize>,

    #[serde(default)]
    pub limit_complexity: Option<usize>,
}

fn default_introspection() -> bool {
    true
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            introspection: default_introspection(),
            limit_depth: None,
            limit_complexity: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoSettings {
    /// Number of fake packages the demo schema serves.
    #[serde(default = "default_packages")]
    pub packages: usize,
}

fn default_packages() -> usize {
    5
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            packages: default_packages(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogSettings {
    /// JSON log file, rolled daily. `--log-file` takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl BocchiConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BocchiConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the nearest config file at or above `start_path`, or defaults
    /// when there is none.
    pub fn discover(start_path: &Path) -> Result<Self> {
        match Self::find_config_file(start_path) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path.to_path_buf();
        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.client.uri.trim().is_empty() {
            return Err(BocchiError::Config("client.uri must not be empty".to_string()));
        }
        if self.server.limit_depth == Some(0) {
            return Err(BocchiError::Config(
                "server.limit_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
