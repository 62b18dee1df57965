//! Project list loading and validation
//!
//! The document is JSON by default (`config.json` in the working directory);
//! a `.toml` path is read as TOML with the same field names.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_FTP_PORT: u16 = 21;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub projects: Vec<ProjectSpec>,
}

/// One local tree and the remote directory it is mirrored onto.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpec {
    pub name: String,
    pub local_path: PathBuf,
    pub remote_path: String,
    #[serde(rename = "ftpConfig")]
    pub endpoint: Endpoint,
    /// Create a missing remote root instead of failing the listing step
    #[serde(default)]
    pub create_remote_root: bool,
    #[serde(default)]
    pub exclude_files: Vec<String>,
    #[serde(default)]
    pub exclude_dirs: Vec<String>,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_port() -> u16 {
    DEFAULT_FTP_PORT
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

impl Endpoint {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

// Keep credentials out of logs and panic messages
impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl Config {
    /// Read, parse and validate the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let config = if is_toml {
            Self::from_toml_str(&contents).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Self::from_json_str(&contents).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for (idx, p) in self.projects.iter().enumerate() {
            if p.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("project #{} has an empty name", idx + 1)));
            }
            if !seen.insert(p.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate project name '{}'", p.name)));
            }
            if p.local_path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!("project '{}': localPath is empty", p.name)));
            }
            if p.remote_path.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("project '{}': remotePath is empty", p.name)));
            }
            if p.endpoint.host.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("project '{}': ftpConfig.host is empty", p.name)));
            }
            if p.endpoint.connect_timeout_secs == 0 {
                return Err(ConfigError::Invalid(format!(
                    "project '{}': ftpConfig.connectTimeoutSecs must be > 0",
                    p.name
                )));
            }
        }
        Ok(())
    }

    /// Restrict the project list to `names`, keeping configuration order.
    /// An empty selection keeps every project.
    pub fn select(self, names: &[String]) -> Result<Vec<ProjectSpec>, ConfigError> {
        if names.is_empty() {
            return Ok(self.projects);
        }
        if let Some(missing) = names
            .iter()
            .find(|n| !self.projects.iter().any(|p| &p.name == *n))
        {
            return Err(ConfigError::UnknownProject(missing.clone()));
        }
        Ok(self
            .projects
            .into_iter()
            .filter(|p| names.contains(&p.name))
            .collect())
    }
}
