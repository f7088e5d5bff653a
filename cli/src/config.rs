//! Persisted CLI configuration (`~/.wren/config.toml`)

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use wren_shared::api::{ApiClientConfig, DEFAULT_TIMEOUT};

const CONFIG_DIR: &str = ".wren";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot determine home directory")]
    NoHomeDir,
    #[error("reading config {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("parsing config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("serializing config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("writing config {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("unknown config key {0:?} (valid keys: endpoint, api-key, project-id)")]
    UnknownKey(String),
    #[error("{0} not configured; run: wren login")]
    NotAuthenticated(&'static str),
    #[error("invalid project ID {0:?} in config; run: wren project use <id>")]
    InvalidProjectId(String),
}

/// Keys accepted by `wren config get/set`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Endpoint,
    ApiKey,
    ProjectId,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 3] = [ConfigKey::Endpoint, ConfigKey::ApiKey, ConfigKey::ProjectId];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::Endpoint => "endpoint",
            ConfigKey::ApiKey => "api-key",
            ConfigKey::ProjectId => "project-id",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "endpoint" => Ok(ConfigKey::Endpoint),
            "api-key" | "api_key" => Ok(ConfigKey::ApiKey),
            "project-id" | "project_id" => Ok(ConfigKey::ProjectId),
            other => Err(ConfigError::UnknownKey(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

/// Configuration as shown to the user, credential masked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigDisplay {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
}

impl Config {
    fn slot(&mut self, key: ConfigKey) -> &mut Option<String> {
        match key {
            ConfigKey::Endpoint => &mut self.endpoint,
            ConfigKey::ApiKey => &mut self.api_key,
            ConfigKey::ProjectId => &mut self.project_id,
        }
    }

    /// Raw value for `key`, empty when unset
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key.parse::<ConfigKey>()? {
            ConfigKey::Endpoint => &self.endpoint,
            ConfigKey::ApiKey => &self.api_key,
            ConfigKey::ProjectId => &self.project_id,
        };
        Ok(value.clone().unwrap_or_default())
    }

    /// Set `key`; an empty value clears it
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let key = key.parse::<ConfigKey>()?;
        *self.slot(key) = (!value.is_empty()).then(|| value.to_string());
        Ok(())
    }

    pub fn display(&self) -> ConfigDisplay {
        ConfigDisplay {
            endpoint: self.endpoint.clone().unwrap_or_default(),
            api_key: mask_secret(self.api_key.as_deref().unwrap_or_default()),
            project_id: self.project_id.clone().unwrap_or_default(),
        }
    }

    /// Active project as a number, if one is selected
    pub fn project(&self) -> Result<Option<i64>, ConfigError> {
        match self.project_id.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidProjectId(raw.to_string())),
        }
    }

    /// Client settings for authenticated calls
    pub fn client_config(&self) -> Result<ApiClientConfig, ConfigError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or(ConfigError::NotAuthenticated("endpoint"))?;
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::NotAuthenticated("API key"))?;

        Ok(ApiClientConfig::new(endpoint, api_key)
            .with_project(self.project_id.clone().unwrap_or_default())
            .with_timeout(DEFAULT_TIMEOUT))
    }
}

/// Mask a credential for display
///
/// Long credentials keep their first 12 and last 4 characters; shorter
/// ones are hidden entirely.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    match chars.len() {
        0 => String::new(),
        n if n > 16 => {
            let head: String = chars[..12].iter().collect();
            let tail: String = chars[n - 4..].iter().collect();
            format!("{}...{}", head, tail)
        }
        _ => "****".to_string(),
    }
}

/// Location of the config file plus load/save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.wren/config.toml`
    pub fn default_location() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(Self::at(home.join(CONFIG_DIR).join(CONFIG_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration; a missing file is an empty configuration
    pub fn load(&self) -> Result<Config, ConfigError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("no config at {}, using defaults", self.path.display());
                return Ok(Config::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!("loaded config from {}", self.path.display());
        Ok(config)
    }

    /// Write through a temp file and rename so readers never see a partial file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            create_private_dir(parent).map_err(write_err)?;
        }

        let temp_path = self.path.with_extension("toml.tmp");
        write_private_file(&temp_path, contents.as_bytes()).map_err(write_err)?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(write_err(e));
        }

        tracing::debug!("saved config to {}", self.path.display());
        Ok(())
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}
