//! Shared configuration loading and credential storage for pulsely.
//!
//! Configuration is resolved once at startup from three layers, lowest
//! priority first: built-in defaults, the TOML file at
//! [`config_path()`], and `PULSELY_*` environment variables (nested
//! fields use a double underscore, e.g. `PULSELY_API__BASE_URL`).
//! There is no runtime reload.
//!
//! The refresh token backing silent sign-in never touches the config
//! file; it lives in the OS keyring.

use std::path::PathBuf;

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_PREFIX: &str = "PULSELY_";

const KEYRING_SERVICE: &str = "pulsely";
const KEYRING_REFRESH_TOKEN: &str = "refresh-token";

// ── Errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(Box<figment::Error>),

    #[error("Could not determine a configuration directory for this platform")]
    NoConfigDir,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serializing configuration failed: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Keyring error: {0}")]
    Keyring(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Types ────────────────────────────────────────────────────────────

/// Backend API coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".into(),
        }
    }
}

/// Identity-provider coordinates (tenant domain, application client id,
/// API audience).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub domain: String,
    pub client_id: String,
    pub audience: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            domain: String::new(),
            client_id: String::new(),
            audience: "pulsely-api".into(),
        }
    }
}

/// The full configuration surface, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app_name: String,
    pub api: ApiSettings,
    pub auth: AuthSettings,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Pulsely".into(),
            api: ApiSettings::default(),
            auth: AuthSettings::default(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// True once the identity provider has been configured; commands
    /// that need a sign-in check this before doing anything.
    pub fn has_provider(&self) -> bool {
        !self.auth.domain.is_empty() && !self.auth.client_id.is_empty()
    }
}

// ── Loading / saving ─────────────────────────────────────────────────

/// Platform config file location, e.g.
/// `~/.config/pulsely/config.toml` on Linux.
pub fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "pulsely", "pulsely")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn figment() -> Figment {
    let mut figment = Figment::new();
    if let Some(path) = config_path() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load configuration, falling back to defaults for anything unset.
pub fn load_config_or_default() -> Result<Config, ConfigError> {
    Ok(figment().extract()?)
}

/// Write the configuration file, creating parent directories as needed.
/// Returns the path written.
pub fn save_config(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, toml::to_string_pretty(config)?)?;
    Ok(path)
}

// ── Credential storage ───────────────────────────────────────────────

fn refresh_token_entry() -> Result<keyring::Entry, ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, KEYRING_REFRESH_TOKEN)
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

/// Persist the refresh token in the OS keyring.
pub fn store_refresh_token(token: &SecretString) -> Result<(), ConfigError> {
    refresh_token_entry()?
        .set_password(token.expose_secret())
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

/// Fetch the stored refresh token. A missing entry is `Ok(None)`;
/// only real keyring failures are errors.
pub fn resolve_refresh_token() -> Result<Option<SecretString>, ConfigError> {
    match refresh_token_entry()?.get_password() {
        Ok(token) => Ok(Some(SecretString::from(token))),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(ConfigError::Keyring(e.to_string())),
    }
}

/// Remove the stored refresh token. Idempotent.
pub fn clear_refresh_token() -> Result<(), ConfigError> {
    match refresh_token_entry()?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(ConfigError::Keyring(e.to_string())),
    }
}
