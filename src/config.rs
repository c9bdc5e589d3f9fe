//! Configuration Management
//!
//! Handles persistent provider settings and resolves the effective server
//! and token (CLI flag > environment > config file).

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable holding the Drone server URL
pub const SERVER_ENV: &str = "DRONE_SERVER";
/// Environment variable holding the Drone API token
pub const TOKEN_ENV: &str = "DRONE_TOKEN";

/// Persisted user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Drone server URL
    #[serde(default)]
    pub server: Option<String>,
    /// Drone API token
    #[serde(default)]
    pub token: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("drone-provider").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        let mut file = open_private(path).with_context(|| format!("Failed to open {:?}", path))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Resolve the provider settings. `server`/`token` come from the CLI,
    /// which already falls back to the environment.
    pub fn resolve(&self, server: Option<&str>, token: Option<&str>) -> Result<ProviderConfig> {
        let Some(server) = server.or(self.server.as_deref()) else {
            bail!("No Drone server configured. Set {} or use --server", SERVER_ENV);
        };
        let Some(token) = token.or(self.token.as_deref()) else {
            bail!("No Drone token configured. Set {} or use --token", TOKEN_ENV);
        };

        ProviderConfig::new(server, token)
    }
}

/// Open a file readable by its owner only; it holds the API token
#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

/// Validated settings used to build a [`crate::drone::DroneClient`]
#[derive(Clone, PartialEq)]
pub struct ProviderConfig {
    pub server: Url,
    pub token: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("server", &self.server.as_str())
            .field("token", &"<sensitive>")
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(server: &str, token: &str) -> Result<Self> {
        let server = Url::parse(server).with_context(|| format!("Invalid server URL {:?}", server))?;
        if !matches!(server.scheme(), "http" | "https") {
            bail!("Server URL must use http or https, got {:?}", server.scheme());
        }
        if token.trim().is_empty() {
            bail!("Drone token must not be empty");
        }

        Ok(Self {
            server,
            token: token.to_string(),
        })
    }
}
