//! Local configuration for tgcli.
//!
//! Everything lives in one directory (`~/.tgcli` unless overridden):
//! `config.toml` holds machine aliases, the default alias and the tgcloud
//! account; [`TOKEN_FILE`] holds the tgcloud bearer token.

#![forbid(unsafe_code)]

pub mod error;
pub mod token;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use error::ConfigError;
pub use token::{TOKEN_FILE, TokenFile};

/// Name of the config directory under the home directory.
pub const CONFIG_DIR_NAME: &str = ".tgcli";

/// File name of the config inside the config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Placeholder tgcloud user written to a fresh config.
pub const PLACEHOLDER_TGCLOUD_USER: &str = "mail@domain.com";

/// tgcloud account credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TgCloudConfig {
    /// Account email.
    pub user: String,
    /// Account password.
    pub password: String,
}

impl Default for TgCloudConfig {
    fn default() -> Self {
        Self {
            user: PLACEHOLDER_TGCLOUD_USER.to_string(),
            password: String::new(),
        }
    }
}

impl TgCloudConfig {
    /// Whether real credentials have been stored.
    pub fn is_configured(&self) -> bool {
        !self.user.is_empty() && self.user != PLACEHOLDER_TGCLOUD_USER
    }
}

/// Connection details of one TigerGraph server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Host, usually with scheme.
    pub host: String,
    /// User name.
    pub user: String,
    /// Password.
    pub password: String,
    /// GSQL port.
    pub gs_port: String,
    /// REST port.
    pub rest_port: String,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            host: "http://127.0.0.1".to_string(),
            user: "tigergraph".to_string(),
            password: "tigergraph".to_string(),
            gs_port: "14240".to_string(),
            rest_port: "9000".to_string(),
        }
    }
}

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Alias used when none is given; empty when unset.
    pub default: String,
    /// tgcloud account.
    pub tgcloud: TgCloudConfig,
    /// Machines by alias.
    pub machines: BTreeMap<String, MachineConfig>,
}

/// The config directory and its parsed `config.toml`.
///
/// Every mutation is written back to disk before returning.
#[derive(Debug)]
pub struct ConfigStore {
    dir: PathBuf,
    config: Config,
}

impl ConfigStore {
    /// `~/.tgcli`.
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(CONFIG_DIR_NAME))
            .ok_or(ConfigError::NoHomeDir)
    }

    /// Open the store in `dir`, creating the directory and a default config
    /// on first use.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| ConfigError::io(&dir, e))?;

        let path = dir.join(CONFIG_FILE);
        let config: Config = match fs::read_to_string(&path) {
            Ok(raw) => toml::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "creating default config");
                let store = Self {
                    dir,
                    config: Config::default(),
                };
                store.save()?;
                return Ok(store);
            }
            Err(e) => return Err(ConfigError::io(&path, e)),
        };

        debug!(path = %path.display(), machines = config.machines.len(), "loaded config");
        Ok(Self { dir, config })
    }

    /// Config directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of `config.toml`.
    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// The bearer token file next to the config.
    pub fn token_file(&self) -> TokenFile {
        TokenFile::new(self.dir.join(TOKEN_FILE))
    }

    /// Machines sorted by alias.
    pub fn machines(&self) -> &BTreeMap<String, MachineConfig> {
        &self.config.machines
    }

    /// Machine stored under `alias`.
    pub fn machine(&self, alias: &str) -> Option<&MachineConfig> {
        self.config.machines.get(alias)
    }

    /// Default alias, if one is set.
    pub fn default_alias(&self) -> Option<&str> {
        let alias = self.config.default.as_str();
        (!alias.is_empty()).then_some(alias)
    }

    /// Store a new machine, optionally making it the default.
    pub fn add_machine(
        &mut self,
        alias: &str,
        machine: MachineConfig,
        make_default: bool,
    ) -> Result<(), ConfigError> {
        let alias = alias.trim();
        if alias.is_empty() {
            return Err(ConfigError::EmptyAlias);
        }
        if self.config.machines.contains_key(alias) {
            return Err(ConfigError::DuplicateAlias(alias.to_string()));
        }

        self.config.machines.insert(alias.to_string(), machine);
        if make_default {
            self.config.default = alias.to_string();
        }
        self.save()
    }

    /// Remove a machine. Returns whether it was the default, in which case
    /// the default is cleared.
    pub fn delete_machine(&mut self, alias: &str) -> Result<bool, ConfigError> {
        if self.config.machines.remove(alias).is_none() {
            return Err(ConfigError::UnknownAlias(alias.to_string()));
        }
        let was_default = self.config.default == alias;
        if was_default {
            self.config.default.clear();
        }
        self.save()?;
        Ok(was_default)
    }

    /// tgcloud account.
    pub fn tgcloud(&self) -> &TgCloudConfig {
        &self.config.tgcloud
    }

    /// Replace the tgcloud account.
    pub fn set_tgcloud(&mut self, user: &str, password: &str) -> Result<(), ConfigError> {
        self.config.tgcloud = TgCloudConfig {
            user: user.to_string(),
            password: password.to_string(),
        };
        self.save()
    }

    fn save(&self) -> Result<(), ConfigError> {
        let path = self.path();
        let raw = toml::to_string_pretty(&self.config)?;
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, raw).map_err(|e| ConfigError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| ConfigError::io(&path, e))?;
        debug!(path = %path.display(), "saved config");
        Ok(())
    }
}
