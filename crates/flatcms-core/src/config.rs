//! Application configuration management.
//!
//! Configuration is read from `~/.config/flatcms/config.json` (or the
//! platform equivalent) and may be overridden by environment variables:
//!
//! - `FLATCMS_DATA_DIR`: directory holding the documents
//! - `FLATCMS_CREDENTIALS`: path of the credential store file
//! - `FLATCMS_BIND`: socket address the server listens on

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "flatcms";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Credential store file name inside the data root
const CREDENTIALS_FILE: &str = "users.json";

/// Documents directory name inside the data root
const DOCUMENTS_DIR: &str = "data";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:4567";

/// Sessions idle for longer than this are discarded.
const DEFAULT_SESSION_IDLE_MINUTES: i64 = 60;

pub const ENV_DATA_DIR: &str = "FLATCMS_DATA_DIR";
pub const ENV_CREDENTIALS: &str = "FLATCMS_CREDENTIALS";
pub const ENV_BIND: &str = "FLATCMS_BIND";

/// Argon2 cost parameters used when hashing new passwords.
///
/// Existing hashes carry their own parameters, so raising the cost only
/// affects accounts created afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl HashCost {
    /// The cheapest parameters Argon2 accepts. Only meant for tests.
    pub fn minimal() -> Self {
        Self {
            memory_kib: argon2::Params::MIN_M_COST,
            iterations: argon2::Params::MIN_T_COST,
            parallelism: argon2::Params::MIN_P_COST,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub credentials_path: Option<PathBuf>,
    pub bind_addr: Option<String>,
    pub session_idle_minutes: i64,
    pub hash_cost: HashCost,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            credentials_path: None,
            bind_addr: None,
            session_idle_minutes: DEFAULT_SESSION_IDLE_MINUTES,
            hash_cost: HashCost::default(),
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Apply overrides from a variable lookup (normally the process environment).
    /// Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(path) = get(ENV_CREDENTIALS) {
            self.credentials_path = Some(PathBuf::from(path));
        }
        if let Some(addr) = get(ENV_BIND) {
            self.bind_addr = Some(addr);
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    fn data_root() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Directory holding the documents.
    pub fn documents_dir(&self) -> Result<PathBuf> {
        match self.data_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => Ok(Self::data_root()?.join(DOCUMENTS_DIR)),
        }
    }

    /// Path of the credential store file.
    pub fn credentials_file(&self) -> Result<PathBuf> {
        match self.credentials_path {
            Some(ref path) => Ok(path.clone()),
            None => Ok(Self::data_root()?.join(CREDENTIALS_FILE)),
        }
    }

    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }
}
