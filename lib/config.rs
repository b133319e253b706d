use std::collections::BTreeMap;
use std::env;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use clap::ArgMatches;
use dirs_next::home_dir;
use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::ValidationError;

pub const DEFAULT_CONFIG_LOCATION: &str = "~/.bcv_config.json";
const DEFAULT_FALLBACK_CONFIG_LOCATION: &str = "bcv_config.json";

pub const ETHEREUM_CHAIN_ID: u64 = 1;
pub const MEGAETH_TESTNET_CHAIN_ID: u64 = 6343;
pub const MEGAETH_MAINNET_CHAIN_ID: u64 = 4326;

const DEFAULT_ETHEREUM_RPC: &str = "https://eth.llamarpc.com";
const DEFAULT_MEGAETH_TESTNET_RPC: &str = "https://timothy.megaeth.com/rpc";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BcvConfig {
    #[serde(default = "default_rpc_urls")]
    pub rpc_urls: BTreeMap<u64, String>, // chain_id to URL
    #[serde(default)]
    pub etherscan_api_key: Option<String>,
    #[serde(default = "default_web3_timeout")]
    pub web3_timeout: u64,
    /// Directory holding the source repos whose build artifacts carry ABIs.
    #[serde(default)]
    pub artifacts_root: Option<PathBuf>,
}

fn default_rpc_urls() -> BTreeMap<u64, String> {
    BTreeMap::from([
        (ETHEREUM_CHAIN_ID, DEFAULT_ETHEREUM_RPC.to_string()),
        (
            MEGAETH_TESTNET_CHAIN_ID,
            DEFAULT_MEGAETH_TESTNET_RPC.to_string(),
        ),
    ])
}

fn default_web3_timeout() -> u64 {
    60
}

impl Default for BcvConfig {
    fn default() -> Self {
        BcvConfig {
            rpc_urls: default_rpc_urls(),
            etherscan_api_key: None,
            web3_timeout: default_web3_timeout(),
            artifacts_root: None,
        }
    }
}

impl BcvConfig {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, ValidationError> {
        match matches.get_one::<String>("config") {
            Some(config_path_str) => {
                if config_path_str == "env" {
                    Self::from_env()
                } else {
                    Self::from_path(&replace_tilde(config_path_str)?)
                }
            }
            None => Self::from_default_path(),
        }
    }

    /// Built-in defaults overridden by whatever the environment (or a `.env`
    /// file) provides.
    pub fn from_env() -> Result<Self, ValidationError> {
        dotenv().ok();
        let mut config = BcvConfig::default();
        for (var, chain_id) in [
            ("ETHEREUM_RPC", ETHEREUM_CHAIN_ID),
            ("MEGAETH_TESTNET_RPC", MEGAETH_TESTNET_CHAIN_ID),
            ("MEGAETH_MAINNET_RPC", MEGAETH_MAINNET_CHAIN_ID),
        ] {
            if let Ok(url) = env::var(var) {
                debug!("RPC for chain {} taken from {}", chain_id, var);
                config.rpc_urls.insert(chain_id, url);
            }
        }
        config.etherscan_api_key = env::var("ETHERSCAN_API_KEY").ok();
        if let Ok(timeout) = env::var("WEB3_TIMEOUT") {
            config.web3_timeout = timeout.parse()?;
        }
        if let Ok(root) = env::var("ARTIFACTS_ROOT") {
            config.artifacts_root = Some(PathBuf::from(root));
        }
        Ok(config)
    }

    pub fn test_config_file() -> Result<NamedTempFile, ValidationError> {
        let config_file = NamedTempFile::new()?;
        BcvConfig::default().write_to_file(config_file.path())?;
        Ok(config_file)
    }

    pub fn from_path(config_path: &Path) -> Result<Self, ValidationError> {
        if !config_path.exists() {
            return Err(ValidationError::Invalid(
                "Config File not found. See --help for more info.".to_string(),
            ));
        }
        let mut file = File::open(config_path)?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;

        let mut config: BcvConfig = serde_json::from_str(&content)?;
        if config.etherscan_api_key.is_none() {
            config.etherscan_api_key = env::var("ETHERSCAN_API_KEY").ok();
        }
        if let Some(root) = &config.artifacts_root {
            config.artifacts_root = Some(replace_tilde_from_path(root)?);
        }
        debug!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    pub fn default_path() -> PathBuf {
        match replace_tilde(DEFAULT_CONFIG_LOCATION) {
            Ok(p) => p,
            Err(_) => PathBuf::from(DEFAULT_FALLBACK_CONFIG_LOCATION),
        }
    }

    /// The home directory config, then `bcv_config.json` in the working
    /// directory, then the environment.
    pub fn from_default_path() -> Result<Self, ValidationError> {
        let default_path = Self::default_path();
        if default_path.exists() {
            return Self::from_path(&default_path);
        }
        let fallback = PathBuf::from(DEFAULT_FALLBACK_CONFIG_LOCATION);
        if fallback.exists() {
            return Self::from_path(&fallback);
        }
        Self::from_env()
    }

    pub fn get_rpc_url_for(&self, chain_id: u64) -> Result<String, ValidationError> {
        match self.rpc_urls.get(&chain_id) {
            None => Err(ValidationError::Invalid(format!(
                "No rpc url found in config for chain id {}.",
                chain_id
            ))),
            Some(rpc_url) => Ok(rpc_url.clone()),
        }
    }

    pub fn write_to_file(&self, path: &Path) -> Result<(), ValidationError> {
        let output = serde_json::to_string_pretty(&self)?;

        let mut file = File::create(path)?;
        file.write_all(output.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }
}

fn replace_tilde_from_path(path: &Path) -> Result<PathBuf, ValidationError> {
    match path.to_str() {
        Some(path_str) => replace_tilde(path_str),
        None => Ok(path.to_path_buf()),
    }
}

/// Expands a leading `~` to the home directory.
pub fn replace_tilde(path_str: &str) -> Result<PathBuf, ValidationError> {
    let rest = match path_str.strip_prefix('~') {
        Some(rest) => rest.trim_start_matches('/'),
        None => return Ok(PathBuf::from(path_str)),
    };
    let home = home_dir()
        .ok_or_else(|| ValidationError::from("Home directory used in path, but not found"))?;
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}
