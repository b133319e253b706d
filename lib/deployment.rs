use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;
use ethers_core::types::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bytecode_verification::immutables::DEFAULT_POOL_INIT_CODE_HASH;
use crate::config::{BcvConfig, MEGAETH_MAINNET_CHAIN_ID, MEGAETH_TESTNET_CHAIN_ID};
use crate::errors::ValidationError;
use crate::types::to_raw_hex;
use crate::utils::read_write_file::read_file;

/// Placeholder used in address files for contracts that aren't deployed yet.
pub const NOT_DEPLOYED: &str = "TBA";

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum Network {
    Testnet,
    Mainnet,
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Testnet => write!(f, "testnet"),
            Network::Mainnet => write!(f, "mainnet"),
        }
    }
}

impl Network {
    pub fn addresses_file(&self) -> &'static str {
        match self {
            Network::Testnet => "addresses.json",
            Network::Mainnet => "mainnetAddresses.json",
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Testnet => MEGAETH_TESTNET_CHAIN_ID,
            Network::Mainnet => MEGAETH_MAINNET_CHAIN_ID,
        }
    }
}

/// Contents of an `addresses.json` file as published with the deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentAddresses {
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub chain_name: Option<String>,
    #[serde(default)]
    pub rpc: Option<String>,
    #[serde(default)]
    pub block_explorer: Option<String>,
    pub contracts: BTreeMap<String, String>,
    #[serde(default)]
    pub pool_init_code_hash: Option<String>,
}

impl DeploymentAddresses {
    pub fn from_path(path: &Path) -> Result<Self, ValidationError> {
        if !path.exists() {
            return Err(ValidationError::Invalid(format!(
                "Address file {} not found.",
                path.display()
            )));
        }
        let content = read_file(path)?;
        let addresses: DeploymentAddresses = serde_json::from_str(&content)?;
        debug!(
            "Loaded {} contract entries from {}",
            addresses.contracts.len(),
            path.display()
        );
        Ok(addresses)
    }

    pub fn load(dir: &Path, network: Network) -> Result<Self, ValidationError> {
        Self::from_path(&dir.join(network.addresses_file()))
    }

    /// Address of a deployed contract, `None` if missing or not yet deployed.
    pub fn deployed_address(&self, contract_name: &str) -> Option<&str> {
        self.contracts
            .get(contract_name)
            .map(|a| a.trim())
            .filter(|a| !a.is_empty() && *a != NOT_DEPLOYED)
    }
}

/// A deployment with everything needed to compare it resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    pub network: Network,
    pub chain_id: u64,
    pub rpc_url: String,
    pub addresses: DeploymentAddresses,
    /// Lower-case hex without `0x`.
    pub pool_init_code_hash: String,
}

impl Deployment {
    /// The address file's own RPC URL takes precedence over the config.
    pub fn resolve(
        config: &BcvConfig,
        network: Network,
        addresses: DeploymentAddresses,
    ) -> Result<Self, ValidationError> {
        let chain_id = addresses.chain_id.unwrap_or_else(|| network.chain_id());
        if chain_id != network.chain_id() {
            warn!(
                "Address file declares chain id {}, expected {} for {}",
                chain_id,
                network.chain_id(),
                network
            );
        }

        let rpc_url = match addresses.rpc.as_deref().filter(|r| !r.is_empty()) {
            Some(rpc) => rpc.to_string(),
            None => config.get_rpc_url_for(chain_id).map_err(|_| {
                ValidationError::Invalid(format!("No RPC endpoint configured for {}", network))
            })?,
        };

        let pool_init_code_hash = match addresses.pool_init_code_hash.as_deref() {
            Some(hash) if !to_raw_hex(hash).is_empty() => to_raw_hex(hash),
            _ => DEFAULT_POOL_INIT_CODE_HASH.to_string(),
        };
        hex::decode(&pool_init_code_hash)?;

        for (name, address) in &addresses.contracts {
            if address != NOT_DEPLOYED && Address::from_str(address).is_err() {
                warn!("{} has a malformed address: {}", name, address);
            }
        }

        Ok(Deployment {
            network,
            chain_id,
            rpc_url,
            addresses,
            pool_init_code_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const ADDRESSES: &str = r#"{
        "chainId": 6343,
        "chainName": "MegaETH Testnet",
        "rpc": "https://rpc.example",
        "blockExplorer": "https://explorer.example",
        "contracts": {
            "UniswapV3Factory": "0x1111111111111111111111111111111111111111",
            "UniversalRouter": "TBA",
            "WETH9": "0x4200000000000000000000000000000000000006"
        },
        "poolInitCodeHash": "0xABCDEF"
    }"#;

    #[test]
    fn test_load_addresses() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("addresses.json"), ADDRESSES).unwrap();
        let addresses = DeploymentAddresses::load(dir.path(), Network::Testnet).unwrap();
        assert_eq!(addresses.chain_id, Some(6343));
        assert_eq!(
            addresses.deployed_address("UniswapV3Factory"),
            Some("0x1111111111111111111111111111111111111111")
        );
        assert_eq!(addresses.deployed_address("UniversalRouter"), None);
        assert_eq!(addresses.deployed_address("QuoterV2"), None);

        assert!(DeploymentAddresses::load(dir.path(), Network::Mainnet).is_err());
    }

    #[test]
    fn test_resolve_prefers_file_rpc() {
        let addresses: DeploymentAddresses = serde_json::from_str(ADDRESSES).unwrap();
        let deployment =
            Deployment::resolve(&BcvConfig::default(), Network::Testnet, addresses).unwrap();
        assert_eq!(deployment.rpc_url, "https://rpc.example");
        assert_eq!(deployment.pool_init_code_hash, "abcdef");
    }

    #[test]
    fn test_resolve_defaults() {
        let addresses: DeploymentAddresses =
            serde_json::from_str(r#"{"contracts": {}}"#).unwrap();
        let deployment =
            Deployment::resolve(&BcvConfig::default(), Network::Testnet, addresses.clone())
                .unwrap();
        assert_eq!(deployment.chain_id, MEGAETH_TESTNET_CHAIN_ID);
        assert_eq!(deployment.rpc_url, "https://timothy.megaeth.com/rpc");
        assert_eq!(deployment.pool_init_code_hash, DEFAULT_POOL_INIT_CODE_HASH);

        // no mainnet endpoint is known yet
        assert!(matches!(
            Deployment::resolve(&BcvConfig::default(), Network::Mainnet, addresses),
            Err(ValidationError::Invalid(_))
        ));
    }

    #[test]
    fn test_resolve_rejects_malformed_hash() {
        let addresses: DeploymentAddresses =
            serde_json::from_str(r#"{"contracts": {}, "poolInitCodeHash": "0xnothex"}"#).unwrap();
        assert!(Deployment::resolve(&BcvConfig::default(), Network::Testnet, addresses).is_err());
    }
}
