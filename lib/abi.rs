use std::fmt;
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::BcvConfig;
use crate::deployment::DeploymentAddresses;
use crate::errors::ValidationError;
use crate::utils::read_write_file::read_file;

pub const PERMIT2_ADDRESS: &str = "0x000000000022D473030F116dDEE9F6B43aC78BA3";
const ETHERSCAN_V2_API_URL: &str = "https://api.etherscan.io/v2/api";
/// Pause after every remote lookup, explorers rate limit aggressively.
const REMOTE_PAUSE: Duration = Duration::from_millis(300);

/// Proxies and libraries, whose ABIs aren't useful.
pub const SKIP_CONTRACTS: &[&str] = &[
    "WETH9",
    "ProxyAdmin",
    "DescriptorProxy",
    "NonfungibleTokenDescriptorLibrary",
];

/// ABIs wanted even though the address file doesn't list them.
pub const ADDITIONAL_ABIS: &[&str] = &["UniswapV3Pool", "ERC20"];

/// Build artifact of a contract, relative to the artifacts root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactSource {
    pub repo: &'static str,
    pub path: &'static str,
}

pub fn artifact_source(contract_name: &str) -> Option<ArtifactSource> {
    let (repo, path) = match contract_name {
        "UniswapV3Factory" => (
            "v3-core",
            "artifacts/contracts/UniswapV3Factory.sol/UniswapV3Factory.json",
        ),
        "UniswapV3Pool" => (
            "v3-core",
            "artifacts/contracts/UniswapV3Pool.sol/UniswapV3Pool.json",
        ),
        "NonfungiblePositionManager" => (
            "v3-periphery",
            "artifacts/contracts/NonfungiblePositionManager.sol/NonfungiblePositionManager.json",
        ),
        "V3Migrator" => (
            "v3-periphery",
            "artifacts/contracts/V3Migrator.sol/V3Migrator.json",
        ),
        "TickLens" => (
            "v3-periphery",
            "artifacts/contracts/lens/TickLens.sol/TickLens.json",
        ),
        "Multicall2" => (
            "v3-periphery",
            "artifacts/contracts/lens/Multicall2.sol/Multicall2.json",
        ),
        "NonfungibleTokenPositionDescriptor" => (
            "v3-periphery",
            "artifacts/contracts/NonfungibleTokenPositionDescriptor.sol/NonfungibleTokenPositionDescriptor.json",
        ),
        "SwapRouter02" => (
            "swap-router-contracts",
            "artifacts/contracts/SwapRouter02.sol/SwapRouter02.json",
        ),
        "QuoterV2" => (
            "swap-router-contracts",
            "artifacts/contracts/lens/QuoterV2.sol/QuoterV2.json",
        ),
        "UniswapV3Staker" => (
            "v3-staker",
            "artifacts/contracts/UniswapV3Staker.sol/UniswapV3Staker.json",
        ),
        "UniversalRouter" => (
            "universal-router",
            "artifacts/contracts/UniversalRouter.sol/UniversalRouter.json",
        ),
        "ERC20" => (
            "v3-periphery",
            "node_modules/@openzeppelin/contracts/build/contracts/ERC20.json",
        ),
        _ => return None,
    };
    Some(ArtifactSource { repo, path })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiSource {
    Artifact(&'static str),
    Etherscan,
    Explorer,
}

impl fmt::Display for AbiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiSource::Artifact(repo) => write!(f, "{} artifacts", repo),
            AbiSource::Etherscan => write!(f, "Etherscan mainnet (canonical)"),
            AbiSource::Explorer => write!(f, "block explorer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiStatus {
    Fetched(AbiSource),
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiResult {
    pub name: String,
    pub status: AbiStatus,
}

/// Contracts from the address file followed by [`ADDITIONAL_ABIS`], without
/// duplicates.
pub fn contracts_to_process(addresses: &DeploymentAddresses) -> Vec<String> {
    let mut names: Vec<String> = addresses.contracts.keys().cloned().collect();
    for extra in ADDITIONAL_ABIS {
        if !names.iter().any(|n| n == extra) {
            names.push(extra.to_string());
        }
    }
    names
}

/// The `abi` field of a Hardhat / Foundry artifact, `None` if the artifact is
/// missing or unreadable.
pub fn extract_abi_from_artifact(artifact_path: &Path) -> Option<Value> {
    if !artifact_path.exists() {
        return None;
    }
    let content = read_file(artifact_path).ok()?;
    let artifact: Value = serde_json::from_str(&content).ok()?;
    match artifact.get("abi") {
        Some(abi) if !abi.is_null() => Some(abi.clone()),
        _ => None,
    }
}

pub fn explorer_abi_url(explorer_url: &str, address: &str) -> String {
    format!(
        "{}/api/v2/smart-contracts/{}",
        explorer_url.trim_end_matches('/'),
        address
    )
}

#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    status: String,
    #[serde(default)]
    result: Value,
}

/// Looks up ABIs in local artifacts first and remote explorers second.
pub struct AbiFetcher {
    client: Client,
    artifacts_root: PathBuf,
    block_explorer: Option<String>,
    etherscan_api_key: Option<String>,
    pause: Duration,
}

impl AbiFetcher {
    pub fn new(
        config: &BcvConfig,
        artifacts_root: PathBuf,
        block_explorer: Option<String>,
    ) -> Result<Self, ValidationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.web3_timeout))
            .build()?;
        Ok(AbiFetcher {
            client,
            artifacts_root,
            block_explorer,
            etherscan_api_key: config.etherscan_api_key.clone(),
            pause: REMOTE_PAUSE,
        })
    }

    /// Disables the pause between remote lookups.
    pub fn without_pause(mut self) -> Self {
        self.pause = Duration::ZERO;
        self
    }

    pub fn artifact_path(&self, source: &ArtifactSource) -> PathBuf {
        self.artifacts_root.join(source.repo).join(source.path)
    }

    fn fetch_abi_from_explorer(&self, address: &str) -> Result<Option<Value>, ValidationError> {
        let explorer = match &self.block_explorer {
            Some(explorer) if !explorer.is_empty() => explorer,
            _ => return Ok(None),
        };
        let url = explorer_abi_url(explorer, address);
        debug!("Explorer URL: {}", url);
        let response = self.client.get(&url).send()?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let data: Value = response.json()?;
        Ok(data.get("abi").filter(|abi| !abi.is_null()).cloned())
    }

    fn fetch_permit2_abi(&self) -> Result<Option<Value>, ValidationError> {
        let mut url = format!(
            "{}?chainid=1&module=contract&action=getabi&address={}",
            ETHERSCAN_V2_API_URL, PERMIT2_ADDRESS
        );
        if let Some(key) = &self.etherscan_api_key {
            url.push_str(&format!("&apikey={}", key));
        }
        let response = self.client.get(&url).send()?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let res: EtherscanResponse = response.json()?;
        match (res.status.as_str(), res.result.as_str()) {
            ("1", Some(abi)) => Ok(Some(serde_json::from_str(abi)?)),
            (_, Some(message)) => {
                info!("Etherscan: {}", message);
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn remote<F>(&self, lookup: F) -> Option<Value>
    where
        F: FnOnce() -> Result<Option<Value>, ValidationError>,
    {
        let abi = match lookup() {
            Ok(abi) => abi,
            Err(e) => {
                info!("Remote ABI lookup failed: {}", e);
                None
            }
        };
        sleep(self.pause);
        abi
    }

    /// Finds an ABI for one contract. Remote lookups never abort the caller,
    /// their failures just mean no ABI.
    pub fn resolve(&self, contract_name: &str, address: Option<&str>) -> (Option<Value>, AbiStatus) {
        if SKIP_CONTRACTS.iter().any(|s| *s == contract_name) {
            return (None, AbiStatus::Skipped);
        }

        if let Some(source) = artifact_source(contract_name) {
            if let Some(abi) = extract_abi_from_artifact(&self.artifact_path(&source)) {
                return (Some(abi), AbiStatus::Fetched(AbiSource::Artifact(source.repo)));
            }
        }

        if contract_name == "Permit2" {
            if let Some(abi) = self.remote(|| self.fetch_permit2_abi()) {
                return (Some(abi), AbiStatus::Fetched(AbiSource::Etherscan));
            }
        }

        if let Some(address) = address {
            if let Some(abi) = self.remote(|| self.fetch_abi_from_explorer(address)) {
                return (Some(abi), AbiStatus::Fetched(AbiSource::Explorer));
            }
        }

        (None, AbiStatus::Failed)
    }
}
