use std::collections::BTreeMap;

use tracing::debug;

use crate::types::to_raw_hex;

/// Pool init code hash of the deployed fork, used when the address file
/// doesn't carry one.
pub const DEFAULT_POOL_INIT_CODE_HASH: &str =
    "851d77a45b8b9a205fb9f44cb829cceba85282714d2603d601840640628a3da7";
/// Pool init code hash of canonical Uniswap V3.
pub const REFERENCE_POOL_INIT_CODE_HASH: &str =
    "e34f199b19b2b4f47f68442619d555527d244f78a3297ea89325f843f87b8b54";
/// Uniswap V2 pair init code hash, baked into the reference UniversalRouter.
pub const REFERENCE_PAIR_INIT_CODE_HASH: &str =
    "96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f";
/// The deployed UniversalRouter is built without V2 support.
pub const ZERO_PAIR_INIT_CODE_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// WETH predeploy on OP-stack chains.
pub const DEFAULT_WETH9: &str = "4200000000000000000000000000000000000006";
/// Permit2 lives at the same address on every chain.
pub const DEFAULT_PERMIT2: &str = "000000000022d473030f116ddee9f6b43ac78ba3";

/// Canonical Uniswap V3 deployment on Ethereum mainnet, in reporting order.
pub const REFERENCE_CONTRACTS: &[(&str, &str)] = &[
    ("UniswapV3Factory", "0x1F98431c8aD98523631AE4a59f267346ea31F984"),
    ("Multicall2", "0x5BA1e12693Dc8F9c48aAD8770482f4739bEeD696"),
    ("ProxyAdmin", "0xB753548F6E010e7e680BA186F9Ca1BdAB2E90cf2"),
    ("TickLens", "0xbfd8137f7d1516D3ea5cA83523914859ec47F573"),
    (
        "NonfungibleTokenPositionDescriptor",
        "0x91ae842A5Ffd8d12023116943e72A606179294f3",
    ),
    (
        "NonfungiblePositionManager",
        "0xC36442b4a4522E871399CD717aBDD847Ab11FE88",
    ),
    ("V3Migrator", "0xA5644E29708357803b5A882D272c41cC0dF92B34"),
    ("UniswapV3Staker", "0xe34139463bA50bD61336E0c446Bd8C0867c6fE65"),
    ("QuoterV2", "0x61fFE014bA17989E743c5F6cB21bF9697530B21e"),
    ("SwapRouter02", "0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45"),
    ("UniversalRouter", "0x66a9893cC07D91D95644AEDD05D03f95e1dBA8Af"),
];

/// Contracts that embed the pool init code hash.
pub const POOL_INIT_CODE_HASH_CONTRACTS: &[&str] = &[
    "NonfungiblePositionManager",
    "UniswapV3Staker",
    "QuoterV2",
    "SwapRouter02",
    "UniversalRouter",
];

const UNISWAP_V3_FACTORY: &str = "1f98431c8ad98523631ae4a59f267346ea31f984";
const UNISWAP_WETH9: &str = "c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
const UNISWAP_TOKEN_DESCRIPTOR: &str = "ee6a57ec80ea46401049e92587e52f5ec1c24785";
const UNISWAP_NFT_DESCRIPTOR_LIBRARY: &str = "42b24a95702b9986e82d421cc3568932790a48ec";
const UNISWAP_POSITION_MANAGER: &str = "c36442b4a4522e871399cd717abdd847ab11fe88";
pub const UNISWAP_V2_FACTORY: &str = "5c69bee701ef814a2b6a3edd4b1652cb9cc5aa6f";
pub const UNISWAP_V4_POOL_MANAGER: &str = "000000000004444c5dc75cb358380d2e3de08a90";
pub const UNISWAP_V4_POSITION_MANAGER: &str = "00000000bd216513d74c8cf14cf4747e6aaa6420";

/// A constructor argument of the deployed system, resolved from its address
/// file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Factory,
    Weth9,
    PositionManager,
    DescriptorProxy,
    DescriptorLibrary,
    Permit2,
    PoolInitCodeHash,
    ZeroPairInitCodeHash,
}

impl Role {
    /// Key of the role in the deployment's address file, if it has one.
    pub fn contract_key(&self) -> Option<&'static str> {
        match self {
            Role::Factory => Some("UniswapV3Factory"),
            Role::Weth9 => Some("WETH9"),
            Role::PositionManager => Some("NonfungiblePositionManager"),
            Role::DescriptorProxy => Some("DescriptorProxy"),
            Role::DescriptorLibrary => Some("NonfungibleTokenDescriptorLibrary"),
            Role::Permit2 => Some("Permit2"),
            Role::PoolInitCodeHash | Role::ZeroPairInitCodeHash => None,
        }
    }

    fn default_value(&self) -> Option<&'static str> {
        match self {
            Role::Weth9 => Some(DEFAULT_WETH9),
            Role::Permit2 => Some(DEFAULT_PERMIT2),
            Role::ZeroPairInitCodeHash => Some(ZERO_PAIR_INIT_CODE_HASH),
            _ => None,
        }
    }
}

/// Roles embedded in each deployed contract, in constructor order.
fn deployed_roles(contract_name: &str) -> &'static [Role] {
    use Role::*;
    match contract_name {
        "UniswapV3Factory" => &[Factory],
        "NonfungiblePositionManager" => &[Factory, Weth9, DescriptorProxy, PoolInitCodeHash],
        "UniswapV3Staker" => &[Factory, PositionManager, PoolInitCodeHash],
        "QuoterV2" => &[Factory, Weth9, PoolInitCodeHash],
        "SwapRouter02" => &[Factory, Weth9, PositionManager, PoolInitCodeHash],
        "NonfungibleTokenPositionDescriptor" => &[Weth9, DescriptorLibrary],
        "V3Migrator" => &[Factory, Weth9, PositionManager, PoolInitCodeHash],
        "UniversalRouter" => &[
            Permit2,
            Weth9,
            Factory,
            PositionManager,
            PoolInitCodeHash,
            ZeroPairInitCodeHash,
        ],
        _ => &[],
    }
}

/// Values the reference deployment embeds into each contract.
fn reference_values(contract_name: &str) -> &'static [&'static str] {
    match contract_name {
        "UniswapV3Factory" => &[UNISWAP_V3_FACTORY],
        "NonfungiblePositionManager" => &[
            UNISWAP_V3_FACTORY,
            UNISWAP_WETH9,
            UNISWAP_TOKEN_DESCRIPTOR,
            REFERENCE_POOL_INIT_CODE_HASH,
        ],
        "UniswapV3Staker" => &[
            UNISWAP_V3_FACTORY,
            UNISWAP_POSITION_MANAGER,
            REFERENCE_POOL_INIT_CODE_HASH,
        ],
        "QuoterV2" => &[
            UNISWAP_V3_FACTORY,
            UNISWAP_WETH9,
            REFERENCE_POOL_INIT_CODE_HASH,
        ],
        "SwapRouter02" => &[
            UNISWAP_V3_FACTORY,
            UNISWAP_WETH9,
            UNISWAP_V2_FACTORY,
            UNISWAP_POSITION_MANAGER,
            REFERENCE_POOL_INIT_CODE_HASH,
        ],
        "NonfungibleTokenPositionDescriptor" => &[UNISWAP_WETH9, UNISWAP_NFT_DESCRIPTOR_LIBRARY],
        "V3Migrator" => &[
            UNISWAP_V3_FACTORY,
            UNISWAP_WETH9,
            UNISWAP_POSITION_MANAGER,
            REFERENCE_POOL_INIT_CODE_HASH,
        ],
        "UniversalRouter" => &[
            DEFAULT_PERMIT2,
            UNISWAP_WETH9,
            UNISWAP_V3_FACTORY,
            UNISWAP_POSITION_MANAGER,
            UNISWAP_V2_FACTORY,
            UNISWAP_V4_POOL_MANAGER,
            UNISWAP_V4_POSITION_MANAGER,
            REFERENCE_POOL_INIT_CODE_HASH,
            REFERENCE_PAIR_INIT_CODE_HASH,
        ],
        _ => &[],
    }
}

/// Differences known and accepted in advance. Informational only.
pub fn expected_difference(contract_name: &str) -> Option<&'static str> {
    match contract_name {
        "UniswapV3Factory" => Some("Minor difference in fee tier encoding (0x02 vs 0x04)"),
        "UniversalRouter" => {
            Some("Different size due to V4 placeholder handling and UnsupportedProtocol pattern")
        }
        _ => None,
    }
}

/// Immutable values per contract name for one of the two systems.
///
/// Every stored value is non-empty lower-case hex without `0x`, ready to be
/// passed to [`mask_values`](crate::bytecode_verification::mask_values).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImmutableRegistry {
    sets: BTreeMap<String, Vec<String>>,
}

impl ImmutableRegistry {
    /// The static table of the canonical Uniswap V3 deployment.
    pub fn reference() -> Self {
        let mut registry = ImmutableRegistry::default();
        for (name, _) in REFERENCE_CONTRACTS {
            registry.insert(name, reference_values(name).iter().map(|v| v.to_string()));
        }
        registry
    }

    /// Builds the table of the deployed system from its resolved addresses.
    ///
    /// `contracts` maps contract names to `0x` addresses as found in the
    /// address file. Roles that aren't configured fall back to a well known
    /// default where one exists and are left out otherwise.
    pub fn from_deployment(contracts: &BTreeMap<String, String>, pool_init_code_hash: &str) -> Self {
        let pool_init_code_hash = to_raw_hex(pool_init_code_hash);
        let resolve = |role: &Role| -> Option<String> {
            if *role == Role::PoolInitCodeHash {
                return Some(pool_init_code_hash.clone());
            }
            role.contract_key()
                .and_then(|key| contracts.get(key))
                .map(|address| to_raw_hex(address))
                .filter(|address| !address.is_empty())
                .or_else(|| role.default_value().map(String::from))
        };

        let mut registry = ImmutableRegistry::default();
        for (name, _) in REFERENCE_CONTRACTS {
            let roles = deployed_roles(name);
            if roles.is_empty() {
                continue;
            }
            registry.insert(name, roles.iter().filter_map(&resolve));
        }
        registry
    }

    fn insert(&mut self, contract_name: &str, values: impl Iterator<Item = String>) {
        let values: Vec<String> = values
            .map(|v| to_raw_hex(&v))
            .filter(|v| !v.is_empty())
            .collect();
        debug!("{} immutables for {}", values.len(), contract_name);
        self.sets.insert(contract_name.to_string(), values);
    }

    /// Values for a contract, empty if the contract embeds none.
    pub fn get(&self, contract_name: &str) -> &[String] {
        self.sets
            .get(contract_name)
            .map(|values| values.as_slice())
            .unwrap_or(&[])
    }

    pub fn contract_names(&self) -> impl Iterator<Item = &String> {
        self.sets.keys()
    }
}
