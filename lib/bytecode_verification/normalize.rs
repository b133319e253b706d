use tracing::debug;

use crate::bytecode_verification::immutables::{
    UNISWAP_V2_FACTORY, UNISWAP_V4_POOL_MANAGER, UNISWAP_V4_POSITION_MANAGER,
};

/// Reference-side addresses of features the deployed system never enables.
/// Its constructors hardcode the zero address for them instead.
fn reference_addresses_to_zero(contract_name: &str) -> &'static [&'static str] {
    match contract_name {
        "SwapRouter02" => &[UNISWAP_V2_FACTORY],
        "UniversalRouter" => &[
            UNISWAP_V4_POOL_MANAGER,
            UNISWAP_V4_POSITION_MANAGER,
            UNISWAP_V2_FACTORY,
        ],
        _ => &[],
    }
}

/// Zeroes the reference bytecode's addresses for features that are absent on
/// the deployed side. Must run before masking.
///
/// Contracts without such features are returned unchanged.
pub fn normalize_addresses(bytecode: &str, contract_name: &str) -> String {
    let addresses = reference_addresses_to_zero(contract_name);
    if addresses.is_empty() {
        return bytecode.to_string();
    }

    let mut normalized = bytecode.to_ascii_lowercase();
    for address in addresses {
        let address = address.to_ascii_lowercase();
        let occurrences = normalized.matches(&address).count();
        debug!(
            "Zeroing {} occurrence(s) of {} in {}",
            occurrences, address, contract_name
        );
        normalized = normalized.replace(&address, &"0".repeat(address.len()));
    }
    normalized
}
