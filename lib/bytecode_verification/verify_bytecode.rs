use tracing::debug;

use crate::bytecode_verification::compare_bytecodes::{compare, CompareBytecode};
use crate::bytecode_verification::immutables::ImmutableRegistry;
use crate::bytecode_verification::mask::mask_values;
use crate::bytecode_verification::metadata::strip_metadata;
use crate::bytecode_verification::normalize::normalize_addresses;
use crate::types::strip_hex_prefix;

/// Both sides of a contract after normalization, ready for [`compare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPair {
    pub deployed: String,
    pub reference: String,
}

/// Strips metadata and masks immutables on both sides. The reference side
/// has absent-feature addresses zeroed first.
pub fn normalize_pair(
    contract_name: &str,
    deployed_code: &str,
    reference_code: &str,
    deployed_immutables: &ImmutableRegistry,
    reference_immutables: &ImmutableRegistry,
) -> NormalizedPair {
    let reference_code = normalize_addresses(reference_code, contract_name);

    let deployed = format!("0x{}", strip_hex_prefix(&strip_metadata(deployed_code)));
    let reference = format!("0x{}", strip_hex_prefix(&strip_metadata(&reference_code)));
    debug!(
        "{}: {} / {} bytes after stripping metadata",
        contract_name,
        strip_hex_prefix(&deployed).len() / 2,
        strip_hex_prefix(&reference).len() / 2
    );

    NormalizedPair {
        deployed: mask_values(&deployed, deployed_immutables.get(contract_name)),
        reference: mask_values(&reference, reference_immutables.get(contract_name)),
    }
}

/// Runs the full pipeline for one contract and compares the result.
pub fn compare_contract(
    contract_name: &str,
    deployed_code: &str,
    reference_code: &str,
    deployed_immutables: &ImmutableRegistry,
    reference_immutables: &ImmutableRegistry,
) -> CompareBytecode {
    let pair = normalize_pair(
        contract_name,
        deployed_code,
        reference_code,
        deployed_immutables,
        reference_immutables,
    );
    compare(&pair.deployed, &pair.reference)
}
