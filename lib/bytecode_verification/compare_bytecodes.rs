use serde::Serialize;

use crate::bytecode_verification::mask::is_masked;
use crate::types::strip_hex_prefix;

/// Stand-in for a byte that one side doesn't have.
pub const MISSING_BYTE: &str = "--";

/// A byte position at which the two bytecodes disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DifferenceRecord {
    #[serde(rename = "bytePosition")]
    pub position: usize,
    #[serde(rename = "deployedByte")]
    pub deployed: String,
    #[serde(rename = "referenceByte")]
    pub reference: String,
}

/// Outcome of comparing a deployed bytecode against its reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareBytecode {
    pub identical: bool,
    /// Deployed length minus reference length, in bytes.
    pub size_delta_bytes: i64,
    pub differences: Vec<DifferenceRecord>,
}

fn byte_at(code: &[u8], index: usize) -> String {
    match code.get(index..code.len().min(index + 2)) {
        Some(chunk) if !chunk.is_empty() => String::from_utf8_lossy(chunk).into_owned(),
        _ => MISSING_BYTE.to_string(),
    }
}

/// Compares two normalized and masked bytecodes byte by byte.
///
/// Every position is visited, positions where either side is masked are
/// skipped, and positions past the end of the shorter side compare against
/// [`MISSING_BYTE`].
pub fn compare(deployed: &str, reference: &str) -> CompareBytecode {
    let deployed = strip_hex_prefix(deployed).as_bytes();
    let reference = strip_hex_prefix(reference).as_bytes();

    let max_len = deployed.len().max(reference.len());
    let mut differences: Vec<DifferenceRecord> = vec![];
    for i in (0..max_len).step_by(2) {
        let deployed_byte = byte_at(deployed, i);
        let reference_byte = byte_at(reference, i);
        if is_masked(&deployed_byte) || is_masked(&reference_byte) {
            continue;
        }
        if deployed_byte != reference_byte {
            differences.push(DifferenceRecord {
                position: i / 2,
                deployed: deployed_byte,
                reference: reference_byte,
            });
        }
    }

    CompareBytecode {
        identical: differences.is_empty(),
        size_delta_bytes: (deployed.len() as i64 - reference.len() as i64) / 2,
        differences,
    }
}
