use std::fmt;

use crate::types::{strip_hex_prefix, to_raw_hex};

/// Where, if anywhere, a deployed bytecode embeds a pool init code hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashLocation {
    /// The deployment's own hash, at this byte offset.
    Found { byte_position: usize },
    /// The reference system's hash instead of the deployment's.
    ReferenceHashFound,
    Missing,
}

impl fmt::Display for HashLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashLocation::Found { byte_position } => write!(f, "found at byte {}", byte_position),
            HashLocation::ReferenceHashFound => write!(f, "reference hash found instead"),
            HashLocation::Missing => write!(f, "neither hash found"),
        }
    }
}

/// Checks that a deployed bytecode carries `expected` rather than the
/// reference system's hash.
pub fn locate_pool_init_code_hash(bytecode: &str, expected: &str, reference: &str) -> HashLocation {
    let code = strip_hex_prefix(bytecode).to_ascii_lowercase();
    let expected = to_raw_hex(expected);
    let reference = to_raw_hex(reference);

    if !expected.is_empty() {
        if let Some(index) = code.find(&expected) {
            return HashLocation::Found {
                byte_position: index / 2,
            };
        }
    }
    if !reference.is_empty() && code.contains(&reference) {
        return HashLocation::ReferenceHashFound;
    }
    HashLocation::Missing
}
