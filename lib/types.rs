use std::fmt;

/// Which of the two compared systems a bytecode belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Deployed,
    Reference,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Deployed => write!(f, "deployed"),
            Side::Reference => write!(f, "reference"),
        }
    }
}

/// Splits a hex string into its `0x` / `0X` prefix (possibly empty) and its
/// body.
pub fn split_hex_prefix(hex: &str) -> (&str, &str) {
    if hex.starts_with("0x") || hex.starts_with("0X") {
        hex.split_at(2)
    } else {
        ("", hex)
    }
}

pub fn strip_hex_prefix(hex: &str) -> &str {
    split_hex_prefix(hex).1
}

/// Lower-cased hex without `0x`, the form every immutable value is stored in.
pub fn to_raw_hex(value: &str) -> String {
    strip_hex_prefix(value.trim()).to_ascii_lowercase()
}

/// `eth_getCode` returns `0x` for accounts without code.
pub fn is_empty_code(code: &str) -> bool {
    strip_hex_prefix(code).is_empty()
}

/// Number of bytes encoded by a (possibly `0x`-prefixed) hex string.
pub fn byte_len(code: &str) -> usize {
    strip_hex_prefix(code).len() / 2
}
