use tracing::debug;

use crate::types::split_hex_prefix;

/// Trailer lengths at or above this are assumed not to be real metadata.
const MAX_METADATA_LENGTH: usize = 100;

/// Hex characters taken by the big-endian u16 length field at the very end.
const LENGTH_FIELD_CHARS: usize = 4;

/// Removes the trailing CBOR metadata blob from a runtime bytecode.
///
/// The last two bytes of solc output encode the length of the CBOR blob in
/// front of them. The blob and the length field are dropped when the length
/// looks plausible, otherwise the input is returned unchanged. A `0x` prefix
/// is kept if present.
pub fn strip_metadata(bytecode: &str) -> String {
    let (prefix, body) = split_hex_prefix(bytecode);
    if body.len() < LENGTH_FIELD_CHARS {
        return bytecode.to_string();
    }

    let length_field = match body.get(body.len() - LENGTH_FIELD_CHARS..) {
        Some(field) => field,
        None => return bytecode.to_string(),
    };
    let metadata_length = match u16::from_str_radix(length_field, 16) {
        Ok(len) => len as usize,
        Err(_) => return bytecode.to_string(),
    };

    if metadata_length > 0 && metadata_length < MAX_METADATA_LENGTH {
        let trailer = metadata_length * 2 + LENGTH_FIELD_CHARS;
        if body.len() > trailer {
            if let Some(code) = body.get(..body.len() - trailer) {
                debug!(
                    "Stripping {} bytes of metadata ({} bytes remain)",
                    metadata_length,
                    code.len() / 2
                );
                return format!("{}{}", prefix, code);
            }
        }
    }
    bytecode.to_string()
}
