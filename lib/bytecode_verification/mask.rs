/// Placeholder written over masked characters. It never occurs in lower-case
/// hex, so a byte containing it can't collide with a real byte value.
pub const MASK_CHAR: char = 'x';

const _: () = assert!(!MASK_CHAR.is_ascii_hexdigit());

/// Replaces every occurrence of each value with a run of [`MASK_CHAR`] of the
/// same length.
///
/// The bytecode is lower-cased first and values are matched case-insensitively
/// as plain substrings, not aligned to byte boundaries. Values are applied in
/// the given order. The result always has the length of the input.
///
/// # Panics
///
/// Panics on an empty value. Masking the empty string is meaningless and
/// callers are expected to filter absent values out beforehand.
pub fn mask_values<S: AsRef<str>>(bytecode: &str, values: &[S]) -> String {
    let mut masked = bytecode.to_ascii_lowercase();
    for value in values {
        let value = value.as_ref().to_ascii_lowercase();
        assert!(!value.is_empty(), "cannot mask an empty value");
        let placeholder = MASK_CHAR.to_string().repeat(value.len());
        masked = masked.replace(&value, &placeholder);
    }
    masked
}

/// Whether a chunk of bytecode contains a masked character.
pub fn is_masked(chunk: &str) -> bool {
    chunk.contains(MASK_CHAR)
}
