use std::cmp::Ordering;

use miden_objects::{Felt, StarkField};

/// Modulus of the prime field [`Felt`] elements live in: `2^64 - 2^32 + 1`.
pub const FIELD_MODULUS: u64 = Felt::MODULUS;

/// Size in bytes of an encoded public storage value.
pub const STORAGE_VALUE_BYTES: usize = 32;

// DECODING ERRORS
// ================================================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeltDecodeError {
    #[error("value is empty")]
    Empty,
    #[error("value is {0} bytes long, at most {STORAGE_VALUE_BYTES} are allowed")]
    TooLong(usize),
    #[error("value does not fit into 64 bits")]
    Overflow,
    #[error("value {0} is not a canonical field element")]
    NonCanonical(u64),
}

// FIELD ELEMENT HELPERS
// ================================================================================================

/// Decodes a big-endian encoded field element.
///
/// Leading zero bytes are allowed up to [`STORAGE_VALUE_BYTES`] in total, but at least one byte is
/// required. The decoded integer must be strictly smaller than [`FIELD_MODULUS`], values are never
/// reduced.
pub fn felt_from_be_bytes(bytes: &[u8]) -> Result<Felt, FeltDecodeError> {
    if bytes.is_empty() {
        return Err(FeltDecodeError::Empty);
    }
    if bytes.len() > STORAGE_VALUE_BYTES {
        return Err(FeltDecodeError::TooLong(bytes.len()));
    }

    let (high, low) = bytes.split_at(bytes.len().saturating_sub(8));
    if high.iter().any(|byte| *byte != 0) {
        return Err(FeltDecodeError::Overflow);
    }

    let mut buf = [0u8; 8];
    buf[8 - low.len()..].copy_from_slice(low);
    let value = u64::from_be_bytes(buf);

    if value >= FIELD_MODULUS {
        return Err(FeltDecodeError::NonCanonical(value));
    }
    Ok(Felt::new(value))
}

/// Encodes a field element as a [`STORAGE_VALUE_BYTES`] long big-endian integer.
pub fn felt_to_be_bytes(felt: Felt) -> [u8; STORAGE_VALUE_BYTES] {
    let mut bytes = [0u8; STORAGE_VALUE_BYTES];
    bytes[STORAGE_VALUE_BYTES - 8..].copy_from_slice(&felt.as_int().to_be_bytes());
    bytes
}

/// Returns `start + offset` if it stays below [`FIELD_MODULUS`], i.e. if the addition does not
/// wrap around the field.
pub fn checked_add(start: Felt, offset: u64) -> Option<Felt> {
    start
        .as_int()
        .checked_add(offset)
        .filter(|value| *value < FIELD_MODULUS)
        .map(Felt::new)
}

/// Orders field elements by their canonical integer representation.
pub fn cmp_felts(a: &Felt, b: &Felt) -> Ordering {
    a.as_int().cmp(&b.as_int())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn decoding_accepts_short_and_padded_values() {
        assert_eq!(felt_from_be_bytes(&[0]).unwrap(), Felt::new(0));
        assert_eq!(felt_from_be_bytes(&[0x01, 0x02]).unwrap(), Felt::new(0x0102));
        assert_eq!(felt_from_be_bytes(&felt_to_be_bytes(Felt::new(42))).unwrap(), Felt::new(42));
    }

    #[test]
    fn decoding_rejects_values_outside_the_field() {
        assert_matches!(felt_from_be_bytes(&[]), Err(FeltDecodeError::Empty));
        assert_matches!(felt_from_be_bytes(&[0u8; 33]), Err(FeltDecodeError::TooLong(33)));

        let mut wide = [0u8; 32];
        wide[23] = 1;
        assert_matches!(felt_from_be_bytes(&wide), Err(FeltDecodeError::Overflow));

        assert_matches!(
            felt_from_be_bytes(&FIELD_MODULUS.to_be_bytes()),
            Err(FeltDecodeError::NonCanonical(FIELD_MODULUS))
        );
    }

    #[test]
    fn modulus_matches_the_field() {
        assert_eq!(FIELD_MODULUS, 0xffff_ffff_0000_0001);
    }

    #[test]
    fn slot_arithmetic_does_not_wrap() {
        assert_eq!(checked_add(Felt::new(0x10), 2), Some(Felt::new(0x12)));
        assert_eq!(checked_add(Felt::new(FIELD_MODULUS - 2), 1), Some(Felt::new(FIELD_MODULUS - 1)));
        assert_eq!(checked_add(Felt::new(FIELD_MODULUS - 1), 1), None);
        assert_eq!(checked_add(Felt::new(1), u64::MAX), None);
    }
}
