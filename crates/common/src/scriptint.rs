//! Script integers and script booleans.
//!
//! A script integer is a variable-length little-endian sign-magnitude byte
//! string: the top bit of the last byte is the sign, the empty string is
//! zero. An extra byte is appended when the magnitude's top bit would
//! otherwise be read as the sign.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;

/// Encode an integer as a minimal script integer.
pub fn encode(n: &BigInt) -> Vec<u8> {
    if n.is_zero() {
        return Vec::new();
    }

    let negative = n.sign() == Sign::Minus;
    let mut bytes = n.magnitude().to_bytes_le();

    // to_bytes_le never returns an empty vec for a non-zero magnitude.
    let last = bytes.len() - 1;
    if bytes[last] & 0x80 != 0 {
        bytes.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        bytes[last] |= 0x80;
    }

    bytes
}

/// Decode a script integer of any length.
pub fn decode(bytes: &[u8]) -> BigInt {
    let Some((&last, _)) = bytes.split_last() else {
        return BigInt::zero();
    };

    let mut magnitude = bytes.to_vec();
    let idx = magnitude.len() - 1;
    magnitude[idx] = last & 0x7f;

    let sign = if last & 0x80 != 0 {
        Sign::Minus
    } else {
        Sign::Plus
    };
    BigInt::from_biguint(sign, BigUint::from_bytes_le(&magnitude))
}

/// Interpret a stack value as a boolean.
///
/// False when every byte is zero once the sign bit of the last byte is
/// masked, so both `[]`, `[0x00, 0x00]` and negative zero `[0x80]` are false.
pub fn as_bool(bytes: &[u8]) -> bool {
    match bytes.split_last() {
        None => false,
        Some((&last, rest)) => last & 0x7f != 0 || rest.iter().any(|&b| b != 0),
    }
}

/// The canonical encoding of a boolean: `[1]` or `[]`.
pub fn from_bool(value: bool) -> Vec<u8> {
    if value {
        vec![1]
    } else {
        Vec::new()
    }
}
