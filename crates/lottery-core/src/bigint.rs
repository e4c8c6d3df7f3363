//! hex and little-endian codecs over 256-bit integers
//!
//! every protocol value (secret, rand, dice, hashes, path elements) moves
//! through these conversions; malformed input is an error, never a silent
//! truncation

use alloy_primitives::U256;
use rand::RngCore;

use crate::error::{Error, Result};
use crate::SECRET_BYTES;

/// parse a hex string, with or without a `0x` prefix
pub fn hex_to_u256(hex: &str) -> Result<U256> {
    let digits = hex
        .strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex);
    if digits.is_empty() {
        return Err(Error::InvalidFormat("empty hex string".into()));
    }
    U256::from_str_radix(digits, 16)
        .map_err(|_| Error::InvalidFormat("non-hex characters or overflow".into()))
}

/// parse a secret in its fixed 62-nibble (31-byte) form
pub fn parse_secret_hex(hex: &str) -> Result<U256> {
    let digits = hex
        .strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex);
    if digits.len() != 2 * SECRET_BYTES {
        return Err(Error::InvalidFormat(format!(
            "secret must be {} hex chars, got {}",
            2 * SECRET_BYTES,
            digits.len()
        )));
    }
    hex_to_u256(digits)
}

/// `0x`-prefixed minimal hex rendering
pub fn u256_to_hex(value: U256) -> String {
    format!("0x{}", u256_to_hex_raw(value))
}

/// minimal hex rendering without prefix
pub fn u256_to_hex_raw(value: U256) -> String {
    if value.is_zero() {
        return "0".into();
    }
    let encoded = hex::encode(value.to_be_bytes::<32>());
    encoded.trim_start_matches('0').to_string()
}

/// fixed-length little-endian byte encoding; errors if the value does not fit
pub fn u256_to_le_bytes(value: U256, len: usize) -> Result<Vec<u8>> {
    if len > 32 {
        return Err(Error::InvalidInput("byte length exceeds 32"));
    }
    let bytes = value.to_le_bytes::<32>();
    if bytes[len..].iter().any(|&b| b != 0) {
        return Err(Error::InvalidInput("value does not fit requested byte length"));
    }
    Ok(bytes[..len].to_vec())
}

/// little-endian byte buffer to integer
pub fn le_bytes_to_u256(bytes: &[u8]) -> Result<U256> {
    if bytes.len() > 32 {
        return Err(Error::InvalidInput("byte buffer longer than 32 bytes"));
    }
    Ok(U256::from_le_slice(bytes))
}

/// reverse the low `width` bits of `value` within a `width`-bit window;
/// bits at or above `width` are dropped
pub fn reverse_bits(value: U256, width: usize) -> U256 {
    let mut out = U256::ZERO;
    for i in 0..width {
        if value.bit(i) {
            out.set_bit(width - 1 - i, true);
        }
    }
    out
}

/// draw a uniform 31-byte secret
pub fn random_secret<R: RngCore>(rng: &mut R) -> U256 {
    let mut bytes = [0u8; SECRET_BYTES];
    rng.fill_bytes(&mut bytes);
    U256::from_le_slice(&bytes)
}
