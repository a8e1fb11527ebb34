//! PREIMAGE-SHA-256 crypto-conditions for the bonus escrows.
//!
//! Each bonus escrow is locked behind the SHA-256 hash of a random 32-byte
//! preimage. The condition (the hash) goes on-ledger at EscrowCreate time; the
//! fulfillment (the preimage hex) is disclosed only for the winner's bonus at
//! EscrowFinish time. The loser's preimage is never disclosed.

use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::utils::hex_conversion::{normalize_hex, HexError};

/// Preimage length in raw bytes.
pub const PREIMAGE_BYTES: usize = 32;

/// Generate a cryptographically-secure random preimage, uppercase hex.
pub fn generate_preimage_hex() -> String {
    let mut raw = [0u8; PREIMAGE_BYTES];
    rand::thread_rng().fill_bytes(&mut raw);
    hex::encode_upper(raw)
}

/// The on-ledger condition for a preimage: uppercase-hex SHA-256 of the raw
/// preimage bytes.
pub fn make_condition_hex(preimage_hex: &str) -> Result<String, HexError> {
    let raw = hex::decode(normalize_hex(preimage_hex)?).map_err(|_| HexError::HexValueInvalid)?;
    Ok(hex::encode_upper(Sha256::digest(&raw)))
}

/// The fulfillment transport form: the normalized preimage hex itself.
pub fn make_fulfillment_hex(preimage_hex: &str) -> Result<String, HexError> {
    normalize_hex(preimage_hex)
}

/// Recompute the condition from a fulfillment and compare it constant-time
/// against the stored condition.
pub fn verify_fulfillment(condition_hex: &str, fulfillment_hex: &str) -> Result<bool, HexError> {
    let expected = normalize_hex(condition_hex)?;
    let computed = make_condition_hex(fulfillment_hex)?;
    Ok(computed.as_bytes().ct_eq(expected.as_bytes()).into())
}
