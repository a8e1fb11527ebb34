//! Normalization of hex strings carried on escrow rows and confirmations.
//!
//! All stored hex is uppercase with no surrounding whitespace; optional fields
//! collapse empty input to `None`.

use strum_macros::Display;

/// Exception for hex values that cannot be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum HexError {
    HexValueRequired,
    HexValueMustHaveEvenLength,
    HexValueInvalid,
}

impl std::error::Error for HexError {}

/// Strip and uppercase a required hex value, rejecting empty, odd-length, or
/// non-hex input.
pub fn normalize_hex(value: &str) -> Result<String, HexError> {
    let normalized = value.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(HexError::HexValueRequired);
    }
    if normalized.len() % 2 != 0 {
        return Err(HexError::HexValueMustHaveEvenLength);
    }
    if hex::decode(&normalized).is_err() {
        return Err(HexError::HexValueInvalid);
    }
    Ok(normalized)
}

/// Normalize an optional hex value; absent or empty input becomes `None`.
pub fn normalize_optional_hex(value: Option<&str>) -> Result<Option<String>, HexError> {
    match value {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => normalize_hex(raw).map(Some),
    }
}
