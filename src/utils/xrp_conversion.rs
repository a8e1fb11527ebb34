//! Conversions between decimal XRP and integer drop amounts.
//!
//! Every monetary column in the system is an integer drop count; decimal XRP
//! only appears at input boundaries and must map to a whole number of drops.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use strum_macros::Display;

/// Drops in one XRP.
pub const DROP_SCALE: i64 = 1_000_000;
/// Largest drop amount storable in a signed 64-bit column.
pub const MAX_DROPS: i64 = i64::MAX;

/// Exception for invalid XRP or drop amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum MoneyError {
    DropsMustBeNonNegative,
    DropsOverflowBigint,
    XrpMustBeNonNegative,
    XrpMustMapToIntegerDrops,
}

impl std::error::Error for MoneyError {}

/// Check that a drop amount is storable: non-negative and within the signed
/// 64-bit range.
pub fn ensure_valid_drops(value: i64) -> Result<i64, MoneyError> {
    if value < 0 {
        Err(MoneyError::DropsMustBeNonNegative)
    } else {
        Ok(value)
    }
}

/// Convert a decimal XRP amount to drops.
///
/// Amounts with a fractional drop remainder are rejected rather than rounded.
pub fn xrp_to_drops(xrp: Decimal) -> Result<i64, MoneyError> {
    if xrp < Decimal::ZERO {
        return Err(MoneyError::XrpMustBeNonNegative);
    }
    let drops = xrp
        .checked_mul(Decimal::from(DROP_SCALE))
        .ok_or(MoneyError::DropsOverflowBigint)?;
    if drops != drops.trunc() {
        return Err(MoneyError::XrpMustMapToIntegerDrops);
    }
    ensure_valid_drops(drops.to_i64().ok_or(MoneyError::DropsOverflowBigint)?)
}

/// Convert drops back to decimal XRP. Exact for every valid drop amount.
pub fn drops_to_xrp(drops: i64) -> Result<Decimal, MoneyError> {
    let clean = ensure_valid_drops(drops)?;
    Ok(Decimal::new(clean, 6))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_xrp_to_drops() {
        let drops = xrp_to_drops(Decimal::new(100_000_001, 6)).unwrap();
        assert_eq!(drops, 100 * DROP_SCALE + 1);
    }

    #[test]
    fn test_drops_to_xrp() {
        let xrp = drops_to_xrp(100_000_001).unwrap();
        assert_eq!(xrp, Decimal::new(100_000_001, 6));
    }

    #[test]
    fn accept_zero() {
        assert_eq!(xrp_to_drops(Decimal::ZERO).unwrap(), 0);
        assert_eq!(drops_to_xrp(0).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn reject_fractional_drops() {
        let xrp = Decimal::from_str("0.0000001").unwrap();
        assert_eq!(
            xrp_to_drops(xrp).unwrap_err(),
            MoneyError::XrpMustMapToIntegerDrops
        );
    }

    #[test]
    fn reject_negative_xrp() {
        assert_eq!(
            xrp_to_drops(Decimal::NEGATIVE_ONE).unwrap_err(),
            MoneyError::XrpMustBeNonNegative
        );
    }

    #[test]
    fn reject_negative_drops() {
        assert_eq!(
            drops_to_xrp(-1).unwrap_err(),
            MoneyError::DropsMustBeNonNegative
        );
    }

    #[test]
    fn accept_round_trip() {
        for drops in [0_i64, 1, 999_999, DROP_SCALE, 2_100_000, MAX_DROPS] {
            let xrp = drops_to_xrp(drops).unwrap();
            assert_eq!(xrp_to_drops(xrp).unwrap(), drops);
        }
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            MoneyError::DropsMustBeNonNegative.to_string(),
            "drops_must_be_non_negative"
        );
        assert_eq!(
            MoneyError::XrpMustMapToIntegerDrops.to_string(),
            "xrp_must_map_to_integer_drops"
        );
    }
}
