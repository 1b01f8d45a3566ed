//! Native currency amounts.
//!
//! Amounts are fixed-point integers (u128) to avoid floating-point errors.
//! The smallest unit is 1 raw; one MRD is 10^9 raw. Operator-facing values
//! ("0.02") are parsed into raw units before anything touches the network.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Raw units per whole MRD.
pub const RAW_PER_MRD: u128 = 1_000_000_000;
/// Number of decimal places in a display amount.
const DECIMALS: u32 = 9;

/// Errors from parsing a decimal amount string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount string")]
    Empty,

    #[error("invalid amount `{0}`")]
    Invalid(String),

    #[error("too many decimal places in `{0}` (max {DECIMALS})")]
    TooPrecise(String),

    #[error("amount `{0}` overflows")]
    Overflow(String),
}

/// A native-currency amount in raw base units.
///
/// Serializes as a raw integer. Deserializes from either a raw integer or a
/// decimal MRD string, so `forward_amount = "0.02"` works in config files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Parse a decimal MRD string (e.g. `"0.02"`) into raw units.
    ///
    /// Accepts an optional fractional part of up to nine digits. Rejects
    /// empty strings, signs, and anything that is not plain decimal digits.
    pub fn from_decimal_str(s: &str) -> Result<Self, AmountError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AmountError::Empty);
        }

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(AmountError::Invalid(s.to_string()));
        }
        if frac.len() > DECIMALS as usize {
            return Err(AmountError::TooPrecise(s.to_string()));
        }

        let digits = |part: &str| part.is_empty() || part.bytes().all(|b| b.is_ascii_digit());
        if !digits(whole) || !digits(frac) {
            return Err(AmountError::Invalid(s.to_string()));
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| AmountError::Overflow(s.to_string()))?
        };

        // Right-pad the fractional part to 9 digits worth of raw units.
        let frac_raw: u128 = if frac.is_empty() {
            0
        } else {
            let parsed: u128 = frac
                .parse()
                .map_err(|_| AmountError::Invalid(s.to_string()))?;
            parsed * 10u128.pow(DECIMALS - frac.len() as u32)
        };

        whole
            .checked_mul(RAW_PER_MRD)
            .and_then(|w| w.checked_add(frac_raw))
            .map(Self)
            .ok_or_else(|| AmountError::Overflow(s.to_string()))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u128(self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl serde::de::Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a raw integer or a decimal MRD string")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Amount(v as u128))
            }

            // TOML hands integers over as i64.
            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u128::try_from(v)
                    .map(Amount)
                    .map_err(|_| E::custom("amount cannot be negative"))
            }

            fn visit_u128<E: serde::de::Error>(self, v: u128) -> Result<Self::Value, E> {
                Ok(Amount(v))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Amount::from_decimal_str(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / RAW_PER_MRD;
        let frac = self.0 % RAW_PER_MRD;
        if frac == 0 {
            write!(f, "{whole} MRD")
        } else {
            let frac = format!("{frac:09}");
            write!(f, "{whole}.{} MRD", frac.trim_end_matches('0'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fractional() {
        assert_eq!(Amount::from_decimal_str("0.02").unwrap().raw(), 20_000_000);
        assert_eq!(Amount::from_decimal_str("0.01").unwrap().raw(), 10_000_000);
        assert_eq!(Amount::from_decimal_str(".5").unwrap().raw(), 500_000_000);
    }

    #[test]
    fn parses_whole() {
        assert_eq!(Amount::from_decimal_str("3").unwrap().raw(), 3 * RAW_PER_MRD);
        assert_eq!(Amount::from_decimal_str("1.").unwrap().raw(), RAW_PER_MRD);
    }

    #[test]
    fn parses_full_precision() {
        assert_eq!(
            Amount::from_decimal_str("0.000000001").unwrap().raw(),
            1
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Amount::from_decimal_str(""), Err(AmountError::Empty));
        assert!(matches!(
            Amount::from_decimal_str("."),
            Err(AmountError::Invalid(_))
        ));
        assert!(matches!(
            Amount::from_decimal_str("-1"),
            Err(AmountError::Invalid(_))
        ));
        assert!(matches!(
            Amount::from_decimal_str("1.2.3"),
            Err(AmountError::Invalid(_))
        ));
        assert!(matches!(
            Amount::from_decimal_str("abc"),
            Err(AmountError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_excess_precision() {
        assert!(matches!(
            Amount::from_decimal_str("0.0000000001"),
            Err(AmountError::TooPrecise(_))
        ));
    }

    #[test]
    fn rejects_overflow() {
        let huge = u128::MAX.to_string();
        assert!(matches!(
            Amount::from_decimal_str(&huge),
            Err(AmountError::Overflow(_))
        ));
    }

    #[test]
    fn display_trims_zeros() {
        assert_eq!(Amount::from_raw(20_000_000).to_string(), "0.02 MRD");
        assert_eq!(Amount::from_raw(RAW_PER_MRD).to_string(), "1 MRD");
        assert_eq!(Amount::from_raw(0).to_string(), "0 MRD");
    }

    #[test]
    fn deserializes_from_string_or_integer() {
        let from_str: Amount = serde_json::from_str("\"0.02\"").unwrap();
        assert_eq!(from_str.raw(), 20_000_000);
        let from_int: Amount = serde_json::from_str("20000000").unwrap();
        assert_eq!(from_int, from_str);
        assert!(serde_json::from_str::<Amount>("-5").is_err());
        assert_eq!(serde_json::to_string(&from_str).unwrap(), "20000000");
    }

    #[test]
    fn checked_math() {
        let a = Amount::from_raw(10);
        let b = Amount::from_raw(4);
        assert_eq!(a.checked_add(b), Some(Amount::from_raw(14)));
        assert_eq!(a.checked_sub(b), Some(Amount::from_raw(6)));
        assert_eq!(b.checked_sub(a), None);
    }
}
