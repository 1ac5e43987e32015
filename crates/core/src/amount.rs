//! Raw-unit amounts.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing an amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount must be a decimal integer without leading zeros")]
    Format,
    #[error("amount exceeds 2^128 - 1 raw")]
    OutOfRange,
}

/// An amount of raw, the smallest indivisible unit.
///
/// Every `u128` is a valid amount, so the bound `0 ..= 2^128 - 1` holds
/// by construction.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(u128::MAX);

    /// Create an amount from a raw value.
    pub fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    pub fn raw(&self) -> u128 {
        self.0
    }

    /// The 16-byte big-endian form embedded in block hashes.
    pub fn to_be_bytes(&self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    /// The 32-digit, zero-padded, lowercase hex form.
    pub fn to_hex(&self) -> String {
        format!("{:032x}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Parse a decimal raw amount. Only `"0"` may start with a zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed = match s.as_bytes() {
            [b'0'] => true,
            [first, rest @ ..] => {
                (b'1'..=b'9').contains(first)
                    && rest.len() <= 38
                    && rest.iter().all(u8::is_ascii_digit)
            }
            [] => false,
        };
        if !well_formed {
            return Err(AmountError::Format);
        }
        s.parse::<u128>()
            .map(Self)
            .map_err(|_| AmountError::OutOfRange)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({} raw)", self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Amount {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
