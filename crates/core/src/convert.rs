//! Conversion between denominations.
//!
//! Every denomination is a power of ten of raw, so scaling a decimal
//! literal only moves its decimal point. Working on the digit string
//! keeps the conversion exact at any magnitude; no floating point is
//! involved.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced by [`convert`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("unknown unit: {0:?}")]
    InvalidUnit(String),
    #[error("value is not valid")]
    InvalidValue,
    #[error("value cannot be represented as a 128-bit hex amount")]
    NotRepresentable,
}

/// A denomination of the currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Raw as 32 zero-padded hex digits.
    #[serde(rename = "hex")]
    Hex,
    /// 10^0 raw.
    #[serde(rename = "raw")]
    Raw,
    /// 10^24 raw, written `nano`.
    #[serde(rename = "nano")]
    MicroNano,
    /// 10^27 raw, written `knano`.
    #[serde(rename = "knano")]
    MilliNano,
    /// 10^30 raw, written `Nano` or `NANO`.
    #[serde(rename = "Nano", alias = "NANO")]
    Nano,
    /// 10^33 raw, written `KNano`.
    #[serde(rename = "KNano")]
    KiloNano,
    /// 10^36 raw, written `MNano`.
    #[serde(rename = "MNano")]
    MegaNano,
}

impl Unit {
    /// Power of ten of raw this unit represents.
    pub fn exponent(self) -> u32 {
        match self {
            Unit::Hex | Unit::Raw => 0,
            Unit::MicroNano => 24,
            Unit::MilliNano => 27,
            Unit::Nano => 30,
            Unit::KiloNano => 33,
            Unit::MegaNano => 36,
        }
    }

    /// Canonical written name.
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Hex => "hex",
            Unit::Raw => "raw",
            Unit::MicroNano => "nano",
            Unit::MilliNano => "knano",
            Unit::Nano => "Nano",
            Unit::KiloNano => "KNano",
            Unit::MegaNano => "MNano",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = ConversionError;

    /// Unit names are case-sensitive: `nano` and `Nano` differ by 10^6.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hex" => Ok(Unit::Hex),
            "raw" => Ok(Unit::Raw),
            "nano" => Ok(Unit::MicroNano),
            "knano" => Ok(Unit::MilliNano),
            "Nano" | "NANO" => Ok(Unit::Nano),
            "KNano" => Ok(Unit::KiloNano),
            "MNano" => Ok(Unit::MegaNano),
            other => Err(ConversionError::InvalidUnit(other.to_string())),
        }
    }
}

/// A non-negative decimal split around its point.
#[derive(Debug, PartialEq, Eq)]
struct Decimal {
    int: String,
    frac: String,
}

impl Decimal {
    /// Parse digits with at most one interior `.`.
    fn parse(value: &str) -> Result<Self, ConversionError> {
        if value.is_empty() || value.starts_with('.') || value.ends_with('.') {
            return Err(ConversionError::InvalidValue);
        }
        let (int, frac) = value.split_once('.').unwrap_or((value, ""));
        let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !digits_only(int) || !digits_only(frac) {
            return Err(ConversionError::InvalidValue);
        }
        Ok(Self {
            int: int.to_string(),
            frac: frac.to_string(),
        }
        .normalized())
    }

    fn from_raw(raw: u128) -> Self {
        Self {
            int: raw.to_string(),
            frac: String::new(),
        }
    }

    /// Multiply by `10^exp` (divide when `exp` is negative).
    fn shift(self, exp: i64) -> Self {
        let digits = format!("{}{}", self.int, self.frac);
        let len = digits.len() as i64;
        let point = self.int.len() as i64 + exp;

        let (int, frac) = if point <= 0 {
            (String::new(), "0".repeat((-point) as usize) + &digits)
        } else if point >= len {
            (digits + &"0".repeat((point - len) as usize), String::new())
        } else {
            let (int, frac) = digits.split_at(point as usize);
            (int.to_string(), frac.to_string())
        };

        Self { int, frac }.normalized()
    }

    fn normalized(self) -> Self {
        let int = self.int.trim_start_matches('0');
        let frac = self.frac.trim_end_matches('0');
        Self {
            int: if int.is_empty() {
                "0".to_string()
            } else {
                int.to_string()
            },
            frac: frac.to_string(),
        }
    }

    fn to_raw(&self) -> Option<u128> {
        if !self.frac.is_empty() {
            return None;
        }
        self.int.parse().ok()
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frac.is_empty() {
            f.write_str(&self.int)
        } else {
            write!(f, "{}.{}", self.int, self.frac)
        }
    }
}

/// Convert a value from one unit to another.
///
/// `value` is a non-negative decimal literal, or exactly 32 hex digits when
/// `from` is [`Unit::Hex`]. Converting to hex requires the result to be a
/// whole number of raw that fits in 128 bits.
pub fn convert(value: &str, from: Unit, to: Unit) -> Result<String, ConversionError> {
    let decimal = if from == Unit::Hex {
        if value.len() != 32 || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ConversionError::InvalidValue);
        }
        let raw = u128::from_str_radix(value, 16).map_err(|_| ConversionError::InvalidValue)?;
        Decimal::from_raw(raw)
    } else {
        Decimal::parse(value)?
    };

    let scaled = decimal.shift(i64::from(from.exponent()) - i64::from(to.exponent()));

    if to == Unit::Hex {
        let raw = scaled.to_raw().ok_or(ConversionError::NotRepresentable)?;
        return Ok(format!("{raw:032x}"));
    }
    Ok(scaled.to_string())
}

/// Convert with unit names given as strings.
///
/// Unit names are resolved before the value is looked at, so an unknown
/// unit is reported even when the value is also malformed.
pub fn convert_named(value: &str, from: &str, to: &str) -> Result<String, ConversionError> {
    let from: Unit = from.parse()?;
    let to: Unit = to.parse()?;
    convert(value, from, to)
}
