//! Account addresses.
//!
//! An address is a prefix, the 52-symbol base32 encoding of the public key
//! and the 8-symbol encoding of a 5-byte checksum. The checksum is the
//! 5-byte Blake2b digest of the public key with its bytes reversed.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::base32;
use crate::crypto::PublicKey;
use crate::hash::blake2b;

const KEY_SYMBOLS: usize = 52;
const CHECKSUM_SYMBOLS: usize = 8;
const BODY_SYMBOLS: usize = KEY_SYMBOLS + CHECKSUM_SYMBOLS;

/// Errors produced while parsing an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must start with xrb_ or nano_")]
    Prefix,
    #[error("address body must be 60 base32 symbols starting with 1 or 3")]
    Format,
    #[error("address checksum does not match its public key")]
    Checksum,
}

pub type Result<T> = std::result::Result<T, AddressError>;

/// The address prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prefix {
    #[default]
    Xrb,
    Nano,
}

impl Prefix {
    pub fn as_str(self) -> &'static str {
        match self {
            Prefix::Xrb => "xrb_",
            Prefix::Nano => "nano_",
        }
    }
}

/// A decoded, checksum-verified address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    pub prefix: Prefix,
    pub public_key: PublicKey,
}

/// Compute the 5-byte checksum of a public key, already reversed.
fn checksum(public_key: &PublicKey) -> [u8; 5] {
    let mut digest: [u8; 5] = blake2b(public_key.as_bytes());
    digest.reverse();
    digest
}

impl Address {
    /// Build the address of a public key.
    pub fn from_public_key(public_key: PublicKey, prefix: Prefix) -> Self {
        Self { prefix, public_key }
    }

    /// Same key under a different prefix.
    pub fn with_prefix(self, prefix: Prefix) -> Self {
        Self { prefix, ..self }
    }

    /// Parse an address, verifying its format and checksum.
    pub fn parse(candidate: &str) -> Result<Self> {
        let (prefix, body) = if let Some(body) = candidate.strip_prefix(Prefix::Xrb.as_str()) {
            (Prefix::Xrb, body)
        } else if let Some(body) = candidate.strip_prefix(Prefix::Nano.as_str()) {
            (Prefix::Nano, body)
        } else {
            return Err(AddressError::Prefix);
        };

        // 52 symbols carry 260 bits, so the 4 pad bits in front leave `1`
        // or `3` as the only possible leading symbol.
        if body.len() != BODY_SYMBOLS
            || !body.starts_with(['1', '3'])
            || !body.chars().all(base32::is_symbol)
        {
            return Err(AddressError::Format);
        }

        let (key_part, checksum_part) = body.split_at(KEY_SYMBOLS);
        let key_bytes = base32::decode(key_part).map_err(|_| AddressError::Format)?;
        let checksum_bytes = base32::decode(checksum_part).map_err(|_| AddressError::Format)?;

        let mut key = [0u8; 32];
        key.copy_from_slice(&key_bytes);
        let public_key = PublicKey::from_bytes(key);

        if checksum(&public_key)[..] != checksum_bytes[..] {
            return Err(AddressError::Checksum);
        }

        Ok(Self { prefix, public_key })
    }

    /// Check whether a string is a valid address.
    pub fn is_valid(candidate: &str) -> bool {
        Self::parse(candidate).is_ok()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.prefix.as_str(),
            base32::encode(self.public_key.as_bytes()),
            base32::encode(&checksum(&self.public_key))
        )
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl PublicKey {
    /// Encode this key as an address.
    pub fn to_address(&self, prefix: Prefix) -> Address {
        Address::from_public_key(*self, prefix)
    }
}

/// Encode a public key as an address string.
pub fn derive_address(public_key: &PublicKey, prefix: Prefix) -> String {
    public_key.to_address(prefix).to_string()
}
