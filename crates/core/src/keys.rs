//! Seeds and deterministic key derivation.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::address::Address;
use crate::crypto::{PublicKey, SecretKey};
use crate::error::ParseError;
use crate::hash::{decode_hex, Hasher};

/// Errors produced by key operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("entropy source unavailable: {0}")]
    Entropy(String),
    #[error("secret key or address is not valid")]
    InvalidSecretKeyOrAddress,
}

/// A 32-byte seed, the root of a key hierarchy.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed(pub [u8; 32]);

impl Seed {
    /// Draw a fresh seed from the operating system.
    ///
    /// There is no fallback: if the OS source fails, so does this call.
    pub fn generate() -> Result<Self, KeyError> {
        let mut bytes = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| KeyError::Entropy(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        decode_hex(s).map(Self).ok_or(ParseError::Seed)
    }

    /// Derive the secret key at `index`: `blake2b-256(seed || index_be)`.
    pub fn derive_secret_key(&self, index: u32) -> SecretKey {
        let mut hasher = Hasher::<32>::new();
        hasher.update(self.0).update(index.to_be_bytes());
        SecretKey::from_bytes(hasher.finalize())
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(..)")
    }
}

impl FromStr for Seed {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Seed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Input accepted by [`derive_public_key`], resolved by trying a secret
/// key first and an address second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    SecretKey(SecretKey),
    Address(Address),
}

impl KeyInput {
    pub fn parse(candidate: &str) -> Result<Self, KeyError> {
        if let Ok(secret_key) = SecretKey::from_hex(candidate) {
            return Ok(KeyInput::SecretKey(secret_key));
        }
        Address::parse(candidate)
            .map(KeyInput::Address)
            .map_err(|_| KeyError::InvalidSecretKeyOrAddress)
    }

    /// The public key this input designates.
    pub fn public_key(&self) -> PublicKey {
        match self {
            KeyInput::SecretKey(secret_key) => secret_key.public_key(),
            KeyInput::Address(address) => address.public_key,
        }
    }
}

impl FromStr for KeyInput {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Resolve a secret key or an address to its public key.
pub fn derive_public_key(secret_key_or_address: &str) -> Result<PublicKey, KeyError> {
    KeyInput::parse(secret_key_or_address).map(|input| input.public_key())
}
