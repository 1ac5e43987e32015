//! Blake2b hashing utilities.
//!
//! Every digest in the protocol is an unkeyed Blake2b with an explicit
//! output length: 5 bytes for address checksums, 8 bytes for work values,
//! 32 bytes for block hashes and key derivation, and 64 bytes inside the
//! signature scheme.

use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// A named alias for a 32-byte(u8) array, used to represent a 256-bit hash.
pub type H256 = [u8; 32];

/// A 32-byte block hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockHash(pub H256);

impl BlockHash {
    /// The zero hash, used as `previous` of the first block of an account.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a new hash from raw bytes.
    pub fn from_bytes(bytes: H256) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &H256 {
        &self.0
    }

    /// Check whether every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Convert to an uppercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Parse from a 64-character hex string (mixed case accepted).
    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        decode_hex(s).map(Self).ok_or(ParseError::Hash)
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for BlockHash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<H256> for BlockHash {
    fn from(bytes: H256) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for BlockHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for BlockHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Incremental Blake2b with a fixed output length of `N` bytes.
///
/// Used where a digest covers several independently assembled fields,
/// so the fields never need to be copied into one buffer.
#[derive(Clone)]
pub struct Hasher<const N: usize> {
    inner: Blake2bVar,
}

impl<const N: usize> Hasher<N> {
    /// Start a new digest. `N` must be in `1..=64`.
    pub fn new() -> Self {
        let inner = Blake2bVar::new(N).expect("blake2b output length must be in 1..=64");
        Self { inner }
    }

    /// Feed more data into the digest.
    pub fn update(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        self.inner.update(data.as_ref());
        self
    }

    /// Consume the hasher and return the digest.
    pub fn finalize(self) -> [u8; N] {
        let mut out = [0u8; N];
        self.inner
            .finalize_variable(&mut out)
            .expect("output buffer length matches the configured length");
        out
    }
}

impl<const N: usize> Default for Hasher<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash arbitrary data with an `N`-byte Blake2b digest.
pub fn blake2b<const N: usize>(data: &[u8]) -> [u8; N] {
    let mut hasher = Hasher::<N>::new();
    hasher.update(data);
    hasher.finalize()
}

/// Hash multiple pieces of data as if they were concatenated.
pub fn hash_concat<const N: usize>(parts: &[&[u8]]) -> [u8; N] {
    let mut hasher = Hasher::<N>::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize()
}

/// Decode exactly `N` bytes of hex. Any other length or a non-hex
/// character yields `None`.
pub(crate) fn decode_hex<const N: usize>(s: &str) -> Option<[u8; N]> {
    if s.len() != N * 2 {
        return None;
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(s, &mut out).ok()?;
    Some(out)
}
