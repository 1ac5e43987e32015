//! Ed25519 signatures with Blake2b-512 in place of SHA-512.
//!
//! The curve, the encodings and the signing equations are exactly those of
//! Ed25519. Only the hash changes: secret-key expansion, the nonce and the
//! challenge all use the 64-byte Blake2b digest. Signatures made this way do
//! not verify under standard Ed25519 and vice versa.

use blake2::digest::Digest;
use blake2::Blake2b512;
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::hash::{blake2b, decode_hex, BlockHash};

/// A 32-byte secret key.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(pub [u8; 32]);

/// A 32-byte public key, the compressed encoding of a curve point.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 32]);

/// A 64-byte signature, `R || S`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

/// Secret key expanded into the signing scalar and the nonce prefix.
struct ExpandedSecret {
    scalar: Scalar,
    prefix: [u8; 32],
}

impl ExpandedSecret {
    fn new(secret: &[u8; 32]) -> Self {
        let digest: [u8; 64] = blake2b(secret);

        let mut scalar_bytes = [0u8; 32];
        scalar_bytes.copy_from_slice(&digest[..32]);
        clamp(&mut scalar_bytes);

        let mut prefix = [0u8; 32];
        prefix.copy_from_slice(&digest[32..]);

        // The base point has order L, so reducing the clamped integer mod L
        // does not change any point it multiplies.
        Self {
            scalar: Scalar::from_bytes_mod_order(scalar_bytes),
            prefix,
        }
    }

    fn public_point(&self) -> CompressedEdwardsY {
        EdwardsPoint::mul_base(&self.scalar).compress()
    }
}

/// Ed25519 clamping: clear the low 3 bits, clear bit 255, set bit 254.
fn clamp(bytes: &mut [u8; 32]) {
    bytes[0] &= 248;
    bytes[31] &= 127;
    bytes[31] |= 64;
}

/// Reduce a 64-byte Blake2b digest of `parts` modulo the group order.
fn hash_to_scalar(parts: &[&[u8]]) -> Scalar {
    let mut hasher = Blake2b512::new();
    for part in parts {
        hasher.update(part);
    }
    Scalar::from_hash(hasher)
}

impl SecretKey {
    /// Create a secret key from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to an uppercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        decode_hex(s).map(Self).ok_or(ParseError::SecretKey)
    }

    /// Derive the matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(ExpandedSecret::new(&self.0).public_point().to_bytes())
    }

    /// Sign an arbitrary message.
    pub fn sign_message(&self, message: &[u8]) -> Signature {
        let expanded = ExpandedSecret::new(&self.0);
        let public = expanded.public_point();

        let r = hash_to_scalar(&[&expanded.prefix, message]);
        let big_r = EdwardsPoint::mul_base(&r).compress();
        let k = hash_to_scalar(&[big_r.as_bytes(), public.as_bytes(), message]);
        let s = k * expanded.scalar + r;

        let mut signature = [0u8; 64];
        signature[..32].copy_from_slice(big_r.as_bytes());
        signature[32..].copy_from_slice(s.as_bytes());
        Signature(signature)
    }

    /// Sign a block hash.
    pub fn sign(&self, hash: &BlockHash) -> Signature {
        self.sign_message(hash.as_bytes())
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

impl FromStr for SecretKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl PublicKey {
    /// Create a public key from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to an uppercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        decode_hex(s).map(Self).ok_or(ParseError::PublicKey)
    }

    /// Verify a signature over an arbitrary message.
    ///
    /// Returns `false` for any signature that does not check out, including
    /// a public key that is not a curve point or a non-canonical `S`.
    ///
    /// `S` must be fully reduced below the group order `l`. Replacing `S`
    /// with `S + l` satisfies the same group equation, and verifiers that
    /// reduce `S` first accept it; here it is rejected, so a valid
    /// signature has exactly one encoding.
    pub fn verify_message(&self, message: &[u8], signature: &Signature) -> bool {
        let Some(a) = CompressedEdwardsY(self.0).decompress() else {
            return false;
        };

        let mut big_r = [0u8; 32];
        big_r.copy_from_slice(&signature.0[..32]);
        let mut s_bytes = [0u8; 32];
        s_bytes.copy_from_slice(&signature.0[32..]);
        let Some(s) = Option::<Scalar>::from(Scalar::from_canonical_bytes(s_bytes)) else {
            return false;
        };

        let k = hash_to_scalar(&[&big_r, &self.0, message]);
        // s*B - k*A must reproduce R.
        let check = EdwardsPoint::vartime_double_scalar_mul_basepoint(&k, &(-a), &s);
        check.compress().to_bytes() == big_r
    }

    /// Verify a signature over a block hash.
    pub fn verify(&self, hash: &BlockHash, signature: &Signature) -> bool {
        self.verify_message(hash.as_bytes(), signature)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for PublicKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl Signature {
    /// Create a signature from raw bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to an uppercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Parse from a 128-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        decode_hex(s).map(Self).ok_or(ParseError::Signature)
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self([0u8; 64])
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &self.to_hex()[..16])
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Signature {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A secret key together with its public key.
pub struct Keypair {
    secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl Keypair {
    /// Create a keypair from a secret key.
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = secret_key.public_key();
        Self {
            secret_key,
            public_key,
        }
    }

    /// Get the secret key.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// Sign a block hash.
    pub fn sign(&self, hash: &BlockHash) -> Signature {
        self.secret_key.sign(hash)
    }

    /// Verify a signature against our public key.
    pub fn verify(&self, hash: &BlockHash, signature: &Signature) -> bool {
        self.public_key.verify(hash, signature)
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";
    const PUBLIC_ONE: &str = "C969EC348895A49E21824E10E6B829EDEA50CCC26A83CE8986A3B95D12576058";
    const HASH: &str = "F47B23107E5F34B2CE06F562B5C435DF72A533251CB414C51B2B62A8F63A00E4";
    const SIGNATURE: &str = "5974324F8CC42DA56F62FC212A17886BDCB18DE363D04DA84EEDC99CB4A33919\
                             D14A2CF9DE9D534FAA6D0B91D01F0622205D898293525E692586C84F2DCF9208";

    fn secret_one() -> SecretKey {
        SecretKey::from_hex(SECRET_ONE).unwrap()
    }

    #[test]
    fn test_public_key_vector() {
        assert_eq!(secret_one().public_key().to_hex(), PUBLIC_ONE);
    }

    #[test]
    fn test_public_key_vector_derived_secret() {
        let sk = SecretKey::from_hex(
            "937BC31DCFF4588820CD9C774D680FFA056FB50B02ADFBC2B4BA5C3F7C6DC8F0",
        )
        .unwrap();
        assert_eq!(
            sk.public_key().to_hex(),
            "B12E6B0221295B8674F78FA3D8DB71FC3127207804D2FD8BEC5FF4F6046721F5"
        );
    }

    #[test]
    fn test_sign_vector() {
        let hash = BlockHash::from_hex(HASH).unwrap();
        assert_eq!(secret_one().sign(&hash).to_hex(), SIGNATURE);
    }

    #[test]
    fn test_verify_vector() {
        let hash = BlockHash::from_hex(HASH).unwrap();
        let public = PublicKey::from_hex(PUBLIC_ONE).unwrap();
        let signature = Signature::from_hex(SIGNATURE).unwrap();
        assert!(public.verify(&hash, &signature));
    }

    #[test]
    fn test_flipped_signature_bit_fails() {
        let hash = BlockHash::from_hex(HASH).unwrap();
        let public = secret_one().public_key();
        let signature = Signature::from_hex(SIGNATURE).unwrap();
        for byte in [0usize, 17, 31, 32, 50, 63] {
            let mut tampered = signature;
            tampered.0[byte] ^= 0x01;
            assert!(!public.verify(&hash, &tampered), "byte {byte}");
        }
    }

    #[test]
    fn test_flipped_hash_bit_fails() {
        let public = secret_one().public_key();
        let signature = Signature::from_hex(SIGNATURE).unwrap();
        let mut hash = BlockHash::from_hex(HASH).unwrap();
        hash.0[5] ^= 0x80;
        assert!(!public.verify(&hash, &signature));
    }

    #[test]
    fn test_wrong_key_fails() {
        let hash = BlockHash::from_hex(HASH).unwrap();
        let signature = secret_one().sign(&hash);
        let other = SecretKey::from_bytes([7u8; 32]).public_key();
        assert!(!other.verify(&hash, &signature));
    }

    #[test]
    fn test_known_bad_signature_fails() {
        let hash = BlockHash::from_hex(HASH).unwrap();
        let signature = Signature::from_hex(
            "8029FCD2F48C685296E525392898D5022260F10D19B0D6AAF435D9ED9FC2A41D\
             91933A4BC99CDEE48AD40D363ED81BCDB68871A212CF26F65AD24CC8F4234795",
        )
        .unwrap();
        assert!(!secret_one().public_key().verify(&hash, &signature));
    }

    #[test]
    fn test_non_canonical_s_fails() {
        let hash = BlockHash::from_hex(HASH).unwrap();
        let mut signature = Signature::from_hex(SIGNATURE).unwrap();
        signature.0[32..].copy_from_slice(&[0xFF; 32]);
        assert!(!secret_one().public_key().verify(&hash, &signature));
    }

    #[test]
    fn test_s_plus_group_order_fails() {
        // The group order l, little-endian.
        const L: [u8; 32] = [
            0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9,
            0xde, 0x14, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x10,
        ];
        let hash = BlockHash::from_hex(HASH).unwrap();
        let mut signature = Signature::from_hex(SIGNATURE).unwrap();
        assert!(secret_one().public_key().verify(&hash, &signature));

        let mut carry = 0u16;
        for (byte, l) in signature.0[32..].iter_mut().zip(L) {
            let sum = u16::from(*byte) + u16::from(l) + carry;
            *byte = sum as u8;
            carry = sum >> 8;
        }
        assert_eq!(carry, 0);
        assert!(!secret_one().public_key().verify(&hash, &signature));
    }

    #[test]
    fn test_sign_and_verify_arbitrary_messages() {
        let keypair = Keypair::from_secret_key(SecretKey::from_bytes([42u8; 32]));
        let message = b"not a block hash";
        let signature = keypair.secret_key().sign_message(message);
        assert!(keypair.public_key.verify_message(message, &signature));
        assert!(!keypair.public_key.verify_message(b"another message", &signature));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let hash = BlockHash::from_hex(HASH).unwrap();
        let keypair = Keypair::from_secret_key(secret_one());
        assert_eq!(keypair.sign(&hash), keypair.sign(&hash));
        assert!(keypair.verify(&hash, &keypair.sign(&hash)));
    }

    #[test]
    fn test_hex_formats() {
        assert!(SecretKey::from_hex(&SECRET_ONE[1..]).is_err());
        assert!(PublicKey::from_hex(&format!("{PUBLIC_ONE}0")).is_err());
        assert!(Signature::from_hex(&SIGNATURE[1..]).is_err());
        assert!(Signature::from_hex(&format!("z{}", &SIGNATURE[1..])).is_err());
        assert_eq!(
            Signature::from_hex(&SIGNATURE.to_lowercase()).unwrap().to_hex(),
            SIGNATURE
        );
    }

    #[test]
    fn test_secret_key_debug_is_redacted() {
        assert_eq!(format!("{:?}", secret_one()), "SecretKey(..)");
    }
}
