//! Format predicates for untrusted input.
//!
//! Each predicate answers whether a candidate string would be accepted by
//! the matching parser. None of them return errors.

use crate::address::Address;
use crate::amount::Amount;
use crate::hash::decode_hex;

fn is_hex<const N: usize>(candidate: &str) -> bool {
    decode_hex::<N>(candidate).is_some()
}

/// 64 hex characters.
pub fn check_seed(candidate: &str) -> bool {
    is_hex::<32>(candidate)
}

/// 64 hex characters.
pub fn check_hash(candidate: &str) -> bool {
    is_hex::<32>(candidate)
}

/// 64 hex characters, for secret and public keys alike.
pub fn check_key(candidate: &str) -> bool {
    is_hex::<32>(candidate)
}

/// 16 hex characters.
pub fn check_work(candidate: &str) -> bool {
    is_hex::<8>(candidate)
}

/// 16 hex characters.
pub fn check_threshold(candidate: &str) -> bool {
    is_hex::<8>(candidate)
}

/// 128 hex characters.
pub fn check_signature(candidate: &str) -> bool {
    is_hex::<64>(candidate)
}

/// A well-formed address whose checksum matches.
pub fn check_address(candidate: &str) -> bool {
    Address::is_valid(candidate)
}

/// A decimal raw amount without leading zeros, at most `2^128 - 1`.
pub fn check_amount(candidate: &str) -> bool {
    candidate.parse::<Amount>().is_ok()
}

/// A derivation index in `0..=2^32 - 1`.
pub fn check_index(index: i64) -> bool {
    u32::try_from(index).is_ok()
}
