//! Format errors shared by the fixed-width hex value types.

use thiserror::Error;

/// A value did not match its fixed-length hex format.
///
/// Each variant names the kind of value that was expected so callers
/// validating several fields can report the first one that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("hash is not valid")]
    Hash,
    #[error("seed is not valid")]
    Seed,
    #[error("secret key is not valid")]
    SecretKey,
    #[error("public key is not valid")]
    PublicKey,
    #[error("signature is not valid")]
    Signature,
    #[error("work is not valid")]
    Work,
    #[error("threshold is not valid")]
    Threshold,
}
