//! Core primitives for nanokit.
//!
//! This crate provides the protocol building blocks of the Nano currency:
//! - Blake2b hashing and the address base32 codec
//! - Ed25519 signatures over Blake2b
//! - Seeds, key derivation and checksummed addresses
//! - Amounts and denomination conversion
//! - State block hashing and creation
//! - Proof-of-work validation and search
//!
//! Everything here is pure and synchronous.

pub mod address;
pub mod amount;
pub mod base32;
pub mod block;
pub mod check;
pub mod convert;
pub mod crypto;
pub mod error;
pub mod hash;
pub mod keys;
pub mod work;

// Re-export commonly used types at the crate root
pub use address::{derive_address, Address, AddressError, Prefix};
pub use amount::{Amount, AmountError};
pub use block::{
    create_block, hash_block, Block, BlockData, BlockError, BlockKind, HashBlockParams, Link,
    StateBlock,
};
pub use convert::{convert, convert_named, ConversionError, Unit};
pub use crypto::{Keypair, PublicKey, SecretKey, Signature};
pub use error::ParseError;
pub use hash::{blake2b, hash_concat, BlockHash, Hasher, H256};
pub use keys::{derive_public_key, KeyError, KeyInput, Seed};
pub use work::{
    compute_work, compute_work_in, search, split_range, validate_work, work_value, Threshold,
    Work, WorkError, WorkerPartition,
};
