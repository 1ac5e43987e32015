//! State blocks: canonical hashing, creation and checks.
//!
//! The hash of a state block is the 32-byte Blake2b digest of
//!
//! ```text
//! preamble (31 zero bytes, then 0x06)
//! account public key        32 bytes
//! previous block hash       32 bytes, zero for the first block
//! representative public key 32 bytes
//! balance                   16 bytes, big-endian raw
//! link                      32 bytes
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::{Address, Prefix};
use crate::amount::Amount;
use crate::crypto::{PublicKey, SecretKey, Signature};
use crate::hash::{BlockHash, Hasher, H256};
use crate::work::{validate_work, Threshold, Work};

const STATE_PREAMBLE: H256 = {
    let mut preamble = [0u8; 32];
    preamble[31] = 6;
    preamble
};

/// Reasons a block cannot be hashed or created. Variants follow the
/// order in which fields are checked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("secret key is not valid")]
    InvalidSecretKey,
    #[error("account is not valid")]
    InvalidAccount,
    #[error("previous is not valid")]
    InvalidPrevious,
    #[error("representative is not valid")]
    InvalidRepresentative,
    #[error("balance is not valid")]
    InvalidBalance,
    #[error("link is not valid")]
    InvalidLink,
    #[error("work is not valid")]
    InvalidWork,
    #[error("block is impossible: first block whose link is zero or an address")]
    ImpossibleBlock,
}

pub type Result<T> = std::result::Result<T, BlockError>;

/// The link field, in whichever form it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// An account, hashed as its public key.
    Account(Address),
    /// A block hash, hashed verbatim.
    Block(BlockHash),
}

impl Link {
    /// Parse a link, trying an address before a hash.
    pub fn parse(candidate: &str) -> Result<Self> {
        if let Ok(address) = Address::parse(candidate) {
            return Ok(Link::Account(address));
        }
        BlockHash::from_hex(candidate)
            .map(Link::Block)
            .map_err(|_| BlockError::InvalidLink)
    }

    /// The 32 bytes that enter the block hash.
    pub fn to_bytes(&self) -> H256 {
        match self {
            Link::Account(address) => *address.public_key.as_bytes(),
            Link::Block(hash) => hash.0,
        }
    }

    /// The link bytes read as an account.
    pub fn as_account(&self) -> Address {
        match self {
            Link::Account(address) => *address,
            Link::Block(hash) => PublicKey::from_bytes(hash.0).to_address(Prefix::Xrb),
        }
    }
}

/// String parameters for [`hash_block`].
#[derive(Debug, Clone, Copy)]
pub struct HashBlockParams<'a> {
    /// Account address.
    pub account: &'a str,
    /// Previous block hash; `None` for the first block of the account.
    pub previous: Option<&'a str>,
    /// Representative address.
    pub representative: &'a str,
    /// Resulting balance in raw.
    pub balance: &'a str,
    /// Address or block hash.
    pub link: &'a str,
}

/// String parameters for [`create_block`].
#[derive(Debug, Clone, Copy)]
pub struct BlockData<'a> {
    /// Work, or `None` to fill in later.
    pub work: Option<&'a str>,
    pub previous: Option<&'a str>,
    pub representative: &'a str,
    pub balance: &'a str,
    pub link: &'a str,
}

/// Fully parsed block fields.
struct BlockFields {
    account: PublicKey,
    previous: BlockHash,
    representative: Address,
    balance: Amount,
    link: Link,
}

impl BlockFields {
    fn ensure_possible(&self) -> Result<()> {
        let impossible = self.previous.is_zero()
            && match self.link {
                Link::Account(_) => true,
                Link::Block(hash) => hash.is_zero(),
            };
        if impossible {
            return Err(BlockError::ImpossibleBlock);
        }
        Ok(())
    }

    /// Hash without any checks. Callers must have parsed every field.
    fn hash_unchecked(&self) -> BlockHash {
        state_hash(
            &self.account,
            &self.previous,
            &self.representative.public_key,
            &self.balance,
            &self.link.to_bytes(),
        )
    }
}

fn state_hash(
    account: &PublicKey,
    previous: &BlockHash,
    representative: &PublicKey,
    balance: &Amount,
    link: &H256,
) -> BlockHash {
    let mut hasher = Hasher::<32>::new();
    hasher
        .update(STATE_PREAMBLE)
        .update(account)
        .update(previous)
        .update(representative)
        .update(balance.to_be_bytes())
        .update(link);
    BlockHash(hasher.finalize())
}

fn parse_previous(previous: Option<&str>) -> Result<BlockHash> {
    match previous {
        None => Ok(BlockHash::ZERO),
        Some(hex) => BlockHash::from_hex(hex).map_err(|_| BlockError::InvalidPrevious),
    }
}

fn parse_representative(representative: &str) -> Result<Address> {
    Address::parse(representative).map_err(|_| BlockError::InvalidRepresentative)
}

fn parse_balance(balance: &str) -> Result<Amount> {
    balance.parse().map_err(|_| BlockError::InvalidBalance)
}

/// Hash a state block given as strings.
///
/// Fields are checked in the order account, previous, representative,
/// balance, link; the first invalid one is reported. A first block whose
/// link is zero or an address is rejected as impossible.
pub fn hash_block(params: &HashBlockParams<'_>) -> Result<BlockHash> {
    let account = Address::parse(params.account).map_err(|_| BlockError::InvalidAccount)?;
    let fields = BlockFields {
        account: account.public_key,
        previous: parse_previous(params.previous)?,
        representative: parse_representative(params.representative)?,
        balance: parse_balance(params.balance)?,
        link: Link::parse(params.link)?,
    };
    fields.ensure_possible()?;
    Ok(fields.hash_unchecked())
}

/// The wire representation of a state block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateBlock {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub account: Address,
    pub previous: BlockHash,
    pub representative: Address,
    pub balance: Amount,
    /// Raw 32-byte link, printed as hex in either form.
    pub link: BlockHash,
    pub link_as_account: Address,
    pub work: Option<Work>,
    pub signature: Signature,
}

/// Block type tag. Only state blocks exist here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    #[default]
    State,
}

/// A created block with its hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub hash: BlockHash,
    pub block: StateBlock,
}

impl StateBlock {
    /// Recompute the block hash from the fields.
    pub fn hash(&self) -> BlockHash {
        state_hash(
            &self.account.public_key,
            &self.previous,
            &self.representative.public_key,
            &self.balance,
            &self.link.0,
        )
    }

    /// Whether this opens the account chain.
    pub fn is_first(&self) -> bool {
        self.previous.is_zero()
    }

    /// Check the signature against the account key.
    pub fn verify_signature(&self) -> bool {
        self.account
            .public_key
            .verify(&self.hash(), &self.signature)
    }

    /// The value work is computed against: `previous`, or the account
    /// public key for the first block.
    pub fn work_root(&self) -> BlockHash {
        if self.is_first() {
            BlockHash(*self.account.public_key.as_bytes())
        } else {
            self.previous
        }
    }

    /// Check the attached work. A block without work never passes.
    pub fn validate_work(&self, threshold: Threshold) -> bool {
        match &self.work {
            Some(work) => validate_work(&self.work_root(), work, threshold),
            None => false,
        }
    }
}

/// Create and sign a state block.
///
/// Fields are checked in the order secret key, previous, representative,
/// balance, link, work. The account is derived from the secret key with
/// the `xrb_` prefix.
pub fn create_block(secret_key: &str, data: &BlockData<'_>) -> Result<Block> {
    let secret_key = SecretKey::from_hex(secret_key).map_err(|_| BlockError::InvalidSecretKey)?;
    let previous = parse_previous(data.previous)?;
    let representative = parse_representative(data.representative)?;
    let balance = parse_balance(data.balance)?;
    let link = Link::parse(data.link)?;
    let work = data
        .work
        .map(|w| Work::from_hex(w).map_err(|_| BlockError::InvalidWork))
        .transpose()?;

    let account = secret_key.public_key();
    let fields = BlockFields {
        account,
        previous,
        representative,
        balance,
        link,
    };
    fields.ensure_possible()?;

    let hash = fields.hash_unchecked();
    let signature = secret_key.sign(&hash);

    let block = StateBlock {
        kind: BlockKind::State,
        account: account.to_address(Prefix::Xrb),
        previous,
        representative,
        balance,
        link: BlockHash(link.to_bytes()),
        link_as_account: link.as_account(),
        work,
        signature,
    };

    Ok(Block { hash, block })
}
