//! Block hashing and creation commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use nanokit_core::{create_block, hash_block, BlockData, HashBlockParams};

#[derive(Args)]
pub struct HashArgs {
    #[command(subcommand)]
    item: HashItem,
}

#[derive(Subcommand)]
enum HashItem {
    /// Hash a state block
    Block {
        /// Account address
        #[arg(long)]
        account: String,

        /// Previous block hash; omit for the first block of the account
        #[arg(long, allow_hyphen_values = true)]
        previous: Option<String>,

        /// Representative address
        #[arg(long)]
        representative: String,

        /// Resulting balance, in raw
        #[arg(long, allow_hyphen_values = true)]
        balance: String,

        /// Link, as an address or a block hash
        #[arg(long, allow_hyphen_values = true)]
        link: String,
    },
}

#[derive(Args)]
pub struct CreateArgs {
    #[command(subcommand)]
    item: CreateItem,
}

#[derive(Subcommand)]
enum CreateItem {
    /// Create a signed state block
    Block {
        /// Secret key of the account
        #[arg(long)]
        secret: String,

        /// Previous block hash; omit for the first block of the account
        #[arg(long, allow_hyphen_values = true)]
        previous: Option<String>,

        /// Representative address
        #[arg(long)]
        representative: String,

        /// Resulting balance, in raw
        #[arg(long, allow_hyphen_values = true)]
        balance: String,

        /// Link, as an address or a block hash
        #[arg(long, allow_hyphen_values = true)]
        link: String,

        /// Work, if already computed
        #[arg(long)]
        work: Option<String>,
    },
}

pub fn hash(args: HashArgs) -> Result<String> {
    let HashItem::Block {
        account,
        previous,
        representative,
        balance,
        link,
    } = args.item;

    let hash = hash_block(&HashBlockParams {
        account: &account,
        previous: previous.as_deref(),
        representative: &representative,
        balance: &balance,
        link: &link,
    })?;
    Ok(hash.to_hex())
}

pub fn create(args: CreateArgs) -> Result<String> {
    let CreateItem::Block {
        secret,
        previous,
        representative,
        balance,
        link,
        work,
    } = args.item;

    let block = create_block(
        &secret,
        &BlockData {
            work: work.as_deref(),
            previous: previous.as_deref(),
            representative: &representative,
            balance: &balance,
            link: &link,
        },
    )?;
    Ok(serde_json::to_string_pretty(&block)?)
}
