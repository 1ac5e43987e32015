//! Unit conversion command.

use anyhow::Result;
use clap::{Args, Subcommand};
use nanokit_core::convert_named;

#[derive(Args)]
pub struct ConvertArgs {
    #[command(subcommand)]
    item: ConvertItem,
}

#[derive(Subcommand)]
enum ConvertItem {
    /// Convert an amount
    Amount {
        /// Value to convert
        #[arg(long, allow_hyphen_values = true)]
        input: String,

        /// Source unit (hex, raw, nano, knano, Nano, NANO, KNano, MNano)
        #[arg(long)]
        from: String,

        /// Destination unit
        #[arg(long)]
        to: String,
    },
}

pub fn run(args: ConvertArgs) -> Result<String> {
    match args.item {
        ConvertItem::Amount { input, from, to } => Ok(convert_named(&input, &from, &to)?),
    }
}
