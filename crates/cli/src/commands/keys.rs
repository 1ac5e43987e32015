//! Seed generation and key derivation commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use nanokit_core::{derive_address, derive_public_key, PublicKey, Seed};

use crate::config::{Overrides, Settings};

#[derive(Args)]
pub struct GenerateArgs {
    #[command(subcommand)]
    item: GenerateItem,
}

#[derive(Subcommand)]
enum GenerateItem {
    /// Generate a seed
    Seed,
}

#[derive(Args)]
pub struct DeriveArgs {
    #[command(subcommand)]
    item: DeriveItem,
}

#[derive(Subcommand)]
enum DeriveItem {
    /// Derive a secret key from a seed
    Secret {
        /// Seed to derive from
        #[arg(long)]
        from: String,

        /// Index of the secret key
        #[arg(long, default_value_t = 0)]
        index: u32,
    },
    /// Derive a public key from a secret key or an address
    Public {
        /// Secret key or address to derive from
        #[arg(long)]
        from: String,
    },
    /// Derive an address from a public key
    Address {
        /// Public key to derive from
        #[arg(long)]
        from: String,

        /// Use the nano_ prefix instead of xrb_
        #[arg(long)]
        nano_prefix: bool,
    },
}

impl DeriveArgs {
    pub fn overrides(&self) -> Overrides {
        match &self.item {
            DeriveItem::Address {
                nano_prefix: true, ..
            } => Overrides {
                nano_prefix: Some(true),
                ..Overrides::default()
            },
            _ => Overrides::default(),
        }
    }
}

pub fn generate(args: GenerateArgs) -> Result<String> {
    match args.item {
        GenerateItem::Seed => {
            let seed = Seed::generate().context("could not generate a seed")?;
            Ok(seed.to_hex())
        }
    }
}

pub fn derive(args: DeriveArgs, settings: &Settings) -> Result<String> {
    match args.item {
        DeriveItem::Secret { from, index } => {
            let seed = Seed::from_hex(&from)?;
            Ok(seed.derive_secret_key(index).to_hex())
        }
        DeriveItem::Public { from } => Ok(derive_public_key(&from)?.to_hex()),
        DeriveItem::Address { from, .. } => {
            let public_key = PublicKey::from_hex(&from)?;
            Ok(derive_address(&public_key, settings.prefix))
        }
    }
}
