//! CLI commands module.
//!
//! Commands read `nanokit <command> <item> [options]`. Each one produces
//! a single result that is printed to stdout.

use anyhow::Result;
use clap::Subcommand;

use crate::config::{Overrides, Settings};

mod block;
mod check;
mod convert;
mod keys;
mod signature;
mod work;

#[derive(Subcommand)]
pub enum Commands {
    /// Check a seed, amount, hash, key, address, work or signature
    Check(check::CheckArgs),
    /// Convert an amount between units
    Convert(convert::ConvertArgs),
    /// Compute a work
    Compute(work::ComputeArgs),
    /// Validate a work
    Validate(work::ValidateArgs),
    /// Sign a block hash
    Sign(signature::SignArgs),
    /// Verify a block signature
    Verify(signature::VerifyArgs),
    /// Generate a seed
    Generate(keys::GenerateArgs),
    /// Derive a secret key, public key or address
    Derive(keys::DeriveArgs),
    /// Hash a state block
    Hash(block::HashArgs),
    /// Create a signed state block
    Create(block::CreateArgs),
}

impl Commands {
    /// Settings given as flags of this command.
    pub fn overrides(&self) -> Overrides {
        match self {
            Commands::Compute(args) => args.overrides(),
            Commands::Validate(args) => args.overrides(),
            Commands::Derive(args) => args.overrides(),
            _ => Overrides::default(),
        }
    }
}

/// Run a command and return what it would print.
pub async fn execute(cmd: Commands, settings: &Settings) -> Result<String> {
    match cmd {
        Commands::Check(args) => Ok(check::run(args)),
        Commands::Convert(args) => convert::run(args),
        Commands::Compute(args) => work::compute(args, settings).await,
        Commands::Validate(args) => work::validate(args, settings),
        Commands::Sign(args) => signature::sign(args),
        Commands::Verify(args) => signature::verify(args),
        Commands::Generate(args) => keys::generate(args),
        Commands::Derive(args) => keys::derive(args, settings),
        Commands::Hash(args) => block::hash(args),
        Commands::Create(args) => block::create(args),
    }
}

pub async fn run(cmd: Commands, settings: &Settings) -> Result<()> {
    let output = execute(cmd, settings).await?;
    println!("{}", output);
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testing::{parse, run_args};
    use super::*;

    #[test]
    fn test_overrides_from_flags() {
        let cmd = parse(&["compute", "work", "--hash", "00", "--threads", "3"]);
        assert_eq!(cmd.overrides().threads, Some(3));

        let cmd = parse(&["derive", "address", "--from", "00", "--nano-prefix"]);
        assert_eq!(cmd.overrides().nano_prefix, Some(true));

        let cmd = parse(&["check", "seed", "--candidate", "00"]);
        assert_eq!(cmd.overrides(), Overrides::default());
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let err = run_args(&["sign", "block", "--secret", "00", "--hash", "00"])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("hash"));
    }
}
