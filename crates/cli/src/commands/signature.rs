//! Signing and verification commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use nanokit_core::{BlockHash, PublicKey, SecretKey, Signature};

#[derive(Args)]
pub struct SignArgs {
    #[command(subcommand)]
    item: SignItem,
}

#[derive(Subcommand)]
enum SignItem {
    /// Sign a block
    Block {
        /// Secret key to sign the block with
        #[arg(long)]
        secret: String,

        /// Hash of the block to sign
        #[arg(long)]
        hash: String,
    },
}

#[derive(Args)]
pub struct VerifyArgs {
    #[command(subcommand)]
    item: VerifyItem,
}

#[derive(Subcommand)]
enum VerifyItem {
    /// Verify a block
    Block {
        /// Public key to verify the signature against
        #[arg(long)]
        public: String,

        /// Hash of the block to verify
        #[arg(long)]
        hash: String,

        /// Signature to verify
        #[arg(long)]
        signature: String,
    },
}

pub fn sign(args: SignArgs) -> Result<String> {
    let SignItem::Block { secret, hash } = args.item;
    let hash = BlockHash::from_hex(&hash)?;
    let secret_key = SecretKey::from_hex(&secret)?;
    Ok(secret_key.sign(&hash).to_hex())
}

pub fn verify(args: VerifyArgs) -> Result<String> {
    let VerifyItem::Block {
        public,
        hash,
        signature,
    } = args.item;
    let hash = BlockHash::from_hex(&hash)?;
    let signature = Signature::from_hex(&signature)?;
    let public_key = PublicKey::from_hex(&public)?;
    Ok(public_key.verify(&hash, &signature).to_string())
}

#[cfg(test)]
mod tests {
    use crate::commands::testing::run_args;

    const SECRET: &str = "0000000000000000000000000000000000000000000000000000000000000001";
    const PUBLIC: &str = "C969EC348895A49E21824E10E6B829EDEA50CCC26A83CE8986A3B95D12576058";
    const HASH: &str = "F47B23107E5F34B2CE06F562B5C435DF72A533251CB414C51B2B62A8F63A00E4";
    const SIGNATURE: &str = "5974324F8CC42DA56F62FC212A17886BDCB18DE363D04DA84EEDC99CB4A33919D14A2CF9DE9D534FAA6D0B91D01F0622205D898293525E692586C84F2DCF9208";

    #[tokio::test]
    async fn test_sign_block() {
        let output = run_args(&["sign", "block", "--secret", SECRET, "--hash", HASH])
            .await
            .unwrap();
        assert_eq!(output, SIGNATURE);
    }

    #[tokio::test]
    async fn test_verify_block() {
        let output = run_args(&[
            "verify",
            "block",
            "--public",
            PUBLIC,
            "--hash",
            HASH,
            "--signature",
            SIGNATURE,
        ])
        .await
        .unwrap();
        assert_eq!(output, "true");

        let other_hash = HASH.replacen('F', "E", 1);
        let output = run_args(&[
            "verify",
            "block",
            "--public",
            PUBLIC,
            "--hash",
            &other_hash,
            "--signature",
            SIGNATURE,
        ])
        .await
        .unwrap();
        assert_eq!(output, "false");
    }

    #[tokio::test]
    async fn test_verify_checks_signature_before_key() {
        let err = run_args(&[
            "verify",
            "block",
            "--public",
            "bad",
            "--hash",
            HASH,
            "--signature",
            "bad",
        ])
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "signature is not valid");
    }
}
