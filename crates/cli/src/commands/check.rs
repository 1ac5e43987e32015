//! Format check command.

use clap::{Args, Subcommand};
use nanokit_core::check;

#[derive(Args)]
pub struct CheckArgs {
    #[command(subcommand)]
    item: CheckItem,
}

#[derive(Subcommand)]
enum CheckItem {
    /// Check a seed
    Seed(Candidate),
    /// Check an amount
    Amount(Candidate),
    /// Check a hash
    Hash(Candidate),
    /// Check a public or secret key
    Key(Candidate),
    /// Check an address
    Address(Candidate),
    /// Check a work
    Work(Candidate),
    /// Check a signature
    Signature(Candidate),
}

#[derive(Args)]
struct Candidate {
    /// Candidate to check
    #[arg(long, allow_hyphen_values = true)]
    candidate: String,
}

pub fn run(args: CheckArgs) -> String {
    let valid = match args.item {
        CheckItem::Seed(c) => check::check_seed(&c.candidate),
        CheckItem::Amount(c) => check::check_amount(&c.candidate),
        CheckItem::Hash(c) => check::check_hash(&c.candidate),
        CheckItem::Key(c) => check::check_key(&c.candidate),
        CheckItem::Address(c) => check::check_address(&c.candidate),
        CheckItem::Work(c) => check::check_work(&c.candidate),
        CheckItem::Signature(c) => check::check_signature(&c.candidate),
    };
    valid.to_string()
}

#[cfg(test)]
mod tests {
    use crate::commands::testing::run_args;

    #[tokio::test]
    async fn test_check_items() {
        let cases = [
            (
                "seed",
                "E73D16E75D58D89B07B90B784D6308E5AF52DB34E2D43662E8C30F9745A4B36D",
                "true",
            ),
            ("amount", "0100", "false"),
            ("amount", "1000", "true"),
            ("amount", "-1", "false"),
            ("hash", "abc", "false"),
            (
                "address",
                "xrb_3ebgfe344ccuisthh5x5u5fq5z3j6wi9i38kzp7yrqznyr48gahock1rsnbn",
                "true",
            ),
            ("work", "0000000000010600", "true"),
            ("signature", "0000000000010600", "false"),
        ];
        for (item, candidate, expected) in cases {
            let output = run_args(&["check", item, "--candidate", candidate])
                .await
                .unwrap();
            assert_eq!(output, expected, "{item} {candidate}");
        }
    }
}
