//! Work computation and validation commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use nanokit_core::{validate_work, BlockHash, Threshold, Work};
use nanokit_work::WorkEngine;
use tracing::info;

use crate::config::{Overrides, Settings};

#[derive(Args)]
pub struct ComputeArgs {
    #[command(subcommand)]
    item: ComputeItem,
}

#[derive(Subcommand)]
enum ComputeItem {
    /// Compute a work
    Work {
        /// Block hash to compute a work for
        #[arg(long)]
        hash: String,

        /// Work threshold, 16 hex digits
        #[arg(long)]
        threshold: Option<Threshold>,

        /// Index of this worker
        #[arg(long, default_value_t = 0)]
        worker_index: u32,

        /// Number of workers sharing the nonce space
        #[arg(long, default_value_t = 1)]
        worker_count: u32,

        /// Search threads for this worker
        #[arg(long, env = "NANOKIT_THREADS")]
        threads: Option<usize>,
    },
}

impl ComputeArgs {
    pub fn overrides(&self) -> Overrides {
        match &self.item {
            ComputeItem::Work {
                threshold, threads, ..
            } => Overrides {
                threads: *threads,
                threshold: *threshold,
                nano_prefix: None,
            },
        }
    }
}

#[derive(Args)]
pub struct ValidateArgs {
    #[command(subcommand)]
    item: ValidateItem,
}

#[derive(Subcommand)]
enum ValidateItem {
    /// Validate a work
    Work {
        /// Block hash to validate the work against
        #[arg(long)]
        hash: String,

        /// Work to validate
        #[arg(long)]
        work: String,

        /// Work threshold, 16 hex digits
        #[arg(long)]
        threshold: Option<Threshold>,
    },
}

impl ValidateArgs {
    pub fn overrides(&self) -> Overrides {
        match &self.item {
            ValidateItem::Work { threshold, .. } => Overrides {
                threshold: *threshold,
                ..Overrides::default()
            },
        }
    }
}

pub async fn compute(args: ComputeArgs, settings: &Settings) -> Result<String> {
    let ComputeItem::Work {
        hash,
        worker_index,
        worker_count,
        ..
    } = args.item;
    let hash = BlockHash::from_hex(&hash)?;

    info!(
        threads = settings.threads,
        threshold = %settings.threshold,
        "Computing work"
    );
    let engine = WorkEngine::threaded(settings.threads);
    let work = engine
        .compute_work(hash, worker_index, worker_count, settings.threshold)
        .await
        .context("work computation failed")?;

    Ok(match work {
        Some(work) => work.to_hex(),
        None => "null".to_string(),
    })
}

pub fn validate(args: ValidateArgs, settings: &Settings) -> Result<String> {
    let ValidateItem::Work { hash, work, .. } = args.item;
    let hash = BlockHash::from_hex(&hash)?;
    let work = Work::from_hex(&work)?;
    Ok(validate_work(&hash, &work, settings.threshold).to_string())
}
