//! Settings shared by the commands.
//!
//! Values come from three layers: built-in defaults, an optional JSON
//! file, and command-line flags. Each layer overrides the one before it.

use anyhow::{Context, Result};
use nanokit_core::{Prefix, Threshold};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::commands::Commands;

/// Contents of the `--config` file. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Work search threads.
    pub threads: Option<usize>,
    /// Work threshold, 16 hex digits.
    pub threshold: Option<Threshold>,
    /// Use the `nano_` address prefix instead of `xrb_`.
    pub nano_prefix: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// Values given explicitly on the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Overrides {
    pub threads: Option<usize>,
    pub threshold: Option<Threshold>,
    pub nano_prefix: Option<bool>,
}

impl Overrides {
    pub fn from_command(command: &Commands) -> Self {
        command.overrides()
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub threads: usize,
    pub threshold: Threshold,
    pub prefix: Prefix,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            threads: std::thread::available_parallelism().map_or(1, usize::from),
            threshold: Threshold::DEFAULT,
            prefix: Prefix::Xrb,
        }
    }
}

impl Settings {
    pub fn resolve(file: &FileConfig, overrides: &Overrides) -> Self {
        let defaults = Self::default();
        let nano_prefix = overrides.nano_prefix.or(file.nano_prefix).unwrap_or(false);

        Self {
            threads: overrides
                .threads
                .or(file.threads)
                .unwrap_or(defaults.threads)
                .max(1),
            threshold: overrides
                .threshold
                .or(file.threshold)
                .unwrap_or(defaults.threshold),
            prefix: if nano_prefix {
                Prefix::Nano
            } else {
                defaults.prefix
            },
        }
    }
}
