//! TOML settings file for the convert command.
//!
//! ```toml
//! # igornx.toml
//! [conversion]
//! unknown_records = "skip"   # or "error" (default)
//! parallel = true
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use igornx::archive::RecordPolicy;
use igornx::entry::RunSettings;

/// Root configuration structure for igornx.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Conversion-specific settings.
    #[serde(default)]
    pub conversion: ConversionConfig,
}

/// Configuration for the convert command.
#[derive(Debug, Default, Deserialize)]
pub struct ConversionConfig {
    /// Handling of undefined archive record kinds.
    pub unknown_records: Option<RecordPolicy>,

    /// Decode single-wave files in parallel (requires the parallel feature).
    pub parallel: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Run settings from this file; flags given on the command line win.
    pub fn run_settings(&self, skip_unknown_records: bool, parallel: bool) -> RunSettings {
        let unknown_records = if skip_unknown_records {
            RecordPolicy::Skip
        } else {
            self.conversion.unknown_records.unwrap_or_default()
        };
        RunSettings {
            unknown_records,
            parallel: parallel || self.conversion.parallel.unwrap_or(false),
        }
    }
}
