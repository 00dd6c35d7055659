//! TOML configuration file support.
//!
//! Instead of passing many CLI flags, the demo scan and the store behaviour can
//! be described in a config file. Flags given on the command line win.
//!
//! ```toml
//! # mrdstore.toml
//! [demo]
//! repetitions = 2
//! lines = 128
//! samples = 256
//! channels = 8
//! dataset = "dataset"
//!
//! [store]
//! sync = "every_record"
//! create_parent_dirs = true
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use mrdstore::store::StoreConfig;

/// Root configuration structure for mrdstore.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Demo scan geometry.
    #[serde(default)]
    pub demo: DemoConfig,

    /// Store behaviour.
    #[serde(default)]
    pub store: StoreConfig,
}

/// Configuration for the demo command.
#[derive(Debug, Default, Deserialize)]
pub struct DemoConfig {
    /// Number of repetitions.
    pub repetitions: Option<u32>,

    /// Phase encoding lines per repetition.
    pub lines: Option<u32>,

    /// Readout samples per line.
    pub samples: Option<u32>,

    /// Receiver channels.
    pub channels: Option<u32>,

    /// Dataset label.
    pub dataset: Option<String>,
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
}
