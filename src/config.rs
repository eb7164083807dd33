//! Run configuration.
//!
//! A run is described by a [`RunConfig`]. It can be loaded from a YAML file:
//!
//! ```yaml
//! input: vector_data.csv
//! output: vector_stats_out
//! block_size: 65536
//! transform: column-sum
//! delimiter: ","
//! ```
//!
//! Every key is optional; missing keys take the defaults from
//! [`RunConfig::default`]. Command-line flags (see [`crate::args::RunArgs`])
//! override values from the file.

use block_ingest_file::DEFAULT_BLOCK_SIZE;
use block_ingest_transform::{ColumnSum, Passthrough, Transform};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Input file read when none is configured
pub const DEFAULT_INPUT: &str = "vector_data.csv";

/// Output file written when none is configured
pub const DEFAULT_OUTPUT: &str = "vector_stats_out";

/// Error type for configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid block size {0}: must be greater than zero")]
    InvalidBlockSize(usize),

    #[error("invalid delimiter {0:?}: must be a single ASCII character")]
    InvalidDelimiter(char),
}

/// Which transform to apply to the assembled buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TransformKind {
    /// Sum delimited integer rows column by column
    #[default]
    ColumnSum,
    /// Copy the input unchanged
    Passthrough,
}

impl TransformKind {
    pub fn build(self, delimiter: u8) -> Box<dyn Transform> {
        match self {
            TransformKind::ColumnSum => Box::new(ColumnSum::new().with_delimiter(delimiter)),
            TransformKind::Passthrough => Box::new(Passthrough),
        }
    }
}

/// Everything needed for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Bytes requested per read
    pub block_size: usize,
    pub transform: TransformKind,
    /// Field separator used by `column-sum`
    pub delimiter: char,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            block_size: DEFAULT_BLOCK_SIZE,
            transform: TransformKind::default(),
            delimiter: ',',
        }
    }
}

impl RunConfig {
    /// Load a run configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a run configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::InvalidBlockSize(self.block_size));
        }
        self.delimiter_byte()?;
        Ok(())
    }

    /// The delimiter as a single byte
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or(ConfigError::InvalidDelimiter(self.delimiter))
    }

    pub fn build_transform(&self) -> Result<Box<dyn Transform>, ConfigError> {
        Ok(self.transform.build(self.delimiter_byte()?))
    }
}
