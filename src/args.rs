//! CLI argument definitions for a pipeline run.

use crate::config::{ConfigError, RunConfig, TransformKind};
use clap::Args;
use std::path::PathBuf;

/// Options for `block-ingest run`.
///
/// Each option falls back to its environment variable, then to the YAML file
/// given by `--config`, then to the built-in default.
#[derive(Args, Clone, Debug, Default)]
pub struct RunArgs {
    /// YAML file with run settings
    #[arg(long, short = 'c', value_name = "PATH", env = "BLOCK_INGEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// File to read (default: vector_data.csv)
    #[arg(long, short = 'i', value_name = "PATH", env = "BLOCK_INGEST_INPUT")]
    pub input: Option<PathBuf>,

    /// File to create or overwrite (default: vector_stats_out)
    #[arg(long, short = 'o', value_name = "PATH", env = "BLOCK_INGEST_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Bytes requested per read (default: 65536)
    #[arg(long, env = "BLOCK_INGEST_BLOCK_SIZE")]
    pub block_size: Option<usize>,

    /// Transform applied before writing (default: column-sum)
    #[arg(long, value_enum, env = "BLOCK_INGEST_TRANSFORM")]
    pub transform: Option<TransformKind>,

    /// Field separator for column-sum (default: ,)
    #[arg(long, env = "BLOCK_INGEST_DELIMITER")]
    pub delimiter: Option<char>,
}

impl RunArgs {
    /// Merge flags over the config file (if any) and validate the result.
    pub fn resolve(&self) -> Result<RunConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };

        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(block_size) = self.block_size {
            config.block_size = block_size;
        }
        if let Some(transform) = self.transform {
            config.transform = transform;
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }

        config.validate()?;
        Ok(config)
    }
}
