use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use seqfeed_core::DatasetError;

use crate::collection::Label;
use crate::consts::{DEFAULT_BATCH_SIZE, DEFAULT_SEED};

fn default_endless() -> bool {
    true
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

///
/// TOML description of a labeled FASTA dataset.
///
/// ```toml
/// fa_files = ["pos.fa", "neg.fa.gz"]
/// labels = [1, 0]
/// endless = false   # optional, default true
/// batch_size = 128  # optional, default 512
/// seed = 7          # optional, default 0
/// ```
///
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct DatasetConfig {
    pub fa_files: Vec<PathBuf>,
    pub labels: Vec<Label>,
    #[serde(default = "default_endless")]
    pub endless: bool,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

#[derive(Error, Debug)]
pub enum DatasetConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type DatasetConfigResult<T> = std::result::Result<T, DatasetConfigError>;

impl From<DatasetConfigError> for DatasetError {
    fn from(err: DatasetConfigError) -> Self {
        DatasetError::Configuration(err.to_string())
    }
}

impl DatasetConfig {
    /// Make relative `fa_files` relative to `base` instead of the working directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in self.fa_files.iter_mut() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

impl TryFrom<&Path> for DatasetConfig {
    type Error = DatasetConfigError;

    fn try_from(value: &Path) -> DatasetConfigResult<Self> {
        let toml_str = read_to_string(value)?;
        let mut config: DatasetConfig = toml::from_str(&toml_str)?;

        if let Some(base) = value.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }
}
