//! Configuration for file-backed volumes.

use crate::error::{VolumeError, VolumeResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration for the file-backed volume backend.
///
/// All fields have defaults matching the emulated device contract:
/// 200 MiB of addressable storage per volume with a 128 KiB single-I/O
/// ceiling, backed by flat files in the current directory.
#[derive(Debug, Clone, Deserialize)]
pub struct VolumeConfig {
    /// Directory holding the backing files.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Logical size of each volume in bytes.
    /// Default: 200 MiB (209,715,200)
    #[serde(default = "default_capacity")]
    pub capacity: u64,

    /// Largest single transfer a caller may submit, in bytes.
    /// Default: 128 KiB (131,072)
    #[serde(default = "default_max_io_size")]
    pub max_io_size: u32,
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_capacity() -> u64 {
    200 * 1024 * 1024
}

fn default_max_io_size() -> u32 {
    128 * 1024
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            capacity: default_capacity(),
            max_io_size: default_max_io_size(),
        }
    }
}

impl VolumeConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> VolumeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| VolumeError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the directory holding the backing files.
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Set the volume capacity in bytes.
    pub fn capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the maximum single-transfer size in bytes.
    pub fn max_io_size(mut self, max_io_size: u32) -> Self {
        self.max_io_size = max_io_size;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> VolumeResult<()> {
        if self.capacity == 0 {
            return Err(VolumeError::InvalidConfig(
                "capacity must be non-zero".to_string(),
            ));
        }
        if self.max_io_size == 0 {
            return Err(VolumeError::InvalidConfig(
                "max_io_size must be non-zero".to_string(),
            ));
        }
        if u64::from(self.max_io_size) > self.capacity {
            return Err(VolumeError::InvalidConfig(format!(
                "max_io_size {} exceeds capacity {}",
                self.max_io_size, self.capacity
            )));
        }
        Ok(())
    }
}
