//! # Pool Configuration
//!
//! Pool dimensions can be built in code or loaded from TOML:
//!
//! ```toml
//! slot_size = 32
//! slot_count = 4
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PoolError, PoolResult};

/// Dimensions of a block pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    /// Size of each block in bytes. Must be non-zero.
    pub slot_size: usize,
    /// Number of blocks. Must be non-zero.
    pub slot_count: usize,
}

impl PoolConfig {
    /// Default block size in bytes.
    pub const DEFAULT_SLOT_SIZE: usize = 32;

    /// Default number of blocks.
    pub const DEFAULT_SLOT_COUNT: usize = 4;

    /// Creates a config. Not validated until [`PoolConfig::validate`].
    #[inline]
    #[must_use]
    pub const fn new(slot_size: usize, slot_count: usize) -> Self {
        Self {
            slot_size,
            slot_count,
        }
    }

    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidConfig`] on malformed TOML or unknown keys, plus
    /// the errors of [`PoolConfig::validate`].
    pub fn from_toml_str(text: &str) -> PoolResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| PoolError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidConfig`] if the file cannot be read, plus the
    /// errors of [`PoolConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> PoolResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PoolError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Serializes the config as TOML.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidConfig`] if serialization fails.
    pub fn to_toml_string(&self) -> PoolResult<String> {
        toml::to_string(self).map_err(|e| PoolError::InvalidConfig(e.to_string()))
    }

    /// Rejects zero dimensions.
    ///
    /// # Errors
    ///
    /// [`PoolError::ZeroSlotSize`] or [`PoolError::ZeroSlotCount`].
    pub fn validate(&self) -> PoolResult<()> {
        if self.slot_size == 0 {
            return Err(PoolError::ZeroSlotSize);
        }
        if self.slot_count == 0 {
            return Err(PoolError::ZeroSlotCount);
        }
        Ok(())
    }

    /// Arena size in bytes, or `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn arena_bytes(&self) -> Option<usize> {
        self.slot_size.checked_mul(self.slot_count)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SLOT_SIZE, Self::DEFAULT_SLOT_COUNT)
    }
}
