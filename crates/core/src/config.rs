//! Configuration for address space construction and inspection.
//!
//! This module defines the configuration structures used to parameterize a session. It provides:
//! 1. **Defaults:** Baseline values (base address, size, stack reserve, dump length).
//! 2. **Structures:** `MemoryConfig` and `InspectorConfig` grouped under `Config`.
//! 3. **Loading:** JSON deserialization from a string or a file.
//!
//! Every field is optional in JSON; missing fields take the values in `defaults`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::common::MemoryError;
use crate::diag::SharedSink;
use crate::mem::AddressSpace;

/// Default configuration constants.
mod defaults {
    use crate::common::constants::DEFAULT_STACK_SIZE;

    /// Base virtual address of the address space (absolute addressing).
    pub const BASE_VADDR: u32 = 0;

    /// Size of the address space (1 MiB).
    pub const SIZE: usize = 1024 * 1024;

    /// Stack reserve above the highest loaded section (64 KiB).
    pub const STACK_SIZE: u32 = DEFAULT_STACK_SIZE;

    /// Maximum number of lines a dump emits.
    pub const MAX_LINES: usize = 64;
}

/// Errors raised while reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("could not read config '{}': {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The JSON was malformed or had wrongly typed fields.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use rv32mem_core::config::Config;
///
/// let json = r#"{ "memory": { "base_vaddr": 65536, "size": 4096 } }"#;
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.memory.base_vaddr, 0x10000);
/// assert_eq!(config.memory.size, 4096);
/// assert_eq!(config.inspector.max_lines, 64);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Address space geometry.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Dump settings.
    #[serde(default)]
    pub inspector: InspectorConfig,
}

impl Config {
    /// Parses a JSON configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, [`ConfigError::Parse`] if it is malformed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

/// Address space geometry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemoryConfig {
    /// Virtual address of the first byte
    #[serde(default = "MemoryConfig::default_base_vaddr")]
    pub base_vaddr: u32,

    /// Size in bytes
    #[serde(default = "MemoryConfig::default_size")]
    pub size: usize,

    /// Stack reserve above the program when the layout is planned from an image
    #[serde(default = "MemoryConfig::default_stack_size")]
    pub stack_size: u32,
}

impl MemoryConfig {
    /// Returns the default base virtual address.
    const fn default_base_vaddr() -> u32 {
        defaults::BASE_VADDR
    }

    /// Returns the default size in bytes.
    const fn default_size() -> usize {
        defaults::SIZE
    }

    /// Returns the default stack reserve in bytes.
    const fn default_stack_size() -> u32 {
        defaults::STACK_SIZE
    }

    /// Builds an address space with this geometry, reporting to `sink`.
    ///
    /// # Errors
    ///
    /// Any construction error of [`AddressSpace::with_sink`].
    pub fn build(&self, sink: SharedSink) -> Result<AddressSpace, MemoryError> {
        AddressSpace::with_sink(self.size, self.base_vaddr, sink)
    }

    /// Builds an address space with this geometry that reports through `tracing`.
    ///
    /// # Errors
    ///
    /// Any construction error of [`AddressSpace::with_sink`].
    pub fn build_default(&self) -> Result<AddressSpace, MemoryError> {
        self.build(Arc::new(crate::diag::TracingSink))
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            base_vaddr: defaults::BASE_VADDR,
            size: defaults::SIZE,
            stack_size: defaults::STACK_SIZE,
        }
    }
}

/// Dump settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InspectorConfig {
    /// Maximum number of lines a dump emits
    #[serde(default = "InspectorConfig::default_max_lines")]
    pub max_lines: usize,
}

impl InspectorConfig {
    /// Returns the default line cap.
    const fn default_max_lines() -> usize {
        defaults::MAX_LINES
    }
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            max_lines: defaults::MAX_LINES,
        }
    }
}
