//! Writer Configuration
//!
//! This module defines configuration for the coalescing write path.
//!
//! ## WriterConfig
//!
//! Controls ring sizing and shuttle diagnostics:
//!
//! - **capacity**: Ring buffer size in bytes; producers block once this much
//!   is buffered but not yet extracted (default: 4MB)
//! - **max_block**: Largest single copy admitted into the ring; longer writes
//!   are split into consecutive sub-writes of at most this size (default: 4MB)
//! - **trace_drains**: Emit a trace event per shuttle drain pass with chunk
//!   size and wait time (default: off)
//!
//! ## Usage
//!
//! ```ignore
//! use shuttlebuf::WriterConfig;
//!
//! // Small ring for tests: forces wraparound and backpressure quickly
//! let config = WriterConfig {
//!     capacity: 64 * 1024,
//!     max_block: 16 * 1024,
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Ring buffer capacity in bytes (default: 4MB)
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Maximum bytes copied into the ring in one sub-write (default: 4MB).
    /// Must not exceed `capacity`, or a sub-write could never fit.
    #[serde(default = "default_max_block")]
    pub max_block: usize,

    /// Emit per-drain trace events (default: false)
    #[serde(default)]
    pub trace_drains: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            max_block: default_max_block(),
            trace_drains: false,
        }
    }
}

impl WriterConfig {
    /// Check the invariants the write path depends on.
    ///
    /// `0 < max_block <= capacity` guarantees that a single sub-write always
    /// fits the ring, so a producer waiting for space always wakes once the
    /// shuttle has drained.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("capacity must be non-zero".to_string()));
        }
        if self.max_block == 0 {
            return Err(Error::InvalidConfig("max_block must be non-zero".to_string()));
        }
        if self.max_block > self.capacity {
            return Err(Error::InvalidConfig(format!(
                "max_block ({}) must not exceed capacity ({})",
                self.max_block, self.capacity
            )));
        }
        Ok(())
    }
}

fn default_capacity() -> usize {
    4 * 1024 * 1024 // 4MB
}

fn default_max_block() -> usize {
    4 * 1024 * 1024 // 4MB
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = WriterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.capacity, 4 * 1024 * 1024);
        assert_eq!(config.max_block, 4 * 1024 * 1024);
        assert!(!config.trace_drains);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = WriterConfig {
            capacity: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_max_block_rejected() {
        let config = WriterConfig {
            max_block: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_max_block_larger_than_capacity_rejected() {
        let config = WriterConfig {
            capacity: 1024,
            max_block: 2048,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_small_ring_config_accepted() {
        let config = WriterConfig {
            capacity: 64,
            max_block: 64,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
