//! Stream configuration: chunk capacities and compression level.

use crate::error::{FlowError, Result};
use crate::traits::CompressionLevel;

/// Default capacity of each chunk buffer (16 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Largest chunk capacity accepted by [`StreamConfig::validate`].
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Parameters for one codec session.
///
/// The two capacities bound the memory a session holds regardless of how
/// much data flows through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct StreamConfig {
    /// Capacity of the input staging buffer (bytes read from the source per step).
    pub input_capacity: usize,
    /// Capacity of the output staging buffer (bytes drained to the sink per step).
    pub output_capacity: usize,
    /// Compression level used when creating encoders.
    pub level: CompressionLevel,
}

impl StreamConfig {
    /// Create a configuration with default capacities and level.
    pub fn new() -> Self {
        Self {
            input_capacity: DEFAULT_CHUNK_SIZE,
            output_capacity: DEFAULT_CHUNK_SIZE,
            level: CompressionLevel::DEFAULT,
        }
    }

    /// Set both buffer capacities.
    pub fn with_capacity(self, capacity: usize) -> Self {
        Self {
            input_capacity: capacity,
            output_capacity: capacity,
            ..self
        }
    }

    /// Set the input buffer capacity.
    pub fn with_input_capacity(self, input_capacity: usize) -> Self {
        Self {
            input_capacity,
            ..self
        }
    }

    /// Set the output buffer capacity.
    pub fn with_output_capacity(self, output_capacity: usize) -> Self {
        Self {
            output_capacity,
            ..self
        }
    }

    /// Set the compression level.
    pub fn with_level(self, level: impl Into<CompressionLevel>) -> Self {
        Self {
            level: level.into(),
            ..self
        }
    }

    /// Check that both capacities are usable.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("input_capacity", self.input_capacity),
            ("output_capacity", self.output_capacity),
        ] {
            if value == 0 {
                return Err(FlowError::invalid_config(format!("{name} must be non-zero")));
            }
            if value > MAX_CHUNK_SIZE {
                return Err(FlowError::invalid_config(format!(
                    "{name} {value} exceeds maximum {MAX_CHUNK_SIZE}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::new()
    }
}
