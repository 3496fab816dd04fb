//! Error types for FlowPress operations.
//!
//! The taxonomy keeps "the data is corrupt" apart from "the disk or network
//! failed": capability construction, corrupt compressed input, source reads
//! and sink writes each have their own variant, so callers can react to
//! each without inspecting messages.

use crate::session::SessionState;
use std::io;
use thiserror::Error;

/// The main error type for FlowPress operations.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The codec capability could not be constructed (bad level, backend
    /// refused to allocate its context, ...). No bytes were processed.
    #[error("Codec {codec} could not be initialized: {message}")]
    CapabilityInit {
        /// Name of the codec.
        codec: String,
        /// Description of the failure.
        message: String,
    },

    /// The compressed input cannot be decoded: malformed, truncated, or
    /// followed by trailing bytes.
    #[error("Corrupt stream at offset {offset}: {message}")]
    CorruptStream {
        /// Compressed byte offset where the problem was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Reading from the input source failed.
    #[error("Source read failed: {0}")]
    SourceRead(#[source] io::Error),

    /// Writing to the output sink failed.
    #[error("Sink write failed: {0}")]
    SinkWrite(#[source] io::Error),

    /// The encoder reported an internal failure.
    #[error("Codec {codec} failed: {message}")]
    Codec {
        /// Name of the codec.
        codec: String,
        /// Description of the failure.
        message: String,
    },

    /// Stream configuration rejected before a session was created.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// An operation was attempted on a session that cannot accept it.
    #[error("Cannot {operation} a session in state {state}")]
    SessionState {
        /// State the session was in.
        state: SessionState,
        /// The rejected operation.
        operation: &'static str,
    },

    /// A background stream task panicked or was cancelled before reporting.
    #[error("Stream task did not complete: {message}")]
    Task {
        /// Description from the task runtime.
        message: String,
    },
}

/// Result type alias for FlowPress operations.
pub type Result<T> = std::result::Result<T, FlowError>;

impl FlowError {
    /// Create a capability initialization error.
    pub fn capability_init(codec: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CapabilityInit {
            codec: codec.into(),
            message: message.into(),
        }
    }

    /// Create a corrupt stream error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptStream {
            offset,
            message: message.into(),
        }
    }

    /// Create an encoder failure error.
    pub fn codec(codec: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Codec {
            codec: codec.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a session state error.
    pub fn session_state(state: SessionState, operation: &'static str) -> Self {
        Self::SessionState { state, operation }
    }

    /// True when the compressed data itself is at fault.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptStream { .. })
    }

    /// True when a source or sink failed.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::SourceRead(_) | Self::SinkWrite(_))
    }
}
