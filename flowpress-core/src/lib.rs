//! # FlowPress Core
//!
//! Core components for the FlowPress streaming compression engine.
//!
//! This crate provides the orchestration around an opaque codec:
//!
//! - [`traits`]: The [`Codec`] capability trait and compression levels
//! - [`buffer`]: Fixed-capacity input/output staging buffers
//! - [`session`]: The codec session state machine
//! - [`stream`]: The adapter that drives a session from a source to a sink
//! - [`config`]: Chunk capacities and level
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Surface                                             │
//! │     compress_stream / decompress_stream, CLI            │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec capabilities                                  │
//! │     zlib (flate2), Zstandard (zstd)                     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Streaming engine (this crate)                       │
//! │     ChunkBuffers, CodecSession, StreamAdapter           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Memory use is bounded by the two buffer capacities in [`StreamConfig`],
//! independent of how much data flows through a session.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
pub mod config;
pub mod error;
pub mod session;
pub mod stream;
pub mod traits;

#[cfg(feature = "async-io")]
pub mod async_io;

// Re-exports for convenience
pub use buffer::ChunkBuffers;
pub use config::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE, StreamConfig};
pub use error::{FlowError, Result};
pub use session::{CodecSession, SessionState, StreamSummary};
pub use stream::StreamAdapter;
pub use traits::{Codec, CompressionLevel, Flush, Mode, Step, StepStatus};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::StreamConfig;
    pub use crate::error::{FlowError, Result};
    pub use crate::session::{CodecSession, SessionState, StreamSummary};
    pub use crate::stream::StreamAdapter;
    pub use crate::traits::{Codec, CompressionLevel, Flush, Mode, Step};
}
