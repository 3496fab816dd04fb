//! # FlowPress Codec
//!
//! Concrete codec capabilities and the streaming compress/decompress API.
//!
//! ## Formats
//!
//! | Format | Backend | Integrity check |
//! |--------|---------|-----------------|
//! | zlib   | `flate2` | Adler-32 |
//! | Zstandard | `zstd` (libzstd) | XXH64 content checksum |
//!
//! ## Example
//!
//! ```rust
//! use flowpress_codec::{CompressionLevel, compress_stream, decompress_stream};
//! use std::io::Cursor;
//!
//! let data = b"Hello, FlowPress! Hello, FlowPress!".repeat(100);
//!
//! let mut compressed = Vec::new();
//! compress_stream(Cursor::new(&data), &mut compressed, CompressionLevel::DEFAULT).unwrap();
//!
//! let mut restored = Vec::new();
//! decompress_stream(Cursor::new(&compressed), &mut restored).unwrap();
//! assert_eq!(restored, data);
//! ```
//!
//! Memory is bounded by the buffer capacities in [`StreamConfig`]; the
//! one-call functions use 16 KiB buffers on each side.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod format;
pub mod lifecycle;
pub mod zlib;
#[cfg(feature = "zstd")]
pub mod zstandard;

pub use flowpress_core::{
    CompressionLevel, FlowError, Result, SessionState, StreamConfig, StreamSummary,
};
pub use format::{BoxedCodec, Format};
pub use lifecycle::{BackendInfo, backends, init, is_initialized, shutdown};
pub use zlib::{ZlibDecoder, ZlibEncoder};
#[cfg(feature = "zstd")]
pub use zstandard::{ZstdDecoder, ZstdEncoder};

use flowpress_core::{CodecSession, StreamAdapter};
use std::io::{Read, Write};

/// Build a compressing session for `format` using `config`'s level.
pub fn compressor(format: Format, config: &StreamConfig) -> Result<CodecSession<BoxedCodec>> {
    let codec = format.encoder(config.level)?;
    CodecSession::new(codec, config)
}

/// Build a decompressing session for `format`.
pub fn decompressor(format: Format, config: &StreamConfig) -> Result<CodecSession<BoxedCodec>> {
    let codec = format.decoder()?;
    CodecSession::new(codec, config)
}

/// Compress everything `source` yields into `sink` as a zlib stream.
///
/// Reads until end of input, then finishes the stream and flushes `sink`.
/// On error, whatever was already written stays in `sink`.
pub fn compress_stream<R, W>(source: R, sink: W, level: CompressionLevel) -> Result<StreamSummary>
where
    R: Read,
    W: Write,
{
    let config = StreamConfig::new().with_level(level);
    compress_stream_with(source, sink, Format::Zlib, &config)
}

/// Decompress a zlib stream from `source` into `sink`.
///
/// Fails with [`FlowError::CorruptStream`] if the input is not a single
/// well-formed stream: damaged data, a missing end or trailing bytes.
pub fn decompress_stream<R, W>(source: R, sink: W) -> Result<StreamSummary>
where
    R: Read,
    W: Write,
{
    decompress_stream_with(source, sink, Format::Zlib, &StreamConfig::default())
}

/// Compress `source` into `sink` with an explicit format and configuration.
pub fn compress_stream_with<R, W>(
    source: R,
    sink: W,
    format: Format,
    config: &StreamConfig,
) -> Result<StreamSummary>
where
    R: Read,
    W: Write,
{
    let mut session = compressor(format, config)?;
    StreamAdapter::new(source, sink).run(&mut session)
}

/// Decompress `source` into `sink` with an explicit format and configuration.
pub fn decompress_stream_with<R, W>(
    source: R,
    sink: W,
    format: Format,
    config: &StreamConfig,
) -> Result<StreamSummary>
where
    R: Read,
    W: Write,
{
    let mut session = decompressor(format, config)?;
    StreamAdapter::new(source, sink).run(&mut session)
}

/// Background variants of the streaming functions.
///
/// Each call starts the stream on Tokio's blocking pool and returns a task
/// that resolves once the session has finished or failed.
#[cfg(feature = "async-io")]
pub mod tasks {
    use super::*;
    use flowpress_core::async_io::{StreamTask, spawn_stream};

    /// Start compressing `source` into `sink` in the background.
    ///
    /// Codec construction errors are returned immediately.
    pub fn spawn_compress<R, W>(
        source: R,
        sink: W,
        format: Format,
        config: &StreamConfig,
    ) -> Result<StreamTask<R, W>>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        Ok(spawn_stream(compressor(format, config)?, source, sink))
    }

    /// Start decompressing `source` into `sink` in the background.
    pub fn spawn_decompress<R, W>(
        source: R,
        sink: W,
        format: Format,
        config: &StreamConfig,
    ) -> Result<StreamTask<R, W>>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        Ok(spawn_stream(decompressor(format, config)?, source, sink))
    }
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::format::Format;
    pub use crate::{
        compress_stream, compress_stream_with, decompress_stream, decompress_stream_with,
    };
    pub use flowpress_core::prelude::*;
}
