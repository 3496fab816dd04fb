//! The codec capability seam.
//!
//! A [`Codec`] is an opaque incremental compressor or decompressor. The engine
//! never looks at the compressed format; it only hands the codec a slice of
//! pending input plus a slice of free output space and reads back how much
//! of each was used.

use crate::error::Result;
use std::fmt;

/// Direction of a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Mode {
    /// Raw bytes in, compressed bytes out.
    Compress,
    /// Compressed bytes in, raw bytes out.
    Decompress,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Compress => f.write_str("compress"),
            Mode::Decompress => f.write_str("decompress"),
        }
    }
}

/// Flush mode passed to each codec step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flush {
    /// More input may follow - buffer freely.
    #[default]
    None,
    /// No more input will arrive - emit everything and end the stream.
    Finish,
}

/// Outcome of a single codec step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The stream is still open.
    Continue,
    /// The end of the stream was written (compress) or read (decompress).
    /// Nothing further will be produced.
    StreamEnd,
}

/// Bookkeeping returned by [`Codec::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Bytes taken from the front of the input slice.
    pub consumed: usize,
    /// Bytes written to the front of the output slice.
    pub produced: usize,
    /// Whether the stream has ended.
    pub status: StepStatus,
}

impl Step {
    /// A step that leaves the stream open.
    pub fn progress(consumed: usize, produced: usize) -> Self {
        Self {
            consumed,
            produced,
            status: StepStatus::Continue,
        }
    }

    /// A step that closes the stream.
    pub fn end(consumed: usize, produced: usize) -> Self {
        Self {
            consumed,
            produced,
            status: StepStatus::StreamEnd,
        }
    }

    /// True when neither input nor output moved.
    pub fn is_stalled(&self) -> bool {
        self.consumed == 0 && self.produced == 0
    }
}

/// An incremental compressor or decompressor.
///
/// Implementations must honour the slice bounds they are given: `consumed`
/// never exceeds `input.len()` and `produced` never exceeds `output.len()`.
/// A step that fills `output` completely signals that more output may be
/// pending; the caller will drain and call again.
pub trait Codec {
    /// Short codec name used in errors and diagnostics.
    fn name(&self) -> &'static str;

    /// Direction of this codec instance.
    fn mode(&self) -> Mode;

    /// Compression level, for encoders that have one.
    fn level(&self) -> Option<CompressionLevel> {
        None
    }

    /// Feed `input` and drain available output into `output`.
    ///
    /// # Errors
    ///
    /// Decoders return [`FlowError::CorruptStream`](crate::FlowError::CorruptStream)
    /// for undecodable data; encoders return
    /// [`FlowError::Codec`](crate::FlowError::Codec).
    fn process(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<Step>;

    /// Release backend resources. Called exactly once by the owning session.
    fn release(&mut self) {}
}

impl<C: Codec + ?Sized> Codec for Box<C> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn mode(&self) -> Mode {
        (**self).mode()
    }

    fn level(&self) -> Option<CompressionLevel> {
        (**self).level()
    }

    fn process(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<Step> {
        (**self).process(input, output, flush)
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Compression level for encoders.
///
/// The value is passed through unchanged; each codec decides which levels it
/// accepts and rejects the rest when it is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// No compression (store only).
    pub const NONE: Self = Self(0);
    /// Fastest compression.
    pub const FAST: Self = Self(1);
    /// Default compression (balanced).
    pub const DEFAULT: Self = Self(6);
    /// Best compression for zlib.
    pub const BEST: Self = Self(9);

    /// Create a compression level.
    pub const fn new(level: u8) -> Self {
        Self(level)
    }

    /// Get the level value.
    pub const fn level(&self) -> u8 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for CompressionLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
