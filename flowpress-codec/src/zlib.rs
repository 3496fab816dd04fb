//! zlib capability (RFC 1950) backed by `flate2`.
//!
//! The stream carries the two-byte zlib header and an Adler-32 trailer, so
//! corruption of the payload is caught when the trailer is checked.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};
use flowpress_core::{Codec, CompressionLevel, FlowError, Flush, Mode, Result, Step};

const NAME: &str = "zlib";

/// Highest level zlib accepts.
pub const MAX_LEVEL: u8 = 9;

fn released() -> FlowError {
    FlowError::codec(NAME, "used after release")
}

/// Turn counter deltas and a backend status into a [`Step`].
fn step(consumed: u64, produced: u64, status: Status) -> Step {
    let (consumed, produced) = (consumed as usize, produced as usize);
    match status {
        Status::StreamEnd => Step::end(consumed, produced),
        // BufError only means no progress was possible with these buffers
        Status::Ok | Status::BufError => Step::progress(consumed, produced),
    }
}

/// Streaming zlib encoder.
pub struct ZlibEncoder {
    inner: Option<Compress>,
    level: CompressionLevel,
}

impl ZlibEncoder {
    /// Create an encoder at `level` (0-9).
    pub fn new(level: CompressionLevel) -> Result<Self> {
        if level.level() > MAX_LEVEL {
            return Err(FlowError::capability_init(
                NAME,
                format!("level {} is outside 0-{}", level, MAX_LEVEL),
            ));
        }
        let inner = Compress::new(Compression::new(u32::from(level.level())), true);
        Ok(Self {
            inner: Some(inner),
            level,
        })
    }
}

impl Codec for ZlibEncoder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn mode(&self) -> Mode {
        Mode::Compress
    }

    fn level(&self) -> Option<CompressionLevel> {
        Some(self.level)
    }

    fn process(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<Step> {
        let inner = self.inner.as_mut().ok_or_else(released)?;
        let (before_in, before_out) = (inner.total_in(), inner.total_out());
        let mode = match flush {
            Flush::None => FlushCompress::None,
            Flush::Finish => FlushCompress::Finish,
        };

        let status = inner
            .compress(input, output, mode)
            .map_err(|e| FlowError::codec(NAME, e.to_string()))?;

        Ok(step(
            inner.total_in() - before_in,
            inner.total_out() - before_out,
            status,
        ))
    }

    fn release(&mut self) {
        self.inner = None;
    }
}

/// Streaming zlib decoder.
pub struct ZlibDecoder {
    inner: Option<Decompress>,
}

impl ZlibDecoder {
    /// Create a decoder expecting a zlib header.
    pub fn new() -> Self {
        Self {
            inner: Some(Decompress::new(true)),
        }
    }
}

impl Default for ZlibDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for ZlibDecoder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn mode(&self) -> Mode {
        Mode::Decompress
    }

    // The session detects truncation itself, so the backend is never asked to
    // finish in one call.
    fn process(&mut self, input: &[u8], output: &mut [u8], _flush: Flush) -> Result<Step> {
        let inner = self.inner.as_mut().ok_or_else(released)?;
        let (before_in, before_out) = (inner.total_in(), inner.total_out());

        let status = match inner.decompress(input, output, FlushDecompress::None) {
            Ok(status) => status,
            Err(e) => return Err(FlowError::corrupted(inner.total_in(), e.to_string())),
        };

        Ok(step(
            inner.total_in() - before_in,
            inner.total_out() - before_out,
            status,
        ))
    }

    fn release(&mut self) {
        self.inner = None;
    }
}
