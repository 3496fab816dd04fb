//! Fixed-capacity staging buffers shared by the source, the codec and the sink.
//!
//! A [`ChunkBuffers`] pair is allocated once per session and reused for every
//! feed/drain cycle. Neither buffer ever grows: the source is read at most
//! `input_capacity` bytes at a time, and codecs are only ever offered the
//! unused tail of the output buffer.

use crate::error::{FlowError, Result};
use std::io::{ErrorKind, Read, Write};

/// Input and output staging buffers with fill/drain bookkeeping.
#[derive(Debug)]
pub struct ChunkBuffers {
    input: Box<[u8]>,
    output: Box<[u8]>,
    /// Start of unconsumed input.
    input_cursor: usize,
    /// End of valid input.
    input_len: usize,
    /// Bytes of output waiting to be drained.
    output_fill: usize,
}

impl ChunkBuffers {
    /// Allocate a buffer pair with the given capacities.
    pub fn new(input_capacity: usize, output_capacity: usize) -> Self {
        Self {
            input: vec![0u8; input_capacity].into_boxed_slice(),
            output: vec![0u8; output_capacity].into_boxed_slice(),
            input_cursor: 0,
            input_len: 0,
            output_fill: 0,
        }
    }

    /// Capacity of the input buffer.
    pub fn input_capacity(&self) -> usize {
        self.input.len()
    }

    /// Capacity of the output buffer.
    pub fn output_capacity(&self) -> usize {
        self.output.len()
    }

    /// Read up to `input_capacity` bytes from `source` into the input buffer.
    ///
    /// Returns the number of bytes staged; 0 means the source is exhausted.
    /// Interrupted reads are retried.
    pub fn fill_input<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<usize> {
        debug_assert!(
            !self.has_pending_input(),
            "refilling input with {} bytes unconsumed",
            self.pending_input().len()
        );

        self.input_cursor = 0;
        self.input_len = 0;
        loop {
            match source.read(&mut self.input) {
                Ok(n) => {
                    self.input_len = n;
                    return Ok(n);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(FlowError::SourceRead(e)),
            }
        }
    }

    /// Unconsumed staged input.
    pub fn pending_input(&self) -> &[u8] {
        &self.input[self.input_cursor..self.input_len]
    }

    /// Whether any staged input is still unconsumed.
    pub fn has_pending_input(&self) -> bool {
        self.input_cursor < self.input_len
    }

    /// Mark `n` bytes of staged input as consumed.
    pub fn consume_input(&mut self, n: usize) {
        debug_assert!(self.input_cursor + n <= self.input_len);
        self.input_cursor = (self.input_cursor + n).min(self.input_len);
    }

    /// Unconsumed input together with the unused part of the output buffer.
    pub fn split_mut(&mut self) -> (&[u8], &mut [u8]) {
        (
            &self.input[self.input_cursor..self.input_len],
            &mut self.output[self.output_fill..],
        )
    }

    /// Record `n` bytes written into the unused part of the output buffer.
    pub fn commit_output(&mut self, n: usize) {
        debug_assert!(self.output_fill + n <= self.output.len());
        self.output_fill = (self.output_fill + n).min(self.output.len());
    }

    /// Bytes of output waiting to be drained.
    pub fn output_fill(&self) -> usize {
        self.output_fill
    }

    /// Whether the output buffer has no free space left.
    pub fn is_output_full(&self) -> bool {
        self.output_fill == self.output.len()
    }

    /// Write all pending output to `sink` and reset the fill to 0.
    ///
    /// Returns the number of bytes written. On failure the fill is left as is
    /// and nothing further should be drained.
    pub fn drain_output<W: Write + ?Sized>(&mut self, sink: &mut W) -> Result<usize> {
        let n = self.output_fill;
        if n == 0 {
            return Ok(0);
        }
        sink.write_all(&self.output[..n]).map_err(FlowError::SinkWrite)?;
        self.output_fill = 0;
        Ok(n)
    }
}
