//! Codec sessions: one compress or decompress operation from start to end.
//!
//! A [`CodecSession`] owns a single codec capability and a
//! [`ChunkBuffers`] pair and walks a forward-only state machine:
//!
//! ```text
//!  Idle ──feed──▶ Active ──finish──▶ Flushing ──▶ Finished
//!    │                │                  │
//!    └──finish────────┼──────────────────┘
//!                     ▼                  ▼
//!                   Failed  ◀────────── Failed
//! ```
//!
//! After every codec step the produced output is drained to the sink, and the
//! session keeps stepping for as long as the output buffer came back full,
//! since a full buffer means the codec has more to give. The codec is released
//! exactly once: on `Finished`, on `Failed`, or when the session is dropped.

use crate::buffer::ChunkBuffers;
use crate::config::StreamConfig;
use crate::error::{FlowError, Result};
use crate::traits::{Codec, CompressionLevel, Flush, Mode, StepStatus};
use std::fmt;
use std::io::{Read, Write};

/// Lifecycle state of a [`CodecSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SessionState {
    /// Codec constructed, nothing processed yet.
    Idle,
    /// Input chunks are being fed.
    Active,
    /// Input exhausted, codec finishing the stream.
    Flushing,
    /// Terminal success.
    Finished,
    /// Terminal failure.
    Failed,
}

impl SessionState {
    /// Whether the session can no longer make progress.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Finished | SessionState::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Active => "active",
            SessionState::Flushing => "flushing",
            SessionState::Finished => "finished",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Terminal state and byte counters of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamSummary {
    /// State the session ended in.
    pub state: SessionState,
    /// Direction of the session.
    pub mode: Mode,
    /// Bytes consumed by the codec.
    pub bytes_in: u64,
    /// Bytes written to the sink.
    pub bytes_out: u64,
}

impl StreamSummary {
    /// Output size relative to input size (0.0 for empty input).
    pub fn ratio(&self) -> f64 {
        if self.bytes_in == 0 {
            0.0
        } else {
            self.bytes_out as f64 / self.bytes_in as f64
        }
    }

    /// Space savings as a percentage of the uncompressed size.
    pub fn space_savings(&self) -> f64 {
        let (raw, packed) = match self.mode {
            Mode::Compress => (self.bytes_in, self.bytes_out),
            Mode::Decompress => (self.bytes_out, self.bytes_in),
        };
        if raw == 0 {
            0.0
        } else {
            (1.0 - packed as f64 / raw as f64) * 100.0
        }
    }
}

/// A single streaming compress or decompress operation.
///
/// Not meant to be shared between threads; independent sessions can run in
/// parallel since each owns its own codec and buffers.
pub struct CodecSession<C: Codec> {
    codec: Option<C>,
    buffers: ChunkBuffers,
    state: SessionState,
    mode: Mode,
    level: Option<CompressionLevel>,
    bytes_consumed: u64,
    bytes_produced: u64,
    /// The codec reported the end of the stream.
    stream_ended: bool,
}

impl<C: Codec> CodecSession<C> {
    /// Create a session around `codec` with buffers sized by `config`.
    pub fn new(mut codec: C, config: &StreamConfig) -> Result<Self> {
        if let Err(e) = config.validate() {
            codec.release();
            return Err(e);
        }
        let mode = codec.mode();
        let level = codec.level();
        Ok(Self {
            codec: Some(codec),
            buffers: ChunkBuffers::new(config.input_capacity, config.output_capacity),
            state: SessionState::Idle,
            mode,
            level,
            bytes_consumed: 0,
            bytes_produced: 0,
            stream_ended: false,
        })
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Direction of the session.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Compression level of the encoder, if any.
    pub fn level(&self) -> Option<CompressionLevel> {
        self.level
    }

    /// Bytes consumed by the codec so far.
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_consumed
    }

    /// Bytes written to the sink so far.
    pub fn bytes_produced(&self) -> u64 {
        self.bytes_produced
    }

    /// The session's staging buffers.
    pub fn buffers(&self) -> &ChunkBuffers {
        &self.buffers
    }

    /// Whether the codec is still held by the session.
    pub fn holds_codec(&self) -> bool {
        self.codec.is_some()
    }

    /// Snapshot of state and counters.
    pub fn summary(&self) -> StreamSummary {
        StreamSummary {
            state: self.state,
            mode: self.mode,
            bytes_in: self.bytes_consumed,
            bytes_out: self.bytes_produced,
        }
    }

    /// Stage the next chunk from `source`. Returns 0 when the source is exhausted.
    pub fn fill_input<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<usize> {
        self.ensure_live("read into")?;
        let result = self.buffers.fill_input(source);
        self.guard(result)
    }

    /// Feed the staged chunk to the codec and drain everything it produces.
    ///
    /// Returns once the chunk is fully consumed and the output buffer was
    /// left partially filled.
    pub fn feed<W: Write + ?Sized>(&mut self, sink: &mut W) -> Result<()> {
        self.ensure_live("feed")?;
        if self.state == SessionState::Flushing {
            return Err(FlowError::session_state(self.state, "feed"));
        }
        if self.state == SessionState::Idle {
            self.transition(SessionState::Active);
        }
        let result = self.pump(sink, Flush::None);
        self.guard(result)
    }

    /// Signal end of input, drain the rest of the stream and flush the sink.
    pub fn finish<W: Write + ?Sized>(&mut self, sink: &mut W) -> Result<StreamSummary> {
        self.ensure_live("finish")?;
        if self.buffers.has_pending_input() {
            self.feed(sink)?;
        }
        self.transition(SessionState::Flushing);

        let result = self
            .pump(sink, Flush::Finish)
            .and_then(|()| sink.flush().map_err(FlowError::SinkWrite));
        self.guard(result)?;

        self.transition(SessionState::Finished);
        self.release();
        Ok(self.summary())
    }

    /// Step the codec until the staged input is consumed and no output is pending
    /// (or, when finishing, until the codec ends the stream).
    fn pump<W: Write + ?Sized>(&mut self, sink: &mut W, flush: Flush) -> Result<()> {
        let Some(codec) = self.codec.as_mut() else {
            return Err(FlowError::session_state(self.state, "drive"));
        };

        loop {
            if self.stream_ended {
                if self.buffers.has_pending_input() {
                    return Err(match self.mode {
                        Mode::Decompress => FlowError::corrupted(
                            self.bytes_consumed,
                            "trailing data after end of compressed stream",
                        ),
                        Mode::Compress => {
                            FlowError::codec(codec.name(), "stream ended before end of input")
                        }
                    });
                }
                return Ok(());
            }

            let (input, output) = self.buffers.split_mut();
            let step = codec.process(input, output, flush)?;
            self.buffers.consume_input(step.consumed);
            self.buffers.commit_output(step.produced);
            self.bytes_consumed += step.consumed as u64;

            let output_was_full = self.buffers.is_output_full();
            self.bytes_produced += self.buffers.drain_output(sink)? as u64;

            if step.status == StepStatus::StreamEnd {
                self.stream_ended = true;
                continue;
            }
            if output_was_full {
                // More output is pending
                continue;
            }
            if flush == Flush::None && !self.buffers.has_pending_input() {
                return Ok(());
            }
            if step.is_stalled() {
                return Err(match (self.mode, flush) {
                    (Mode::Decompress, Flush::Finish) => FlowError::corrupted(
                        self.bytes_consumed,
                        "truncated stream: input ended before end of compressed data",
                    ),
                    (Mode::Decompress, Flush::None) => {
                        FlowError::corrupted(self.bytes_consumed, "decoder made no progress")
                    }
                    (Mode::Compress, _) => {
                        FlowError::codec(codec.name(), "encoder made no progress")
                    }
                });
            }
        }
    }

    fn ensure_live(&self, operation: &'static str) -> Result<()> {
        if self.state.is_terminal() {
            return Err(FlowError::session_state(self.state, operation));
        }
        Ok(())
    }

    fn guard<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() && !self.state.is_terminal() {
            self.transition(SessionState::Failed);
            self.release();
        }
        result
    }

    fn transition(&mut self, next: SessionState) {
        debug_assert!(next > self.state, "{} -> {}", self.state, next);
        log::trace!(
            "{} session: {} -> {} ({} in, {} out)",
            self.mode,
            self.state,
            next,
            self.bytes_consumed,
            self.bytes_produced
        );
        self.state = next;
    }

    fn release(&mut self) {
        if let Some(mut codec) = self.codec.take() {
            codec.release();
        }
    }
}

impl<C: Codec> Drop for CodecSession<C> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<C: Codec> fmt::Debug for CodecSession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecSession")
            .field("codec", &self.codec.as_ref().map(|c| c.name()))
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("level", &self.level)
            .field("bytes_consumed", &self.bytes_consumed)
            .field("bytes_produced", &self.bytes_produced)
            .finish()
    }
}
