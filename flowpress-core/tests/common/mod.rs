//! Shared helpers for session integration tests: a tiny framed codec and
//! fault-injecting I/O handles.

#![allow(dead_code)]

use flowpress_core::{Codec, FlowError, Flush, Mode, Result, Step};
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Length-prefixed block format: `[len:u8][len bytes]...[0][checksum:u32 le]`.
///
/// Not a compressor, but it has real framing, so the session sees stream
/// ends, truncation, trailing bytes and checksum failures.
pub struct BlockCodec {
    mode: Mode,
    checksum: u32,
    trailer: Option<([u8; 5], usize)>,
    phase: Phase,
    offset: u64,
    releases: Arc<AtomicUsize>,
}

#[derive(Clone, Copy)]
enum Phase {
    Header,
    Block(usize),
    Trailer([u8; 4], usize),
    Done,
}

fn mix(sum: u32, bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(sum, |acc, &b| acc.wrapping_mul(31).wrapping_add(b as u32))
}

impl BlockCodec {
    pub fn encoder() -> Self {
        Self::with_mode(Mode::Compress)
    }

    pub fn decoder() -> Self {
        Self::with_mode(Mode::Decompress)
    }

    pub fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            checksum: 0,
            trailer: None,
            phase: Phase::Header,
            offset: 0,
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Counter incremented each time the codec is released.
    pub fn release_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.releases)
    }

    fn encode(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Step {
        let mut consumed = 0;
        let mut produced = 0;

        while consumed < input.len() && output.len() - produced >= 2 {
            let n = (input.len() - consumed)
                .min(255)
                .min(output.len() - produced - 1);
            output[produced] = n as u8;
            output[produced + 1..produced + 1 + n].copy_from_slice(&input[consumed..consumed + n]);
            self.checksum = mix(self.checksum, &input[consumed..consumed + n]);
            consumed += n;
            produced += 1 + n;
        }

        if flush == Flush::Finish && consumed == input.len() {
            let checksum = self.checksum;
            let (bytes, written) = self.trailer.get_or_insert_with(|| {
                let mut t = [0u8; 5];
                t[1..].copy_from_slice(&checksum.to_le_bytes());
                (t, 0)
            });
            let k = (5 - *written).min(output.len() - produced);
            output[produced..produced + k].copy_from_slice(&bytes[*written..*written + k]);
            *written += k;
            produced += k;
            if *written == 5 {
                return Step::end(consumed, produced);
            }
        }

        Step::progress(consumed, produced)
    }

    fn decode(&mut self, input: &[u8], output: &mut [u8]) -> Result<Step> {
        let mut consumed = 0;
        let mut produced = 0;

        loop {
            match self.phase {
                Phase::Header => {
                    if consumed == input.len() {
                        break;
                    }
                    let len = input[consumed] as usize;
                    consumed += 1;
                    self.offset += 1;
                    self.phase = if len == 0 {
                        Phase::Trailer([0; 4], 0)
                    } else {
                        Phase::Block(len)
                    };
                }
                Phase::Block(remaining) => {
                    if consumed == input.len() || produced == output.len() {
                        break;
                    }
                    let n = remaining
                        .min(input.len() - consumed)
                        .min(output.len() - produced);
                    let chunk = &input[consumed..consumed + n];
                    output[produced..produced + n].copy_from_slice(chunk);
                    self.checksum = mix(self.checksum, chunk);
                    consumed += n;
                    produced += n;
                    self.offset += n as u64;
                    self.phase = if remaining == n {
                        Phase::Header
                    } else {
                        Phase::Block(remaining - n)
                    };
                }
                Phase::Trailer(mut bytes, mut have) => {
                    if consumed == input.len() {
                        break;
                    }
                    bytes[have] = input[consumed];
                    have += 1;
                    consumed += 1;
                    self.offset += 1;
                    if have == 4 {
                        if u32::from_le_bytes(bytes) != self.checksum {
                            return Err(FlowError::corrupted(self.offset, "checksum mismatch"));
                        }
                        self.phase = Phase::Done;
                    } else {
                        self.phase = Phase::Trailer(bytes, have);
                    }
                }
                Phase::Done => return Ok(Step::end(consumed, produced)),
            }
        }

        Ok(Step::progress(consumed, produced))
    }
}

impl Codec for BlockCodec {
    fn name(&self) -> &'static str {
        "block"
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn process(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<Step> {
        match self.mode {
            Mode::Compress => Ok(self.encode(input, output, flush)),
            Mode::Decompress => self.decode(input, output),
        }
    }

    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Reader fault modes.
pub enum FaultMode {
    OneByteChunks,
    FailAfter(usize),
}

pub struct FaultyReader<R: Read> {
    inner: R,
    mode: FaultMode,
    delivered: usize,
}

impl<R: Read> FaultyReader<R> {
    pub fn new(inner: R, mode: FaultMode) -> Self {
        Self {
            inner,
            mode,
            delivered: 0,
        }
    }
}

impl<R: Read> Read for FaultyReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = match self.mode {
            FaultMode::OneByteChunks => {
                let len = buf.len().min(1);
                self.inner.read(&mut buf[..len])?
            }
            FaultMode::FailAfter(limit) if self.delivered >= limit => {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "source dropped"));
            }
            FaultMode::FailAfter(limit) => {
                let len = buf.len().min(limit - self.delivered);
                self.inner.read(&mut buf[..len])?
            }
        };
        self.delivered += n;
        Ok(n)
    }
}

/// Sink that accepts `limit` bytes and then fails.
pub struct FailingWriter {
    pub written: Vec<u8>,
    limit: usize,
}

impl FailingWriter {
    pub fn new(limit: usize) -> Self {
        Self {
            written: Vec::new(),
            limit,
        }
    }
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written.len() >= self.limit {
            return Err(io::Error::new(io::ErrorKind::StorageFull, "disk full"));
        }
        let n = buf.len().min(self.limit - self.written.len());
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Deterministic text-like test data.
pub fn sample_data(size: usize) -> Vec<u8> {
    let words: &[&[u8]] = &[b"stream ", b"chunk ", b"drain ", b"flush ", b"codec ", b"\n"];
    let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
    let mut data = Vec::with_capacity(size);
    while data.len() < size {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        data.extend_from_slice(words[(seed >> 33) as usize % words.len()]);
    }
    data.truncate(size);
    data
}
