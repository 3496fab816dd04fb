//! Zstandard capability (RFC 8878) backed by the `zstd` crate.
//!
//! Encoders always write a content checksum, so a damaged frame is rejected
//! by the decoder even when its block structure still parses. A stream is a
//! single frame; anything after the end of that frame is treated as trailing
//! data by the session.

use ::zstd::stream::raw::{CParameter, Decoder, Encoder, InBuffer, Operation, OutBuffer};
use flowpress_core::{Codec, CompressionLevel, FlowError, Flush, Mode, Result, Step};

const NAME: &str = "zstd";

fn released() -> FlowError {
    FlowError::codec(NAME, "used after release")
}

/// Streaming Zstandard encoder.
pub struct ZstdEncoder {
    inner: Option<Encoder<'static>>,
    level: CompressionLevel,
}

impl ZstdEncoder {
    /// Create an encoder at `level`.
    ///
    /// Valid levels are those reported by the linked libzstd, normally 1-22.
    /// Level 0 selects libzstd's own default.
    pub fn new(level: CompressionLevel) -> Result<Self> {
        let requested = i32::from(level.level());
        let range = ::zstd::compression_level_range();
        if requested != 0 && !range.contains(&requested) {
            return Err(FlowError::capability_init(
                NAME,
                format!(
                    "level {} is outside {}-{}",
                    level,
                    range.start(),
                    range.end()
                ),
            ));
        }

        let mut encoder =
            Encoder::new(requested).map_err(|e| FlowError::capability_init(NAME, e.to_string()))?;
        encoder
            .set_parameter(CParameter::ChecksumFlag(true))
            .map_err(|e| FlowError::capability_init(NAME, e.to_string()))?;

        Ok(Self {
            inner: Some(encoder),
            level,
        })
    }
}

impl Codec for ZstdEncoder {
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
        let encoder = self.inner.as_mut().ok_or_else(released)?;
        let mut src = InBuffer::around(input);
        let mut dst = OutBuffer::around(output);

        if !input.is_empty() {
            encoder
                .run(&mut src, &mut dst)
                .map_err(|e| FlowError::codec(NAME, e.to_string()))?;
        }

        let consumed = src.pos();
        if flush == Flush::Finish && consumed == input.len() {
            // Returns the number of bytes still buffered inside the encoder
            let remaining = encoder
                .finish(&mut dst, true)
                .map_err(|e| FlowError::codec(NAME, e.to_string()))?;
            if remaining == 0 {
                return Ok(Step::end(consumed, dst.pos()));
            }
        }

        Ok(Step::progress(consumed, dst.pos()))
    }

    fn release(&mut self) {
        self.inner = None;
    }
}

/// Streaming Zstandard decoder.
pub struct ZstdDecoder {
    inner: Option<Decoder<'static>>,
    total_in: u64,
}

impl ZstdDecoder {
    /// Create a decoder.
    pub fn new() -> Result<Self> {
        let decoder = Decoder::new().map_err(|e| FlowError::capability_init(NAME, e.to_string()))?;
        Ok(Self {
            inner: Some(decoder),
            total_in: 0,
        })
    }
}

impl Codec for ZstdDecoder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn mode(&self) -> Mode {
        Mode::Decompress
    }

    fn process(&mut self, input: &[u8], output: &mut [u8], _flush: Flush) -> Result<Step> {
        let decoder = self.inner.as_mut().ok_or_else(released)?;
        let mut src = InBuffer::around(input);
        let mut dst = OutBuffer::around(output);

        let hint = match decoder.run(&mut src, &mut dst) {
            Ok(hint) => hint,
            Err(e) => {
                let offset = self.total_in + src.pos() as u64;
                return Err(FlowError::corrupted(offset, e.to_string()));
            }
        };

        let consumed = src.pos();
        self.total_in += consumed as u64;

        // A zero hint means the frame is fully decoded and flushed
        if hint == 0 {
            Ok(Step::end(consumed, dst.pos()))
        } else {
            Ok(Step::progress(consumed, dst.pos()))
        }
    }

    fn release(&mut self) {
        self.inner = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ZSTD_MAGIC;
    use flowpress_core::StepStatus;

    fn encode_all(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZstdEncoder::new(CompressionLevel::new(3)).unwrap();
        let mut out = vec![0u8; data.len() + 128];
        let step = encoder.process(data, &mut out, Flush::Finish).unwrap();
        assert_eq!(step.status, StepStatus::StreamEnd);
        out.truncate(step.produced);
        out
    }

    #[test]
    fn test_frame_magic() {
        assert_eq!(&encode_all(b"zstd")[..4], &ZSTD_MAGIC);
    }

    #[test]
    fn test_single_call_roundtrip() {
        let data = b"Hello, Zstandard! Hello, Zstandard!";
        let encoded = encode_all(data);

        let mut decoder = ZstdDecoder::new().unwrap();
        let mut out = vec![0u8; 256];
        let step = decoder.process(&encoded, &mut out, Flush::None).unwrap();
        assert_eq!(step.status, StepStatus::StreamEnd);
        assert_eq!(step.consumed, encoded.len());
        assert_eq!(&out[..step.produced], data);
    }

    #[test]
    fn test_level_out_of_range() {
        let err = ZstdEncoder::new(CompressionLevel::new(200)).err().unwrap();
        assert!(matches!(err, FlowError::CapabilityInit { .. }));
    }

    #[test]
    fn test_bad_magic_is_corrupt() {
        let mut decoder = ZstdDecoder::new().unwrap();
        let mut out = [0u8; 64];
        let err = decoder
            .process(b"not a zstd frame at all", &mut out, Flush::None)
            .unwrap_err();
        assert!(err.is_corrupt());
    }
}
