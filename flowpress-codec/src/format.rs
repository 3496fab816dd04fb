//! Compressed stream formats and codec construction.

use crate::zlib::{ZlibDecoder, ZlibEncoder};
#[cfg(feature = "zstd")]
use crate::zstandard::{ZstdDecoder, ZstdEncoder};
use flowpress_core::{Codec, CompressionLevel, FlowError, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A codec behind a trait object, as returned by [`Format::encoder`] and
/// [`Format::decoder`].
pub type BoxedCodec = Box<dyn Codec + Send>;

/// Zstandard frame magic number, little-endian.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Supported stream formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Format {
    /// zlib (RFC 1950): DEFLATE with a header and Adler-32 trailer.
    #[default]
    Zlib,
    /// Zstandard (RFC 8878) with a content checksum.
    #[cfg(feature = "zstd")]
    Zstd,
}

impl Format {
    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Format::Zlib => "zlib",
            #[cfg(feature = "zstd")]
            Format::Zstd => "zstd",
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Zlib => "zz",
            #[cfg(feature = "zstd")]
            Format::Zstd => "zst",
        }
    }

    /// Default compression level for this format.
    pub fn default_level(&self) -> CompressionLevel {
        match self {
            Format::Zlib => CompressionLevel::DEFAULT,
            #[cfg(feature = "zstd")]
            Format::Zstd => CompressionLevel::new(3),
        }
    }

    /// All formats compiled into this build.
    pub fn all() -> &'static [Format] {
        #[cfg(feature = "zstd")]
        const ALL: &[Format] = &[Format::Zlib, Format::Zstd];
        #[cfg(not(feature = "zstd"))]
        const ALL: &[Format] = &[Format::Zlib];
        ALL
    }

    /// Look up a format by file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "zz" | "zlib" => Some(Format::Zlib),
            #[cfg(feature = "zstd")]
            "zst" | "zstd" => Some(Format::Zstd),
            _ => None,
        }
    }

    /// Look up a format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Identify a format from the first bytes of a stream.
    pub fn detect(header: &[u8]) -> Option<Self> {
        #[cfg(feature = "zstd")]
        {
            if header.starts_with(&ZSTD_MAGIC) {
                return Some(Format::Zstd);
            }
        }

        // CMF/FLG: deflate method, window <= 32K, check bits valid
        if header.len() >= 2 {
            let (cmf, flg) = (header[0], header[1]);
            if cmf & 0x0F == 8 && cmf >> 4 <= 7 && u16::from_be_bytes([cmf, flg]) % 31 == 0 {
                return Some(Format::Zlib);
            }
        }

        None
    }

    /// Create an encoder for this format.
    pub fn encoder(&self, level: CompressionLevel) -> Result<BoxedCodec> {
        let codec: BoxedCodec = match self {
            Format::Zlib => Box::new(ZlibEncoder::new(level)?),
            #[cfg(feature = "zstd")]
            Format::Zstd => Box::new(ZstdEncoder::new(level)?),
        };
        Ok(codec)
    }

    /// Create a decoder for this format.
    pub fn decoder(&self) -> Result<BoxedCodec> {
        let codec: BoxedCodec = match self {
            Format::Zlib => Box::new(ZlibDecoder::new()),
            #[cfg(feature = "zstd")]
            Format::Zstd => Box::new(ZstdDecoder::new()?),
        };
        Ok(codec)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Format {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s)
            .ok_or_else(|| FlowError::invalid_config(format!("unknown format '{}'", s)))
    }
}
