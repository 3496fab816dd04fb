//! Decompress command implementation.

use super::StreamOptions;
use crate::utils::decompressed_name;
use flowpress_codec::CompressionLevel;
use flowpress_core::Mode;
use std::path::PathBuf;

pub fn cmd_decompress(
    files: &[PathBuf],
    options: &StreamOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    // The level only matters for encoders
    let config = options.stream_config(CompressionLevel::DEFAULT)?;

    options.execute(
        files,
        Mode::Decompress,
        options.format,
        config,
        decompressed_name,
    )
}
