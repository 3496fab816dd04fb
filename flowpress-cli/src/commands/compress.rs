//! Compress command implementation.

use super::StreamOptions;
use crate::utils::compressed_name;
use flowpress_core::Mode;
use std::path::PathBuf;

pub fn cmd_compress(
    files: &[PathBuf],
    options: &StreamOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = options.format.unwrap_or_default();
    let config = options.stream_config(format.default_level())?;

    options.execute(files, Mode::Compress, Some(format), config, |path| {
        compressed_name(path, format)
    })
}
