//! Info command implementation.

use crate::utils::format_bytes;
use flowpress_codec::{Format, backends};
use flowpress_core::DEFAULT_CHUNK_SIZE;
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// JSON serializable description of one file.
#[derive(Debug, Serialize)]
struct FileInfo {
    file: String,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<Format>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level_hint: Option<&'static str>,
}

/// Compression level class recorded in a zlib header's FLEVEL bits.
fn zlib_level_hint(header: &[u8]) -> Option<&'static str> {
    let flg = *header.get(1)?;
    Some(match flg >> 6 {
        0 => "fastest",
        1 => "fast",
        2 => "default",
        _ => "maximum",
    })
}

fn inspect(path: &Path) -> Result<FileInfo, Box<dyn std::error::Error>> {
    let size = std::fs::metadata(path)?.len();
    let mut header = [0u8; 4];
    let mut file = File::open(path)?;
    let mut len = 0;
    while len < header.len() {
        match file.read(&mut header[len..])? {
            0 => break,
            n => len += n,
        }
    }

    let header = &header[..len];
    let format = Format::detect(header);
    let level_hint = match format {
        Some(Format::Zlib) => zlib_level_hint(header),
        _ => None,
    };

    Ok(FileInfo {
        file: path.display().to_string(),
        size,
        format,
        level_hint,
    })
}

/// Show compiled-in backends, or describe the given files.
pub fn cmd_info(files: &[PathBuf], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if files.is_empty() {
        return show_backends(json);
    }

    let infos = files
        .iter()
        .map(|path| inspect(path))
        .collect::<Result<Vec<_>, _>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    for info in &infos {
        println!("File: {}", info.file);
        println!("  Size: {} ({} bytes)", format_bytes(info.size), info.size);
        match info.format {
            Some(format) => println!("  Format: {} (.{})", format, format.extension()),
            None => println!("  Format: not a recognized stream"),
        }
        if let Some(hint) = info.level_hint {
            println!("  Level: {}", hint);
        }
    }
    Ok(())
}

fn show_backends(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let backends = backends();
    if json {
        println!("{}", serde_json::to_string_pretty(backends)?);
        return Ok(());
    }

    println!("FlowPress {}", env!("CARGO_PKG_VERSION"));
    println!("Default chunk size: {}", format_bytes(DEFAULT_CHUNK_SIZE as u64));
    println!();
    println!("{:<8} {:<10} {:<10} {:>8}", "Format", "Library", "Version", "Levels");
    println!("{}", "-".repeat(40));
    for backend in backends {
        println!(
            "{:<8} {:<10} {:<10} {:>8}",
            backend.format,
            backend.library,
            backend.version.as_deref().unwrap_or("-"),
            format!("{}-{}", backend.min_level, backend.max_level)
        );
    }
    Ok(())
}
