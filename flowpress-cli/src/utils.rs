//! Utility functions for the CLI.

use dialoguer::Confirm;
use flowpress_codec::{Format, StreamConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Suffix used when a decompressed name cannot be derived from the extension.
const FALLBACK_SUFFIX: &str = "out";

/// Create a progress bar counting files.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("progress bar template is valid")
            .progress_chars("█▓▒░ "),
    );
    pb
}

/// Create a progress bar counting bytes read from a single input.
pub fn create_bytes_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}",
            )
            .expect("progress bar template is valid")
            .progress_chars("█▓▒░ "),
    );
    pb
}

/// Output name for compressing `input`: the format's extension is appended.
pub fn compressed_name(input: &Path, format: Format) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

/// Output name for decompressing `input`.
///
/// A recognized extension is stripped; otherwise `.out` is appended so the
/// input is never overwritten.
pub fn decompressed_name(input: &Path) -> PathBuf {
    match Format::from_path(input) {
        Some(_) => input.with_extension(""),
        None => {
            let mut name = input.as_os_str().to_owned();
            name.push(".");
            name.push(FALLBACK_SUFFIX);
            PathBuf::from(name)
        }
    }
}

/// Load a stream configuration from a JSON file.
pub fn load_config(path: &Path) -> Result<StreamConfig, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
    let config: StreamConfig = serde_json::from_str(&text)
        .map_err(|e| format!("invalid config {}: {}", path.display(), e))?;
    config.validate()?;
    Ok(config)
}

/// Decide whether an existing `path` may be replaced.
///
/// With `force` the answer is always yes. Otherwise the user is asked when a
/// terminal is attached, and the answer is no when it is not.
pub fn confirm_overwrite(path: &Path, force: bool) -> Result<bool, Box<dyn std::error::Error>> {
    if force || !path.exists() {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Ok(false);
    }

    let answer = Confirm::new()
        .with_prompt(format!("{} already exists. Overwrite?", path.display()))
        .default(false)
        .interact()?;
    Ok(answer)
}

/// Format a byte count for humans.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
