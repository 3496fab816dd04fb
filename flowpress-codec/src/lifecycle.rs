//! Library initialization and backend discovery.
//!
//! Neither backend needs process-wide setup, but embedders that manage
//! library lifetimes explicitly can call [`init`] at startup and
//! [`shutdown`] at exit. Both are idempotent and cheap. Sessions do not
//! require `init` to have been called.

use crate::format::Format;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

static INITIALIZED: AtomicBool = AtomicBool::new(false);
static BACKENDS: OnceLock<Vec<BackendInfo>> = OnceLock::new();

/// Description of a compiled-in codec backend.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BackendInfo {
    /// Stream format the backend implements.
    pub format: Format,
    /// Library providing the implementation.
    pub library: &'static str,
    /// Library version, when the backend reports one.
    pub version: Option<String>,
    /// Lowest accepted compression level.
    pub min_level: i32,
    /// Highest accepted compression level.
    pub max_level: i32,
}

fn probe() -> Vec<BackendInfo> {
    let mut backends = vec![BackendInfo {
        format: Format::Zlib,
        library: "flate2",
        version: None,
        min_level: 0,
        max_level: i32::from(crate::zlib::MAX_LEVEL),
    }];

    #[cfg(feature = "zstd")]
    {
        let number = ::zstd::zstd_safe::version_number();
        let range = ::zstd::compression_level_range();
        backends.push(BackendInfo {
            format: Format::Zstd,
            library: "libzstd",
            version: Some(format!(
                "{}.{}.{}",
                number / 10_000,
                number / 100 % 100,
                number % 100
            )),
            min_level: *range.start(),
            max_level: *range.end(),
        });
    }

    backends
}

/// Initialize the library. Returns the available backends.
///
/// Calling this more than once has no further effect.
pub fn init() -> &'static [BackendInfo] {
    let backends = backends();
    if !INITIALIZED.swap(true, Ordering::AcqRel) {
        log::debug!("flowpress initialized with {} backend(s)", backends.len());
    }
    backends
}

/// Shut the library down. Safe to call without a prior [`init`].
pub fn shutdown() {
    if INITIALIZED.swap(false, Ordering::AcqRel) {
        log::debug!("flowpress shut down");
    }
}

/// Whether [`init`] has been called without a matching [`shutdown`].
pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

/// Backends compiled into this build.
pub fn backends() -> &'static [BackendInfo] {
    BACKENDS.get_or_init(probe)
}

/// Backend for a given format.
pub fn backend(format: Format) -> Option<&'static BackendInfo> {
    backends().iter().find(|b| b.format == format)
}
