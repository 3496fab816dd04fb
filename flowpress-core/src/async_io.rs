//! Async support for FlowPress sessions.
//!
//! Sessions are blocking by nature: they read and write through `std::io`
//! handles. This module moves a whole session onto Tokio's blocking pool and
//! hands back a [`StreamTask`] that completes when the session reaches a
//! terminal state, so async callers can await the result instead of guessing
//! how long a stream takes.
//!
//! # Example
//!
//! ```rust,ignore
//! use flowpress_core::async_io::spawn_stream;
//!
//! let session = CodecSession::new(encoder, &StreamConfig::default())?;
//! let outcome = spawn_stream(session, source, Vec::new()).join().await?;
//! let summary = outcome.result?;
//! ```
//!
//! # Feature Flag
//!
//! This module is only available when the `async-io` feature is enabled:
//!
//! ```toml
//! [dependencies]
//! flowpress-core = { version = "0.1.0", features = ["async-io"] }
//! ```

use crate::error::{FlowError, Result};
use crate::session::{CodecSession, StreamSummary};
use crate::stream::StreamAdapter;
use crate::traits::Codec;
use std::io::{Read, Write};
use tokio::task::JoinHandle;

/// Result of a background stream together with the I/O handles it used.
#[derive(Debug)]
pub struct StreamOutcome<R, W> {
    /// Summary on success, typed failure otherwise.
    pub result: Result<StreamSummary>,
    /// The source, returned to the caller.
    pub source: R,
    /// The sink, returned to the caller.
    pub sink: W,
}

/// Handle to a session running on the blocking pool.
#[derive(Debug)]
pub struct StreamTask<R, W> {
    handle: JoinHandle<StreamOutcome<R, W>>,
}

impl<R, W> StreamTask<R, W> {
    /// Wait for the session to reach a terminal state.
    ///
    /// The outer error is only returned if the task panicked or the runtime
    /// shut down before it ran; stream failures are in
    /// [`StreamOutcome::result`].
    pub async fn join(self) -> Result<StreamOutcome<R, W>> {
        self.handle.await.map_err(|e| FlowError::Task {
            message: e.to_string(),
        })
    }

    /// Whether the session has already completed.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Run `session` over `source` and `sink` on Tokio's blocking pool.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_stream<C, R, W>(mut session: CodecSession<C>, source: R, sink: W) -> StreamTask<R, W>
where
    C: Codec + Send + 'static,
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(move || {
        let mut adapter = StreamAdapter::new(source, sink);
        let result = adapter.run(&mut session);
        let (source, sink) = adapter.into_inner();
        StreamOutcome {
            result,
            source,
            sink,
        }
    });
    StreamTask { handle }
}
