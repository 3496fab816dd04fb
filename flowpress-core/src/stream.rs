//! Stream adapter: pulls chunks from a source and pushes output to a sink.

use crate::error::Result;
use crate::session::{CodecSession, StreamSummary};
use crate::traits::Codec;
use std::io::{Read, Write};

/// Drives a [`CodecSession`] from `Idle` to a terminal state.
///
/// The adapter only holds the two I/O handles; all progress is tracked by the
/// session, so after an error the session reports
/// [`SessionState::Failed`](crate::SessionState::Failed) and the sink may hold
/// a truncated prefix that callers should discard.
///
/// # Example
///
/// ```rust,ignore
/// let mut session = CodecSession::new(encoder, &StreamConfig::default())?;
/// let summary = StreamAdapter::new(File::open("in")?, File::create("out")?)
///     .run(&mut session)?;
/// ```
#[derive(Debug)]
pub struct StreamAdapter<R, W> {
    source: R,
    sink: W,
}

impl<R: Read, W: Write> StreamAdapter<R, W> {
    /// Create an adapter over a source and a sink.
    pub fn new(source: R, sink: W) -> Self {
        Self { source, sink }
    }

    /// Run `session` to completion.
    pub fn run<C: Codec>(&mut self, session: &mut CodecSession<C>) -> Result<StreamSummary> {
        while session.fill_input(&mut self.source)? > 0 {
            session.feed(&mut self.sink)?;
        }
        session.finish(&mut self.sink)
    }

    /// Reference to the sink.
    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// Return the source and sink.
    pub fn into_inner(self) -> (R, W) {
        (self.source, self.sink)
    }
}
