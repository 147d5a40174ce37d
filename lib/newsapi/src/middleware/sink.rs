//! Destinations for log records.

use std::fmt;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

use super::logging::LogRecord;

/// Receives the records produced by [`super::LoggingMiddleware`].
///
/// A sink is shared by every concurrent call going through the middleware.
/// Each [`LogSink::emit`] must write its record as one unit.
pub trait LogSink: Send + Sync {
    /// Outputs one record.
    fn emit(&self, record: &LogRecord);
}

/// Sends each record as a single `tracing` event (the default sink).
///
/// Requests and responses are logged at `INFO`, failures at `WARN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, record: &LogRecord) {
        match record {
            LogRecord::Request(request) => {
                info!(
                    target: "newsapi::http",
                    method = %request.line.method,
                    path = request.line.path_or_nil(),
                    "{record}"
                );
            }
            LogRecord::Response(response) => {
                info!(
                    target: "newsapi::http",
                    status = response.status,
                    method = %response.line.method,
                    path = response.line.path_or_nil(),
                    "{record}"
                );
            }
            LogRecord::Failure(failure) => {
                warn!(
                    target: "newsapi::http",
                    method = %failure.line.method,
                    path = failure.line.path_or_nil(),
                    error = %failure.error,
                    "{record}"
                );
            }
        }
    }
}

/// Writes rendered records to an [`std::io::Write`] implementation.
///
/// The writer sits behind a mutex held only while one record is written, so
/// records from concurrent calls never interleave.
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    /// Wraps a writer.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Runs a closure with exclusive access to the writer.
    pub fn with_writer<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut writer)
    }

    /// Consume into the writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl WriterSink<std::io::Stderr> {
    /// A sink writing to standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W> fmt::Debug for WriterSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterSink").finish_non_exhaustive()
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn emit(&self, record: &LogRecord) {
        // Render outside the lock
        let rendered = format!("{record}\n");
        self.with_writer(|writer| {
            if let Err(err) = writer
                .write_all(rendered.as_bytes())
                .and_then(|()| writer.flush())
            {
                warn!(error = %err, "failed to write log record");
            }
        });
    }
}
