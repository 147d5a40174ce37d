//! Size-aware body capture for logging.
//!
//! [`BodyLoggingPolicy::process`] decides how a body shows up in the logs and
//! returns the body the next consumer must read instead of the original one.

use std::fmt;

use bytes::Bytes;
use newsapi_core::{Body, BodyLength, Error, Result};

/// Default maximum number of body bytes captured for logging.
pub const DEFAULT_MAX_LOGGED_BYTES: usize = 2048;

/// Which bodies may be materialized for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLoggingPolicy {
    /// Never log request or response bodies.
    Never,
    /// Log bodies whose known length is at most `max_bytes`.
    UpTo {
        /// Largest body, in bytes, that is captured.
        max_bytes: usize,
    },
}

impl Default for BodyLoggingPolicy {
    fn default() -> Self {
        Self::UpTo {
            max_bytes: DEFAULT_MAX_LOGGED_BYTES,
        }
    }
}

/// How a body appears in a log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyLog {
    /// There is no body.
    None,
    /// The policy forbids logging the body.
    Redacted,
    /// The body did not announce its length.
    UnknownLength,
    /// The body is larger than the policy allows.
    TooLarge(u64),
    /// The body was captured.
    Captured(Bytes),
}

impl fmt::Display for BodyLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("<none>"),
            Self::Redacted => f.write_str("<redacted>"),
            Self::UnknownLength => f.write_str("<unknown length>"),
            Self::TooLarge(byte_count) => write!(f, "<{byte_count} bytes>"),
            Self::Captured(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => f.write_str(text),
                Err(_) => write!(f, "<{} bytes of binary data>", bytes.len()),
            },
        }
    }
}

impl BodyLoggingPolicy {
    /// Classifies a body and returns the body to forward.
    ///
    /// | body | `Never` | `UpTo(max)` |
    /// |---|---|---|
    /// | absent | `None`, absent | `None`, absent |
    /// | unknown length | `UnknownLength`, unchanged | `UnknownLength`, unchanged |
    /// | known length `L` | `Redacted`, unchanged | `L > max`: `TooLarge(L)`, unchanged |
    /// | | | `L <= max`: `Captured`, fresh body over the same bytes |
    ///
    /// Only the last case reads the body, and never more than `max` bytes.
    ///
    /// # Errors
    ///
    /// Fails if reading the body fails, if it yields more than `max` bytes, or
    /// if a captured body does not match its declared length.
    pub async fn process(self, body: Option<Body>) -> Result<(BodyLog, Option<Body>)> {
        let Some(body) = body else {
            return Ok((BodyLog::None, None));
        };
        match (body.length(), self) {
            (BodyLength::Unknown, _) => Ok((BodyLog::UnknownLength, Some(body))),
            (BodyLength::Known(_), Self::Never) => Ok((BodyLog::Redacted, Some(body))),
            (BodyLength::Known(length), Self::UpTo { max_bytes })
                if length > u64::try_from(max_bytes).unwrap_or(u64::MAX) =>
            {
                Ok((BodyLog::TooLarge(length), Some(body)))
            }
            (BodyLength::Known(length), Self::UpTo { max_bytes }) => {
                let bytes = body.collect(max_bytes).await?;
                if u64::try_from(bytes.len()).ok() != Some(length) {
                    return Err(Error::body(format!(
                        "body has {} bytes, {length} declared",
                        bytes.len()
                    )));
                }
                let replay = Body::from_bytes(bytes.clone());
                Ok((BodyLog::Captured(bytes), Some(replay)))
            }
        }
    }
}
