//! Streamed, single-pass bodies.
//!
//! A [`Body`] is a stream of byte chunks with a [`BodyLength`] hint. It can be
//! read exactly once: anything that drains a body for a side purpose (such as
//! logging) must hand a fresh body over the same bytes to the next consumer.
//!
//! # Example
//!
//! ```
//! use newsapi_core::{Body, BodyLength};
//!
//! let body = Body::from("hello");
//! assert_eq!(body.length(), BodyLength::Known(5));
//! ```

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures_core::Stream;
use futures_util::{StreamExt, stream};

use crate::{Error, Result};

const INITIAL_CAPACITY: usize = 64 * 1024;

/// A stream of body chunks.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Declared length of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyLength {
    /// The producer did not announce a length (e.g. chunked transfer).
    Unknown,
    /// The producer announced exactly this many bytes.
    Known(u64),
}

/// A single-pass, possibly streamed body.
pub struct Body {
    length: BodyLength,
    stream: BodyStream,
}

impl Body {
    /// An empty body of known length zero.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// A body over in-memory bytes.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes: Bytes = bytes.into();
        let length = BodyLength::Known(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
        let chunks = if bytes.is_empty() {
            Vec::new()
        } else {
            vec![Ok(bytes)]
        };
        Self {
            length,
            stream: Box::pin(stream::iter(chunks)),
        }
    }

    /// A body over an arbitrary chunk stream.
    ///
    /// The length is a hint provided by the producer and is trusted as-is.
    pub fn from_stream<S>(stream: S, length: BodyLength) -> Self
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        Self {
            length,
            stream: Box::pin(stream),
        }
    }

    /// Declared length.
    #[must_use]
    pub const fn length(&self) -> BodyLength {
        self.length
    }

    /// Consume into the underlying chunk stream.
    #[must_use]
    pub fn into_stream(self) -> BodyStream {
        self.stream
    }

    /// Reads the whole body into memory, refusing to hold more than `max` bytes.
    ///
    /// Reading stops at the first chunk that crosses the limit: the drain never
    /// buffers more than `max` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BodyTooLarge`] past the limit, or the stream's own error.
    pub async fn collect(mut self, max: usize) -> Result<Bytes> {
        // the declared length is a hint, capacity grows with the data
        let capacity = match self.length {
            BodyLength::Known(len) => usize::try_from(len)
                .unwrap_or(usize::MAX)
                .min(max)
                .min(INITIAL_CAPACITY),
            BodyLength::Unknown => 0,
        };
        let mut buffer = BytesMut::with_capacity(capacity);
        while let Some(chunk) = self.stream.next().await {
            let chunk = chunk?;
            if chunk.len() > max - buffer.len() {
                return Err(Error::BodyTooLarge { max });
            }
            buffer.extend_from_slice(&chunk);
        }
        Ok(buffer.freeze())
    }

    /// Reads the whole body into memory without limit.
    ///
    /// # Errors
    ///
    /// Returns the stream's error if reading a chunk fails.
    pub async fn into_bytes(self) -> Result<Bytes> {
        self.collect(usize::MAX).await
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

impl Stream for Body {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.as_mut().poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.stream.size_hint()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::from_bytes(text)
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self::from_bytes(text)
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    fn chunked(chunks: &[&'static str], length: BodyLength) -> Body {
        let chunks: Vec<Result<Bytes>> = chunks.iter().map(|c| Ok(Bytes::from(*c))).collect();
        Body::from_stream(stream::iter(chunks), length)
    }

    #[test]
    fn in_memory_body_has_known_length() {
        check!(Body::from("hello").length() == BodyLength::Known(5));
        check!(Body::empty().length() == BodyLength::Known(0));
        check!(Body::from(vec![0_u8; 3]).length() == BodyLength::Known(3));
    }

    #[tokio::test]
    async fn collect_joins_chunks() {
        let body = chunked(&["hel", "lo ", "world"], BodyLength::Unknown);
        let bytes = body.collect(64).await.expect("within limit");
        check!(bytes == Bytes::from("hello world"));
    }

    #[tokio::test]
    async fn collect_accepts_exact_limit() {
        let body = chunked(&["abc", "de"], BodyLength::Known(5));
        let bytes = body.collect(5).await.expect("exactly at limit");
        check!(bytes.len() == 5);
    }

    #[tokio::test]
    async fn collect_stops_past_limit() {
        let body = chunked(&["abc", "def"], BodyLength::Known(3));
        let result = body.collect(4).await;
        let_assert!(Err(Error::BodyTooLarge { max }) = result);
        check!(max == 4);
    }

    #[tokio::test]
    async fn huge_length_hint_does_not_preallocate() {
        let body = chunked(&["abc"], BodyLength::Known(u64::MAX));
        let result = body.into_bytes().await;
        let_assert!(Ok(bytes) = result);
        check!(bytes == Bytes::from("abc"));

        let body = chunked(&["abc"], BodyLength::Known(u64::MAX));
        let result = body.collect(usize::MAX / 2).await;
        let_assert!(Ok(bytes) = result);
        check!(bytes.len() == 3);
    }

    #[tokio::test]
    async fn collect_propagates_stream_error() {
        let chunks = vec![Ok(Bytes::from("abc")), Err(Error::body("connection reset"))];
        let body = Body::from_stream(stream::iter(chunks), BodyLength::Unknown);
        let result = body.into_bytes().await;
        let_assert!(Err(Error::Body(message)) = result);
        check!(message == "connection reset");
    }

    #[tokio::test]
    async fn body_is_a_stream() {
        let mut body = chunked(&["a", "b"], BodyLength::Known(2));
        let mut seen = Vec::new();
        while let Some(chunk) = body.next().await {
            seen.push(chunk.expect("chunk"));
        }
        check!(seen == [Bytes::from("a"), Bytes::from("b")]);
    }
}
