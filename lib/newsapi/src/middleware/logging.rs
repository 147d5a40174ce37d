//! Request/response logging middleware.
//!
//! Every exchange produces a request record before it is forwarded, then
//! either a response record or a failure record. What goes into a record is
//! controlled by a [`LoggingPolicy`] (which sections) and a
//! [`BodyLoggingPolicy`] (how much of a body may be captured).

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

use newsapi_core::{
    Body, BoxFuture, Error, Exchange, HeaderFields, Method, Middleware, Next, Request, Response,
    Result,
};
use tracing::{Instrument, info_span};

use super::body_policy::{BodyLog, BodyLoggingPolicy};
use super::sink::{LogSink, TracingSink};

// ============================================================================
// Logging policy
// ============================================================================

/// Set of optional sections added to log records.
///
/// The request line and the status line are always logged.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoggingPolicy(u8);

impl LoggingPolicy {
    /// Log bodies (as decided by the [`BodyLoggingPolicy`]).
    pub const BODY: Self = Self(1 << 0);
    /// Log request header fields.
    pub const REQUEST_HEADERS: Self = Self(1 << 1);
    /// Log response header fields.
    pub const RESPONSE_HEADERS: Self = Self(1 << 2);

    /// Request and status lines only.
    pub const BRIEF: Self = Self(0);
    /// Every section.
    pub const FULL: Self = Self(Self::BODY.0 | Self::REQUEST_HEADERS.0 | Self::RESPONSE_HEADERS.0);

    /// `true` if every flag of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// `true` if no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Flags of both sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Sets the flags of `other`.
    pub const fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears the flags of `other`.
    pub const fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl Default for LoggingPolicy {
    fn default() -> Self {
        Self::FULL
    }
}

impl BitOr for LoggingPolicy {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for LoggingPolicy {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

impl fmt::Debug for LoggingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::BODY, "BODY"),
            (Self::REQUEST_HEADERS, "REQUEST_HEADERS"),
            (Self::RESPONSE_HEADERS, "RESPONSE_HEADERS"),
        ];
        let mut set = f.debug_set();
        for (flag, name) in names {
            if self.contains(flag) {
                set.entry(&format_args!("{name}"));
            }
        }
        set.finish()
    }
}

// ============================================================================
// Log records
// ============================================================================

/// Method, scheme and path of the logged request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// HTTP method.
    pub method: Method,
    /// Scheme, if the request carries one.
    pub scheme: Option<String>,
    /// Path and query, if the request carries one.
    pub path: Option<String>,
}

impl RequestLine {
    fn of(request: &Request) -> Self {
        Self {
            method: request.method().clone(),
            scheme: request.scheme().map(ToOwned::to_owned),
            path: request.path().map(ToOwned::to_owned),
        }
    }

    /// The path, or `<nil>` when the request has none.
    #[must_use]
    pub fn path_or_nil(&self) -> &str {
        self.path.as_deref().unwrap_or("<nil>")
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.method)?;
        if let Some(scheme) = &self.scheme {
            write!(f, " {scheme}")?;
        }
        write!(f, " {}", self.path_or_nil())
    }
}

/// Logged before a request is forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    /// Request line.
    pub line: RequestLine,
    /// Header fields, when the policy asks for them.
    pub headers: Option<HeaderFields>,
    /// Body representation, when the policy asks for it and there is a body.
    pub body: Option<BodyLog>,
}

/// Logged after a response came back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    /// Response status code.
    pub status: u16,
    /// Line of the request this response answers.
    pub line: RequestLine,
    /// Header fields, when the policy asks for them.
    pub headers: Option<HeaderFields>,
    /// Body representation, when the policy asks for it and there is a body.
    pub body: Option<BodyLog>,
}

/// Logged when the rest of the chain failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    /// Line of the failed request.
    pub line: RequestLine,
    /// Human-readable error description.
    pub error: String,
}

/// One log record, rendered as a few lines of text by [`fmt::Display`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    /// A request is about to be forwarded.
    Request(RequestRecord),
    /// A response came back.
    Response(ResponseRecord),
    /// The exchange failed.
    Failure(FailureRecord),
}

fn write_sections(
    f: &mut fmt::Formatter<'_>,
    headers: Option<&HeaderFields>,
    body: Option<&BodyLog>,
) -> fmt::Result {
    if let Some(headers) = headers {
        f.write_str("\nHeaders:")?;
        for (name, value) in headers.iter() {
            write!(f, "\n{name}={value}")?;
        }
    }
    if let Some(body) = body {
        write!(f, "\nBody:\n{body}")?;
    }
    Ok(())
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(record) => {
                write!(f, "Request: {}", record.line)?;
                write_sections(f, record.headers.as_ref(), record.body.as_ref())
            }
            Self::Response(record) => {
                write!(f, "Response: {} {}", record.status, record.line)?;
                write_sections(f, record.headers.as_ref(), record.body.as_ref())
            }
            Self::Failure(record) => write!(
                f,
                "Request {} {} error: {}",
                record.line.method,
                record.line.path_or_nil(),
                record.error
            ),
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Middleware that logs every exchange going through it.
///
/// It works for any destination type, so the same instance can sit in a
/// client chain or a server chain; the destination itself is never logged.
/// Errors are logged and returned unchanged.
///
/// # Example
///
/// ```ignore
/// use newsapi::middleware::{BodyLoggingPolicy, LoggingMiddleware, LoggingPolicy};
///
/// let logging = LoggingMiddleware::new()
///     .with_logging_policy(LoggingPolicy::REQUEST_HEADERS | LoggingPolicy::BODY)
///     .with_body_policy(BodyLoggingPolicy::UpTo { max_bytes: 512 });
/// ```
#[derive(Clone)]
pub struct LoggingMiddleware {
    logging_policy: LoggingPolicy,
    body_policy: BodyLoggingPolicy,
    sink: Arc<dyn LogSink>,
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggingMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingMiddleware")
            .field("logging_policy", &self.logging_policy)
            .field("body_policy", &self.body_policy)
            .finish_non_exhaustive()
    }
}

impl LoggingMiddleware {
    /// Full logging, bodies up to 2048 bytes, records sent to `tracing`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            logging_policy: LoggingPolicy::FULL,
            body_policy: BodyLoggingPolicy::default(),
            sink: Arc::new(TracingSink),
        }
    }

    /// Sets which optional sections are logged.
    #[must_use]
    pub const fn with_logging_policy(mut self, policy: LoggingPolicy) -> Self {
        self.logging_policy = policy;
        self
    }

    /// Sets how much of a body may be captured.
    #[must_use]
    pub const fn with_body_policy(mut self, policy: BodyLoggingPolicy) -> Self {
        self.body_policy = policy;
        self
    }

    /// Sends records to another sink.
    #[must_use]
    pub fn with_sink(self, sink: impl LogSink + 'static) -> Self {
        self.with_shared_sink(Arc::new(sink))
    }

    /// Sends records to a sink shared with other components.
    #[must_use]
    pub fn with_shared_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Active logging policy.
    #[must_use]
    pub const fn logging_policy(&self) -> LoggingPolicy {
        self.logging_policy
    }

    /// Active body logging policy.
    #[must_use]
    pub const fn body_policy(&self) -> BodyLoggingPolicy {
        self.body_policy
    }

    fn body_section(&self, body: BodyLog) -> Option<BodyLog> {
        (self.logging_policy.contains(LoggingPolicy::BODY) && body != BodyLog::None)
            .then_some(body)
    }

    fn request_record(&self, request: &Request, body: BodyLog) -> LogRecord {
        LogRecord::Request(RequestRecord {
            line: RequestLine::of(request),
            headers: self
                .logging_policy
                .contains(LoggingPolicy::REQUEST_HEADERS)
                .then(|| request.headers().clone()),
            body: self.body_section(body),
        })
    }

    fn response_record(&self, line: RequestLine, response: &Response, body: BodyLog) -> LogRecord {
        LogRecord::Response(ResponseRecord {
            status: response.status(),
            line,
            headers: self
                .logging_policy
                .contains(LoggingPolicy::RESPONSE_HEADERS)
                .then(|| response.headers().clone()),
            body: self.body_section(body),
        })
    }

    async fn exchange<D: Send + 'static>(
        &self,
        request: Request,
        body: Option<Body>,
        destination: D,
        next: Next<'_, D>,
    ) -> Result<Exchange> {
        let (request_body_log, request_body) = self.body_policy.process(body).await?;
        self.sink.emit(&self.request_record(&request, request_body_log));

        let line = RequestLine::of(&request);
        let outcome = match next.run(request, request_body, destination).await {
            Ok((response, response_body)) => self
                .body_policy
                .process(response_body)
                .await
                .map(|(log, body)| (response, log, body)),
            Err(error) => Err(error),
        };

        match outcome {
            Ok((response, response_body_log, response_body)) => {
                self.sink
                    .emit(&self.response_record(line, &response, response_body_log));
                Ok((response, response_body))
            }
            Err(error) => {
                self.sink.emit(&failure_record(line, &error));
                Err(error)
            }
        }
    }
}

fn failure_record(line: RequestLine, error: &Error) -> LogRecord {
    LogRecord::Failure(FailureRecord {
        line,
        error: error.to_string(),
    })
}

impl<D: Send + 'static> Middleware<D> for LoggingMiddleware {
    fn intercept<'a>(
        &'a self,
        request: Request,
        body: Option<Body>,
        destination: D,
        operation_id: &'a str,
        next: Next<'a, D>,
    ) -> BoxFuture<'a, Result<Exchange>> {
        let span = info_span!("http_exchange", operation_id);
        Box::pin(
            self.exchange(request, body, destination, next)
                .instrument(span),
        )
    }
}
