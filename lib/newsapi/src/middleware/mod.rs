//! Middleware for the newsapi client.
//!
//! Every middleware implements [`newsapi_core::Middleware`] and is composed
//! with [`newsapi_core::MiddlewareChain`]. The first middleware added is the
//! outermost one: it sees the request first and the response last.
//!
//! # Available Middleware
//!
//! - [`AuthenticationMiddleware`] - Sets the `x-rapidapi-key` header
//! - [`LoggingMiddleware`] - Logs requests, responses and failures, with
//!   size-aware body capture driven by [`BodyLoggingPolicy`]
//!
//! # Example
//!
//! ```ignore
//! use newsapi::middleware::{AuthenticationMiddleware, LoggingMiddleware};
//! use newsapi::NewsClient;
//!
//! let client = NewsClient::builder()
//!     .middleware(AuthenticationMiddleware::new("my-key"))
//!     .middleware(LoggingMiddleware::new())
//!     .build()?;
//! ```

mod auth;
mod body_policy;
mod logging;
mod sink;

pub use auth::{AuthenticationMiddleware, RAPIDAPI_KEY};
pub use body_policy::{BodyLog, BodyLoggingPolicy, DEFAULT_MAX_LOGGED_BYTES};
pub use logging::{
    FailureRecord, LogRecord, LoggingMiddleware, LoggingPolicy, RequestLine, RequestRecord,
    ResponseRecord,
};
pub use sink::{LogSink, TracingSink, WriterSink};
