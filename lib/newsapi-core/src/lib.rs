//! Core types and middleware contract for the newsapi HTTP client.
//!
//! This crate provides the foundational types used by newsapi:
//! - [`Request`] and [`RequestBuilder`] - HTTP request heads
//! - [`Response`] - HTTP response heads
//! - [`HeaderFields`] - Ordered, multi-valued header fields
//! - [`Body`] and [`BodyLength`] - Single-pass streamed bodies
//! - [`Error`] and [`Result`] - Error handling
//! - [`Middleware`], [`Next`] and [`Endpoint`] - The interception contract
//! - [`MiddlewareChain`] and [`Handler`] - Chain composition and execution
//! - [`Method`], [`StatusCode`] and [`header`] - Re-exported from the `http` crate

mod body;
mod codec;
mod error;
mod headers;
mod middleware;
pub mod prelude;
mod request;
mod response;

pub use body::{Body, BodyLength, BodyStream};
pub use codec::{from_json, to_query_string};
pub use error::{Error, Result};
pub use headers::HeaderFields;
pub use middleware::{
    BoxFuture, Call, Endpoint, EndpointFn, Exchange, Handler, Middleware, MiddlewareChain, Next,
    ServerRequestMetadata, endpoint_fn,
};
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-export http crate types for methods, status codes and headers
pub use http::{HeaderName, Method, StatusCode, header};
