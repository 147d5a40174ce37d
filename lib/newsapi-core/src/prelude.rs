//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use newsapi_core::prelude::*;
//! ```

pub use crate::{
    Body, BodyLength, BoxFuture, Endpoint, Error, Exchange, HeaderFields, Handler, Method,
    Middleware, MiddlewareChain, Next, Request, Response, Result, ServerRequestMetadata,
    endpoint_fn,
};
