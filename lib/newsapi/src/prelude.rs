//! Prelude module for convenient imports.
//!
//! ```ignore
//! use newsapi::prelude::*;
//! ```

pub use crate::{
    Error, GetArticlesOutput, GetArticlesQuery, Language, NewsClient, Result, ResultType, SortBy,
    middleware::{AuthenticationMiddleware, BodyLoggingPolicy, LoggingMiddleware, LoggingPolicy},
};
