//! Typed client for the Event Registry news API.
//!
//! Requests go through an ordered chain of middleware before reaching the
//! transport, and responses come back through the same chain.
//!
//! # Example
//!
//! ```ignore
//! use newsapi::prelude::*;
//! use newsapi::middleware::{AuthenticationMiddleware, LoggingMiddleware};
//!
//! let client = NewsClient::builder()
//!     .middleware(AuthenticationMiddleware::new(std::env::var("NEWSAPI_KEY")?))
//!     .middleware(LoggingMiddleware::new())
//!     .build()?;
//!
//! let query = GetArticlesQuery {
//!     concept_uri: vec!["https://en.wikipedia.org/wiki/Isaac_Newton".to_string()],
//!     lang: vec![Language::Eng],
//!     ..GetArticlesQuery::default()
//! };
//! match client.get_articles(&query).await? {
//!     GetArticlesOutput::Ok(page) => println!("{:#?}", page.articles.results),
//!     GetArticlesOutput::Undocumented { status, .. } => eprintln!("error: {status}"),
//! }
//! ```

mod articles;
mod client;
mod config;
mod connector;
pub mod middleware;
pub mod prelude;
pub mod servers;
mod transport;

pub use articles::{
    Article, Articles, ArticlesResponse, Author, GetArticlesOutput, GetArticlesQuery, Language,
    ResultType, SortBy, Source, UndocumentedPayload,
};
pub use client::{NewsClient, NewsClientBuilder};
pub use config::ClientConfig;
pub use transport::HyperTransport;

// Re-export core types
pub use newsapi_core::{
    Body, BodyLength, Endpoint, Error, Exchange, HeaderFields, Method, Middleware, MiddlewareChain,
    Next, Request, RequestBuilder, Response, Result, ServerRequestMetadata, StatusCode,
    endpoint_fn, header,
};

// Re-export url for server URLs
pub use url;
