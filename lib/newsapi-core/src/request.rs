//! HTTP request head.
//!
//! A [`Request`] carries everything but the body: the body travels next to it
//! through the middleware chain so a middleware can substitute it.
//!
//! # Example
//!
//! ```
//! use newsapi_core::{Method, Request};
//!
//! let request = Request::builder(Method::GET, "/article/getArticles")
//!     .scheme("https")
//!     .header(newsapi_core::header::ACCEPT, "application/json")
//!     .build();
//!
//! assert_eq!(request.path(), Some("/article/getArticles"));
//! ```

use http::{HeaderName, Method};

use crate::HeaderFields;

/// An HTTP request head: method, scheme, authority, path and header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    scheme: Option<String>,
    authority: Option<String>,
    path: Option<String>,
    headers: HeaderFields,
}

impl Request {
    /// Creates a new [`RequestBuilder`] for a path (with optional query).
    #[must_use]
    pub fn builder(method: Method, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, path)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// URL scheme, if known at this point.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Authority (host and port), if known at this point.
    #[must_use]
    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    /// Replaces the scheme.
    pub fn set_scheme(&mut self, scheme: impl Into<String>) {
        self.scheme = Some(scheme.into());
    }

    /// Replaces the authority.
    pub fn set_authority(&mut self, authority: impl Into<String>) {
        self.authority = Some(authority.into());
    }

    /// Path and query.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Header fields.
    #[must_use]
    pub const fn headers(&self) -> &HeaderFields {
        &self.headers
    }

    /// Mutable access to header fields.
    #[must_use]
    pub const fn headers_mut(&mut self) -> &mut HeaderFields {
        &mut self.headers
    }

    /// Single header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    scheme: Option<String>,
    authority: Option<String>,
    path: String,
    headers: HeaderFields,
}

impl RequestBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            scheme: None,
            authority: None,
            path: path.into(),
            headers: HeaderFields::new(),
        }
    }

    /// Sets the scheme.
    #[must_use]
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Sets the authority.
    #[must_use]
    pub fn authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    /// Appends a header field.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Appends a query string, `?` or `&` is added as needed.
    ///
    /// An empty query leaves the path untouched.
    #[must_use]
    pub fn query(mut self, query: &str) -> Self {
        if query.is_empty() {
            return self;
        }
        let separator = if self.path.contains('?') { '&' } else { '?' };
        self.path.push(separator);
        self.path.push_str(query);
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            scheme: self.scheme,
            authority: self.authority,
            path: Some(self.path),
            headers: self.headers,
        }
    }
}
