//! HTTP response head.
//!
//! Like [`crate::Request`], a [`Response`] does not own its body.

use crate::HeaderFields;

/// An HTTP response head: status code and header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: HeaderFields,
}

impl Response {
    /// Creates a new response.
    #[must_use]
    pub const fn new(status: u16, headers: HeaderFields) -> Self {
        Self { status, headers }
    }

    /// Creates a response with no header field.
    #[must_use]
    pub const fn with_status(status: u16) -> Self {
        Self::new(status, HeaderFields::new())
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response header fields.
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

    /// Consume into header fields.
    #[must_use]
    pub fn into_headers(self) -> HeaderFields {
        self.headers
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }
}
