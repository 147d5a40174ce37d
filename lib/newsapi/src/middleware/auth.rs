//! API key authentication middleware.
//!
//! Sets the API key header on every outgoing request before forwarding it.

use std::sync::Arc;

use newsapi_core::{Body, BoxFuture, Exchange, HeaderName, Middleware, Next, Request, Result};
use url::Url;

/// Header carrying the API key.
pub const RAPIDAPI_KEY: HeaderName = HeaderName::from_static("x-rapidapi-key");

/// Middleware that adds the API key header to all outgoing requests.
///
/// An existing value for the header is replaced, never duplicated.
///
/// # Example
///
/// ```ignore
/// use newsapi::middleware::AuthenticationMiddleware;
/// use newsapi_core::MiddlewareChain;
///
/// let chain = MiddlewareChain::new().with(AuthenticationMiddleware::new("my-secret-key"));
/// ```
#[derive(Clone)]
pub struct AuthenticationMiddleware {
    header: HeaderName,
    token: Arc<str>,
}

impl std::fmt::Debug for AuthenticationMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationMiddleware")
            .field("header", &self.header)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl AuthenticationMiddleware {
    /// Authenticate with the given API key in the `x-rapidapi-key` header.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_header(RAPIDAPI_KEY, token)
    }

    /// Authenticate with the given token in a custom header.
    pub fn with_header(header: HeaderName, token: impl Into<String>) -> Self {
        Self {
            header,
            token: Arc::from(token.into()),
        }
    }

    /// Name of the header being set.
    #[must_use]
    pub const fn header(&self) -> &HeaderName {
        &self.header
    }
}

impl Middleware<Url> for AuthenticationMiddleware {
    fn intercept<'a>(
        &'a self,
        mut request: Request,
        body: Option<Body>,
        base_url: Url,
        _operation_id: &'a str,
        next: Next<'a, Url>,
    ) -> BoxFuture<'a, Result<Exchange>> {
        request
            .headers_mut()
            .set(self.header.clone(), self.token.as_ref());
        next.run(request, body, base_url)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use assert2::{check, let_assert};
    use newsapi_core::{
        Error, Method, MiddlewareChain, Response, endpoint_fn, header::ACCEPT,
    };

    use super::*;

    type Seen = Arc<Mutex<Vec<(String, String)>>>;

    async fn send(auth: AuthenticationMiddleware, request: Request) -> Vec<(String, String)> {
        let seen: Seen = Arc::default();
        let recorder = Arc::clone(&seen);
        let handler = MiddlewareChain::new().with(auth).build(endpoint_fn(
            move |request: Request, _body: Option<Body>, _url: Url| {
                let fields = request
                    .headers()
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect();
                *recorder.lock().expect("lock") = fields;
                async { Ok::<Exchange, Error>((Response::with_status(200), None)) }
            },
        ));

        let url = Url::parse("https://eventregistry.org/api/v1").expect("valid url");
        let result = handler.handle(request, None, url, "getArticles").await;
        let_assert!(Ok(_) = result);
        let fields = seen.lock().expect("lock").clone();
        fields
    }

    fn pair(name: &str, value: &str) -> (String, String) {
        (name.to_string(), value.to_string())
    }

    #[tokio::test]
    async fn adds_api_key_header() {
        let request = Request::builder(Method::GET, "/article/getArticles").build();
        let fields = send(AuthenticationMiddleware::new("k1"), request).await;
        check!(fields == vec![pair("x-rapidapi-key", "k1")]);
    }

    #[tokio::test]
    async fn replaces_existing_value_in_place() {
        let request = Request::builder(Method::GET, "/article/getArticles")
            .header(RAPIDAPI_KEY, "stale")
            .header(ACCEPT, "application/json")
            .header(RAPIDAPI_KEY, "duplicate")
            .build();

        let fields = send(AuthenticationMiddleware::new("k1"), request).await;

        check!(fields == vec![pair("x-rapidapi-key", "k1"), pair("accept", "application/json")]);
    }

    #[tokio::test]
    async fn other_headers_keep_their_order() {
        let request = Request::builder(Method::GET, "/article/getArticles")
            .header(ACCEPT, "application/json")
            .header(HeaderName::from_static("x-trace"), "abc")
            .build();

        let fields = send(AuthenticationMiddleware::new("k1"), request).await;

        check!(
            fields
                == vec![
                    pair("accept", "application/json"),
                    pair("x-trace", "abc"),
                    pair("x-rapidapi-key", "k1"),
                ]
        );
    }

    #[tokio::test]
    async fn custom_header_name() {
        let auth = AuthenticationMiddleware::with_header(HeaderName::from_static("x-api-key"), "k2");
        check!(auth.header() == "x-api-key");

        let request = Request::builder(Method::GET, "/").build();
        let fields = send(auth, request).await;
        check!(fields == vec![pair("x-api-key", "k2")]);
    }

    #[test]
    fn debug_hides_token() {
        let auth = AuthenticationMiddleware::new("super-secret");
        check!(!format!("{auth:?}").contains("super-secret"));
    }
}
