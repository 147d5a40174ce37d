//! Typed news API client.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use newsapi_core::{
    Body, Endpoint, Exchange, Handler, Method, Middleware, MiddlewareChain, Request, Result,
    from_json, header::ACCEPT, to_query_string,
};
use tracing::debug;
use url::Url;

use crate::{
    ClientConfig, HyperTransport,
    articles::{GetArticlesOutput, GetArticlesQuery, UndocumentedPayload},
    servers,
};

/// Client for the Event Registry news API.
///
/// Every operation goes through the middleware chain configured on the
/// builder, then through the transport.
///
/// # Example
///
/// ```ignore
/// use newsapi::{GetArticlesQuery, GetArticlesOutput, NewsClient};
/// use newsapi::middleware::{AuthenticationMiddleware, LoggingMiddleware};
///
/// let client = NewsClient::builder()
///     .middleware(AuthenticationMiddleware::new("my-key"))
///     .middleware(LoggingMiddleware::new())
///     .build()?;
///
/// match client.get_articles(&GetArticlesQuery::default()).await? {
///     GetArticlesOutput::Ok(page) => println!("{} articles", page.articles.total_results),
///     GetArticlesOutput::Undocumented { status, .. } => println!("status {status}"),
/// }
/// ```
#[derive(Clone)]
pub struct NewsClient {
    handler: Handler<Url>,
    server_url: Url,
}

impl std::fmt::Debug for NewsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsClient")
            .field("server_url", &self.server_url.as_str())
            .field("handler", &self.handler)
            .finish()
    }
}

impl NewsClient {
    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> NewsClientBuilder {
        NewsClientBuilder::default()
    }

    /// Server URL every request is resolved against.
    #[must_use]
    pub const fn server_url(&self) -> &Url {
        &self.server_url
    }

    /// Sends a raw request through the middleware chain.
    ///
    /// The scheme and authority of the server URL are filled in when the
    /// request has none.
    ///
    /// # Errors
    ///
    /// Returns whatever error a middleware or the transport raised.
    pub async fn send(
        &self,
        mut request: Request,
        body: Option<Body>,
        operation_id: &str,
    ) -> Result<Exchange> {
        if request.scheme().is_none() {
            request.set_scheme(self.server_url.scheme());
        }
        if request.authority().is_none()
            && let Some(authority) = authority(&self.server_url)
        {
            request.set_authority(authority);
        }
        self.handler
            .handle(request, body, self.server_url.clone(), operation_id)
            .await
    }

    /// `GET /article/getArticles`: search articles.
    ///
    /// # Errors
    ///
    /// Fails when the query cannot be serialized, when the exchange fails, or
    /// when a `200` body does not match [`crate::ArticlesResponse`]. Other
    /// statuses are returned as [`GetArticlesOutput::Undocumented`].
    pub async fn get_articles(&self, query: &GetArticlesQuery) -> Result<GetArticlesOutput> {
        let query = to_query_string(query)?;
        let request = Request::builder(Method::GET, "/article/getArticles")
            .query(&query)
            .header(ACCEPT, "application/json")
            .build();

        let (response, body) = self.send(request, None, "getArticles").await?;
        let bytes = match body {
            Some(body) => body.into_bytes().await?,
            None => Bytes::new(),
        };

        match response.status() {
            200 => {
                let articles = from_json(&bytes)?;
                Ok(GetArticlesOutput::Ok(articles))
            }
            status => {
                debug!(status, operation_id = "getArticles", "undocumented response");
                Ok(GetArticlesOutput::Undocumented {
                    status,
                    payload: UndocumentedPayload {
                        headers: response.into_headers(),
                        body: bytes,
                    },
                })
            }
        }
    }
}

fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Builder for [`NewsClient`].
///
/// Defaults to [`servers::server1`] and a [`HyperTransport`] built from the
/// configured timeouts. Middleware runs in insertion order: the first one
/// added sees the request first.
#[derive(Default)]
pub struct NewsClientBuilder {
    server_url: Option<Url>,
    config: ClientConfig,
    transport: Option<Arc<dyn Endpoint<Url>>>,
    chain: MiddlewareChain<Url>,
}

impl std::fmt::Debug for NewsClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsClientBuilder")
            .field("server_url", &self.server_url.as_ref().map(Url::as_str))
            .field("config", &self.config)
            .field("custom_transport", &self.transport.is_some())
            .field("middleware_count", &self.chain.len())
            .finish()
    }
}

impl NewsClientBuilder {
    /// Set the server URL.
    #[must_use]
    pub fn server_url(mut self, url: Url) -> Self {
        self.server_url = Some(url);
        self
    }

    /// Set the request timeout of the default transport.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout of the default transport.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set how many idle connections the default transport keeps per host.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config.pool_idle_per_host = count;
        self
    }

    /// Set how long the default transport keeps an idle connection.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Replace every transport setting at once.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Use another transport instead of [`HyperTransport`].
    #[must_use]
    pub fn transport(mut self, transport: impl Endpoint<Url> + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Append a middleware to the chain.
    #[must_use]
    pub fn middleware(mut self, middleware: impl Middleware<Url> + 'static) -> Self {
        self.chain = self.chain.with(middleware);
        self
    }

    /// Append a middleware shared with other chains.
    #[must_use]
    pub fn shared_middleware(mut self, middleware: Arc<dyn Middleware<Url>>) -> Self {
        self.chain = self.chain.with_shared(middleware);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Fails only if the default server URL cannot be parsed.
    pub fn build(self) -> Result<NewsClient> {
        let server_url = match self.server_url {
            Some(url) => url,
            None => servers::server1()?,
        };
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HyperTransport::with_config(self.config)),
        };
        Ok(NewsClient {
            handler: self.chain.build_shared(transport),
            server_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use assert2::{check, let_assert};
    use newsapi_core::{Error, HeaderFields, Response, endpoint_fn, header::CONTENT_TYPE};

    use super::*;
    use crate::articles::{Language, ResultType};

    type Captured = Arc<Mutex<Option<Request>>>;

    fn json_reply(status: u16, json: &'static str) -> Result<Exchange> {
        let mut headers = HeaderFields::new();
        headers.append(CONTENT_TYPE, "application/json");
        Ok((Response::new(status, headers), Some(Body::from(json))))
    }

    fn client_replying(status: u16, json: &'static str) -> (NewsClient, Captured) {
        let captured: Captured = Arc::default();
        let slot = Arc::clone(&captured);
        let client = NewsClient::builder()
            .server_url(Url::parse("https://news.test:8443/api/v1").expect("valid url"))
            .transport(endpoint_fn(
                move |request: Request, _body: Option<Body>, _url: Url| {
                    *slot.lock().expect("lock") = Some(request);
                    async move { json_reply(status, json) }
                },
            ))
            .build()
            .expect("client");
        (client, captured)
    }

    #[test]
    fn builder_defaults_to_server1() {
        let client = NewsClient::builder().build();
        let_assert!(Ok(client) = client);
        check!(client.server_url().as_str() == "https://eventregistry.org/api/v1");
    }

    #[test]
    fn builder_collects_transport_settings() {
        let builder = NewsClient::builder()
            .timeout(Duration::from_secs(5))
            .pool_idle_per_host(4);
        check!(builder.config.timeout == Duration::from_secs(5));
        check!(builder.config.pool_idle_per_host == 4);
        check!(builder.config.connect_timeout == Duration::from_secs(10));
        check!(builder.config.pool_idle_timeout == Duration::from_secs(90));

        let builder = builder
            .config(ClientConfig::default())
            .connect_timeout(Duration::from_secs(2))
            .pool_idle_timeout(Duration::from_secs(1));
        check!(builder.config.timeout == Duration::from_secs(30));
        check!(builder.config.connect_timeout == Duration::from_secs(2));
        check!(builder.config.pool_idle_timeout == Duration::from_secs(1));
    }

    #[tokio::test]
    async fn get_articles_builds_the_request() {
        let (client, captured) =
            client_replying(200, r#"{"articles":{"page":1,"pages":0,"totalResults":0,"results":[]}}"#);
        let query = GetArticlesQuery {
            result_type: Some(ResultType::Articles),
            lang: vec![Language::Eng],
            ..GetArticlesQuery::default()
        };

        let output = client.get_articles(&query).await;
        let_assert!(Ok(GetArticlesOutput::Ok(page)) = output);
        check!(page.articles.page == 1);

        let request = captured.lock().expect("lock").take();
        let_assert!(Some(request) = request);
        check!(*request.method() == Method::GET);
        check!(request.scheme() == Some("https"));
        check!(request.authority() == Some("news.test:8443"));
        check!(request.path() == Some("/article/getArticles?resultType=articles&lang=eng"));
        check!(request.header("accept") == Some("application/json"));
    }

    #[tokio::test]
    async fn other_status_is_undocumented() {
        let (client, _) = client_replying(429, r#"{"error":"quota exceeded"}"#);

        let output = client.get_articles(&GetArticlesQuery::default()).await;
        let_assert!(Ok(GetArticlesOutput::Undocumented { status, payload }) = output);
        check!(status == 429);
        check!(payload.body == r#"{"error":"quota exceeded"}"#);
        check!(payload.headers.get("content-type") == Some("application/json"));
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let (client, _) = client_replying(200, r#"{"articles":{"page":"first"}}"#);

        let output = client.get_articles(&GetArticlesQuery::default()).await;
        let_assert!(Err(error) = output);
        check!(error.is_decode());
        let_assert!(Error::JsonDeserialization { path, .. } = error);
        check!(path == "articles.page");
    }
}
