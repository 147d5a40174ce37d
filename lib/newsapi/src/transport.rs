//! HTTP transport using hyper-util.
//!
//! [`HyperTransport`] is the innermost step of a client chain: it resolves the
//! request against the server URL, sends it over a pooled connection and hands
//! back the response head with a streaming body.

use bytes::Bytes;
use futures_util::{TryStreamExt, future};
use http::header::CONTENT_LENGTH;
use http_body::Frame;
use http_body_util::{
    BodyExt, BodyStream as FrameStream, Empty, StreamBody, combinators::UnsyncBoxBody,
};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use newsapi_core::{
    Body, BodyLength, BoxFuture, Endpoint, Error, Exchange, HeaderFields, Method, Request, Response,
    Result,
};
use tracing::debug;
use url::Url;

use crate::{ClientConfig, connector::https_connector};

type RequestBody = UnsyncBoxBody<Bytes, Error>;

/// Pooled HTTP/1.1 and HTTP/2 transport over rustls.
///
/// Cloning is cheap: clones share the connection pool.
///
/// # Example
///
/// ```ignore
/// use newsapi::{ClientConfig, HyperTransport};
/// use std::time::Duration;
///
/// let transport = HyperTransport::with_config(ClientConfig {
///     timeout: Duration::from_secs(10),
///     ..ClientConfig::default()
/// });
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    inner: Client<HttpsConnector<HttpConnector>, RequestBody>,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransport {
    /// Create a transport with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a transport with a custom configuration.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let connector = https_connector(&config);

        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(connector);

        Self { inner, config }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn execute(
        &self,
        request: Request,
        body: Option<Body>,
        base_url: Url,
    ) -> Result<Exchange> {
        let method = request.method().clone();
        let url = resolve_url(&base_url, request.path())?;
        let hyper_request = build_hyper_request(&request, body, &url)?;
        debug!(%method, %url, "sending request");

        let response = tokio::time::timeout(self.config.timeout, self.inner.request(hyper_request))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(map_hyper_error)?;

        let (parts, incoming) = response.into_parts();
        let status = parts.status.as_u16();
        let headers = HeaderFields::from_header_map(&parts.headers);

        let body = response_length(&method, status, &parts.headers).map(|length| {
            // `BodyStream` is both a `Body` and a `Stream`
            let frames = TryStreamExt::map_err(FrameStream::new(incoming), |e| {
                Error::body(e.to_string())
            });
            let chunks =
                frames.try_filter_map(|frame| future::ready(Ok(frame.into_data().ok())));
            Body::from_stream(chunks, length)
        });

        Ok((Response::new(status, headers), body))
    }
}

impl Endpoint<Url> for HyperTransport {
    fn call<'a>(
        &'a self,
        request: Request,
        body: Option<Body>,
        base_url: Url,
        _operation_id: &'a str,
    ) -> BoxFuture<'a, Result<Exchange>> {
        Box::pin(self.execute(request, body, base_url))
    }
}

/// Appends the request path (and query) to the server URL path.
fn resolve_url(base_url: &Url, path: Option<&str>) -> Result<Url> {
    let mut url = base_url.clone();
    let Some(path) = path else {
        return Ok(url);
    };
    let (path, query) = match path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path, None),
    };
    if !path.is_empty() && !path.starts_with('/') {
        return Err(Error::invalid_request(format!(
            "request path must be absolute: {path}"
        )));
    }
    let joined = format!("{}{path}", base_url.path().trim_end_matches('/'));
    url.set_path(&joined);
    if query.is_some() {
        url.set_query(query);
    }
    Ok(url)
}

fn build_hyper_request(
    request: &Request,
    body: Option<Body>,
    url: &Url,
) -> Result<http::Request<RequestBody>> {
    let mut headers = request.headers().to_header_map()?;
    let body = match body {
        Some(body) => {
            if let BodyLength::Known(length) = body.length()
                && !headers.contains_key(CONTENT_LENGTH)
            {
                headers.insert(CONTENT_LENGTH, http::HeaderValue::from(length));
            }
            let frames = body.into_stream().map_ok(Frame::data);
            StreamBody::new(frames).boxed_unsync()
        }
        None => Empty::<Bytes>::new()
            .map_err(|never| match never {})
            .boxed_unsync(),
    };

    let mut http_request = http::Request::builder()
        .method(request.method().clone())
        .uri(url.as_str())
        .body(body)
        .map_err(|e| Error::invalid_request(e.to_string()))?;
    *http_request.headers_mut() = headers;

    Ok(http_request)
}

/// Length hint of the response body, or `None` when there is no body.
fn response_length(method: &Method, status: u16, headers: &http::HeaderMap) -> Option<BodyLength> {
    if *method == Method::HEAD || status == 204 || status == 304 {
        return None;
    }
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());
    match declared {
        Some(0) => None,
        Some(length) => Some(BodyLength::Known(length)),
        None => Some(BodyLength::Unknown),
    }
}

#[allow(clippy::needless_pass_by_value)]
fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
    let msg = err.to_string();

    if is_tls_failure(&err) {
        return Error::tls(msg);
    }

    Error::connection(msg)
}

fn is_tls_failure(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut cause = Some(err);
    while let Some(current) = cause {
        if current.downcast_ref::<rustls::Error>().is_some() {
            return true;
        }
        if let Some(io) = current.downcast_ref::<std::io::Error>()
            && io
                .get_ref()
                .is_some_and(|inner| inner.downcast_ref::<rustls::Error>().is_some())
        {
            return true;
        }
        let text = current.to_string().to_ascii_lowercase();
        if text.contains("tls") || text.contains("ssl") || text.contains("certificate") {
            return true;
        }
        cause = current.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use http::HeaderValue;

    use super::*;

    fn server() -> Url {
        Url::parse("https://eventregistry.org/api/v1").expect("valid url")
    }

    #[test]
    fn resolve_appends_path_and_query() {
        let url = resolve_url(&server(), Some("/article/getArticles?lang=eng&lang=deu"));
        let_assert!(Ok(url) = url);
        check!(url.as_str() == "https://eventregistry.org/api/v1/article/getArticles?lang=eng&lang=deu");
    }

    #[test]
    fn resolve_handles_trailing_slash() {
        let base = Url::parse("http://127.0.0.1:8080/").expect("valid url");
        let url = resolve_url(&base, Some("/article/getArticles"));
        let_assert!(Ok(url) = url);
        check!(url.as_str() == "http://127.0.0.1:8080/article/getArticles");
    }

    #[test]
    fn resolve_without_path_keeps_server_url() {
        let url = resolve_url(&server(), None);
        let_assert!(Ok(url) = url);
        check!(url == server());
    }

    #[test]
    fn resolve_rejects_relative_path() {
        let result = resolve_url(&server(), Some("article"));
        let_assert!(Err(Error::InvalidRequest(_)) = result);
    }

    #[test]
    fn response_length_rules() {
        let mut headers = http::HeaderMap::new();
        check!(response_length(&Method::GET, 200, &headers) == Some(BodyLength::Unknown));
        check!(response_length(&Method::HEAD, 200, &headers).is_none());
        check!(response_length(&Method::GET, 204, &headers).is_none());
        check!(response_length(&Method::GET, 304, &headers).is_none());

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("3000"));
        check!(response_length(&Method::GET, 200, &headers) == Some(BodyLength::Known(3000)));

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        check!(response_length(&Method::GET, 200, &headers).is_none());
    }

    #[test]
    fn request_with_known_body_gets_content_length() {
        let request = Request::builder(Method::POST, "/echo").build();
        let url = server();
        let http_request = build_hyper_request(&request, Some(Body::from("hello")), &url);
        let_assert!(Ok(http_request) = http_request);
        check!(http_request.headers().get(CONTENT_LENGTH) == Some(&HeaderValue::from_static("5")));
        check!(*http_request.method() == Method::POST);
    }

    #[test]
    fn request_headers_keep_duplicates() {
        let request = Request::builder(Method::GET, "/")
            .header(http::header::ACCEPT, "application/json")
            .header(http::header::ACCEPT, "text/plain")
            .build();
        let http_request = build_hyper_request(&request, None, &server());
        let_assert!(Ok(http_request) = http_request);
        let values: Vec<_> = http_request
            .headers()
            .get_all(http::header::ACCEPT)
            .iter()
            .collect();
        check!(values == vec!["application/json", "text/plain"]);
    }

    #[test]
    fn tls_failures_are_recognized() {
        let io = std::io::Error::other(rustls::Error::General("bad handshake".to_string()));
        check!(is_tls_failure(&io));

        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        check!(!is_tls_failure(&refused));
    }
}
