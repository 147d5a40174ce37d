//! Middleware contract and chain executor.
//!
//! A [`Middleware`] wraps one request/response exchange. It receives the
//! request head, its body, a destination and the operation identifier, plus a
//! [`Next`] handle representing the rest of the chain. The innermost step is
//! an [`Endpoint`]: the transport on the client side, the request handler on
//! the server side.
//!
//! The destination type `D` selects the call shape:
//! - client side: [`url::Url`], the server base URL;
//! - server side: [`ServerRequestMetadata`], connection metadata.
//!
//! [`MiddlewareChain`] composes `[m1, m2, …, mn]` around an endpoint `T` into a
//! [`Handler`] such that `H(req) = m1(req, next = m2 ∘ … ∘ mn ∘ T)`.
//! The first middleware added is the outermost one: it sees the request first
//! and the response last.
//!
//! # Example
//!
//! ```
//! use newsapi_core::{
//!     Body, Error, Exchange, Method, MiddlewareChain, Request, Response, endpoint_fn,
//! };
//!
//! # async fn run() -> newsapi_core::Result<()> {
//! let handler = MiddlewareChain::<url::Url>::new().build(endpoint_fn(
//!     |_request: Request, _body: Option<Body>, _base_url: url::Url| async {
//!         Ok::<Exchange, Error>((Response::with_status(204), None))
//!     },
//! ));
//!
//! let base_url = url::Url::parse("https://eventregistry.org/api/v1")?;
//! let request = Request::builder(Method::GET, "/article/getArticles").build();
//! let (response, _body) = handler.handle(request, None, base_url, "getArticles").await?;
//! assert_eq!(response.status(), 204);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tower_service::Service;

use crate::{Body, Error, Request, Response, Result};

/// Boxed, `Send` future returned by middleware and endpoints.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The outcome of an exchange: response head and optional body.
pub type Exchange = (Response, Option<Body>);

/// An async interceptor around one exchange.
///
/// An implementation either runs `next` once and returns its (possibly
/// transformed) result, returns early without running it, or fails. Since
/// [`Next::run`] consumes the handle, the rest of the chain cannot run twice.
pub trait Middleware<D>: Send + Sync {
    /// Intercepts a request on its way to the endpoint.
    fn intercept<'a>(
        &'a self,
        request: Request,
        body: Option<Body>,
        destination: D,
        operation_id: &'a str,
        next: Next<'a, D>,
    ) -> BoxFuture<'a, Result<Exchange>>;
}

/// The innermost step of a chain.
pub trait Endpoint<D>: Send + Sync {
    /// Performs the exchange.
    fn call<'a>(
        &'a self,
        request: Request,
        body: Option<Body>,
        destination: D,
        operation_id: &'a str,
    ) -> BoxFuture<'a, Result<Exchange>>;
}

/// The rest of the chain, as seen from one middleware.
pub struct Next<'a, D> {
    middleware: &'a [Arc<dyn Middleware<D>>],
    endpoint: &'a dyn Endpoint<D>,
    operation_id: &'a str,
}

impl<'a, D: Send + 'static> Next<'a, D> {
    /// Runs the remaining middleware, then the endpoint.
    pub fn run(
        self,
        request: Request,
        body: Option<Body>,
        destination: D,
    ) -> BoxFuture<'a, Result<Exchange>> {
        match self.middleware.split_first() {
            Some((current, rest)) => {
                let next = Next {
                    middleware: rest,
                    endpoint: self.endpoint,
                    operation_id: self.operation_id,
                };
                current.intercept(request, body, destination, self.operation_id, next)
            }
            None => self
                .endpoint
                .call(request, body, destination, self.operation_id),
        }
    }

    /// Identifier of the operation being performed.
    #[must_use]
    pub const fn operation_id(&self) -> &'a str {
        self.operation_id
    }

    /// Number of middleware left before the endpoint.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.middleware.len()
    }
}

impl<D> fmt::Debug for Next<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.middleware.len())
            .field("operation_id", &self.operation_id)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Closure endpoints
// ============================================================================

/// An [`Endpoint`] built from an async closure, see [`endpoint_fn`].
#[derive(Clone, Copy)]
pub struct EndpointFn<F> {
    f: F,
}

/// Wraps `Fn(Request, Option<Body>, D) -> impl Future<Output = Result<Exchange>>`
/// into an [`Endpoint`].
pub const fn endpoint_fn<F>(f: F) -> EndpointFn<F> {
    EndpointFn { f }
}

impl<F> fmt::Debug for EndpointFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointFn").finish_non_exhaustive()
    }
}

impl<D, F, Fut> Endpoint<D> for EndpointFn<F>
where
    F: Fn(Request, Option<Body>, D) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Exchange>> + Send + 'static,
{
    fn call<'a>(
        &'a self,
        request: Request,
        body: Option<Body>,
        destination: D,
        _operation_id: &'a str,
    ) -> BoxFuture<'a, Result<Exchange>> {
        Box::pin((self.f)(request, body, destination))
    }
}

// ============================================================================
// Server-side destination
// ============================================================================

/// Connection metadata handed to server-side middleware instead of a URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerRequestMetadata {
    /// Address of the remote peer, when the server knows it.
    pub remote_addr: Option<SocketAddr>,
    /// Path parameters extracted by the router, in template order.
    pub path_parameters: Vec<(String, String)>,
}

// ============================================================================
// Chain executor
// ============================================================================

/// Ordered list of middleware, outermost first.
pub struct MiddlewareChain<D> {
    middleware: Vec<Arc<dyn Middleware<D>>>,
}

impl<D> Default for MiddlewareChain<D> {
    fn default() -> Self {
        Self {
            middleware: Vec::new(),
        }
    }
}

impl<D> fmt::Debug for MiddlewareChain<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("middleware_count", &self.middleware.len())
            .finish()
    }
}

impl<D: Send + 'static> MiddlewareChain<D> {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware; it runs inside every middleware added before it.
    #[must_use]
    pub fn with(self, middleware: impl Middleware<D> + 'static) -> Self {
        self.with_shared(Arc::new(middleware))
    }

    /// Appends a middleware that is shared with other chains.
    #[must_use]
    pub fn with_shared(mut self, middleware: Arc<dyn Middleware<D>>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Number of middleware in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    /// `true` when no middleware was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Closes the chain around an endpoint.
    #[must_use]
    pub fn build(self, endpoint: impl Endpoint<D> + 'static) -> Handler<D> {
        self.build_shared(Arc::new(endpoint))
    }

    /// Closes the chain around a shared endpoint.
    #[must_use]
    pub fn build_shared(self, endpoint: Arc<dyn Endpoint<D>>) -> Handler<D> {
        Handler {
            middleware: self.middleware.into(),
            endpoint,
        }
    }
}

/// A middleware chain closed around its endpoint.
///
/// Cloning is cheap: middleware and endpoint are shared.
pub struct Handler<D> {
    middleware: Arc<[Arc<dyn Middleware<D>>]>,
    endpoint: Arc<dyn Endpoint<D>>,
}

impl<D> Clone for Handler<D> {
    fn clone(&self) -> Self {
        Self {
            middleware: Arc::clone(&self.middleware),
            endpoint: Arc::clone(&self.endpoint),
        }
    }
}

impl<D> fmt::Debug for Handler<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("middleware_count", &self.middleware.len())
            .finish_non_exhaustive()
    }
}

impl<D: Send + 'static> Handler<D> {
    /// Runs one exchange through the whole chain.
    ///
    /// # Errors
    ///
    /// Returns whatever error a middleware or the endpoint raised, unchanged.
    pub async fn handle(
        &self,
        request: Request,
        body: Option<Body>,
        destination: D,
        operation_id: &str,
    ) -> Result<Exchange> {
        let next = Next {
            middleware: &self.middleware,
            endpoint: self.endpoint.as_ref(),
            operation_id,
        };
        next.run(request, body, destination).await
    }
}

/// One exchange, as a [`Service`] request for a [`Handler`].
#[derive(Debug)]
pub struct Call<D> {
    /// Request head.
    pub request: Request,
    /// Request body.
    pub body: Option<Body>,
    /// Server URL or connection metadata.
    pub destination: D,
    /// Operation identifier.
    pub operation_id: String,
}

impl<D: Send + 'static> Service<Call<D>> for Handler<D> {
    type Response = Exchange;
    type Error = Error;
    type Future = BoxFuture<'static, Result<Exchange>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, call: Call<D>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move {
            let Call {
                request,
                body,
                destination,
                operation_id,
            } = call;
            handler
                .handle(request, body, destination, &operation_id)
                .await
        })
    }
}
