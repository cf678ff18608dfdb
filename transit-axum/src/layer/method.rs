//! HTTP method allow-list.

use axum::body::Body;
use axum::http::header::ALLOW;
use axum::http::{HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service, ServiceExt};

/// Layer that answers 405 for methods outside the allowed set.
///
/// # Example
///
/// ```rust,ignore
/// use axum::http::Method;
/// use transit_axum::MethodFilterLayer;
///
/// let rpc = Router::new()
///     .route("/api/rpc/{name}", any(rpc))
///     .layer(MethodFilterLayer::new([Method::GET, Method::POST]));
/// ```
#[derive(Debug, Clone)]
pub struct MethodFilterLayer {
    allowed: Arc<[Method]>,
}

impl MethodFilterLayer {
    pub fn new(allowed: impl IntoIterator<Item = Method>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }
}

impl<S> Layer<S> for MethodFilterLayer {
    type Service = MethodFilterService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MethodFilterService {
            inner,
            allowed: self.allowed.clone(),
        }
    }
}

/// Service produced by [`MethodFilterLayer`].
#[derive(Debug, Clone)]
pub struct MethodFilterService<S> {
    inner: S,
    allowed: Arc<[Method]>,
}

impl<S> Service<Request<Body>> for MethodFilterService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Error: Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        if !self.allowed.contains(req.method()) {
            let response = method_not_allowed(&self.allowed);
            return Box::pin(async move { Ok(response) });
        }

        let inner = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, inner);
        Box::pin(async move { inner.oneshot(req).await })
    }
}

fn method_not_allowed(allowed: &[Method]) -> Response {
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let mut response = StatusCode::METHOD_NOT_ALLOWED.into_response();
    match HeaderValue::from_str(&allow) {
        Ok(value) => {
            response.headers_mut().insert(ALLOW, value);
        }
        Err(e) => {
            tracing::debug!(allow, error = %e, "invalid Allow header, header dropped");
        }
    }
    response
}
