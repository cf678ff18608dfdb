//! Transit codec layer.
//!
//! See the [parent module](super) documentation for where it sits in the stack.

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tower::{Layer, Service, ServiceExt};

use crate::context::{BodyLimits, CodecConfig, ResponseFormat};
use crate::pipeline::{RequestPipeline, ResponsePipeline};

/// Layer that decodes request bodies and encodes structured responses.
///
/// # Example
///
/// ```rust,ignore
/// use transit_axum::TransitLayer;
///
/// let app = Router::new()
///     .route("/api/echo", post(echo))
///     .layer(TransitLayer::new().body_limit(4 * 1024 * 1024));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitLayer {
    config: CodecConfig,
}

impl TransitLayer {
    /// Create a layer with the default 30 MiB body limit and compact transit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a layer from a loaded configuration.
    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Set the maximum request body size in bytes.
    pub fn body_limit(mut self, max_bytes: usize) -> Self {
        self.config.limits = BodyLimits::new().max_bytes(max_bytes);
        self
    }

    /// Accept request bodies of any size.
    pub fn unlimited_body(mut self) -> Self {
        self.config.limits = BodyLimits::unlimited();
        self
    }

    /// Always emit verbose transit.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }
}

impl<S> Layer<S> for TransitLayer {
    type Service = TransitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TransitService {
            inner,
            config: self.config,
        }
    }
}

/// Service produced by [`TransitLayer`].
#[derive(Debug, Clone)]
pub struct TransitService<S> {
    inner: S,
    config: CodecConfig,
}

impl<S> Service<Request<Body>> for TransitService<S>
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
        let format = ResponseFormat::negotiate(req.uri(), req.headers(), self.config.verbose);
        let limits = self.config.limits;

        let inner = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, inner);

        Box::pin(async move {
            let req = match RequestPipeline::decode(req, limits).await {
                Ok(req) => req,
                Err(err) => return Ok(err.into_response()),
            };
            let response = inner.oneshot(req).await?;
            Ok(ResponsePipeline::encode(response, format))
        })
    }
}
