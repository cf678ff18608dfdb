//! Permissive CORS headers.

use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE, ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tower::{Layer, Service, ServiceExt};

const ALLOW_METHODS: &str = "GET,POST,DELETE,OPTIONS,PUT,HEAD,PATCH";
const ALLOW_HEADERS: &str =
    "x-frontend-version, x-client, x-requested-with, accept, authorization, content-type, cookie";
const EXPOSE_HEADERS: &str = "content-type, content-length, etag, x-frontend-version";
const MAX_AGE: &str = "86400";

/// Layer that attaches CORS headers when enabled.
///
/// `OPTIONS` requests are answered with a bare 200 without reaching the inner
/// service. A disabled layer passes everything through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorsLayer {
    enabled: bool,
}

impl CorsLayer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl<S> Layer<S> for CorsLayer {
    type Service = CorsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorsService {
            inner,
            enabled: self.enabled,
        }
    }
}

/// Service produced by [`CorsLayer`].
#[derive(Debug, Clone)]
pub struct CorsService<S> {
    inner: S,
    enabled: bool,
}

impl<S> Service<Request<Body>> for CorsService<S>
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
        let inner = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, inner);

        if !self.enabled {
            return Box::pin(async move { inner.oneshot(req).await });
        }

        let origin = req.headers().get(ORIGIN).cloned();
        if req.method() == Method::OPTIONS {
            let mut response = StatusCode::OK.into_response();
            add_cors_headers(response.headers_mut(), origin);
            return Box::pin(async move { Ok(response) });
        }

        Box::pin(async move {
            let mut response = inner.oneshot(req).await?;
            add_cors_headers(response.headers_mut(), origin);
            Ok(response)
        })
    }
}

fn add_cors_headers(headers: &mut HeaderMap, origin: Option<HeaderValue>) {
    if let Some(origin) = origin {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    }
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(EXPOSE_HEADERS),
    );
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE));
}
