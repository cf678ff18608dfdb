//! Response wrapper carrying a structured value.
//!
//! [`TransitResponse`] does not encode anything itself: it stores the value
//! in the response extensions as [`ResponseValue`] and leaves the body empty,
//! so the encoder in [`TransitLayer`] can stream it in the negotiated format.
//! Scalar values are not encodable and are rendered as plain text instead.
//!
//! [`TransitLayer`]: crate::layer::TransitLayer

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use transit_axum_core::Value;

/// The structured value a handler responded with.
#[derive(Debug, Clone)]
pub struct ResponseValue(pub Value);

/// A handler response whose body is encoded by the transit layer.
#[derive(Debug, Clone)]
pub struct TransitResponse {
    status: StatusCode,
    headers: HeaderMap,
    value: Value,
}

impl TransitResponse {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            value: value.into(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Add a response header. Invalid names or values are dropped.
    pub fn with_header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let key_str = key.as_ref();
        let val_str = value.as_ref();

        match HeaderName::from_bytes(key_str.as_bytes()) {
            Ok(name) => match HeaderValue::from_str(val_str) {
                Ok(val) => {
                    self.headers.append(name, val);
                }
                Err(e) => {
                    tracing::debug!(
                        key = key_str,
                        value = val_str,
                        error = %e,
                        "invalid header value, header dropped"
                    );
                }
            },
            Err(e) => {
                tracing::debug!(key = key_str, error = %e, "invalid header name, header dropped");
            }
        }
        self
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

fn scalar_body(value: &Value) -> Body {
    match value {
        Value::Nil => Body::empty(),
        Value::Int(i) => Body::from(i.to_string()),
        Value::Float(f) => Body::from(f.to_string()),
        Value::Str(s) => Body::from(s.clone()),
        Value::Keyword(k) => Body::from(k.name().to_owned()),
        Value::Uuid(id) => Body::from(id.to_string()),
        _ => Body::empty(),
    }
}

impl IntoResponse for TransitResponse {
    fn into_response(self) -> Response {
        let body = if self.value.is_encodable() {
            Body::empty()
        } else {
            scalar_body(&self.value)
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        response.headers_mut().extend(self.headers);
        response.extensions_mut().insert(ResponseValue(self.value));
        response
    }
}
