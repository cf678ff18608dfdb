//! Request and response pipelines for the transit codec.
//!
//! Pipelines handle the full body lifecycle:
//! - RequestPipeline: read body (size limited), decode, populate parameters
//! - ResponsePipeline: negotiate-aware streaming encode of structured values

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Request, Response, header};
use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use transit_axum_core::{DecodeError, Value, decode_json, decode_transit, from_json_value};

use crate::context::{BodyLimits, CodecError, RequestFormat, ResponseFormat, translate};
use crate::request::{BodyParams, Params};
use crate::response::ResponseValue;
use crate::writer::stream_body;

// ============================================================================
// RequestPipeline
// ============================================================================

/// Request pipeline - decodes incoming request bodies into parameters.
pub struct RequestPipeline;

impl RequestPipeline {
    /// Decode the request body, if any, and store [`Params`] and
    /// [`BodyParams`] in the request extensions.
    ///
    /// The body is consumed only when it is decoded; other requests keep it.
    pub async fn decode(req: Request<Body>, limits: BodyLimits) -> Result<Request<Body>, CodecError> {
        let (mut parts, body) = req.into_parts();
        let mut params = query_params(&parts);

        let body = match RequestFormat::detect(&parts.method, &parts.headers) {
            Some(format) => {
                let value = Self::decode_body(&parts.headers, body, format, limits)
                    .await
                    .map_err(translate)?;
                if let Value::Map(map) = &value {
                    params.merge(map);
                }
                parts.extensions.insert(BodyParams(value));
                Body::empty()
            }
            None => body,
        };

        parts.extensions.insert(params);
        Ok(Request::from_parts(parts, body))
    }

    /// Read and decode a body in the given format.
    pub async fn decode_body(
        headers: &HeaderMap,
        body: Body,
        format: RequestFormat,
        limits: BodyLimits,
    ) -> Result<Value, DecodeError> {
        let bytes = read_body(headers, body, limits)
            .await
            .map_err(|e| e.wrap("reading request body"))?;
        Self::decode_bytes(&bytes, format)
            .map_err(|e| e.wrap(format!("decoding {} request body", format.as_str())))
    }

    /// Decode from raw bytes (for use when the body is already read).
    pub fn decode_bytes(bytes: &[u8], format: RequestFormat) -> Result<Value, DecodeError> {
        match format {
            RequestFormat::Transit => decode_transit(bytes),
            RequestFormat::Json => decode_json(bytes),
        }
    }
}

/// Read the whole body, enforcing the size limit.
async fn read_body(headers: &HeaderMap, body: Body, limits: BodyLimits) -> Result<Bytes, DecodeError> {
    let limit = limits.max_bytes_or_max();
    if content_length(headers).is_some_and(|len| limits.exceeds(len)) {
        return Err(DecodeError::BodyTooLarge { limit });
    }

    let collected = Limited::new(body, limit).collect().await.map_err(|e| {
        if e.downcast_ref::<LengthLimitError>().is_some() {
            DecodeError::BodyTooLarge { limit }
        } else {
            DecodeError::Io(e.to_string())
        }
    })?;
    Ok(collected.to_bytes())
}

fn content_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
}

/// Query string parameters, keyed and typed like a JSON body.
///
/// Each parameter is rebuilt on its own: one that fails its field rule is
/// logged and dropped while the others are kept.
fn query_params(parts: &Parts) -> Params {
    let Some(query) = parts.uri.query().filter(|q| !q.is_empty()) else {
        return Params::default();
    };

    let raw: serde_json::Map<String, serde_json::Value> = match serde_qs::from_str(query) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(query, error = %err, "ignoring unparseable query string");
            return Params::default();
        }
    };

    let mut params = Params::default();
    for (name, value) in raw {
        let entry = serde_json::Value::Object(serde_json::Map::from_iter([(name.clone(), value)]));
        match from_json_value(entry) {
            Ok(Value::Map(map)) => params.merge(&map),
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(param = %name, error = %err, "ignoring invalid query parameter");
            }
        }
    }
    params
}

// ============================================================================
// ResponsePipeline
// ============================================================================

/// Response pipeline - replaces structured response values with a streamed
/// body in the negotiated format.
pub struct ResponsePipeline;

impl ResponsePipeline {
    /// Encode the response if it carries an encodable [`ResponseValue`].
    ///
    /// Any other response is returned untouched.
    pub fn encode(response: Response<Body>, format: ResponseFormat) -> Response<Body> {
        let (mut parts, body) = response.into_parts();
        match parts.extensions.remove::<ResponseValue>() {
            Some(ResponseValue(value)) if value.is_encodable() => {
                parts.headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(format.content_type()),
                );
                parts.headers.remove(header::CONTENT_LENGTH);
                Response::from_parts(parts, stream_body(value, format))
            }
            Some(other) => {
                parts.extensions.insert(other);
                Response::from_parts(parts, body)
            }
            None => Response::from_parts(parts, body),
        }
    }
}
