//! Wire format negotiation.
//!
//! The request format comes from `Content-Type` and only applies to POST.
//! The response format is picked, in order, from the `_fmt=json` query
//! override, then `Accept`, then defaults to transit.

use axum::http::{HeaderMap, Method, Uri, header};
use serde::Deserialize;

/// `Content-Type` of transit+json bodies.
pub const TRANSIT_CONTENT_TYPE: &str = "application/transit+json";
/// `Content-Type` of plain JSON bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

const VERBOSE_QUERY_FLAG: &str = "transit_verbose";

/// Format of an incoming request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFormat {
    /// `application/transit+json`: decoded natively, no field rules.
    Transit,
    /// `application/json`: key casing and field rules applied.
    Json,
}

impl RequestFormat {
    /// Detect the format from a `Content-Type` value (prefix match).
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        if content_type.starts_with(TRANSIT_CONTENT_TYPE) {
            Some(Self::Transit)
        } else if content_type.starts_with(JSON_CONTENT_TYPE) {
            Some(Self::Json)
        } else {
            None
        }
    }

    /// Detect the body format of a request.
    ///
    /// Returns `None` for any method other than POST: those bodies are never
    /// consumed here.
    pub fn detect(method: &Method, headers: &HeaderMap) -> Option<Self> {
        if method != Method::POST {
            return None;
        }
        headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(Self::from_content_type)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transit => "transit",
            Self::Json => "json",
        }
    }
}

/// Format of an outgoing response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Compact transit+json.
    #[default]
    Transit,
    /// Human readable transit+json: plain objects, no cache.
    TransitVerbose,
    /// Plain JSON with camelCase keys.
    Json,
}

#[derive(Deserialize)]
struct FormatQuery {
    #[serde(rename = "_fmt")]
    fmt: Option<String>,
}

impl ResponseFormat {
    /// Negotiate the response format for a request.
    ///
    /// `verbose` is the configured default; the `transit_verbose` query flag
    /// turns verbose mode on for a single request.
    pub fn negotiate(uri: &Uri, headers: &HeaderMap, verbose: bool) -> Self {
        let query = uri.query().unwrap_or("");
        let verbose = verbose || query.contains(VERBOSE_QUERY_FLAG);
        let transit = if verbose {
            Self::TransitVerbose
        } else {
            Self::Transit
        };

        if forces_json(query) {
            return Self::Json;
        }

        let accept = headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if accept.contains(TRANSIT_CONTENT_TYPE) {
            transit
        } else if accept.contains(JSON_CONTENT_TYPE) {
            Self::Json
        } else {
            transit
        }
    }

    /// Response `Content-Type` for this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Transit | Self::TransitVerbose => TRANSIT_CONTENT_TYPE,
            Self::Json => JSON_CONTENT_TYPE,
        }
    }

    pub fn is_transit(&self) -> bool {
        matches!(self, Self::Transit | Self::TransitVerbose)
    }
}

fn forces_json(query: &str) -> bool {
    if query.is_empty() {
        return false;
    }
    match serde_qs::from_str::<FormatQuery>(query) {
        Ok(parsed) => parsed.fmt.as_deref() == Some("json"),
        Err(_) => query.split('&').any(|pair| pair == "_fmt=json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn accept(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn content_type(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_request_format_from_content_type() {
        assert_eq!(
            RequestFormat::from_content_type("application/transit+json"),
            Some(RequestFormat::Transit)
        );
        assert_eq!(
            RequestFormat::from_content_type("application/json; charset=utf-8"),
            Some(RequestFormat::Json)
        );
        assert_eq!(RequestFormat::from_content_type("text/plain"), None);
        assert_eq!(RequestFormat::from_content_type("multipart/form-data"), None);
    }

    #[test]
    fn test_request_format_only_for_post() {
        let headers = content_type("application/json");
        assert_eq!(
            RequestFormat::detect(&Method::POST, &headers),
            Some(RequestFormat::Json)
        );
        assert_eq!(RequestFormat::detect(&Method::GET, &headers), None);
        assert_eq!(RequestFormat::detect(&Method::PUT, &headers), None);
        assert_eq!(RequestFormat::detect(&Method::POST, &HeaderMap::new()), None);
    }

    #[test]
    fn test_response_defaults_to_transit() {
        let uri: Uri = "/api/x".parse().unwrap();
        assert_eq!(
            ResponseFormat::negotiate(&uri, &HeaderMap::new(), false),
            ResponseFormat::Transit
        );
        assert_eq!(
            ResponseFormat::negotiate(&uri, &accept("text/html, */*"), false),
            ResponseFormat::Transit
        );
    }

    #[test]
    fn test_response_accept() {
        let uri: Uri = "/api/x".parse().unwrap();
        assert_eq!(
            ResponseFormat::negotiate(&uri, &accept("application/json"), false),
            ResponseFormat::Json
        );
        assert_eq!(
            ResponseFormat::negotiate(
                &uri,
                &accept("application/transit+json, application/json"),
                false
            ),
            ResponseFormat::Transit
        );
    }

    #[test]
    fn test_fmt_query_beats_accept() {
        let uri: Uri = "/api/x?_fmt=json".parse().unwrap();
        assert_eq!(
            ResponseFormat::negotiate(&uri, &accept("application/transit+json"), false),
            ResponseFormat::Json
        );

        let uri: Uri = "/api/x?_fmt=transit".parse().unwrap();
        assert_eq!(
            ResponseFormat::negotiate(&uri, &accept("application/json"), false),
            ResponseFormat::Json
        );
    }

    #[test]
    fn test_verbose_flag() {
        let uri: Uri = "/api/x?transit_verbose".parse().unwrap();
        assert_eq!(
            ResponseFormat::negotiate(&uri, &HeaderMap::new(), false),
            ResponseFormat::TransitVerbose
        );

        let uri: Uri = "/api/x".parse().unwrap();
        assert_eq!(
            ResponseFormat::negotiate(&uri, &HeaderMap::new(), true),
            ResponseFormat::TransitVerbose
        );

        // verbose does not affect JSON
        assert_eq!(
            ResponseFormat::negotiate(&uri, &accept("application/json"), true),
            ResponseFormat::Json
        );
    }
}
