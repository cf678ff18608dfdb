//! Extractors for decoded request parameters.
//!
//! [`TransitLayer`] stores [`Params`] on every request and [`BodyParams`] on
//! decoded POST requests. Both extractors are infallible: when the layer did
//! not run they yield empty values.
//!
//! [`TransitLayer`]: crate::layer::TransitLayer

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use transit_axum_core::{Key, Map, Value};

/// Merged request parameters: query string, overridden by a decoded map body.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(params: Params) -> TransitResponse {
///     let id = params.get("id").and_then(Value::as_uuid);
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(pub Map);

impl Params {
    /// Look up a parameter by its kebab-cased name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(&Key::keyword(name))
    }

    pub fn map(&self) -> &Map {
        &self.0
    }

    pub fn into_map(self) -> Map {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert every entry of `other`, replacing existing keys.
    pub(crate) fn merge(&mut self, other: &Map) {
        for (key, value) in other {
            self.0.insert(key.clone(), value.clone());
        }
    }
}

/// The decoded request body as is, `Nil` when nothing was decoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyParams(pub Value);

impl BodyParams {
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl<S> FromRequestParts<S> for Params
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Params>().cloned().unwrap_or_default())
    }
}

impl<S> FromRequestParts<S> for BodyParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<BodyParams>()
            .cloned()
            .unwrap_or_default())
    }
}
