//! Decode error classification.
//!
//! [`translate`] walks the cause chain of a [`DecodeError`] once and sorts it
//! into the validation taxonomy; anything it cannot classify stays fatal.

use std::fmt;
use std::sync::Arc;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use transit_axum_core::DecodeError;

/// Validation error codes reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationCode {
    /// The body exceeded the configured maximum size.
    RequestBodyTooLarge,
    /// The body ended in the middle of a structure.
    MalformedJson,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequestBodyTooLarge => "request-body-too-large",
            Self::MalformedJson => "malformed-json",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client-caused decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{code}: {hint}")]
pub struct ValidationError {
    #[serde(rename = "type")]
    kind: &'static str,
    code: ValidationCode,
    hint: String,
}

impl ValidationError {
    pub fn new(code: ValidationCode, hint: impl Into<String>) -> Self {
        Self {
            kind: "validation",
            code,
            hint: hint.into(),
        }
    }

    pub fn code(&self) -> ValidationCode {
        self.code
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }
}

/// The unclassified decode error, placed in response extensions so outer
/// layers can report it.
#[derive(Debug, Clone)]
pub struct FatalDecodeError(pub Arc<DecodeError>);

/// Outcome of [`translate`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error(transparent)]
    Validation(ValidationError),
    /// The original, unmodified failure.
    #[error(transparent)]
    Fatal(DecodeError),
}

/// Classify a decode failure by walking its wrapped causes.
pub fn translate(err: DecodeError) -> CodecError {
    let mut current = Some(&err);
    while let Some(cause) = current {
        match cause {
            DecodeError::BodyTooLarge { .. } => {
                return CodecError::Validation(ValidationError::new(
                    ValidationCode::RequestBodyTooLarge,
                    cause.to_string(),
                ));
            }
            DecodeError::UnexpectedEof(_) => {
                return CodecError::Validation(ValidationError::new(
                    ValidationCode::MalformedJson,
                    cause.to_string(),
                ));
            }
            _ => current = cause.cause(),
        }
    }
    CodecError::Fatal(err)
}

impl IntoResponse for CodecError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(err) => {
                tracing::debug!(code = %err.code(), hint = err.hint(), "rejected request body");
                (StatusCode::BAD_REQUEST, Json(err)).into_response()
            }
            Self::Fatal(err) => {
                tracing::error!(error = %err, "failed to decode request body");
                let mut response = (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response();
                response
                    .extensions_mut()
                    .insert(FatalDecodeError(Arc::new(err)));
                response
            }
        }
    }
}
