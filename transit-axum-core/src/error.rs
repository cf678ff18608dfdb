//! Decode error types.
//!
//! This module provides the closed error set produced while decoding a body:
//! - [`ValueError`]: a value that cannot be rebuilt into its domain type
//! - [`DecodeError`]: any failure of the decode step, optionally wrapping a cause

/// A structurally invalid value met while rebuilding domain types.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ValueError {
    /// A required field of a flat record is absent.
    #[error("{ty}: missing field `{field}`")]
    MissingField {
        ty: &'static str,
        field: &'static str,
    },

    /// A field is present but has the wrong primitive type.
    #[error("{ty}: field `{field}` is not a {expected}")]
    InvalidField {
        ty: &'static str,
        field: &'static str,
        expected: &'static str,
    },

    /// The value's shape cannot produce the requested type at all.
    #[error("cannot build {ty} from {found}")]
    Unexpected {
        ty: &'static str,
        found: &'static str,
    },

    /// A string that is not a valid UUID where an identifier is expected.
    #[error("invalid identifier `{0}`")]
    InvalidIdentifier(String),

    /// A field that is always a collection received a scalar.
    #[error("field `{0}` expects a collection")]
    ExpectedCollection(String),

    /// An integer that does not fit in an `i64`.
    #[error("integer `{0}` is out of range")]
    IntegerOutOfRange(String),

    /// A transit tag with no registered reader.
    #[error("unknown transit tag `{0}`")]
    UnknownTag(String),

    /// A transit cache reference that was never defined.
    #[error("invalid transit cache reference `{0}`")]
    InvalidCacheRef(String),

    /// Any other transit structure violation.
    #[error("malformed transit: {0}")]
    MalformedTransit(String),
}

/// Failure of the body decode step.
///
/// [`Wrapped`](DecodeError::Wrapped) adds context around a cause; use
/// [`cause`](DecodeError::cause) to walk the chain.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The body is larger than the configured maximum.
    #[error("body exceeds the maximum allowed size of {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// The input stopped in the middle of a structure.
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),

    /// The input is not well-formed JSON.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// The input parsed but a value could not be rebuilt.
    #[error("invalid value: {0}")]
    Value(#[from] ValueError),

    /// Reading the body failed.
    #[error("failed to read body: {0}")]
    Io(String),

    /// A failure with added context.
    #[error("{context}: {source}")]
    Wrapped {
        context: String,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// Wrap this error with a context message.
    pub fn wrap<S: Into<String>>(self, context: S) -> Self {
        Self::Wrapped {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The wrapped cause, if this is a [`Wrapped`](DecodeError::Wrapped) error.
    pub fn cause(&self) -> Option<&DecodeError> {
        match self {
            Self::Wrapped { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The innermost error of the chain.
    pub fn root_cause(&self) -> &DecodeError {
        let mut current = self;
        while let Some(next) = current.cause() {
            current = next;
        }
        current
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_eof() {
            Self::UnexpectedEof(err.to_string())
        } else if err.is_io() {
            Self::Io(err.to_string())
        } else {
            Self::Syntax(err.to_string())
        }
    }
}
