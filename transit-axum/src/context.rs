//! Configuration and negotiation types for the transit codec layer.
//!
//! This module provides the types used by [`TransitLayer`]: body size limits,
//! codec configuration, wire format negotiation and decode error translation.
//!
//! [`TransitLayer`]: crate::layer::TransitLayer

pub mod config;
pub mod error;
pub mod format;
pub mod limit;

pub use config::CodecConfig;
pub use error::{CodecError, FatalDecodeError, ValidationCode, ValidationError, translate};
pub use format::{JSON_CONTENT_TYPE, RequestFormat, ResponseFormat, TRANSIT_CONTENT_TYPE};
pub use limit::{BodyLimits, DEFAULT_MAX_BODY_BYTES};
