//! Codec configuration - server-wide static settings.
//!
//! Set once at startup and captured by [`TransitLayer`]; read-only per request.
//!
//! [`TransitLayer`]: crate::layer::TransitLayer

use serde::Deserialize;

use crate::context::BodyLimits;

/// Server-wide configuration for the transit codec layer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Request body size limits
    pub limits: BodyLimits,
    /// Always use verbose transit, regardless of the `transit_verbose` query flag
    pub verbose: bool,
}
