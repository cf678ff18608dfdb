//! Request body size limits.
//!
//! The limit is checked twice: against `Content-Length` before the body is
//! read, and while reading through [`http_body_util::Limited`] for bodies that
//! do not declare their length (or lie about it).

use serde::Deserialize;

/// Default maximum request body size: 30 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 30 * 1024 * 1024;

/// Configuration for request body size limits.
///
/// # Example
///
/// ```rust
/// use transit_axum::BodyLimits;
///
/// // 4 MiB instead of the default
/// let limits = BodyLimits::new().max_bytes(4 * 1024 * 1024);
///
/// // No limit at all
/// let limits = BodyLimits::unlimited();
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BodyLimits {
    /// Maximum size of a request body in bytes. `None` means unlimited.
    max_bytes: Option<usize>,
}

impl Default for BodyLimits {
    fn default() -> Self {
        Self {
            max_bytes: Some(DEFAULT_MAX_BODY_BYTES),
        }
    }
}

impl BodyLimits {
    /// Limits with the default maximum.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits that accept bodies of any size.
    pub fn unlimited() -> Self {
        Self { max_bytes: None }
    }

    /// Set the maximum body size in bytes.
    pub fn max_bytes(mut self, max: usize) -> Self {
        self.max_bytes = Some(max);
        self
    }

    /// Returns the maximum body size, or `None` if unlimited.
    pub fn get_max_bytes(&self) -> Option<usize> {
        self.max_bytes
    }

    /// Returns the maximum body size for use with `Limited`.
    ///
    /// Returns `usize::MAX` if unlimited.
    pub fn max_bytes_or_max(&self) -> usize {
        self.max_bytes.unwrap_or(usize::MAX)
    }

    /// Whether a declared body size exceeds the limit.
    pub fn exceeds(&self, size: usize) -> bool {
        self.max_bytes.is_some_and(|max| size > max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_30_mib() {
        let limits = BodyLimits::default();
        assert_eq!(limits.get_max_bytes(), Some(30 * 1024 * 1024));
    }

    #[test]
    fn test_builder_methods() {
        let limits = BodyLimits::new().max_bytes(2048);
        assert_eq!(limits.get_max_bytes(), Some(2048));
        assert_eq!(limits.max_bytes_or_max(), 2048);

        let limits = BodyLimits::unlimited();
        assert_eq!(limits.get_max_bytes(), None);
        assert_eq!(limits.max_bytes_or_max(), usize::MAX);
    }

    #[test]
    fn test_exceeds() {
        let limits = BodyLimits::new().max_bytes(1024);
        assert!(!limits.exceeds(512));
        assert!(!limits.exceeds(1024));
        assert!(limits.exceeds(1025));
        assert!(!BodyLimits::unlimited().exceeds(usize::MAX));
    }

    #[test]
    fn test_deserialize() {
        let limits: BodyLimits = serde_json::from_str(r#"{"max_bytes": 10}"#).unwrap();
        assert_eq!(limits.get_max_bytes(), Some(10));

        let limits: BodyLimits = serde_json::from_str(r#"{"max_bytes": null}"#).unwrap();
        assert_eq!(limits.get_max_bytes(), None);

        let limits: BodyLimits = serde_json::from_str("{}").unwrap();
        assert_eq!(limits, BodyLimits::default());
    }
}
