//! Core codec types for transit-axum.
//!
//! This crate is transport agnostic: it decodes transit+json and plain JSON
//! bodies into a [`Value`] tree and encodes them back. The server crate
//! (`transit-axum`) wires it into axum.
//!
//! ## Modules
//!
//! - [`value`]: decoded value model
//! - [`geom`]: domain records (points, rectangles, matrices, shapes)
//! - [`fields`]: field name → transform rule table
//! - [`value_codec`]: type-directed reconstruction of JSON values
//! - [`casing`]: camelCase ↔ kebab-case keys
//! - [`json`]: plain JSON reader and writer
//! - [`transit`]: transit+json reader and writer
//! - [`error`]: decode error types

pub mod casing;
pub mod error;
pub mod fields;
pub mod geom;
pub mod json;
pub mod transit;
pub mod value;
pub mod value_codec;

pub use casing::{to_camel, to_keyword};
pub use error::*;
pub use fields::{FieldTransformRule, RESERVED_TYPE_LITERALS, rule_for};
pub use geom::{Matrix, Point, Rect, Shape};
pub use json::{JsonView, decode_json, from_json_value, to_json_vec, write_json};
pub use transit::{decode_transit, to_transit_vec, write_transit};
pub use value::{Key, Keyword, Map, Value};
pub use value_codec::transform;
