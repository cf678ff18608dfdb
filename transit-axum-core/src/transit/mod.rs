//! transit+json reader and writer.
//!
//! Supports the compact (cached, array-encoded maps) and verbose (plain
//! objects) JSON modes. Domain records travel as tagged values: `point`,
//! `rect`, `matrix` and `shape`.

mod cache;
mod reader;
mod writer;

pub use reader::decode_transit;
pub use writer::{to_transit_vec, write_transit};
