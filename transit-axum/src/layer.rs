//! Middleware layers for the transit codec.
//!
//! - [`TransitLayer`]: request body decoding, content negotiation and
//!   streaming response encoding.
//! - [`CorsLayer`]: permissive CORS headers, when enabled.
//! - [`MethodFilterLayer`]: 405 for methods outside a route's allow-list.
//!
//! ## Layer Stack Order
//!
//! ```rust,ignore
//! use transit_axum::{CorsLayer, MethodFilterLayer, TransitLayer};
//!
//! let app = Router::new()
//!     .route("/api/rpc/{name}", any(rpc))
//!     .layer(MethodFilterLayer::new([Method::GET, Method::POST]))  // Inner: allow-list
//!     .layer(TransitLayer::new())                                   // Middle: codec
//!     .layer(CorsLayer::new(true));                                 // Outer: CORS
//! ```
//!
//! Decode failures never reach the handler: [`TransitLayer`] answers them
//! directly, with a 400 for validation errors and a 500 otherwise.

mod codec;
mod cors;
mod method;

pub use codec::{TransitLayer, TransitService};
pub use cors::{CorsLayer, CorsService};
pub use method::{MethodFilterLayer, MethodFilterService};
