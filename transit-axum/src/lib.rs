//! # transit-axum
//!
//! Dual-format (transit+json / JSON) body codec for [Axum](https://github.com/tokio-rs/axum).
//!
//! Requests with an `application/transit+json` or `application/json` body are
//! decoded into a [`Value`] tree before they reach the handler. JSON keys are
//! kebab-cased and well known fields are rebuilt into domain types
//! (identifiers, points, rectangles, matrices, shapes, keywords). Handlers
//! answer with a [`TransitResponse`], which is streamed back in whichever
//! format the client negotiated.
//!
//! ## Features
//!
//! - **Content negotiation:** `_fmt=json` query override, then `Accept`,
//!   defaulting to transit; `transit_verbose` for readable transit.
//! - **Bounded decoding:** bodies are size limited (30 MiB by default).
//! - **Streaming encode:** responses are encoded on a blocking task into a
//!   buffered channel-backed body.
//! - **Error translation:** oversized and truncated bodies become structured
//!   400 validation errors.
//!
//! ## Example
//!
//! ```rust,ignore
//! use axum::{Router, routing::post};
//! use transit_axum::prelude::*;
//!
//! async fn echo(params: Params) -> TransitResponse {
//!     TransitResponse::new(params.into_map())
//! }
//!
//! let app = Router::new()
//!     .route("/api/echo", post(echo))
//!     .layer(TransitLayer::new());
//! ```

pub mod context;
pub mod layer;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod writer;

pub use context::{
    BodyLimits, CodecConfig, CodecError, FatalDecodeError, RequestFormat, ResponseFormat,
    ValidationCode, ValidationError,
};
pub use layer::{CorsLayer, MethodFilterLayer, TransitLayer};
pub use request::{BodyParams, Params};
pub use response::{ResponseValue, TransitResponse};

// Re-export the codec crate
pub use transit_axum_core as core;
pub use transit_axum_core::{Key, Keyword, Map, Value};

pub mod prelude {
    //! A prelude for `transit-axum` providing the most common types.
    pub use crate::context::{CodecConfig, CodecError};
    pub use crate::layer::{CorsLayer, MethodFilterLayer, TransitLayer};
    pub use crate::request::{BodyParams, Params};
    pub use crate::response::TransitResponse;
    pub use transit_axum_core::{Key, Keyword, Map, Value};
}
