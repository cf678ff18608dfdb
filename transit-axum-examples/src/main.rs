//! Demo server wiring the transit codec, CORS and method filter layers.
//!
//! Environment:
//! - `PORT` listen port (default 6060)
//! - `TRANSIT_VERBOSE` emit verbose transit when `true`
//! - `CORS_ENABLED` attach permissive CORS headers when `true`
//! - `MAX_BODY_SIZE` request body limit in bytes (default 30 MiB)
//!
//! Run with: cargo run -p transit-axum-examples
//!
//! Test with:
//!   curl -X POST localhost:6060/api/echo -H 'content-type: application/json' \
//!     -d '{"id": "6ba7b810-9dad-11d1-80b4-00c04fd430c8", "touched": ["name"]}'

use std::net::SocketAddr;

use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use transit_axum::prelude::*;
use transit_axum::BodyLimits;
use transit_axum::context::DEFAULT_MAX_BODY_BYTES;

/// Echo the merged query and body parameters.
async fn echo(params: Params) -> TransitResponse {
    TransitResponse::new(params.into_map())
}

/// Return the decoded body unchanged, `nil` for anything but POST.
async fn body(BodyParams(body): BodyParams) -> TransitResponse {
    TransitResponse::new(body)
}

async fn ping() -> TransitResponse {
    TransitResponse::new("pong")
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn load_config() -> anyhow::Result<(u16, CodecConfig, bool)> {
    let port = match std::env::var("PORT") {
        Ok(port) => port.parse()?,
        Err(_) => 6060,
    };
    let max_bytes = match std::env::var("MAX_BODY_SIZE") {
        Ok(size) => size.parse()?,
        Err(_) => DEFAULT_MAX_BODY_BYTES,
    };

    let config = CodecConfig {
        limits: BodyLimits::new().max_bytes(max_bytes),
        verbose: env_flag("TRANSIT_VERBOSE"),
    };
    Ok((port, config, env_flag("CORS_ENABLED")))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (port, config, cors) = load_config()?;

    let app = Router::new()
        .route("/api/echo", post(echo))
        .route("/api/body", get(body).post(body))
        .route("/api/ping", get(ping))
        .layer(TransitLayer::with_config(config))
        .layer(MethodFilterLayer::new([Method::GET, Method::POST]))
        .layer(CorsLayer::new(cors))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        %addr,
        verbose = config.verbose,
        cors,
        max_body_bytes = ?config.limits.get_max_bytes(),
        "transit demo server listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
