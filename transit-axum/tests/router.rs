//! Full layer stack driven through an axum `Router`.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::routing::{get, post};
use tower::ServiceExt;
use transit_axum::FatalDecodeError;
use transit_axum::core::decode_transit;
use transit_axum::prelude::*;
use uuid::Uuid;

async fn echo(params: Params) -> TransitResponse {
    TransitResponse::new(params.into_map())
}

async fn body_seen(BodyParams(body): BodyParams) -> TransitResponse {
    let mut map = Map::new();
    map.insert(Key::keyword("has-body"), Value::Bool(!body.is_nil()));
    TransitResponse::new(map)
}

async fn ping() -> TransitResponse {
    TransitResponse::new("pong")
}

fn app(layer: TransitLayer) -> Router {
    Router::new()
        .route("/api/echo", post(echo))
        .route("/api/body", get(body_seen).post(body_seen))
        .route("/api/ping", get(ping))
        .layer(layer)
        .layer(MethodFilterLayer::new([Method::GET, Method::POST]))
        .layer(CorsLayer::new(true))
}

fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_json_id_round_trips_as_uuid() {
    let id = Uuid::new_v4();
    let resp = app(TransitLayer::new())
        .oneshot(post_json("/api/echo", format!(r#"{{"id": "{id}"}}"#)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "application/transit+json"
    );
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let decoded = decode_transit(&bytes).unwrap();
    assert_eq!(decoded.get("id"), Some(&Value::Uuid(id)));
}

#[tokio::test]
async fn test_accept_json_selects_json() {
    let mut req = post_json("/api/echo", r#"{"pageId": null, "name": "Frame"}"#);
    req.headers_mut()
        .insert(header::ACCEPT, "application/json".parse().unwrap());
    let resp = app(TransitLayer::new()).oneshot(req).await.unwrap();

    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    let json = body_json(resp).await;
    assert_eq!(json["name"], "Frame");
    assert!(json["pageId"].is_null());
}

#[tokio::test]
async fn test_fmt_query_beats_accept() {
    let mut req = post_json("/api/echo?_fmt=json", r#"{"name": "Frame"}"#);
    req.headers_mut().insert(
        header::ACCEPT,
        "application/transit+json".parse().unwrap(),
    );
    let resp = app(TransitLayer::new()).oneshot(req).await.unwrap();
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
}

#[tokio::test]
async fn test_verbose_query() {
    let resp = app(TransitLayer::new())
        .oneshot(post_json("/api/echo?transit_verbose", r#"{"name": "Frame"}"#))
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = std::str::from_utf8(&bytes).unwrap();
    assert!(text.starts_with('{'), "{text}");
    assert!(text.contains(r#""~:name":"Frame""#), "{text}");
}

#[tokio::test]
async fn test_oversized_body_is_validation_error() {
    let big = format!(r#"{{"name": "{}"}}"#, "x".repeat(512));
    let resp = app(TransitLayer::new().body_limit(128))
        .oneshot(post_json("/api/echo", big))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["type"], "validation");
    assert_eq!(json["code"], "request-body-too-large");
}

#[tokio::test]
async fn test_truncated_body_is_malformed_json() {
    let resp = app(TransitLayer::new())
        .oneshot(post_json("/api/echo", r#"{"points": [{"x": 1, "y""#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["code"], "malformed-json");
}

#[tokio::test]
async fn test_invalid_value_is_internal_error() {
    let resp = app(TransitLayer::new())
        .oneshot(post_json("/api/echo", r#"{"id": "nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(resp.extensions().get::<FatalDecodeError>().is_some());
}

#[tokio::test]
async fn test_get_body_not_decoded() {
    let req = Request::builder()
        .method(Method::GET)
        .uri("/api/body?_fmt=json")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name": "ignored"}"#))
        .unwrap();
    let resp = app(TransitLayer::new()).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["hasBody"], false);
}

#[tokio::test]
async fn test_post_body_decoded() {
    let resp = app(TransitLayer::new())
        .oneshot(post_json("/api/body?_fmt=json", r#"{"name": "seen"}"#))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["hasBody"], true);
}

#[tokio::test]
async fn test_scalar_response_is_plain() {
    let req = Request::builder()
        .uri("/api/ping")
        .body(Body::empty())
        .unwrap();
    let resp = app(TransitLayer::new()).oneshot(req).await.unwrap();

    assert!(resp.headers().get(header::CONTENT_TYPE).is_none());
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"pong");
}

#[tokio::test]
async fn test_disallowed_method_and_preflight() {
    let req = Request::builder()
        .method(Method::DELETE)
        .uri("/api/echo")
        .body(Body::empty())
        .unwrap();
    let resp = app(TransitLayer::new()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/echo")
        .header(header::ORIGIN, "https://design.example.com")
        .body(Body::empty())
        .unwrap();
    let resp = app(TransitLayer::new()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://design.example.com"
    );
}
