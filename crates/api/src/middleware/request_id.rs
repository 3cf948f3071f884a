use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use nanoid::nanoid;

use crate::state::RequestId;

/// Tags every request with an id that shows up in error bodies and in the
/// X-Request-Id response header.
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let id = format!("req_{}", nanoid!(16));
    req.extensions_mut().insert(RequestId(id.clone()));

    let mut resp = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        resp.headers_mut().insert("X-Request-Id", value);
    }
    resp
}
