use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use crate::tracing_support::{scope_request_id, RequestId};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Accepts an `x-request-id` header from the client (when it parses as a
/// UUID), otherwise mints a fresh id. The id is scoped into the task local
/// for the duration of the request and echoed back on the response.
pub async fn propagate_request_id(mut request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(RequestId::parse)
        .unwrap_or_default();

    let header_value = HeaderValue::from_str(&request_id.to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("invalid"));
    request
        .headers_mut()
        .insert(REQUEST_ID_HEADER, header_value.clone());

    let mut response = scope_request_id(request_id, next.run(request)).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    response
}
