//! Request-scoped tracing support.
//!
//! A request id is minted (or propagated from `x-request-id`) by the
//! middleware in [`crate::middleware_helpers::request_id`] and carried in a
//! task-local so that error responses and response metadata can report it
//! without threading it through every call.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;

use axum::body::Body;
use http::Request;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing::Span;
use uuid::Uuid;

/// Identifier attached to every request handled by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        RequestId(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(RequestId)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

tokio::task_local! {
    static REQUEST_ID: RefCell<Option<RequestId>>;
}

/// Runs `fut` with `id` as the ambient request id.
pub async fn scope_request_id<F, T>(id: RequestId, fut: F) -> T
where
    F: Future<Output = T>,
{
    REQUEST_ID.scope(RefCell::new(Some(id)), fut).await
}

/// Request id of the current task, if one is in scope.
pub fn current_request_id() -> Option<RequestId> {
    REQUEST_ID.try_with(|cell| *cell.borrow()).ok().flatten()
}

/// HTTP trace layer recording method, uri and request id per request.
pub fn configure_http_tracing(
) -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, fn(&Request<Body>) -> Span> {
    TraceLayer::new_for_http().make_span_with(make_http_span as fn(&Request<Body>) -> Span)
}

fn make_http_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn request_id_is_scoped_to_the_task() {
        assert!(current_request_id().is_none());

        let id = RequestId::new();
        let seen = scope_request_id(id, async { current_request_id() }).await;
        assert_eq!(seen, Some(id));

        assert!(current_request_id().is_none());
    }

    #[test]
    fn parse_round_trips() {
        let id = RequestId::new();
        assert_eq!(RequestId::parse(&id.to_string()), Some(id));
        assert_eq!(RequestId::parse("not-a-uuid"), None);
    }
}
