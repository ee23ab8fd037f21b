//! General-purpose middleware for the API.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::context::RequestContext;

/// Attaches a fresh [`RequestContext`] to every request.
///
/// The context expires `timeout` after the request arrives and is cancelled
/// as soon as the request future is dropped, which is what happens when the
/// client goes away mid-request.
pub async fn request_context(
    State(timeout): State<Duration>,
    mut req: Request,
    next: Next,
) -> Response {
    let ctx = RequestContext::with_timeout(timeout);
    let _cancel_on_drop = ctx.cancellation_token().clone().drop_guard();
    req.extensions_mut().insert(ctx);
    next.run(req).await
}
