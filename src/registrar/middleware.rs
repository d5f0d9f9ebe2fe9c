//! Request tracing middleware.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::registrar::pattern::PathFilter;
use crate::tracer::{PendingTimer, RequestTracer, ABORTED_STATUS};

/// State shared by every invocation of [`trace_middleware`].
#[derive(Clone, Debug)]
pub struct TraceState {
    pub tracer: Arc<RequestTracer>,
    pub filter: Arc<PathFilter>,
}

/// Holds the timer of a request between its two hooks.
///
/// If the request future is dropped first (client gone, outer timeout,
/// panicking handler) the guard still closes the span on drop.
struct InFlight<'a> {
    tracer: &'a RequestTracer,
    timer: Option<PendingTimer>,
}

impl<'a> InFlight<'a> {
    fn start(tracer: &'a RequestTracer, request: &Request) -> Self {
        Self {
            tracer,
            timer: Some(tracer.on_request_start(request)),
        }
    }

    fn complete(mut self, status: StatusCode) {
        self.tracer.on_request_end(self.timer.take(), status);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            self.tracer.on_request_aborted(timer, ABORTED_STATUS);
        }
    }
}

/// Middleware emitting ENTER before and EXIT after the wrapped handler.
pub async fn trace_middleware(
    State(state): State<TraceState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.filter.should_trace(request.uri().path()) {
        return next.run(request).await;
    }

    let in_flight = InFlight::start(&state.tracer, &request);
    let response = next.run(request).await;
    in_flight.complete(response.status());
    response
}
