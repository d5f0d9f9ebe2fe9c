//! Tracer registration.
//!
//! # Data Flow
//! ```text
//! composition root (once per process)
//!     → install(router, tracer, filter)
//!     → Pipeline::register_middleware
//!     → trace_middleware wraps every route registered so far
//! ```
//!
//! # Design Decisions
//! - Registration is one explicit call in each service's startup sequence
//! - Call it after all routes are added; routes added later are not wrapped
//! - Installing twice registers twice; callers must not do that

pub mod middleware;
pub mod pattern;

use std::sync::Arc;

use axum::Router;

use crate::tracer::RequestTracer;

pub use middleware::{trace_middleware, TraceState};
pub use pattern::{PathFilter, PathPattern, PatternError};

/// A request pipeline that accepts tracing hooks.
pub trait Pipeline: Sized {
    fn register_middleware(self, filter: PathFilter, hooks: Arc<RequestTracer>) -> Self;
}

impl<S> Pipeline for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn register_middleware(self, filter: PathFilter, hooks: Arc<RequestTracer>) -> Self {
        let state = TraceState {
            tracer: hooks,
            filter: Arc::new(filter),
        };
        self.layer(axum::middleware::from_fn_with_state(state, trace_middleware))
    }
}

/// Attach the tracer to every route of `pipeline` that `filter` selects.
pub fn install<P: Pipeline>(pipeline: P, tracer: Arc<RequestTracer>, filter: PathFilter) -> P {
    tracing::info!(
        service = %tracer.service(),
        sink_available = tracer.sink().is_available(),
        "Request tracer installed"
    );
    pipeline.register_middleware(filter, tracer)
}
