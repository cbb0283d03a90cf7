use chrono::{DateTime, Utc};
use tracing::{info_span, Span};
use uuid::Uuid;

/// Per-run logging scope. Every event emitted inside [`RunContext::in_scope`] carries the
/// pipeline code and run id.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub pipeline: &'static str,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    span: Span,
}

impl RunContext {
    pub fn new(pipeline: &'static str) -> Self {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline_run", pipeline, %run_id);
        Self {
            pipeline,
            run_id,
            started_at: Utc::now(),
            span,
        }
    }

    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        self.span.in_scope(f)
    }
}
