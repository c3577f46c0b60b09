//! Tracing-ID hook.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::context::RequestContext;

/// Field name the hook writes when none is configured.
pub const DEFAULT_TRACING_ID_FIELD: &str = "tracing_id";

/// Callback that derives a tracing ID from a request context.
///
/// It must only read the context; it must not log.
pub type TracingIdFn = dyn Fn(&RequestContext) -> String + Send + Sync;

/// Hook that stamps every emitted record with a tracing ID.
///
/// The callback runs once per emitted event, after all fields have been
/// attached and before the record is written. Events without an attached
/// context hand it [`RequestContext::background`].
#[derive(Clone)]
pub struct TracingIdHook {
    tracing_id: Arc<TracingIdFn>,
    field: String,
}

impl TracingIdHook {
    /// Create a hook from a callback.
    #[must_use]
    pub fn new<F>(tracing_id: F) -> Self
    where
        F: Fn(&RequestContext) -> String + Send + Sync + 'static,
    {
        Self {
            tracing_id: Arc::new(tracing_id),
            field: DEFAULT_TRACING_ID_FIELD.to_string(),
        }
    }

    /// Hook that reads [`RequestContext::correlation_id`].
    #[must_use]
    pub fn correlation_id() -> Self {
        Self::new(|ctx| ctx.correlation_id_or_empty().to_string())
    }

    /// Write the ID under a different field name.
    #[must_use]
    pub fn with_field_name(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// The field name the ID is written under.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field
    }

    /// Derive the ID for a context. A panicking callback yields `""`.
    #[must_use]
    pub fn tracing_id(&self, ctx: &RequestContext) -> String {
        panic::catch_unwind(AssertUnwindSafe(|| (self.tracing_id)(ctx))).unwrap_or_default()
    }

    pub(crate) fn run(&self, ctx: &RequestContext, fields: &mut Map<String, Value>) {
        fields.insert(self.field.clone(), Value::String(self.tracing_id(ctx)));
    }
}

impl fmt::Debug for TracingIdHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingIdHook")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}
