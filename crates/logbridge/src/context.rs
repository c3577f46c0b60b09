//! Request context for correlation and tracing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Request context a correlation identifier is derived from.
///
/// Attach it to an event with [`Event::ctx`](crate::Event::ctx); a
/// registered [`TracingIdHook`](crate::TracingIdHook) reads it when the
/// event is emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: Uuid,
    /// Correlation ID shared by related requests.
    pub correlation_id: Option<String>,
    /// Parent request ID if this is a sub-request.
    pub parent_id: Option<Uuid>,
    /// When the request started.
    pub started_at: DateTime<Utc>,
    /// Source component that created this context.
    pub source: String,
    /// Operation being performed.
    pub operation: Option<String>,
    /// Additional metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl RequestContext {
    /// Create a new request context whose correlation ID is its request ID.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        let id = Uuid::new_v4();
        Self {
            request_id: id,
            correlation_id: Some(id.to_string()),
            parent_id: None,
            started_at: Utc::now(),
            source: source.into(),
            operation: None,
            metadata: HashMap::new(),
        }
    }

    /// A context that carries no correlation ID.
    ///
    /// Hooks receive this for events that had no context attached.
    #[must_use]
    pub fn background() -> Self {
        Self {
            request_id: Uuid::nil(),
            correlation_id: None,
            parent_id: None,
            started_at: Utc::now(),
            source: "background".to_string(),
            operation: None,
            metadata: HashMap::new(),
        }
    }

    /// Create a child context that inherits correlation info.
    #[must_use]
    pub fn child(&self, source: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            correlation_id: self.correlation_id.clone(),
            parent_id: Some(self.request_id),
            started_at: Utc::now(),
            source: source.into(),
            operation: None,
            metadata: self.metadata.clone(),
        }
    }

    /// Set the correlation ID.
    #[must_use]
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Set the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Add metadata.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The correlation ID, or the empty string when there is none.
    #[must_use]
    pub fn correlation_id_or_empty(&self) -> &str {
        self.correlation_id.as_deref().unwrap_or_default()
    }

    /// Get elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        // Utc::now() >= self.started_at by construction
        #[allow(clippy::arithmetic_side_effects)]
        let elapsed = Utc::now() - self.started_at;
        elapsed
    }

    /// Get elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        self.elapsed().num_milliseconds()
    }

    /// Create a tracing span with this context.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "request",
            request_id = %self.request_id,
            correlation_id = self.correlation_id.as_deref(),
            source = %self.source,
            operation = self.operation.as_deref(),
        )
    }

    /// Check if this context has a parent.
    #[must_use]
    pub fn has_parent(&self) -> bool {
        self.parent_id.is_some()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}

/// Guard that logs through the global logger when a request starts and
/// completes.
pub struct RequestGuard {
    context: RequestContext,
    /// Held to keep the span active until the guard is dropped.
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl RequestGuard {
    /// Create a new request guard.
    #[must_use]
    pub fn new(context: RequestContext) -> Self {
        let span = context.span().entered();
        crate::debug().ctx(&context).msg("request started");
        Self { context, span }
    }

    /// Get the request context.
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.context
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        crate::debug()
            .ctx(&self.context)
            .int64("elapsed_ms", self.context.elapsed_ms())
            .msg("request completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_context_creation() {
        let ctx = RequestContext::new("test");
        assert_eq!(ctx.source, "test");
        assert_eq!(ctx.correlation_id, Some(ctx.request_id.to_string()));
        assert!(ctx.parent_id.is_none());
        assert!(ctx.operation.is_none());
    }

    #[test]
    fn test_background_has_no_correlation() {
        let ctx = RequestContext::background();
        assert!(ctx.correlation_id.is_none());
        assert_eq!(ctx.correlation_id_or_empty(), "");
        assert!(ctx.request_id.is_nil());
    }

    #[test]
    fn test_request_context_builder() {
        let ctx = RequestContext::new("test")
            .with_correlation_id("req-42")
            .with_operation("test_op")
            .with_metadata("key", "value");

        assert_eq!(ctx.correlation_id_or_empty(), "req-42");
        assert_eq!(ctx.operation, Some("test_op".to_string()));
        assert_eq!(ctx.metadata.get("key"), Some(&"value".to_string()));
    }

    #[test]
    fn test_child_context() {
        let parent = RequestContext::new("parent")
            .with_correlation_id("chain-1")
            .with_metadata("inherited", "yes");

        let child = parent.child("child");

        assert_ne!(child.request_id, parent.request_id);
        assert_eq!(child.correlation_id, parent.correlation_id);
        assert_eq!(child.parent_id, Some(parent.request_id));
        assert!(child.has_parent());
        assert_eq!(child.metadata.get("inherited"), Some(&"yes".to_string()));
    }

    #[test]
    fn test_elapsed() {
        let ctx = RequestContext::new("test");
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(ctx.elapsed_ms() >= 10);
    }

    #[test]
    fn test_serialization() {
        let ctx = RequestContext::new("test")
            .with_operation("test_op")
            .with_metadata("key", "value");

        let json = serde_json::to_string(&ctx).unwrap();
        assert!(json.contains("\"source\":\"test\""));
        assert!(json.contains("\"operation\":\"test_op\""));

        let parsed: RequestContext = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.source, "test");
        assert_eq!(parsed.correlation_id, ctx.correlation_id);
    }

    #[test]
    fn test_guard_exposes_context() {
        let guard = RequestGuard::new(RequestContext::new("guarded").with_operation("op"));
        assert_eq!(guard.context().source, "guarded");
    }
}
