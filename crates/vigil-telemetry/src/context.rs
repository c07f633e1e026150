//! Request context for correlating log lines.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Identifies one unit of work (an HTTP request or a CLI turn) in the logs.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: Uuid,
    /// Component that created the context (e.g. "gateway", "cli").
    pub source: String,
    /// Operation being performed (e.g. "chat", "approve").
    pub operation: Option<String>,
    /// When the request started.
    pub started_at: DateTime<Utc>,
}

impl RequestContext {
    /// Create a context for `source`.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            source: source.into(),
            operation: None,
            started_at: Utc::now(),
        }
    }

    /// Set the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Milliseconds since the request started.
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_milliseconds()
    }

    /// First eight characters of the request id.
    #[must_use]
    pub fn short_id(&self) -> String {
        self.request_id.simple().to_string().chars().take(8).collect()
    }

    /// A span carrying this context's fields.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "request",
            request_id = %self.short_id(),
            source = %self.source,
            operation = self.operation.as_deref(),
        )
    }
}

/// Enters the context's span and logs the elapsed time when dropped.
///
/// Not `Send`; in async code use `tracing::Instrument` with
/// [`RequestContext::span`] instead.
pub struct RequestGuard {
    context: RequestContext,
    _span: tracing::span::EnteredSpan,
}

impl RequestGuard {
    /// Enter `context`'s span.
    #[must_use]
    pub fn new(context: RequestContext) -> Self {
        let span = context.span().entered();
        tracing::debug!("Request started");
        Self {
            context,
            _span: span,
        }
    }

    /// The guarded context.
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.context
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        tracing::debug!(elapsed_ms = self.context.elapsed_ms(), "Request completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let ctx = RequestContext::new("gateway").with_operation("approve");
        assert_eq!(ctx.source, "gateway");
        assert_eq!(ctx.operation.as_deref(), Some("approve"));
        assert_eq!(ctx.short_id().len(), 8);
    }

    #[test]
    fn test_elapsed() {
        let ctx = RequestContext::new("cli");
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(ctx.elapsed_ms() >= 10);
    }

    #[test]
    fn test_guard_exposes_context() {
        let ctx = RequestContext::new("cli").with_operation("ask");
        let id = ctx.request_id;
        let guard = RequestGuard::new(ctx);
        assert_eq!(guard.context().request_id, id);
    }

    #[test]
    fn test_serialization() {
        let ctx = RequestContext::new("gateway").with_operation("chat");
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["source"], "gateway");
        assert_eq!(json["operation"], "chat");
    }
}
