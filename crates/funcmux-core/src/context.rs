//! Request context with asupersync integration.
//!
//! [`RequestContext`] wraps asupersync's [`Cx`] to provide request-scoped
//! capabilities to custom extractors and raw handlers.

use asupersync::Cx;

use crate::response::StatusCode;

/// Default maximum body size: 1MB.
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Configuration for request body limits.
#[derive(Debug, Clone, Copy)]
pub struct BodyLimitConfig {
    max_size: usize,
}

impl Default for BodyLimitConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl BodyLimitConfig {
    /// Creates a new body limit config with the specified maximum size.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self { max_size }
    }

    /// Returns the maximum body size in bytes.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

/// Request context that wraps asupersync's capability context.
///
/// Built once per request by whoever drives the handler (a server loop or
/// the [`TestClient`](crate::TestClient)) and passed by reference through
/// routing, method dispatch and the adaptor.
#[derive(Debug, Clone)]
pub struct RequestContext {
    cx: Cx,
    request_id: u64,
    body_limit: BodyLimitConfig,
}

impl RequestContext {
    /// Creates a new request context with the default body limit (1MB).
    #[must_use]
    pub fn new(cx: Cx, request_id: u64) -> Self {
        Self {
            cx,
            request_id,
            body_limit: BodyLimitConfig::default(),
        }
    }

    /// Creates a new request context with a custom body size limit.
    #[must_use]
    pub fn with_body_limit(cx: Cx, request_id: u64, max_body_size: usize) -> Self {
        Self {
            cx,
            request_id,
            body_limit: BodyLimitConfig::new(max_body_size),
        }
    }

    /// Returns the unique request identifier.
    #[must_use]
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Returns the body limit configuration for this request.
    #[must_use]
    pub fn body_limit(&self) -> &BodyLimitConfig {
        &self.body_limit
    }

    /// Shorthand for `ctx.body_limit().max_size()`.
    #[must_use]
    pub fn max_body_size(&self) -> usize {
        self.body_limit.max_size()
    }

    /// Checks if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cx.is_cancel_requested()
    }

    /// Cancellation checkpoint for extractors and raw handlers.
    ///
    /// # Errors
    ///
    /// [`CancelledError`] once cancellation was requested and is not masked.
    pub fn checkpoint(&self) -> Result<(), CancelledError> {
        self.cx.checkpoint().map_err(|_| CancelledError)
    }

    /// Returns a reference to the underlying asupersync Cx.
    #[must_use]
    pub fn cx(&self) -> &Cx {
        &self.cx
    }
}

/// The request was cancelled. Answered with 503.
#[derive(Debug, Clone, Copy)]
pub struct CancelledError;

impl std::fmt::Display for CancelledError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "request cancelled")
    }
}

impl std::error::Error for CancelledError {}

impl crate::error::ResponseError for CancelledError {
    fn status(&self) -> Option<StatusCode> {
        Some(StatusCode::SERVICE_UNAVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_error_is_503() {
        use crate::error::ResponseError;

        let err = CancelledError;
        assert_eq!(err.to_string(), "request cancelled");
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    }

    #[test]
    fn checkpoint_returns_error_when_cancel_requested() {
        let cx = Cx::for_testing();
        let ctx = RequestContext::new(cx, 1);
        assert!(!ctx.is_cancelled());
        ctx.cx().set_cancel_requested(true);
        assert!(ctx.is_cancelled());
        assert!(ctx.checkpoint().is_err());
    }

    #[test]
    fn body_limit_config_default() {
        let config = BodyLimitConfig::default();
        assert_eq!(config.max_size(), DEFAULT_MAX_BODY_SIZE);
        assert_eq!(config.max_size(), 1024 * 1024);
    }

    #[test]
    fn request_context_custom_body_limit() {
        let cx = Cx::for_testing();
        let ctx = RequestContext::with_body_limit(cx, 7, 2 * 1024 * 1024);
        assert_eq!(ctx.max_body_size(), 2 * 1024 * 1024);
        assert_eq!(ctx.request_id(), 7);
    }
}
