//! Error types.
//!
//! Every failure that happens while serving a request is a [`ResponseError`]:
//! a standard error that may carry an HTTP status. Errors with a status are
//! sent to the client as `{"error": "<message>"}` with that status; errors
//! without one are logged and answered with a generic 500.
//!
//! [`HttpError`] is the concrete error the framework itself produces for
//! malformed input, and the easiest one for handlers to return.

use std::fmt;

use crate::response::StatusCode;

/// An error that can be turned into an HTTP response.
///
/// ```
/// use funcmux_core::{ResponseError, StatusCode};
///
/// #[derive(Debug)]
/// struct Missing(String);
///
/// impl std::fmt::Display for Missing {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "{} does not exist", self.0)
///     }
/// }
///
/// impl std::error::Error for Missing {}
///
/// impl ResponseError for Missing {
///     fn status(&self) -> Option<StatusCode> {
///         Some(StatusCode::NOT_FOUND)
///     }
/// }
/// ```
pub trait ResponseError: std::error::Error + Send + Sync + 'static {
    /// Status to answer with. `None` means the error is internal.
    fn status(&self) -> Option<StatusCode> {
        None
    }

    /// Extra headers to send with the error response.
    fn headers(&self) -> &[(String, Vec<u8>)] {
        &[]
    }
}

/// Type-erased [`ResponseError`].
pub type BoxError = Box<dyn ResponseError>;

/// Erase a concrete error.
#[must_use]
pub fn boxed<E: ResponseError>(err: E) -> BoxError {
    Box::new(err)
}

/// HTTP error with a status, an optional detail message and extra headers.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    detail: Option<String>,
    headers: Vec<(String, Vec<u8>)>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HttpError {
    /// Create a new HTTP error.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            detail: None,
            headers: Vec::new(),
            source: None,
        }
    }

    /// Wrap an underlying error; its message becomes the detail.
    #[must_use]
    pub fn wrap<E>(status: StatusCode, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            status,
            detail: Some(err.to_string()),
            headers: Vec::new(),
            source: Some(Box::new(err)),
        }
    }

    /// Add a detail message.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 400 Bad Request.
    #[must_use]
    pub fn bad_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST)
    }

    /// 401 Unauthorized.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED)
    }

    /// 403 Forbidden.
    #[must_use]
    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN)
    }

    /// 404 Not Found.
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    /// 405 Method Not Allowed.
    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED)
    }

    /// 413 Payload Too Large.
    #[must_use]
    pub fn payload_too_large() -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE)
    }

    /// 500 Internal Server Error.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// The status code.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// The detail message, if one was set.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Detail message, falling back to the status reason phrase.
    #[must_use]
    pub fn message(&self) -> &str {
        self.detail
            .as_deref()
            .unwrap_or_else(|| self.status.canonical_reason())
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl ResponseError for HttpError {
    fn status(&self) -> Option<StatusCode> {
        Some(self.status)
    }

    fn headers(&self) -> &[(String, Vec<u8>)] {
        &self.headers
    }
}
