//! HTTP response types and the streaming [`ResponseWriter`].

use std::fmt;

/// HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(u16);

impl StatusCode {
    // Success
    /// 200 OK
    pub const OK: Self = Self(200);
    /// 201 Created
    pub const CREATED: Self = Self(201);
    /// 202 Accepted
    pub const ACCEPTED: Self = Self(202);
    /// 204 No Content
    pub const NO_CONTENT: Self = Self(204);

    // Redirection
    /// 301 Moved Permanently
    pub const MOVED_PERMANENTLY: Self = Self(301);
    /// 302 Found
    pub const FOUND: Self = Self(302);
    /// 304 Not Modified
    pub const NOT_MODIFIED: Self = Self(304);

    // Client Error
    /// 400 Bad Request
    pub const BAD_REQUEST: Self = Self(400);
    /// 401 Unauthorized
    pub const UNAUTHORIZED: Self = Self(401);
    /// 403 Forbidden
    pub const FORBIDDEN: Self = Self(403);
    /// 404 Not Found
    pub const NOT_FOUND: Self = Self(404);
    /// 405 Method Not Allowed
    pub const METHOD_NOT_ALLOWED: Self = Self(405);
    /// 409 Conflict
    pub const CONFLICT: Self = Self(409);
    /// 413 Payload Too Large
    pub const PAYLOAD_TOO_LARGE: Self = Self(413);
    /// 415 Unsupported Media Type
    pub const UNSUPPORTED_MEDIA_TYPE: Self = Self(415);
    /// 422 Unprocessable Entity
    pub const UNPROCESSABLE_ENTITY: Self = Self(422);
    /// 429 Too Many Requests
    pub const TOO_MANY_REQUESTS: Self = Self(429);

    // Server Error
    /// 500 Internal Server Error
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);
    /// 501 Not Implemented
    pub const NOT_IMPLEMENTED: Self = Self(501);
    /// 503 Service Unavailable
    pub const SERVICE_UNAVAILABLE: Self = Self(503);

    /// Create a status code from a u16.
    #[must_use]
    pub const fn from_u16(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// 2xx.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// 4xx.
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    /// 5xx.
    #[must_use]
    pub const fn is_server_error(self) -> bool {
        self.0 >= 500 && self.0 < 600
    }

    /// Get the canonical reason phrase.
    #[must_use]
    pub const fn canonical_reason(self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            204 => "No Content",
            301 => "Moved Permanently",
            302 => "Found",
            304 => "Not Modified",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            409 => "Conflict",
            413 => "Payload Too Large",
            415 => "Unsupported Media Type",
            422 => "Unprocessable Entity",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            503 => "Service Unavailable",
            _ => "Unknown",
        }
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        Self::OK
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.canonical_reason())
    }
}

/// Response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResponseBody {
    /// Empty body.
    #[default]
    Empty,
    /// Bytes body.
    Bytes(Vec<u8>),
}

impl ResponseBody {
    /// Borrow the body bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Empty => &[],
            Self::Bytes(b) => b,
        }
    }

    /// Check if body is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Get body length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }
}

/// A finished HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: Vec<(String, Vec<u8>)>,
    body: ResponseBody,
}

impl Response {
    /// Create a response with the given status.
    #[must_use]
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: ResponseBody::Empty,
        }
    }

    /// Create a 200 OK response.
    #[must_use]
    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK)
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the body.
    #[must_use]
    pub fn body(mut self, body: ResponseBody) -> Self {
        self.body = body;
        self
    }

    /// Get the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get headers.
    #[must_use]
    pub fn headers(&self) -> &[(String, Vec<u8>)] {
        &self.headers
    }

    /// Get the first header value by name (case-insensitive).
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
    }

    /// Get the body.
    #[must_use]
    pub fn body_ref(&self) -> &ResponseBody {
        &self.body
    }

    /// Decompose into parts.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, Vec<(String, Vec<u8>)>, ResponseBody) {
        (self.status, self.headers, self.body)
    }
}

/// Incremental response sink handed to renderers.
///
/// The head (status and headers) is committed by the first
/// [`write_status`](Self::write_status) or [`write`](Self::write). After
/// that, status and header changes are dropped and only body bytes can be
/// appended. Nothing written is ever retracted.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: Vec<(String, Vec<u8>)>,
    body: Vec<u8>,
    committed: bool,
}

impl ResponseWriter {
    /// Create an empty, uncommitted writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Status that will be sent (200 until one is written).
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or_default()
    }

    /// Whether the head has been committed.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Look up a pending or sent header (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
    }

    /// Set a header, replacing any value with the same name.
    ///
    /// Returns `false` when the head is already committed.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> bool {
        let name = name.into();
        if self.committed {
            tracing::warn!(header = %name, "header dropped: response already committed");
            return false;
        }
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        true
    }

    /// Add a header without replacing existing values.
    ///
    /// Returns `false` when the head is already committed.
    pub fn append_header(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> bool {
        let name = name.into();
        if self.committed {
            tracing::warn!(header = %name, "header dropped: response already committed");
            return false;
        }
        self.headers.push((name, value.into()));
        true
    }

    /// Write the status line and commit the head.
    ///
    /// Returns `false` (and changes nothing) when already committed.
    pub fn write_status(&mut self, status: StatusCode) -> bool {
        if self.committed {
            tracing::warn!(
                status = status.as_u16(),
                sent = self.status().as_u16(),
                "status dropped: response already committed"
            );
            return false;
        }
        self.status = Some(status);
        self.committed = true;
        true
    }

    /// Append body bytes, committing the head with 200 if needed.
    pub fn write(&mut self, bytes: &[u8]) {
        self.committed = true;
        self.body.extend_from_slice(bytes);
    }

    /// Body bytes written so far.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Convert into a finished [`Response`].
    #[must_use]
    pub fn finish(self) -> Response {
        let body = if self.body.is_empty() {
            ResponseBody::Empty
        } else {
            ResponseBody::Bytes(self.body)
        };
        Response {
            status: self.status.unwrap_or_default(),
            headers: self.headers,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_classes() {
        assert!(StatusCode::OK.is_success());
        assert!(StatusCode::NOT_FOUND.is_client_error());
        assert!(StatusCode::INTERNAL_SERVER_ERROR.is_server_error());
        assert_eq!(StatusCode::from_u16(418).canonical_reason(), "Unknown");
        assert_eq!(StatusCode::METHOD_NOT_ALLOWED.to_string(), "405 Method Not Allowed");
    }

    #[test]
    fn writer_defaults_to_ok_with_empty_body() {
        let res = ResponseWriter::new().finish();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.body_ref().is_empty());
    }

    #[test]
    fn headers_before_commit_are_kept() {
        let mut w = ResponseWriter::new();
        assert!(w.set_header("X-Trace", b"1".to_vec()));
        assert!(w.set_header("x-trace", b"2".to_vec()));
        assert!(w.write_status(StatusCode::CREATED));
        let res = w.finish();
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.header_value("x-trace"), Some(&b"2"[..]));
        assert_eq!(res.headers().len(), 1);
    }

    #[test]
    fn status_after_commit_is_ignored() {
        let mut w = ResponseWriter::new();
        w.write(b"partial");
        assert!(w.is_committed());
        assert!(!w.write_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!w.set_header("x-late", b"1".to_vec()));
        w.write(b" more");
        let res = w.finish();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.body_ref().as_bytes(), b"partial more");
        assert!(res.header_value("x-late").is_none());
    }

    #[test]
    fn second_status_is_ignored() {
        let mut w = ResponseWriter::new();
        assert!(w.write_status(StatusCode::ACCEPTED));
        assert!(!w.write_status(StatusCode::OK));
        assert_eq!(w.finish().status(), StatusCode::ACCEPTED);
    }
}
