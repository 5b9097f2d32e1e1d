//! Test utilities for handlers.
//!
//! [`TestClient`] drives any [`Handler`] in-process, without a network, using
//! a testing [`Cx`] and a blocking executor.
//!
//! # Example
//!
//! ```ignore
//! use funcmux_core::testing::TestClient;
//!
//! let client = TestClient::new(mux);
//! let response = client.get("/user/42").send();
//!
//! assert_eq!(response.status().as_u16(), 200);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use asupersync::Cx;

use crate::context::RequestContext;
use crate::handler::Handler;
use crate::request::{Body, Method, Request};
use crate::response::{Response, StatusCode};

/// In-process client for a handler.
pub struct TestClient<H> {
    handler: Arc<H>,
    request_id_counter: Arc<AtomicU64>,
}

impl<H: Handler + 'static> TestClient<H> {
    /// Creates a new test client wrapping the given handler.
    pub fn new(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
            request_id_counter: Arc::new(AtomicU64::new(1)),
        }
    }

    /// The wrapped handler.
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Starts building a GET request.
    pub fn get(&self, path: &str) -> RequestBuilder<'_, H> {
        self.request(Method::Get, path)
    }

    /// Starts building a POST request.
    pub fn post(&self, path: &str) -> RequestBuilder<'_, H> {
        self.request(Method::Post, path)
    }

    /// Starts building a PUT request.
    pub fn put(&self, path: &str) -> RequestBuilder<'_, H> {
        self.request(Method::Put, path)
    }

    /// Starts building a PATCH request.
    pub fn patch(&self, path: &str) -> RequestBuilder<'_, H> {
        self.request(Method::Patch, path)
    }

    /// Starts building a DELETE request.
    pub fn delete(&self, path: &str) -> RequestBuilder<'_, H> {
        self.request(Method::Delete, path)
    }

    /// Starts building an OPTIONS request.
    pub fn options(&self, path: &str) -> RequestBuilder<'_, H> {
        self.request(Method::Options, path)
    }

    /// Starts building a request with any method.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder<'_, H> {
        RequestBuilder::new(self, method, path)
    }

    fn next_request_id(&self) -> u64 {
        self.request_id_counter.fetch_add(1, Ordering::SeqCst)
    }

    fn execute(&self, mut request: Request) -> TestResponse {
        let request_id = self.next_request_id();
        let ctx = RequestContext::new(Cx::for_testing(), request_id);
        let response = futures_executor::block_on(self.handler.call(&ctx, &mut request));
        TestResponse::new(response, request_id)
    }
}

impl<H> Clone for TestClient<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            request_id_counter: Arc::clone(&self.request_id_counter),
        }
    }
}

/// Builder for constructing test requests with a fluent API.
///
/// ```ignore
/// let response = client
///     .post("/food")
///     .query("amount", "3")
///     .body(r#"{"name": "pie"}"#)
///     .send();
/// ```
pub struct RequestBuilder<'a, H> {
    client: &'a TestClient<H>,
    method: Method,
    path: String,
    query: Option<String>,
    headers: Vec<(String, Vec<u8>)>,
    body: Body,
}

impl<'a, H: Handler + 'static> RequestBuilder<'a, H> {
    fn new(client: &'a TestClient<H>, method: Method, path: &str) -> Self {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (path.to_string(), None),
        };

        Self {
            client,
            method,
            path,
            query,
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    /// Appends a query string parameter. The pair is sent as given, so
    /// encode reserved characters yourself.
    #[must_use]
    pub fn query(mut self, key: &str, value: &str) -> Self {
        let param = format!("{key}={value}");
        self.query = Some(match self.query {
            Some(q) => format!("{q}&{param}"),
            None => param,
        });
        self
    }

    /// Sets a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the request body as raw bytes.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Body::Bytes(body.into());
        self
    }

    /// Sets the request body as JSON and the matching content type.
    ///
    /// # Panics
    ///
    /// Panics if the value cannot be serialized.
    #[must_use]
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Self {
        let bytes = serde_json::to_vec(value).expect("JSON serialization failed");
        self.body = Body::Bytes(bytes);
        self.headers
            .push(("content-type".to_string(), b"application/json".to_vec()));
        self
    }

    /// Sends the request and returns the response.
    #[must_use]
    pub fn send(self) -> TestResponse {
        let mut request = Request::new(self.method, self.path);
        request.set_query(self.query);
        request.set_body(self.body);

        for (name, value) in self.headers {
            request.headers_mut().insert(name, value);
        }

        self.client.execute(request)
    }
}

/// Response from a test request with assertion helpers.
#[derive(Debug)]
pub struct TestResponse {
    inner: Response,
    request_id: u64,
}

impl TestResponse {
    fn new(response: Response, request_id: u64) -> Self {
        Self {
            inner: response,
            request_id,
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Returns the status code as a number.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Returns a header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&[u8]> {
        self.inner.header_value(name)
    }

    /// Returns a header value as a string.
    #[must_use]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.header(name).and_then(|v| std::str::from_utf8(v).ok())
    }

    /// Returns the body bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.inner.body_ref().as_bytes()
    }

    /// Returns the body as a UTF-8 string.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid UTF-8.
    #[must_use]
    pub fn text(&self) -> &str {
        std::str::from_utf8(self.bytes()).expect("response body is not valid UTF-8")
    }

    /// Parses the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(self.bytes())
    }

    /// The `error` field of a JSON error body.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        let value: serde_json::Value = self.json().ok()?;
        value.get("error")?.as_str().map(str::to_string)
    }

    /// Returns the underlying response.
    #[must_use]
    pub fn into_inner(self) -> Response {
        self.inner
    }

    /// Asserts that the status code equals the expected value.
    ///
    /// # Panics
    ///
    /// Panics with a descriptive message if the assertion fails.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status(),
            expected,
            "Expected status {}, got {} for request {}: {}",
            expected.as_u16(),
            self.status_code(),
            self.request_id,
            String::from_utf8_lossy(self.bytes())
        );
        self
    }

    /// Asserts that a header has the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        assert_eq!(
            self.header_str(name),
            Some(expected),
            "Header {name} mismatch for request {}",
            self.request_id
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::BoxFuture;
    use crate::response::ResponseBody;

    struct EchoHandler;

    impl Handler for EchoHandler {
        fn call<'a>(
            &'a self,
            _ctx: &'a RequestContext,
            req: &'a mut Request,
        ) -> BoxFuture<'a, Response> {
            let body = format!(
                "{} {} {}",
                req.method(),
                req.path(),
                req.query().unwrap_or_default()
            );
            Box::pin(async move {
                Response::ok()
                    .header("content-type", b"text/plain".to_vec())
                    .body(ResponseBody::Bytes(body.into_bytes()))
            })
        }
    }

    #[test]
    fn sends_method_path_and_query() {
        let client = TestClient::new(EchoHandler);
        let response = client.get("/items?a=1").query("b", "2").send();
        response
            .assert_status(StatusCode::OK)
            .assert_header("content-type", "text/plain");
        assert_eq!(response.text(), "GET /items a=1&b=2");
    }

    #[test]
    fn request_ids_increase() {
        let client = TestClient::new(EchoHandler);
        let first = client.delete("/").send();
        let second = client.clone().patch("/").send();
        assert!(second.request_id() > first.request_id());
        assert_eq!(second.text(), "PATCH / ");
    }
}
