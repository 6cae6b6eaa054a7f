//! Buffered request model
//!
//! One `Request` is built per exchange by the connection layer and handed
//! through the middleware chain to the router.

use std::net::SocketAddr;

use hyper::body::Bytes;
use hyper::{HeaderMap, Method, Uri, Version};

/// Request body as received by the connection layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// No body was sent
    Empty,
    Bytes(Bytes),
    /// The body exceeded the transport cap and was not buffered
    TooLarge { limit: u64 },
    /// The body was not complete within the read timeout
    TimedOut { secs: u64 },
    /// The client stopped sending before the body was complete
    Aborted(String),
    /// Not a body the server parses, so it was never read
    Skipped,
}

impl Payload {
    pub fn from_bytes(bytes: Bytes) -> Self {
        if bytes.is_empty() {
            Self::Empty
        } else {
            Self::Bytes(bytes)
        }
    }
}

#[derive(Debug)]
pub struct Request {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: Payload,
    /// Parsed JSON body, filled in by the body middleware
    pub json: Option<serde_json::Value>,
    pub remote_addr: Option<SocketAddr>,
}

impl Request {
    pub fn new(
        parts: hyper::http::request::Parts,
        body: Payload,
        remote_addr: Option<SocketAddr>,
    ) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            body,
            json: None,
            remote_addr,
        }
    }

    /// Request path without the query string
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Header value as text; non-visible-ASCII values read as absent
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[cfg(test)]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }
}

/// Test-side construction of requests without a socket
#[cfg(test)]
#[derive(Default)]
pub struct RequestBuilder {
    inner: hyper::http::request::Builder,
    body: Option<Bytes>,
}

#[cfg(test)]
impl RequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.inner = self.inner.method(method);
        self
    }

    pub fn uri(mut self, uri: &str) -> Self {
        self.inner = self.inner.uri(uri);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.inner = self.inner.header(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn build(self) -> Request {
        let (parts, ()) = self.inner.body(()).unwrap().into_parts();
        let body = self.body.map_or(Payload::Empty, Payload::from_bytes);
        Request::new(parts, body, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_excludes_query() {
        let req = Request::builder().uri("/?name=x").build();
        assert_eq!(req.path(), "/");
        assert_eq!(req.method, Method::GET);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = Request::builder()
            .header("Content-Type", "application/json")
            .build();
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(req.header("origin"), None);
    }

    #[test]
    fn test_empty_body_is_absent() {
        assert_eq!(Payload::from_bytes(Bytes::new()), Payload::Empty);
        assert_eq!(
            Payload::from_bytes(Bytes::from_static(b"{}")),
            Payload::Bytes(Bytes::from_static(b"{}"))
        );
    }
}
