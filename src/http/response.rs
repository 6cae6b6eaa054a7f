//! In-progress response and its serialisation
//!
//! Middleware and handlers mutate one `Response` per request; the
//! connection layer turns it into a hyper response exactly once.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{HeaderMap, StatusCode};
use serde::Serialize;

use crate::error::HttpError;
use crate::logger;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Serialize `value` as the JSON body
    ///
    /// A serialisation failure turns the response into a 500.
    pub fn json<T: Serialize>(&mut self, value: &T) {
        match serde_json::to_vec(value) {
            Ok(body) => {
                self.headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
                self.body = Bytes::from(body);
            }
            Err(e) => {
                logger::log_error(&format!("Failed to serialize response: {e}"));
                self.error(&HttpError::Internal("serialization failed".to_string()));
            }
        }
    }

    pub fn text(&mut self, status: StatusCode, message: impl Into<String>) {
        self.status = status;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE));
        self.body = Bytes::from(message.into());
    }

    /// Render an error, keeping headers already set (e.g. CORS)
    pub fn error(&mut self, err: &HttpError) {
        self.text(err.status(), err.to_string());
    }

    /// Empty-bodied response with the given status
    pub fn empty(&mut self, status: StatusCode) {
        self.status = status;
        self.body = Bytes::new();
    }

    /// Convert into the wire response; HEAD keeps the length but drops the body
    pub fn into_hyper(self, is_head: bool) -> hyper::Response<Full<Bytes>> {
        let Self {
            status,
            mut headers,
            body,
        } = self;

        let no_body = status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED;
        if !no_body {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        }
        let body = if is_head || no_body { Bytes::new() } else { body };

        let mut res = hyper::Response::new(Full::new(body));
        *res.status_mut() = status;
        *res.headers_mut() = headers;
        res
    }
}
