//! HTTP cache validation module
//!
//! Weak `ETag` generation for successful responses and `If-None-Match`
//! handling for GET/HEAD requests.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use hyper::header::{HeaderValue, ETAG};
use hyper::{Method, StatusCode};

use super::{Request, Response};
use crate::logger;

/// Generate a weak `ETag` from the body length and a fast hash
///
/// # Returns
/// e.g. `W/"28-1b2c3d4e5f607182"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("W/\"{:x}-{:x}\"", content.len(), hasher.finish())
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single tag, a comma-separated list, and `*`. Comparison is
/// weak: a `W/` prefix on either side is ignored.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    let etag = strip_weak(etag);
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').map(str::trim).any(|e| e == "*" || strip_weak(e) == etag)
    })
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

/// Tag a 200 response and downgrade it to 304 when the client copy is fresh
pub fn apply_conditional(req: &Request, res: &mut Response) {
    if res.status != StatusCode::OK || res.body.is_empty() {
        return;
    }

    let etag = generate_etag(&res.body);
    match HeaderValue::from_str(&etag) {
        Ok(value) => {
            res.headers.insert(ETAG, value);
        }
        Err(e) => {
            logger::log_error(&format!("Invalid ETag {etag}: {e}"));
            return;
        }
    }

    let cacheable = req.method == Method::GET || req.method == Method::HEAD;
    if cacheable && check_etag_match(req.header("if-none-match"), &etag) {
        res.empty(StatusCode::NOT_MODIFIED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::body::Bytes;

    #[test]
    fn test_generate_etag() {
        let etag = generate_etag(b"hello world");
        assert!(etag.starts_with("W/\"b-"));
        assert!(etag.ends_with('"'));
    }

    #[test]
    fn test_etag_consistency() {
        assert_eq!(generate_etag(b"same content"), generate_etag(b"same content"));
        assert_ne!(generate_etag(b"content a"), generate_etag(b"content b"));
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "W/\"5-abc123\"";
        assert!(check_etag_match(Some("W/\"5-abc123\""), etag));
        assert!(check_etag_match(Some("\"5-abc123\""), etag));
        assert!(check_etag_match(Some("\"xyz\", W/\"5-abc123\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"different\""), etag));
        assert!(!check_etag_match(None, etag));
    }

    fn ok_response() -> Response {
        let mut res = Response::new();
        res.json(&serde_json::json!({"message": "hi"}));
        res
    }

    #[test]
    fn test_apply_conditional_tags_response() {
        let req = Request::builder().build();
        let mut res = ok_response();
        apply_conditional(&req, &mut res);
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.headers[ETAG], generate_etag(&res.body).as_str());
    }

    #[test]
    fn test_apply_conditional_not_modified() {
        let etag = generate_etag(&ok_response().body);
        let req = Request::builder().header("if-none-match", &etag).build();
        let mut res = ok_response();
        apply_conditional(&req, &mut res);
        assert_eq!(res.status, StatusCode::NOT_MODIFIED);
        assert!(res.body.is_empty());
    }

    #[test]
    fn test_apply_conditional_skips_errors_and_posts() {
        let req = Request::builder().build();
        let mut res = Response::new();
        res.text(StatusCode::NOT_FOUND, "Cannot GET /foo");
        apply_conditional(&req, &mut res);
        assert!(res.headers.get(ETAG).is_none());

        let etag = generate_etag(&ok_response().body);
        let req = Request::builder()
            .method(Method::POST)
            .header("if-none-match", &etag)
            .body(Bytes::new())
            .build();
        let mut res = ok_response();
        apply_conditional(&req, &mut res);
        assert_eq!(res.status, StatusCode::OK);
    }
}
