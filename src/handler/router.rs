//! Request routing module
//!
//! Exact (method, path) lookup over a table built once at startup.

use std::collections::HashMap;

use hyper::Method;

use crate::error::HttpError;
use crate::http::{Request, Response};

/// Produces the final response for a matched route
pub type Handler = Box<dyn Fn(&Request, &mut Response) + Send + Sync>;

#[derive(Default)]
pub struct Router {
    routes: HashMap<(Method, String), Handler>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; a later registration for the same pair replaces it
    #[must_use]
    pub fn route<F>(mut self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(&Request, &mut Response) + Send + Sync + 'static,
    {
        self.routes
            .insert((method, path.to_string()), Box::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Run the matching handler, or render 404 into `res`
    pub fn dispatch(&self, req: &Request, res: &mut Response) {
        let key = (req.method.clone(), req.path().to_string());
        match self.routes.get(&key) {
            Some(handler) => handler(req, res),
            None => res.error(&HttpError::NotFound {
                method: req.method.clone(),
                path: req.path().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::StatusCode;

    fn router() -> Router {
        Router::new().route(Method::GET, "/ping", |_req, res| {
            res.text(StatusCode::OK, "pong");
        })
    }

    fn dispatch(router: &Router, method: Method, uri: &str) -> Response {
        let req = Request::builder().method(method).uri(uri).build();
        let mut res = Response::new();
        router.dispatch(&req, &mut res);
        res
    }

    #[test]
    fn test_exact_match() {
        let res = dispatch(&router(), Method::GET, "/ping");
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(&res.body[..], b"pong");
    }

    #[test]
    fn test_query_string_is_ignored() {
        let res = dispatch(&router(), Method::GET, "/ping?verbose=1");
        assert_eq!(res.status, StatusCode::OK);
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        for path in ["/pong", "/ping/", "/PING", "/"] {
            let res = dispatch(&router(), Method::GET, path);
            assert_eq!(res.status, StatusCode::NOT_FOUND, "path {path}");
        }
        let res = dispatch(&router(), Method::GET, "/hello");
        assert_eq!(&res.body[..], b"Cannot GET /hello");
    }

    #[test]
    fn test_method_must_match() {
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD] {
            let res = dispatch(&router(), method.clone(), "/ping");
            assert_eq!(res.status, StatusCode::NOT_FOUND, "method {method}");
        }
    }

    #[test]
    fn test_registration_replaces() {
        let router = router().route(Method::GET, "/ping", |_req, res| {
            res.text(StatusCode::OK, "pong v2");
        });
        assert_eq!(router.len(), 1);
        assert!(!router.is_empty());
        let res = dispatch(&router, Method::GET, "/ping");
        assert_eq!(&res.body[..], b"pong v2");
    }
}
