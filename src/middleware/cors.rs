//! CORS (Cross-Origin Resource Sharing) middleware
//!
//! Sets the cross-origin headers on every response and answers preflight
//! requests. With the default configuration any origin is allowed and
//! `Access-Control-Allow-Origin: *` is present on every reply, including
//! 404s and body-parser errors.

use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS,
    ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD,
    VARY,
};
use hyper::{Method, StatusCode};

use super::{Middleware, Next};
use crate::config::CorsConfig;
use crate::http::{Request, Response};
use crate::logger;

/// CORS middleware
pub struct Cors {
    /// Empty = allow all, answered with `*`
    origins: Vec<String>,
    methods: Option<HeaderValue>,
    allowed_headers: Option<HeaderValue>,
    exposed_headers: Option<HeaderValue>,
    credentials: bool,
    max_age: Option<HeaderValue>,
    preflight_status: StatusCode,
}

impl Cors {
    pub fn new(config: &CorsConfig) -> Self {
        let preflight_status = StatusCode::from_u16(config.preflight_status).unwrap_or_else(|_| {
            logger::log_warning(&format!(
                "Invalid cors.preflight_status {}, using 204",
                config.preflight_status
            ));
            StatusCode::NO_CONTENT
        });

        Self {
            origins: config.origins.clone(),
            methods: join_header(&config.methods),
            allowed_headers: join_header(&config.allowed_headers),
            exposed_headers: join_header(&config.exposed_headers),
            credentials: config.credentials,
            max_age: config.max_age.map(HeaderValue::from),
            preflight_status,
        }
    }

    fn is_origin_allowed(&self, origin: &str) -> bool {
        self.origins.is_empty() || self.origins.iter().any(|o| o == origin || o == "*")
    }

    fn is_preflight(req: &Request) -> bool {
        req.method == Method::OPTIONS && req.headers.contains_key(ACCESS_CONTROL_REQUEST_METHOD)
    }

    fn apply_origin(&self, req: &Request, res: &mut Response) {
        if self.origins.is_empty() {
            res.headers
                .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        } else {
            // The answer depends on the request origin
            res.headers.append(VARY, HeaderValue::from_static("Origin"));
            if let Some(origin) = req.headers.get("origin") {
                let allowed = origin.to_str().is_ok_and(|o| self.is_origin_allowed(o));
                if allowed {
                    res.headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
                }
            }
        }

        if self.credentials {
            res.headers.insert(
                ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
    }

    fn apply_preflight(&self, req: &Request, res: &mut Response) {
        if let Some(methods) = &self.methods {
            res.headers
                .insert(ACCESS_CONTROL_ALLOW_METHODS, methods.clone());
        }

        match &self.allowed_headers {
            Some(headers) => {
                res.headers
                    .insert(ACCESS_CONTROL_ALLOW_HEADERS, headers.clone());
            }
            None => {
                // Reflect whatever the browser asked for
                res.headers.append(
                    VARY,
                    HeaderValue::from_static("Access-Control-Request-Headers"),
                );
                if let Some(requested) = req.headers.get(ACCESS_CONTROL_REQUEST_HEADERS) {
                    res.headers
                        .insert(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
                }
            }
        }

        if let Some(max_age) = &self.max_age {
            res.headers.insert(ACCESS_CONTROL_MAX_AGE, max_age.clone());
        }
    }

    fn apply_expose(&self, res: &mut Response) {
        if let Some(exposed) = &self.exposed_headers {
            res.headers
                .insert(ACCESS_CONTROL_EXPOSE_HEADERS, exposed.clone());
        }
    }
}

impl Middleware for Cors {
    fn name(&self) -> &'static str {
        "cors"
    }

    fn handle(&self, req: &mut Request, res: &mut Response) -> Next {
        self.apply_origin(req, res);

        if Self::is_preflight(req) {
            self.apply_preflight(req, res);
            res.empty(self.preflight_status);
            return Next::Stop;
        }

        self.apply_expose(res);
        Next::Continue
    }
}

/// Comma-join a configured list into one header value; `None` when empty
fn join_header(values: &[String]) -> Option<HeaderValue> {
    if values.is_empty() {
        return None;
    }
    let joined = values.join(",");
    match HeaderValue::from_str(&joined) {
        Ok(v) => Some(v),
        Err(e) => {
            logger::log_warning(&format!("Ignoring invalid CORS header list '{joined}': {e}"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permissive() -> Cors {
        Cors::new(&CorsConfig::default())
    }

    fn run(cors: &Cors, mut req: Request) -> (Next, Response) {
        let mut res = Response::new();
        let next = cors.handle(&mut req, &mut res);
        (next, res)
    }

    #[test]
    fn test_simple_request_allows_any_origin() {
        let cors = permissive();
        let req = Request::builder()
            .header("origin", "http://localhost:5173")
            .build();
        let (next, res) = run(&cors, req);
        assert_eq!(next, Next::Continue);
        assert_eq!(res.headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(res.headers.get(ACCESS_CONTROL_ALLOW_METHODS).is_none());
        assert!(res.headers.get(ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
    }

    #[test]
    fn test_header_set_without_origin() {
        let (next, res) = run(&permissive(), Request::builder().uri("/nowhere").build());
        assert_eq!(next, Next::Continue);
        assert_eq!(res.headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn test_preflight_short_circuits() {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type,x-token")
            .build();
        let (next, res) = run(&permissive(), req);
        assert_eq!(next, Next::Stop);
        assert_eq!(res.status, StatusCode::NO_CONTENT);
        assert!(res.body.is_empty());
        assert_eq!(res.headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            res.headers[ACCESS_CONTROL_ALLOW_METHODS],
            "GET,HEAD,PUT,PATCH,POST,DELETE"
        );
        assert_eq!(
            res.headers[ACCESS_CONTROL_ALLOW_HEADERS],
            "content-type,x-token"
        );
        assert_eq!(res.headers[VARY], "Access-Control-Request-Headers");
        assert!(res.headers.get(ACCESS_CONTROL_MAX_AGE).is_none());
    }

    #[test]
    fn test_plain_options_is_not_preflight() {
        let req = Request::builder().method(Method::OPTIONS).build();
        let (next, res) = run(&permissive(), req);
        assert_eq!(next, Next::Continue);
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn test_configured_origins_are_reflected() {
        let config = CorsConfig {
            origins: vec!["https://app.example.com".to_string()],
            credentials: true,
            exposed_headers: vec!["ETag".to_string()],
            ..CorsConfig::default()
        };
        let cors = Cors::new(&config);

        let req = Request::builder()
            .header("origin", "https://app.example.com")
            .build();
        let (_, res) = run(&cors, req);
        assert_eq!(
            res.headers[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example.com"
        );
        assert_eq!(res.headers[VARY], "Origin");
        assert_eq!(res.headers[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(res.headers[ACCESS_CONTROL_EXPOSE_HEADERS], "ETag");

        let req = Request::builder()
            .header("origin", "https://evil.example.com")
            .build();
        let (next, res) = run(&cors, req);
        assert_eq!(next, Next::Continue);
        assert!(res.headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[test]
    fn test_preflight_with_fixed_headers_and_max_age() {
        let config = CorsConfig {
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
            max_age: Some(600),
            preflight_status: 200,
            ..CorsConfig::default()
        };
        let req = Request::builder()
            .method(Method::OPTIONS)
            .header("access-control-request-method", "PUT")
            .build();
        let (next, res) = run(&Cors::new(&config), req);
        assert_eq!(next, Next::Stop);
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(
            res.headers[ACCESS_CONTROL_ALLOW_HEADERS],
            "Content-Type,Authorization"
        );
        assert_eq!(res.headers[ACCESS_CONTROL_MAX_AGE], "600");
        assert!(res.headers.get(VARY).is_none());
    }
}
