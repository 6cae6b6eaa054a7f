//! Application object
//!
//! Built once from `Config` and shared read-only by every connection:
//! middleware chain, then router, then cache validation.

use hyper::Method;

use crate::config::Config;
use crate::handler::{self, Router};
use crate::http::{cache, Request, Response};
use crate::middleware::{Cors, JsonBody, MiddlewareChain, Next};

pub struct App {
    middleware: MiddlewareChain,
    router: Router,
}

impl App {
    pub const fn new(middleware: MiddlewareChain, router: Router) -> Self {
        Self { middleware, router }
    }

    /// CORS, then JSON body parsing, then the greeting route
    pub fn from_config(config: &Config) -> Self {
        let middleware = MiddlewareChain::new()
            .with(Cors::new(&config.cors))
            .with(JsonBody::new(&config.body));
        let router = Router::new().route(Method::GET, "/", handler::greeting);
        Self::new(middleware, router)
    }

    /// Produce the single response for `req`
    pub fn handle(&self, req: &mut Request) -> Response {
        let mut res = Response::new();
        if self.middleware.run(req, &mut res) == Next::Continue {
            self.router.dispatch(req, &mut res);
        }
        cache::apply_conditional(req, &mut res);
        res
    }

    pub fn describe(&self) -> String {
        format!(
            "middleware [{}], {} route(s)",
            self.middleware.names().join(" -> "),
            self.router.len()
        )
    }
}
