//! Middleware chain
//!
//! Each middleware sees the request and the in-progress response, in
//! registration order, and may end the exchange early.

pub mod cors;
pub mod json_body;

pub use cors::Cors;
pub use json_body::JsonBody;

use crate::http::{Request, Response};

/// What the chain does after a middleware returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// Hand the exchange to the next middleware, then the router
    Continue,
    /// Send the response as it stands; routing is skipped
    Stop,
}

pub trait Middleware: Send + Sync {
    fn name(&self) -> &'static str;

    fn handle(&self, req: &mut Request, res: &mut Response) -> Next;
}

/// Ordered middleware list, fixed once the application is built
#[derive(Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Box<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Box::new(middleware));
        self
    }

    /// Run middlewares in order; `Next::Stop` if one of them answered
    pub fn run(&self, req: &mut Request, res: &mut Response) -> Next {
        for m in &self.middlewares {
            if m.handle(req, res) == Next::Stop {
                crate::logger::log_debug(&format!(
                    "{} answered {} {} with {}",
                    m.name(),
                    req.method,
                    req.path(),
                    res.status
                ));
                return Next::Stop;
            }
        }
        Next::Continue
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }
}
