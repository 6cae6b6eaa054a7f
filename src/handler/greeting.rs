//! The greeting endpoint

use serde::Serialize;

use crate::http::{Request, Response};

pub const GREETING: &str = "Hello from Express backend!";

#[derive(Debug, Serialize)]
struct Greeting {
    message: &'static str,
}

/// GET `/`: static JSON greeting; the request is not consulted
pub fn greeting(_req: &Request, res: &mut Response) {
    res.json(&Greeting { message: GREETING });
}
