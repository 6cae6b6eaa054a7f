//! HTTP protocol layer module
//!
//! Request/response models, JSON serialisation and conditional-GET support,
//! decoupled from routing and middleware.

pub mod cache;
pub mod request;
pub mod response;

pub use request::{Payload, Request};
pub use response::Response;
