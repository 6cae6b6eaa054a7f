//! Request handler module
//!
//! The route table and the handlers registered in it.

pub mod greeting;
pub mod router;

pub use greeting::greeting;
pub use router::Router;
