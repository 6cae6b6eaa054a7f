//! Minimal HTTP backend: one JSON greeting at `GET /`, permissive CORS on
//! every response, and a JSON body parser that never takes the server down.

pub mod app;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod middleware;
pub mod server;

pub use app::App;
pub use config::Config;
pub use server::ServerSettings;
