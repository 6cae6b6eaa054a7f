// Server module entry point
// Listener creation, the accept loop and per-connection serving

pub mod connection;
pub mod listener;

// `loop` is a keyword, so the module is named server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::time::Duration;

use crate::config::Config;

pub use listener::create_listener;
pub use server_loop::serve;

/// Connection settings resolved once from the config
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub keep_alive: bool,
    /// Deadline for a request head, counted from when the connection goes
    /// idle; with keep-alive on this is the idle limit between requests
    pub header_read_timeout: Duration,
    /// Deadline for buffering one JSON request body
    pub body_read_timeout: Duration,
    pub max_connections: Option<usize>,
    /// Hard cap on a buffered request body
    pub max_body_size: u64,
    /// Lowercased media types whose bodies are read and parsed
    pub json_types: Vec<String>,
    /// Access log format, `None` when access logging is off
    pub access_log_format: Option<String>,
}

impl ServerSettings {
    pub fn from_config(config: &Config) -> Self {
        let perf = &config.performance;
        let keep_alive = perf.keep_alive_timeout > 0;
        let read_timeout = Duration::from_secs(perf.read_timeout);
        Self {
            keep_alive,
            header_read_timeout: if keep_alive {
                Duration::from_secs(perf.keep_alive_timeout)
            } else {
                read_timeout
            },
            body_read_timeout: read_timeout,
            max_connections: perf
                .max_connections
                .map(|max| usize::try_from(max).unwrap_or(usize::MAX)),
            max_body_size: config.http.max_body_size,
            json_types: config
                .body
                .json_types
                .iter()
                .map(|t| t.trim().to_ascii_lowercase())
                .collect(),
            access_log_format: config
                .logging
                .access_log
                .then(|| config.logging.access_log_format.clone()),
        }
    }
}
