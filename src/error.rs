//! Error types for the greeting service

use std::net::SocketAddr;

use hyper::{Method, StatusCode};
use thiserror::Error;

/// Request-level failures, each rendered as an HTTP response
#[derive(Debug, Error)]
pub enum HttpError {
    /// No route registered for the method and path
    #[error("Cannot {method} {path}")]
    NotFound { method: Method, path: String },

    /// Malformed request body
    #[error("Bad Request: {0}")]
    BadRequest(String),

    /// Body larger than the configured limit
    #[error("Payload Too Large: body exceeds limit of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    /// The client stopped sending the body before the read deadline
    #[error("Request Timeout: body not received within {secs} seconds")]
    RequestTimeout { secs: u64 },

    /// Charset or encoding the body parser cannot decode
    #[error("Unsupported Media Type: {0}")]
    UnsupportedMediaType(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RequestTimeout { .. } => StatusCode::REQUEST_TIMEOUT,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Fatal failures before the accept loop starts
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The configured port is unavailable
    #[error("Failed to listen on {addr}: {source}")]
    Listen {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Failed to open log files: {0}")]
    Logger(#[source] std::io::Error),
}
