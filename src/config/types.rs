// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub body: BodyConfig,
    pub cors: CorsConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Idle seconds allowed between keep-alive requests; 0 disables keep-alive
    pub keep_alive_timeout: u64,
    /// Seconds allowed to receive a request head or a JSON body
    pub read_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Hard cap on a buffered request body, whatever its content type
    pub max_body_size: u64,
}

/// JSON body parser configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BodyConfig {
    pub json_limit: u64,
    /// Only accept objects and arrays at the top level
    pub strict: bool,
    pub json_types: Vec<String>,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            json_limit: 102_400,
            strict: true,
            json_types: vec!["application/json".to_string()],
        }
    }
}

/// Cross-origin policy configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Allowed origins (empty = any origin)
    #[serde(default)]
    pub origins: Vec<String>,
    pub methods: Vec<String>,
    /// Allowed request headers (empty = reflect the preflight request)
    #[serde(default)]
    pub allowed_headers: Vec<String>,
    #[serde(default)]
    pub exposed_headers: Vec<String>,
    pub credentials: bool,
    #[serde(default)]
    pub max_age: Option<u64>,
    pub preflight_status: u16,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: Vec::new(),
            methods: ["GET", "HEAD", "PUT", "PATCH", "POST", "DELETE"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            allowed_headers: Vec::new(),
            exposed_headers: Vec::new(),
            credentials: false,
            max_age: None,
            preflight_status: 204,
        }
    }
}
