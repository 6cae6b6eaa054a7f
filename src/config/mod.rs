// Configuration module entry point
// Layered loading: built-in defaults, optional TOML file, then HELLO_* environment
// (e.g. HELLO_SERVER__PORT=4000)

mod types;

use std::net::SocketAddr;

use crate::error::StartupError;

pub use types::{
    BodyConfig, Config, CorsConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig,
};

/// Default config file name (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("HELLO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only, ignoring files and environment
    pub fn defaults() -> Result<Self, config::ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    /// Builder carrying only the built-in defaults
    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        let body = BodyConfig::default();
        let cors = CorsConfig::default();

        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", false)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 5)?
            .set_default("performance.read_timeout", 30)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("body.json_limit", 102_400)? // 100kb
            .set_default("body.strict", body.strict)?
            .set_default("body.json_types", body.json_types)?
            .set_default("cors.origins", cors.origins)?
            .set_default("cors.methods", cors.methods)?
            .set_default("cors.allowed_headers", cors.allowed_headers)?
            .set_default("cors.exposed_headers", cors.exposed_headers)?
            .set_default("cors.credentials", cors.credentials)?
            .set_default("cors.preflight_status", 204)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|e| StartupError::InvalidAddress(format!("{addr}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_str(toml: &str) -> Result<Config, config::ConfigError> {
        Config::builder()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::defaults().unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert!(cfg.server.workers.is_none());
        assert!(!cfg.logging.access_log);
        assert_eq!(cfg.body.json_limit, 102_400);
        assert!(cfg.body.strict);
        assert_eq!(cfg.body.json_types, vec!["application/json"]);
        assert!(cfg.cors.origins.is_empty());
        assert_eq!(cfg.cors.methods.len(), 6);
        assert_eq!(cfg.cors.preflight_status, 204);
        assert!(cfg.cors.max_age.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let cfg = load_str(
            r#"
            [server]
            port = 4000

            [cors]
            origins = ["https://example.com"]
            max_age = 600
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 4000);
        assert_eq!(cfg.cors.origins, vec!["https://example.com"]);
        assert_eq!(cfg.cors.max_age, Some(600));
        // Untouched keys keep their defaults
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.cors.preflight_status, 204);
    }

    #[test]
    fn test_full_document_deserializes() {
        let cfg: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 3000
            workers = 2

            [logging]
            level = "debug"
            access_log = true
            access_log_format = "json"

            [performance]
            keep_alive_timeout = 5
            read_timeout = 30
            max_connections = 100

            [http]
            max_body_size = 1048576

            [body]
            json_limit = 1024
            strict = false
            json_types = ["application/json", "application/vnd.api+json"]

            [cors]
            methods = ["GET"]
            credentials = true
            preflight_status = 200
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.workers, Some(2));
        assert_eq!(cfg.performance.max_connections, Some(100));
        assert!(!cfg.body.strict);
        assert!(cfg.cors.credentials);
        assert!(cfg.logging.access_log_file.is_none());
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = load_str("").unwrap();
        assert_eq!(cfg.socket_addr().unwrap().port(), 3000);

        cfg.server.host = "not a host".to_string();
        assert!(matches!(
            cfg.socket_addr(),
            Err(StartupError::InvalidAddress(_))
        ));
    }
}
