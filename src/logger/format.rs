//! Access log format module
//!
//! Supported formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)

use std::time::Duration;

use chrono::Local;

use crate::http::{Request, Response};

const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Access log entry for one request/response cycle
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client address, `-` when unknown
    pub remote_addr: String,
    pub time: chrono::DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// HTTP version as it appears in the request line, e.g. `1.1`
    pub http_version: String,
    pub status: u16,
    pub body_bytes: usize,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub origin: Option<String>,
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Capture the fields of a finished exchange
    ///
    /// `body_bytes` counts what goes on the wire, so HEAD replies log 0.
    pub fn from_exchange(req: &Request, res: &Response, elapsed: Duration) -> Self {
        let version = format!("{:?}", req.version);
        Self {
            remote_addr: req
                .remote_addr
                .map_or_else(|| "-".to_string(), |a| a.ip().to_string()),
            time: Local::now(),
            method: req.method.to_string(),
            path: req.path().to_string(),
            query: req.uri.query().map(ToString::to_string),
            http_version: version.trim_start_matches("HTTP/").to_string(),
            status: res.status.as_u16(),
            body_bytes: if req.method == hyper::Method::HEAD {
                0
            } else {
                res.body.len()
            },
            referer: req.header("referer").map(ToString::to_string),
            user_agent: req.header("user-agent").map(ToString::to_string),
            origin: req.header("origin").map(ToString::to_string),
            request_time_us: u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
        }
    }

    /// Format the log entry; unknown format names fall back to `combined`
    pub fn format(&self, format: &str) -> String {
        match format {
            "common" => self.format_common(),
            "json" => self.format_json(),
            _ => self.format_combined(),
        }
    }

    fn request_line(&self) -> String {
        format!(
            "{} {}{} HTTP/{}",
            self.method,
            self.path,
            self.query
                .as_ref()
                .map(|q| format!("?{q}"))
                .unwrap_or_default(),
            self.http_version
        )
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent "$http_referer" "$http_user_agent"`
    fn format_combined(&self) -> String {
        format!(
            "{} \"{}\" \"{}\"",
            self.format_common(),
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "origin": self.origin,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }
}
