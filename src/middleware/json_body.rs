//! JSON body middleware
//!
//! Parses JSON request bodies into `Request::json`. Requests without a
//! body, or with another content type, pass through untouched. Parse and
//! size failures answer 4xx and end the chain; they never reach the
//! accept loop.

use super::{Middleware, Next};
use crate::config::BodyConfig;
use crate::error::HttpError;
use crate::http::{Payload, Request, Response};
use crate::logger;

/// Lowercased media type of a `Content-Type` value, parameters removed
pub fn media_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether `content_type` names one of the (lowercased) `types`
pub fn is_json_type(content_type: Option<&str>, types: &[String]) -> bool {
    content_type.is_some_and(|ct| {
        let essence = media_essence(ct);
        types.iter().any(|t| *t == essence)
    })
}

pub struct JsonBody {
    limit: u64,
    strict: bool,
    types: Vec<String>,
}

impl JsonBody {
    pub fn new(config: &BodyConfig) -> Self {
        Self {
            limit: config.json_limit,
            strict: config.strict,
            types: config
                .json_types
                .iter()
                .map(|t| t.trim().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Media type of the request if it is one we parse, with its charset
    fn json_media<'r>(&self, req: &'r Request) -> Option<Option<&'r str>> {
        let content_type = req.header("content-type")?;
        if !is_json_type(Some(content_type), &self.types) {
            return None;
        }

        let charset = content_type.split(';').skip(1).find_map(|p| {
            let (key, value) = p.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches('"'))
        });
        Some(charset)
    }

    fn parse(&self, req: &Request) -> Result<Option<serde_json::Value>, HttpError> {
        let bytes = match &req.body {
            Payload::Empty | Payload::Skipped => return Ok(None),
            Payload::TooLarge { limit } => return Err(HttpError::PayloadTooLarge { limit: *limit }),
            Payload::TimedOut { secs } => return Err(HttpError::RequestTimeout { secs: *secs }),
            Payload::Aborted(reason) => {
                return Err(HttpError::BadRequest(format!("request aborted: {reason}")))
            }
            Payload::Bytes(bytes) => bytes,
        };

        let Some(charset) = self.json_media(req) else {
            return Ok(None);
        };

        if let Some(charset) = charset {
            if !charset.eq_ignore_ascii_case("utf-8") && !charset.eq_ignore_ascii_case("utf8") {
                return Err(HttpError::UnsupportedMediaType(format!(
                    "unsupported charset \"{}\"",
                    charset.to_ascii_uppercase()
                )));
            }
        }

        if u64::try_from(bytes.len()).unwrap_or(u64::MAX) > self.limit {
            return Err(HttpError::PayloadTooLarge { limit: self.limit });
        }

        if self.strict {
            let first = bytes.iter().find(|b| !b.is_ascii_whitespace());
            if !matches!(first, Some(b'{' | b'[')) {
                return Err(HttpError::BadRequest(
                    "JSON body must be an object or array".to_string(),
                ));
            }
        }

        serde_json::from_slice(bytes)
            .map(Some)
            .map_err(|e| HttpError::BadRequest(format!("invalid JSON: {e}")))
    }
}

impl Middleware for JsonBody {
    fn name(&self) -> &'static str {
        "json-body"
    }

    fn handle(&self, req: &mut Request, res: &mut Response) -> Next {
        match self.parse(req) {
            Ok(json) => {
                req.json = json;
                Next::Continue
            }
            Err(e) => {
                logger::log_warning(&format!("{} {}: {e}", req.method, req.path()));
                res.error(&e);
                Next::Stop
            }
        }
    }
}
