//! Error types for the Quote/0 SDK.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when interacting with the Quote/0 API.
#[derive(Debug, Error)]
pub enum Error {
    /// Client construction requires a non-empty API token (format: `dot_app_xxx`)
    #[error("API token is required")]
    MissingApiToken,

    /// The request had no device id and the client has no default device
    #[error("deviceId is required")]
    MissingDeviceId,

    /// An image request resolved to an empty image payload
    #[error("image payload is required")]
    MissingImagePayload,

    /// Request payload could not be serialized to JSON
    #[error("failed to encode request: {0}")]
    Serialization(String),

    /// HTTP request failed (connection error, timeout, body read failure)
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// An image file could not be read
    #[error("failed to read image file {}: {source}", path.display())]
    ImageFile {
        /// Path that was passed in the request
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The service returned a non-2xx response
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The caller's cancellation token fired before the request was sent
    #[error("request cancelled")]
    Cancelled,
}

impl Error {
    /// True if this is an API error with HTTP status 429 (Too Many Requests).
    ///
    /// The service enforces a 1 QPS policy per token; a 429 means the client
    /// should slow down, not that the request was malformed.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::Api(e) if e.status == 429)
    }

    /// True if this is an API error with HTTP status 401 or 403.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Api(e) if e.status == 401 || e.status == 403)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Request(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// A normalized non-2xx response.
///
/// The service answers errors in two shapes: a JSON object (usually with
/// `message` or `error` and sometimes a numeric `code`) or plain text, which
/// may be Chinese (e.g. the rate-limit message). Both shapes normalize into
/// this one struct; the original bytes are kept in [`raw_body`] either way.
///
/// [`raw_body`]: ApiError::raw_body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code of the response
    pub status: u16,
    /// Server error code, normalized to a string when present (e.g. `"429"`)
    pub code: Option<String>,
    /// Human-readable message from the server, or the trimmed body text
    pub message: String,
    /// Exact response bytes, for troubleshooting
    pub raw_body: Vec<u8>,
}

impl ApiError {
    /// Normalize a non-2xx response body into an [`ApiError`].
    ///
    /// If the trimmed body looks like a JSON object it is parsed
    /// best-effort; otherwise the trimmed text is used verbatim as the
    /// message. Never fails: an unparseable body still yields an error
    /// value carrying the status and raw bytes.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let trimmed = String::from_utf8_lossy(body).trim().to_string();
        let mut err = ApiError {
            status,
            code: None,
            message: trimmed.clone(),
            raw_body: body.to_vec(),
        };

        if looks_like_json_object(&trimmed) {
            if let Ok(obj) =
                serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&trimmed)
            {
                err.message = extract_message(&obj).unwrap_or(trimmed);
                err.code = obj.get("code").and_then(format_code);
            }
        }
        err
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error (status={}", self.status)?;
        if let Some(code) = &self.code {
            write!(f, ", code={code}")?;
        }
        write!(f, ")")?;
        let msg = self.message.trim();
        if !msg.is_empty() {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

fn looks_like_json_object(s: &str) -> bool {
    s.starts_with('{') && s.ends_with('}')
}

/// Message precedence: non-empty `message`, then non-empty `error`.
fn extract_message(obj: &serde_json::Map<String, serde_json::Value>) -> Option<String> {
    for key in ["message", "error"] {
        if let Some(serde_json::Value::String(s)) = obj.get(key) {
            if !s.is_empty() {
                return Some(s.clone());
            }
        }
    }
    None
}

/// The `code` field may arrive as a string or a number.
fn format_code(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => n.as_i64().map(|i| i.to_string()),
        _ => None,
    }
}
