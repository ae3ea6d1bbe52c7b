//! Quote/0 API client: authentication, rate limiting, dispatch.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{ApiError, Error};
use crate::image::ImageRequest;
use crate::ratelimit::{FixedIntervalLimiter, RateLimiter};
use crate::text::TextRequest;
use crate::{
    DEFAULT_BASE_URL, DEFAULT_RATE_INTERVAL, DEFAULT_TIMEOUT_SECS, IMAGE_ENDPOINT,
    MAX_RESPONSE_BODY, TEXT_ENDPOINT,
};

/// A normalized success response.
///
/// The service usually answers with a JSON envelope
/// (`{"code":0,"message":"ok","result":...}`) but may answer with plain
/// text; in that case [`message`](ApiResponse::message) carries the trimmed
/// body and [`code`](ApiResponse::code)/[`result`](ApiResponse::result) stay
/// at their defaults. The raw bytes are kept either way.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    /// Numeric status from the Quote/0 API (0 on success)
    #[serde(default)]
    pub code: i64,

    /// Message provided by the service (e.g. "ok" or reason text)
    #[serde(default)]
    pub message: String,

    /// Endpoint-specific payload; callers can deserialize it further
    #[serde(default)]
    pub result: serde_json::Value,

    /// HTTP status code observed for the request
    #[serde(skip)]
    pub status_code: u16,

    /// Exact response bytes, for troubleshooting or custom parsing
    #[serde(skip)]
    pub raw_body: Vec<u8>,
}

/// Client for the Quote/0 open API.
///
/// Holds the auth token, base URL, optional default device and the rate
/// limiter. Cloning is cheap and clones share the default device and
/// limiter, so one client can serve many concurrent tasks.
///
/// # Example
///
/// ```rust,no_run
/// use quote0::{Client, TextRequest};
///
/// # async fn example() -> Result<(), quote0::Error> {
/// let client = Client::new("dot_app_xxx")?.with_default_device("ABC123");
///
/// let resp = client
///     .send_text(TextRequest::new().with_message("hello").with_refresh_now(true))
///     .await?;
/// println!("code={} message={}", resp.code, resp.message);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    user_agent: String,
    limiter: Option<Arc<dyn RateLimiter>>,
    default_device: Arc<RwLock<String>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Token deliberately redacted.
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("default_device", &self.default_device())
            .field("rate_limited", &self.limiter.is_some())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client with the given API token (format: `dot_app_xxx`).
    ///
    /// Defaults: official base URL, 30s request timeout, 1 QPS rate
    /// limiter, versioned `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingApiToken`] if the token is empty after
    /// trimming.
    pub fn new(api_token: impl Into<String>) -> Result<Self, Error> {
        let api_token = api_token.into().trim().to_string();
        if api_token.is_empty() {
            return Err(Error::MissingApiToken);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token,
            user_agent: default_user_agent(),
            limiter: Some(Arc::new(FixedIntervalLimiter::new(DEFAULT_RATE_INTERVAL))),
            default_device: Arc::new(RwLock::new(String::new())),
        })
    }

    /// Override the API host (useful for staging or tests). Trailing
    /// slashes are stripped; a blank URL falls back to the default.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().to_string();
        self.base_url = if base_url.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            base_url.trim_end_matches('/').to_string()
        };
        self
    }

    /// Install a custom HTTP client (custom timeouts, proxies, etc).
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Replace the default 1 QPS limiter.
    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: impl RateLimiter + 'static) -> Self {
        self.limiter = Some(Arc::new(limiter));
        self
    }

    /// Disable rate limiting entirely. Not recommended against the real
    /// service.
    #[must_use]
    pub fn without_rate_limiter(mut self) -> Self {
        self.limiter = None;
        self
    }

    /// Set a custom `User-Agent`. A blank value omits the header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the default device serial used when a request omits `deviceId`.
    #[must_use]
    pub fn with_default_device(self, device_id: impl AsRef<str>) -> Self {
        self.set_default_device(device_id);
        self
    }

    /// Update the default device id. Safe to call while other tasks are
    /// dispatching; in-flight calls that already resolved their device id
    /// are unaffected.
    pub fn set_default_device(&self, device_id: impl AsRef<str>) {
        let mut guard = self.default_device.write().expect("device lock poisoned");
        *guard = device_id.as_ref().trim().to_string();
    }

    /// The current default device id (empty when unset).
    pub fn default_device(&self) -> String {
        self.default_device.read().expect("device lock poisoned").clone()
    }

    /// Send a text update. An empty `device_id` falls back to the client
    /// default.
    pub async fn send_text(&self, payload: TextRequest) -> Result<ApiResponse, Error> {
        self.send_text_cancellable(payload, &CancellationToken::new())
            .await
    }

    /// [`send_text`](Client::send_text) with a caller-supplied cancellation
    /// token, checked at the rate-limiter wait and while awaiting the reply.
    pub async fn send_text_cancellable(
        &self,
        mut payload: TextRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, Error> {
        payload.device_id = self.resolve_device_id(&payload.device_id)?;
        payload.validate()?;
        self.dispatch(TEXT_ENDPOINT, &payload, cancel).await
    }

    /// Send a text update to a specific device.
    pub async fn send_text_to_device(
        &self,
        device_id: impl Into<String>,
        payload: TextRequest,
    ) -> Result<ApiResponse, Error> {
        self.send_text(payload.with_device_id(device_id)).await
    }

    /// Send an image update. An empty `device_id` falls back to the client
    /// default; the image source is resolved per the precedence documented
    /// on [`ImageRequest`].
    pub async fn send_image(&self, payload: ImageRequest) -> Result<ApiResponse, Error> {
        self.send_image_cancellable(payload, &CancellationToken::new())
            .await
    }

    /// [`send_image`](Client::send_image) with a caller-supplied
    /// cancellation token.
    pub async fn send_image_cancellable(
        &self,
        mut payload: ImageRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, Error> {
        payload.device_id = self.resolve_device_id(&payload.device_id)?;
        payload.resolve_image_source().await?;
        payload.validate()?;
        self.dispatch(IMAGE_ENDPOINT, &payload, cancel).await
    }

    /// Send an image update to a specific device.
    pub async fn send_image_to_device(
        &self,
        device_id: impl Into<String>,
        payload: ImageRequest,
    ) -> Result<ApiResponse, Error> {
        self.send_image(payload.with_device_id(device_id)).await
    }

    /// Send raw PNG bytes, base64-encoding them internally. Any image
    /// source already present on `meta` is discarded.
    pub async fn send_image_bytes(
        &self,
        png: impl Into<Vec<u8>>,
        meta: ImageRequest,
    ) -> Result<ApiResponse, Error> {
        let mut meta = meta.with_image_bytes(png);
        meta.image = None;
        self.send_image(meta).await
    }

    /// Send a PNG file, reading and base64-encoding it internally. Any
    /// image source already present on `meta` is discarded.
    pub async fn send_image_file(
        &self,
        path: impl Into<std::path::PathBuf>,
        meta: ImageRequest,
    ) -> Result<ApiResponse, Error> {
        let mut meta = meta.with_image_path(path);
        meta.image = None;
        meta.image_bytes = None;
        self.send_image(meta).await
    }

    /// Explicit id wins when non-blank; otherwise the client default.
    fn resolve_device_id(&self, explicit: &str) -> Result<String, Error> {
        let explicit = explicit.trim();
        if !explicit.is_empty() {
            return Ok(explicit.to_string());
        }
        let id = self.default_device();
        if id.is_empty() {
            return Err(Error::MissingDeviceId);
        }
        Ok(id)
    }

    /// The dispatch pipeline both operations share: throttle, serialize,
    /// POST, normalize the response.
    async fn dispatch<T: Serialize>(
        &self,
        endpoint: &str,
        payload: &T,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, Error> {
        if let Some(limiter) = &self.limiter {
            limiter.wait(cancel).await?;
        }

        let body = serde_json::to_vec(payload)?;
        let url = format!("{}{}", self.base_url, endpoint);

        let mut request = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json")
            .body(body);
        let ua = self.user_agent.trim();
        if !ua.is_empty() {
            request = request.header("User-Agent", ua);
        }

        tracing::debug!(endpoint, "dispatching request");
        // Cancellation past this point abandons the reply; it cannot
        // un-send the request.
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = request.send() => result?,
        };

        let status = response.status().as_u16();
        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);
        let raw = read_body_capped(response).await?;
        tracing::debug!(endpoint, status, bytes = raw.len(), "response received");

        if !(200..300).contains(&status) {
            return Err(ApiError::from_response(status, &raw).into());
        }

        let mut out = ApiResponse {
            status_code: status,
            raw_body: raw.clone(),
            ..Default::default()
        };
        if raw.is_empty() {
            return Ok(out);
        }
        if is_json {
            if let Ok(decoded) = serde_json::from_slice::<ApiResponse>(&raw) {
                return Ok(ApiResponse {
                    status_code: status,
                    raw_body: raw,
                    ..decoded
                });
            }
        }
        // Plain-text success (some deployments answer "ok").
        out.message = String::from_utf8_lossy(&raw).trim().to_string();
        Ok(out)
    }
}

/// Drain the response body, truncating at [`MAX_RESPONSE_BODY`] to bound
/// memory against a misbehaving server.
async fn read_body_capped(mut response: reqwest::Response) -> Result<Vec<u8>, Error> {
    let mut raw = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let remaining = MAX_RESPONSE_BODY - raw.len();
        if chunk.len() >= remaining {
            raw.extend_from_slice(&chunk[..remaining]);
            break;
        }
        raw.extend_from_slice(&chunk);
    }
    Ok(raw)
}

fn default_user_agent() -> String {
    format!(
        "quote0-rs/{} (+https://github.com/quote0-rs/quote0-rs)",
        env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(Client::new(""), Err(Error::MissingApiToken)));
        assert!(matches!(Client::new("   "), Err(Error::MissingApiToken)));
        assert!(Client::new("dot_app_test").is_ok());
    }

    #[test]
    fn test_base_url_normalization() {
        let client = Client::new("t").unwrap().with_base_url("http://localhost:9999///");
        assert_eq!(client.base_url, "http://localhost:9999");

        let client = Client::new("t").unwrap().with_base_url("   ");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_default_device_is_trimmed_and_shared() {
        let client = Client::new("t").unwrap().with_default_device("  ABC  ");
        assert_eq!(client.default_device(), "ABC");

        // Clones share the same default device slot.
        let clone = client.clone();
        client.set_default_device("XYZ");
        assert_eq!(clone.default_device(), "XYZ");
    }

    #[test]
    fn test_resolve_device_id_precedence() {
        let client = Client::new("t").unwrap();
        assert!(matches!(
            client.resolve_device_id(""),
            Err(Error::MissingDeviceId)
        ));

        client.set_default_device("DEF");
        assert_eq!(client.resolve_device_id("").unwrap(), "DEF");
        assert_eq!(client.resolve_device_id(" OVR ").unwrap(), "OVR");
    }

    #[tokio::test]
    async fn test_validation_precedes_network() {
        // No server is listening; a validation failure must surface before
        // any connection attempt.
        let client = Client::new("t")
            .unwrap()
            .with_base_url("http://127.0.0.1:1")
            .without_rate_limiter();

        let err = client.send_text(TextRequest::new()).await.unwrap_err();
        assert!(matches!(err, Error::MissingDeviceId));

        let err = client
            .send_image(ImageRequest::new().with_device_id("DEV"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingImagePayload));
    }

    #[test]
    fn test_success_envelope_decoding() {
        let decoded: ApiResponse =
            serde_json::from_str(r#"{"code":0,"message":"ok","result":{"id":7}}"#).unwrap();
        assert_eq!(decoded.code, 0);
        assert_eq!(decoded.message, "ok");
        assert_eq!(decoded.result["id"], 7);

        // Missing fields take defaults.
        let decoded: ApiResponse = serde_json::from_str(r#"{"code":0}"#).unwrap();
        assert_eq!(decoded.message, "");
        assert!(decoded.result.is_null());
    }
}
