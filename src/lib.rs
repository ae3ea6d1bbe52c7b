//! # quote0
//!
//! Client SDK for [Quote/0](https://dot.mindreset.tech) Wi-Fi e-ink displays.
//!
//! Quote/0 is an e-paper display with a 296x152 pixel screen that receives
//! content updates over a REST API. The device keeps displayed content
//! without power (bistable e-ink) and supports a fixed text layout as well
//! as arbitrary image rendering.
//!
//! This crate provides:
//! - Bearer token authentication
//! - An optional default device id with per-request override
//! - 1 QPS rate limiting (pluggable, cancellation aware)
//! - Normalized handling of JSON and plain-text (including Chinese)
//!   responses
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quote0::{Client, TextRequest};
//!
//! # async fn example() -> Result<(), quote0::Error> {
//! let client = Client::new("dot_app_xxx")?.with_default_device("ABC123");
//!
//! client
//!     .send_text(
//!         TextRequest::new()
//!             .with_title("Quote of the day")
//!             .with_message("Less, but better.")
//!             .with_refresh_now(true),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Display Layout
//!
//! The text endpoint fills a fixed 296x152 layout: title on the first line,
//! message on the next three, a 40x40px icon at the bottom-left and a
//! signature at the bottom-right. Omitted fields leave their region blank;
//! nothing reflows. The image endpoint takes a full-screen 296x152 PNG,
//! dithered server-side (see [`DitherType`] and [`DitherKernel`]).
//!
//! ## Rate Limits
//!
//! The service allows one request per second per token. [`Client`] enforces
//! that by default with a [`FixedIntervalLimiter`]; callers sharing a token
//! across processes must coordinate on their own.
//!
//! ## Feature Flags
//!
//! - `cli` - the `quote0` command-line tool
//!
//! Official API documentation:
//! - <https://dot.mindreset.tech/docs/service/studio/api/text_api>
//! - <https://dot.mindreset.tech/docs/service/studio/api/image_api>

use std::time::Duration;

mod client;
mod error;
mod image;
mod ratelimit;
mod text;

pub use client::{ApiResponse, Client};
pub use error::{ApiError, Error};
pub use image::{BorderColor, DitherKernel, DitherType, ImageRequest};
pub use ratelimit::{FixedIntervalLimiter, RateLimiter};
pub use text::TextRequest;

// Re-exported so callers can build cancellable dispatches without adding
// tokio-util themselves.
pub use tokio_util::sync::CancellationToken;

/// Default API host. Endpoints are under `/api/open/*`.
pub const DEFAULT_BASE_URL: &str = "https://dot.mindreset.tech";

/// Quote/0 display width in pixels
pub const DISPLAY_WIDTH: u32 = 296;

/// Quote/0 display height in pixels
pub const DISPLAY_HEIGHT: u32 = 152;

/// Icon size in pixels (icons are square)
pub const ICON_SIZE: u32 = 40;

/// Maximum response body size read from the server (4 MiB guard)
pub const MAX_RESPONSE_BODY: usize = 4 << 20;

/// Default HTTP request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default minimum interval between requests (the documented 1 QPS policy)
pub const DEFAULT_RATE_INTERVAL: Duration = Duration::from_secs(1);

pub(crate) const TEXT_ENDPOINT: &str = "/api/open/text";
pub(crate) const IMAGE_ENDPOINT: &str = "/api/open/image";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(DISPLAY_WIDTH, 296);
        assert_eq!(DISPLAY_HEIGHT, 152);
        assert_eq!(ICON_SIZE, 40);
        assert_eq!(MAX_RESPONSE_BODY, 4 * 1024 * 1024);
        assert!(DEFAULT_BASE_URL.starts_with("https://"));
    }
}
