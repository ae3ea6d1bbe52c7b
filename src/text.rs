//! Text request payload for the `/api/open/text` endpoint.

use serde::Serialize;

use crate::error::Error;

/// Payload for a text update.
///
/// Only the device id is required, and even that may come from the client's
/// default device. The Quote/0 screen has a fixed 296x152 layout:
///
/// - Title: first line
/// - Message: next three lines
/// - Icon: 40x40px at the bottom-left corner
/// - Signature: fixed at the bottom-right corner
///
/// Omitted fields leave their area blank; the layout does not reflow. An
/// entirely empty request is valid and simply refreshes the display with
/// blank content.
///
/// # Example
///
/// ```
/// use quote0::TextRequest;
///
/// let req = TextRequest::new()
///     .with_title("Quote of the day")
///     .with_message("Less, but better.")
///     .with_signature("Dieter Rams")
///     .with_refresh_now(true);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRequest {
    /// Trigger an immediate refresh on the targeted display
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_now: Option<bool>,

    /// Quote/0 serial number (hexadecimal string). Leave empty to use the
    /// client's default device.
    pub device_id: String,

    /// First line of the display
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Body text, up to three lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Bottom-right corner text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Base64-encoded 40x40px PNG shown at the bottom-left corner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// URL the Quote/0 companion app opens when interacting with the device
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl TextRequest {
    /// Create an empty text request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Target a specific device instead of the client default.
    #[must_use]
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }

    /// Set the refresh-now flag.
    #[must_use]
    pub fn with_refresh_now(mut self, refresh: bool) -> Self {
        self.refresh_now = Some(refresh);
        self
    }

    /// Set the title line.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the message body.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the signature text.
    #[must_use]
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Set the base64-encoded icon.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the companion-app link.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.device_id.trim().is_empty() {
            return Err(Error::MissingDeviceId);
        }
        Ok(())
    }
}
