//! Image request payload for the `/api/open/image` endpoint.

use std::path::PathBuf;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Serialize, Serializer};

use crate::error::Error;

/// Screen edge color on the Quote/0 display.
///
/// Serializes as an integer on the wire (0 = white, 1 = black).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BorderColor {
    /// White border around the display (server default)
    #[default]
    White = 0,
    /// Black border around the display
    Black = 1,
}

impl Serialize for BorderColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl FromStr for BorderColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "white" => Ok(BorderColor::White),
            "1" | "black" => Ok(BorderColor::Black),
            other => Err(format!("unknown border color: {other:?}")),
        }
    }
}

/// Server-side dithering strategy.
///
/// When omitted, the server defaults to error diffusion with the
/// Floyd-Steinberg kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DitherType {
    /// No dithering; pixels are binarized by a simple threshold. Crisp
    /// edges for line art, but gradients posterize.
    None,
    /// Error diffusion using a selectable kernel. Good general-purpose
    /// choice for photos and text.
    Diffusion,
    /// Ordered (threshold-matrix) halftoning. Stable pattern, preserves
    /// text edges, can show grid artifacts in smooth gradients.
    Ordered,
}

/// Diffusion kernel selector.
///
/// Only meaningful when [`DitherType::Diffusion`] is selected
/// ([`DitherKernel::Threshold`] pairs with [`DitherType::Ordered`]); the
/// server ignores the kernel otherwise. The client forwards it
/// unconditionally — the server owns that interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DitherKernel {
    /// Ordered threshold matrix; no diffusion; strong halftone look
    #[serde(rename = "THRESHOLD")]
    Threshold,
    /// Compact diffusion footprint; good for text; lighter tones
    #[serde(rename = "ATKINSON")]
    Atkinson,
    /// Row-weighted diffusion; sharp, detailed output
    #[serde(rename = "BURKES")]
    Burkes,
    /// The classic diffusion kernel; balanced detail and grain
    #[serde(rename = "FLOYD_STEINBERG")]
    FloydSteinberg,
    /// Sierra-2 diffusion; smooth gradients, moderate grain
    #[serde(rename = "SIERRA2")]
    Sierra2,
    /// Large kernel; crisp edges, can be grainier
    #[serde(rename = "STUCKI")]
    Stucki,
    /// Very smooth gradients; may soften fine detail
    #[serde(rename = "JARVIS_JUDICE_NINKE")]
    JarvisJudiceNinke,
    /// Directional diffusion along rows
    #[serde(rename = "DIFFUSION_ROW")]
    DiffusionRow,
    /// Directional diffusion along columns
    #[serde(rename = "DIFFUSION_COLUMN")]
    DiffusionColumn,
    /// Isotropic spread across a 2D neighborhood
    #[serde(rename = "DIFFUSION_2D")]
    Diffusion2D,
}

impl FromStr for DitherType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(DitherType::None),
            "DIFFUSION" => Ok(DitherType::Diffusion),
            "ORDERED" => Ok(DitherType::Ordered),
            other => Err(format!("unknown dither type: {other:?}")),
        }
    }
}

impl FromStr for DitherKernel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "THRESHOLD" => Ok(DitherKernel::Threshold),
            "ATKINSON" => Ok(DitherKernel::Atkinson),
            "BURKES" => Ok(DitherKernel::Burkes),
            "FLOYD_STEINBERG" => Ok(DitherKernel::FloydSteinberg),
            "SIERRA2" => Ok(DitherKernel::Sierra2),
            "STUCKI" => Ok(DitherKernel::Stucki),
            "JARVIS_JUDICE_NINKE" => Ok(DitherKernel::JarvisJudiceNinke),
            "DIFFUSION_ROW" => Ok(DitherKernel::DiffusionRow),
            "DIFFUSION_COLUMN" => Ok(DitherKernel::DiffusionColumn),
            "DIFFUSION_2D" => Ok(DitherKernel::Diffusion2D),
            other => Err(format!("unknown dither kernel: {other:?}")),
        }
    }
}

/// Payload for an image update.
///
/// The image can come from exactly one of three sources, resolved in strict
/// order before dispatch:
///
/// 1. [`image`] — an already base64-encoded 296x152px PNG, wins outright
/// 2. [`image_bytes`] — raw PNG bytes, encoded by the SDK
/// 3. [`image_path`] — a file path, read and encoded by the SDK
///
/// After resolution a non-empty encoded payload must exist or dispatch
/// fails with [`Error::MissingImagePayload`].
///
/// [`image`]: ImageRequest::image
/// [`image_bytes`]: ImageRequest::image_bytes
/// [`image_path`]: ImageRequest::image_path
///
/// # Example
///
/// ```
/// use quote0::{BorderColor, DitherKernel, DitherType, ImageRequest};
///
/// let req = ImageRequest::new()
///     .with_image_path("screen.png")
///     .with_border(BorderColor::Black)
///     .with_dither_type(DitherType::Diffusion)
///     .with_dither_kernel(DitherKernel::Atkinson)
///     .with_refresh_now(true);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    /// Trigger an immediate refresh on the targeted display
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_now: Option<bool>,

    /// Quote/0 serial number (hexadecimal string). Leave empty to use the
    /// client's default device.
    pub device_id: String,

    /// Base64-encoded 296x152px PNG. Normally left unset in favor of
    /// [`image_bytes`](ImageRequest::image_bytes) or
    /// [`image_path`](ImageRequest::image_path).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Raw 296x152px PNG bytes; base64-encoded by the SDK before dispatch
    #[serde(skip)]
    pub image_bytes: Option<Vec<u8>>,

    /// Path to a 296x152px PNG; read and base64-encoded by the SDK
    #[serde(skip)]
    pub image_path: Option<PathBuf>,

    /// URL opened inside the Quote/0 companion app
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Screen edge color; server defaults to white when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<BorderColor>,

    /// Server-side dithering strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dither_type: Option<DitherType>,

    /// Diffusion kernel; forwarded unconditionally, server applies it only
    /// where meaningful
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dither_kernel: Option<DitherKernel>,
}

impl ImageRequest {
    /// Create an empty image request.
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

    /// Set an already base64-encoded image payload.
    #[must_use]
    pub fn with_image(mut self, base64_png: impl Into<String>) -> Self {
        self.image = Some(base64_png.into());
        self
    }

    /// Provide raw PNG bytes; the SDK base64-encodes them at dispatch.
    #[must_use]
    pub fn with_image_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.image_bytes = Some(bytes.into());
        self
    }

    /// Provide a PNG file path; the SDK reads and encodes it at dispatch.
    #[must_use]
    pub fn with_image_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// Set the companion-app link.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Set the screen edge color.
    #[must_use]
    pub fn with_border(mut self, border: BorderColor) -> Self {
        self.border = Some(border);
        self
    }

    /// Set the dithering strategy.
    #[must_use]
    pub fn with_dither_type(mut self, dither_type: DitherType) -> Self {
        self.dither_type = Some(dither_type);
        self
    }

    /// Set the diffusion kernel.
    #[must_use]
    pub fn with_dither_kernel(mut self, kernel: DitherKernel) -> Self {
        self.dither_kernel = Some(kernel);
        self
    }

    /// Resolve the image sources into the encoded `image` field.
    ///
    /// Precedence: pre-encoded `image`, then `image_bytes`, then
    /// `image_path`. A file read failure aborts the dispatch.
    pub(crate) async fn resolve_image_source(&mut self) -> Result<(), Error> {
        if matches!(&self.image, Some(s) if !s.trim().is_empty()) {
            return Ok(());
        }
        if let Some(bytes) = self.image_bytes.as_deref().filter(|b| !b.is_empty()) {
            self.image = Some(BASE64.encode(bytes));
            return Ok(());
        }
        if let Some(path) = self.image_path.as_deref().filter(|p| !p.as_os_str().is_empty()) {
            let bytes = tokio::fs::read(path).await.map_err(|source| Error::ImageFile {
                path: path.to_path_buf(),
                source,
            })?;
            self.image = Some(BASE64.encode(bytes));
        }
        Ok(())
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.device_id.trim().is_empty() {
            return Err(Error::MissingDeviceId);
        }
        match &self.image {
            Some(image) if !image.trim().is_empty() => Ok(()),
            _ => Err(Error::MissingImagePayload),
        }
    }
}
