use std::fmt;
use std::sync::Arc;

use crate::foundation::error::{AvatarError, AvatarResult};

/// Opaque sRGB color, 8 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Build a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a packed `0xRRGGBB` value.
    pub const fn from_u32(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
        }
    }

    /// Channels as `[r, g, b]`.
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Inclusive pixel range supported for avatar edges, plus the size used when none is requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizeBounds {
    /// Smallest supported edge in pixels.
    pub min: u32,
    /// Largest supported edge in pixels.
    pub max: u32,
    /// Edge used when the request carries no usable size.
    pub default: u32,
}

impl SizeBounds {
    /// Hard ceiling for `max`; keeps canvases inside the rasterizer's `u16` surface limits.
    pub const CEILING: u32 = 2048;

    /// Check `0 < min <= default <= max <= CEILING`.
    pub fn validate(&self) -> AvatarResult<()> {
        if self.min == 0 {
            return Err(AvatarError::config("sizes.min must be > 0"));
        }
        if self.min > self.max {
            return Err(AvatarError::config("sizes.min must be <= sizes.max"));
        }
        if self.max > Self::CEILING {
            return Err(AvatarError::config(format!(
                "sizes.max must be <= {}",
                Self::CEILING
            )));
        }
        if !(self.min..=self.max).contains(&self.default) {
            return Err(AvatarError::config(
                "sizes.default must lie within [sizes.min, sizes.max]",
            ));
        }
        Ok(())
    }

    /// Clamp any requested edge (including zero or negative values) into range.
    pub fn clamp(&self, requested: i64) -> AvatarSize {
        let min = i64::from(self.min);
        let max = i64::from(self.max.max(self.min));
        // Both bounds fit in u32, so the clamped value does too.
        AvatarSize(requested.clamp(min, max) as u32)
    }

    /// The default size, clamped.
    pub fn default_size(&self) -> AvatarSize {
        self.clamp(i64::from(self.default))
    }
}

impl Default for SizeBounds {
    fn default() -> Self {
        Self {
            min: 50,
            max: 200,
            default: 50,
        }
    }
}

/// Edge length of a square avatar in pixels, already clamped to [`SizeBounds`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AvatarSize(u32);

impl AvatarSize {
    /// Edge length in pixels.
    pub fn px(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AvatarSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.0)
    }
}

/// Media type of an [`AvatarImage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MimeType {
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    Png,
}

impl MimeType {
    /// The `Content-Type` value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Parse a `Content-Type` header value, ignoring parameters and case.
    pub fn from_content_type(value: &str) -> Option<Self> {
        let essence = value.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case("image/jpeg") || essence.eq_ignore_ascii_case("image/jpg")
        {
            Some(Self::Jpeg)
        } else if essence.eq_ignore_ascii_case("image/png") {
            Some(Self::Png)
        } else {
            None
        }
    }

    /// Map a sniffed container format onto the supported set.
    pub fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Png => Some(Self::Png),
            _ => None,
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final avatar bytes plus their media type. A value produced fresh per request.
#[derive(Clone, PartialEq, Eq)]
pub struct AvatarImage {
    bytes: Arc<[u8]>,
    mime_type: MimeType,
}

impl AvatarImage {
    /// Wrap encoded image bytes.
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime_type: MimeType) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type,
        }
    }

    /// Encoded image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Media type of [`AvatarImage::bytes`].
    pub fn mime_type(&self) -> MimeType {
        self.mime_type
    }
}

impl fmt::Debug for AvatarImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvatarImage")
            .field("bytes_len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
