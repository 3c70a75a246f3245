use image::ImageEncoder as _;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};

use crate::foundation::core::{AvatarImage, MimeType};
use crate::foundation::error::{AvatarError, AvatarResult};
use crate::render::cpu::RgbCanvas;

/// Encode as 8-bit RGB PNG.
///
/// Compression and filtering are pinned and the encoder writes no ancillary chunks (no `tIME`,
/// no text), so equal canvases always produce equal bytes.
pub fn encode_png(canvas: &RgbCanvas) -> AvatarResult<AvatarImage> {
    let expected = (canvas.width as usize)
        .saturating_mul(canvas.height as usize)
        .saturating_mul(3);
    if canvas.data.len() != expected {
        return Err(AvatarError::encode("rgb byte len mismatch"));
    }

    let mut out = Vec::with_capacity(expected / 4);
    PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive)
        .write_image(
            &canvas.data,
            canvas.width,
            canvas.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| AvatarError::encode(format!("png: {e}")))?;

    Ok(AvatarImage::new(out, MimeType::Png))
}

#[cfg(test)]
#[path = "../../tests/unit/render/encode.rs"]
mod tests;
