//! Letter-avatar renderer: initials, palette color, glyph raster and PNG encoding.
//!
//! [`LetterAvatarRenderer::render`] is a pure function of `(display_name, size)`. Everything it
//! reads (typeface, palette, foreground) is fixed at construction, and every call builds its
//! own layout and raster contexts.

pub(crate) mod cpu;
pub(crate) mod encode;
pub(crate) mod font;
pub(crate) mod glyph;
pub(crate) mod palette;
pub(crate) mod text;

use std::path::Path;

use crate::config::AvatarConfig;
use crate::foundation::core::{AvatarImage, AvatarSize, Rgb8, SizeBounds};
use crate::foundation::error::{AvatarError, AvatarResult};
use crate::render::cpu::RgbCanvas;
use crate::render::font::Typeface;
use crate::render::glyph::DEFAULT_GLYPH;
use crate::render::palette::Palette;
use crate::render::text::{GlyphBrush, ShapedLine, TextLayoutEngine};

/// Initials color.
pub const FOREGROUND: Rgb8 = Rgb8::new(0xFF, 0xFF, 0xFF);

/// Target cap height of the initials as a fraction of the avatar edge.
pub const CAP_HEIGHT_FRACTION: f32 = 0.55;

/// Largest share of the edge the initials' ink may span in either direction.
pub const MAX_INK_FRACTION: f32 = 0.9;

/// Font size used when measuring ink extents.
const MEASURE_PX: f32 = 100.0;

/// Reference glyph for the typeface's cap height.
const CAP_REFERENCE: &str = "H";

/// What a name renders as, before any pixels exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LetterPlan {
    /// Initials to draw (before any coverage fallback).
    pub glyph: String,
    /// Selected palette index.
    pub palette_index: usize,
    /// Selected palette entry name.
    pub color_name: &'static str,
    /// Background fill.
    pub background: Rgb8,
}

/// Deterministic letter-avatar generator.
pub struct LetterAvatarRenderer {
    face: Typeface,
    cap_height_em: f32,
    sizes: SizeBounds,
    palette: Palette,
    placeholder: AvatarImage,
}

impl LetterAvatarRenderer {
    /// Renderer using the embedded typeface.
    ///
    /// Fails only on startup misconfiguration; see [`LetterAvatarRenderer::from_font_bytes`].
    pub fn embedded(sizes: SizeBounds) -> AvatarResult<Self> {
        Self::with_typeface(Typeface::embedded()?, sizes)
    }

    /// Renderer using a font file on disk.
    pub fn from_font_path(path: impl AsRef<Path>, sizes: SizeBounds) -> AvatarResult<Self> {
        Self::with_typeface(Typeface::from_path(path.as_ref())?, sizes)
    }

    /// Renderer using caller-supplied font bytes.
    ///
    /// The font is parsed, its cap height measured, and the default glyph rendered at the
    /// smallest and largest supported sizes before this returns, so an unusable font is reported
    /// here rather than on a request.
    pub fn from_font_bytes(bytes: Vec<u8>, sizes: SizeBounds) -> AvatarResult<Self> {
        Self::with_typeface(Typeface::from_bytes(bytes)?, sizes)
    }

    fn with_typeface(face: Typeface, sizes: SizeBounds) -> AvatarResult<Self> {
        sizes.validate()?;
        let palette = Palette::DEFAULT;

        let default_line = shape_with(&face, DEFAULT_GLYPH, MEASURE_PX)?;
        if !default_line.fully_covered() {
            return Err(AvatarError::config(format!(
                "font '{}' cannot draw the default glyph '{DEFAULT_GLYPH}'",
                face.family_name
            )));
        }
        let cap_height_em = measure_cap_height(&face)?;

        let stage = RenderStage {
            face: &face,
            cap_height_em,
            palette,
        };
        stage.rasterize("", sizes.clamp(i64::from(sizes.min)))?;
        stage.rasterize("", sizes.clamp(i64::from(sizes.max)))?;
        let placeholder = encode::encode_png(&stage.rasterize("", sizes.default_size())?)?;

        tracing::debug!(
            font = %face.family_name,
            cap_height_em,
            palette = palette.entries().len(),
            "letter avatar renderer ready"
        );
        Ok(Self {
            face,
            cap_height_em,
            sizes,
            palette,
            placeholder,
        })
    }

    /// Glyph and color `display_name` maps to.
    pub fn plan(&self, display_name: &str) -> LetterPlan {
        let entry_index = self.palette.index_for(display_name);
        let entry = self.palette.entries()[entry_index];
        LetterPlan {
            glyph: glyph::initials(display_name),
            palette_index: entry_index,
            color_name: entry.name,
            background: entry.color,
        }
    }

    /// Renderer configured by `cfg`: its font override if set, the embedded font otherwise.
    pub fn from_config(cfg: &AvatarConfig) -> AvatarResult<Self> {
        match &cfg.font_path {
            Some(path) => Self::from_font_path(path, cfg.sizes),
            None => Self::embedded(cfg.sizes),
        }
    }

    /// Supported size range; every render is clamped into it.
    pub fn sizes(&self) -> SizeBounds {
        self.sizes
    }

    /// Clamp `size` into [`LetterAvatarRenderer::sizes`].
    pub fn clamp_size(&self, size: AvatarSize) -> AvatarSize {
        self.sizes.clamp(i64::from(size.px()))
    }

    /// Render `display_name` as a square PNG. Never fails.
    ///
    /// `size` is clamped into the renderer's range first. An internal failure (a defect, since
    /// every clamped size and every string is renderable) is logged and answered with
    /// [`LetterAvatarRenderer::placeholder`].
    pub fn render(&self, display_name: &str, size: AvatarSize) -> AvatarImage {
        match self.try_render(display_name, size) {
            Ok(image) => image,
            Err(e) => {
                tracing::error!(error = %e, %size, "letter avatar render failed; serving placeholder");
                self.placeholder.clone()
            }
        }
    }

    /// Fallible form of [`LetterAvatarRenderer::render`].
    ///
    /// Byte-identical output for identical inputs.
    pub fn try_render(&self, display_name: &str, size: AvatarSize) -> AvatarResult<AvatarImage> {
        let canvas = self.rasterize(display_name, size)?;
        encode::encode_png(&canvas)
    }

    /// Raster stage of [`LetterAvatarRenderer::try_render`], before encoding.
    pub fn rasterize(&self, display_name: &str, size: AvatarSize) -> AvatarResult<RgbCanvas> {
        let stage = RenderStage {
            face: &self.face,
            cap_height_em: self.cap_height_em,
            palette: self.palette,
        };
        stage.rasterize(display_name, self.clamp_size(size))
    }

    /// Default glyph at the default size, rendered at construction.
    pub fn placeholder(&self) -> &AvatarImage {
        &self.placeholder
    }

    /// Family name of the typeface in use.
    pub fn font_family(&self) -> &str {
        &self.face.family_name
    }
}

struct RenderStage<'a> {
    face: &'a Typeface,
    cap_height_em: f32,
    palette: Palette,
}

impl RenderStage<'_> {
    /// Draw at exactly `size`; callers clamp.
    fn rasterize(&self, display_name: &str, size: AvatarSize) -> AvatarResult<RgbCanvas> {
        let mut glyph = glyph::initials(display_name);
        let background = self.palette.entry_for(display_name).color;

        let mut measured = shape_with(self.face, &glyph, MEASURE_PX)?;
        if !measured.fully_covered() {
            tracing::debug!(%glyph, "typeface lacks initials; drawing default glyph");
            glyph = DEFAULT_GLYPH.to_string();
            measured = shape_with(self.face, &glyph, MEASURE_PX)?;
        }
        let ink = cpu::ink_bounds(self.face, &measured)?;

        let edge = size.px() as f32;
        let mut font_px = edge * CAP_HEIGHT_FRACTION / self.cap_height_em;
        if let Some(b) = ink {
            let widest = b.width().max(b.height()) as f32 / MEASURE_PX;
            font_px = font_px.min(edge * MAX_INK_FRACTION / widest);
        }

        let line = shape_with(self.face, &glyph, font_px)?;
        let ink = ink.map(|b| b.scaled(f64::from(font_px / MEASURE_PX)));
        cpu::compose_square(size.px(), background, FOREGROUND, self.face, &line, ink)
    }
}

fn shape_with(face: &Typeface, text: &str, font_px: f32) -> AvatarResult<ShapedLine> {
    TextLayoutEngine::new(&face.layout_blob)?.shape_line(text, font_px, GlyphBrush::from(FOREGROUND))
}

/// Cap height of `face` in em, from the ink of [`CAP_REFERENCE`] (or the default glyph when the
/// face has no `H`).
fn measure_cap_height(face: &Typeface) -> AvatarResult<f32> {
    let mut line = shape_with(face, CAP_REFERENCE, MEASURE_PX)?;
    if !line.fully_covered() {
        line = shape_with(face, DEFAULT_GLYPH, MEASURE_PX)?;
    }
    let ink = cpu::ink_bounds(face, &line)?.ok_or_else(|| {
        AvatarError::config(format!("font '{}' draws no visible ink", face.family_name))
    })?;
    Ok(ink.height() as f32 / MEASURE_PX)
}

impl std::fmt::Debug for LetterAvatarRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LetterAvatarRenderer")
            .field("font", &self.face.family_name)
            .field("sizes", &self.sizes)
            .field("palette_len", &self.palette.entries().len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
