use crate::foundation::core::Rgb8;
use crate::foundation::error::{AvatarError, AvatarResult};

/// RGBA8 brush color carried through Parley layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct GlyphBrush {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Rgb8> for GlyphBrush {
    fn from(c: Rgb8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: 255,
        }
    }
}

/// One glyph, positioned relative to the top-left of the shaped line box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PlacedGlyph {
    pub(crate) id: u32,
    pub(crate) x: f32,
    pub(crate) y: f32,
}

/// Shaped single-line text ready for rasterization.
#[derive(Clone, Debug)]
pub(crate) struct ShapedLine {
    pub(crate) glyphs: Vec<PlacedGlyph>,
    pub(crate) font_size: f32,
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl ShapedLine {
    /// `true` when every glyph has an outline in the font (glyph id 0 is `.notdef`).
    pub(crate) fn fully_covered(&self) -> bool {
        !self.glyphs.is_empty() && self.glyphs.iter().all(|g| g.id != 0)
    }
}

/// Per-call Parley contexts bound to one typeface.
///
/// Contexts are cheap to build and never shared across calls, so concurrent renders do not
/// contend on anything but the immutable font blob.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<GlyphBrush>,
    family_name: String,
}

impl TextLayoutEngine {
    /// Register `font` into fresh contexts.
    pub(crate) fn new(font: &parley::fontique::Blob<u8>) -> AvatarResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx.collection.register_fonts(font.clone(), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| AvatarError::config("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| AvatarError::config("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
        })
    }

    pub(crate) fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Shape `text` on one unbroken line.
    pub(crate) fn shape_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: GlyphBrush,
    ) -> AvatarResult<ShapedLine> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(AvatarError::render("font size must be finite and > 0"));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<GlyphBrush> = builder.build(text);
        layout.break_all_lines(None);

        let mut glyphs = Vec::new();
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let mut x = run.offset();
                let baseline = run.baseline();
                for g in run.glyphs() {
                    glyphs.push(PlacedGlyph {
                        id: g.id,
                        x: x + g.x,
                        y: baseline - g.y,
                    });
                    x += g.advance;
                }
            }
        }

        Ok(ShapedLine {
            glyphs,
            font_size: size_px,
            width: layout.width(),
            height: layout.height(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
