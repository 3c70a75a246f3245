use kurbo::{Affine, Vec2};

use crate::foundation::core::Rgb8;
use crate::foundation::error::{AvatarError, AvatarResult};
use crate::render::font::Typeface;
use crate::render::text::ShapedLine;

/// Opaque RGB8 raster, tightly packed, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbCanvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 3` bytes.
    pub data: Vec<u8>,
}

impl RgbCanvas {
    /// Color at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 3;
        Some(Rgb8::new(self.data[i], self.data[i + 1], self.data[i + 2]))
    }
}

/// Pixel-aligned bounds of the drawn ink, in the shaped line's coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct InkBox {
    pub(crate) x0: f64,
    pub(crate) y0: f64,
    pub(crate) x1: f64,
    pub(crate) y1: f64,
}

impl InkBox {
    pub(crate) fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub(crate) fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Same box for the line shaped at `factor` times the measured font size.
    pub(crate) fn scaled(&self, factor: f64) -> Self {
        Self {
            x0: self.x0 * factor,
            y0: self.y0 * factor,
            x1: self.x1 * factor,
            y1: self.y1 * factor,
        }
    }
}

/// Rasterize `line` alone and report where its ink lands; `None` for blank glyphs.
///
/// Meant for lines shaped at a modest measuring size; the scratch surface is the line box plus a
/// half-em margin on every side.
pub(crate) fn ink_bounds(face: &Typeface, line: &ShapedLine) -> AvatarResult<Option<InkBox>> {
    let pad = (line.font_size / 2.0).ceil().max(1.0);
    let w = surface_edge(line.width + 2.0 * pad)?;
    let h = surface_edge(line.height + 2.0 * pad)?;

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    draw_line(
        &mut ctx,
        face,
        line,
        Vec2::new(f64::from(pad), f64::from(pad)),
        Rgb8::new(0xFF, 0xFF, 0xFF),
    );
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);

    let w = usize::from(w);
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (usize::MAX, usize::MAX, 0, 0);
    for (i, px) in pixmap.data_as_u8_slice().chunks_exact(4).enumerate() {
        if px[3] == 0 {
            continue;
        }
        let (x, y) = (i % w, i / w);
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    if min_x == usize::MAX {
        return Ok(None);
    }

    let pad = f64::from(pad);
    Ok(Some(InkBox {
        x0: min_x as f64 - pad,
        y0: min_y as f64 - pad,
        x1: (max_x + 1) as f64 - pad,
        y1: (max_y + 1) as f64 - pad,
    }))
}

/// Fill a `size x size` square with `background` and draw `line` in `foreground`.
///
/// With `ink`, the ink box is centered; without it, the line box is.
pub(crate) fn compose_square(
    size: u32,
    background: Rgb8,
    foreground: Rgb8,
    face: &Typeface,
    line: &ShapedLine,
    ink: Option<InkBox>,
) -> AvatarResult<RgbCanvas> {
    let edge: u16 = size
        .try_into()
        .map_err(|_| AvatarError::render("canvas edge exceeds u16"))?;
    let edge_f = f64::from(size);

    let mut ctx = vello_cpu::RenderContext::new(edge, edge);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        background.r,
        background.g,
        background.b,
        255,
    ));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, edge_f, edge_f));

    let offset = match ink {
        Some(b) => Vec2::new(
            (edge_f - b.width()) / 2.0 - b.x0,
            (edge_f - b.height()) / 2.0 - b.y0,
        ),
        None => Vec2::new(
            (edge_f - f64::from(line.width)) / 2.0,
            (edge_f - f64::from(line.height)) / 2.0,
        ),
    };
    draw_line(&mut ctx, face, line, offset, foreground);

    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(edge, edge);
    ctx.render_to_pixmap(&mut pixmap);

    Ok(RgbCanvas {
        width: size,
        height: size,
        data: premul_opaque_to_rgb(pixmap.data_as_u8_slice()),
    })
}

fn draw_line(
    ctx: &mut vello_cpu::RenderContext,
    face: &Typeface,
    line: &ShapedLine,
    offset: Vec2,
    color: Rgb8,
) {
    ctx.set_transform(affine_to_cpu(Affine::translate(offset)));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, 255,
    ));
    let glyphs = line.glyphs.iter().map(|g| vello_cpu::Glyph {
        id: g.id,
        x: g.x,
        y: g.y,
    });
    ctx.glyph_run(&face.raster_font)
        .font_size(line.font_size)
        .fill_glyphs(glyphs);
}

fn surface_edge(extent: f32) -> AvatarResult<u16> {
    let edge = extent.ceil();
    if !(1.0..=f32::from(u16::MAX)).contains(&edge) {
        return Err(AvatarError::render(format!(
            "measuring surface of {edge}px is out of range"
        )));
    }
    Ok(edge as u16)
}

// The background is opaque, so premultiplied and straight channels coincide; alpha is dropped.
fn premul_opaque_to_rgb(rgba: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        out.extend_from_slice(&px[..3]);
    }
    out
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
