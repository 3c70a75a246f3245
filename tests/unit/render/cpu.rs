use super::*;
use crate::render::text::{GlyphBrush, TextLayoutEngine};

const BG: Rgb8 = Rgb8::from_u32(0x3949AB);
const FG: Rgb8 = Rgb8::from_u32(0xFFFFFF);

fn shaped(face: &Typeface, text: &str, px: f32) -> ShapedLine {
    TextLayoutEngine::new(&face.layout_blob)
        .unwrap()
        .shape_line(text, px, GlyphBrush::from(FG))
        .unwrap()
}

/// Inclusive `(min_x, max_x, min_y, max_y)` of pixels that differ from the background.
fn ink_extent(canvas: &RgbCanvas) -> Option<(u32, u32, u32, u32)> {
    let mut extent: Option<(u32, u32, u32, u32)> = None;
    for y in 0..canvas.height {
        for x in 0..canvas.width {
            if canvas.pixel(x, y) == Some(BG) {
                continue;
            }
            extent = Some(match extent {
                None => (x, x, y, y),
                Some((x0, x1, y0, y1)) => (x0.min(x), x1.max(x), y0.min(y), y1.max(y)),
            });
        }
    }
    extent
}

#[test]
fn background_fills_the_corners() {
    let face = Typeface::embedded().unwrap();
    let line = shaped(&face, "DV", 25.0);
    let canvas = compose_square(50, BG, FG, &face, &line, None).unwrap();

    assert_eq!(canvas.width, 50);
    assert_eq!(canvas.height, 50);
    assert_eq!(canvas.data.len(), 50 * 50 * 3);
    for (x, y) in [(0, 0), (49, 0), (0, 49), (49, 49)] {
        assert_eq!(canvas.pixel(x, y), Some(BG));
    }
    assert_eq!(canvas.pixel(50, 0), None);
}

#[test]
fn ink_bounds_cover_cap_height() {
    let face = Typeface::embedded().unwrap();
    let ink = ink_bounds(&face, &shaped(&face, "H", 100.0))
        .unwrap()
        .unwrap();
    // DejaVu Sans Bold cap height is 0.729 em.
    assert!((70.0..=76.0).contains(&ink.height()), "{ink:?}");
    assert!(ink.width() > 50.0 && ink.x0 >= 0.0);

    let blank = ink_bounds(&face, &shaped(&face, " ", 100.0)).unwrap();
    assert_eq!(blank, None);
}

#[test]
fn ink_box_is_centered() {
    let face = Typeface::embedded().unwrap();
    for text in ["DV", "JS", "?"] {
        let line = shaped(&face, text, 50.0);
        let ink = ink_bounds(&face, &line).unwrap();
        let canvas = compose_square(100, BG, FG, &face, &line, ink).unwrap();

        let (x0, x1, y0, y1) = ink_extent(&canvas).unwrap();
        let cx = f64::from(x0 + x1 + 1) / 2.0;
        let cy = f64::from(y0 + y1 + 1) / 2.0;
        assert!((cx - 50.0).abs() <= 1.5, "{text}: cx={cx}");
        assert!((cy - 50.0).abs() <= 1.5, "{text}: cy={cy}");
    }
}

#[test]
fn line_box_centering_without_ink() {
    let face = Typeface::embedded().unwrap();
    let line = shaped(&face, "DV", 50.0);
    let canvas = compose_square(100, BG, FG, &face, &line, None).unwrap();

    let (x0, x1, _, _) = ink_extent(&canvas).unwrap();
    assert!(x0 > 0 && x1 < 99);
}

#[test]
fn compose_is_deterministic() {
    let face = Typeface::embedded().unwrap();
    let line = shaped(&face, "JS", 30.0);
    let ink = ink_bounds(&face, &line).unwrap();
    let a = compose_square(60, BG, FG, &face, &line, ink).unwrap();
    let b = compose_square(60, BG, FG, &face, &line, ink).unwrap();
    assert_eq!(a, b);
}

#[test]
fn oversized_canvas_is_an_error() {
    let face = Typeface::embedded().unwrap();
    let line = shaped(&face, "A", 10.0);
    assert!(compose_square(70_000, BG, FG, &face, &line, None).is_err());
}
