use std::io::Cursor;

use super::*;

fn checker(w: u32, h: u32) -> RgbCanvas {
    let mut data = Vec::with_capacity((w * h * 3) as usize);
    for y in 0..h {
        for x in 0..w {
            let v = if (x + y) % 2 == 0 { 255 } else { 0 };
            data.extend_from_slice(&[v, 128, 255 - v]);
        }
    }
    RgbCanvas {
        width: w,
        height: h,
        data,
    }
}

#[test]
fn png_is_rgb8_and_decodes_back() {
    let canvas = checker(7, 5);
    let img = encode_png(&canvas).unwrap();
    assert_eq!(img.mime_type(), MimeType::Png);
    assert_eq!(&img.bytes()[..8], b"\x89PNG\r\n\x1a\n");
    // IHDR: bit depth 8, color type 2 (truecolor).
    assert_eq!(img.bytes()[24], 8);
    assert_eq!(img.bytes()[25], 2);

    let decoded = image::load_from_memory_with_format(img.bytes(), image::ImageFormat::Png)
        .unwrap()
        .to_rgb8();
    assert_eq!(decoded.dimensions(), (7, 5));
    assert_eq!(decoded.into_raw(), canvas.data);
}

#[test]
fn equal_canvases_encode_to_equal_bytes() {
    let a = encode_png(&checker(16, 16)).unwrap();
    let b = encode_png(&checker(16, 16)).unwrap();
    assert_eq!(a.bytes(), b.bytes());
}

#[test]
fn no_time_or_text_chunks_are_written() {
    let img = encode_png(&checker(4, 4)).unwrap();
    let bytes = img.bytes();
    for chunk in [b"tIME", b"tEXt", b"iTXt", b"zTXt"] {
        assert!(!bytes.windows(4).any(|w| w == chunk));
    }
    // Still parseable by a generic reader.
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .unwrap();
    assert_eq!(reader.format(), Some(image::ImageFormat::Png));
}

#[test]
fn mismatched_buffer_is_rejected() {
    let mut canvas = checker(4, 4);
    canvas.data.pop();
    assert!(encode_png(&canvas).is_err());
}
