//! # Image Payloads
//!
//! Prepares an uploaded image for an image QR code: scaled down to at
//! most [`MAX_PAYLOAD_WIDTH`] pixels wide, flattened onto white and
//! recompressed as JPEG so the data URL stays small.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use tracing::debug;

use crate::error::RenderResult;

/// Widest payload image in pixels.
pub const MAX_PAYLOAD_WIDTH: u32 = 600;

/// JPEG quality (1-100).
pub const PAYLOAD_JPEG_QUALITY: u8 = 60;

/// Downscales, flattens and JPEG-encodes `bytes`, returning a
/// `data:image/jpeg;base64,...` URL.
pub fn prepare_image_payload(bytes: &[u8]) -> RenderResult<String> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = (img.width(), img.height());

    let img = if width > MAX_PAYLOAD_WIDTH {
        let scaled_height = ((height as u64 * MAX_PAYLOAD_WIDTH as u64) / width as u64).max(1) as u32;
        img.resize_exact(MAX_PAYLOAD_WIDTH, scaled_height, FilterType::Triangle)
    } else {
        img
    };

    let flat = flatten_on_white(&img);
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, PAYLOAD_JPEG_QUALITY)
        .encode_image(&flat)?;

    debug!(
        from = format!("{width}x{height}"),
        to = format!("{}x{}", flat.width(), flat.height()),
        bytes = jpeg.len(),
        "Prepared image payload"
    );

    Ok(crate::data_url("image/jpeg", &jpeg))
}

/// Composites transparent pixels over white (JPEG has no alpha).
fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());

    for (x, y, px) in rgba.enumerate_pixels() {
        let alpha = px[3] as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha)) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(px[0]), blend(px[1]), blend(px[2])]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, color);
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    fn decode(data_url: &str) -> DynamicImage {
        let b64 = data_url.strip_prefix("data:image/jpeg;base64,").unwrap();
        image::load_from_memory(&STANDARD.decode(b64).unwrap()).unwrap()
    }

    #[test]
    fn test_wide_image_is_scaled_to_max_width() {
        let url = prepare_image_payload(&png(1200, 300, Rgba([10, 20, 30, 255]))).unwrap();
        let img = decode(&url);
        assert_eq!((img.width(), img.height()), (600, 150));
    }

    #[test]
    fn test_small_image_keeps_size() {
        let url = prepare_image_payload(&png(40, 30, Rgba([0, 0, 0, 255]))).unwrap();
        let img = decode(&url);
        assert_eq!((img.width(), img.height()), (40, 30));
    }

    #[test]
    fn test_transparency_becomes_white() {
        let url = prepare_image_payload(&png(16, 16, Rgba([0, 0, 0, 0]))).unwrap();
        let px = decode(&url).to_rgb8().get_pixel(8, 8).0;
        assert!(px.iter().all(|c| *c > 240), "{px:?}");
    }

    #[test]
    fn test_garbage_is_an_image_error() {
        assert!(matches!(
            prepare_image_payload(b"not an image"),
            Err(crate::RenderError::Image(_))
        ));
    }
}
