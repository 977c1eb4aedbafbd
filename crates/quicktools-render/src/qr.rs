//! # QR Rendering
//!
//! Rasterizes a QR module grid onto an exact-size RGBA canvas, optionally
//! composites a logo on a white plate, and encodes the result as PNG.
//!
//! ## Pipeline
//! ```text
//! payload ──► QrCode (qrcode crate: EC + module layout)
//!                 │
//!                 ▼
//!          module grid (+4 module quiet zone)
//!                 │  nearest-module sampling to style.size px
//!                 ▼
//!          RGBA canvas ──► [logo plate + logo] ──► PNG ──► data URL
//! ```

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use qrcode::{Color, EcLevel as QrEcLevel, QrCode};
use quicktools_core::qr::{EcLevel, LogoPlate, QrStyle};
use quicktools_core::types::Rgb;
use quicktools_core::validation::require;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::RenderResult;

/// Quiet zone width required by the QR specification, in modules.
pub const QUIET_ZONE_MODULES: u32 = 4;

const PLATE_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A rendered QR code.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedQr {
    #[serde(skip)]
    pub png: Vec<u8>,
    pub data_url: String,
    /// Modules per side, without the quiet zone.
    pub modules: u32,
}

fn qr_ec_level(level: EcLevel) -> QrEcLevel {
    match level {
        EcLevel::Low => QrEcLevel::L,
        EcLevel::Medium => QrEcLevel::M,
        EcLevel::Quartile => QrEcLevel::Q,
        EcLevel::High => QrEcLevel::H,
    }
}

fn rgba(color: Rgb) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, 255])
}

/// Renders `payload` as a `style.size` square PNG.
pub fn render_qr(payload: &str, style: &QrStyle, logo: Option<&[u8]>) -> RenderResult<RenderedQr> {
    style.validate()?;
    require("payload", payload)?;

    let code = QrCode::with_error_correction_level(payload.as_bytes(), qr_ec_level(style.error_correction))?;
    let modules = code.width() as u32;
    let mut canvas = rasterize(&code, style);

    if let Some(logo) = logo {
        if matches!(style.error_correction, EcLevel::Low | EcLevel::Medium) {
            warn!(
                ec = ?style.error_correction,
                "Logo over a low error correction QR code may not scan"
            );
        }
        composite_logo(&mut canvas, logo, style)?;
    }

    let mut png = Vec::new();
    DynamicImage::ImageRgba8(canvas).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    debug!(
        modules,
        size = style.size,
        bytes = png.len(),
        with_logo = logo.is_some(),
        "Rendered QR code"
    );

    Ok(RenderedQr {
        data_url: crate::data_url("image/png", &png),
        png,
        modules,
    })
}

/// Samples the module grid (plus quiet zone) onto a square canvas.
fn rasterize(code: &QrCode, style: &QrStyle) -> RgbaImage {
    let quiet = if style.quiet_zone { QUIET_ZONE_MODULES } else { 0 };
    let width = code.width() as u32;
    let total = (width + 2 * quiet) as u64;
    let size = style.size;
    let colors = code.to_colors();

    if (size as u64) < total {
        warn!(size, modules = total, "QR image is smaller than one pixel per module");
    }

    let (dark, light) = (rgba(style.dark_color), rgba(style.light_color));
    let module_at = |px: u32| (px as u64 * total / size as u64) as u32;

    RgbaImage::from_fn(size, size, |x, y| {
        let (mx, my) = (module_at(x), module_at(y));
        let inside = (quiet..quiet + width).contains(&mx) && (quiet..quiet + width).contains(&my);
        let index = ((my.wrapping_sub(quiet)) * width + mx.wrapping_sub(quiet)) as usize;

        if inside && matches!(colors.get(index), Some(Color::Dark)) {
            dark
        } else {
            light
        }
    })
}

/// Clears the rounded plate and centers the logo on it.
fn composite_logo(canvas: &mut RgbaImage, logo: &[u8], style: &QrStyle) -> RenderResult<()> {
    let plate = LogoPlate::compute(style.size, style.logo_percent);
    if plate.logo_size == 0 {
        return Ok(());
    }

    let logo = image::load_from_memory(logo)?
        .resize(plate.logo_size, plate.logo_size, FilterType::Lanczos3)
        .to_rgba8();

    for (x, y, px) in canvas.enumerate_pixels_mut() {
        if plate.covers(x, y) {
            *px = PLATE_COLOR;
        }
    }

    // resize() keeps the aspect ratio, so one side may be short
    let x = plate.logo_offset + plate.logo_size.saturating_sub(logo.width()) / 2;
    let y = plate.logo_offset + plate.logo_size.saturating_sub(logo.height()) / 2;
    imageops::overlay(canvas, &logo, x as i64, y as i64);

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
