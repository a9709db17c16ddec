//! Optional centered logo compositing.
//!
//! The logo is an optional branding asset supplied by the caller as encoded
//! bytes; asset I/O happens before pipeline entry. A missing or undecodable
//! logo never fails a render — the pipeline skips this step instead.

use image::{DynamicImage, Rgba, RgbaImage, imageops::FilterType};
use tracing::debug;

use crate::{CompositorError, Result};

/// Logo edge length as a fraction of the bitmap's shorter side.
const LOGO_FRACTION: u32 = 4;

/// Decode a logo asset from its encoded bytes.
pub fn decode_logo(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| CompositorError::LogoUnavailable(e.to_string()))
}

/// Alpha-composite the logo onto the center of the finished bitmap, scaled
/// to a quarter of the bitmap's shorter side.
pub fn overlay_centered(base: &mut RgbaImage, logo: &DynamicImage) {
    let (w, h) = base.dimensions();
    let target = (w.min(h) / LOGO_FRACTION).max(1);
    debug!(w, h, target, "Compositing centered logo");

    let resized = logo.resize_exact(target, target, FilterType::Lanczos3);
    let resized = resized.to_rgba8();
    let x0 = (w - target) / 2;
    let y0 = (h - target) / 2;

    for (dx, dy, pixel) in resized.enumerate_pixels() {
        let (tx, ty) = (x0 + dx, y0 + dy);
        if tx >= w || ty >= h {
            continue;
        }
        let alpha = f32::from(pixel[3]) / 255.0;
        if alpha > 0.99 {
            base.put_pixel(tx, ty, *pixel);
        } else if alpha > 0.01 {
            let bg = base.get_pixel(tx, ty);
            let blended = blend_pixel(bg, pixel, alpha);
            base.put_pixel(tx, ty, blended);
        }
    }
}

fn blend_pixel(bg: &Rgba<u8>, fg: &Rgba<u8>, alpha: f32) -> Rgba<u8> {
    let inv = 1.0 - alpha;
    Rgba([
        (f32::from(fg[0]) * alpha + f32::from(bg[0]) * inv) as u8,
        (f32::from(fg[1]) * alpha + f32::from(bg[1]) * inv) as u8,
        (f32::from(fg[2]) * alpha + f32::from(bg[2]) * inv) as u8,
        255,
    ])
}
