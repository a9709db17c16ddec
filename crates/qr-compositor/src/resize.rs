//! Resize engine — nearest-neighbor scaling to exact target sizes.
//!
//! Nearest-neighbor sampling keeps module edges sharp; smoothing filters
//! would blur the black/white transitions and hurt scannability.

use image::RgbaImage;
use tracing::debug;

/// Scale a bitmap to exactly `target` x `target` pixels.
///
/// Each destination pixel samples the source at `floor(dest / scale)`,
/// clamped to the source bounds.
pub fn resize_exact(img: &RgbaImage, target: u32) -> RgbaImage {
    let (cur_w, cur_h) = img.dimensions();
    if cur_w == 0 || target == 0 {
        return img.clone();
    }

    let scale = f64::from(target) / f64::from(cur_w);
    debug!(cur_w, target, scale, "Resizing to exact size");

    let mut dst = RgbaImage::new(target, target);
    for y in 0..target {
        for x in 0..target {
            let src_x = ((f64::from(x) / scale) as u32).min(cur_w - 1);
            let src_y = ((f64::from(y) / scale) as u32).min(cur_h - 1);
            dst.put_pixel(x, y, *img.get_pixel(src_x, src_y));
        }
    }
    dst
}

/// Upscale a bitmap to `min_size` if it is smaller; larger bitmaps pass
/// through untouched (the download-path policy).
pub fn ensure_minimum(img: RgbaImage, min_size: u32) -> RgbaImage {
    let current = img.width();
    if current >= min_size {
        return img;
    }
    debug!(current, min_size, "Upscaling to minimum size");
    resize_exact(&img, min_size)
}

/// Base size that, once padding and frame growth are applied, lands on
/// `target` without a second scaling pass over the decorated image.
pub fn prescale_base_size(target: u32, border_percent: u32, frame_width_percent: u32) -> u32 {
    let multiplier = 1.0 + 2.0 * (f64::from(border_percent + frame_width_percent) / 100.0);
    (f64::from(target) / multiplier).round() as u32
}
