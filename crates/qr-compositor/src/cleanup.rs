//! Anti-alias cleanup for transparent-background renders.
//!
//! Shape drawing leaves semi-transparent and near-white edge pixels behind;
//! on an opaque background they blend away, but on a transparent canvas they
//! show up as a halo. This pass forces them fully transparent.

use image::{Rgba, RgbaImage};
use tracing::debug;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Whether a pixel is an anti-aliasing artifact rather than real content.
///
/// Fully transparent pixels and opaque pixels that exactly match the
/// foreground are real; anything semi-transparent is an artifact, as is any
/// opaque light pixel (R, G, B all > 200) that isn't exactly the foreground.
fn is_artifact(pixel: Rgba<u8>, foreground: Rgba<u8>) -> bool {
    let [r, g, b, a] = pixel.0;
    if a == 0 {
        return false;
    }
    if a == 255 && r == foreground.0[0] && g == foreground.0[1] && b == foreground.0[2] {
        return false;
    }
    if a < 255 {
        return true;
    }
    r > 200 && g > 200 && b > 200
}

/// Force every artifact pixel fully transparent, in place.
///
/// Runs only for renders with a transparent background; `foreground` is the
/// flat module color (gradient renders pass black, preserving any module
/// pixel that isn't light).
pub fn strip_artifacts(img: &mut RgbaImage, foreground: Rgba<u8>) {
    let (width, height) = img.dimensions();
    debug!(width, height, "Stripping anti-alias artifacts");

    for pixel in img.pixels_mut() {
        if is_artifact(*pixel, foreground) {
            *pixel = TRANSPARENT;
        }
    }
}
