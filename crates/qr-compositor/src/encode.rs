//! Raster export — PNG and JPEG byte streams.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use tracing::debug;

use crate::Result;

/// JPEG quality used for all exports.
const JPEG_QUALITY: u8 = 92;

/// Encode the final bitmap as PNG.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    debug!(bytes = buf.get_ref().len(), "Encoded PNG");
    Ok(buf.into_inner())
}

/// Encode the final bitmap as JPEG.
///
/// JPEG has no alpha channel, so the bitmap is first composited over an
/// opaque background: the requested background color, or white when a
/// transparent background was requested.
pub fn encode_jpeg(img: &RgbaImage, background: Rgba<u8>) -> Result<Vec<u8>> {
    let backdrop = if background.0[3] == 0 {
        Rgb([255, 255, 255])
    } else {
        Rgb([background.0[0], background.0[1], background.0[2]])
    };

    let flat = flatten_onto(img, backdrop);
    let mut buf = Cursor::new(Vec::new());
    flat.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY))?;
    debug!(bytes = buf.get_ref().len(), "Encoded JPEG");
    Ok(buf.into_inner())
}

/// Draw-over alpha blending of the bitmap onto a solid backdrop.
fn flatten_onto(img: &RgbaImage, backdrop: Rgb<u8>) -> RgbImage {
    let (w, h) = img.dimensions();
    let mut out = RgbImage::from_pixel(w, h, backdrop);
    for (x, y, pixel) in img.enumerate_pixels() {
        let alpha = f32::from(pixel.0[3]) / 255.0;
        if alpha == 0.0 {
            continue;
        }
        let inv = 1.0 - alpha;
        let blend = |fg: u8, bg: u8| (f32::from(fg) * alpha + f32::from(bg) * inv) as u8;
        out.put_pixel(
            x,
            y,
            Rgb([
                blend(pixel.0[0], backdrop.0[0]),
                blend(pixel.0[1], backdrop.0[1]),
                blend(pixel.0[2], backdrop.0[2]),
            ]),
        );
    }
    out
}
