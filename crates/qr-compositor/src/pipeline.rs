//! Render orchestration — one request in, encoded image bytes out.
//!
//! Stages pass a single owned bitmap from step to step; nothing is shared
//! across requests and everything is dropped when the render returns.

use std::collections::HashMap;

use image::{Rgba, RgbaImage};
use tracing::{debug, warn};

use crate::color::ColorSpec;
use crate::matrix::ModuleMatrix;
use crate::params::{FrameKind, OutputFormat, ResolvedParams, SizeClass};
use crate::{
    BORDER_PERCENT, CACHE_MAX_AGE_SECS, DOWNLOAD_TARGET_PX, Result, cleanup, encode, frame, logo,
    params, raster, resize, svg,
};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// One validated render request. Built per call, dropped with the response.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Normalized absolute http/https URL.
    pub target_url: String,
    pub format: OutputFormat,
    pub size_class: SizeClass,
    /// Exact output size for preview renders, when the caller asks for one.
    pub preview_target_px: Option<u32>,
}

impl RenderRequest {
    /// Validate the raw URL and resolve format/size parameters.
    ///
    /// Only the URL can fail here; format, size, and preview size fall back
    /// to defaults on malformed input.
    pub fn new(raw_url: &str, query: &HashMap<String, String>) -> Result<Self> {
        let target_url = params::normalize_url(raw_url)?;
        let get = |key: &str| query.get(key).map(String::as_str).unwrap_or("");

        Ok(Self {
            target_url,
            format: OutputFormat::parse(get("format")),
            size_class: SizeClass::parse(get("size")),
            preview_target_px: get("previewSize").parse::<u32>().ok().filter(|&v| v > 0),
        })
    }
}

/// A finished render.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    /// Recommended cache lifetime, in seconds.
    pub cache_max_age: u32,
}

/// Render a QR image for the request.
///
/// `logo_bytes` is an optional pre-fetched branding asset; decoding problems
/// are recovered by rendering without it.
pub fn render(
    request: &RenderRequest,
    params: &ResolvedParams,
    logo_bytes: Option<&[u8]>,
) -> Result<Rendered> {
    debug!(
        url = %request.target_url,
        format = ?request.format,
        size = ?request.size_class,
        "Render start"
    );
    let matrix = ModuleMatrix::from_url(&request.target_url)?;

    let bytes = match request.format {
        OutputFormat::Svg => svg::emit_svg(&matrix, params, request.size_class).into_bytes(),
        OutputFormat::Png => {
            let img = compose_raster(request, params, logo_bytes, &matrix);
            encode::encode_png(&img)?
        }
        OutputFormat::Jpg => {
            let img = compose_raster(request, params, logo_bytes, &matrix);
            encode::encode_jpeg(&img, params.background)?
        }
    };

    Ok(Rendered {
        bytes,
        content_type: request.format.content_type(),
        cache_max_age: CACHE_MAX_AGE_SECS,
    })
}

/// Run the raster pipeline: rasterize, logo, cleanup, scale, pad, frame,
/// and enforce the exact preview size.
fn compose_raster(
    request: &RenderRequest,
    params: &ResolvedParams,
    logo_bytes: Option<&[u8]>,
    matrix: &ModuleMatrix,
) -> RgbaImage {
    let transparent = params.background.0[3] == 0;
    let background = if transparent {
        TRANSPARENT
    } else {
        params.background
    };

    let mut img = raster::rasterize(
        matrix,
        request.size_class.module_px(),
        params.shape,
        &params.fill,
        background,
    );

    if params.center_logo {
        match logo_bytes.map(logo::decode_logo) {
            Some(Ok(logo_img)) => logo::overlay_centered(&mut img, &logo_img),
            Some(Err(e)) => warn!(error = %e, "Skipping undecodable logo"),
            None => warn!("Logo requested but no asset supplied, skipping"),
        }
    }

    if transparent {
        // Gradient renders have no single foreground; black keeps every
        // non-light module pixel.
        let reference = match &params.fill {
            ColorSpec::Flat(c) => *c,
            ColorSpec::Gradient(_) => Rgba([0, 0, 0, 255]),
        };
        cleanup::strip_artifacts(&mut img, reference);
    }

    if request.size_class == SizeClass::Download {
        img = resize::ensure_minimum(img, DOWNLOAD_TARGET_PX);
    }

    // Logical QR size before decoration; padding and frame widths are
    // percentages of this.
    let mut original_size = img.width();

    // Scale the base so padding and frame growth land exactly on the
    // requested preview size, instead of rescaling the decorated image and
    // aliasing the frame pattern.
    if request.size_class == SizeClass::Preview {
        if let Some(target) = request.preview_target_px {
            let frame_percent = if params.frame.kind == FrameKind::None {
                0
            } else {
                params.frame.width_percent()
            };
            let base = resize::prescale_base_size(target, BORDER_PERCENT, frame_percent);
            if base > 0 && base != original_size {
                img = resize::resize_exact(&img, base);
                original_size = base;
            }
        }
    }

    img = frame::add_padding(img, BORDER_PERCENT, original_size, background);

    if params.frame.kind != FrameKind::None {
        let frame_px = original_size * params.frame.width_percent() / 100;
        img = frame::add_frame(img, params.frame, frame_px, background, &params.frame_fill);
    }

    // Final guarantee: preview output is exactly the requested size even
    // when integer rounding in the decoration steps drifted by a pixel.
    if request.size_class == SizeClass::Preview {
        if let Some(target) = request.preview_target_px {
            if img.width() != target {
                img = resize::resize_exact(&img, target);
            }
        }
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompositorError;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn request_validates_url() {
        let req = RenderRequest::new("example.com", &HashMap::new()).unwrap();
        assert_eq!(req.target_url, "https://example.com");
        assert_eq!(req.format, OutputFormat::Png);
        assert_eq!(req.size_class, SizeClass::Preview);
        assert_eq!(req.preview_target_px, None);

        assert!(matches!(
            RenderRequest::new("", &HashMap::new()),
            Err(CompositorError::MissingUrl)
        ));
    }

    #[test]
    fn request_parses_preview_size_leniently() {
        let req = RenderRequest::new(
            "example.com",
            &query(&[("previewSize", "300"), ("format", "jpg")]),
        )
        .unwrap();
        assert_eq!(req.preview_target_px, Some(300));
        assert_eq!(req.format, OutputFormat::Jpg);

        // Garbage and zero preview sizes resolve to none.
        for bad in ["abc", "0", "-5", ""] {
            let req = RenderRequest::new("example.com", &query(&[("previewSize", bad)])).unwrap();
            assert_eq!(req.preview_target_px, None, "previewSize={bad}");
        }
    }

    #[test]
    fn render_returns_cache_lifetime_and_mime() {
        let req = RenderRequest::new("https://example.com", &HashMap::new()).unwrap();
        let params = ResolvedParams::from_query(&HashMap::new());
        let out = render(&req, &params, None).unwrap();
        assert_eq!(out.content_type, "image/png");
        assert_eq!(out.cache_max_age, 3600);
        assert!(!out.bytes.is_empty());
    }

    #[test]
    fn base_bitmap_has_no_border() {
        // The rasterized base is exactly dimension * module_px; padding is a
        // separate stage. Verified through the composed preview size below.
        let matrix = ModuleMatrix::from_url("https://example.com").unwrap();
        let dim = matrix.dimension() as u32;
        let img = crate::raster::rasterize(
            &matrix,
            16,
            crate::params::ModuleShape::Rectangle,
            &ColorSpec::Flat(Rgba([0, 0, 0, 255])),
            Rgba([255, 255, 255, 255]),
        );
        assert_eq!(img.dimensions(), (dim * 16, dim * 16));
    }

    #[test]
    fn missing_logo_asset_does_not_fail_render() {
        let req = RenderRequest::new("https://example.com", &HashMap::new()).unwrap();
        let params = ResolvedParams::from_query(&query(&[("centerLogo", "true")]));
        assert!(render(&req, &params, None).is_ok());
        // Undecodable bytes are skipped the same way.
        assert!(render(&req, &params, Some(&[1, 2, 3])).is_ok());
    }
}
