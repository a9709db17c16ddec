//! Vector path emission — SVG output derived directly from the module matrix.
//!
//! The SVG path does not reuse the raster pipeline: module positions come
//! straight from the matrix, scaled to the target resolution. Frames are
//! emitted as a plain four-rectangle border regardless of pattern; the full
//! pattern set is raster-only.

use std::fmt::Write;

use image::Rgba;
use tracing::debug;

use crate::color::ColorSpec;
use crate::matrix::ModuleMatrix;
use crate::params::{FrameKind, ModuleShape, ResolvedParams, SizeClass};
use crate::{BORDER_PERCENT, DOWNLOAD_TARGET_PX};

/// SVG body target size for preview renders.
const SVG_PREVIEW_TARGET_PX: u32 = 400;

fn rgb(color: Rgba<u8>) -> String {
    format!("rgb({},{},{})", color.0[0], color.0[1], color.0[2])
}

fn fill_attr(spec: &ColorSpec) -> String {
    match spec {
        ColorSpec::Flat(c) => rgb(*c),
        ColorSpec::Gradient(_) => "url(#qrGradient)".to_string(),
    }
}

/// Emit a complete SVG document for the matrix with the resolved parameters.
pub fn emit_svg(matrix: &ModuleMatrix, params: &ResolvedParams, size_class: SizeClass) -> String {
    let dimension = matrix.dimension() as u32;
    let target = match size_class {
        SizeClass::Download => DOWNLOAD_TARGET_PX,
        SizeClass::Preview => SVG_PREVIEW_TARGET_PX,
    };
    let module_px = target / dimension;

    let padding = target * BORDER_PERCENT / 100;
    let frame_px = if params.frame.kind == FrameKind::None {
        0
    } else {
        target * params.frame.width_percent() / 100
    };
    let total = target + padding * 2 + frame_px * 2;
    let offset = frame_px + padding;
    debug!(dimension, target, total, "Emitting SVG");

    let mut svg = String::new();
    svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {total} {total}" width="{total}" height="{total}">"#
    );

    if let ColorSpec::Gradient(g) = &params.fill {
        svg.push_str(r#"<defs><linearGradient id="qrGradient" x1="0%" y1="0%" x2="100%" y2="100%">"#);
        let _ = write!(svg, r#"<stop offset="0%" stop-color="{}"/>"#, rgb(g.start));
        let _ = write!(svg, r#"<stop offset="50%" stop-color="{}"/>"#, rgb(g.middle));
        let _ = write!(svg, r#"<stop offset="100%" stop-color="{}"/>"#, rgb(g.end));
        svg.push_str("</linearGradient></defs>");
    }

    if params.background.0[3] > 0 {
        let _ = write!(
            svg,
            r#"<rect width="{total}" height="{total}" fill="{}"/>"#,
            rgb(params.background)
        );
    }

    if frame_px > 0 {
        let frame_fill = fill_attr(&params.frame_fill);
        // Four rectangles around the edges: top, bottom, left, right.
        let _ = write!(
            svg,
            r#"<rect x="0" y="0" width="{total}" height="{frame_px}" fill="{frame_fill}"/>"#
        );
        let _ = write!(
            svg,
            r#"<rect x="0" y="{}" width="{total}" height="{frame_px}" fill="{frame_fill}"/>"#,
            total - frame_px
        );
        let side_h = total - 2 * frame_px;
        let _ = write!(
            svg,
            r#"<rect x="0" y="{frame_px}" width="{frame_px}" height="{side_h}" fill="{frame_fill}"/>"#
        );
        let _ = write!(
            svg,
            r#"<rect x="{}" y="{frame_px}" width="{frame_px}" height="{side_h}" fill="{frame_fill}"/>"#,
            total - frame_px
        );
    }

    let module_fill = fill_attr(&params.fill);
    for y in 0..dimension {
        for x in 0..dimension {
            if !matrix.is_dark(x as usize, y as usize) {
                continue;
            }
            let module_x = offset + x * module_px;
            let module_y = offset + y * module_px;

            match params.shape {
                ModuleShape::Circle => {
                    let radius = module_px / 2;
                    let _ = write!(
                        svg,
                        r#"<circle cx="{}" cy="{}" r="{radius}" fill="{module_fill}"/>"#,
                        module_x + radius,
                        module_y + radius
                    );
                }
                _ => {
                    let _ = write!(
                        svg,
                        r#"<rect x="{module_x}" y="{module_y}" width="{module_px}" height="{module_px}" fill="{module_fill}"/>"#
                    );
                }
            }
        }
    }

    if params.center_logo {
        let center = total / 2;
        let logo_size = target / 4;
        let _ = write!(
            svg,
            r#"<circle cx="{center}" cy="{center}" r="{}" fill="white"/>"#,
            logo_size / 2 + 5
        );
        let _ = write!(
            svg,
            r#"<rect x="{}" y="{}" width="{logo_size}" height="{logo_size}" fill="gray" opacity="0.3"/>"#,
            center - logo_size / 2,
            center - logo_size / 2
        );
    }

    svg.push_str("</svg>");
    svg
}
