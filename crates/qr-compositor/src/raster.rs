//! Matrix rasterization — QR module grid to base RGBA bitmap.
//!
//! Produces a bitmap of exactly `dimension * module_px` pixels with no outer
//! border. Connector shapes (liquid, chain, stripes) consult the dark
//! neighbors of each module so adjacent dark modules merge across shared
//! edges instead of rendering as isolated tiles.

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::color::ColorSpec;
use crate::matrix::ModuleMatrix;
use crate::params::ModuleShape;

/// Fraction of the cell covered by stripe shapes across the stripe axis.
const STRIPE_COVERAGE: f64 = 0.85;

/// Fraction of the cell the chain core is inset by on each side.
const CHAIN_INSET: f64 = 0.15;

/// Rasterize a module matrix at `module_px` pixels per module.
///
/// A background with alpha 0 yields a fully transparent canvas; the caller is
/// then responsible for running anti-alias cleanup before export.
pub fn rasterize(
    matrix: &ModuleMatrix,
    module_px: u32,
    shape: ModuleShape,
    fill: &ColorSpec,
    background: Rgba<u8>,
) -> RgbaImage {
    let dimension = matrix.dimension() as u32;
    let size = dimension * module_px;
    debug!(dimension, module_px, size, ?shape, "Rasterizing QR matrix");

    let mut img = if background.0[3] == 0 {
        RgbaImage::new(size, size)
    } else {
        RgbaImage::from_pixel(size, size, background)
    };

    for my in 0..dimension {
        for mx in 0..dimension {
            if !matrix.is_dark(mx as usize, my as usize) {
                continue;
            }
            let px = mx * module_px;
            let py = my * module_px;
            let neighbors = matrix.neighbors(mx as usize, my as usize);

            match shape {
                ModuleShape::Rectangle => draw_rectangle(&mut img, px, py, module_px, fill),
                ModuleShape::Circle => draw_circle(&mut img, px, py, module_px, fill),
                ModuleShape::Liquid => draw_liquid(&mut img, px, py, module_px, &neighbors, fill),
                ModuleShape::Chain => draw_chain(&mut img, px, py, module_px, &neighbors, fill),
                ModuleShape::HStripe => {
                    draw_stripe(&mut img, px, py, module_px, fill, /* horizontal */ true)
                }
                ModuleShape::VStripe => {
                    draw_stripe(&mut img, px, py, module_px, fill, /* horizontal */ false)
                }
            }
        }
    }

    img
}

fn put(img: &mut RgbaImage, x: u32, y: u32, fill: &ColorSpec) {
    let (w, h) = img.dimensions();
    if x < w && y < h {
        let color = fill.color_at(x, y, w, h);
        img.put_pixel(x, y, color);
    }
}

/// Fill the entire module cell.
fn draw_rectangle(img: &mut RgbaImage, px: u32, py: u32, m: u32, fill: &ColorSpec) {
    for dy in 0..m {
        for dx in 0..m {
            put(img, px + dx, py + dy, fill);
        }
    }
}

/// Inscribed circle, tested against pixel centers for smooth edges.
fn draw_circle(img: &mut RgbaImage, px: u32, py: u32, m: u32, fill: &ColorSpec) {
    let center_x = f64::from(px) + f64::from(m) / 2.0;
    let center_y = f64::from(py) + f64::from(m) / 2.0;
    let radius = f64::from(m) / 2.0;
    let r_sq = radius * radius;

    for dy in 0..m {
        for dx in 0..m {
            let dist_x = f64::from(px + dx) + 0.5 - center_x;
            let dist_y = f64::from(py + dy) + 0.5 - center_y;
            if dist_x * dist_x + dist_y * dist_y <= r_sq {
                put(img, px + dx, py + dy, fill);
            }
        }
    }
}

/// Blob shape: a corner is rounded (quarter circle of radius `m/2`) only when
/// both edges meeting at it have no dark neighbor, so runs of dark modules
/// melt together.
fn draw_liquid(
    img: &mut RgbaImage,
    px: u32,
    py: u32,
    m: u32,
    neighbors: &[bool; 4], // [top, right, bottom, left]
    fill: &ColorSpec,
) {
    let radius = f64::from(m) / 2.0;
    let r_sq = radius * radius;

    let round_tl = !neighbors[0] && !neighbors[3];
    let round_tr = !neighbors[0] && !neighbors[1];
    let round_bl = !neighbors[2] && !neighbors[3];
    let round_br = !neighbors[2] && !neighbors[1];

    // Corner circle centers; with radius m/2 they all coincide with the cell
    // center, so an isolated module renders as the inscribed circle.
    let corners = [
        (round_tl, f64::from(px) + radius, f64::from(py) + radius),
        (
            round_tr,
            f64::from(px + m) - radius,
            f64::from(py) + radius,
        ),
        (
            round_bl,
            f64::from(px) + radius,
            f64::from(py + m) - radius,
        ),
        (
            round_br,
            f64::from(px + m) - radius,
            f64::from(py + m) - radius,
        ),
    ];

    for dy in 0..m {
        for dx in 0..m {
            let fx = f64::from(px + dx) + 0.5;
            let fy = f64::from(py + dy) + 0.5;

            let in_tl = f64::from(dx) <= radius && f64::from(dy) <= radius;
            let in_tr = f64::from(m - 1 - dx) <= radius && f64::from(dy) <= radius;
            let in_bl = f64::from(dx) <= radius && f64::from(m - 1 - dy) <= radius;
            let in_br = f64::from(m - 1 - dx) <= radius && f64::from(m - 1 - dy) <= radius;
            let zones = [in_tl, in_tr, in_bl, in_br];

            let mut draw = true;
            for ((rounded, cx, cy), in_zone) in corners.iter().zip(zones) {
                if *rounded && in_zone {
                    let dist_x = fx - cx;
                    let dist_y = fy - cy;
                    if dist_x * dist_x + dist_y * dist_y > r_sq {
                        draw = false;
                    }
                }
            }

            if draw {
                put(img, px + dx, py + dy, fill);
            }
        }
    }
}

/// Chain-link shape: a rounded core inset on every side, with bridges
/// extending to the cell edge toward each dark neighbor.
fn draw_chain(
    img: &mut RgbaImage,
    px: u32,
    py: u32,
    m: u32,
    neighbors: &[bool; 4], // [top, right, bottom, left]
    fill: &ColorSpec,
) {
    let inset = (f64::from(m) * CHAIN_INSET).round().max(1.0);
    let lo = inset;
    let hi = f64::from(m) - inset;
    let radius = (hi - lo) / 2.0;
    let center = f64::from(m) / 2.0;
    let r_sq = radius * radius;

    for dy in 0..m {
        for dx in 0..m {
            let fx = f64::from(dx) + 0.5;
            let fy = f64::from(dy) + 0.5;

            // Core: circle of radius (m - 2*inset)/2 centered in the cell.
            let dist_x = fx - center;
            let dist_y = fy - center;
            let mut draw = dist_x * dist_x + dist_y * dist_y <= r_sq;

            // Bridges toward dark neighbors, spanning the core width.
            let across = fx >= lo && fx < hi;
            let down = fy >= lo && fy < hi;
            if !draw {
                draw = (neighbors[0] && fy < center && across)
                    || (neighbors[2] && fy >= center && across)
                    || (neighbors[3] && fx < center && down)
                    || (neighbors[1] && fx >= center && down);
            }

            if draw {
                put(img, px + dx, py + dy, fill);
            }
        }
    }
}

/// Stripe shape: a bar covering [`STRIPE_COVERAGE`] of the cell across the
/// stripe axis and the full cell along it, so adjacent dark modules form
/// continuous bands.
fn draw_stripe(img: &mut RgbaImage, px: u32, py: u32, m: u32, fill: &ColorSpec, horizontal: bool) {
    let inset = (f64::from(m) * (1.0 - STRIPE_COVERAGE) / 2.0).round() as u32;
    let span_end = m.saturating_sub(inset);

    for dy in 0..m {
        for dx in 0..m {
            let cross = if horizontal { dy } else { dx };
            if cross >= inset && cross < span_end {
                put(img, px + dx, py + dy, fill);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::GradientSpec;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn single_dark_module() -> ModuleMatrix {
        ModuleMatrix::new(1, vec![true])
    }

    /// 1x3 horizontal run of dark modules inside a 3x3 grid.
    fn horizontal_run() -> ModuleMatrix {
        #[rustfmt::skip]
        let modules = vec![
            false, false, false,
            true,  true,  true,
            false, false, false,
        ];
        ModuleMatrix::new(3, modules)
    }

    #[test]
    fn rasterized_bitmap_has_exact_size() {
        for (dim, m) in [(1usize, 16u32), (3, 16), (3, 120), (21, 4)] {
            let matrix = ModuleMatrix::new(dim, vec![true; dim * dim]);
            let img = rasterize(
                &matrix,
                m,
                ModuleShape::Rectangle,
                &ColorSpec::Flat(BLACK),
                WHITE,
            );
            assert_eq!(img.dimensions(), (dim as u32 * m, dim as u32 * m));
        }
    }

    #[test]
    fn rectangle_fills_entire_cell() {
        let img = rasterize(
            &single_dark_module(),
            8,
            ModuleShape::Rectangle,
            &ColorSpec::Flat(BLACK),
            WHITE,
        );
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(*img.get_pixel(x, y), BLACK);
            }
        }
    }

    #[test]
    fn circle_leaves_corners_background() {
        let img = rasterize(
            &single_dark_module(),
            16,
            ModuleShape::Circle,
            &ColorSpec::Flat(BLACK),
            WHITE,
        );
        assert_eq!(*img.get_pixel(0, 0), WHITE);
        assert_eq!(*img.get_pixel(15, 0), WHITE);
        assert_eq!(*img.get_pixel(0, 15), WHITE);
        assert_eq!(*img.get_pixel(15, 15), WHITE);
        // Center is painted.
        assert_eq!(*img.get_pixel(8, 8), BLACK);
    }

    #[test]
    fn transparent_background_stays_transparent_off_modules() {
        let img = rasterize(
            &horizontal_run(),
            8,
            ModuleShape::Rectangle,
            &ColorSpec::Flat(BLACK),
            CLEAR,
        );
        // Top-left cell is light: fully transparent.
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
        // Center cell is dark: opaque.
        assert_eq!(*img.get_pixel(12, 12), BLACK);
    }

    #[test]
    fn liquid_merges_along_run_but_rounds_free_corners() {
        let m = 16u32;
        let img = rasterize(
            &horizontal_run(),
            m,
            ModuleShape::Liquid,
            &ColorSpec::Flat(BLACK),
            WHITE,
        );
        // The middle module of the run has dark neighbors left and right, so
        // its whole cell edge toward them is filled: the shared-edge midpoint
        // between cells (1,1) and (2,1) is dark on both sides.
        let edge_x = 2 * m - 1;
        let mid_y = m + m / 2;
        assert_eq!(*img.get_pixel(edge_x, mid_y), BLACK);
        assert_eq!(*img.get_pixel(edge_x + 1, mid_y), BLACK);
        // The run's left end has a free top-left corner: rounded off.
        assert_eq!(*img.get_pixel(0, m), WHITE);
    }

    #[test]
    fn chain_bridges_toward_dark_neighbors_only() {
        let m = 16u32;
        let img = rasterize(
            &horizontal_run(),
            m,
            ModuleShape::Chain,
            &ColorSpec::Flat(BLACK),
            WHITE,
        );
        // Bridge across the shared edge between cells (0,1) and (1,1).
        assert_eq!(*img.get_pixel(m - 1, m + m / 2), BLACK);
        assert_eq!(*img.get_pixel(m, m + m / 2), BLACK);
        // No bridge toward the light module above: the top edge of cell
        // (1,1) stays background.
        assert_eq!(*img.get_pixel(m + m / 2, m), WHITE);
    }

    #[test]
    fn hstripe_spans_full_width_with_vertical_inset() {
        let m = 16u32;
        let img = rasterize(
            &single_dark_module(),
            m,
            ModuleShape::HStripe,
            &ColorSpec::Flat(BLACK),
            WHITE,
        );
        // Left and right edges are painted at mid-height (stripes run
        // through cell edges so runs merge).
        assert_eq!(*img.get_pixel(0, m / 2), BLACK);
        assert_eq!(*img.get_pixel(m - 1, m / 2), BLACK);
        // Topmost row is inset away.
        assert_eq!(*img.get_pixel(m / 2, 0), WHITE);
    }

    #[test]
    fn vstripe_spans_full_height_with_horizontal_inset() {
        let m = 16u32;
        let img = rasterize(
            &single_dark_module(),
            m,
            ModuleShape::VStripe,
            &ColorSpec::Flat(BLACK),
            WHITE,
        );
        assert_eq!(*img.get_pixel(m / 2, 0), BLACK);
        assert_eq!(*img.get_pixel(m / 2, m - 1), BLACK);
        assert_eq!(*img.get_pixel(0, m / 2), WHITE);
    }

    #[test]
    fn gradient_fill_varies_across_bitmap() {
        let matrix = ModuleMatrix::new(2, vec![true; 4]);
        let g = GradientSpec::new(
            Rgba([255, 0, 0, 255]),
            Rgba([128, 128, 128, 255]),
            Rgba([0, 0, 255, 255]),
        );
        let img = rasterize(
            &matrix,
            16,
            ModuleShape::Rectangle,
            &ColorSpec::Gradient(g),
            WHITE,
        );
        // Bottom-left pixel sits at t≈0 (start), top-right at t≈1 (end).
        let bottom_left = *img.get_pixel(0, 31);
        let top_right = *img.get_pixel(31, 0);
        assert!(bottom_left.0[0] > 200 && bottom_left.0[2] < 50);
        assert!(top_right.0[2] > 200 && top_right.0[0] < 50);
    }
}
