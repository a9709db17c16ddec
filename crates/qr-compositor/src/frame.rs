//! Geometric composition — padding, decorative frame bands, rounded carving.
//!
//! All frame patterns are pure classifications of pixel coordinates against
//! the current [`FrameGeometry`], evaluated for every pixel of the band (the
//! ring within `frame_px` of a canvas edge). The QR content in the center is
//! never touched.

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::color::ColorSpec;
use crate::params::{FrameKind, FrameStyle};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Radii derived from the frame width at composition time.
///
/// `outer_radius - inner_radius == frame_px` keeps the rounded stroke at
/// uniform thickness; the carve removes roughly a third of the band from the
/// inner side so the remaining stroke stays bold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub frame_px: u32,
    pub inner_radius: i32,
    pub outer_radius: i32,
    pub carve_radius: i32,
}

impl FrameGeometry {
    pub fn new(frame_px: u32) -> Self {
        let fw = f64::from(frame_px);
        let inner_radius = (fw * 0.55).round().max(2.0) as i32;
        let cut = (fw * 0.33).ceil().max(2.0) as i32;
        Self {
            frame_px,
            inner_radius,
            outer_radius: inner_radius + frame_px as i32,
            carve_radius: inner_radius + cut,
        }
    }

    /// Thickness removed from the inner side of the band by the carve.
    fn cut(&self) -> i32 {
        self.carve_radius - self.inner_radius
    }
}

/// Whether `(x, y)` lies inside the rounded rectangle spanning
/// `left..=right` x `top..=bottom` with corner radius `r`: in the axial
/// bands excluding the corners, or within `r` of a corner center inset
/// by `r`.
fn inside_rounded_rect(x: i32, y: i32, left: i32, top: i32, right: i32, bottom: i32, r: i32) -> bool {
    if left > right || top > bottom {
        return false;
    }
    if r <= 0 {
        return x >= left && x <= right && y >= top && y <= bottom;
    }
    if x >= left + r && x <= right - r && y >= top && y <= bottom {
        return true;
    }
    if y >= top + r && y <= bottom - r && x >= left && x <= right {
        return true;
    }
    let corners = [
        (left + r, top + r),
        (right - r, top + r),
        (left + r, bottom - r),
        (right - r, bottom - r),
    ];
    corners.iter().any(|&(cx, cy)| {
        let dx = x - cx;
        let dy = y - cy;
        dx * dx + dy * dy <= r * r
    })
}

/// Expand the canvas symmetrically with quiet-zone padding.
///
/// Padding is a percentage of the *logical* QR size (`original_size`), scaled
/// proportionally when the bitmap was already resized, so the quiet zone
/// stays visually consistent across resolutions. The original content lands
/// centered and pixel-identical.
pub fn add_padding(
    img: RgbaImage,
    border_percent: u32,
    original_size: u32,
    background: Rgba<u8>,
) -> RgbaImage {
    let (ow, oh) = img.dimensions();
    let mut padding = (f64::from(original_size) * f64::from(border_percent) / 100.0).round() as u32;
    if ow != original_size && original_size > 0 {
        let scale = f64::from(ow) / f64::from(original_size);
        padding = (f64::from(padding) * scale).round() as u32;
    }
    debug!(padding, original_size, "Adding padding");

    let (w, h) = (ow + padding * 2, oh + padding * 2);
    let mut padded = if background.0[3] == 0 {
        RgbaImage::new(w, h)
    } else {
        RgbaImage::from_pixel(w, h, background)
    };

    for (x, y, pixel) in img.enumerate_pixels() {
        padded.put_pixel(x + padding, y + padding, *pixel);
    }
    padded
}

/// Widths of the three concentric bands of the double pattern, rebalanced
/// the way the straight and rounded variants each want them.
fn double_bands(fw: i32, rounded: bool) -> (i32, i32, i32) {
    let fwf = f64::from(fw);
    let mut outer = (fwf * 0.4).round().max(2.0) as i32;
    let mut gap = (fwf * 0.2).round().max(1.0) as i32;
    let mut inner = (fw - outer - gap).max(1);

    // Bias the inner stroke thicker without changing the outer weight.
    let delta = (fwf * 0.1).round().max(1.0) as i32;
    if gap > delta {
        gap -= delta;
        inner += delta;
    } else if gap > 1 {
        inner += gap - 1;
        gap = 1;
    }

    if rounded {
        // Widen the gap slightly by borrowing from the outer band.
        let delta_gap = (fwf * 0.1).round().max(1.0) as i32;
        if outer > delta_gap + 1 {
            outer -= delta_gap;
            gap += delta_gap;
        }
    } else {
        // Thicken the outer band by borrowing from the gap.
        let delta_outer = (fwf * 0.1).round().max(1.0) as i32;
        if gap > delta_outer {
            gap -= delta_outer;
            outer += delta_outer;
        } else if gap > 1 {
            outer += gap - 1;
            gap = 1;
        } else if inner > 1 {
            outer += 1;
            inner -= 1;
        }
        // Give the gap 1px of breathing room back from the inner band.
        if inner > 2 {
            inner -= 1;
            gap += 1;
        }
    }

    (outer, gap, inner)
}

/// What to do with one band pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BandAction {
    /// Paint with the frame fill.
    Paint,
    /// Clear to the background color.
    Clear,
    /// Leave the canvas as initialized.
    Keep,
}

/// Precomputed pattern state for one frame pass. Classification itself is a
/// pure function of pixel coordinates, so pixels may be evaluated in any
/// order.
struct BandClassifier {
    w: i32,
    h: i32,
    fw: i32,
    kind: FrameKind,
    rounded: bool,
    // Double-pattern band widths (outer, gap, inner).
    bands: (i32, i32, i32),
}

impl BandClassifier {
    fn new(w: i32, h: i32, fw: i32, style: FrameStyle) -> Self {
        Self {
            w,
            h,
            fw,
            kind: style.kind,
            rounded: style.rounded,
            bands: double_bands(fw, style.rounded),
        }
    }

    fn classify(&self, x: i32, y: i32) -> BandAction {
        match self.kind {
            FrameKind::None => BandAction::Keep,
            FrameKind::Simple => BandAction::Paint,
            FrameKind::Dashed => self.classify_dashed(x, y),
            FrameKind::Dotted => self.classify_dotted(x, y),
            FrameKind::Irregular => self.classify_irregular(x, y),
            FrameKind::Double => self.classify_double(x, y),
            FrameKind::Diagonal => self.classify_diagonal(x, y),
            FrameKind::Grid => self.classify_grid(x, y),
        }
    }

    fn in_corner_square(&self, x: i32, y: i32) -> bool {
        let c = self.fw;
        (x < c || x >= self.w - c) && (y < c || y >= self.h - c)
    }

    fn classify_dashed(&self, x: i32, y: i32) -> BandAction {
        let dash = (self.fw * 3).max(6);
        let gap = dash / 2;
        let total = dash + gap;
        let corner = self.fw;

        if self.in_corner_square(x, y) {
            return BandAction::Paint;
        }
        if (y < self.fw || y >= self.h - self.fw)
            && x >= corner
            && x < self.w - corner
            && (x - corner) % total < dash
        {
            return BandAction::Paint;
        }
        if (x < self.fw || x >= self.w - self.fw)
            && y >= corner
            && y < self.h - corner
            && (y - corner) % total < dash
        {
            return BandAction::Paint;
        }
        BandAction::Keep
    }

    fn classify_dotted(&self, x: i32, y: i32) -> BandAction {
        let spacing = self.fw.max(6);
        let radius = (self.fw / 3).max(2);

        // Solid band with circular perforations punched along the mid-line
        // of each edge, postage-stamp style.
        if y < self.fw || y >= self.h - self.fw {
            if x % spacing < radius * 2 {
                let cx = (x / spacing) * spacing + radius;
                let cy = if y >= self.h - self.fw {
                    self.h - self.fw / 2
                } else {
                    self.fw / 2
                };
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy <= radius * radius {
                    return BandAction::Clear;
                }
            }
        } else if x < self.fw || x >= self.w - self.fw {
            if y % spacing < radius * 2 {
                let cy = (y / spacing) * spacing + radius;
                let cx = if x >= self.w - self.fw {
                    self.w - self.fw / 2
                } else {
                    self.fw / 2
                };
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy <= radius * radius {
                    return BandAction::Clear;
                }
            }
        }
        BandAction::Paint
    }

    fn classify_irregular(&self, x: i32, y: i32) -> BandAction {
        let corner = self.fw;
        if self.in_corner_square(x, y) {
            return BandAction::Paint;
        }

        // Dash/gap lengths vary pseudo-randomly per position; the hash is a
        // pure function of the coordinate so renders are reproducible.
        let irregular_dash = |coord: i32| -> bool {
            let hash = (coord * 13) % 17;
            let dash = 4 + hash % 8;
            let gap = 2 + hash % 4;
            (coord - corner) % (dash + gap) < dash
        };

        if (y < self.fw || y >= self.h - self.fw)
            && x >= corner
            && x < self.w - corner
            && irregular_dash(x)
        {
            return BandAction::Paint;
        }
        if (x < self.fw || x >= self.w - self.fw)
            && y >= corner
            && y < self.h - corner
            && irregular_dash(y)
        {
            return BandAction::Paint;
        }
        BandAction::Keep
    }

    fn classify_double(&self, x: i32, y: i32) -> BandAction {
        let (outer, gap, inner) = self.bands;

        if !self.rounded {
            let edge_dist = x.min(y).min(self.w - 1 - x).min(self.h - 1 - y);
            if edge_dist < outer {
                return BandAction::Paint;
            }
            if edge_dist < outer + gap {
                return BandAction::Clear;
            }
            if edge_dist < outer + gap + inner {
                return BandAction::Paint;
            }
            return BandAction::Keep;
        }

        // Rounded: three concentric rounded-rectangle rings grown outward
        // from the inner boundary.
        let (in_l, in_t) = (self.fw, self.fw);
        let (in_r, in_b) = (self.w - 1 - self.fw, self.h - 1 - self.fw);
        let base_r = (f64::from(self.fw) * 0.55).round() as i32;

        let clamp_x = |v: i32| v.clamp(0, self.w - 1);
        let clamp_y = |v: i32| v.clamp(0, self.h - 1);
        let ring = |off: i32| {
            (
                clamp_x(in_l - off),
                clamp_y(in_t - off),
                clamp_x(in_r + off),
                clamp_y(in_b + off),
                base_r + off,
            )
        };
        let inside = |(l, t, r, b, rad): (i32, i32, i32, i32, i32)| {
            inside_rounded_rect(x, y, l, t, r, b, rad)
        };

        let inner_ring = ring(inner);
        let gap_ring = ring(inner + gap);
        let outer_ring = ring(inner + gap + outer);

        let in_core = inside_rounded_rect(x, y, in_l, in_t, in_r, in_b, base_r);
        if inside(outer_ring) && !inside(gap_ring) {
            return BandAction::Paint;
        }
        if inside(gap_ring) && !inside(inner_ring) {
            return BandAction::Clear;
        }
        if inside(inner_ring) && !in_core {
            return BandAction::Paint;
        }
        BandAction::Keep
    }

    fn classify_diagonal(&self, x: i32, y: i32) -> BandAction {
        let spacing = (self.fw / 2).max(2);
        let mut thickness = (self.fw / 5).max(2);
        if thickness >= spacing {
            thickness = (spacing - 1).max(1);
        }
        if (x + y) % spacing < thickness {
            BandAction::Paint
        } else {
            BandAction::Keep
        }
    }

    fn classify_grid(&self, x: i32, y: i32) -> BandAction {
        let cell = (self.fw / 3).max(2);
        if (x / cell + y / cell) % 2 == 0 {
            BandAction::Paint
        } else {
            BandAction::Keep
        }
    }
}

/// Enlarge the canvas by `frame_px` per side and paint the decorative frame
/// band, then re-draw the QR content in the center. Rounded variants get
/// their corners carved afterward.
pub fn add_frame(
    img: RgbaImage,
    style: FrameStyle,
    frame_px: u32,
    background: Rgba<u8>,
    fill: &ColorSpec,
) -> RgbaImage {
    if style.kind == FrameKind::None || frame_px == 0 {
        return img;
    }

    let (ow, oh) = img.dimensions();
    let (w, h) = (ow + frame_px * 2, oh + frame_px * 2);
    debug!(frame_px, kind = ?style.kind, rounded = style.rounded, w, h, "Adding frame");

    let mut framed = if background.0[3] == 0 {
        RgbaImage::new(w, h)
    } else {
        RgbaImage::from_pixel(w, h, background)
    };

    let classifier = BandClassifier::new(w as i32, h as i32, frame_px as i32, style);
    for y in 0..h {
        for x in 0..w {
            let in_band = x < frame_px || x >= w - frame_px || y < frame_px || y >= h - frame_px;
            if !in_band {
                continue;
            }
            match classifier.classify(x as i32, y as i32) {
                BandAction::Paint => {
                    let color = fill.color_at(x, y, w, h);
                    framed.put_pixel(x, y, color);
                }
                BandAction::Clear => framed.put_pixel(x, y, background),
                BandAction::Keep => {}
            }
        }
    }

    for (x, y, pixel) in img.enumerate_pixels() {
        framed.put_pixel(x + frame_px, y + frame_px, *pixel);
    }

    if style.rounded {
        carve_rounded(&mut framed, &FrameGeometry::new(frame_px), background);
    }
    framed
}

/// Carve the frame band into a continuous rounded ring: cut the outer
/// corners to the outer rounded silhouette (cleared to transparent) and
/// carve a rounded notch from the inner side of the band (cleared to the
/// background so it matches the padding).
pub fn carve_rounded(img: &mut RgbaImage, geometry: &FrameGeometry, background: Rgba<u8>) {
    let (w, h) = img.dimensions();
    let (w, h) = (w as i32, h as i32);
    let fw = geometry.frame_px as i32;

    let inner_clear = if background.0[3] == 0 {
        TRANSPARENT
    } else {
        background
    };

    let cut = geometry.cut();
    let carve_l = (fw - cut).max(0);
    let carve_t = (fw - cut).max(0);
    let carve_r = (w - 1 - fw + cut).min(w - 1);
    let carve_b = (h - 1 - fw + cut).min(h - 1);

    for y in 0..h {
        for x in 0..w {
            let in_band = x < fw || x >= w - fw || y < fw || y >= h - fw;
            if !in_band {
                continue;
            }
            if !inside_rounded_rect(x, y, 0, 0, w - 1, h - 1, geometry.outer_radius) {
                img.put_pixel(x as u32, y as u32, TRANSPARENT);
                continue;
            }
            if inside_rounded_rect(x, y, carve_l, carve_t, carve_r, carve_b, geometry.carve_radius)
            {
                img.put_pixel(x as u32, y as u32, inner_clear);
            }
        }
    }
}
