//! Parameter resolution — raw string parameters to typed rendering values.
//!
//! Everything except the target URL resolves leniently: malformed colors,
//! shapes, and patterns fall back to documented defaults instead of erroring,
//! so a render always succeeds once the URL itself is valid.

use std::collections::HashMap;

use image::Rgba;

use crate::color::{ColorSpec, GradientSpec};
use crate::{CompositorError, Result};

/// Default foreground: black.
pub const DEFAULT_FG: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Default background: white.
pub const DEFAULT_BG: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Default gradient middle stop: mid gray.
pub const DEFAULT_GRADIENT_MIDDLE: Rgba<u8> = Rgba([128, 128, 128, 255]);

/// Default gradient end stop: red.
pub const DEFAULT_GRADIENT_END: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Maximum accepted URL length.
const MAX_URL_LEN: usize = 4096;

/// Parse a hex color parameter, falling back to `default` on any malformed
/// input. Accepts `RRGGBB` with an optional leading `#`; the literal
/// `transparent` yields a fully transparent color. This never errors.
pub fn parse_color(raw: &str, default: Rgba<u8>) -> Rgba<u8> {
    if raw.is_empty() {
        return default;
    }
    if raw.eq_ignore_ascii_case("transparent") {
        return Rgba([0, 0, 0, 0]);
    }

    let hex = raw.strip_prefix('#').unwrap_or(raw);
    if hex.len() != 6 || !hex.is_ascii() {
        return default;
    }

    let r = u8::from_str_radix(&hex[0..2], 16);
    let g = u8::from_str_radix(&hex[2..4], 16);
    let b = u8::from_str_radix(&hex[4..6], 16);

    match (r, g, b) {
        (Ok(r), Ok(g), Ok(b)) => Rgba([r, g, b, 255]),
        _ => default,
    }
}

/// Validate and normalize a URL for QR generation.
///
/// Trims whitespace, defaults a missing scheme to `https://`, and requires an
/// http/https scheme with a non-empty host.
pub fn normalize_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CompositorError::MissingUrl);
    }

    let url = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    if url.len() > MAX_URL_LEN {
        return Err(CompositorError::UrlTooLong);
    }

    let (scheme, rest) = url
        .split_once("://")
        .ok_or(CompositorError::UnsupportedScheme)?;
    if scheme != "http" && scheme != "https" {
        return Err(CompositorError::UnsupportedScheme);
    }

    // Host is everything up to the first path/query/fragment delimiter,
    // minus userinfo and port.
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host_port = authority.rsplit('@').next().unwrap_or("");
    let host = host_port.split(':').next().unwrap_or("");
    if host.is_empty() {
        return Err(CompositorError::MissingHost);
    }

    Ok(url)
}

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpg,
    Svg,
}

impl OutputFormat {
    /// Parse a format parameter; `jpeg` is an alias for `jpg`, anything
    /// unrecognized falls back to PNG.
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "jpg" | "jpeg" => Self::Jpg,
            "svg" => Self::Svg,
            _ => Self::Png,
        }
    }

    /// MIME type for this format.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
            Self::Svg => "image/svg+xml",
        }
    }
}

/// Target-resolution tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Preview,
    Download,
}

impl SizeClass {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "download" => Self::Download,
            _ => Self::Preview,
        }
    }

    /// Pixels per QR module at this tier.
    pub fn module_px(self) -> u32 {
        match self {
            Self::Preview => crate::PREVIEW_MODULE_PX,
            Self::Download => crate::DOWNLOAD_MODULE_PX,
        }
    }
}

/// How a single dark module is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleShape {
    /// Fill the entire module cell.
    Rectangle,
    /// Inscribed circle.
    Circle,
    /// Blob whose corners round only where no dark neighbor touches.
    Liquid,
    /// Rounded core with bridges toward dark neighbors.
    Chain,
    /// Horizontal bar covering 85% of the cell height.
    HStripe,
    /// Vertical bar covering 85% of the cell width.
    VStripe,
}

impl ModuleShape {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "circle" => Self::Circle,
            "liquid" => Self::Liquid,
            "chain" => Self::Chain,
            "hstripe" => Self::HStripe,
            "vstripe" => Self::VStripe,
            _ => Self::Rectangle,
        }
    }
}

/// Decorative frame stroke pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    None,
    Simple,
    Dashed,
    Dotted,
    Irregular,
    Double,
    Diagonal,
    Grid,
}

impl FrameKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "dashed" => Self::Dashed,
            "dotted" => Self::Dotted,
            "irregular" => Self::Irregular,
            "double" => Self::Double,
            "diagonal" => Self::Diagonal,
            "grid" => Self::Grid,
            _ => Self::Simple,
        }
    }
}

/// Frame pattern plus straight/rounded variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStyle {
    pub kind: FrameKind,
    pub rounded: bool,
}

impl FrameStyle {
    /// Combine the `cornerStyle` and `borderPattern` parameters.
    ///
    /// `cornerStyle=none` disables the frame entirely; `rounded` selects the
    /// rounded variant of the chosen pattern; anything else keeps the pattern
    /// straight.
    pub fn resolve(corner_style: &str, border_pattern: &str) -> Self {
        match corner_style {
            "none" => Self {
                kind: FrameKind::None,
                rounded: false,
            },
            "rounded" => Self {
                kind: FrameKind::parse(border_pattern),
                rounded: true,
            },
            _ => Self {
                kind: FrameKind::parse(border_pattern),
                rounded: false,
            },
        }
    }

    /// Frame width as a percentage of the logical QR size. Rounded frames
    /// start thicker so the stroke stays visually strong after the inner
    /// carve (effective ~4% afterward).
    pub fn width_percent(self) -> u32 {
        if self.rounded { 6 } else { 4 }
    }
}

/// Fully resolved rendering parameters for one request.
#[derive(Debug, Clone)]
pub struct ResolvedParams {
    /// Module fill: flat color or three-stop diagonal gradient.
    pub fill: ColorSpec,
    /// Canvas background; alpha 0 requests a transparent render.
    pub background: Rgba<u8>,
    /// Frame stroke fill. Follows the gradient in gradient mode, otherwise
    /// the `borderColor` parameter (default: the foreground color).
    pub frame_fill: ColorSpec,
    pub shape: ModuleShape,
    pub frame: FrameStyle,
    /// Whether to composite a centered logo onto the finished bitmap.
    pub center_logo: bool,
}

impl ResolvedParams {
    /// Resolve a raw key/value parameter bag. Parameter-level problems never
    /// fail resolution; each value independently falls back to its default.
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        let get = |key: &str| query.get(key).map(String::as_str).unwrap_or("");

        let background = parse_color(get("bg"), DEFAULT_BG);

        let fill = if get("colorMode") == "gradient" {
            ColorSpec::Gradient(GradientSpec::new(
                parse_color(get("gradientStart"), DEFAULT_FG),
                parse_color(get("gradientMiddle"), DEFAULT_GRADIENT_MIDDLE),
                parse_color(get("gradientEnd"), DEFAULT_GRADIENT_END),
            ))
        } else {
            ColorSpec::Flat(parse_color(get("fg"), DEFAULT_FG))
        };

        // Gradient frames follow the module gradient; flat frames use the
        // border color, defaulting to the foreground.
        let frame_fill = match &fill {
            ColorSpec::Gradient(g) => ColorSpec::Gradient(*g),
            ColorSpec::Flat(fg) => {
                let border_color = get("borderColor");
                if border_color.is_empty() {
                    ColorSpec::Flat(*fg)
                } else {
                    ColorSpec::Flat(parse_color(border_color, DEFAULT_FG))
                }
            }
        };

        let corner_style = query
            .get("cornerStyle")
            .map(String::as_str)
            .unwrap_or("none");
        let border_pattern = query
            .get("borderPattern")
            .map(String::as_str)
            .unwrap_or("simple");

        Self {
            fill,
            background,
            frame_fill,
            shape: ModuleShape::parse(get("qrShape")),
            frame: FrameStyle::resolve(corner_style, border_pattern),
            center_logo: get("centerLogo") == "true",
        }
    }
}
