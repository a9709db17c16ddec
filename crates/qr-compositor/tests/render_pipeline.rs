//! End-to-end render scenarios through the public pipeline API.

use std::collections::HashMap;

use image::{GenericImageView, Rgba};
use qr_compositor::{ModuleMatrix, RenderRequest, ResolvedParams, render};

const URL: &str = "https://example.com";

fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn render_with(url: &str, pairs: &[(&str, &str)]) -> qr_compositor::Rendered {
    let q = query(pairs);
    let request = RenderRequest::new(url, &q).unwrap();
    let params = ResolvedParams::from_query(&q);
    render(&request, &params, None).unwrap()
}

#[test]
fn flat_png_preview_uses_exactly_two_colors() {
    let out = render_with(
        URL,
        &[
            ("format", "png"),
            ("size", "preview"),
            ("colorMode", "flat"),
            ("fg", "000000"),
            ("bg", "ffffff"),
            ("cornerStyle", "none"),
        ],
    );
    assert_eq!(out.content_type, "image/png");

    let img = image::load_from_memory(&out.bytes).unwrap();
    let (w, h) = img.dimensions();
    assert_eq!(w, h);

    let rgba = img.to_rgba8();
    for p in rgba.pixels() {
        assert!(
            *p == Rgba([0, 0, 0, 255]) || *p == Rgba([255, 255, 255, 255]),
            "unexpected color {p:?}"
        );
    }
}

#[test]
fn transparent_background_leaves_no_partial_alpha() {
    let out = render_with(
        URL,
        &[("format", "png"), ("bg", "transparent"), ("qrShape", "circle")],
    );
    let rgba = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
    for p in rgba.pixels() {
        let a = p.0[3];
        assert!(a == 0 || a == 255, "partial alpha {a} survived cleanup");
    }
}

#[test]
fn svg_emits_one_circle_per_dark_module() {
    let out = render_with(URL, &[("format", "svg"), ("qrShape", "circle")]);
    assert_eq!(out.content_type, "image/svg+xml");

    let svg = String::from_utf8(out.bytes).unwrap();
    let matrix = ModuleMatrix::from_url(URL).unwrap();
    assert_eq!(svg.matches("<circle").count(), matrix.dark_count());
}

#[test]
fn preview_size_is_exact_with_rounded_frame() {
    let out = render_with(
        URL,
        &[
            ("size", "preview"),
            ("previewSize", "300"),
            ("cornerStyle", "rounded"),
            ("borderPattern", "simple"),
        ],
    );
    let img = image::load_from_memory(&out.bytes).unwrap();
    assert_eq!(img.dimensions(), (300, 300));
}

#[test]
fn preview_size_is_exact_for_arbitrary_targets() {
    for target in ["257", "300", "310", "333"] {
        for corner in ["none", "rounded", "square"] {
            let out = render_with(
                URL,
                &[
                    ("previewSize", target),
                    ("cornerStyle", corner),
                    ("borderPattern", "double"),
                ],
            );
            let img = image::load_from_memory(&out.bytes).unwrap();
            let expected = target.parse::<u32>().unwrap();
            assert_eq!(
                img.dimensions(),
                (expected, expected),
                "target={target} corner={corner}"
            );
        }
    }
}

#[test]
fn jpeg_output_is_opaque_with_white_fallback_background() {
    let out = render_with(URL, &[("format", "jpg"), ("bg", "transparent")]);
    assert_eq!(out.content_type, "image/jpeg");

    let img = image::load_from_memory(&out.bytes).unwrap();
    assert!(!img.color().has_alpha());

    // The transparent background must have been flattened onto white; the
    // padded border is background-only.
    let rgb = img.to_rgb8();
    let corner = rgb.get_pixel(1, 1);
    assert!(corner.0.iter().all(|&c| c > 240), "corner {corner:?}");
}

#[test]
fn jpeg_alias_format_is_accepted() {
    let out = render_with(URL, &[("format", "jpeg")]);
    assert_eq!(out.content_type, "image/jpeg");
    assert_eq!(&out.bytes[..2], &[0xFF, 0xD8]);
}

#[test]
fn gradient_render_round_trips() {
    let out = render_with(
        URL,
        &[
            ("colorMode", "gradient"),
            ("gradientStart", "ff0000"),
            ("gradientMiddle", "00ff00"),
            ("gradientEnd", "0000ff"),
            ("cornerStyle", "square"),
            ("borderPattern", "grid"),
        ],
    );
    let img = image::load_from_memory(&out.bytes).unwrap();
    let (w, h) = img.dimensions();
    assert_eq!(w, h);
}

#[test]
fn bad_urls_are_rejected_before_rendering() {
    for bad in ["", "   ", "ftp://example.com", "https://"] {
        assert!(
            RenderRequest::new(bad, &HashMap::new()).is_err(),
            "url {bad:?} should be rejected"
        );
    }
}
