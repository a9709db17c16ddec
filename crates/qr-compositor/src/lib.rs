//! Decorated QR code image compositor.
//!
//! Takes a QR module matrix and renders it into a fully decorated raster or
//! vector image: module shapes, flat/gradient fills, padding, decorative
//! frames, rounded-corner carving, anti-alias cleanup, and PNG/JPEG/SVG
//! export at exact target pixel dimensions.

pub mod cleanup;
pub mod color;
pub mod encode;
pub mod frame;
pub mod logo;
pub mod matrix;
pub mod params;
pub mod pipeline;
pub mod raster;
pub mod resize;
pub mod svg;

// Re-exports for convenience
pub use color::{ColorSpec, GradientSpec};
pub use frame::FrameGeometry;
pub use matrix::ModuleMatrix;
pub use params::{FrameKind, FrameStyle, ModuleShape, OutputFormat, ResolvedParams, SizeClass};
pub use pipeline::{RenderRequest, Rendered, render};

/// Module pixel size for preview renders (336px target for a typical QR).
pub const PREVIEW_MODULE_PX: u32 = 16;

/// Module pixel size for download renders (~2520px for a typical QR).
pub const DOWNLOAD_MODULE_PX: u32 = 120;

/// Minimum pixel size guaranteed for download renders.
pub const DOWNLOAD_TARGET_PX: u32 = 2000;

/// Fixed quiet-zone padding, as a percentage of the logical QR size.
pub const BORDER_PERCENT: u32 = 7;

/// Recommended cache lifetime for rendered images, in seconds.
pub const CACHE_MAX_AGE_SECS: u32 = 3600;

/// Errors that can occur while rendering a QR image.
#[derive(Debug, thiserror::Error)]
pub enum CompositorError {
    #[error("URL parameter is required")]
    MissingUrl,

    #[error("only http and https URLs are supported")]
    UnsupportedScheme,

    #[error("URL must include a valid host")]
    MissingHost,

    #[error("URL is too long")]
    UrlTooLong,

    #[error("failed to generate QR matrix: {0}")]
    MatrixGeneration(String),

    #[error("failed to encode image: {0}")]
    ImageEncoding(#[from] image::ImageError),

    #[error("logo asset unavailable: {0}")]
    LogoUnavailable(String),
}

/// Machine-readable failure classes, for callers that map errors to a
/// transport-level response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid input from the caller; not retryable.
    BadRequest,
    /// Matrix generation or image serialization failed.
    EncodingFailure,
    /// An optional asset was missing; renders proceed without it.
    ResourceUnavailable,
}

impl CompositorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingUrl | Self::UnsupportedScheme | Self::MissingHost | Self::UrlTooLong => {
                ErrorKind::BadRequest
            }
            Self::MatrixGeneration(_) | Self::ImageEncoding(_) => ErrorKind::EncodingFailure,
            Self::LogoUnavailable(_) => ErrorKind::ResourceUnavailable,
        }
    }
}

/// Result type alias for compositor operations.
pub type Result<T> = std::result::Result<T, CompositorError>;
