//! QR module matrix and the encoding collaborator.
//!
//! The compositor itself never performs QR encoding; this module wraps the
//! `qrcode` crate to produce a read-only boolean grid at Q-level error
//! correction (25% redundancy).

use qrcode::{EcLevel, QrCode};
use tracing::debug;

use crate::{CompositorError, Result};

/// Square boolean grid of QR modules. `true` is a dark module.
#[derive(Debug, Clone)]
pub struct ModuleMatrix {
    dimension: usize,
    modules: Vec<bool>,
}

impl ModuleMatrix {
    /// Build a matrix from row-major module data.
    ///
    /// # Panics
    ///
    /// Panics if `modules.len() != dimension * dimension`.
    pub fn new(dimension: usize, modules: Vec<bool>) -> Self {
        assert_eq!(
            modules.len(),
            dimension * dimension,
            "module data must be square"
        );
        Self { dimension, modules }
    }

    /// Encode a URL at Q-level error correction.
    pub fn from_url(url: &str) -> Result<Self> {
        let code = QrCode::with_error_correction_level(url, EcLevel::Q)
            .map_err(|e| CompositorError::MatrixGeneration(e.to_string()))?;
        let dimension = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|c| c == qrcode::Color::Dark)
            .collect();
        debug!(dimension, "Encoded QR matrix");
        Ok(Self { dimension, modules })
    }

    /// Side length in modules.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Whether the module at `(x, y)` is dark. Out-of-bounds reads are light.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        if x >= self.dimension || y >= self.dimension {
            return false;
        }
        self.modules[y * self.dimension + x]
    }

    /// Number of dark modules.
    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&m| m).count()
    }

    /// Dark-neighbor flags for the module at `(x, y)`:
    /// `[top, right, bottom, left]`.
    pub fn neighbors(&self, x: usize, y: usize) -> [bool; 4] {
        [
            y > 0 && self.is_dark(x, y - 1),
            self.is_dark(x + 1, y),
            self.is_dark(x, y + 1),
            x > 0 && self.is_dark(x - 1, y),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3x3 plus sign: dark cross, light corners.
    fn plus_matrix() -> ModuleMatrix {
        #[rustfmt::skip]
        let modules = vec![
            false, true,  false,
            true,  true,  true,
            false, true,  false,
        ];
        ModuleMatrix::new(3, modules)
    }

    #[test]
    fn from_url_yields_odd_dimension() {
        let m = ModuleMatrix::from_url("https://example.com").unwrap();
        assert!(m.dimension() >= 21);
        assert_eq!(m.dimension() % 2, 1);
        assert!(m.dark_count() > 0);
    }

    #[test]
    fn is_dark_reads_grid() {
        let m = plus_matrix();
        assert!(m.is_dark(1, 1));
        assert!(m.is_dark(0, 1));
        assert!(!m.is_dark(0, 0));
    }

    #[test]
    fn out_of_bounds_is_light() {
        let m = plus_matrix();
        assert!(!m.is_dark(3, 0));
        assert!(!m.is_dark(0, 3));
    }

    #[test]
    fn neighbors_center() {
        let m = plus_matrix();
        assert_eq!(m.neighbors(1, 1), [true, true, true, true]);
        // Top-center module: only a dark neighbor below.
        assert_eq!(m.neighbors(1, 0), [false, false, true, false]);
        // Left-center module: only a dark neighbor to the right.
        assert_eq!(m.neighbors(0, 1), [false, true, false, false]);
    }

    #[test]
    fn dark_count_counts_true_cells() {
        assert_eq!(plus_matrix().dark_count(), 5);
    }

    #[test]
    #[should_panic(expected = "square")]
    fn new_rejects_non_square_data() {
        ModuleMatrix::new(3, vec![true; 8]);
    }
}
