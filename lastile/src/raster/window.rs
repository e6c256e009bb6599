//! Pixel windows on the ground-aligned grid of a resolution.

use super::MosaicError;
use crate::extent::Extent;

/// Tolerance, in pixels, when aligning an extent on the pixel grid.
const ALIGN_EPSILON: f64 = 1e-6;

/// A rectangle of whole pixels.
///
/// Pixel indices are global: column `c` covers `[c * res, (c + 1) * res]`
/// in x, and `top` is the index of the north edge, so image row `r` of the
/// window covers `[(top - r - 1) * res, (top - r) * res]` in y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelWindow {
    pub col: i64,
    pub top: i64,
    pub width: u32,
    pub height: u32,
}

impl PixelWindow {
    /// Smallest window covering `extent`, at least one pixel on each axis.
    pub fn covering(extent: &Extent, resolution: f64) -> Result<Self, MosaicError> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(MosaicError::InvalidRequest(format!(
                "resolution must be positive, got {}",
                resolution
            )));
        }

        let col = (extent.xmin / resolution + ALIGN_EPSILON).floor();
        let right = (extent.xmax / resolution - ALIGN_EPSILON).ceil();
        let bottom = (extent.ymin / resolution + ALIGN_EPSILON).floor();
        let top = (extent.ymax / resolution - ALIGN_EPSILON).ceil();

        let width = (right - col).max(1.0);
        let height = (top - bottom).max(1.0);
        if width > u32::MAX as f64 || height > u32::MAX as f64 {
            return Err(MosaicError::InvalidRequest(format!(
                "{}x{} pixels is too large",
                width, height
            )));
        }

        Ok(Self {
            col: col as i64,
            top: top as i64,
            width: width as u32,
            height: height as u32,
        })
    }

    /// Ground extent of the window.
    pub fn extent(&self, resolution: f64) -> Extent {
        Extent {
            xmin: self.col as f64 * resolution,
            xmax: (self.col + self.width as i64) as f64 * resolution,
            ymin: (self.top - self.height as i64) as f64 * resolution,
            ymax: self.top as f64 * resolution,
        }
    }

    /// Position of `inner` in this window, as image `(x, y)` offsets.
    pub fn offset_of(&self, inner: &PixelWindow) -> (u32, u32) {
        (
            (inner.col - self.col).max(0) as u32,
            (self.top - inner.top).max(0) as u32,
        )
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Splits the window in blocks of at most `max_size` pixels per axis.
    ///
    /// Blocks have almost equal sizes, the last one on each axis being
    /// trimmed. They are listed row by row from the north-west corner and
    /// cover the window exactly, without overlap.
    pub fn partition(&self, max_size: u32) -> Vec<PixelWindow> {
        let columns = axis_cells(self.width, max_size);
        let rows = axis_cells(self.height, max_size);

        let mut blocks = Vec::with_capacity(columns.len() * rows.len());
        for &(y, height) in &rows {
            for &(x, width) in &columns {
                blocks.push(PixelWindow {
                    col: self.col + x as i64,
                    top: self.top - y as i64,
                    width,
                    height,
                });
            }
        }
        blocks
    }
}

/// Cells of one axis: `n_cells = ceil(n / max)`, `cell = ceil(n / n_cells)`.
fn axis_cells(n_pixels: u32, max_size: u32) -> Vec<(u32, u32)> {
    let max_size = max_size.max(1);
    let n_cells = n_pixels.div_ceil(max_size).max(1);
    let cell = n_pixels.div_ceil(n_cells).max(1);

    let mut cells = Vec::with_capacity(n_cells as usize);
    let mut start = 0;
    while start < n_pixels {
        let size = cell.min(n_pixels - start);
        cells.push((start, size));
        start += size;
    }
    cells
}
