use crate::error::{RespirationError, Result};
use ndarray::{s, ArrayView2, ArrayView3, Axis, ShapeBuilder};

/// Number of colour channels the pipeline sums per pixel.
pub const CHANNELS: usize = 3;

/// Borrowed view of one captured frame, shaped `(rows, cols, 3)`.
///
/// Channel order (RGB or BGR) is whatever the producer delivered; the
/// intensity reduction only sums the three channels. A `FrameBuffer` can only
/// be built through the validating constructors below, so every instance has
/// at least one row and one column.
#[derive(Debug, Clone, Copy)]
pub struct FrameBuffer<'a> {
    pixels: ArrayView3<'a, u8>,
}

impl<'a> FrameBuffer<'a> {
    /// Wrap an existing view. The last axis must hold exactly three channels.
    pub fn from_view(pixels: ArrayView3<'a, u8>) -> Result<Self> {
        let (rows, cols, channels) = pixels.dim();
        if channels != CHANNELS {
            return Err(RespirationError::InvalidFrame(format!(
                "expected {} channels per pixel, got {}",
                CHANNELS, channels
            )));
        }
        check_extent(rows, cols)?;
        Ok(Self { pixels })
    }

    /// Tightly packed 8-bit RGB (or BGR) data, row-major.
    pub fn from_rgb(rows: usize, cols: usize, data: &'a [u8]) -> Result<Self> {
        check_extent(rows, cols)?;
        let expected = rows
            .checked_mul(cols)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or_else(|| oversized(rows, cols))?;
        if data.len() != expected {
            return Err(RespirationError::InvalidFrame(format!(
                "{}x{} RGB frame needs {} bytes, got {}",
                rows,
                cols,
                expected,
                data.len()
            )));
        }
        let pixels = ArrayView3::from_shape((rows, cols, CHANNELS), data)
            .map_err(|e| RespirationError::InvalidFrame(e.to_string()))?;
        Self::from_view(pixels)
    }

    /// 32-bit BGRA data as delivered by most camera stacks, with
    /// `bytes_per_row >= cols * 4` to allow for row padding. Alpha is sliced
    /// away without copying.
    pub fn from_bgra(rows: usize, cols: usize, bytes_per_row: usize, data: &'a [u8]) -> Result<Self> {
        check_extent(rows, cols)?;
        let row_bytes = cols.checked_mul(4).ok_or_else(|| oversized(rows, cols))?;
        if bytes_per_row < row_bytes {
            return Err(RespirationError::InvalidFrame(format!(
                "row stride {} is shorter than {} BGRA pixels",
                bytes_per_row, cols
            )));
        }
        let needed = (rows - 1)
            .checked_mul(bytes_per_row)
            .and_then(|n| n.checked_add(row_bytes))
            .ok_or_else(|| oversized(rows, cols))?;
        if data.len() < needed {
            return Err(RespirationError::InvalidFrame(format!(
                "{}x{} BGRA frame needs {} bytes, got {}",
                rows,
                cols,
                needed,
                data.len()
            )));
        }
        let bgra = ArrayView3::from_shape((rows, cols, 4).strides((bytes_per_row, 4, 1)), data)
            .map_err(|e| RespirationError::InvalidFrame(e.to_string()))?;
        Self::from_view(bgra.slice_move(s![.., .., ..CHANNELS]))
    }

    pub fn rows(&self) -> usize {
        self.pixels.len_of(Axis(0))
    }

    pub fn cols(&self) -> usize {
        self.pixels.len_of(Axis(1))
    }

    /// Rows in order, each shaped `(cols, 3)`.
    pub fn row_views(&self) -> impl Iterator<Item = ArrayView2<'_, u8>> + '_ {
        self.pixels.outer_iter()
    }
}

fn oversized(rows: usize, cols: usize) -> RespirationError {
    RespirationError::InvalidFrame(format!(
        "{}x{} frame does not fit in memory",
        rows, cols
    ))
}

fn check_extent(rows: usize, cols: usize) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Err(RespirationError::InvalidFrame(format!(
            "frame must have at least one row and column, got {}x{}",
            rows, cols
        )));
    }
    Ok(())
}
