use crate::frame::FrameBuffer;

/// Per-row average intensities of one frame, row 0 first.
pub type IntensityTrace = Vec<f64>;

/// Reduce a frame to one intensity sample per row.
///
/// Each sample is the sum of all three channels over every pixel of the row,
/// divided by the column count with integer (floor) division. A uniform frame
/// of channel value `v` therefore yields `3 * v` for every row.
pub fn reduce_rows(frame: &FrameBuffer) -> IntensityTrace {
    let cols = frame.cols() as u64;
    frame
        .row_views()
        .map(|row| {
            let summed: u64 = row.iter().map(|&c| u64::from(c)).sum();
            (summed / cols) as f64
        })
        .collect()
}
