use crate::error::{RespirationError, Result};
use log::trace;

/// Nominal capture rate; one frame in this many is processed, so the filter
/// runs at roughly 1 Hz.
pub const DEFAULT_DECIMATION_FACTOR: u64 = 60;

/// Decimates the incoming frame stream to a fixed processing rate.
///
/// Frames are counted from 0. A frame is selected when its 0-based call index
/// is a multiple of the decimation factor, so the first frame of a session is
/// always processed, followed by indices `factor`, `2 * factor`, ...
#[derive(Debug, Clone)]
pub struct FrameSampler {
    decimation_factor: u64,
    frames_seen: u64,
}

impl FrameSampler {
    pub fn new(decimation_factor: u64) -> Result<Self> {
        if decimation_factor == 0 {
            return Err(RespirationError::InvalidDecimation(decimation_factor));
        }
        Ok(Self {
            decimation_factor,
            frames_seen: 0,
        })
    }

    /// Count one offered frame. Returns the frame's index when it is selected
    /// for processing, `None` when it is dropped.
    pub fn offer(&mut self) -> Option<u64> {
        let index = self.frames_seen;
        self.frames_seen += 1;
        if index % self.decimation_factor == 0 {
            trace!("Frame {} selected for processing", index);
            Some(index)
        } else {
            None
        }
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    pub fn reset(&mut self) {
        self.frames_seen = 0;
    }
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self {
            decimation_factor: DEFAULT_DECIMATION_FACTOR,
            frames_seen: 0,
        }
    }
}
