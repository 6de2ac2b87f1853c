use crate::config::DetectorConfig;
use crate::error::Result;
use crate::filter::BandpassFilter;
use crate::frame::FrameBuffer;
use crate::intensity::reduce_rows;
use crate::normalize::z_score;
use crate::sampler::FrameSampler;
use crate::sink::RespirationSink;
use log::{debug, warn};

/// Result of one processed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RespirationUpdate {
    /// 0-based index of the frame within the session.
    pub at_frame: u64,
    /// Latest respiration value, the one delivered to the sink.
    pub signal_value: f64,
    /// Z-scored filter output for every row of the frame.
    pub signal: Vec<f64>,
}

/// One respiration detection session.
///
/// Owns the decimating sampler, the band-pass filter whose history spans the
/// whole session, and the sink that receives updates. Calls must be
/// serialized by the caller; give each concurrent stream its own detector.
pub struct RespirationDetector<S: RespirationSink> {
    sampler: FrameSampler,
    filter: BandpassFilter,
    sink: S,
}

impl<S: RespirationSink> RespirationDetector<S> {
    pub fn new(config: &DetectorConfig, sink: S) -> Result<Self> {
        Ok(Self {
            sampler: FrameSampler::new(config.decimation_factor)?,
            filter: BandpassFilter::new(),
            sink,
        })
    }

    /// Offer one captured frame.
    ///
    /// Returns `Ok(None)` for frames dropped by decimation. For selected frames
    /// the row trace is filtered, normalized once over the whole frame, and the
    /// last value is handed to the sink before being returned. A degenerate
    /// trace produces no update; filter history keeps the samples either way.
    pub fn on_frame(&mut self, frame: &FrameBuffer) -> Result<Option<RespirationUpdate>> {
        let at_frame = match self.sampler.offer() {
            Some(index) => index,
            None => return Ok(None),
        };

        // Collapse the frame to one intensity per row
        let trace = reduce_rows(frame);

        // Filter history carries over from previous frames
        let filtered = self.filter.filter_trace(&trace);

        // Normalize over the whole frame's filtered trace
        let signal = z_score(&filtered).map_err(|e| {
            warn!("Skipping frame {}: {}", at_frame, e);
            e
        })?;

        // z_score only succeeds on two or more values
        let signal_value = signal[signal.len() - 1];
        debug!(
            "Frame {}: {} rows, respiration signal {:.4}",
            at_frame,
            trace.len(),
            signal_value
        );
        // Deliver the latest value before handing the update back
        self.sink.respiration_update(signal_value, at_frame);

        Ok(Some(RespirationUpdate {
            at_frame,
            signal_value,
            signal,
        }))
    }

    /// Begin a new session: fresh filter history and frame counter.
    pub fn restart(&mut self) {
        debug!(
            "Restarting detection after {} frames",
            self.sampler.frames_seen()
        );
        self.sampler.reset();
        self.filter = BandpassFilter::new();
    }

    /// Signal the end of the session to the sink.
    pub fn stop(&mut self) {
        self.sink.stop_detection();
    }

    pub fn frames_seen(&self) -> u64 {
        self.sampler.frames_seen()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
