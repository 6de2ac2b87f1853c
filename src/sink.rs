use log::info;

/// Receiver of respiration updates, shaped like the heart-rate delegate the
/// surrounding application already implements.
pub trait RespirationSink {
    /// Called once per processed frame with the latest signal value and the
    /// 0-based index of the frame it was computed from.
    fn respiration_update(&mut self, signal_value: f64, at_frame: u64);

    /// Called when the detection session ends.
    fn stop_detection(&mut self) {}
}

/// Adapts a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F> RespirationSink for FnSink<F>
where
    F: FnMut(f64, u64),
{
    fn respiration_update(&mut self, signal_value: f64, at_frame: u64) {
        (self.0)(signal_value, at_frame)
    }
}

impl<S: RespirationSink + ?Sized> RespirationSink for Box<S> {
    fn respiration_update(&mut self, signal_value: f64, at_frame: u64) {
        (**self).respiration_update(signal_value, at_frame)
    }

    fn stop_detection(&mut self) {
        (**self).stop_detection()
    }
}

/// Fan-out: every sink sees every update, in order.
impl RespirationSink for Vec<Box<dyn RespirationSink>> {
    fn respiration_update(&mut self, signal_value: f64, at_frame: u64) {
        for sink in self.iter_mut() {
            sink.respiration_update(signal_value, at_frame);
        }
    }

    fn stop_detection(&mut self) {
        for sink in self.iter_mut() {
            sink.stop_detection();
        }
    }
}

/// Writes every update to the log at info level.
#[derive(Debug, Default)]
pub struct LogSink;

impl RespirationSink for LogSink {
    fn respiration_update(&mut self, signal_value: f64, at_frame: u64) {
        info!("Respiration signal at frame {}: {:.4}", at_frame, signal_value);
    }

    fn stop_detection(&mut self) {
        info!("Respiration detection stopped");
    }
}
