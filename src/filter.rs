//! 8th-order Butterworth band-pass for the respiration band.
//!
//! Coefficients were designed offline for the pipeline's effective 1 Hz
//! sample rate (one processed frame per second of 60 fps video) and are not
//! configurable. The filter keeps its history across frames, so a session must
//! drive exactly one instance.
//!
//! A freshly built filter starts from all-zero history. The first outputs of a
//! session are therefore a start-up transient; nothing tries to hide it.

/// Filter order; both history windows hold `ORDER + 1` samples.
pub const ORDER: usize = 8;
const TAPS: usize = ORDER + 1;

const GAIN: f64 = 1.232232910e+02;

/// Feedback coefficients applied to the previous outputs, oldest first.
const POLES: [f64; ORDER] = [
    -0.1397436053,
    1.2948188815,
    -5.4070037946,
    13.2683981280,
    -20.9442560520,
    21.7932169160,
    -14.5817197500,
    5.7161939252,
];

/// Stateful IIR band-pass filter applied sample by sample.
///
/// Output depends on every sample pushed so far, in order.
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    inputs: [f64; TAPS],
    outputs: [f64; TAPS],
    samples_seen: u64,
}

impl BandpassFilter {
    pub fn new() -> Self {
        Self {
            inputs: [0.0; TAPS],
            outputs: [0.0; TAPS],
            samples_seen: 0,
        }
    }

    /// Feed one sample and return the newest output.
    pub fn push(&mut self, sample: f64) -> f64 {
        self.inputs.copy_within(1.., 0);
        self.inputs[ORDER] = sample / GAIN;
        self.outputs.copy_within(1.., 0);

        let x = &self.inputs;
        let zeros = (x[0] + x[8]) - 4.0 * (x[2] + x[6]) + 6.0 * x[4];
        let poles: f64 = POLES
            .iter()
            .zip(self.outputs.iter())
            .map(|(a, y)| a * y)
            .sum();

        let output = zeros + poles;
        self.outputs[ORDER] = output;
        self.samples_seen += 1;
        output
    }

    /// Feed a whole trace in order, returning one output per sample.
    pub fn filter_trace(&mut self, samples: &[f64]) -> Vec<f64> {
        samples.iter().map(|&s| self.push(s)).collect()
    }

    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }
}

impl Default for BandpassFilter {
    fn default() -> Self {
        Self::new()
    }
}
