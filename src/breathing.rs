use log::{debug, trace};
use rustfft::{num_complex::Complex, FftPlanner};
use std::collections::VecDeque;
use std::f64::consts::PI;

/// Breathing band searched for a spectral peak (6-30 breaths per minute).
const MIN_BREATHING_HZ: f64 = 0.1;
const MAX_BREATHING_HZ: f64 = 0.5;

/// Create a Hann window of the specified size
fn create_hann_window(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / size as f64).cos()))
        .collect()
}

/// Estimate breaths per minute from the magnitude peak of a Hann-windowed FFT.
///
/// Returns `None` when the band holds no bin at this resolution or carries no
/// energy.
pub fn breathing_rate_fft(signal: &[f64], sample_rate: f64) -> Option<f64> {
    if signal.len() < 4 || sample_rate <= 0.0 {
        return None;
    }

    // Apply Hann window and convert to complex numbers
    let window = create_hann_window(signal.len());
    let mut buffer: Vec<Complex<f64>> = signal
        .iter()
        .zip(window.iter())
        .map(|(&s, &w)| Complex::new(s * w, 0.0))
        .collect();

    // Perform FFT
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);

    // Bins covering the breathing band, capped at Nyquist

    let freq_resolution = sample_rate / signal.len() as f64;
    let nyquist_bin = signal.len() / 2;
    let min_bin = (MIN_BREATHING_HZ / freq_resolution).ceil() as usize;
    let max_bin = ((MAX_BREATHING_HZ / freq_resolution).floor() as usize).min(nyquist_bin);
    if min_bin == 0 || min_bin > max_bin {
        debug!(
            "No breathing band bins at {:.4} Hz resolution",
            freq_resolution
        );
        return None;
    }

    // Find peak in breathing rate range
    let mut max_magnitude = 0.0;
    let mut peak_bin = None;
    for (bin, value) in buffer.iter().enumerate().take(max_bin + 1).skip(min_bin) {
        let magnitude = value.norm();
        if magnitude > max_magnitude {
            max_magnitude = magnitude;
            peak_bin = Some(bin);
        }
    }

    // Convert peak frequency to breaths per minute
    let peak_bin = peak_bin?;
    let breaths_per_minute = peak_bin as f64 * freq_resolution * 60.0;
    trace!(
        "Breathing peak at bin {} ({:.1} breaths/min, magnitude {:.3})",
        peak_bin,
        breaths_per_minute,
        max_magnitude
    );
    Some(breaths_per_minute)
}

/// Sliding-window breathing rate over the delivered respiration values.
#[derive(Debug, Clone)]
pub struct BreathingRateEstimator {
    sample_rate: f64,
    window_len: usize,
    values: VecDeque<f64>,
}

impl BreathingRateEstimator {
    /// `sample_rate` is the update rate of the detector; the window spans
    /// `window_seconds` of updates.
    pub fn new(sample_rate: f64, window_seconds: f64) -> Self {
        let window_len = ((sample_rate * window_seconds).round() as usize).max(4);
        Self {
            sample_rate,
            window_len,
            values: VecDeque::new(),
        }
    }

    /// Add one respiration value; returns an estimate once the window is full.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        // Slide the window forward by one update
        if self.values.len() == self.window_len {
            self.values.pop_front();
        }
        self.values.push_back(value);
        if self.values.len() < self.window_len {
            return None;
        }
        breathing_rate_fft(self.values.make_contiguous(), self.sample_rate)
    }

    pub fn window_len(&self) -> usize {
        self.window_len
    }
}
