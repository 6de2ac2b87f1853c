use crate::sampler::DEFAULT_DECIMATION_FACTOR;
use anyhow::{bail, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Longest breathing rate window accepted on the command line (one day).
pub const MAX_BR_WINDOW_SECONDS: f64 = 86_400.0;

/// Nominal camera frame rate the capture sessions run at.
pub const DEFAULT_CAPTURE_FPS: f64 = 60.0;

/// Settings for one detection session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Process one frame in this many; equals the capture rate so the filter
    /// sees one sample batch per second.
    pub decimation_factor: u64,
    /// Capture rate in frames per second, used to place frames in time.
    pub capture_fps: f64,
}

impl DetectorConfig {
    /// Rate at which processed frames (and therefore updates) arrive.
    pub fn update_rate(&self) -> f64 {
        self.capture_fps / self.decimation_factor as f64
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            decimation_factor: DEFAULT_DECIMATION_FACTOR,
            capture_fps: DEFAULT_CAPTURE_FPS,
        }
    }
}

/// Extract a respiration signal from recorded camera captures
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Capture file (.cap) or directory searched recursively for capture files
    #[arg(help = "Capture file (.cap) or directory containing capture files")]
    pub input_path: PathBuf,

    /// Process one frame in this many
    #[arg(long, env = "RESPIRATION_DECIMATION", default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
    pub decimation_factor: u64,

    /// Nominal capture frame rate in frames per second
    #[arg(long, default_value = "60.0")]
    pub capture_fps: f64,

    /// Breathing rate window size in seconds
    #[arg(long, default_value = "60.0")]
    pub br_window_seconds: f64,

    /// CSV output file for respiration updates
    #[arg(long)]
    pub csv_output: Option<PathBuf>,

    /// JSON-lines output file for respiration updates
    #[arg(long)]
    pub json_output: Option<PathBuf>,
}

impl Args {
    /// Reject numeric arguments clap cannot range-check.
    pub fn validate(&self) -> Result<()> {
        if !(self.capture_fps.is_finite() && self.capture_fps > 0.0) {
            bail!("Capture frame rate must be positive, got {}", self.capture_fps);
        }
        // NaN fails both comparisons
        if !(self.br_window_seconds > 0.0 && self.br_window_seconds <= MAX_BR_WINDOW_SECONDS) {
            bail!(
                "Breathing rate window must be within (0, {}] seconds, got {}",
                MAX_BR_WINDOW_SECONDS,
                self.br_window_seconds
            );
        }
        Ok(())
    }

    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            decimation_factor: self.decimation_factor,
            capture_fps: self.capture_fps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["rppg-respiration", "captures"]).unwrap();
        let config = args.detector_config();
        assert_eq!(config, DetectorConfig::default());
        assert_eq!(config.update_rate(), 1.0);
        assert!(args.csv_output.is_none());
    }

    #[test]
    fn test_window_and_rate_validated() {
        fn parse(extra: &[&str]) -> Args {
            let mut argv: Vec<&str> = vec!["rppg-respiration", "captures"];
            argv.extend_from_slice(extra);
            Args::try_parse_from(argv).unwrap()
        }

        assert!(parse(&[]).validate().is_ok());
        assert!(parse(&["--br-window-seconds", "NaN"]).validate().is_err());
        assert!(parse(&["--br-window-seconds", "inf"]).validate().is_err());
        assert!(parse(&["--br-window-seconds", "1e300"]).validate().is_err());
        assert!(parse(&["--br-window-seconds", "0"]).validate().is_err());
        assert!(parse(&["--capture-fps", "0"]).validate().is_err());
        assert!(parse(&["--capture-fps", "inf"]).validate().is_err());
    }

    #[test]
    fn test_zero_decimation_rejected() {
        let parsed = Args::try_parse_from([
            "rppg-respiration",
            "captures",
            "--decimation-factor",
            "0",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = DetectorConfig {
            decimation_factor: 30,
            capture_fps: 30.0,
        };
        let text = serde_json::to_string(&config).unwrap();
        let back: DetectorConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
