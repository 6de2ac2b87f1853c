use anyhow::{bail, Context};
use clap::Parser;
use log::{debug, info, warn};
use rppg_respiration::breathing::BreathingRateEstimator;
use rppg_respiration::capture::load_captures;
use rppg_respiration::config::Args;
use rppg_respiration::output::{CsvSink, JsonLinesSink};
use rppg_respiration::sink::LogSink;
use rppg_respiration::{RespirationDetector, RespirationError, RespirationSink};
use std::fs::File;
use std::io::BufWriter;

/// Every output the command line asked for.
struct OutputSinks {
    csv: Option<CsvSink<BufWriter<File>>>,
    json: Option<JsonLinesSink<BufWriter<File>>>,
    log: LogSink,
}

impl OutputSinks {
    fn failed_writes(&self) -> usize {
        self.csv.as_ref().map_or(0, |s| s.failed_writes())
            + self.json.as_ref().map_or(0, |s| s.failed_writes())
    }
}

impl RespirationSink for OutputSinks {
    fn respiration_update(&mut self, signal_value: f64, at_frame: u64) {
        if let Some(csv) = self.csv.as_mut() {
            csv.respiration_update(signal_value, at_frame);
        }
        if let Some(json) = self.json.as_mut() {
            json.respiration_update(signal_value, at_frame);
        }
        self.log.respiration_update(signal_value, at_frame);
    }

    fn stop_detection(&mut self) {
        if let Some(csv) = self.csv.as_mut() {
            csv.stop_detection();
        }
        if let Some(json) = self.json.as_mut() {
            json.stop_detection();
        }
        self.log.stop_detection();
    }
}

#[derive(Debug, Default)]
struct RunSummary {
    frames_processed: usize,
    frames_invalid: usize,
    frames_degenerate: usize,
    breathing_rate: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    args.validate()?;
    let config = args.detector_config();
    debug!("Detector configuration: {:?}", config);

    let records = load_captures(&args.input_path)
        .with_context(|| format!("Failed to load captures from {}", args.input_path.display()))?;
    if records.is_empty() {
        bail!("No capture frames found in {}", args.input_path.display());
    }
    println!("Loaded {} frames", records.len());

    let sinks = OutputSinks {
        csv: args
            .csv_output
            .as_deref()
            .map(|path| CsvSink::create(path, config.capture_fps))
            .transpose()?,
        json: args
            .json_output
            .as_deref()
            .map(|path| JsonLinesSink::create(path, config.capture_fps))
            .transpose()?,
        log: LogSink,
    };

    let mut detector = RespirationDetector::new(&config, sinks)?;
    let mut estimator = BreathingRateEstimator::new(config.update_rate(), args.br_window_seconds);
    let mut summary = RunSummary::default();

    for (seq, record) in &records {
        let frame = match record.frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Dropping capture item {}: {}", seq, e);
                summary.frames_invalid += 1;
                continue;
            }
        };

        match detector.on_frame(&frame) {
            Ok(Some(update)) => {
                summary.frames_processed += 1;
                if let Some(rate) = estimator.push(update.signal_value) {
                    info!(
                        "Breathing rate at frame {}: {:.1} breaths/min",
                        update.at_frame, rate
                    );
                    summary.breathing_rate = Some(rate);
                }
            }
            Ok(None) => {}
            Err(RespirationError::DegenerateSignal { .. }) => summary.frames_degenerate += 1,
            Err(e) => return Err(e.into()),
        }
    }

    detector.stop();
    let frames_seen = detector.frames_seen();
    let sinks = detector.into_sink();

    println!("\nRespiration Summary:");
    println!("--------------------");
    println!("Frames seen: {}", frames_seen);
    println!("Frames processed: {}", summary.frames_processed);
    println!("Invalid frames: {}", summary.frames_invalid);
    println!("Degenerate frames: {}", summary.frames_degenerate);
    match summary.breathing_rate {
        Some(rate) => println!("Breathing rate: {:.1} breaths/min", rate),
        None => println!(
            "Breathing rate: - (needs {} processed frames)",
            estimator.window_len()
        ),
    }

    let failed = sinks.failed_writes();
    if failed > 0 {
        bail!("{} output writes failed", failed);
    }

    Ok(())
}
