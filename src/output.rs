use crate::sink::RespirationSink;
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
struct UpdateRecord {
    frame: u64,
    seconds: f64,
    respiration_signal: f64,
}

impl UpdateRecord {
    fn new(signal_value: f64, at_frame: u64, capture_fps: f64) -> Self {
        Self {
            frame: at_frame,
            seconds: at_frame as f64 / capture_fps,
            respiration_signal: signal_value,
        }
    }
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let dir = path.parent().unwrap_or(Path::new("."));
    if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    println!("Writing results to {}", path.display());
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Writes one CSV row per update: `frame,seconds,respiration_signal`.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    capture_fps: f64,
    failed_writes: usize,
}

impl CsvSink<BufWriter<File>> {
    pub fn create(path: &Path, capture_fps: f64) -> Result<Self> {
        Ok(Self::new(create_output(path)?, capture_fps))
    }
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W, capture_fps: f64) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
            capture_fps,
            failed_writes: 0,
        }
    }

    pub fn failed_writes(&self) -> usize {
        self.failed_writes
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))
    }
}

impl<W: Write> RespirationSink for CsvSink<W> {
    fn respiration_update(&mut self, signal_value: f64, at_frame: u64) {
        let record = UpdateRecord::new(signal_value, at_frame, self.capture_fps);
        if let Err(e) = self.writer.serialize(&record) {
            warn!("Failed to write CSV row for frame {}: {}", at_frame, e);
            self.failed_writes += 1;
        }
    }

    fn stop_detection(&mut self) {
        if let Err(e) = self.writer.flush() {
            warn!("Failed to flush CSV output: {}", e);
            self.failed_writes += 1;
        }
        debug!("CSV sink flushed");
    }
}

/// Writes one JSON object per line per update.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    capture_fps: f64,
    failed_writes: usize,
}

impl JsonLinesSink<BufWriter<File>> {
    pub fn create(path: &Path, capture_fps: f64) -> Result<Self> {
        Ok(Self::new(create_output(path)?, capture_fps))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W, capture_fps: f64) -> Self {
        Self {
            writer,
            capture_fps,
            failed_writes: 0,
        }
    }

    pub fn failed_writes(&self) -> usize {
        self.failed_writes
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_record(&mut self, record: &UpdateRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> RespirationSink for JsonLinesSink<W> {
    fn respiration_update(&mut self, signal_value: f64, at_frame: u64) {
        let record = UpdateRecord::new(signal_value, at_frame, self.capture_fps);
        if let Err(e) = self.write_record(&record) {
            warn!("Failed to write JSON line for frame {}: {}", at_frame, e);
            self.failed_writes += 1;
        }
    }

    fn stop_detection(&mut self) {
        if let Err(e) = self.writer.flush() {
            warn!("Failed to flush JSON output: {}", e);
            self.failed_writes += 1;
        }
    }
}
