use crate::frame::FrameBuffer;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension of recorded capture files.
pub const CAPTURE_EXTENSION: &str = "cap";

#[derive(Debug, Serialize, Deserialize)]
struct CaptureItem {
    seq: u32,
    #[serde(with = "serde_bytes")]
    data: Vec<u8>,
}

/// One recorded frame. `ts` is Unix time in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CaptureRecord {
    #[serde(rename = "frame-rgb")]
    Rgb {
        ts: i64,
        rows: u32,
        cols: u32,
        #[serde(with = "serde_bytes")]
        pixels: Vec<u8>,
    },
    #[serde(rename = "frame-bgra")]
    Bgra {
        ts: i64,
        rows: u32,
        cols: u32,
        bytes_per_row: u32,
        #[serde(with = "serde_bytes")]
        pixels: Vec<u8>,
    },
}

impl CaptureRecord {
    pub fn ts(&self) -> i64 {
        match self {
            CaptureRecord::Rgb { ts, .. } | CaptureRecord::Bgra { ts, .. } => *ts,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.ts())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            CaptureRecord::Rgb { rows, cols, .. } | CaptureRecord::Bgra { rows, cols, .. } => {
                (*rows, *cols)
            }
        }
    }

    /// Validated view of the recorded pixels.
    pub fn frame(&self) -> crate::error::Result<FrameBuffer<'_>> {
        match self {
            CaptureRecord::Rgb {
                rows, cols, pixels, ..
            } => FrameBuffer::from_rgb(*rows as usize, *cols as usize, pixels),
            CaptureRecord::Bgra {
                rows,
                cols,
                bytes_per_row,
                pixels,
                ..
            } => FrameBuffer::from_bgra(
                *rows as usize,
                *cols as usize,
                *bytes_per_row as usize,
                pixels,
            ),
        }
    }
}

/// Decode every capture item in a stream until EOF. Malformed items are
/// skipped with a warning.
pub fn decode_capture_stream<R: Read>(mut reader: R) -> Result<Vec<(u32, CaptureRecord)>> {
    let mut items = Vec::new();

    loop {
        // Outer item: sequence number plus the encoded record
        let item: CaptureItem = match ciborium::from_reader(&mut reader) {
            Ok(item) => item,
            Err(ciborium::de::Error::Io(error))
                if error.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(ciborium::de::Error::Io(error)) => {
                return Err(error).context("Failed to read capture stream");
            }
            Err(e) => {
                warn!("Skipping malformed capture item: {}", e);
                continue;
            }
        };

        // Inner record: the tagged frame itself
        match ciborium::from_reader(item.data.as_slice()) {
            Ok(record) => items.push((item.seq, record)),
            Err(e) => warn!("Skipping undecodable frame record {}: {}", item.seq, e),
        }
    }

    Ok(items)
}

pub fn decode_capture_file(path: &Path) -> Result<Vec<(u32, CaptureRecord)>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let items = decode_capture_stream(BufReader::new(file))
        .with_context(|| format!("Failed to decode capture file: {}", path.display()))?;
    debug!("Decoded {} frames from {}", items.len(), path.display());
    Ok(items)
}

/// Append one record to a capture stream.
pub fn encode_capture_item<W: Write>(writer: W, seq: u32, record: &CaptureRecord) -> Result<()> {
    // Encode the record first so it can be wrapped as a byte string
    let mut data = Vec::new();
    ciborium::into_writer(record, &mut data).context("Failed to encode frame record")?;
    ciborium::into_writer(&CaptureItem { seq, data }, writer)
        .context("Failed to write capture item")?;
    Ok(())
}

/// A single capture file, or every `.cap` file below a directory, sorted.
pub fn find_capture_files(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    // Walk the directory tree for capture files
    let mut files = Vec::new();
    for entry in WalkDir::new(input) {
        let entry =
            entry.with_context(|| format!("Failed to walk directory: {}", input.display()))?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().and_then(|s| s.to_str()) == Some(CAPTURE_EXTENSION)
        {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Load every capture file under `input`, ordered by sequence number.
pub fn load_captures(input: &Path) -> Result<Vec<(u32, CaptureRecord)>> {
    let mut records = Vec::new();
    for path in find_capture_files(input)? {
        println!("Loading file: {}", path.display());
        records.extend(decode_capture_file(&path)?);
    }
    // Sort by sequence number and timestamp
    records.sort_by_key(|(seq, record)| (*seq, record.ts()));
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(ts: i64, value: u8) -> CaptureRecord {
        CaptureRecord::Rgb {
            ts,
            rows: 2,
            cols: 2,
            pixels: vec![value; 12],
        }
    }

    #[test]
    fn test_stream_decodes_in_order() {
        let mut stream = Vec::new();
        encode_capture_item(&mut stream, 7, &rgb(1_000, 5)).unwrap();
        encode_capture_item(&mut stream, 8, &rgb(1_016, 6)).unwrap();

        let items = decode_capture_stream(stream.as_slice()).unwrap();
        assert_eq!(items, vec![(7, rgb(1_000, 5)), (8, rgb(1_016, 6))]);
    }

    #[test]
    fn test_undecodable_record_skipped() {
        let mut stream = Vec::new();
        ciborium::into_writer(
            &CaptureItem {
                seq: 1,
                data: vec![0xff, 0x00],
            },
            &mut stream,
        )
        .unwrap();
        encode_capture_item(&mut stream, 2, &rgb(0, 1)).unwrap();

        let items = decode_capture_stream(stream.as_slice()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].0, 2);
    }

    #[test]
    fn test_record_frames() {
        let record = CaptureRecord::Bgra {
            ts: 0,
            rows: 1,
            cols: 2,
            bytes_per_row: 8,
            pixels: vec![1, 2, 3, 255, 4, 5, 6, 255],
        };
        let frame = record.frame().unwrap();
        assert_eq!((frame.rows(), frame.cols()), (1, 2));
        assert_eq!(record.dimensions(), (1, 2));

        let bad = CaptureRecord::Rgb {
            ts: 0,
            rows: 0,
            cols: 2,
            pixels: Vec::new(),
        };
        assert!(bad.frame().is_err());
    }

    #[test]
    fn test_huge_dimensions_are_invalid() {
        let record = CaptureRecord::Rgb {
            ts: 0,
            rows: u32::MAX,
            cols: u32::MAX,
            pixels: vec![0; 3],
        };
        assert!(matches!(
            record.frame(),
            Err(crate::error::RespirationError::InvalidFrame(_))
        ));
    }

    #[test]
    fn test_timestamp_is_milliseconds() {
        let record = rgb(1_700_000_000_500, 0);
        let ts = record.timestamp().unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
        assert_eq!(ts.timestamp_subsec_millis(), 500);
    }
}
