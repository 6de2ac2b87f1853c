use rppg_respiration::capture::{decode_capture_stream, encode_capture_item, CaptureRecord};
use rppg_respiration::filter::BandpassFilter;
use rppg_respiration::intensity::reduce_rows;
use rppg_respiration::normalize::z_score;
use rppg_respiration::output::CsvSink;
use rppg_respiration::{DetectorConfig, RespirationDetector, RespirationSink};

const ROWS: usize = 6;
const COLS: usize = 4;

/// A BGRA frame whose brightness ramps down the rows and drifts slowly
/// with the frame index.
fn synthetic_frame(index: u32) -> CaptureRecord {
    let drift = (index / 10 % 20) as u8;
    let mut pixels = Vec::with_capacity(ROWS * COLS * 4);
    for row in 0..ROWS {
        let value = 40 + row as u8 * 15 + drift;
        for _ in 0..COLS {
            pixels.extend_from_slice(&[value, value, value, 255]);
        }
    }
    CaptureRecord::Bgra {
        ts: 1_700_000_000_000 + index as i64 * 16,
        rows: ROWS as u32,
        cols: COLS as u32,
        bytes_per_row: (COLS * 4) as u32,
        pixels,
    }
}

fn recorded_stream(frames: u32) -> Vec<u8> {
    let mut stream = Vec::new();
    for index in 0..frames {
        encode_capture_item(&mut stream, index, &synthetic_frame(index)).unwrap();
    }
    stream
}

#[test]
fn test_capture_to_csv() {
    let records = decode_capture_stream(recorded_stream(181).as_slice()).unwrap();
    assert_eq!(records.len(), 181);

    let sink = CsvSink::new(Vec::new(), 60.0);
    let mut detector = RespirationDetector::new(&DetectorConfig::default(), sink).unwrap();

    let mut processed = Vec::new();
    for (_, record) in &records {
        let frame = record.frame().unwrap();
        if let Some(update) = detector.on_frame(&frame).unwrap() {
            processed.push(update);
        }
    }
    detector.stop();
    assert_eq!(detector.frames_seen(), 181);

    let frames: Vec<u64> = processed.iter().map(|u| u.at_frame).collect();
    assert_eq!(frames, vec![0, 60, 120, 180]);
    assert!(processed.iter().all(|u| u.signal.len() == ROWS));

    let sink = detector.into_sink();
    assert_eq!(sink.failed_writes(), 0);
    let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "frame,seconds,respiration_signal");
    assert!(lines[2].starts_with("60,1.0,"));
    assert!(lines[4].starts_with("180,3.0,"));
}

#[test]
fn test_detector_matches_manual_stages() {
    let records = decode_capture_stream(recorded_stream(121).as_slice()).unwrap();

    let mut delivered = Vec::new();
    {
        let sink = rppg_respiration::sink::FnSink(|value: f64, frame: u64| {
            delivered.push((frame, value))
        });
        let mut detector = RespirationDetector::new(&DetectorConfig::default(), sink).unwrap();
        for (_, record) in &records {
            detector.on_frame(&record.frame().unwrap()).unwrap();
        }
    }

    let mut filter = BandpassFilter::new();
    let mut expected = Vec::new();
    for (seq, record) in records.iter().step_by(60) {
        let trace = reduce_rows(&record.frame().unwrap());
        let signal = z_score(&filter.filter_trace(&trace)).unwrap();
        expected.push((*seq as u64, signal[signal.len() - 1]));
    }

    assert_eq!(delivered.len(), expected.len());
    for ((frame, value), (expected_frame, expected_value)) in delivered.iter().zip(&expected) {
        assert_eq!(frame, expected_frame);
        assert!((value - expected_value).abs() < 1e-12);
    }
}

#[test]
fn test_invalid_records_are_reported() {
    let record = CaptureRecord::Rgb {
        ts: 0,
        rows: 2,
        cols: 2,
        pixels: vec![0; 3],
    };
    assert!(record.frame().is_err());
}

struct Silent;

impl RespirationSink for Silent {
    fn respiration_update(&mut self, _signal_value: f64, _at_frame: u64) {}
}

#[test]
fn test_restart_resets_frame_indices() {
    let records = decode_capture_stream(recorded_stream(3).as_slice()).unwrap();
    let config = DetectorConfig {
        decimation_factor: 2,
        ..DetectorConfig::default()
    };
    let mut detector = RespirationDetector::new(&config, Silent).unwrap();

    let first: Vec<u64> = records
        .iter()
        .filter_map(|(_, r)| detector.on_frame(&r.frame().unwrap()).unwrap())
        .map(|u| u.at_frame)
        .collect();
    detector.restart();
    let second: Vec<u64> = records
        .iter()
        .filter_map(|(_, r)| detector.on_frame(&r.frame().unwrap()).unwrap())
        .map(|u| u.at_frame)
        .collect();

    assert_eq!(first, vec![0, 2]);
    assert_eq!(second, first);
}
