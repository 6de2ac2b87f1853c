use anyhow::Result;
use rppg_respiration::capture::decode_capture_file;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        println!("Usage: {} <capture_file>", args[0]);
        std::process::exit(1);
    }

    let records = decode_capture_file(Path::new(&args[1]))?;
    println!("\nFrames: {}", records.len());

    let (Some((first_seq, first)), Some((last_seq, last))) = (records.first(), records.last())
    else {
        return Ok(());
    };

    let (rows, cols) = first.dimensions();
    println!("Frame size: {}x{} (rows x cols)", rows, cols);
    println!("Sequence: {} - {}", first_seq, last_seq);
    if let (Some(start), Some(end)) = (first.timestamp(), last.timestamp()) {
        println!(
            "Time range: {} - {} ({:.1}s)",
            start.format("%Y-%m-%d %H:%M:%S%.3f"),
            end.format("%Y-%m-%d %H:%M:%S%.3f"),
            (end - start).num_milliseconds() as f64 / 1000.0
        );
    }

    let invalid = records
        .iter()
        .filter(|(_, record)| record.frame().is_err())
        .count();
    if invalid > 0 {
        println!("Invalid frames: {}", invalid);
    }

    Ok(())
}
