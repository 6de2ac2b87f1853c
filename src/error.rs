use thiserror::Error;

/// Failures local to a single frame or to detector construction.
///
/// None of these poison a running session: the next decimated frame is
/// processed normally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RespirationError {
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
    #[error("Degenerate signal: {samples} filtered samples have no spread to normalize")]
    DegenerateSignal { samples: usize },
    #[error("Decimation factor must be at least 1, got {0}")]
    InvalidDecimation(u64),
}

pub type Result<T> = std::result::Result<T, RespirationError>;
