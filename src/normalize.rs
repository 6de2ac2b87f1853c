use crate::error::{RespirationError, Result};

/// Spread below this fraction of the mean magnitude counts as no spread.
const MIN_RELATIVE_SPREAD: f64 = 1e-12;

/// Arithmetic mean and sample (n - 1) standard deviation.
///
/// Returns `None` for fewer than two values.
pub fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&x| {
            let diff = x - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1.0);
    Some((mean, variance.sqrt()))
}

/// Z-score a filtered sequence: `(x - mean) / std` for every element.
///
/// Constant input, or input too short to have a spread, fails with
/// `DegenerateSignal` instead of producing non-finite values.
pub fn z_score(values: &[f64]) -> Result<Vec<f64>> {
    let degenerate = RespirationError::DegenerateSignal {
        samples: values.len(),
    };
    let (mean, std_dev) = mean_std(values).ok_or_else(|| degenerate.clone())?;
    if !std_dev.is_finite() || std_dev == 0.0 || std_dev <= mean.abs() * MIN_RELATIVE_SPREAD {
        return Err(degenerate);
    }
    Ok(values.iter().map(|&x| (x - mean) / std_dev).collect())
}
