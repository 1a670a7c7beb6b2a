use crate::errors::TransitError;
use serde::Serialize;
use std::path::Path;

/// Calculate the mean of a slice of f64 values.
///  - `numbers` is a reference to a slice of f64 values.
///  - Returns the mean of `numbers`, or NaN if `numbers` is empty.
///
/// # Examples
///
/// ```rust
/// let numbers = vec![1.0, 1.5, 2.0, 2.5, 3.0];
/// let mn = transits::utils::mean(&numbers);
/// assert_eq!(2.0, mn);
/// ```
pub fn mean(numbers: &[f64]) -> f64 {
    let sum: f64 = numbers.iter().sum();

    sum / numbers.len() as f64
}

/// Calculate the median of a slice of f64 values.
///  - `numbers` is a reference to a slice of f64 values, in any order.
///  - Returns the median of `numbers`, or NaN if `numbers` is empty.
///
/// # Examples
///
/// ```rust
/// let numbers = vec![10.0, 1.0, 7.0, 3.0];
/// let med = transits::utils::median(&numbers);
/// assert_eq!(5.0, med);
/// ```
pub fn median(numbers: &[f64]) -> f64 {
    percentile(numbers, 0.5)
}

/// Calculate the `p` quantile (0 to 1) of `obs`, interpolating linearly between
/// the closest ranks, the same rule box plots use for their quartiles.
///
/// # Examples
///
/// ```rust
/// let obs = vec![1.0, 2.0, 3.0, 4.0];
/// assert_eq!(1.75, transits::utils::percentile(&obs, 0.25));
/// ```
pub fn percentile(obs: &[f64], p: f64) -> f64 {
    if obs.is_empty() {
        return f64::NAN;
    }
    let mut sorted = obs.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = p.max(0.0).min(1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Write statistical results to csv file.
pub fn record<T: Serialize, P: AsRef<Path>>(rec: &[T], path: P) -> Result<(), TransitError> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path).map_err(|e| with_path(e, path))?;
    for i in rec {
        wtr.serialize(i).map_err(|e| with_path(e, path))?;
    }
    wtr.flush().map_err(|e| TransitError::io(path, e))?;
    Ok(())
}

/// Convert a csv error into a [TransitError] that names the file involved.
pub(crate) fn with_path(e: csv::Error, path: &Path) -> TransitError {
    match TransitError::from(e) {
        TransitError::IoError { source, .. } => TransitError::io(path, source),
        TransitError::ParseError { reason, .. } => TransitError::parse(path, reason),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[test]
    fn median_of_odd_length_ignores_input_order() {
        assert_eq!(median(&[9.0, 1.0, 4.0]), 4.0);
    }

    #[test]
    fn quartiles_interpolate_between_ranks() {
        let obs = [4.0, 1.0, 3.0, 2.0, 5.0];
        assert_eq!(percentile(&obs, 0.0), 1.0);
        assert_eq!(percentile(&obs, 0.25), 2.0);
        assert_eq!(percentile(&obs, 0.75), 4.0);
        assert_eq!(percentile(&obs, 1.0), 5.0);
        assert_eq!(percentile(&[2.0, 4.0], 0.25), 2.5);
    }

    #[test]
    fn empty_slices_give_nan() {
        assert!(mean(&[]).is_nan());
        assert!(median(&[]).is_nan());
    }

    #[derive(Serialize)]
    struct Row {
        key: f64,
        value: f64,
    }

    #[test]
    fn record_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        let rows = vec![Row { key: 0.01, value: 2.0 }, Row { key: 0.02, value: 3.5 }];
        record(&rows, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "key,value\n0.01,2.0\n0.02,3.5\n");
    }

    #[test]
    fn record_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("rows.csv");
        let rows = vec![Row { key: 1.0, value: 1.0 }];
        match record(&rows, &path) {
            Err(TransitError::IoError { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected io error, got {:?}", other),
        }
    }
}
