//! Statistical utility functions.
//!
//! All aggregates skip non-finite values (NaN marks a missing
//! observation). An aggregate over no finite values returns NaN.

/// Calculate the mean of a slice, ignoring missing values.
pub fn mean(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for &v in values {
        if v.is_finite() {
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        return f64::NAN;
    }
    sum / count as f64
}

/// Calculate the variance of a slice (sample variance with n-1 denominator),
/// ignoring missing values.
pub fn variance(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().filter(|x| x.is_finite()).copied().collect();
    if finite.len() < 2 {
        return f64::NAN;
    }
    let m = mean(&finite);
    let sum_sq: f64 = finite.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (finite.len() - 1) as f64
}

/// Calculate the standard deviation of a slice, ignoring missing values.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Calculate the median of a slice, ignoring missing values.
pub fn median(values: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = values.iter().filter(|x| x.is_finite()).copied().collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Calculate the median absolute deviation about `center`, ignoring
/// missing values.
pub fn mad(values: &[f64], center: f64) -> f64 {
    let deviations: Vec<f64> = values
        .iter()
        .filter(|x| x.is_finite())
        .map(|x| (x - center).abs())
        .collect();
    median(&deviations)
}
