//! Seasonal ESD (Extreme Studentized Deviate) anomaly detection.
//!
//! Runs a generalized ESD test on the residuals of a seasonal-median
//! decomposition. Each round re-estimates location and dispersion over the
//! values still under test, certifies the most extreme remaining value
//! against a Student-t critical value, then masks it so later rounds test
//! the next-most-extreme value.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::decomposition::decompose;
use crate::error::{AnomalyError, Result};
use crate::utils::stats;

/// The fraction of a series past which the ESD test loses validity.
const MAX_ANOMALY_FRACTION_CAP: f64 = 0.499;

/// Configuration for the seasonal ESD test.
#[derive(Debug, Clone)]
pub struct EsdConfig {
    /// Confidence level for certifying an anomaly (strictly between 0 and 1).
    pub alpha: f64,
    /// Upper bound on the fraction of points that may be labeled anomalous.
    /// Values above 0.499 are capped at 0.499.
    pub max_anomaly_fraction: f64,
    /// Use robust statistics (median, median absolute deviation) instead of
    /// mean and standard deviation.
    pub hybrid: bool,
}

impl Default for EsdConfig {
    fn default() -> Self {
        Self {
            alpha: 0.95,
            max_anomaly_fraction: MAX_ANOMALY_FRACTION_CAP,
            hybrid: true,
        }
    }
}

impl EsdConfig {
    /// Set the confidence level.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the upper bound on the anomaly fraction.
    pub fn with_max_anomaly_fraction(mut self, fraction: f64) -> Self {
        self.max_anomaly_fraction = fraction;
        self
    }

    /// Select robust (median/MAD) or non-robust (mean/std-dev) estimators.
    pub fn with_hybrid(mut self, hybrid: bool) -> Self {
        self.hybrid = hybrid;
        self
    }
}

/// Result of the seasonal ESD test.
#[derive(Debug, Clone, PartialEq)]
pub struct EsdResult {
    /// Indices of detected anomalies, in discovery order (most extreme
    /// first). Each index appears at most once.
    pub anomalies: Vec<usize>,
    /// Number of test rounds actually run.
    pub rounds: usize,
    /// Length of the tested series.
    pub series_len: usize,
}

impl EsdResult {
    /// Get the number of anomalies detected.
    pub fn anomaly_count(&self) -> usize {
        self.anomalies.len()
    }

    /// Check if a specific index was flagged as anomalous.
    pub fn is_anomaly(&self, index: usize) -> bool {
        self.anomalies.contains(&index)
    }

    /// Get the percentage of the series flagged as anomalous.
    pub fn anomaly_percentage(&self) -> f64 {
        if self.series_len == 0 {
            0.0
        } else {
            100.0 * self.anomalies.len() as f64 / self.series_len as f64
        }
    }
}

/// Detect anomalies in a seasonal time series.
///
/// Decomposes the series with the given period, then runs up to
/// `max(floor(fraction * n), 1)` ESD rounds over the residuals. Missing
/// values are tolerated throughout; they never become candidates. The round
/// loop stops early when no testable candidate remains or when the
/// degrees of freedom for the critical value are exhausted, returning the
/// anomalies certified so far.
///
/// # Errors
/// Returns `EmptyData` for an empty series, `InvalidParameter` when `alpha`
/// lies outside the open interval (0, 1) or the period is degenerate.
pub fn detect_anomalies(series: &[f64], period: usize, config: &EsdConfig) -> Result<EsdResult> {
    if series.is_empty() {
        return Err(AnomalyError::EmptyData);
    }
    if !(config.alpha > 0.0 && config.alpha < 1.0) {
        return Err(AnomalyError::InvalidParameter(format!(
            "alpha must be strictly between 0 and 1, got {}",
            config.alpha
        )));
    }

    let n = series.len();
    let fraction = config.max_anomaly_fraction.min(MAX_ANOMALY_FRACTION_CAP);
    // At least one candidate is tested, however short the series.
    let k = ((fraction * n as f64).floor() as usize).max(1);

    let residual = decompose(series, period)?.residual;
    // Fixed reference point for the MAD, kept constant across rounds.
    let overall_median = stats::median(&residual);

    let mut mask = vec![false; n];
    let mut anomalies = Vec::new();
    let mut rounds = 0;

    for i in 1..=k {
        let (location, dispersion) =
            test_statistics(&residual, &mask, overall_median, config.hybrid);

        // Most extreme remaining value. NaN deviations (missing residuals,
        // or zero-over-zero on a flat residual vector) are never candidates;
        // a nonzero deviation over zero dispersion is infinite and always
        // certified below.
        let mut candidate: Option<(usize, f64)> = None;
        for (j, &r) in residual.iter().enumerate() {
            if mask[j] {
                continue;
            }
            let deviation = (r - location).abs() / dispersion;
            if deviation.is_nan() {
                continue;
            }
            match candidate {
                Some((_, best)) if deviation <= best => {}
                _ => candidate = Some((j, deviation)),
            }
        }
        let (index, statistic) = match candidate {
            Some(c) => c,
            None => break,
        };

        // Observations still under test before this round's removal.
        let n_eff = n - mask.iter().filter(|&&m| m).count();
        let critical = match critical_value(config.alpha, n_eff, i) {
            Some(c) => c,
            None => break,
        };
        rounds = i;

        if statistic > critical {
            anomalies.push(index);
        }
        // Masked whether or not it was certified, so the next round tests
        // the next-most-extreme value.
        mask[index] = true;
    }

    Ok(EsdResult {
        anomalies,
        rounds,
        series_len: n,
    })
}

/// Detect anomalies with the default configuration.
pub fn detect_anomalies_auto(series: &[f64], period: usize) -> Result<EsdResult> {
    detect_anomalies(series, period, &EsdConfig::default())
}

/// Location and dispersion estimates over the unmasked residuals.
///
/// The robust dispersion measures deviations about `overall_median`, the
/// median of the full residual vector, not the median of the unmasked
/// subset.
fn test_statistics(
    residual: &[f64],
    mask: &[bool],
    overall_median: f64,
    hybrid: bool,
) -> (f64, f64) {
    let active: Vec<f64> = residual
        .iter()
        .zip(mask.iter())
        .filter(|&(v, &masked)| !masked && v.is_finite())
        .map(|(&v, _)| v)
        .collect();

    if hybrid {
        (stats::median(&active), stats::mad(&active, overall_median))
    } else {
        (stats::mean(&active), stats::std_dev(&active))
    }
}

/// One-sided critical value for ESD round `round` with `n_eff` observations
/// still under test. Returns `None` once the degrees of freedom are
/// exhausted.
fn critical_value(alpha: f64, n_eff: usize, round: usize) -> Option<f64> {
    let remaining = n_eff as f64 - round as f64;
    let df = remaining - 1.0;
    if df <= 0.0 {
        return None;
    }

    let t = StudentsT::new(0.0, 1.0, df).ok()?.inverse_cdf(alpha);
    Some(remaining * t / ((df + t * t) * df).sqrt())
}
