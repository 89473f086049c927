//! Seasonal-median decomposition of a periodic time series.
//!
//! Splits a series into three positionally aligned components:
//! - Seasonal: the per-phase average, tiled over the series
//! - Median: the overall median, broadcast over the series
//! - Residual: what remains after removing both

use crate::error::{AnomalyError, Result};
use crate::utils::stats;

/// Result of seasonal-median decomposition.
///
/// All four components have the same length as the input series and are
/// aligned position by position.
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// Copy of the input series.
    pub observed: Vec<f64>,
    /// Per-phase averages tiled to the series length.
    pub seasonal: Vec<f64>,
    /// Overall series median broadcast to the series length.
    pub median: Vec<f64>,
    /// `observed - seasonal - median`. NaN where the observation is missing.
    pub residual: Vec<f64>,
}

impl Decomposition {
    /// Length of the decomposed series.
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    /// Check whether the decomposition is empty.
    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Get the seasonal strength (0 to 1).
    /// Values close to 1 indicate strong seasonality.
    pub fn seasonal_strength(&self) -> f64 {
        let var_residual = stats::variance(&self.residual);
        let seasonal_plus_residual: Vec<f64> = self
            .seasonal
            .iter()
            .zip(self.residual.iter())
            .map(|(s, r)| s + r)
            .collect();
        let var_sr = stats::variance(&seasonal_plus_residual);

        if !var_sr.is_finite() || var_sr < 1e-10 || !var_residual.is_finite() {
            return 0.0;
        }

        (1.0 - var_residual / var_sr).max(0.0)
    }
}

/// Mean of the series at each phase of the seasonal cycle.
///
/// Phase `i` averages the elements at positions `i, i + period,
/// i + 2 * period, ...`, skipping missing values. A phase with no finite
/// values yields NaN rather than an error.
pub fn seasonal_means(series: &[f64], period: usize) -> Result<Vec<f64>> {
    validate(series, period)?;

    let mut means = Vec::with_capacity(period);
    for phase in 0..period {
        let phase_values: Vec<f64> = series.iter().copied().skip(phase).step_by(period).collect();
        means.push(stats::mean(&phase_values));
    }

    Ok(means)
}

/// Decompose a series into seasonal, median, and residual components.
///
/// The seasonal component repeats the per-phase averages
/// (`seasonal[j] = phase_mean[j % period]`), the median component is the
/// overall series median at every position, and the residual is the
/// elementwise difference `observed - seasonal - median`. Missing values
/// propagate into the residual; data quality issues never fail the call.
///
/// # Errors
/// Returns `EmptyData` for an empty series and `InvalidParameter` when
/// `period == 0` or `period >= series.len()`.
pub fn decompose(series: &[f64], period: usize) -> Result<Decomposition> {
    let n = series.len();
    let phase_means = seasonal_means(series, period)?;

    let seasonal: Vec<f64> = (0..n).map(|j| phase_means[j % period]).collect();

    let med = stats::median(series);
    let median = vec![med; n];

    let residual: Vec<f64> = series
        .iter()
        .zip(seasonal.iter())
        .map(|(x, s)| x - s - med)
        .collect();

    Ok(Decomposition {
        observed: series.to_vec(),
        seasonal,
        median,
        residual,
    })
}

fn validate(series: &[f64], period: usize) -> Result<()> {
    if series.is_empty() {
        return Err(AnomalyError::EmptyData);
    }
    if period == 0 || period >= series.len() {
        return Err(AnomalyError::InvalidParameter(format!(
            "period must be between 1 and {}, got {}",
            series.len() - 1,
            period
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sine_series(n: usize, period: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / period as f64).sin())
            .collect()
    }

    #[test]
    fn seasonal_means_match_phase_averages() {
        // Two full cycles of period 3
        let series = vec![1.0, 2.0, 3.0, 5.0, 6.0, 7.0];
        let means = seasonal_means(&series, 3).unwrap();

        assert_eq!(means.len(), 3);
        assert_relative_eq!(means[0], 3.0, epsilon = 1e-10);
        assert_relative_eq!(means[1], 4.0, epsilon = 1e-10);
        assert_relative_eq!(means[2], 5.0, epsilon = 1e-10);
    }

    #[test]
    fn seasonal_means_skip_missing_values() {
        let series = vec![1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0];
        let means = seasonal_means(&series, 3).unwrap();

        assert_relative_eq!(means[0], 2.5, epsilon = 1e-10);
        assert_relative_eq!(means[1], 3.5, epsilon = 1e-10);
        // Only the second cycle contributes to phase 2
        assert_relative_eq!(means[2], 6.0, epsilon = 1e-10);
    }

    #[test]
    fn seasonal_means_all_missing_phase_is_nan() {
        let series = vec![1.0, f64::NAN, 3.0, f64::NAN];
        let means = seasonal_means(&series, 2).unwrap();

        assert_relative_eq!(means[0], 2.0, epsilon = 1e-10);
        assert!(means[1].is_nan());
    }

    #[test]
    fn decompose_components_are_aligned() {
        let series = sine_series(21, 7);
        let result = decompose(&series, 7).unwrap();

        assert_eq!(result.len(), 21);
        assert_eq!(result.observed.len(), 21);
        assert_eq!(result.seasonal.len(), 21);
        assert_eq!(result.median.len(), 21);
        assert_eq!(result.residual.len(), 21);
    }

    #[test]
    fn decompose_seasonal_is_periodic() {
        let series = sine_series(20, 7);
        let result = decompose(&series, 7).unwrap();

        for i in 0..result.len() - 7 {
            assert_relative_eq!(result.seasonal[i], result.seasonal[i + 7], epsilon = 1e-12);
        }
    }

    #[test]
    fn decompose_reconstructs_observed() {
        let series: Vec<f64> = (0..30)
            .map(|i| 10.0 + (2.0 * std::f64::consts::PI * i as f64 / 5.0).sin() + 0.01 * i as f64)
            .collect();
        let result = decompose(&series, 5).unwrap();

        for i in 0..series.len() {
            assert_relative_eq!(
                result.observed[i],
                result.seasonal[i] + result.median[i] + result.residual[i],
                epsilon = 1e-10
            );
        }
    }

    #[test]
    fn decompose_periodic_series_has_flat_residuals() {
        // A perfectly periodic series: every phase mean equals its values,
        // so residuals collapse to the negated median everywhere.
        let series = sine_series(28, 7);
        let result = decompose(&series, 7).unwrap();

        let first = result.residual[0];
        for &r in &result.residual {
            assert_relative_eq!(r, first, epsilon = 1e-10);
        }
    }

    #[test]
    fn decompose_propagates_missing_values() {
        let mut series = sine_series(21, 7);
        series[4] = f64::NAN;
        let result = decompose(&series, 7).unwrap();

        assert!(result.residual[4].is_nan());
        assert!(result.residual[5].is_finite());
    }

    #[test]
    fn decompose_rejects_empty_series() {
        let result = decompose(&[], 7);
        assert_eq!(result.unwrap_err(), AnomalyError::EmptyData);
    }

    #[test]
    fn decompose_rejects_degenerate_period() {
        let series = sine_series(10, 5);

        assert!(matches!(
            decompose(&series, 0),
            Err(AnomalyError::InvalidParameter(_))
        ));
        assert!(matches!(
            decompose(&series, 10),
            Err(AnomalyError::InvalidParameter(_))
        ));
        assert!(matches!(
            decompose(&series, 11),
            Err(AnomalyError::InvalidParameter(_))
        ));
    }

    #[test]
    fn seasonal_strength_is_high_for_seasonal_series() {
        let series = sine_series(56, 7);
        let result = decompose(&series, 7).unwrap();

        assert!(result.seasonal_strength() > 0.9);
    }

    #[test]
    fn seasonal_strength_is_zero_for_constant_series() {
        let series = vec![3.0; 20];
        let result = decompose(&series, 4).unwrap();

        assert_relative_eq!(result.seasonal_strength(), 0.0, epsilon = 1e-10);
    }
}
