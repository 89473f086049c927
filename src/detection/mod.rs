//! Detection utilities for seasonal time series.
//!
//! This module provides the generalized ESD anomaly test over the
//! residuals of a seasonal-median decomposition.

mod esd;

pub use esd::{detect_anomalies, detect_anomalies_auto, EsdConfig, EsdResult};
