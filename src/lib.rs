//! # anofox-anomaly
//!
//! Seasonal anomaly detection for time series.
//!
//! Decomposes a periodic series into seasonal, median, and residual
//! components, then applies a generalized Extreme Studentized Deviate
//! (ESD) test to the residuals to locate anomalous observations. Missing
//! values (NaN) are tolerated throughout: they are skipped by every
//! aggregate statistic and are never reported as anomalies.
//!
//! ```
//! use anofox_anomaly::prelude::*;
//!
//! let mut series: Vec<f64> = (0..42)
//!     .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 7.0).sin())
//!     .collect();
//! series[20] = 500.0;
//!
//! let result = detect_anomalies_auto(&series, 7).unwrap();
//! assert!(result.is_anomaly(20));
//! ```

pub mod decomposition;
pub mod detection;
pub mod error;
pub mod utils;

pub use error::{AnomalyError, Result};

pub mod prelude {
    pub use crate::decomposition::{decompose, seasonal_means, Decomposition};
    pub use crate::detection::{detect_anomalies, detect_anomalies_auto, EsdConfig, EsdResult};
    pub use crate::error::{AnomalyError, Result};
}
