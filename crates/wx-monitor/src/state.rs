//! Rolling per-signal state
//!
//! Lives for the lifetime of the engine and is never persisted. The last-seen
//! values start unset and the first observation of a signal only seeds its
//! field. The wind average starts at zero.

use crate::smoothing::MovingAverage;

/// Last-seen values of each outdoor signal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollingState {
    /// Cumulative rain gauge total (mm)
    pub last_rain_total: Option<f64>,
    /// Outdoor temperature (°C)
    pub last_outside_temp: Option<f64>,
    /// Outdoor relative humidity (%)
    pub last_outside_humidity: Option<f64>,
    /// Smoothed wind speed (m/s)
    pub avg_wind: MovingAverage,
}

impl RollingState {
    pub fn new() -> Self {
        Self::default()
    }
}
