//! Daily temperature digest
//!
//! Summarises the last 24 hours of outdoor temperature in one sentence,
//! describing the high and the low with their own threshold tables.

use std::time::Duration;
use tracing::{debug, warn};

use crate::alert::AlertMessage;
use crate::threshold::{ThresholdTable, HIGH_TEMPERATURES, LOW_TEMPERATURES};
use crate::timeseries::TimeSeriesSource;

/// Subtopic of the digest alert
pub const DIGEST_SUBTOPIC: &str = "daily";

/// Sentence sent when either extreme is unavailable
pub const NO_DATA_DIGEST: &str = "Weather: I didn't get any outside temperature data yesterday!";

/// Trailing query window, as Graphite relative offsets
const WINDOW_FROM: &str = "-24h";
const WINDOW_UNTIL: &str = "now";

/// Which extreme to query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Min,
    Max,
}

impl Extreme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Extreme::Min => "min",
            Extreme::Max => "max",
        }
    }
}

/// The 24 hour temperature range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureRange {
    pub low: f64,
    pub high: f64,
}

impl TemperatureRange {
    /// Render the digest sentence
    pub fn describe(&self) -> String {
        format!(
            "Weather: Outside it got up to {} and went down to {} in the last 24 hours.",
            labelled(self.high, &HIGH_TEMPERATURES),
            labelled(self.low, &LOW_TEMPERATURES),
        )
    }
}

fn labelled(value: f64, table: &ThresholdTable) -> String {
    match table.classify(value) {
        "" => format!("{:.1}°C", value),
        label => format!("{} {:.1}°C", label, value),
    }
}

/// Builds the daily digest from a time-series source
pub struct DigestBuilder<T> {
    source: T,
    series: String,
}

impl<T: TimeSeriesSource> DigestBuilder<T> {
    /// Create a builder for the temperature series named `series`
    pub fn new(source: T, series: impl Into<String>) -> Self {
        Self {
            source,
            series: series.into(),
        }
    }

    /// Graphite target summarising the whole window into a single point
    pub fn target(&self, extreme: Extreme) -> String {
        let cf = extreme.as_str();
        format!(r#"summarize(sensor.{}.{},"100y","{}")"#, self.series, cf, cf)
    }

    /// Fetch one extreme over the trailing window
    ///
    /// Query failures and empty results are logged and read as no data.
    pub async fn last_24h(&self, extreme: Extreme) -> Option<f64> {
        let target = self.target(extreme);
        match self.source.query(WINDOW_FROM, WINDOW_UNTIL, &target).await {
            Ok(series) => {
                let value = series.first().and_then(|s| s.first_value());
                if value.is_none() {
                    debug!(%target, "No data in the last 24 hours");
                }
                value
            }
            Err(e) => {
                warn!(%target, error = %e, "Failed to get time-series data");
                None
            }
        }
    }

    /// Fetch both extremes, `None` if either is missing
    pub async fn range(&self) -> Option<TemperatureRange> {
        let high = self.last_24h(Extreme::Max).await;
        let low = self.last_24h(Extreme::Min).await;
        Some(TemperatureRange {
            low: low?,
            high: high?,
        })
    }

    /// The digest sentence
    pub async fn build(&self) -> String {
        match self.range().await {
            Some(range) => range.describe(),
            None => NO_DATA_DIGEST.to_string(),
        }
    }

    /// The digest as an alert that is never suppressed
    pub async fn alert(&self) -> AlertMessage {
        AlertMessage::new(DIGEST_SUBTOPIC, self.build().await, Duration::ZERO)
    }
}
