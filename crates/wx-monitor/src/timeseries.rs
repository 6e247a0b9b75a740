//! Time-series store access
//!
//! The digest reads daily extremes through the [`TimeSeriesSource`] trait.
//! [`GraphiteClient`] implements it over Graphite's render API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

/// Time-series query errors
#[derive(Debug, Error)]
pub enum TimeSeriesError {
    #[error("time-series request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("time-series query returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("time-series source unavailable: {0}")]
    Unavailable(String),
}

/// Result type for time-series operations
pub type TimeSeriesResult<T> = Result<T, TimeSeriesError>;

/// One `[value, timestamp]` pair; the value is null for empty buckets
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DataPoint(pub Option<f64>, pub i64);

impl DataPoint {
    pub fn value(&self) -> Option<f64> {
        self.0
    }

    pub fn timestamp(&self) -> i64 {
        self.1
    }
}

/// A named series of data points
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Series {
    pub target: String,
    pub datapoints: Vec<DataPoint>,
}

impl Series {
    /// Value of the first data point, if there is one and it isn't null
    pub fn first_value(&self) -> Option<f64> {
        self.datapoints.first().and_then(DataPoint::value)
    }
}

/// A queryable time-series store
#[async_trait]
pub trait TimeSeriesSource: Send + Sync {
    /// Evaluate `target` between the relative offsets `from` and `until`
    /// (e.g. `-24h` and `now`)
    async fn query(&self, from: &str, until: &str, target: &str) -> TimeSeriesResult<Vec<Series>>;
}

/// Graphite render API client
#[derive(Clone)]
pub struct GraphiteClient {
    client: Client,
    base_url: String,
}

impl GraphiteClient {
    /// Create a client for the Graphite web app at `base_url`
    pub fn new(base_url: &str) -> TimeSeriesResult<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TimeSeriesSource for GraphiteClient {
    async fn query(&self, from: &str, until: &str, target: &str) -> TimeSeriesResult<Vec<Series>> {
        let url = format!("{}/render", self.base_url);
        debug!(%target, from, until, "Querying graphite");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("from", from),
                ("until", until),
                ("target", target),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TimeSeriesError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let series: Vec<Series> = response.json().await?;
        trace!(count = series.len(), "Graphite returned series");
        Ok(series)
    }
}
