//! Weather monitoring engine
//!
//! Watches outdoor sensor readings on the event bus and raises alerts on
//! notable transitions, and sends a once-daily digest of the temperature
//! range.
//!
//! # Architecture
//!
//! ```text
//! bus event → SensorFeed → Reading → TransitionDetector ┐
//!                                                        ├→ AlertSink
//! daily tick → DigestBuilder → TimeSeriesSource ────────┘
//! ```
//!
//! # Key Types
//!
//! - [`WeatherEngine`] - Single-task loop over the feed and the ticker
//! - [`TransitionDetector`] - Edge-triggered per-signal checks
//! - [`DigestBuilder`] - Daily temperature summary
//! - [`ThresholdTable`] - Value to descriptive label
//! - [`MovingAverage`] - Wind speed smoothing

pub mod alert;
pub mod detector;
pub mod digest;
pub mod engine;
pub mod feed;
pub mod reading;
pub mod scheduler;
pub mod smoothing;
pub mod state;
pub mod threshold;
pub mod timeseries;

pub use alert::{AlertError, AlertMessage, AlertSink, BusAlertSink};
pub use detector::TransitionDetector;
pub use digest::{DigestBuilder, NO_DATA_DIGEST};
pub use engine::{ShutdownHandle, WeatherEngine};
pub use feed::SensorFeed;
pub use reading::{DecodeError, Reading, SensorEvent};
pub use scheduler::{DailySchedule, DailyScheduler, Ticker};
pub use smoothing::MovingAverage;
pub use state::RollingState;
pub use threshold::{ThresholdEntry, ThresholdError, ThresholdTable};
pub use timeseries::{GraphiteClient, TimeSeriesError, TimeSeriesSource};
