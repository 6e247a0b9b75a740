//! Core types for the weather monitor
//!
//! This crate provides the types shared between the event bus, the monitor
//! engine and the server binary: Event, Context, and SignalKind.

mod context;
mod event;
mod signal;

pub use context::Context;
pub use event::{Event, EventData, EventType};
pub use signal::{SignalKind, UnknownSignalKind};

/// Standard event topics carried on the bus
pub mod events {
    use super::*;

    /// Rain gauge readings
    pub const RAIN: &str = "rain";

    /// Temperature (and optionally humidity) readings
    pub const TEMP: &str = "temp";

    /// Stand-alone hygrometer readings
    pub const HUMIDITY: &str = "humidity";

    /// Anemometer readings
    pub const WIND: &str = "wind";

    /// Outbound alerts for the notifier
    pub const ALERT: &str = "alert";

    /// Data for ALERT events
    ///
    /// The notifier downstream of the bus delivers `message` to `target`,
    /// dropping any alert whose `subtopic` was already sent within the last
    /// `interval` seconds. An interval of zero always sends.
    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    pub struct AlertData {
        pub message: String,
        pub target: String,
        pub subtopic: String,
        pub interval: u64,
    }

    impl EventData for AlertData {
        fn event_type() -> &'static str {
            ALERT
        }
    }
}
