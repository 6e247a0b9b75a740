//! Bus events
//!
//! Sensor adapters publish one event per reading. The payload is the raw
//! field set as a JSON object, e.g.
//! `{"device": "rain.garden", "all_total": 152.4, "day_total": 1.2}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Context;

/// Payload types with a fixed topic
pub trait EventData: Clone + Send + Sync + 'static {
    fn event_type() -> &'static str;
}

/// Topic an event is published under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(String);

impl EventType {
    pub fn new(topic: impl Into<String>) -> Self {
        Self(topic.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventType {
    fn from(topic: &str) -> Self {
        Self::new(topic)
    }
}

impl From<String> for EventType {
    fn from(topic: String) -> Self {
        Self(topic)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An event on the bus; the payload defaults to raw JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T = Value> {
    pub event_type: EventType,
    pub data: T,
    pub time_fired: DateTime<Utc>,
    pub context: Context,
}

impl<T> Event<T> {
    /// Stamp a new event with the current time
    pub fn new(event_type: impl Into<EventType>, data: T, context: Context) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            time_fired: Utc::now(),
            context,
        }
    }

    /// Convert the payload, keeping topic, timestamp and context
    pub fn try_map_data<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Event<U>, E> {
        Ok(Event {
            event_type: self.event_type,
            data: f(self.data)?,
            time_fired: self.time_fired,
            context: self.context,
        })
    }
}

impl<T: EventData> Event<T> {
    /// An event under the payload type's own topic
    pub fn typed(data: T, context: Context) -> Self {
        Self::new(T::event_type(), data, context)
    }
}

impl Event<Value> {
    /// The reporting sensor's id, if the payload names one
    pub fn device(&self) -> Option<&str> {
        self.data.get("device")?.as_str()
    }
}
