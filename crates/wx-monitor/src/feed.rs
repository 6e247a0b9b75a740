//! Sensor feed from the event bus
//!
//! Subscribes to the sensor topics and resolves each event's `device` to
//! the signal kind it was configured as. Events from other devices are
//! dropped.

use tokio::sync::broadcast::error::RecvError;
use tracing::{trace, warn};
use wx_config::OutsideSensors;
use wx_event_bus::{EventBus, FilteredReceiver};

use crate::reading::SensorEvent;

/// Classified sensor events, in bus order
pub struct SensorFeed {
    rx: FilteredReceiver,
    sensors: OutsideSensors,
}

impl SensorFeed {
    /// Subscribe to the topics of every configured sensor
    pub fn subscribe(bus: &EventBus, sensors: OutsideSensors) -> Self {
        let topics = sensors.configured().map(|(kind, _)| kind.topic());
        let rx = bus.subscribe_filtered(topics);
        Self { rx, sensors }
    }

    /// Wait for the next event from a configured sensor
    ///
    /// Returns `None` once the bus has shut down. Lagging behind the bus is
    /// logged and skipped over; the dropped events are not replayed.
    pub async fn recv(&mut self) -> Option<SensorEvent> {
        loop {
            let event = match self.rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(n)) => {
                    warn!("Sensor feed lagged by {} events", n);
                    continue;
                }
                Err(RecvError::Closed) => return None,
            };

            let Some(device) = event.device() else {
                trace!(event_type = %event.event_type, "Sensor event without device");
                continue;
            };
            let Some(kind) = self.sensors.kind_of(device) else {
                trace!(device, "Ignoring unmonitored device");
                continue;
            };
            if kind.topic() != event.event_type.as_str() {
                trace!(device, event_type = %event.event_type, "Device on unexpected topic");
                continue;
            }

            return Some(SensorEvent {
                kind,
                fields: event.data,
                context: event.context,
            });
        }
    }
}
