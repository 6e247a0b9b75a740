//! Outbound alerts
//!
//! The engine hands every alert to an [`AlertSink`]. Deduplication is the
//! sink's business: each alert names a subtopic and a suppression interval,
//! and the downstream notifier drops repeats of a subtopic inside that
//! interval.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;
use wx_core::events::AlertData;
use wx_core::Context;
use wx_event_bus::EventBus;

/// Suppression interval used by the real-time detectors
pub const REALTIME_INTERVAL: Duration = Duration::from_secs(7200);

/// Alert sink errors
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("alert delivery failed: {0}")]
    Delivery(String),
}

/// A message for the notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    /// Tag the notifier deduplicates on
    pub subtopic: String,
    pub body: String,
    /// Minimum time between two alerts of this subtopic; zero always sends
    pub interval: Duration,
}

impl AlertMessage {
    pub fn new(subtopic: impl Into<String>, body: impl Into<String>, interval: Duration) -> Self {
        Self {
            subtopic: subtopic.into(),
            body: body.into(),
            interval,
        }
    }

    /// A real-time alert, suppressed for two hours per subtopic
    pub fn realtime(subtopic: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(subtopic, body, REALTIME_INTERVAL)
    }
}

/// Destination for alerts
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Deliver an alert raised while handling the input with `context`
    async fn send(&self, alert: &AlertMessage, context: &Context) -> Result<(), AlertError>;
}

#[async_trait]
impl<S: AlertSink + ?Sized> AlertSink for Arc<S> {
    async fn send(&self, alert: &AlertMessage, context: &Context) -> Result<(), AlertError> {
        (**self).send(alert, context).await
    }
}

/// Publishes alerts as `alert` events on the bus
pub struct BusAlertSink {
    bus: Arc<EventBus>,
    target: String,
}

impl BusAlertSink {
    pub fn new(bus: Arc<EventBus>, target: impl Into<String>) -> Self {
        Self {
            bus,
            target: target.into(),
        }
    }
}

#[async_trait]
impl AlertSink for BusAlertSink {
    async fn send(&self, alert: &AlertMessage, context: &Context) -> Result<(), AlertError> {
        info!(
            subtopic = %alert.subtopic,
            target = %self.target,
            "Sending alert: {}",
            alert.body
        );
        self.bus.fire_typed(
            AlertData {
                message: alert.body.clone(),
                target: self.target.clone(),
                subtopic: alert.subtopic.clone(),
                interval: alert.interval.as_secs(),
            },
            context.child(),
        );
        Ok(())
    }
}
