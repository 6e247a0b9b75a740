//! Event bus with topic-filtered pub/sub
//!
//! Sensor adapters fire readings on the bus under their topic (`rain`,
//! `temp`, `wind`, ...). Consumers subscribe to one topic, to a set of
//! topics through a [`FilteredReceiver`], or to everything.
//!
//! Every event goes through a single firehose channel as well as its
//! topic's channel. Subscribers of more than one topic read the firehose,
//! which keeps their events in firing order across topics.

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::marker::PhantomData;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, trace, warn};
use wx_core::{Context, Event, EventData, EventType};

const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

type RawEvent = Event<Value>;

pub struct EventBus {
    topics: DashMap<EventType, broadcast::Sender<RawEvent>>,
    firehose: broadcast::Sender<RawEvent>,
    capacity: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// A bus whose subscribers can fall up to `capacity` events behind
    /// before they start missing events
    pub fn with_capacity(capacity: usize) -> Self {
        let (firehose, _) = broadcast::channel(capacity);
        Self {
            topics: DashMap::new(),
            firehose,
            capacity,
        }
    }

    /// Subscribe to a single topic
    pub fn subscribe(&self, event_type: impl Into<EventType>) -> broadcast::Receiver<RawEvent> {
        let event_type = event_type.into();
        trace!(event_type = %event_type, "Subscribing to topic");

        self.topics
            .entry(event_type)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Subscribe to several topics through one ordered receiver
    pub fn subscribe_filtered<I, T>(&self, event_types: I) -> FilteredReceiver
    where
        I: IntoIterator<Item = T>,
        T: Into<EventType>,
    {
        let event_types: HashSet<EventType> = event_types.into_iter().map(Into::into).collect();
        debug!(topics = event_types.len(), "Subscribing to topic set");
        FilteredReceiver {
            rx: self.firehose.subscribe(),
            event_types,
        }
    }

    /// Subscribe to a payload type's topic, decoding each event
    pub fn subscribe_typed<T: EventData + DeserializeOwned>(&self) -> TypedEventReceiver<T> {
        TypedEventReceiver {
            rx: self.subscribe(T::event_type()),
            _payload: PhantomData,
        }
    }

    /// Subscribe to every event
    pub fn subscribe_all(&self) -> broadcast::Receiver<RawEvent> {
        self.firehose.subscribe()
    }

    /// Publish an event
    ///
    /// Having no subscribers is not an error; the event is dropped.
    pub fn fire(&self, event: RawEvent) {
        trace!(event_type = %event.event_type, "Firing event");

        if let Some(sender) = self.topics.get(&event.event_type) {
            let _ = sender.send(event.clone());
        }
        let _ = self.firehose.send(event);
    }

    /// Publish a typed payload under its own topic
    pub fn fire_typed<T: EventData + Serialize>(&self, data: T, context: Context) {
        let event = Event::typed(data, context);
        match event.try_map_data(|data| serde_json::to_value(&data)) {
            Ok(event) => self.fire(event),
            Err(e) => warn!(event_type = T::event_type(), error = %e, "Unserializable payload"),
        }
    }

    /// Number of topics with their own channel
    pub fn listener_count(&self) -> usize {
        self.topics.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Events of a fixed set of topics, in firing order
pub struct FilteredReceiver {
    rx: broadcast::Receiver<RawEvent>,
    event_types: HashSet<EventType>,
}

impl FilteredReceiver {
    pub async fn recv(&mut self) -> Result<RawEvent, RecvError> {
        loop {
            let event = self.rx.recv().await?;
            if self.accepts(&event.event_type) {
                return Ok(event);
            }
        }
    }

    pub fn accepts(&self, event_type: &EventType) -> bool {
        self.event_types.contains(event_type)
    }
}

/// Events of one topic decoded into `T`
///
/// Events whose payload doesn't decode are skipped.
pub struct TypedEventReceiver<T> {
    rx: broadcast::Receiver<RawEvent>,
    _payload: PhantomData<T>,
}

impl<T: EventData + DeserializeOwned> TypedEventReceiver<T> {
    pub async fn recv(&mut self) -> Result<Event<T>, RecvError> {
        loop {
            if let Some(event) = decode(self.rx.recv().await?) {
                return Ok(event);
            }
        }
    }

    pub fn try_recv(&mut self) -> Result<Event<T>, TryRecvError> {
        loop {
            if let Some(event) = decode(self.rx.try_recv()?) {
                return Ok(event);
            }
        }
    }
}

fn decode<T: DeserializeOwned>(event: RawEvent) -> Option<Event<T>> {
    match event.try_map_data(serde_json::from_value) {
        Ok(event) => Some(event),
        Err(e) => {
            trace!(error = %e, "Skipping event with unexpected payload");
            None
        }
    }
}
