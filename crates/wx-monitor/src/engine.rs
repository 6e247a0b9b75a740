//! Weather engine
//!
//! A single task owns the rolling state and waits on two inputs: the sensor
//! feed and the daily ticker. Each input is handled to completion before the
//! next one is taken, so state updates are never interleaved.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use wx_core::Context;

use crate::alert::{AlertMessage, AlertSink};
use crate::detector::TransitionDetector;
use crate::digest::DigestBuilder;
use crate::feed::SensorFeed;
use crate::reading::SensorEvent;
use crate::scheduler::Ticker;
use crate::state::RollingState;
use crate::timeseries::TimeSeriesSource;

/// Handle for stopping a running engine
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: broadcast::Sender<()>,
}

impl ShutdownHandle {
    /// Ask the engine to stop after the input it is currently handling
    ///
    /// A request made before the engine starts running is kept and honoured
    /// on start.
    pub fn shutdown(&self) {
        let _ = self.tx.send(());
    }
}

/// Monitors sensor readings and sends the daily digest
pub struct WeatherEngine<T, S> {
    detector: TransitionDetector,
    digest: DigestBuilder<T>,
    sink: S,
    state: RollingState,
    shutdown_tx: broadcast::Sender<()>,
    /// Subscribed at construction so an early shutdown request isn't lost
    shutdown_rx: Option<broadcast::Receiver<()>>,
}

impl<T, S> WeatherEngine<T, S>
where
    T: TimeSeriesSource + 'static,
    S: AlertSink + 'static,
{
    pub fn new(detector: TransitionDetector, digest: DigestBuilder<T>, sink: S) -> Self {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        Self {
            detector,
            digest,
            sink,
            state: RollingState::new(),
            shutdown_tx,
            shutdown_rx: Some(shutdown_rx),
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    pub fn state(&self) -> &RollingState {
        &self.state
    }

    /// Handle one sensor event
    ///
    /// A reading that fails to decode is logged and dropped; the state is
    /// left untouched.
    pub async fn handle_event(&mut self, event: SensorEvent) {
        let reading = match event.decode() {
            Ok(reading) => reading,
            Err(e) => {
                warn!(kind = %event.kind, error = %e, "Skipping malformed reading");
                return;
            }
        };

        let alerts = self.detector.process(&mut self.state, &reading);
        for alert in alerts {
            self.send(&alert, &event.context).await;
        }
    }

    /// Handle a daily tick by sending the digest
    pub async fn handle_tick(&mut self) {
        debug!("Building daily digest");
        let alert = self.digest.alert().await;
        self.send(&alert, &Context::new()).await;
    }

    async fn send(&self, alert: &AlertMessage, context: &Context) {
        if let Err(e) = self.sink.send(alert, context).await {
            warn!(subtopic = %alert.subtopic, error = %e, "Failed to send alert");
        }
    }

    /// Run until shutdown is requested or the feed closes
    pub async fn run<K: Ticker>(mut self, mut feed: SensorFeed, mut ticker: K) {
        let mut shutdown_rx = self
            .shutdown_rx
            .take()
            .unwrap_or_else(|| self.shutdown_tx.subscribe());
        info!(windy = self.detector.windy(), "Starting weather engine");

        loop {
            tokio::select! {
                event = feed.recv() => {
                    match event {
                        Some(event) => {
                            trace!(kind = %event.kind, "Sensor event");
                            self.handle_event(event).await;
                        }
                        None => {
                            info!("Event bus closed, stopping weather engine");
                            break;
                        }
                    }
                }
                Some(()) = ticker.tick() => {
                    self.handle_tick().await;
                }
                _ = shutdown_rx.recv() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        info!("Weather engine stopped");
    }

    /// Run on a new task
    pub fn spawn<K: Ticker + 'static>(self, feed: SensorFeed, ticker: K) -> JoinHandle<()> {
        tokio::spawn(self.run(feed, ticker))
    }
}
