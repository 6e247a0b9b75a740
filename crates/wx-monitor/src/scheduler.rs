//! Daily tick scheduling
//!
//! [`DailySchedule`] fires at a fixed offset from local midnight and then
//! every `repeat`. Missed ticks are not caught up: after a late wake-up the
//! next fire is computed from the current time.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone};
use tokio::sync::mpsc;
use tracing::debug;

/// A source of payload-free ticks
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick; `None` once the ticker is exhausted
    async fn tick(&mut self) -> Option<()>;
}

/// Fire times: midnight + `offset`, then every `repeat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    offset: Duration,
    repeat: Duration,
}

impl DailySchedule {
    pub fn new(offset: Duration, repeat: Duration) -> Self {
        let repeat = if repeat <= Duration::zero() {
            Duration::days(1)
        } else {
            repeat
        };
        Self { offset, repeat }
    }

    /// Once a day at `time`
    pub fn daily_at(time: NaiveTime) -> Self {
        Self::new(time - NaiveTime::MIN, Duration::days(1))
    }

    /// The first fire time strictly after `now`
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let midnight = now.date_naive().and_time(NaiveTime::MIN);
        let mut naive = midnight + self.offset;

        loop {
            // Local times skipped by a DST change have no mapping; move on
            // to the next repeat.
            if let Some(candidate) = tz.from_local_datetime(&naive).earliest() {
                if candidate > *now {
                    return candidate;
                }
            }
            naive += self.repeat;
        }
    }

    /// The next fire time, never at or before `last_fired`
    ///
    /// Holds when the wall clock is stepped back after a tick.
    pub fn next_fire<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        last_fired: Option<&DateTime<Tz>>,
    ) -> DateTime<Tz> {
        match last_fired {
            Some(last) if last > now => self.next_after(last),
            _ => self.next_after(now),
        }
    }
}

/// Sleeps until each fire time of a [`DailySchedule`] in local time
pub struct DailyScheduler {
    schedule: DailySchedule,
    last_fired: Option<DateTime<Local>>,
}

impl DailyScheduler {
    pub fn new(schedule: DailySchedule) -> Self {
        Self {
            schedule,
            last_fired: None,
        }
    }
}

#[async_trait]
impl Ticker for DailyScheduler {
    async fn tick(&mut self) -> Option<()> {
        let now = Local::now();
        let next = self.schedule.next_fire(&now, self.last_fired.as_ref());
        debug!(next = %next, "Next scheduled tick");

        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;
        self.last_fired = Some(next);
        Some(())
    }
}

/// Ticks sent through a channel, for manual triggering
#[async_trait]
impl Ticker for mpsc::Receiver<()> {
    async fn tick(&mut self) -> Option<()> {
        self.recv().await
    }
}
