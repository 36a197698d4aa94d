use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::warn;

/// Fixed-cadence tick source, aligned to the moment it was created.
///
/// Ticks are handed out one at a time: the caller finishes a tick before it
/// asks for the next one. A tick that outlasts the period pushes the next
/// one back rather than letting two run together.
pub struct TickScheduler {
    interval: Interval,
    period: Duration,
    ticks: u64,
}

impl TickScheduler {
    /// Must be called from within a tokio runtime.
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval,
            period,
            ticks: 0,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Wait for the next firing. Cancel-safe.
    pub async fn next_tick(&mut self) -> Instant {
        self.interval.tick().await
    }

    /// Mark the tick started at `started` as done. Returns true when it
    /// overran the period.
    pub fn complete(&mut self, started: Instant) -> bool {
        self.ticks += 1;
        let elapsed = started.elapsed();
        if elapsed > self.period {
            warn!(
                tick = self.ticks,
                elapsed_ms = elapsed.as_millis() as u64,
                period_ms = self.period.as_millis() as u64,
                "Tick overran its interval, next tick deferred"
            );
            return true;
        }
        false
    }
}
