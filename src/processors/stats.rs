use crate::processors::window_aggregator::Admission;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared between the ingest path and the tick driver.
#[derive(Debug, Default)]
pub struct PipelineStats {
    lines_received: AtomicU64,
    parsed: AtomicU64,
    malformed: AtomicU64,
    unknown_station: AtomicU64,
    not_buffered: AtomicU64,
    dropped_oldest: AtomicU64,
    ticks: AtomicU64,
    tick_overruns: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub lines_received: u64,
    pub parsed: u64,
    pub malformed: u64,
    pub unknown_station: u64,
    /// Incoming observations the buffer cap refused.
    pub not_buffered: u64,
    /// Buffered observations pushed out early by the buffer cap.
    pub dropped_oldest: u64,
    pub ticks: u64,
    pub tick_overruns: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_line(&self) {
        self.lines_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parsed(&self, unknown_station: bool) {
        self.parsed.fetch_add(1, Ordering::Relaxed);
        if unknown_station {
            self.unknown_station.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Returns the running malformed count.
    pub fn record_malformed(&self) -> u64 {
        self.malformed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_admission(&self, admission: Admission) {
        match admission {
            Admission::Accepted => {}
            Admission::DroppedOldest => {
                self.dropped_oldest.fetch_add(1, Ordering::Relaxed);
            }
            Admission::DroppedNewest | Admission::Rejected => {
                self.not_buffered.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn record_tick(&self, overran: bool) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        if overran {
            self.tick_overruns.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            lines_received: self.lines_received.load(Ordering::Relaxed),
            parsed: self.parsed.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            unknown_station: self.unknown_station.load(Ordering::Relaxed),
            not_buffered: self.not_buffered.load(Ordering::Relaxed),
            dropped_oldest: self.dropped_oldest.load(Ordering::Relaxed),
            ticks: self.ticks.load(Ordering::Relaxed),
            tick_overruns: self.tick_overruns.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("Stream Summary:\n");
        summary.push_str(&format!("  Lines received: {}\n", self.lines_received));
        summary.push_str(&format!("  Parsed: {}\n", self.parsed));
        summary.push_str(&format!("  Malformed: {}\n", self.malformed));
        summary.push_str(&format!("  Unknown stations: {}\n", self.unknown_station));
        if self.not_buffered > 0 {
            summary.push_str(&format!("  Refused by buffer cap: {}\n", self.not_buffered));
        }
        if self.dropped_oldest > 0 {
            summary.push_str(&format!("  Evicted by buffer cap: {}\n", self.dropped_oldest));
        }
        summary.push_str(&format!(
            "  Ticks: {} ({} overran)\n",
            self.ticks, self.tick_overruns
        ));
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = PipelineStats::new();
        stats.record_line();
        stats.record_line();
        stats.record_parsed(true);
        assert_eq!(stats.record_malformed(), 1);
        stats.record_tick(false);
        stats.record_tick(true);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.lines_received, 2);
        assert_eq!(snapshot.parsed, 1);
        assert_eq!(snapshot.unknown_station, 1);
        assert_eq!(snapshot.malformed, 1);
        assert_eq!(snapshot.ticks, 2);
        assert_eq!(snapshot.tick_overruns, 1);
        assert!(snapshot.summary().contains("Ticks: 2 (1 overran)"));
        assert!(!snapshot.summary().contains("buffer cap"));
    }

    #[test]
    fn test_buffer_cap_counters() {
        let stats = PipelineStats::new();
        stats.record_admission(Admission::Accepted);
        stats.record_admission(Admission::DroppedOldest);
        stats.record_admission(Admission::DroppedOldest);
        stats.record_admission(Admission::DroppedNewest);
        stats.record_admission(Admission::Rejected);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.dropped_oldest, 2);
        assert_eq!(snapshot.not_buffered, 2);
        assert!(snapshot.summary().contains("Evicted by buffer cap: 2"));
        assert!(snapshot.summary().contains("Refused by buffer cap: 2"));
    }
}
