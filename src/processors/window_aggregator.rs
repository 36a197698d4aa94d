//! Sliding time window over enriched observations.
//!
//! Observations are buffered in arrival order. Every tick evicts whatever
//! has aged out of the window and recomputes the (country, year) aggregates
//! from scratch over what is left.

use crate::models::aggregate::{fold_observations, into_rows};
use crate::models::{AggregateRow, EnrichedObservation, TickReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Nothing has been added yet.
    Empty,
    Accumulating,
    /// Inside `on_tick`.
    Flushing,
}

/// What to do when a capped buffer is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    #[default]
    DropOldest,
    DropNewest,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    /// Accepted after evicting the oldest buffered observation.
    DroppedOldest,
    /// The incoming observation was discarded.
    DroppedNewest,
    Rejected,
}

impl Admission {
    pub fn is_buffered(&self) -> bool {
        matches!(self, Admission::Accepted | Admission::DroppedOldest)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSettings {
    pub window_length: Duration,
    /// `None` keeps the buffer bounded by time only.
    pub max_buffered: Option<usize>,
    pub overflow_policy: OverflowPolicy,
}

impl WindowSettings {
    pub fn new(window_length: Duration) -> Self {
        Self {
            window_length,
            max_buffered: None,
            overflow_policy: OverflowPolicy::default(),
        }
    }

    pub fn with_max_buffered(mut self, max_buffered: Option<usize>, policy: OverflowPolicy) -> Self {
        self.max_buffered = max_buffered;
        self.overflow_policy = policy;
        self
    }
}

/// Result of one tick, before it is stamped with wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowFlush {
    pub evicted: usize,
    pub retained: usize,
    pub rows: Vec<AggregateRow>,
}

impl WindowFlush {
    pub fn into_report(self, tick_time: DateTime<Utc>) -> TickReport {
        TickReport {
            tick_time,
            retained: self.retained,
            evicted: self.evicted,
            rows: self.rows,
        }
    }
}

#[derive(Debug)]
struct Buffered {
    arrival: Instant,
    observation: EnrichedObservation,
}

#[derive(Debug)]
pub struct WindowAggregator {
    settings: WindowSettings,
    buffer: VecDeque<Buffered>,
    state: WindowState,
}

impl WindowAggregator {
    pub fn new(settings: WindowSettings) -> Self {
        Self {
            settings,
            buffer: VecDeque::new(),
            state: WindowState::Empty,
        }
    }

    pub fn settings(&self) -> &WindowSettings {
        &self.settings
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Buffer an observation. Arrival times must be non-decreasing.
    pub fn add(&mut self, observation: EnrichedObservation, arrival: Instant) -> Admission {
        debug_assert!(self.buffer.back().map_or(true, |last| last.arrival <= arrival));

        let mut admission = Admission::Accepted;
        if let Some(max) = self.settings.max_buffered {
            if self.buffer.len() >= max {
                match self.settings.overflow_policy {
                    OverflowPolicy::DropOldest => {
                        self.buffer.pop_front();
                        admission = Admission::DroppedOldest;
                    }
                    OverflowPolicy::DropNewest => return Admission::DroppedNewest,
                    OverflowPolicy::Reject => return Admission::Rejected,
                }
            }
        }

        self.buffer.push_back(Buffered {
            arrival,
            observation,
        });
        self.state = WindowState::Accumulating;
        admission
    }

    /// Evict stale observations and recompute every group.
    ///
    /// An observation that arrived at `t` is part of every tick in
    /// `[t, t + window_length)` and of none after.
    pub fn on_tick(&mut self, now: Instant) -> WindowFlush {
        let previous = self.state;
        self.state = WindowState::Flushing;

        let evicted = self.evict(now);
        let groups = fold_observations(self.buffer.iter().map(|b| &b.observation));
        let flush = WindowFlush {
            evicted,
            retained: self.buffer.len(),
            rows: into_rows(groups),
        };

        self.state = match previous {
            WindowState::Empty => WindowState::Empty,
            _ => WindowState::Accumulating,
        };
        flush
    }

    fn evict(&mut self, now: Instant) -> usize {
        let window = self.settings.window_length;
        let mut evicted = 0;
        while let Some(front) = self.buffer.front() {
            if now.saturating_duration_since(front.arrival) < window {
                break;
            }
            self.buffer.pop_front();
            evicted += 1;
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeatherObservation;
    use pretty_assertions::assert_eq;

    const WINDOW: Duration = Duration::from_secs(10);

    fn enriched(country: &str, date: &str, temp: i32, temp_q: u8, wind: i32, wind_q: u8) -> EnrichedObservation {
        EnrichedObservation {
            observation: WeatherObservation {
                usaf: "725300".into(),
                wban: "94846".into(),
                date: date.into(),
                air_temperature: temp,
                air_temperature_quality: temp_q,
                wind_speed: wind,
                wind_speed_quality: wind_q,
            },
            country: country.into(),
        }
    }

    fn row(country: &str, year: &str, t: (i32, i32), w: (i32, i32)) -> AggregateRow {
        AggregateRow {
            country: country.into(),
            year: year.into(),
            temp_min: t.0,
            temp_max: t.1,
            wind_min: w.0,
            wind_max: w.1,
        }
    }

    #[test]
    fn test_invalid_quality_never_wins() {
        let start = Instant::now();
        let mut window = WindowAggregator::new(WindowSettings::new(WINDOW));

        window.add(enriched("US", "20130101", 50, 1, 9999, 9), start);
        window.add(enriched("US", "20130102", -300, 9, 9999, 9), start);
        window.add(enriched("US", "20130103", 400, 2, 9999, 9), start);

        let flush = window.on_tick(start + Duration::from_secs(1));

        assert_eq!(flush.rows, vec![row("US", "2013", (50, 50), (9999, -9999))]);
    }

    #[test]
    fn test_all_invalid_group_reports_crossed_bounds() {
        let start = Instant::now();
        let mut window = WindowAggregator::new(WindowSettings::new(WINDOW));
        window.add(enriched("NO", "20140101", 12, 9, 30, 1), start);

        let flush = window.on_tick(start);

        assert_eq!(flush.rows, vec![row("NO", "2014", (9999, -9999), (30, 30))]);
    }

    #[test]
    fn test_window_boundaries() {
        let start = Instant::now();
        let mut window = WindowAggregator::new(WindowSettings::new(WINDOW));
        window.add(enriched("US", "20130101", 50, 1, 20, 1), start);

        assert_eq!(window.on_tick(start).retained, 1);
        assert_eq!(window.on_tick(start + Duration::from_millis(9_999)).retained, 1);

        let expired = window.on_tick(start + WINDOW);
        assert_eq!(expired.evicted, 1);
        assert_eq!(expired.retained, 0);
        assert!(expired.rows.is_empty());
    }

    #[test]
    fn test_eviction_keeps_newer_observations() {
        let start = Instant::now();
        let mut window = WindowAggregator::new(WindowSettings::new(WINDOW));
        window.add(enriched("US", "20130101", -100, 1, 20, 1), start);
        window.add(enriched("US", "20130101", 80, 1, 40, 1), start + Duration::from_secs(5));

        let before = window.on_tick(start + Duration::from_secs(6));
        assert_eq!(before.rows, vec![row("US", "2013", (-100, 80), (20, 40))]);

        let after = window.on_tick(start + Duration::from_secs(12));
        assert_eq!(after.evicted, 1);
        assert_eq!(after.rows, vec![row("US", "2013", (80, 80), (40, 40))]);
    }

    #[test]
    fn test_every_group_appears_once() {
        let start = Instant::now();
        let mut window = WindowAggregator::new(WindowSettings::new(WINDOW));
        for (country, date) in [
            ("US", "20130101"),
            ("US", "20130505"),
            ("US", "20140101"),
            ("NO", "20130101"),
            ("unknown", "20130101"),
        ] {
            window.add(enriched(country, date, 10, 1, 10, 1), start);
        }

        let flush = window.on_tick(start);
        let keys: Vec<(String, String)> = flush
            .rows
            .iter()
            .map(|r| (r.country.clone(), r.year.clone()))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("NO".to_string(), "2013".to_string()),
                ("US".to_string(), "2013".to_string()),
                ("US".to_string(), "2014".to_string()),
                ("unknown".to_string(), "2013".to_string()),
            ]
        );
    }

    #[test]
    fn test_state_transitions() {
        let start = Instant::now();
        let mut window = WindowAggregator::new(WindowSettings::new(WINDOW));
        assert_eq!(window.state(), WindowState::Empty);

        window.on_tick(start);
        assert_eq!(window.state(), WindowState::Empty);

        window.add(enriched("US", "20130101", 1, 1, 1, 1), start);
        assert_eq!(window.state(), WindowState::Accumulating);

        window.on_tick(start + WINDOW);
        assert_eq!(window.state(), WindowState::Accumulating);
        assert!(window.is_empty());
    }

    #[test]
    fn test_overflow_policies() {
        let start = Instant::now();
        let obs = |temp| enriched("US", "20130101", temp, 1, 0, 1);

        let mut oldest = WindowAggregator::new(
            WindowSettings::new(WINDOW).with_max_buffered(Some(2), OverflowPolicy::DropOldest),
        );
        assert_eq!(oldest.add(obs(1), start), Admission::Accepted);
        assert_eq!(oldest.add(obs(2), start), Admission::Accepted);
        assert_eq!(oldest.add(obs(3), start), Admission::DroppedOldest);
        assert_eq!(oldest.on_tick(start).rows[0].temp_min, 2);

        let mut newest = WindowAggregator::new(
            WindowSettings::new(WINDOW).with_max_buffered(Some(2), OverflowPolicy::DropNewest),
        );
        newest.add(obs(1), start);
        newest.add(obs(2), start);
        assert_eq!(newest.add(obs(3), start), Admission::DroppedNewest);
        assert_eq!(newest.on_tick(start).rows[0].temp_max, 2);

        let mut reject = WindowAggregator::new(
            WindowSettings::new(WINDOW).with_max_buffered(Some(1), OverflowPolicy::Reject),
        );
        reject.add(obs(1), start);
        let admission = reject.add(obs(2), start);
        assert_eq!(admission, Admission::Rejected);
        assert!(!admission.is_buffered());
        assert_eq!(reject.len(), 1);
    }
}
