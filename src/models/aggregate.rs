use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{EnrichedObservation, WeatherObservation};
use crate::utils::constants::{MAX_SENTINEL, MIN_SENTINEL};

/// Grouping key for aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub country: String,
    pub year: String,
}

impl GroupKey {
    pub fn of(observation: &EnrichedObservation) -> Self {
        Self {
            country: observation.country.clone(),
            year: observation.year().to_string(),
        }
    }
}

/// Quality-aware min/max reducer.
///
/// Starts at the crossed sentinels, so a group with no valid sample for a
/// metric reports `min = 9999` and `max = -9999` for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinMaxAccumulator {
    pub temp_min: i32,
    pub temp_max: i32,
    pub wind_min: i32,
    pub wind_max: i32,
    pub count: usize,
}

impl Default for MinMaxAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl MinMaxAccumulator {
    pub fn new() -> Self {
        Self {
            temp_min: MIN_SENTINEL,
            temp_max: MAX_SENTINEL,
            wind_min: MIN_SENTINEL,
            wind_max: MAX_SENTINEL,
            count: 0,
        }
    }

    pub fn add(&mut self, observation: &WeatherObservation) {
        self.temp_min = self.temp_min.min(observation.temperature_min_candidate());
        self.temp_max = self.temp_max.max(observation.temperature_max_candidate());
        self.wind_min = self.wind_min.min(observation.wind_min_candidate());
        self.wind_max = self.wind_max.max(observation.wind_max_candidate());
        self.count += 1;
    }

    /// Combine partial results computed over disjoint sets of observations.
    pub fn merge(&mut self, other: &MinMaxAccumulator) {
        self.temp_min = self.temp_min.min(other.temp_min);
        self.temp_max = self.temp_max.max(other.temp_max);
        self.wind_min = self.wind_min.min(other.wind_min);
        self.wind_max = self.wind_max.max(other.wind_max);
        self.count += other.count;
    }

    pub fn into_row(self, key: GroupKey) -> AggregateRow {
        AggregateRow {
            country: key.country,
            year: key.year,
            temp_min: self.temp_min,
            temp_max: self.temp_max,
            wind_min: self.wind_min,
            wind_max: self.wind_max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub country: String,
    pub year: String,
    pub temp_min: i32,
    pub temp_max: i32,
    pub wind_min: i32,
    pub wind_max: i32,
}

impl AggregateRow {
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.country, self.year, self.temp_min, self.temp_max, self.wind_min, self.wind_max
        )
    }
}

/// Everything one tick hands to the result consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick_time: DateTime<Utc>,
    pub retained: usize,
    pub evicted: usize,
    pub rows: Vec<AggregateRow>,
}

/// Partial per-group state, as produced by folding a slice of observations.
pub type GroupedAccumulators = HashMap<GroupKey, MinMaxAccumulator>;

pub fn fold_observations<'a, I>(observations: I) -> GroupedAccumulators
where
    I: IntoIterator<Item = &'a EnrichedObservation>,
{
    let mut groups = GroupedAccumulators::new();
    for observation in observations {
        groups
            .entry(GroupKey::of(observation))
            .or_default()
            .add(&observation.observation);
    }
    groups
}

pub fn merge_groups(mut left: GroupedAccumulators, right: GroupedAccumulators) -> GroupedAccumulators {
    for (key, acc) in right {
        left.entry(key).or_default().merge(&acc);
    }
    left
}

/// Turn grouped accumulators into rows, sorted by (country, year).
pub fn into_rows(groups: GroupedAccumulators) -> Vec<AggregateRow> {
    let mut rows: Vec<AggregateRow> = groups
        .into_iter()
        .map(|(key, acc)| acc.into_row(key))
        .collect();
    rows.sort_by(|a, b| a.country.cmp(&b.country).then_with(|| a.year.cmp(&b.year)));
    rows
}
