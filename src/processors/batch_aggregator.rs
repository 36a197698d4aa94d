use crate::error::{ProcessingError, RecordParseError, Result};
use crate::models::aggregate::{into_rows, merge_groups, GroupedAccumulators, GroupKey};
use crate::models::{AggregateRow, StationCatalog};
use crate::processors::enricher::enrich;
use crate::readers::observation_reader::split_lines;
use crate::readers::{ObservationParser, ObservationReader};
use crate::utils::progress::ProgressReporter;
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

const PROGRESS_STEP: usize = 4096;
const ERROR_SAMPLE_SIZE: usize = 5;

/// One-shot aggregation of a whole observation file, using the same
/// quality-aware reducer as the streaming window.
pub struct BatchAggregator {
    max_workers: usize,
    use_mmap: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total_lines: usize,
    pub parsed: usize,
    pub malformed: usize,
    pub unknown_station: usize,
    pub groups: usize,
    /// First few parse failures as (line number, reason).
    pub sample_errors: Vec<(usize, RecordParseError)>,
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub rows: Vec<AggregateRow>,
    pub report: BatchReport,
}

#[derive(Default)]
struct Partial {
    groups: GroupedAccumulators,
    parsed: usize,
    malformed: usize,
    unknown_station: usize,
    errors: Vec<(usize, RecordParseError)>,
}

impl Partial {
    fn absorb(
        mut self,
        line_number: usize,
        line: &[u8],
        parser: &ObservationParser,
        catalog: &StationCatalog,
    ) -> Self {
        let parsed = match std::str::from_utf8(line) {
            Ok(text) if text.trim().is_empty() => return self,
            Ok(text) => parser.parse(text),
            Err(e) => Err(RecordParseError::NotUtf8 {
                valid_up_to: e.valid_up_to(),
            }),
        };

        match parsed {
            Ok(observation) => {
                let enriched = enrich(observation, catalog);
                if enriched.is_unknown_station() {
                    self.unknown_station += 1;
                }
                self.groups
                    .entry(GroupKey::of(&enriched))
                    .or_default()
                    .add(&enriched.observation);
                self.parsed += 1;
            }
            Err(e) => {
                debug!(line = line_number, error = %e, "Skipping malformed observation");
                self.malformed += 1;
                if self.errors.len() < ERROR_SAMPLE_SIZE {
                    self.errors.push((line_number, e));
                }
            }
        }
        self
    }

    fn merge(mut self, other: Partial) -> Self {
        self.groups = merge_groups(self.groups, other.groups);
        self.parsed += other.parsed;
        self.malformed += other.malformed;
        self.unknown_station += other.unknown_station;
        self.errors.extend(other.errors);
        self
    }
}

impl BatchAggregator {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers,
            use_mmap: false,
        }
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Parse, enrich and aggregate every line of an observation file
    pub fn aggregate_file(
        &self,
        path: &Path,
        catalog: &StationCatalog,
        progress: Option<&ProgressReporter>,
    ) -> Result<BatchOutcome> {
        if let Some(p) = progress {
            p.set_message("Reading observations...");
        }

        let text = ObservationReader::with_mmap(self.use_mmap).open(path)?;
        let outcome = self.aggregate_lines(&text.lines(), catalog, progress)?;

        info!(
            path = %path.display(),
            lines = outcome.report.total_lines,
            parsed = outcome.report.parsed,
            malformed = outcome.report.malformed,
            groups = outcome.report.groups,
            "Aggregated observation file"
        );
        Ok(outcome)
    }

    pub fn aggregate_text(
        &self,
        text: &str,
        catalog: &StationCatalog,
        progress: Option<&ProgressReporter>,
    ) -> Result<BatchOutcome> {
        self.aggregate_lines(&split_lines(text.as_bytes()), catalog, progress)
    }

    /// Lines that are not valid UTF-8 count as malformed.
    pub fn aggregate_lines(
        &self,
        lines: &[&[u8]],
        catalog: &StationCatalog,
        progress: Option<&ProgressReporter>,
    ) -> Result<BatchOutcome> {
        let processed = AtomicUsize::new(0);
        let parser = ObservationParser::new();

        if let Some(p) = progress {
            p.set_message(&format!("Aggregating {} lines...", lines.len()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        let partial = pool.install(|| {
            lines
                .par_iter()
                .enumerate()
                .fold(Partial::default, |partial, (index, line)| {
                    let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
                    if count % PROGRESS_STEP == 0 {
                        if let Some(p) = progress {
                            p.update(count as u64);
                        }
                    }
                    partial.absorb(index + 1, line, &parser, catalog)
                })
                .reduce(Partial::default, Partial::merge)
        });

        let mut sample_errors = partial.errors;
        sample_errors.sort_by_key(|(line, _)| *line);
        sample_errors.truncate(ERROR_SAMPLE_SIZE);

        let report = BatchReport {
            total_lines: lines.len(),
            parsed: partial.parsed,
            malformed: partial.malformed,
            unknown_station: partial.unknown_station,
            groups: partial.groups.len(),
            sample_errors,
        };

        if let Some(p) = progress {
            p.finish_with_message(&format!("Aggregated {} observations", report.parsed));
        }

        Ok(BatchOutcome {
            rows: into_rows(partial.groups),
            report,
        })
    }
}

impl Default for BatchAggregator {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

impl BatchReport {
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("Observation Summary:\n");
        summary.push_str(&format!("  Lines: {}\n", self.total_lines));
        summary.push_str(&format!("  Parsed: {}\n", self.parsed));
        summary.push_str(&format!("  Malformed: {}\n", self.malformed));
        summary.push_str(&format!("  Unknown stations: {}\n", self.unknown_station));
        summary.push_str(&format!("  Country/year groups: {}\n", self.groups));
        if !self.sample_errors.is_empty() {
            summary.push_str("  First parse errors:\n");
            for (line, error) in &self.sample_errors {
                summary.push_str(&format!("    line {}: {}\n", line, error));
            }
        }
        summary
    }
}
