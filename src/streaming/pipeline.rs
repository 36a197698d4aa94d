//! Stream driver: one task feeds parsed, enriched lines into the shared
//! window while the tick loop periodically flushes it to the sink.

use crate::config::StreamConfig;
use crate::error::{ProcessingError, Result};
use crate::models::StationCatalog;
use crate::processors::{Admission, Enricher, PipelineStats, StatsSnapshot, WindowAggregator};
use crate::readers::ObservationParser;
use crate::streaming::line_source::LineStream;
use crate::streaming::scheduler::TickScheduler;
use crate::utils::constants::MALFORMED_WARN_EVERY;
use crate::writers::ResultSink;
use chrono::Utc;
use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub struct StreamingPipeline {
    enricher: Enricher,
    window: Arc<Mutex<WindowAggregator>>,
    tick_interval: Duration,
    stats: Arc<PipelineStats>,
}

impl StreamingPipeline {
    pub fn new(catalog: Arc<StationCatalog>, config: &StreamConfig) -> Self {
        Self {
            enricher: Enricher::new(catalog),
            window: Arc::new(Mutex::new(WindowAggregator::new(config.window_settings()))),
            tick_interval: config.tick_interval(),
            stats: Arc::new(PipelineStats::new()),
        }
    }

    pub fn stats(&self) -> Arc<PipelineStats> {
        self.stats.clone()
    }

    /// Run until shutdown is signalled, or until a finite source has ended
    /// and the window has drained.
    pub async fn run(
        self,
        lines: LineStream,
        mut sink: Box<dyn ResultSink>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<StatsSnapshot> {
        let window_length = self.window.lock().await.settings().window_length;
        info!(
            window_ms = window_length.as_millis() as u64,
            tick_ms = self.tick_interval.as_millis() as u64,
            "Starting stream aggregation"
        );

        let mut ingest = tokio::spawn(ingest_lines(
            lines,
            self.enricher.clone(),
            self.window.clone(),
            self.stats.clone(),
        ));
        let mut source_open = true;
        let mut listening = true;
        let mut scheduler = TickScheduler::new(self.tick_interval);

        let outcome: Result<()> = loop {
            tokio::select! {
                signal = shutdown.recv(), if listening => match signal {
                    // Nobody left to ask for shutdown.
                    Err(broadcast::error::RecvError::Closed) => listening = false,
                    _ => {
                        info!("Shutdown requested");
                        break Ok(());
                    }
                },
                joined = &mut ingest, if source_open => {
                    source_open = false;
                    match joined {
                        Ok(Ok(())) => info!("Line source closed, draining window"),
                        Ok(Err(e)) => warn!(error = %e, "Line source failed, draining window"),
                        Err(e) => break Err(ProcessingError::from(e)),
                    }
                }
                _ = scheduler.next_tick() => {
                    let started = Instant::now();
                    let flush = self.window.lock().await.on_tick(started);
                    let drained = !source_open && flush.retained == 0;

                    debug!(
                        retained = flush.retained,
                        evicted = flush.evicted,
                        groups = flush.rows.len(),
                        "Tick"
                    );
                    if let Err(e) = sink.emit(&flush.into_report(Utc::now())) {
                        break Err(e);
                    }

                    let overran = scheduler.complete(started);
                    self.stats.record_tick(overran);
                    if drained {
                        info!("Window drained");
                        break Ok(());
                    }
                }
            }
        };

        // Timer first, then the producer, then the buffer.
        drop(scheduler);
        if source_open {
            ingest.abort();
            let _ = ingest.await;
        }
        drop(self.window);

        let finished = sink.finish();
        outcome?;
        finished?;

        let snapshot = self.stats.snapshot();
        info!(
            lines = snapshot.lines_received,
            parsed = snapshot.parsed,
            malformed = snapshot.malformed,
            ticks = snapshot.ticks,
            "Stream aggregation stopped"
        );
        Ok(snapshot)
    }
}

async fn ingest_lines(
    mut lines: LineStream,
    enricher: Enricher,
    window: Arc<Mutex<WindowAggregator>>,
    stats: Arc<PipelineStats>,
) -> Result<()> {
    let parser = ObservationParser::new();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return Ok(()),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                stats.record_line();
                note_malformed(&stats, &e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        stats.record_line();

        if line.trim().is_empty() {
            continue;
        }

        let observation = match parser.parse(&line) {
            Ok(observation) => observation,
            Err(e) => {
                note_malformed(&stats, &e);
                continue;
            }
        };

        let enriched = enricher.enrich(observation);
        stats.record_parsed(enriched.is_unknown_station());

        let admission = {
            let mut window = window.lock().await;
            window.add(enriched, Instant::now())
        };
        stats.record_admission(admission);
        match admission {
            Admission::Accepted => {}
            Admission::DroppedOldest => debug!("Window full, dropped oldest observation"),
            Admission::DroppedNewest => debug!("Window full, dropped incoming observation"),
            Admission::Rejected => warn!("Window full, observation rejected"),
        }
    }
}

fn note_malformed(stats: &PipelineStats, error: &dyn std::fmt::Display) {
    let count = stats.record_malformed();
    debug!(error = %error, "Dropping malformed observation line");
    if count == 1 || count % MALFORMED_WARN_EVERY == 0 {
        warn!(malformed = count, "Malformed observation lines are being dropped");
    }
}
