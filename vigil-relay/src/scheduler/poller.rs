//! Relay poller
//!
//! Polls the source for detection records and forwards admitted ones.
//! Cycles run strictly one after another and records within a cycle are
//! handled one at a time, in the order the source returned them.

use anyhow::{Context as AnyhowContext, Result};
use std::sync::Arc;
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use vigil_core::domain::record::LogRecord;
use vigil_core::dto::envelope::ForwardEnvelope;

use crate::config::Config;
use crate::repository::{ImageRepository, LogRepository, SinkRepository};
use crate::scheduler::outcome::{CycleReport, RecordOutcome, RelayStats};
use crate::service::{AdmissionPolicy, DedupTracker};

/// External services the poller talks to
#[derive(Clone)]
pub struct Repositories {
    pub logs: Arc<dyn LogRepository>,
    pub images: Arc<dyn ImageRepository>,
    pub sink: Arc<dyn SinkRepository>,
}

/// Poller that continuously relays detections from source to sink
pub struct RelayPoller {
    poll_interval: Duration,
    error_backoff: Duration,
    repos: Repositories,
    admission: Box<dyn AdmissionPolicy>,
    dedup: Box<dyn DedupTracker>,
    stats: RelayStats,
}

impl RelayPoller {
    /// Creates a new relay poller
    ///
    /// The dedup tracker is owned by the poller; nothing else mutates it.
    pub fn new(
        config: &Config,
        repos: Repositories,
        admission: Box<dyn AdmissionPolicy>,
        dedup: Box<dyn DedupTracker>,
    ) -> Self {
        Self {
            poll_interval: config.poll_interval,
            error_backoff: config.error_backoff,
            repos,
            admission,
            dedup,
            stats: RelayStats::default(),
        }
    }

    /// Lifetime totals
    pub fn stats(&self) -> &RelayStats {
        &self.stats
    }

    /// Starts the polling loop
    ///
    /// Runs until `cancel` fires. A failed cycle is logged and followed by
    /// the longer backoff pause; it never ends the loop.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        info!(
            "Starting relay poller (interval: {:?}, backoff: {:?})",
            self.poll_interval, self.error_backoff
        );

        while !cancel.is_cancelled() {
            let pause = match self.poll_once().await {
                Ok(report) => {
                    if report.forwarded > 0 || report.failed() > 0 {
                        info!(
                            "Cycle done: {} received, {} forwarded, {} failed, {} dropped, {} skipped",
                            report.received,
                            report.forwarded,
                            report.failed(),
                            report.dropped,
                            report.skipped
                        );
                    }
                    self.stats.add_cycle(&report);
                    self.poll_interval
                }
                Err(e) => {
                    error!("Error during poll cycle: {:#}", e);
                    self.stats.add_failed_cycle();
                    self.error_backoff
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = time::sleep(pause) => {}
            }
        }

        let stats = self.stats();
        info!(
            "Relay poller stopped after {} cycle(s) ({} failed): {} forwarded, {} failures, {} tracked as sent",
            stats.cycles,
            stats.failed_cycles,
            stats.forwarded,
            stats.failures,
            self.dedup.sent_count()
        );
        if let Some(at) = stats.last_forwarded_at {
            info!("Last delivery at {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
        }

        Ok(())
    }

    /// Performs a single poll cycle
    pub async fn poll_once(&mut self) -> Result<CycleReport> {
        let records = self
            .repos
            .logs
            .fetch_pending()
            .await
            .context("Failed to fetch detection logs")?;

        let mut report = CycleReport::default();

        if records.is_empty() {
            debug!("No detection records available");
            return Ok(report);
        }

        debug!("Processing {} detection record(s)", records.len());

        for record in &records {
            let outcome = self.process_record(record).await;
            if outcome.is_retry_eligible() {
                debug!("{} stays eligible for the next cycle", record.image_name);
            }
            report.record(outcome);
        }

        Ok(report)
    }

    /// Walks one record through admission, dedup, fetch and delivery
    async fn process_record(&mut self, record: &LogRecord) -> RecordOutcome {
        if !self.admission.admit(record) {
            debug!("Dropped low-confidence record {}", record);
            return RecordOutcome::Dropped;
        }

        if self.dedup.seen(&record.image_name) {
            debug!("Skipping already delivered image {}", record.image_name);
            return RecordOutcome::Skipped;
        }

        let image = match self.repos.images.fetch_image(&record.image_name).await {
            Ok(image) => image,
            Err(e) => {
                warn!("Fetch failed for {}: {:#}", record, e);
                return RecordOutcome::FetchFailed;
            }
        };

        let envelope = ForwardEnvelope::new(record, &image);

        match self.repos.sink.deliver(&envelope).await {
            Ok(()) => {
                self.dedup.mark_sent(&record.image_name);
                info!("Forwarded {} ({} bytes)", record, image.len());
                RecordOutcome::Forwarded
            }
            Err(e) => {
                warn!("Delivery failed for {}: {:#}", record, e);
                RecordOutcome::ForwardFailed
            }
        }
    }
}
