//! Per-record outcomes and cycle accounting

use chrono::{DateTime, Utc};

/// Terminal state of one record within one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Below the admission threshold
    Dropped,
    /// Already delivered in an earlier cycle
    Skipped,
    /// Image fetch failed; eligible again next cycle
    FetchFailed,
    /// Sink did not confirm; eligible again next cycle
    ForwardFailed,
    /// Sink confirmed; recorded as sent
    Forwarded,
}

impl RecordOutcome {
    /// Whether the record may be offered again with a different result
    pub fn is_retry_eligible(self) -> bool {
        matches!(self, Self::FetchFailed | Self::ForwardFailed)
    }
}

/// Counts of record outcomes for a single poll cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub received: usize,
    pub dropped: usize,
    pub skipped: usize,
    pub fetch_failed: usize,
    pub forward_failed: usize,
    pub forwarded: usize,
}

impl CycleReport {
    /// Counts one processed record
    pub fn record(&mut self, outcome: RecordOutcome) {
        self.received += 1;
        match outcome {
            RecordOutcome::Dropped => self.dropped += 1,
            RecordOutcome::Skipped => self.skipped += 1,
            RecordOutcome::FetchFailed => self.fetch_failed += 1,
            RecordOutcome::ForwardFailed => self.forward_failed += 1,
            RecordOutcome::Forwarded => self.forwarded += 1,
        }
    }

    /// Records that failed and will be retried if re-offered
    pub fn failed(&self) -> usize {
        self.fetch_failed + self.forward_failed
    }
}

/// Running totals over the relay's lifetime
#[derive(Debug, Clone, Default)]
pub struct RelayStats {
    /// Cycles that completed
    pub cycles: u64,
    /// Cycles aborted before per-record handling
    pub failed_cycles: u64,
    /// Records forwarded
    pub forwarded: u64,
    /// Fetch and delivery failures
    pub failures: u64,
    /// Time of the most recent confirmed delivery
    pub last_forwarded_at: Option<DateTime<Utc>>,
}

impl RelayStats {
    /// Folds a completed cycle into the totals
    pub fn add_cycle(&mut self, report: &CycleReport) {
        self.cycles += 1;
        self.forwarded += report.forwarded as u64;
        self.failures += report.failed() as u64;
        if report.forwarded > 0 {
            self.last_forwarded_at = Some(Utc::now());
        }
    }

    /// Counts a cycle that failed as a whole
    pub fn add_failed_cycle(&mut self) {
        self.failed_cycles += 1;
    }
}
