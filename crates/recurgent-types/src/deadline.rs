// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Deadlines & Partial Results
// ─────────────────────────────────────────────────────────────────────
//! Cooperative cancellation. Every public call accepts a `Deadline`;
//! dense kernels check it at each outer index, windowed scans at each
//! row. A call that runs out of time returns whatever records were
//! finalized, flagged incomplete — no record is ever half-written.

use std::time::{Duration, Instant};

use crate::error::{RecurgentError, RecurgentResult};

/// Cooperative cancellation token.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline {
    started: Option<Instant>,
    at: Option<Instant>,
}

impl Deadline {
    /// No deadline; checks always pass.
    pub fn none() -> Self {
        Self::default()
    }

    /// Deadline `ms` milliseconds from now.
    pub fn in_millis(ms: u64) -> Self {
        let now = Instant::now();
        Self {
            started: Some(now),
            at: Some(now + Duration::from_millis(ms)),
        }
    }

    pub fn expired(&self) -> bool {
        match self.at {
            Some(at) => Instant::now() >= at,
            None => false,
        }
    }

    /// Propagate `DeadlineExceeded` when expired.
    pub fn check(&self) -> RecurgentResult<()> {
        if self.expired() {
            let elapsed_ms = self
                .started
                .map(|s| s.elapsed().as_millis() as u64)
                .unwrap_or(0);
            return Err(RecurgentError::DeadlineExceeded { elapsed_ms });
        }
        Ok(())
    }
}

/// Aggregate result: finalized records, skipped-row count, and whether
/// the call ran to completion.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome<T> {
    pub records: Vec<T>,
    /// Rows dropped for per-row errors; never silently zero when work
    /// was discarded.
    pub skipped: usize,
    /// False when a deadline truncated the call.
    pub complete: bool,
}

impl<T> BatchOutcome<T> {
    pub fn finished(records: Vec<T>) -> Self {
        Self {
            records,
            skipped: 0,
            complete: true,
        }
    }

    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
            complete: true,
        }
    }

    /// Fold another outcome into this one.
    pub fn absorb(&mut self, other: BatchOutcome<T>) {
        self.records.extend(other.records);
        self.skipped += other.skipped;
        self.complete &= other.complete;
    }
}
