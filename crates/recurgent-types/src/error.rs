// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Recurgent Kernel Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all Recurgent Kernel failures.
#[derive(Error, Debug)]
pub enum RecurgentError {
    /// A required field of a point or coupling is absent.
    /// Detectors swallow this and emit no record; kernel routines propagate.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// Vector or matrix shape inconsistent with the configured dimensions.
    /// Always fatal to the call.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Matrix inversion failed even after Tikhonov regularization.
    /// Callers may retry with a larger diagonal addition.
    #[error("singular matrix: pivot below {pivot_eps:e} at column {column}")]
    SingularMatrix { column: usize, pivot_eps: f64 },

    /// Cooperative cancellation: the call's deadline elapsed.
    #[error("deadline exceeded after {elapsed_ms}ms")]
    DeadlineExceeded { elapsed_ms: u64 },

    /// Opaque backing-store failure, propagated and never retried here.
    #[error("store error: {0}")]
    Store(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Numerical error (NaN/Inf escaped a guarded computation).
    #[error("numerical error: {0}")]
    Numerical(String),
}

pub type RecurgentResult<T> = Result<T, RecurgentError>;

impl RecurgentError {
    /// True for the one error kind detectors absorb into "no record".
    pub fn is_missing_input(&self) -> bool {
        matches!(self, RecurgentError::MissingInput(_))
    }
}
