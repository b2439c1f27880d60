// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Detector Shared Plumbing
// ─────────────────────────────────────────────────────────────────────

use chrono::{DateTime, Utc};
use uuid::Uuid;

use recurgent_store::ManifoldStore;
use recurgent_types::{FieldDims, NumericalGuards, SignatureKind, SignatureRecord};

/// Read-only context shared by every detector call. `now` is explicit
/// so a fixed store snapshot yields identical records.
pub struct DetectorContext<'a> {
    pub store: &'a dyn ManifoldStore,
    pub dims: FieldDims,
    pub guards: NumericalGuards,
    pub now: DateTime<Utc>,
}

impl<'a> DetectorContext<'a> {
    pub fn new(store: &'a dyn ManifoldStore, now: DateTime<Utc>) -> Self {
        Self {
            store,
            dims: FieldDims::default(),
            guards: NumericalGuards::default(),
            now,
        }
    }
}

/// Assemble a detection record; severity is clamped on construction.
pub(crate) fn build_record(
    ctx: &DetectorContext<'_>,
    point_id: Uuid,
    kind: SignatureKind,
    severity: f64,
    geometric_signature: Vec<f64>,
    mathematical_evidence: String,
) -> SignatureRecord {
    let record = SignatureRecord::new(
        point_id,
        kind,
        severity,
        geometric_signature,
        mathematical_evidence,
        ctx.now,
    );
    log::info!(
        "{} severity {:.3} for point {}",
        kind.as_str(),
        record.severity,
        point_id
    );
    record
}

/// Mean of a slice; `None` when empty.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean per-step change of an ascending-in-time series; `None` below
/// two samples. Centering each value on the running mean cancels in
/// the consecutive differences, so this is the "change around the
/// mean" reduction in one pass.
pub(crate) fn mean_step_delta(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let steps = (values.len() - 1) as f64;
    Some((values[values.len() - 1] - values[0]) / steps)
}

/// Population variance; `None` when empty.
pub(crate) fn variance(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    Some(values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64)
}

/// L2 norm of the leading `take` components.
pub(crate) fn leading_norm(field: &[f64], take: usize) -> f64 {
    let take = take.min(field.len());
    field[..take].iter().map(|v| v * v).sum::<f64>().sqrt()
}
