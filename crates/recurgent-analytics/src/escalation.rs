// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Escalation Trajectory Scoring
// ─────────────────────────────────────────────────────────────────────
//! Per-step dynamics along an ordered trajectory of points:
//!
//!   velocity     = distance(C_curr, C_prev) / max(dt_seconds, 1)
//!   acceleration = scalar_curvature * velocity
//!   trajectory   = escalating ? acceleration * M * 2 : acceleration * 0.5
//!   urgency      = unregulated spike ? clip(acceleration * M * 1.5) : floor
//!
//! One record per non-initial point; unresolvable or field-less points
//! are counted and skipped.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use recurgent_geometry::field_distance;
use recurgent_store::ManifoldStore;
use recurgent_types::{
    clamp_severity, BatchOutcome, Deadline, EscalationRecord, FieldDims, ManifoldPoint,
    RecurgentResult,
};

/// Escalation scoring thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationParams {
    /// Acceleration above which trajectory amplification applies.
    pub acceleration_min: f64,
    /// Semantic mass above which it applies.
    pub mass_min: f64,
    /// Acceleration above which urgency can spike.
    pub urgency_acceleration_min: f64,
    /// Humility factor below which a spike counts as unregulated.
    pub urgency_humility_max: f64,
    /// Urgency for regulated steps.
    pub urgency_floor: f64,
}

impl Default for EscalationParams {
    fn default() -> Self {
        Self {
            acceleration_min: 0.2,
            mass_min: 0.5,
            urgency_acceleration_min: 0.3,
            urgency_humility_max: 0.3,
            urgency_floor: 0.3,
        }
    }
}

/// Score escalation along the given points, in timestamp order.
pub fn escalation_trajectory(
    store: &dyn ManifoldStore,
    point_ids: &[Uuid],
    params: &EscalationParams,
    dims: &FieldDims,
    deadline: &Deadline,
) -> RecurgentResult<BatchOutcome<EscalationRecord>> {
    let mut outcome: BatchOutcome<EscalationRecord> = BatchOutcome::empty();

    let mut points: Vec<ManifoldPoint> = Vec::with_capacity(point_ids.len());
    for id in point_ids {
        match store.get_point(*id)? {
            Some(p) if p.coherence_field.as_deref().is_some_and(|f| !f.is_empty()) => {
                points.push(p)
            }
            _ => {
                log::warn!("escalation_trajectory: skipping point {id}");
                outcome.skipped += 1;
            }
        }
    }
    points.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    for pair in points.windows(2) {
        if deadline.expired() {
            log::warn!("escalation_trajectory truncated by deadline");
            outcome.complete = false;
            break;
        }
        let (prev, curr) = (&pair[0], &pair[1]);
        // Field presence was enforced at collection time.
        let field_prev = prev.coherence_field.as_deref().unwrap_or_default();
        let field_curr = curr.coherence_field.as_deref().unwrap_or_default();

        let dt = (curr.created_at - prev.created_at).num_seconds().max(1) as f64;
        let velocity = field_distance(field_curr, field_prev, dims.active_dim) / dt;
        let acceleration = curr.scalar_curvature.unwrap_or(0.0) * velocity;
        let mass = curr.semantic_mass;

        let trajectory_score =
            if acceleration > params.acceleration_min && mass > params.mass_min {
                acceleration * mass * 2.0
            } else {
                acceleration * 0.5
            };

        let unregulated_spike = acceleration > params.urgency_acceleration_min
            && store
                .latest_wisdom(curr.id)?
                .is_some_and(|w| w.humility_factor < params.urgency_humility_max);
        let urgency = if unregulated_spike {
            clamp_severity(acceleration * mass * 1.5)
        } else {
            params.urgency_floor
        };

        outcome.records.push(EscalationRecord {
            point_id: curr.id,
            created_at: curr.created_at,
            velocity,
            acceleration,
            trajectory_score,
            urgency,
        });
    }
    Ok(outcome)
}
