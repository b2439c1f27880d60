// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Store Trait
// ─────────────────────────────────────────────────────────────────────

use chrono::{DateTime, Utc};
use uuid::Uuid;

use recurgent_types::{
    ManifoldPoint, RecurgentResult, RecursiveCoupling, SignatureRecord, WisdomField,
};

/// Sort order for coupling scans, by `computed_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouplingOrder {
    Ascending,
    Descending,
}

/// Queryable store of manifold observations.
///
/// Concurrent readers are safe; the engine serializes writers per
/// point id. Detector reads within one call observe a snapshot
/// consistent with a single scan.
pub trait ManifoldStore: Send + Sync {
    /// Look up one point by id.
    fn get_point(&self, id: Uuid) -> RecurgentResult<Option<ManifoldPoint>>;

    /// Points of a conversation since `since`, ascending timestamp.
    fn conversation_points(
        &self,
        conversation_id: Uuid,
        since: DateTime<Utc>,
    ) -> RecurgentResult<Vec<ManifoldPoint>>;

    /// Points of one source fingerprint since `since`, descending
    /// timestamp, at most `limit`.
    fn user_points(
        &self,
        fingerprint: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> RecurgentResult<Vec<ManifoldPoint>>;

    /// Points of every other source since `since`, ascending timestamp.
    fn cross_source_points(
        &self,
        excluding_fingerprint: &str,
        since: DateTime<Utc>,
    ) -> RecurgentResult<Vec<ManifoldPoint>>;

    /// Couplings touching `point_id` (source or target side), or all
    /// couplings when `point_id` is `None`; since `since`, ordered by
    /// `computed_at`, at most `limit`.
    fn couplings(
        &self,
        point_id: Option<Uuid>,
        since: DateTime<Utc>,
        order: CouplingOrder,
        limit: usize,
    ) -> RecurgentResult<Vec<RecursiveCoupling>>;

    /// Most recent wisdom record for a point, if any.
    fn latest_wisdom(&self, point_id: Uuid) -> RecurgentResult<Option<WisdomField>>;

    /// Most recent point from any other source fingerprint.
    fn latest_cross_source_point(
        &self,
        excluding_fingerprint: &str,
    ) -> RecurgentResult<Option<ManifoldPoint>>;

    /// Append-only signature output.
    fn append_signature(&self, record: SignatureRecord) -> RecurgentResult<()>;

    /// Append-only evolution snapshot for a point's coherence field.
    fn append_evolution_snapshot(
        &self,
        point_id: Uuid,
        coherence_field: Vec<f64>,
    ) -> RecurgentResult<()>;
}
