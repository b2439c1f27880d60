// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — In-Memory Store Backend
// ─────────────────────────────────────────────────────────────────────
//! Reference `ManifoldStore` backend over `RwLock`-guarded maps.
//! Sort ties on `created_at`/`computed_at` break on id so scans are
//! deterministic for a fixed content set.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use recurgent_types::{
    ManifoldPoint, RecurgentResult, RecursiveCoupling, SignatureRecord, WisdomField,
};

use crate::store::{CouplingOrder, ManifoldStore};

/// In-memory backend for tests and embedded deployments.
#[derive(Default)]
pub struct MemoryStore {
    points: RwLock<HashMap<Uuid, ManifoldPoint>>,
    couplings: RwLock<Vec<RecursiveCoupling>>,
    wisdom: RwLock<Vec<WisdomField>>,
    signatures: RwLock<Vec<SignatureRecord>>,
    snapshots: RwLock<Vec<(Uuid, Vec<f64>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_point(&self, point: ManifoldPoint) {
        self.points.write().insert(point.id, point);
    }

    pub fn insert_coupling(&self, coupling: RecursiveCoupling) {
        self.couplings.write().push(coupling);
    }

    pub fn insert_wisdom(&self, record: WisdomField) {
        self.wisdom.write().push(record);
    }

    /// Copy of the signature log, in append order.
    pub fn signature_log(&self) -> Vec<SignatureRecord> {
        self.signatures.read().clone()
    }

    /// Copy of the evolution snapshot log, in append order.
    pub fn snapshot_log(&self) -> Vec<(Uuid, Vec<f64>)> {
        self.snapshots.read().clone()
    }

    fn sorted_points(mut points: Vec<ManifoldPoint>, ascending: bool) -> Vec<ManifoldPoint> {
        points.sort_by(|a, b| {
            let ord = a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id));
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        points
    }
}

impl ManifoldStore for MemoryStore {
    fn get_point(&self, id: Uuid) -> RecurgentResult<Option<ManifoldPoint>> {
        Ok(self.points.read().get(&id).cloned())
    }

    fn conversation_points(
        &self,
        conversation_id: Uuid,
        since: DateTime<Utc>,
    ) -> RecurgentResult<Vec<ManifoldPoint>> {
        let matching: Vec<ManifoldPoint> = self
            .points
            .read()
            .values()
            .filter(|p| p.conversation_id == Some(conversation_id) && p.created_at >= since)
            .cloned()
            .collect();
        Ok(Self::sorted_points(matching, true))
    }

    fn user_points(
        &self,
        fingerprint: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> RecurgentResult<Vec<ManifoldPoint>> {
        let matching: Vec<ManifoldPoint> = self
            .points
            .read()
            .values()
            .filter(|p| p.source_fingerprint == fingerprint && p.created_at >= since)
            .cloned()
            .collect();
        let mut sorted = Self::sorted_points(matching, false);
        sorted.truncate(limit);
        Ok(sorted)
    }

    fn cross_source_points(
        &self,
        excluding_fingerprint: &str,
        since: DateTime<Utc>,
    ) -> RecurgentResult<Vec<ManifoldPoint>> {
        let matching: Vec<ManifoldPoint> = self
            .points
            .read()
            .values()
            .filter(|p| p.source_fingerprint != excluding_fingerprint && p.created_at >= since)
            .cloned()
            .collect();
        Ok(Self::sorted_points(matching, true))
    }

    fn couplings(
        &self,
        point_id: Option<Uuid>,
        since: DateTime<Utc>,
        order: CouplingOrder,
        limit: usize,
    ) -> RecurgentResult<Vec<RecursiveCoupling>> {
        let mut matching: Vec<RecursiveCoupling> = self
            .couplings
            .read()
            .iter()
            .filter(|c| c.computed_at >= since)
            .filter(|c| match point_id {
                Some(id) => c.source_point == id || c.target_point == id,
                None => true,
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            let ord = a.computed_at.cmp(&b.computed_at).then(a.id.cmp(&b.id));
            match order {
                CouplingOrder::Ascending => ord,
                CouplingOrder::Descending => ord.reverse(),
            }
        });
        matching.truncate(limit);
        Ok(matching)
    }

    fn latest_wisdom(&self, point_id: Uuid) -> RecurgentResult<Option<WisdomField>> {
        Ok(self
            .wisdom
            .read()
            .iter()
            .filter(|w| w.point_id == point_id)
            .max_by_key(|w| w.computed_at)
            .cloned())
    }

    fn latest_cross_source_point(
        &self,
        excluding_fingerprint: &str,
    ) -> RecurgentResult<Option<ManifoldPoint>> {
        Ok(self
            .points
            .read()
            .values()
            .filter(|p| p.source_fingerprint != excluding_fingerprint)
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
            .cloned())
    }

    fn append_signature(&self, record: SignatureRecord) -> RecurgentResult<()> {
        self.signatures.write().push(record);
        Ok(())
    }

    fn append_evolution_snapshot(
        &self,
        point_id: Uuid,
        coherence_field: Vec<f64>,
    ) -> RecurgentResult<()> {
        self.snapshots.write().push((point_id, coherence_field));
        Ok(())
    }
}
