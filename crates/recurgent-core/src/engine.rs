// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Field Engine
// ─────────────────────────────────────────────────────────────────────

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use rayon::prelude::*;
use uuid::Uuid;

use recurgent_analytics::{self as analytics, ClusterParams, EscalationParams};
use recurgent_coupling::{coupling_magnitude, coupling_tensor, split_self_hetero};
use recurgent_geometry::evolution::evolve_coherence_field as evolve_step;
use recurgent_geometry::geodesic_distance;
use recurgent_signatures::{
    attractor_dogmatism, attractor_splintering, belief_calcification, coherence_dissolution,
    delusional_expansion, detect_all, detect_family, metric_crystallization, observer_solipsism,
    paranoid_interpretation, recurgent_parasitism, reference_decay, semantic_hypercoherence,
    semantic_narcissism, DetectorContext, DetectorParams,
};
use recurgent_store::ManifoldStore;
use recurgent_types::{
    BatchOutcome, ClusterRecord, Deadline, EngineConfig, EscalationRecord, ManifoldPoint,
    RecurgentError, RecurgentResult, RecursiveCoupling, SignatureFamily, SignatureRecord,
};

/// The engine: a store handle, a configuration, and per-point write
/// locks. Every public call is self-contained; no mutable state lives
/// here beyond the lock table.
pub struct FieldEngine {
    store: Arc<dyn ManifoldStore>,
    config: EngineConfig,
    detectors: DetectorParams,
    write_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl FieldEngine {
    pub fn new(store: Arc<dyn ManifoldStore>, config: EngineConfig) -> RecurgentResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            detectors: DetectorParams::default(),
            write_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Replace the detector thresholds.
    pub fn with_detector_params(mut self, detectors: DetectorParams) -> Self {
        self.detectors = detectors;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn context(&self) -> DetectorContext<'_> {
        let mut ctx = DetectorContext::new(self.store.as_ref(), Utc::now());
        ctx.dims = self.config.dims;
        ctx.guards = self.config.guards;
        ctx
    }

    fn point_lock(&self, id: Uuid) -> Arc<Mutex<()>> {
        self.write_locks
            .lock()
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn detect_one<F>(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
        detector: F,
    ) -> RecurgentResult<Vec<SignatureRecord>>
    where
        F: Fn(
            &DetectorContext<'_>,
            &ManifoldPoint,
        ) -> RecurgentResult<Option<SignatureRecord>>,
    {
        deadline.check()?;
        let point = match self.store.get_point(point_id)? {
            Some(p) => p,
            None => return Ok(Vec::new()),
        };
        match detector(&self.context(), &point) {
            Ok(Some(record)) => Ok(vec![record]),
            Ok(None) => Ok(Vec::new()),
            Err(e) if e.is_missing_input() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    // ── individual detectors ────────────────────────────────────────

    pub fn detect_attractor_dogmatism(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<Vec<SignatureRecord>> {
        self.detect_one(point_id, deadline, |ctx, p| {
            attractor_dogmatism(ctx, p, &self.detectors.dogmatism)
        })
    }

    pub fn detect_belief_calcification(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<Vec<SignatureRecord>> {
        self.detect_one(point_id, deadline, |ctx, p| {
            belief_calcification(ctx, p, &self.detectors.calcification)
        })
    }

    pub fn detect_metric_crystallization(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<Vec<SignatureRecord>> {
        self.detect_one(point_id, deadline, |ctx, p| {
            metric_crystallization(ctx, p, &self.detectors.crystallization)
        })
    }

    pub fn detect_attractor_splintering(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<Vec<SignatureRecord>> {
        self.detect_one(point_id, deadline, |ctx, p| {
            attractor_splintering(ctx, p, &self.detectors.splintering)
        })
    }

    pub fn detect_coherence_dissolution(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<Vec<SignatureRecord>> {
        self.detect_one(point_id, deadline, |ctx, p| {
            coherence_dissolution(ctx, p, &self.detectors.dissolution)
        })
    }

    pub fn detect_reference_decay(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<Vec<SignatureRecord>> {
        self.detect_one(point_id, deadline, |ctx, p| {
            reference_decay(ctx, p, &self.detectors.decay)
        })
    }

    pub fn detect_delusional_expansion(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<Vec<SignatureRecord>> {
        self.detect_one(point_id, deadline, |ctx, p| {
            delusional_expansion(ctx, p, &self.detectors.expansion)
        })
    }

    pub fn detect_semantic_hypercoherence(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<Vec<SignatureRecord>> {
        self.detect_one(point_id, deadline, |ctx, p| {
            semantic_hypercoherence(ctx, p, &self.detectors.hypercoherence)
        })
    }

    pub fn detect_recurgent_parasitism(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<Vec<SignatureRecord>> {
        self.detect_one(point_id, deadline, |ctx, p| {
            recurgent_parasitism(ctx, p, &self.detectors.parasitism)
        })
    }

    pub fn detect_paranoid_interpretation(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<Vec<SignatureRecord>> {
        self.detect_one(point_id, deadline, |ctx, p| {
            paranoid_interpretation(ctx, p, &self.detectors.paranoia)
        })
    }

    pub fn detect_observer_solipsism(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<Vec<SignatureRecord>> {
        self.detect_one(point_id, deadline, |ctx, p| {
            observer_solipsism(ctx, p, &self.detectors.solipsism)
        })
    }

    pub fn detect_semantic_narcissism(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<Vec<SignatureRecord>> {
        self.detect_one(point_id, deadline, |ctx, p| {
            semantic_narcissism(ctx, p, &self.detectors.narcissism)
        })
    }

    // ── family and combined sweeps ──────────────────────────────────

    fn detect_family_for(
        &self,
        point_id: Uuid,
        family: SignatureFamily,
        deadline: &Deadline,
    ) -> RecurgentResult<BatchOutcome<SignatureRecord>> {
        let point = match self.store.get_point(point_id)? {
            Some(p) => p,
            None => return Ok(BatchOutcome::empty()),
        };
        Ok(detect_family(
            &self.context(),
            &point,
            &self.detectors,
            family,
            deadline,
        ))
    }

    pub fn detect_rigidity(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<BatchOutcome<SignatureRecord>> {
        self.detect_family_for(point_id, SignatureFamily::Rigidity, deadline)
    }

    pub fn detect_fragmentation(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<BatchOutcome<SignatureRecord>> {
        self.detect_family_for(point_id, SignatureFamily::Fragmentation, deadline)
    }

    pub fn detect_inflation(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<BatchOutcome<SignatureRecord>> {
        self.detect_family_for(point_id, SignatureFamily::Inflation, deadline)
    }

    pub fn detect_observer_coupling(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<BatchOutcome<SignatureRecord>> {
        self.detect_family_for(point_id, SignatureFamily::ObserverCoupling, deadline)
    }

    /// Run all twelve detectors in catalog order.
    pub fn detect_all(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<BatchOutcome<SignatureRecord>> {
        let point = match self.store.get_point(point_id)? {
            Some(p) => p,
            None => return Ok(BatchOutcome::empty()),
        };
        Ok(detect_all(&self.context(), &point, &self.detectors, deadline))
    }

    /// Run all twelve detectors, then append the finalized records
    /// under the point's write lock. Only complete results persist.
    pub fn detect_all_recorded(
        &self,
        point_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<BatchOutcome<SignatureRecord>> {
        let outcome = self.detect_all(point_id, deadline)?;
        let lock = self.point_lock(point_id);
        let _guard = lock.lock();
        for record in &outcome.records {
            self.store.append_signature(record.clone())?;
        }
        Ok(outcome)
    }

    /// Fan the combined sweep out over many points on the rayon pool.
    pub fn sweep(&self, point_ids: &[Uuid], deadline: &Deadline) -> BatchOutcome<SignatureRecord> {
        let partials: Vec<BatchOutcome<SignatureRecord>> = point_ids
            .par_iter()
            .map(|id| match self.detect_all(*id, deadline) {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::warn!("sweep: point {id} failed: {e}");
                    BatchOutcome {
                        records: Vec::new(),
                        skipped: 1,
                        complete: true,
                    }
                }
            })
            .collect();
        let mut merged = BatchOutcome::empty();
        for partial in partials {
            merged.absorb(partial);
        }
        merged
    }

    // ── analytics ───────────────────────────────────────────────────

    pub fn coordination_clusters(
        &self,
        params: &ClusterParams,
        deadline: &Deadline,
    ) -> RecurgentResult<BatchOutcome<ClusterRecord>> {
        analytics::coordination_clusters(
            self.store.as_ref(),
            params,
            &self.config.dims,
            Utc::now(),
            deadline,
        )
    }

    pub fn escalation_trajectory(
        &self,
        point_ids: &[Uuid],
        params: &EscalationParams,
        deadline: &Deadline,
    ) -> RecurgentResult<BatchOutcome<EscalationRecord>> {
        analytics::escalation_trajectory(
            self.store.as_ref(),
            point_ids,
            params,
            &self.config.dims,
            deadline,
        )
    }

    // ── coupling & geodesics ────────────────────────────────────────

    /// Materialize the recursive coupling tensor for a pair of points
    /// and reduce it into a `RecursiveCoupling` record. Self pairs
    /// (source = target) are how self-coupling is measured.
    pub fn compute_coupling(
        &self,
        source_id: Uuid,
        target_id: Uuid,
        deadline: &Deadline,
    ) -> RecurgentResult<RecursiveCoupling> {
        deadline.check()?;
        let source = self
            .store
            .get_point(source_id)?
            .ok_or_else(|| RecurgentError::MissingInput(format!("point {source_id}")))?;
        let target = self
            .store
            .get_point(target_id)?
            .ok_or_else(|| RecurgentError::MissingInput(format!("point {target_id}")))?;

        let n = self.config.dims.active_dim;
        let tensor = coupling_tensor(&source, &target, n)?;
        let magnitude = coupling_magnitude(&tensor);
        let split = split_self_hetero(&tensor, n);

        let mut record = RecursiveCoupling::new(source.id, target.id, Utc::now());
        record.coupling_tensor = Some(tensor);
        record.coupling_magnitude = magnitude;
        record.self_coupling = split.self_coupling;
        record.hetero_coupling = split.hetero_coupling;
        Ok(record)
    }

    /// Geodesic distance between two stored points, falling back to
    /// the Euclidean field distance when geometry is absent.
    pub fn geodesic_between(
        &self,
        a_id: Uuid,
        b_id: Uuid,
        steps: usize,
        deadline: &Deadline,
    ) -> RecurgentResult<f64> {
        let a = self
            .store
            .get_point(a_id)?
            .ok_or_else(|| RecurgentError::MissingInput(format!("point {a_id}")))?;
        let b = self
            .store
            .get_point(b_id)?
            .ok_or_else(|| RecurgentError::MissingInput(format!("point {b_id}")))?;
        geodesic_distance(&a, &b, steps, self.config.dims.active_dim, deadline)
    }

    // ── evolution ───────────────────────────────────────────────────

    /// One evolution step for a point's coherence field. The new field
    /// is appended as a snapshot (under the point's write lock) when
    /// the point and its field exist; the returned vector always has
    /// the storage dimension.
    pub fn evolve_coherence_field(
        &self,
        point_id: Uuid,
        dt: Option<f64>,
        deadline: &Deadline,
    ) -> RecurgentResult<Vec<f64>> {
        let lock = self.point_lock(point_id);
        let _guard = lock.lock();

        let point = self.store.get_point(point_id)?;
        let mut params = self.config.evolution;
        if let Some(dt) = dt {
            params.dt = dt;
        }
        let next = evolve_step(
            point.as_ref(),
            &params,
            &self.config.guards,
            &self.config.dims,
            deadline,
        )?;

        let has_field = point
            .as_ref()
            .and_then(|p| p.coherence_field.as_ref())
            .is_some_and(|f| !f.is_empty());
        if has_field {
            self.store
                .append_evolution_snapshot(point_id, next.clone())?;
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use recurgent_store::MemoryStore;
    use recurgent_types::{FieldDims, RecursiveCoupling, SignatureKind};

    fn engine_with(
        build: impl FnOnce(&MemoryStore) -> Uuid,
    ) -> (FieldEngine, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let id = build(&store);
        let mut config = EngineConfig::default();
        config.dims = FieldDims {
            storage_dim: 16,
            active_dim: 8,
            small_window: 4,
        };
        let engine = FieldEngine::new(store, config).unwrap();
        (engine, id)
    }

    fn dogmatic_fixture(store: &MemoryStore) -> Uuid {
        let mut p = ManifoldPoint::new("user-a", Utc::now());
        p.attractor_stability = 0.9;
        p.coherence_magnitude = Some(0.8);
        p.coherence_field = Some(vec![0.8; 16]);
        let id = p.id;
        store.insert_point(p);
        for i in 0..4 {
            let mut c =
                RecursiveCoupling::new(id, id, Utc::now() - Duration::minutes(40 - i * 10));
            c.coupling_magnitude = 0.9 - 0.2 * i as f64;
            store.insert_coupling(c);
        }
        id
    }

    #[test]
    fn test_invalid_config_rejected() {
        let store = Arc::new(MemoryStore::new());
        let mut config = EngineConfig::default();
        config.dims.active_dim = 0;
        assert!(FieldEngine::new(store, config).is_err());
    }

    #[test]
    fn test_individual_detector_trigger() {
        let (engine, id) = engine_with(dogmatic_fixture);
        let records = engine
            .detect_attractor_dogmatism(id, &Deadline::none())
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, SignatureKind::AttractorDogmatism);
    }

    #[test]
    fn test_individual_detector_unknown_point_empty() {
        let (engine, _) = engine_with(dogmatic_fixture);
        let records = engine
            .detect_attractor_dogmatism(Uuid::new_v4(), &Deadline::none())
            .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_detect_all_concatenates_families() {
        let (engine, id) = engine_with(dogmatic_fixture);
        let outcome = engine.detect_all(id, &Deadline::none()).unwrap();
        assert!(outcome.complete);
        // Dogmatism (rigidity), decay and narcissism (self couplings).
        let kinds: Vec<SignatureKind> = outcome.records.iter().map(|r| r.kind).collect();
        assert!(kinds.contains(&SignatureKind::AttractorDogmatism));
        assert!(kinds.contains(&SignatureKind::SemanticNarcissism));
    }

    #[test]
    fn test_detect_family_scoped() {
        let (engine, id) = engine_with(dogmatic_fixture);
        let outcome = engine.detect_rigidity(id, &Deadline::none()).unwrap();
        assert!(outcome
            .records
            .iter()
            .all(|r| r.kind.family() == SignatureFamily::Rigidity));
    }

    #[test]
    fn test_recorded_sweep_appends() {
        let store = Arc::new(MemoryStore::new());
        let id = dogmatic_fixture(&store);
        let mut config = EngineConfig::default();
        config.dims.active_dim = 8;
        config.dims.small_window = 4;
        let engine = FieldEngine::new(store.clone(), config).unwrap();
        let outcome = engine.detect_all_recorded(id, &Deadline::none()).unwrap();
        assert_eq!(store.signature_log().len(), outcome.records.len());
    }

    #[test]
    fn test_sweep_merges_points() {
        let store = Arc::new(MemoryStore::new());
        let a = dogmatic_fixture(&store);
        let bare = ManifoldPoint::new("user-b", Utc::now());
        let b = bare.id;
        store.insert_point(bare);
        let engine = FieldEngine::new(store, EngineConfig::default()).unwrap();
        let merged = engine.sweep(&[a, b], &Deadline::none());
        assert!(merged.complete);
        assert!(!merged.records.is_empty());
    }

    #[test]
    fn test_expired_deadline_incomplete() {
        let (engine, id) = engine_with(dogmatic_fixture);
        let outcome = engine.detect_all(id, &Deadline::in_millis(0)).unwrap();
        assert!(!outcome.complete);
    }

    #[test]
    fn test_evolve_appends_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let mut p = ManifoldPoint::new("user-a", Utc::now());
        p.coherence_field = Some(vec![0.5; 16]);
        let id = p.id;
        store.insert_point(p);
        let mut config = EngineConfig::default();
        config.dims = FieldDims {
            storage_dim: 16,
            active_dim: 8,
            small_window: 4,
        };
        let engine = FieldEngine::new(store.clone(), config).unwrap();
        let next = engine
            .evolve_coherence_field(id, None, &Deadline::none())
            .unwrap();
        assert_eq!(next.len(), 16);
        assert!(next.iter().all(|v| v.is_finite()));
        let log = store.snapshot_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].1, next);
    }

    #[test]
    fn test_evolve_missing_point_no_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let engine = FieldEngine::new(store.clone(), EngineConfig::default()).unwrap();
        let next = engine
            .evolve_coherence_field(Uuid::new_v4(), None, &Deadline::none())
            .unwrap();
        assert_eq!(next.len(), 2000);
        assert!(next.iter().all(|&v| v == 0.0));
        assert!(store.snapshot_log().is_empty());
    }

    #[test]
    fn test_compute_coupling_self_pair() {
        let store = Arc::new(MemoryStore::new());
        let mut p = ManifoldPoint::new("user-a", Utc::now());
        p.semantic_field = Some(vec![0.5; 16]);
        p.coherence_field = Some(vec![0.3; 16]);
        let id = p.id;
        store.insert_point(p);
        let mut config = EngineConfig::default();
        config.dims = FieldDims {
            storage_dim: 16,
            active_dim: 4,
            small_window: 2,
        };
        let engine = FieldEngine::new(store, config).unwrap();
        let record = engine
            .compute_coupling(id, id, &Deadline::none())
            .unwrap();
        assert!(record.is_self_coupling());
        assert_eq!(record.coupling_tensor.as_ref().unwrap().len(), 64);
        assert!(record.coupling_magnitude > 0.0);
        // Channel decomposition recombines to the magnitude.
        let self_sq: f64 = record.self_coupling.iter().map(|v| v * v).sum();
        let hetero_sq: f64 = record.hetero_coupling.iter().map(|v| v * v).sum();
        assert!(((self_sq + hetero_sq).sqrt() - record.coupling_magnitude).abs() < 1e-9);
    }

    #[test]
    fn test_compute_coupling_missing_point() {
        let store = Arc::new(MemoryStore::new());
        let engine = FieldEngine::new(store, EngineConfig::default()).unwrap();
        let result = engine.compute_coupling(Uuid::new_v4(), Uuid::new_v4(), &Deadline::none());
        assert!(result.is_err());
    }

    #[test]
    fn test_geodesic_between_fallback() {
        let store = Arc::new(MemoryStore::new());
        let mut a = ManifoldPoint::new("user-a", Utc::now());
        a.semantic_field = Some(vec![0.0; 16]);
        let mut b = ManifoldPoint::new("user-b", Utc::now());
        b.semantic_field = Some(vec![1.0; 16]);
        let (ida, idb) = (a.id, b.id);
        store.insert_point(a);
        store.insert_point(b);
        let mut config = EngineConfig::default();
        config.dims = FieldDims {
            storage_dim: 16,
            active_dim: 4,
            small_window: 2,
        };
        let engine = FieldEngine::new(store, config).unwrap();
        let d = engine
            .geodesic_between(ida, idb, 100, &Deadline::none())
            .unwrap();
        // No metric on either side: Euclidean over 4 active components.
        assert!((d - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_clusters_passthrough() {
        let (engine, _) = engine_with(dogmatic_fixture);
        let outcome = engine
            .coordination_clusters(&ClusterParams::default(), &Deadline::none())
            .unwrap();
        // Self couplings are same-source: no cross-source cluster.
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn test_escalation_passthrough() {
        let store = Arc::new(MemoryStore::new());
        let mut ids = Vec::new();
        for i in 0..3 {
            let mut p =
                ManifoldPoint::new("user-a", Utc::now() - Duration::seconds(180 - i * 60));
            p.coherence_field = Some(vec![i as f64; 8]);
            p.scalar_curvature = Some(1.0);
            p.semantic_mass = 1.0;
            ids.push(p.id);
            store.insert_point(p);
        }
        let engine = FieldEngine::new(store, EngineConfig::default()).unwrap();
        let outcome = engine
            .escalation_trajectory(&ids, &EscalationParams::default(), &Deadline::none())
            .unwrap();
        assert_eq!(outcome.records.len(), 2);
    }
}
