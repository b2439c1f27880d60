// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Coordination Clustering
// ─────────────────────────────────────────────────────────────────────
//! Hourly-bucket clustering of cross-source high-coupling pairs.
//!
//! Pairs are selected by coupling magnitude and window membership,
//! scored for geometric coherence, bucketed by
//! floor(epoch / 3600), and emitted as `ClusterRecord`s ordered by
//! confidence then mass. The output is invariant under permutation of
//! pair observations within a bucket, and cluster ids are a stable
//! function of the bucket epoch.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use recurgent_geometry::field_distance;
use recurgent_store::{CouplingOrder, ManifoldStore};
use recurgent_types::{
    clamp_severity, BatchOutcome, ClusterRecord, Deadline, FieldDims, RecurgentResult,
};

/// Seed half of every deterministic cluster id.
const CLUSTER_ID_SEED: u64 = 0x5245_4355_5247_4E54;

/// Clustering parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterParams {
    pub window_secs: i64,
    /// Minimum coupling magnitude for a pair to count.
    pub coupling_threshold: f64,
    /// Minimum pairs per bucket for emission.
    pub min_cluster_size: usize,
    /// Minimum confidence for emission.
    pub confidence_min: f64,
    /// Cap on couplings scanned in the window.
    pub sample_limit: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            window_secs: 24 * 3600,
            coupling_threshold: 0.8,
            min_cluster_size: 3,
            confidence_min: 0.5,
            sample_limit: 10_000,
        }
    }
}

#[derive(Default)]
struct Bucket {
    size: usize,
    coupling_sum: f64,
    coherence_sum: f64,
    mass_sum: f64,
}

/// Deterministic cluster id from the hour-bucket epoch.
fn cluster_id(bucket_epoch: i64) -> Uuid {
    Uuid::from_u64_pair(CLUSTER_ID_SEED, bucket_epoch as u64)
}

/// Detect coordination clusters across sources inside the window.
pub fn coordination_clusters(
    store: &dyn ManifoldStore,
    params: &ClusterParams,
    dims: &FieldDims,
    now: DateTime<Utc>,
    deadline: &Deadline,
) -> RecurgentResult<BatchOutcome<ClusterRecord>> {
    let since = now - Duration::seconds(params.window_secs);
    let couplings = store.couplings(
        None,
        since,
        CouplingOrder::Ascending,
        params.sample_limit,
    )?;

    let mut outcome: BatchOutcome<ClusterRecord> = BatchOutcome::empty();
    let mut buckets: Vec<(i64, Bucket)> = Vec::new();

    for coupling in &couplings {
        if deadline.expired() {
            log::warn!("coordination_clusters truncated by deadline");
            outcome.complete = false;
            break;
        }
        if coupling.coupling_magnitude < params.coupling_threshold {
            continue;
        }

        let p = match store.get_point(coupling.source_point)? {
            Some(p) => p,
            None => {
                outcome.skipped += 1;
                continue;
            }
        };
        let q = match store.get_point(coupling.target_point)? {
            Some(q) => q,
            None => {
                outcome.skipped += 1;
                continue;
            }
        };

        // Both endpoints inside the window, from distinct sources.
        if p.created_at < since || p.created_at > now || q.created_at < since || q.created_at > now
        {
            continue;
        }
        if p.source_fingerprint == q.source_fingerprint {
            continue;
        }

        let (field_p, field_q) = match (
            p.coherence_field.as_deref().filter(|f| !f.is_empty()),
            q.coherence_field.as_deref().filter(|f| !f.is_empty()),
        ) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                outcome.skipped += 1;
                continue;
            }
        };

        let distance = field_distance(field_p, field_q, dims.active_dim);
        let geometric_coherence = match (p.metric_determinant, q.metric_determinant) {
            (Some(dp), Some(dq)) if dp > 0.0 && dq > 0.0 => {
                1.0 - distance / (dp * dq).sqrt()
            }
            _ => 1.0 - distance,
        };
        let pair_mass = 0.5 * (p.semantic_mass + q.semantic_mass);

        let epoch = coupling.computed_at.timestamp().div_euclid(3600);
        let idx = match buckets.iter().position(|(b, _)| *b == epoch) {
            Some(i) => i,
            None => {
                buckets.push((epoch, Bucket::default()));
                buckets.len() - 1
            }
        };
        let bucket = &mut buckets[idx].1;
        bucket.size += 1;
        bucket.coupling_sum += coupling.coupling_magnitude;
        bucket.coherence_sum += geometric_coherence;
        bucket.mass_sum += pair_mass;
    }

    for (epoch, bucket) in &buckets {
        if bucket.size < params.min_cluster_size {
            continue;
        }
        let n = bucket.size as f64;
        let avg_coupling = bucket.coupling_sum / n;
        let avg_coherence = bucket.coherence_sum / n;
        let avg_mass = bucket.mass_sum / n;
        let confidence =
            clamp_severity(avg_coupling * avg_coherence * (n / 10.0) * (avg_mass / 100.0));
        if confidence <= params.confidence_min {
            continue;
        }

        let bucket_start = match DateTime::<Utc>::from_timestamp(epoch * 3600, 0) {
            Some(t) => t,
            None => {
                outcome.skipped += 1;
                continue;
            }
        };
        log::info!(
            "coordination cluster at {bucket_start}: {} pairs, confidence {confidence:.3}",
            bucket.size
        );
        outcome.records.push(ClusterRecord {
            cluster_id: cluster_id(*epoch),
            bucket_start,
            cluster_size: bucket.size,
            avg_coupling,
            avg_geometric_coherence: avg_coherence,
            avg_mass,
            confidence,
        });
    }

    // Confidence descending, mass breaking ties.
    outcome.records.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                b.avg_mass
                    .partial_cmp(&a.avg_mass)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recurgent_store::MemoryStore;
    use recurgent_types::{ManifoldPoint, RecursiveCoupling};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn heavy_point(store: &MemoryStore, fingerprint: &str, minutes_ago: i64) -> ManifoldPoint {
        let mut p = ManifoldPoint::new(fingerprint, now() - Duration::minutes(minutes_ago));
        p.coherence_field = Some(vec![0.5; 8]);
        p.metric_determinant = Some(1.0);
        p.semantic_mass = 300.0;
        store.insert_point(p.clone());
        p
    }

    fn strong_pair(
        store: &MemoryStore,
        p: &ManifoldPoint,
        q: &ManifoldPoint,
        minutes_ago: i64,
        magnitude: f64,
    ) {
        let mut c = RecursiveCoupling::new(p.id, q.id, now() - Duration::minutes(minutes_ago));
        c.coupling_magnitude = magnitude;
        store.insert_coupling(c);
    }

    fn run(store: &MemoryStore) -> BatchOutcome<ClusterRecord> {
        coordination_clusters(
            store,
            &ClusterParams::default(),
            &FieldDims::default(),
            now(),
            &Deadline::none(),
        )
        .unwrap()
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        let a = heavy_point(&store, "user-a", 90);
        let b = heavy_point(&store, "user-b", 85);
        let c = heavy_point(&store, "user-c", 80);
        // Three cross-source pairs inside one hour bucket.
        strong_pair(&store, &a, &b, 40, 0.9);
        strong_pair(&store, &b, &c, 35, 0.95);
        strong_pair(&store, &a, &c, 30, 0.85);
        store
    }

    #[test]
    fn test_cluster_emitted() {
        let outcome = run(&seeded_store());
        assert!(outcome.complete);
        assert_eq!(outcome.records.len(), 1);
        let cluster = &outcome.records[0];
        assert_eq!(cluster.cluster_size, 3);
        assert!((cluster.avg_coupling - 0.9).abs() < 1e-9);
        // Identical fields: geometric coherence 1.0.
        assert!((cluster.avg_geometric_coherence - 1.0).abs() < 1e-9);
        assert!(cluster.confidence > 0.5);
        assert!(cluster.confidence <= 1.0);
    }

    #[test]
    fn test_weak_couplings_ignored() {
        let store = MemoryStore::new();
        let a = heavy_point(&store, "user-a", 90);
        let b = heavy_point(&store, "user-b", 85);
        for minutes in [40, 35, 30] {
            strong_pair(&store, &a, &b, minutes, 0.5);
        }
        let outcome = run(&store);
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn test_same_source_pairs_ignored() {
        let store = MemoryStore::new();
        let a = heavy_point(&store, "user-a", 90);
        let b = heavy_point(&store, "user-a", 85);
        for minutes in [40, 35, 30] {
            strong_pair(&store, &a, &b, minutes, 0.9);
        }
        let outcome = run(&store);
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn test_small_bucket_suppressed() {
        let store = MemoryStore::new();
        let a = heavy_point(&store, "user-a", 90);
        let b = heavy_point(&store, "user-b", 85);
        strong_pair(&store, &a, &b, 40, 0.9);
        strong_pair(&store, &a, &b, 35, 0.9);
        let outcome = run(&store);
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn test_permutation_invariance() {
        // Same pairs inserted in a different order yield the same
        // cluster record.
        let forward = run(&seeded_store());

        let store = MemoryStore::new();
        let a = heavy_point(&store, "user-a", 90);
        let b = heavy_point(&store, "user-b", 85);
        let c = heavy_point(&store, "user-c", 80);
        strong_pair(&store, &a, &c, 30, 0.85);
        strong_pair(&store, &a, &b, 40, 0.9);
        strong_pair(&store, &b, &c, 35, 0.95);
        let reversed = run(&store);

        assert_eq!(forward.records.len(), reversed.records.len());
        let (x, y) = (&forward.records[0], &reversed.records[0]);
        assert_eq!(x.cluster_id, y.cluster_id);
        assert_eq!(x.cluster_size, y.cluster_size);
        assert!((x.confidence - y.confidence).abs() < 1e-12);
        assert!((x.avg_coupling - y.avg_coupling).abs() < 1e-12);
    }

    #[test]
    fn test_cluster_id_deterministic_per_bucket() {
        let outcome_a = run(&seeded_store());
        let outcome_b = run(&seeded_store());
        assert_eq!(
            outcome_a.records[0].cluster_id,
            outcome_b.records[0].cluster_id
        );
        // Different bucket epoch, different id.
        assert_ne!(cluster_id(100), cluster_id(101));
    }

    #[test]
    fn test_unresolvable_endpoint_counted() {
        let store = seeded_store();
        let ghost_src = Uuid::new_v4();
        let ghost_dst = Uuid::new_v4();
        let mut c = RecursiveCoupling::new(ghost_src, ghost_dst, now() - Duration::minutes(10));
        c.coupling_magnitude = 0.99;
        store.insert_coupling(c);
        let outcome = run(&store);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.records.len(), 1);
    }

    #[test]
    fn test_ordering_by_confidence() {
        let store = MemoryStore::new();
        let a = heavy_point(&store, "user-a", 200);
        let b = heavy_point(&store, "user-b", 195);
        // Strong bucket two hours back, weaker bucket one hour back.
        for minutes in [130, 127, 124] {
            strong_pair(&store, &a, &b, minutes, 0.99);
        }
        for minutes in [55, 52, 49] {
            strong_pair(&store, &a, &b, minutes, 0.82);
        }
        let outcome = run(&store);
        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.records[0].confidence >= outcome.records[1].confidence);
    }
}
