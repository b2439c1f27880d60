// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Recurgent Kernel Data Model
// ─────────────────────────────────────────────────────────────────────
//! The stored entities of the manifold: observation points, pairwise
//! recursive couplings, per-point wisdom regulation, and the three
//! analytic output records (signature, cluster, escalation).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RecurgentError, RecurgentResult};
use crate::tensor::SymmetricMatrix;

/// Clamp a severity to [0, 1], mapping NaN to 0 and Inf to the nearest bound.
#[inline]
pub fn clamp_severity(value: f64) -> f64 {
    if value.is_nan() {
        log::warn!("clamp_severity: NaN detected, clamping to 0");
        return 0.0;
    }
    if value.is_infinite() {
        let boundary = if value > 0.0 { 1.0 } else { 0.0 };
        log::warn!("clamp_severity: Inf detected, clamping to {boundary:.1}");
        return boundary;
    }
    value.clamp(0.0, 1.0)
}

/// A single observation embedded on the semantic manifold.
///
/// Geometry fields are filled by the kernel (eagerly on ingest or lazily
/// on first detector call) and never mutated by detectors; only the
/// evolution integrator writes a new coherence-field snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifoldPoint {
    pub id: Uuid,
    pub source_fingerprint: String,
    pub conversation_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,

    /// Content geometry, `storage_dim` components.
    pub semantic_field: Option<Vec<f64>>,
    /// Organizational coherence, `storage_dim` components.
    pub coherence_field: Option<Vec<f64>>,
    /// Cached L2 magnitude of the coherence field over the active dimension.
    pub coherence_magnitude: Option<f64>,

    /// Symmetric metric, active_dim x active_dim.
    pub metric_tensor: Option<SymmetricMatrix>,
    pub metric_determinant: Option<f64>,
    /// Christoffel symbols, n^3 flat, index (k*n + i)*n + j.
    pub christoffel_symbols: Option<Vec<f64>>,
    /// Ricci tensor, n^2 flat, index i*n + j.
    pub ricci_curvature: Option<Vec<f64>>,
    pub scalar_curvature: Option<f64>,

    pub recursive_depth: f64,
    pub constraint_density: f64,
    pub attractor_stability: f64,
    pub semantic_mass: f64,
}

impl ManifoldPoint {
    pub fn new(source_fingerprint: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_fingerprint: source_fingerprint.into(),
            conversation_id: None,
            created_at,
            semantic_field: None,
            coherence_field: None,
            coherence_magnitude: None,
            metric_tensor: None,
            metric_determinant: None,
            christoffel_symbols: None,
            ricci_curvature: None,
            scalar_curvature: None,
            recursive_depth: 0.0,
            constraint_density: 0.0,
            attractor_stability: 0.0,
            semantic_mass: 0.0,
        }
    }

    /// The coherence field, or `MissingInput`.
    pub fn require_coherence(&self) -> RecurgentResult<&[f64]> {
        self.coherence_field
            .as_deref()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| RecurgentError::MissingInput("coherence_field".into()))
    }

    /// The semantic field, or `MissingInput`.
    pub fn require_semantic(&self) -> RecurgentResult<&[f64]> {
        self.semantic_field
            .as_deref()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| RecurgentError::MissingInput("semantic_field".into()))
    }

    /// Cached coherence magnitude, or the L2 norm of the leading `dims`
    /// components. `None` when the field itself is absent.
    pub fn coherence_magnitude_or_norm(&self, dims: usize) -> Option<f64> {
        if let Some(cached) = self.coherence_magnitude {
            return Some(cached);
        }
        let field = self.coherence_field.as_deref().filter(|f| !f.is_empty())?;
        let take = dims.min(field.len());
        Some(field[..take].iter().map(|v| v * v).sum::<f64>().sqrt())
    }
}

/// Pairwise recursive coupling R_ijk(p, q). Self-referential entries
/// (p = q) are how the self-coupling signal is measured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecursiveCoupling {
    pub id: Uuid,
    pub source_point: Uuid,
    pub target_point: Uuid,

    /// n^3 flat tensor, absent when only the magnitude was persisted.
    pub coupling_tensor: Option<Vec<f64>>,
    pub coupling_magnitude: f64,

    /// Per-channel self decomposition (diagonal leading indices).
    pub self_coupling: Vec<f64>,
    /// Per-channel hetero decomposition (off-diagonal leading indices).
    pub hetero_coupling: Vec<f64>,

    pub evolution_rate: f64,
    pub latent_channels: Option<Vec<f64>>,
    pub computed_at: DateTime<Utc>,
}

impl RecursiveCoupling {
    pub fn new(source_point: Uuid, target_point: Uuid, computed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_point,
            target_point,
            coupling_tensor: None,
            coupling_magnitude: 0.0,
            self_coupling: Vec::new(),
            hetero_coupling: Vec::new(),
            evolution_rate: 0.0,
            latent_channels: None,
            computed_at,
        }
    }

    /// True for p = q entries.
    pub fn is_self_coupling(&self) -> bool {
        self.source_point == self.target_point
    }
}

/// Per-point wisdom regulation record. At most one active record per
/// point; later `computed_at` supersedes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WisdomField {
    pub point_id: Uuid,
    pub wisdom_value: f64,
    pub forecast_sensitivity: f64,
    pub gradient_response: f64,
    pub humility_factor: f64,
    pub recursion_regulation: f64,
    pub computed_at: DateTime<Utc>,
}

/// The four detector families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureFamily {
    Rigidity,
    Fragmentation,
    Inflation,
    ObserverCoupling,
}

/// The twelve breakdown signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureKind {
    AttractorDogmatism,
    BeliefCalcification,
    MetricCrystallization,
    AttractorSplintering,
    CoherenceDissolution,
    ReferenceDecay,
    DelusionalExpansion,
    SemanticHypercoherence,
    RecurgentParasitism,
    ParanoidInterpretation,
    ObserverSolipsism,
    SemanticNarcissism,
}

impl SignatureKind {
    /// All twelve kinds in catalog order (rigidity, fragmentation,
    /// inflation, observer-coupling).
    pub const ALL: [SignatureKind; 12] = [
        SignatureKind::AttractorDogmatism,
        SignatureKind::BeliefCalcification,
        SignatureKind::MetricCrystallization,
        SignatureKind::AttractorSplintering,
        SignatureKind::CoherenceDissolution,
        SignatureKind::ReferenceDecay,
        SignatureKind::DelusionalExpansion,
        SignatureKind::SemanticHypercoherence,
        SignatureKind::RecurgentParasitism,
        SignatureKind::ParanoidInterpretation,
        SignatureKind::ObserverSolipsism,
        SignatureKind::SemanticNarcissism,
    ];

    /// Stable wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureKind::AttractorDogmatism => "ATTRACTOR_DOGMATISM",
            SignatureKind::BeliefCalcification => "BELIEF_CALCIFICATION",
            SignatureKind::MetricCrystallization => "METRIC_CRYSTALLIZATION",
            SignatureKind::AttractorSplintering => "ATTRACTOR_SPLINTERING",
            SignatureKind::CoherenceDissolution => "COHERENCE_DISSOLUTION",
            SignatureKind::ReferenceDecay => "REFERENCE_DECAY",
            SignatureKind::DelusionalExpansion => "DELUSIONAL_EXPANSION",
            SignatureKind::SemanticHypercoherence => "SEMANTIC_HYPERCOHERENCE",
            SignatureKind::RecurgentParasitism => "RECURGENT_PARASITISM",
            SignatureKind::ParanoidInterpretation => "PARANOID_INTERPRETATION",
            SignatureKind::ObserverSolipsism => "OBSERVER_SOLIPSISM",
            SignatureKind::SemanticNarcissism => "SEMANTIC_NARCISSISM",
        }
    }

    pub fn family(&self) -> SignatureFamily {
        match self {
            SignatureKind::AttractorDogmatism
            | SignatureKind::BeliefCalcification
            | SignatureKind::MetricCrystallization => SignatureFamily::Rigidity,
            SignatureKind::AttractorSplintering
            | SignatureKind::CoherenceDissolution
            | SignatureKind::ReferenceDecay => SignatureFamily::Fragmentation,
            SignatureKind::DelusionalExpansion
            | SignatureKind::SemanticHypercoherence
            | SignatureKind::RecurgentParasitism => SignatureFamily::Inflation,
            SignatureKind::ParanoidInterpretation
            | SignatureKind::ObserverSolipsism
            | SignatureKind::SemanticNarcissism => SignatureFamily::ObserverCoupling,
        }
    }
}

/// Detector output: one record per triggered signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub point_id: Uuid,
    pub kind: SignatureKind,
    /// Bounded [0, 1], finite.
    pub severity: f64,
    /// Kind-specific diagnostic magnitudes.
    pub geometric_signature: Vec<f64>,
    /// Human-readable rationale.
    pub mathematical_evidence: String,
    pub detected_at: DateTime<Utc>,
}

impl SignatureRecord {
    pub fn new(
        point_id: Uuid,
        kind: SignatureKind,
        severity: f64,
        geometric_signature: Vec<f64>,
        mathematical_evidence: String,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            point_id,
            kind,
            severity: clamp_severity(severity),
            geometric_signature,
            mathematical_evidence,
            detected_at,
        }
    }
}

/// One hourly bucket of coordinated cross-source high-coupling pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterRecord {
    /// Deterministic function of the bucket epoch.
    pub cluster_id: Uuid,
    pub bucket_start: DateTime<Utc>,
    pub cluster_size: usize,
    pub avg_coupling: f64,
    pub avg_geometric_coherence: f64,
    pub avg_mass: f64,
    /// Bounded [0, 1].
    pub confidence: f64,
}

/// Per-step dynamics record along an ordered trajectory of points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationRecord {
    pub point_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Coherence distance per second to the previous point.
    pub velocity: f64,
    /// scalar_curvature * velocity.
    pub acceleration: f64,
    pub trajectory_score: f64,
    /// Bounded [0, 1].
    pub urgency: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_clamp_severity_nan() {
        assert_eq!(clamp_severity(f64::NAN), 0.0);
    }

    #[test]
    fn test_clamp_severity_pos_inf() {
        assert_eq!(clamp_severity(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_clamp_severity_neg_inf() {
        assert_eq!(clamp_severity(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_clamp_severity_in_range() {
        assert_eq!(clamp_severity(0.37), 0.37);
    }

    #[test]
    fn test_signature_record_clamps() {
        let record = SignatureRecord::new(
            Uuid::new_v4(),
            SignatureKind::AttractorDogmatism,
            3.5,
            vec![1.0],
            "test".into(),
            now(),
        );
        assert_eq!(record.severity, 1.0);
    }

    #[test]
    fn test_kind_wire_names_unique() {
        let mut names: Vec<&str> = SignatureKind::ALL.iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn test_kind_families_partition() {
        let rigid = SignatureKind::ALL
            .iter()
            .filter(|k| k.family() == SignatureFamily::Rigidity)
            .count();
        let frag = SignatureKind::ALL
            .iter()
            .filter(|k| k.family() == SignatureFamily::Fragmentation)
            .count();
        let infl = SignatureKind::ALL
            .iter()
            .filter(|k| k.family() == SignatureFamily::Inflation)
            .count();
        let obs = SignatureKind::ALL
            .iter()
            .filter(|k| k.family() == SignatureFamily::ObserverCoupling)
            .count();
        assert_eq!((rigid, frag, infl, obs), (3, 3, 3, 3));
    }

    #[test]
    fn test_kind_serde_wire_format() {
        let json = serde_json::to_string(&SignatureKind::SemanticNarcissism).unwrap();
        assert_eq!(json, "\"SEMANTIC_NARCISSISM\"");
    }

    #[test]
    fn test_point_missing_coherence() {
        let point = ManifoldPoint::new("user-a", now());
        assert!(point.require_coherence().is_err());
        assert!(point.coherence_magnitude_or_norm(100).is_none());
    }

    #[test]
    fn test_point_cached_magnitude_wins() {
        let mut point = ManifoldPoint::new("user-a", now());
        point.coherence_field = Some(vec![3.0, 4.0]);
        point.coherence_magnitude = Some(9.9);
        assert_eq!(point.coherence_magnitude_or_norm(100), Some(9.9));
    }

    #[test]
    fn test_point_magnitude_from_field() {
        let mut point = ManifoldPoint::new("user-a", now());
        point.coherence_field = Some(vec![3.0, 4.0]);
        let mag = point.coherence_magnitude_or_norm(100).unwrap();
        assert!((mag - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_self_coupling_flag() {
        let p = Uuid::new_v4();
        let q = Uuid::new_v4();
        assert!(RecursiveCoupling::new(p, p, now()).is_self_coupling());
        assert!(!RecursiveCoupling::new(p, q, now()).is_self_coupling());
    }
}
