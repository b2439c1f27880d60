// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Inflation Signatures
// ─────────────────────────────────────────────────────────────────────
//! Runaway self-reinforcement detectors: delusional expansion,
//! semantic hypercoherence, recurgent parasitism.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use recurgent_geometry::autopoietic_potential;
use recurgent_store::CouplingOrder;
use recurgent_types::{ManifoldPoint, RecurgentResult, SignatureKind, SignatureRecord};

use crate::common::{build_record, mean, mean_step_delta, DetectorContext};

/// Delusional expansion thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionParams {
    /// Potential must exceed this multiple of the constraining force.
    pub potential_force_factor: f64,
    /// Humility factor below which growth goes unregulated.
    pub humility_max: f64,
    /// Wisdom value below which growth goes unregulated.
    pub wisdom_max: f64,
    pub coherence_threshold: f64,
    pub potential_alpha: f64,
    pub potential_beta: f64,
}

impl Default for ExpansionParams {
    fn default() -> Self {
        Self {
            potential_force_factor: 5.0,
            humility_max: 0.1,
            wisdom_max: 0.2,
            coherence_threshold: 0.7,
            potential_alpha: 1.0,
            potential_beta: 2.0,
        }
    }
}

/// Autopoietic potential running far past the constraining force while
/// both regulation signals sit near zero. An absent wisdom record
/// reads as unregulated.
pub fn delusional_expansion(
    ctx: &DetectorContext<'_>,
    point: &ManifoldPoint,
    params: &ExpansionParams,
) -> RecurgentResult<Option<SignatureRecord>> {
    let c_mag = match point.coherence_magnitude_or_norm(ctx.dims.active_dim) {
        Some(v) => v,
        None => return Ok(None),
    };

    let force = (c_mag - params.coherence_threshold).abs() * 0.5;
    if force <= 0.0 {
        return Ok(None);
    }
    let potential = autopoietic_potential(
        c_mag,
        params.coherence_threshold,
        params.potential_alpha,
        params.potential_beta,
    );

    let (wisdom, humility) = match ctx.store.latest_wisdom(point.id)? {
        Some(w) => (w.wisdom_value, w.humility_factor),
        None => (0.0, 0.0),
    };

    if potential <= params.potential_force_factor * force
        || humility >= params.humility_max
        || wisdom >= params.wisdom_max
    {
        return Ok(None);
    }

    let severity = potential / (force + ctx.guards.generic_eps)
        * (1.0 - humility)
        * (1.0 - wisdom)
        / 20.0;
    Ok(Some(build_record(
        ctx,
        point.id,
        SignatureKind::DelusionalExpansion,
        severity,
        vec![potential, force, humility, wisdom],
        format!(
            "autopoietic potential {potential:.4} against constraining \
             force {force:.4} with humility {humility:.3} and wisdom \
             {wisdom:.3}"
        ),
    )))
}

/// Semantic hypercoherence thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypercoherenceParams {
    /// Coherence magnitude gate.
    pub coherence_min: f64,
    pub window_secs: i64,
    /// Mean external influence flux below which the point is sealed.
    pub flux_max: f64,
    /// Cap on couplings scanned in the window.
    pub sample_limit: usize,
}

impl Default for HypercoherenceParams {
    fn default() -> Self {
        Self {
            coherence_min: 0.95,
            window_secs: 4 * 3600,
            flux_max: 0.1,
            sample_limit: 1000,
        }
    }
}

/// Near-perfect internal coherence with almost no external influence
/// flux: the point has sealed itself off.
pub fn semantic_hypercoherence(
    ctx: &DetectorContext<'_>,
    point: &ManifoldPoint,
    params: &HypercoherenceParams,
) -> RecurgentResult<Option<SignatureRecord>> {
    let c_mag = match point.coherence_magnitude_or_norm(ctx.dims.active_dim) {
        Some(v) => v,
        None => return Ok(None),
    };
    if c_mag <= params.coherence_min {
        return Ok(None);
    }

    let since = ctx.now - Duration::seconds(params.window_secs);
    let recent = ctx.store.couplings(
        Some(point.id),
        since,
        CouplingOrder::Descending,
        params.sample_limit,
    )?;
    let magnitudes: Vec<f64> = recent.iter().map(|c| c.coupling_magnitude).collect();
    let flux = match mean(&magnitudes) {
        Some(f) => f,
        None => return Ok(None),
    };

    if flux >= params.flux_max {
        return Ok(None);
    }

    Ok(Some(build_record(
        ctx,
        point.id,
        SignatureKind::SemanticHypercoherence,
        c_mag * (1.0 - flux),
        vec![c_mag, flux, magnitudes.len() as f64],
        format!(
            "coherence {c_mag:.4} with mean external influence flux \
             {flux:.4} over {} couplings",
            magnitudes.len()
        ),
    )))
}

/// Recurgent parasitism thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParasitismParams {
    pub window_secs: i64,
    /// Same-source mass growth per step above which growth counts.
    pub local_growth_min: f64,
    /// Other-source bucketed mass drift below which drain counts.
    pub drain_max: f64,
}

impl Default for ParasitismParams {
    fn default() -> Self {
        Self {
            window_secs: 6 * 3600,
            local_growth_min: 0.5,
            drain_max: -0.2,
        }
    }
}

/// Local semantic mass growing while the surrounding ecology drains.
/// The two series run on independent cadences and are averaged
/// independently.
pub fn recurgent_parasitism(
    ctx: &DetectorContext<'_>,
    point: &ManifoldPoint,
    params: &ParasitismParams,
) -> RecurgentResult<Option<SignatureRecord>> {
    let since = ctx.now - Duration::seconds(params.window_secs);

    // Same-source mass series, oldest first.
    let local_points =
        ctx.store
            .user_points(&point.source_fingerprint, since, usize::MAX)?;
    let local_masses: Vec<f64> = local_points
        .iter()
        .rev()
        .map(|p| p.semantic_mass)
        .collect();
    if local_masses.len() <= 2 {
        return Ok(None);
    }
    let local_growth = match mean_step_delta(&local_masses) {
        Some(d) => d,
        None => return Ok(None),
    };

    // Other-source masses averaged into hour buckets, oldest first.
    let ecology = ctx
        .store
        .cross_source_points(&point.source_fingerprint, since)?;
    let mut buckets: Vec<(i64, f64, usize)> = Vec::new();
    for other in &ecology {
        let bucket = other.created_at.timestamp().div_euclid(3600);
        match buckets.iter_mut().find(|(b, _, _)| *b == bucket) {
            Some((_, sum, count)) => {
                *sum += other.semantic_mass;
                *count += 1;
            }
            None => buckets.push((bucket, other.semantic_mass, 1)),
        }
    }
    buckets.sort_by_key(|(b, _, _)| *b);
    let bucket_means: Vec<f64> = buckets
        .iter()
        .map(|(_, sum, count)| sum / *count as f64)
        .collect();
    if bucket_means.len() <= 2 {
        return Ok(None);
    }
    let ecological_drain = match mean_step_delta(&bucket_means) {
        Some(d) => d,
        None => return Ok(None),
    };

    if local_growth <= params.local_growth_min || ecological_drain >= params.drain_max {
        return Ok(None);
    }

    let severity = local_growth * ecological_drain.abs() * 5.0;
    Ok(Some(build_record(
        ctx,
        point.id,
        SignatureKind::RecurgentParasitism,
        severity,
        vec![
            local_growth,
            ecological_drain,
            local_masses.len() as f64,
            bucket_means.len() as f64,
        ],
        format!(
            "local mass growing {local_growth:.3}/step over {} points while \
             the ecology drains {ecological_drain:.3}/bucket over {} buckets",
            local_masses.len(),
            bucket_means.len()
        ),
    )))
}
