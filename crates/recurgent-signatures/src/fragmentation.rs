// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Fragmentation Signatures
// ─────────────────────────────────────────────────────────────────────
//! Under-constraint detectors: attractor splintering, coherence
//! dissolution, reference decay.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use recurgent_geometry::{autopoietic_potential, field_distance, finite_diffs};
use recurgent_store::CouplingOrder;
use recurgent_types::{ManifoldPoint, RecurgentResult, SignatureKind, SignatureRecord};

use crate::common::{build_record, mean_step_delta, variance, DetectorContext};

/// Attractor splintering thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplinteringParams {
    pub window_secs: i64,
    /// Successive coherence distance above which a new direction counts.
    pub direction_distance_min: f64,
    /// Attractor / autopoietic generation rate trigger ratio.
    pub ratio_min: f64,
    pub coherence_threshold: f64,
    pub potential_alpha: f64,
    pub potential_beta: f64,
}

impl Default for SplinteringParams {
    fn default() -> Self {
        Self {
            window_secs: 2 * 3600,
            direction_distance_min: 0.3,
            ratio_min: 2.0,
            coherence_threshold: 0.7,
            potential_alpha: 1.0,
            potential_beta: 2.0,
        }
    }
}

/// Attractors spawning faster than the autopoietic potential can
/// sustain: direction changes along the conversation trajectory
/// outpace the generation the field supports.
pub fn attractor_splintering(
    ctx: &DetectorContext<'_>,
    point: &ManifoldPoint,
    params: &SplinteringParams,
) -> RecurgentResult<Option<SignatureRecord>> {
    let conversation = match point.conversation_id {
        Some(c) => c,
        None => return Ok(None),
    };
    let c_mag = match point.coherence_magnitude_or_norm(ctx.dims.active_dim) {
        Some(v) => v,
        None => return Ok(None),
    };

    let since = ctx.now - Duration::seconds(params.window_secs);
    let history = ctx.store.conversation_points(conversation, since)?;
    let fields: Vec<&[f64]> = history
        .iter()
        .filter_map(|p| p.coherence_field.as_deref().filter(|f| !f.is_empty()))
        .collect();
    let sample_count = fields.len();
    if sample_count <= 2 {
        return Ok(None);
    }

    // Successive pairwise distances are the direction signal; the
    // distance metric is the single seam to swap for a cosine variant.
    let distances: Vec<f64> = fields
        .windows(2)
        .map(|w| field_distance(w[0], w[1], ctx.dims.active_dim))
        .collect();
    let unique_directions = distances
        .iter()
        .filter(|&&d| d > params.direction_distance_min)
        .count();
    let direction_variance = variance(&distances).unwrap_or(0.0);

    let attractor_rate = unique_directions as f64 * 3600.0 / params.window_secs as f64;
    let potential = autopoietic_potential(
        c_mag,
        params.coherence_threshold,
        params.potential_alpha,
        params.potential_beta,
    );
    let autopoietic_rate = (potential * direction_variance / sample_count as f64).max(0.0);

    let ratio = attractor_rate / autopoietic_rate.max(ctx.guards.generic_eps);
    if ratio <= params.ratio_min {
        return Ok(None);
    }

    Ok(Some(build_record(
        ctx,
        point.id,
        SignatureKind::AttractorSplintering,
        ratio / 10.0,
        vec![
            attractor_rate,
            autopoietic_rate,
            unique_directions as f64,
            sample_count as f64,
        ],
        format!(
            "{unique_directions} direction changes over {sample_count} points: \
             attractor generation {attractor_rate:.4}/h against autopoietic \
             capacity {autopoietic_rate:.6}"
        ),
    )))
}

/// Coherence dissolution thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DissolutionParams {
    /// Coherence norm below which the field is too faint to assess.
    pub coherence_norm_min: f64,
    /// Gradient-to-norm trigger ratio.
    pub gradient_ratio_min: f64,
    /// Finite-difference step.
    pub finite_diff_h: f64,
}

impl Default for DissolutionParams {
    fn default() -> Self {
        Self {
            coherence_norm_min: 0.1,
            gradient_ratio_min: 3.0,
            finite_diff_h: 1e-6,
        }
    }
}

/// Coherence gradient overwhelming the field itself while the discrete
/// Laplacian confirms dispersal.
pub fn coherence_dissolution(
    ctx: &DetectorContext<'_>,
    point: &ManifoldPoint,
    params: &DissolutionParams,
) -> RecurgentResult<Option<SignatureRecord>> {
    let field = match point.coherence_field.as_deref().filter(|f| !f.is_empty()) {
        Some(f) => f,
        None => return Ok(None),
    };
    let c_norm = match point.coherence_magnitude_or_norm(ctx.dims.active_dim) {
        Some(v) => v,
        None => return Ok(None),
    };

    let diffs = finite_diffs(field, params.finite_diff_h, ctx.dims.active_dim)?;
    let gradient_norm = diffs.gradient_norm();
    let laplacian = diffs.laplacian_sum();

    if c_norm <= params.coherence_norm_min
        || gradient_norm <= params.gradient_ratio_min * c_norm
        || laplacian <= 0.0
    {
        return Ok(None);
    }

    let ratio = gradient_norm / c_norm;
    Ok(Some(build_record(
        ctx,
        point.id,
        SignatureKind::CoherenceDissolution,
        ratio / 10.0,
        vec![c_norm, gradient_norm, laplacian],
        format!(
            "coherence gradient {gradient_norm:.4} overwhelms field norm \
             {c_norm:.4} with dispersive curvature {laplacian:.4}"
        ),
    )))
}

/// Reference decay thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecayParams {
    /// Most-recent couplings considered.
    pub sample_limit: usize,
    /// Mean per-step magnitude change below which decay counts.
    pub decay_rate_max: f64,
    /// Compensatory wisdom (W * H) below which decay goes unchecked.
    pub wisdom_min: f64,
}

impl Default for DecayParams {
    fn default() -> Self {
        Self {
            sample_limit: 10,
            decay_rate_max: -0.1,
            wisdom_min: 0.3,
        }
    }
}

/// Coupling magnitudes decaying step over step with no compensating
/// wisdom regulation. An absent wisdom record reads as unregulated.
pub fn reference_decay(
    ctx: &DetectorContext<'_>,
    point: &ManifoldPoint,
    params: &DecayParams,
) -> RecurgentResult<Option<SignatureRecord>> {
    let recent = ctx.store.couplings(
        Some(point.id),
        DateTime::<Utc>::MIN_UTC,
        CouplingOrder::Descending,
        params.sample_limit,
    )?;
    if recent.len() < 2 {
        return Ok(None);
    }

    // Oldest-first magnitudes; the mean step delta is the decay rate.
    let magnitudes: Vec<f64> = recent
        .iter()
        .rev()
        .map(|c| c.coupling_magnitude)
        .collect();
    let decay_rate = match mean_step_delta(&magnitudes) {
        Some(d) => d,
        None => return Ok(None),
    };

    let (wisdom, humility) = match ctx.store.latest_wisdom(point.id)? {
        Some(w) => (w.wisdom_value, w.humility_factor),
        None => (0.0, 0.0),
    };
    let compensatory = wisdom * humility;

    if decay_rate >= params.decay_rate_max || compensatory >= params.wisdom_min {
        return Ok(None);
    }

    let severity = decay_rate.abs() * (1.0 - compensatory) * 10.0;
    Ok(Some(build_record(
        ctx,
        point.id,
        SignatureKind::ReferenceDecay,
        severity,
        vec![decay_rate, compensatory, magnitudes.len() as f64],
        format!(
            "coupling magnitude decaying {decay_rate:.4} per step over \
             {} observations with compensatory wisdom {compensatory:.3}",
            magnitudes.len()
        ),
    )))
}
