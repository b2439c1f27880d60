// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Rigidity Signatures
// ─────────────────────────────────────────────────────────────────────
//! Over-constraint detectors: attractor dogmatism, belief
//! calcification, metric crystallization. Each emits at most one
//! record per call and reads the store through a bounded window.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use recurgent_geometry::{autopoietic_potential, field_distance};
use recurgent_types::{ManifoldPoint, RecurgentResult, SignatureKind, SignatureRecord};

use crate::common::{build_record, DetectorContext};

/// Attractor dogmatism thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DogmatismParams {
    /// Attractor stability above which constraint hardening counts.
    pub stability_crit: f64,
    /// Coherence magnitude floor for the trigger.
    pub coherence_min: f64,
    /// Constraining force / autopoietic potential trigger ratio.
    pub force_ratio_min: f64,
    pub coherence_threshold: f64,
    pub potential_alpha: f64,
    pub potential_beta: f64,
}

impl Default for DogmatismParams {
    fn default() -> Self {
        Self {
            stability_crit: 0.8,
            coherence_min: 0.7,
            force_ratio_min: 3.0,
            coherence_threshold: 0.7,
            potential_alpha: 2.0,
            potential_beta: 2.0,
        }
    }
}

/// Attractor stability so high that the constraining force dwarfs the
/// remaining autopoietic potential.
pub fn attractor_dogmatism(
    ctx: &DetectorContext<'_>,
    point: &ManifoldPoint,
    params: &DogmatismParams,
) -> RecurgentResult<Option<SignatureRecord>> {
    let c_mag = match point.coherence_magnitude_or_norm(ctx.dims.active_dim) {
        Some(v) => v,
        None => return Ok(None),
    };
    let stability = point.attractor_stability;

    let force = (c_mag - params.coherence_threshold).abs() * c_mag;
    let potential = autopoietic_potential(
        c_mag,
        params.coherence_threshold,
        params.potential_alpha,
        params.potential_beta,
    );
    let ratio = force / potential.max(ctx.guards.generic_eps);

    if stability <= params.stability_crit
        || c_mag <= params.coherence_min
        || ratio <= params.force_ratio_min
    {
        return Ok(None);
    }

    Ok(Some(build_record(
        ctx,
        point.id,
        SignatureKind::AttractorDogmatism,
        ratio / 10.0,
        vec![stability, c_mag, force, potential],
        format!(
            "attractor stability {stability:.3} with coherence {c_mag:.3}: \
             constraining force {force:.4} exceeds autopoietic potential \
             {potential:.4} by factor {ratio:.2}"
        ),
    )))
}

/// Belief calcification thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalcificationParams {
    pub window_secs: i64,
    /// Mean coherence drift below which the trajectory counts as frozen.
    pub drift_max: f64,
    /// Mean semantic mass above which frozen counts as calcified.
    pub mass_min: f64,
}

impl Default for CalcificationParams {
    fn default() -> Self {
        Self {
            window_secs: 6 * 3600,
            drift_max: 0.01,
            mass_min: 0.3,
        }
    }
}

/// A heavy conversation trajectory that has stopped moving: mean
/// pairwise coherence distance to the current point under `drift_max`
/// while mean semantic mass stays above `mass_min`.
pub fn belief_calcification(
    ctx: &DetectorContext<'_>,
    point: &ManifoldPoint,
    params: &CalcificationParams,
) -> RecurgentResult<Option<SignatureRecord>> {
    let conversation = match point.conversation_id {
        Some(c) => c,
        None => return Ok(None),
    };
    let current = match point.coherence_field.as_deref().filter(|f| !f.is_empty()) {
        Some(f) => f,
        None => return Ok(None),
    };

    let since = ctx.now - Duration::seconds(params.window_secs);
    let history = ctx.store.conversation_points(conversation, since)?;

    let mut drift_sum = 0.0;
    let mut mass_sum = 0.0;
    let mut samples = 0usize;
    for other in history.iter().filter(|p| p.id != point.id) {
        let field = match other.coherence_field.as_deref().filter(|f| !f.is_empty()) {
            Some(f) => f,
            None => continue,
        };
        drift_sum += field_distance(current, field, ctx.dims.active_dim);
        mass_sum += other.semantic_mass;
        samples += 1;
    }
    if samples == 0 {
        return Ok(None);
    }

    let drift = drift_sum / samples as f64;
    let mean_mass = mass_sum / samples as f64;
    if drift >= params.drift_max || mean_mass <= params.mass_min {
        return Ok(None);
    }

    let severity = (mean_mass / (drift + ctx.guards.generic_eps)) / 50.0;
    Ok(Some(build_record(
        ctx,
        point.id,
        SignatureKind::BeliefCalcification,
        severity,
        vec![drift, mean_mass, samples as f64],
        format!(
            "conversation frozen: mean coherence drift {drift:.5} across \
             {samples} points while mean semantic mass holds at {mean_mass:.3}"
        ),
    )))
}

/// Metric crystallization thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrystallizationParams {
    /// Evolution rate below which the metric counts as crystallized.
    pub rate_max: f64,
    /// Mean diagonal Ricci magnitude above which pressure counts.
    pub pressure_min: f64,
}

impl Default for CrystallizationParams {
    fn default() -> Self {
        Self {
            rate_max: 0.01,
            pressure_min: 0.1,
        }
    }
}

/// Curvature pressure accumulating against a metric that has stopped
/// evolving.
pub fn metric_crystallization(
    ctx: &DetectorContext<'_>,
    point: &ManifoldPoint,
    params: &CrystallizationParams,
) -> RecurgentResult<Option<SignatureRecord>> {
    let ricci = match point.ricci_curvature.as_deref().filter(|r| !r.is_empty()) {
        Some(r) => r,
        None => return Ok(None),
    };

    let n = ctx.dims.active_dim;
    let evolution_rate = 0.1 * point.semantic_mass.abs();

    let mut pressure_sum = 0.0;
    let mut count = 0usize;
    for i in 0..n {
        if let Some(v) = ricci.get(i * n + i) {
            pressure_sum += v.abs();
            count += 1;
        }
    }
    if count == 0 {
        return Ok(None);
    }
    let pressure = pressure_sum / count as f64;

    if evolution_rate >= params.rate_max || pressure <= params.pressure_min {
        return Ok(None);
    }

    let severity = pressure / (evolution_rate + ctx.guards.generic_eps) / 100.0;
    Ok(Some(build_record(
        ctx,
        point.id,
        SignatureKind::MetricCrystallization,
        severity,
        vec![evolution_rate, pressure],
        format!(
            "metric evolution rate {evolution_rate:.5} under curvature \
             pressure {pressure:.4}"
        ),
    )))
}
