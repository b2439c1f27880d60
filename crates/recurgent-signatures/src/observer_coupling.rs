// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Observer-Coupling Signatures
// ─────────────────────────────────────────────────────────────────────
//! Interpretation-drift detectors: paranoid interpretation, observer
//! solipsism, semantic narcissism. Each compares a source's own
//! trajectory against couplings or cross-source baselines.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use recurgent_geometry::field_distance;
use recurgent_store::CouplingOrder;
use recurgent_types::{ManifoldPoint, RecurgentResult, SignatureKind, SignatureRecord};

use crate::common::{build_record, leading_norm, DetectorContext};

/// Paranoid interpretation thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParanoiaParams {
    pub window_secs: i64,
    /// Same-source points sampled.
    pub sample_limit: usize,
    /// Raw negative-bias mean trigger (not pre-clipped).
    pub bias_min: f64,
    /// Semantic mass above which a point can count as a threat.
    pub threat_mass_min: f64,
    /// Associated coupling magnitude below which it does.
    pub threat_coupling_max: f64,
    /// Threat concentration trigger.
    pub threat_concentration_min: f64,
}

impl Default for ParanoiaParams {
    fn default() -> Self {
        Self {
            window_secs: 12 * 3600,
            sample_limit: 20,
            bias_min: 0.3,
            threat_mass_min: 0.6,
            threat_coupling_max: 0.3,
            threat_concentration_min: 0.8,
        }
    }
}

/// Sustained negative bias with heavy, weakly-coupled points
/// concentrated across a source's recent trajectory.
pub fn paranoid_interpretation(
    ctx: &DetectorContext<'_>,
    point: &ManifoldPoint,
    params: &ParanoiaParams,
) -> RecurgentResult<Option<SignatureRecord>> {
    let since = ctx.now - Duration::seconds(params.window_secs);
    let rows = ctx.store.user_points(
        &point.source_fingerprint,
        since,
        params.sample_limit,
    )?;

    let mut bias_sum = 0.0;
    let mut threat_count = 0usize;
    let mut samples = 0usize;
    for row in &rows {
        let field = match row.coherence_field.as_deref().filter(|f| !f.is_empty()) {
            Some(f) => f,
            None => continue,
        };
        samples += 1;
        let window_norm = leading_norm(field, ctx.dims.small_window);
        bias_sum += (0.5 - window_norm).max(0.0);

        if row.semantic_mass > params.threat_mass_min {
            let latest = ctx.store.couplings(
                Some(row.id),
                DateTime::<Utc>::MIN_UTC,
                CouplingOrder::Descending,
                1,
            )?;
            let magnitude = latest.first().map(|c| c.coupling_magnitude).unwrap_or(0.0);
            if magnitude < params.threat_coupling_max {
                threat_count += 1;
            }
        }
    }
    if samples <= 3 {
        return Ok(None);
    }

    let bias = bias_sum / samples as f64;
    let threat_concentration = threat_count as f64 / samples as f64;
    if bias <= params.bias_min || threat_concentration <= params.threat_concentration_min {
        return Ok(None);
    }

    let severity = bias * threat_concentration * 2.0;
    Ok(Some(build_record(
        ctx,
        point.id,
        SignatureKind::ParanoidInterpretation,
        severity,
        vec![bias, threat_concentration, samples as f64],
        format!(
            "negative bias {bias:.3} with {threat_count} of {samples} recent \
             points reading as heavy, weakly-coupled threats"
        ),
    )))
}

/// Observer solipsism thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolipsismParams {
    /// Same-source points sampled (no lower time bound).
    pub sample_limit: usize,
    /// Self-divergence / coherence-norm trigger ratio.
    pub ratio_min: f64,
    /// Coherence norm below which the field is too faint to assess.
    pub coherence_norm_min: f64,
}

impl Default for SolipsismParams {
    fn default() -> Self {
        Self {
            sample_limit: 10,
            ratio_min: 0.5,
            coherence_norm_min: 0.1,
        }
    }
}

/// A source drifting from its own trajectory faster than its coherence
/// supports, scaled by how far it sits from the cross-source consensus.
pub fn observer_solipsism(
    ctx: &DetectorContext<'_>,
    point: &ManifoldPoint,
    params: &SolipsismParams,
) -> RecurgentResult<Option<SignatureRecord>> {
    let current = match point.coherence_field.as_deref().filter(|f| !f.is_empty()) {
        Some(f) => f,
        None => return Ok(None),
    };
    let c_norm = match point.coherence_magnitude_or_norm(ctx.dims.active_dim) {
        Some(v) => v,
        None => return Ok(None),
    };
    if c_norm <= params.coherence_norm_min {
        return Ok(None);
    }

    let baseline_point = match ctx
        .store
        .latest_cross_source_point(&point.source_fingerprint)?
    {
        Some(p) => p,
        None => return Ok(None),
    };
    let baseline = match baseline_point
        .coherence_field
        .as_deref()
        .filter(|f| !f.is_empty())
    {
        Some(f) => f.to_vec(),
        None => return Ok(None),
    };

    let rows = ctx.store.user_points(
        &point.source_fingerprint,
        DateTime::<Utc>::MIN_UTC,
        params.sample_limit,
    )?;
    let mut self_sum = 0.0;
    let mut consensus_sum = 0.0;
    let mut samples = 0usize;
    for row in rows.iter().filter(|p| p.id != point.id) {
        let field = match row.coherence_field.as_deref().filter(|f| !f.is_empty()) {
            Some(f) => f,
            None => continue,
        };
        self_sum += field_distance(field, current, ctx.dims.active_dim);
        consensus_sum += field_distance(field, &baseline, ctx.dims.active_dim);
        samples += 1;
    }
    if samples <= 2 {
        return Ok(None);
    }

    let self_divergence = self_sum / samples as f64;
    let consensus_divergence = consensus_sum / samples as f64;
    let ratio = self_divergence / c_norm;
    if ratio <= params.ratio_min {
        return Ok(None);
    }

    let severity = ratio * consensus_divergence;
    Ok(Some(build_record(
        ctx,
        point.id,
        SignatureKind::ObserverSolipsism,
        severity,
        vec![ratio, self_divergence, consensus_divergence],
        format!(
            "self-divergence {self_divergence:.4} at ratio {ratio:.3} to \
             coherence, {consensus_divergence:.4} from consensus"
        ),
    )))
}

/// Semantic narcissism thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarcissismParams {
    pub window_secs: i64,
    /// Self share of total coupling strength trigger.
    pub self_fraction_min: f64,
    /// External share ceiling.
    pub external_fraction_max: f64,
    /// Minimum couplings (self + external) for a verdict.
    pub min_couplings: usize,
    /// Cap on couplings scanned in the window.
    pub sample_limit: usize,
}

impl Default for NarcissismParams {
    fn default() -> Self {
        Self {
            window_secs: 12 * 3600,
            self_fraction_min: 0.8,
            external_fraction_max: 0.2,
            min_couplings: 3,
            sample_limit: 1000,
        }
    }
}

/// Coupling strength flowing almost entirely point-to-self: the window
/// keeps couplings whose source endpoint shares the point's
/// fingerprint, then splits self (p = q) from external strength.
pub fn semantic_narcissism(
    ctx: &DetectorContext<'_>,
    point: &ManifoldPoint,
    params: &NarcissismParams,
) -> RecurgentResult<Option<SignatureRecord>> {
    let since = ctx.now - Duration::seconds(params.window_secs);
    let rows = ctx.store.couplings(
        Some(point.id),
        since,
        CouplingOrder::Descending,
        params.sample_limit,
    )?;

    let mut self_strength = 0.0;
    let mut external_strength = 0.0;
    let mut self_count = 0usize;
    let mut external_count = 0usize;
    for coupling in &rows {
        // Only couplings whose source side matches the point's source.
        let same_source = if coupling.source_point == point.id {
            true
        } else {
            match ctx.store.get_point(coupling.source_point)? {
                Some(p) => p.source_fingerprint == point.source_fingerprint,
                None => {
                    log::warn!(
                        "narcissism scan: unresolvable source point {}",
                        coupling.source_point
                    );
                    continue;
                }
            }
        };
        if !same_source {
            continue;
        }
        if coupling.is_self_coupling() {
            self_strength += coupling.coupling_magnitude;
            self_count += 1;
        } else {
            external_strength += coupling.coupling_magnitude;
            external_count += 1;
        }
    }

    let total = self_strength + external_strength;
    if total <= 0.0 || self_count + external_count <= params.min_couplings {
        return Ok(None);
    }

    let self_fraction = self_strength / total;
    let external_fraction = external_strength / total;
    if self_fraction <= params.self_fraction_min
        || external_fraction >= params.external_fraction_max
    {
        return Ok(None);
    }

    let severity = self_fraction * (1.0 - external_fraction);
    Ok(Some(build_record(
        ctx,
        point.id,
        SignatureKind::SemanticNarcissism,
        severity,
        vec![
            self_fraction,
            external_fraction,
            total,
            (self_count + external_count) as f64,
        ],
        format!(
            "self coupling carries {:.1}% of {total:.3} total strength \
             across {} couplings",
            self_fraction * 100.0,
            self_count + external_count
        ),
    )))
}
