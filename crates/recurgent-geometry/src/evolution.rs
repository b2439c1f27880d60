// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Coherence Field Evolution Step
// ─────────────────────────────────────────────────────────────────────
//! Single explicit Euler step of the coherence field:
//!
//!   C'[i] = C[i] + dt * (L[i] + A[i] + P[i] + U[i])
//!
//!   L[i] = (sum_jk g^jk * (-sum_l Gamma^l_jk Delta_l)) - M * C[i]
//!   A[i] = -(C_mag - thr) * C[i] / (C_mag + eps)
//!   P[i] = C_mag >= thr ? alpha*beta*(C_mag - thr)^(beta-1) * C[i] / (C_mag + eps) : 0
//!   U[i] = -0.1 * C_mag * C[i]
//!
//! Delta_l is the one-sided component difference of the current field.
//! The i-independent double contraction is hoisted out of the update
//! loop. The d'Alembertian term covers the active dimension and is
//! zero-padded to the storage dimension; the remaining terms apply to
//! every stored component. Missing point or field yields the zero
//! vector of length N.

use recurgent_types::{
    Deadline, EvolutionParams, FieldDims, ManifoldPoint, NumericalGuards, RecurgentResult,
};

use crate::metric::metric_inverse;

/// One explicit evolution step, returning the next coherence field.
pub fn evolve_coherence_field(
    point: Option<&ManifoldPoint>,
    params: &EvolutionParams,
    guards: &NumericalGuards,
    dims: &FieldDims,
    deadline: &Deadline,
) -> RecurgentResult<Vec<f64>> {
    let big_n = dims.storage_dim;
    let n = dims.active_dim;

    let point = match point {
        Some(p) => p,
        None => return Ok(vec![0.0; big_n]),
    };
    let field = match point.coherence_field.as_deref().filter(|f| !f.is_empty()) {
        Some(f) => f,
        None => return Ok(vec![0.0; big_n]),
    };

    let at = |i: usize| field.get(i).copied().unwrap_or(0.0);
    let c_mag = point.coherence_magnitude_or_norm(n).unwrap_or(0.0);
    let mass = point.semantic_mass;
    let thr = params.coherence_threshold;
    let eps = guards.generic_eps;

    // One-sided component differences over the active dimension.
    let mut delta = vec![0.0; n];
    for (l, d) in delta.iter_mut().enumerate().take(n.saturating_sub(1)) {
        *d = at(l + 1) - at(l);
    }

    // Hoisted contraction sum_jk g^jk * (-sum_l Gamma^l_jk Delta_l);
    // zero without a materialized metric and connection.
    let hoisted = match (&point.metric_tensor, point.christoffel_symbols.as_deref()) {
        (Some(metric), Some(gamma)) if gamma.len() >= n * n * n => {
            let g_inv = metric_inverse(metric, guards)?.inverse;
            let m = metric.dim().min(n);
            let mut sum = 0.0;
            for j in 0..m {
                deadline.check()?;
                for k in 0..m {
                    let mut inner = 0.0;
                    for (l, dl) in delta.iter().enumerate().take(m) {
                        inner -= gamma[(l * n + j) * n + k] * dl;
                    }
                    sum += g_inv[j * metric.dim() + k] * inner;
                }
            }
            sum
        }
        _ => 0.0,
    };

    let attractor_scale = -(c_mag - thr) / (c_mag + eps);
    let autopoietic_scale = if c_mag >= thr {
        params.autopoietic_alpha * params.autopoietic_beta
            * (c_mag - thr).powf(params.autopoietic_beta - 1.0)
            / (c_mag + eps)
    } else {
        0.0
    };
    let damping_scale = -0.1 * c_mag;

    let mut next = vec![0.0; big_n];
    for (i, out) in next.iter_mut().enumerate() {
        let c_i = at(i);
        let dalembertian = if i < n { hoisted - mass * c_i } else { 0.0 };
        let drift = dalembertian
            + attractor_scale * c_i
            + autopoietic_scale * c_i
            + damping_scale * c_i;
        *out = c_i + params.dt * drift;
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn small_dims() -> FieldDims {
        FieldDims {
            storage_dim: 8,
            active_dim: 4,
            small_window: 2,
        }
    }

    fn evolve(point: Option<&ManifoldPoint>, dims: &FieldDims) -> Vec<f64> {
        evolve_coherence_field(
            point,
            &EvolutionParams::default(),
            &NumericalGuards::default(),
            dims,
            &Deadline::none(),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_point_zero_vector() {
        let dims = small_dims();
        let next = evolve(None, &dims);
        assert_eq!(next, vec![0.0; 8]);
    }

    #[test]
    fn test_missing_field_zero_vector() {
        let dims = small_dims();
        let point = ManifoldPoint::new("src", now());
        let next = evolve(Some(&point), &dims);
        assert_eq!(next, vec![0.0; 8]);
    }

    #[test]
    fn test_output_length_is_storage_dim() {
        let dims = small_dims();
        let mut point = ManifoldPoint::new("src", now());
        point.coherence_field = Some(vec![0.1; 3]); // shorter than N
        let next = evolve(Some(&point), &dims);
        assert_eq!(next.len(), 8);
    }

    #[test]
    fn test_stability_bound() {
        // dt = 0.01, C_mag <= 1.5: components bounded by 10 * max|C|.
        let dims = small_dims();
        let mut point = ManifoldPoint::new("src", now());
        point.coherence_field = Some(vec![0.7, -0.5, 0.3, 0.2, 0.1, 0.0, -0.2, 0.4]);
        point.semantic_mass = 2.0;
        let next = evolve(Some(&point), &dims);
        let max_c = 0.7;
        assert!(next.iter().all(|v| v.is_finite()));
        assert!(next.iter().all(|v| v.abs() <= 10.0 * max_c), "{next:?}");
    }

    #[test]
    fn test_below_threshold_no_autopoietic_term() {
        // C_mag < 0.7: the attractor term pulls components up
        // (negative scale times positive gap), no autopoietic push.
        let dims = small_dims();
        let mut point = ManifoldPoint::new("src", now());
        point.coherence_field = Some(vec![0.1; 8]);
        point.coherence_magnitude = Some(0.2);
        let next = evolve(Some(&point), &dims);
        // attractor scale = -(0.2 - 0.7)/0.2 = +2.5; damping -0.02
        // drift per unit c = 2.48 -> c' = 0.1 * (1 + 0.0248)
        let want = 0.1 * (1.0 + 0.01 * 2.48);
        for v in &next {
            assert!((v - want).abs() < 1e-9, "{v} vs {want}");
        }
    }

    #[test]
    fn test_at_threshold_attractor_vanishes() {
        let dims = small_dims();
        let mut point = ManifoldPoint::new("src", now());
        point.coherence_field = Some(vec![0.5; 8]);
        point.coherence_magnitude = Some(0.7);
        let next = evolve(Some(&point), &dims);
        // Attractor gap zero, autopoietic edge term zero (beta = 2),
        // damping -0.07 per unit c.
        let want = 0.5 * (1.0 - 0.01 * 0.07);
        for v in &next {
            assert!((v - want).abs() < 1e-6, "{v} vs {want}");
        }
    }

    #[test]
    fn test_mass_damps_active_components_only() {
        let dims = small_dims();
        let mut point = ManifoldPoint::new("src", now());
        point.coherence_field = Some(vec![1.0; 8]);
        point.coherence_magnitude = Some(0.7);
        point.semantic_mass = 10.0;
        let next = evolve(Some(&point), &dims);
        // Active components carry the -M*C term; padded ones do not.
        assert!(next[0] < next[7], "{} vs {}", next[0], next[7]);
    }

    #[test]
    fn test_deterministic() {
        let dims = small_dims();
        let mut point = ManifoldPoint::new("src", now());
        point.coherence_field = Some(vec![0.3, 0.6, -0.1, 0.8, 0.2, 0.0, 0.5, -0.4]);
        point.semantic_mass = 1.2;
        let a = evolve(Some(&point), &dims);
        let b = evolve(Some(&point), &dims);
        assert_eq!(a, b);
    }
}
