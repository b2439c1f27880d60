// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Geodesic Length Integrator
// ─────────────────────────────────────────────────────────────────────
//! Linearized geodesic length between two manifold points.
//!
//! The path starts at the first point's truncated semantic field with
//! velocity (p_b - p_a) / steps. At each step the acceleration
//! a^i = -Gamma^i_jk v^j v^k uses Christoffel symbols interpolated
//! linearly between the endpoints (absent symbols read as a flat
//! connection), the position advances a Verlet-style half-step, and
//! the step length sqrt(|g_avg . dx . dx|) accumulates. Falls back to
//! the plain Euclidean distance when either metric is absent.

use recurgent_types::{Deadline, ManifoldPoint, RecurgentResult};

use crate::linalg::christoffel_index;

/// Euclidean distance over the first `dims` components.
pub fn field_distance(a: &[f64], b: &[f64], dims: usize) -> f64 {
    let take = dims.min(a.len()).min(b.len());
    let mut sum = 0.0;
    for i in 0..take {
        let d = a[i] - b[i];
        sum += d * d;
    }
    // Components present on one side only count at full magnitude.
    let longer = if a.len() > b.len() { a } else { b };
    for &v in longer.iter().take(dims).skip(take) {
        sum += v * v;
    }
    sum.sqrt()
}

/// Geodesic distance between two points, `steps` integration steps over
/// the first `dims` components. Non-negative by construction.
pub fn geodesic_distance(
    a: &ManifoldPoint,
    b: &ManifoldPoint,
    steps: usize,
    dims: usize,
    deadline: &Deadline,
) -> RecurgentResult<f64> {
    let field_a = a.require_semantic()?;
    let field_b = b.require_semantic()?;

    let (metric_a, metric_b) = match (&a.metric_tensor, &b.metric_tensor) {
        (Some(ga), Some(gb)) => (ga, gb),
        // Euclidean fallback when geometry is not materialized.
        _ => return Ok(field_distance(field_a, field_b, dims)),
    };

    let n = dims.min(metric_a.dim()).min(metric_b.dim());
    let steps = steps.max(1);

    // Midpoint metric for the step-length quadratic form.
    let mut g_avg = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            g_avg[i * n + j] = 0.5 * (metric_a.get(i, j) + metric_b.get(i, j));
        }
    }

    let at = |field: &[f64], i: usize| field.get(i).copied().unwrap_or(0.0);
    let mut position: Vec<f64> = (0..n).map(|i| at(field_a, i)).collect();
    let mut velocity: Vec<f64> =
        (0..n).map(|i| (at(field_b, i) - at(field_a, i)) / steps as f64).collect();

    let gamma_a = a.christoffel_symbols.as_deref();
    let gamma_b = b.christoffel_symbols.as_deref();
    let gamma_at = |g: Option<&[f64]>, idx: usize| -> f64 {
        g.and_then(|g| g.get(idx).copied()).unwrap_or(0.0)
    };

    let mut total = 0.0;
    let mut acceleration = vec![0.0; n];
    let mut dx = vec![0.0; n];

    for step in 0..steps {
        deadline.check()?;
        let t = step as f64 / steps as f64;

        for i in 0..n {
            let mut acc = 0.0;
            for j in 0..n {
                for k in 0..n {
                    let idx = christoffel_index(i, j, k, n);
                    let g = (1.0 - t) * gamma_at(gamma_a, idx) + t * gamma_at(gamma_b, idx);
                    acc -= g * velocity[j] * velocity[k];
                }
            }
            acceleration[i] = acc;
        }

        // Verlet-style half-step update.
        for i in 0..n {
            dx[i] = velocity[i] + 0.5 * acceleration[i];
            position[i] += dx[i];
            velocity[i] += acceleration[i];
        }

        let mut quad = 0.0;
        for i in 0..n {
            for j in 0..n {
                quad += g_avg[i * n + j] * dx[i] * dx[j];
            }
        }
        total += quad.abs().sqrt();
    }

    Ok(total)
}
