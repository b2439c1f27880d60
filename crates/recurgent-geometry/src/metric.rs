// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Metric Construction & Regularized Inversion
// ─────────────────────────────────────────────────────────────────────
//! Metric tensor build from neighbor field differences and its inverse
//! with Tikhonov-style diagonal regularization.
//!
//! The neighbor heuristic estimates the per-component gradient as the
//! centered difference of the two neighbor fields and fills
//! g_ij = grad_i * grad_j + base * delta_ij. This is a modeling choice
//! (rank-one plus scaled identity, diagonally dominated), not a law;
//! the interface survives a replacement heuristic.

use serde::{Deserialize, Serialize};

use recurgent_types::{NumericalGuards, RecurgentError, RecurgentResult, SymmetricMatrix};

use crate::linalg::{determinant, invert};

/// Build a metric from a field and its two nearest neighbor fields.
///
/// Positive-definite for `base > 0`. Truncates to `dims`; components
/// beyond any input's length contribute a zero gradient.
pub fn build_metric_from_neighbors(
    field: &[f64],
    neighbor_a: &[f64],
    neighbor_b: &[f64],
    base: f64,
    dims: usize,
) -> RecurgentResult<SymmetricMatrix> {
    if field.is_empty() {
        return Err(RecurgentError::MissingInput(
            "build_metric_from_neighbors: field".into(),
        ));
    }
    if dims == 0 {
        return Err(RecurgentError::DimensionMismatch(
            "build_metric_from_neighbors: dims must be >= 1".into(),
        ));
    }

    // Centered difference of the two neighbors per component.
    let mut grad = vec![0.0; dims];
    for (k, g) in grad.iter_mut().enumerate() {
        let a = neighbor_a.get(k).copied().unwrap_or(0.0);
        let b = neighbor_b.get(k).copied().unwrap_or(0.0);
        *g = (b - a) / 2.0;
    }

    let mut metric = SymmetricMatrix::zeros(dims);
    for i in 0..dims {
        for j in i..dims {
            let mut g_ij = grad[i] * grad[j];
            if i == j {
                g_ij += base;
            }
            metric.set(i, j, g_ij);
        }
    }
    Ok(metric)
}

/// Result of a regularized metric inversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricInverse {
    /// Full row-major n x n inverse.
    pub inverse: Vec<f64>,
    /// Determinant actually inverted (post-regularization when it fired).
    pub determinant: f64,
    /// True when the Tikhonov diagonal addition was applied.
    pub regularized: bool,
}

/// Invert a metric, adding `tikhonov_add` to the diagonal first when
/// |det| falls under `det_floor`.
pub fn metric_inverse(
    g: &SymmetricMatrix,
    guards: &NumericalGuards,
) -> RecurgentResult<MetricInverse> {
    let n = g.dim();
    let mut full = g.to_full();
    let mut det = determinant(&full, n, guards.pivot_eps)?;
    let mut regularized = false;

    if det.abs() < guards.det_floor {
        log::warn!(
            "metric_inverse: |det| = {:.3e} under floor, adding {:.1e} to diagonal",
            det.abs(),
            guards.tikhonov_add
        );
        for i in 0..n {
            full[i * n + i] += guards.tikhonov_add;
        }
        det = determinant(&full, n, guards.pivot_eps)?;
        regularized = true;
    }

    let inverse = invert(&full, n, guards.pivot_eps)?;
    Ok(MetricInverse {
        inverse,
        determinant: det,
        regularized,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guards() -> NumericalGuards {
        NumericalGuards::default()
    }

    #[test]
    fn test_build_metric_diagonal_base() {
        let field = vec![1.0; 4];
        let na = vec![1.0; 4];
        let nb = vec![1.0; 4];
        // Identical neighbors -> zero gradient -> base * I.
        let g = build_metric_from_neighbors(&field, &na, &nb, 0.5, 4).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                let want = if i == j { 0.5 } else { 0.0 };
                assert!((g.get(i, j) - want).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_build_metric_rank_one_term() {
        let field = vec![0.0; 2];
        let na = vec![0.0, 0.0];
        let nb = vec![2.0, 4.0];
        // grad = [1, 2]; g = grad grad^T + 0.1 I.
        let g = build_metric_from_neighbors(&field, &na, &nb, 0.1, 2).unwrap();
        assert!((g.get(0, 0) - 1.1).abs() < 1e-12);
        assert!((g.get(0, 1) - 2.0).abs() < 1e-12);
        assert!((g.get(1, 1) - 4.1).abs() < 1e-12);
    }

    #[test]
    fn test_build_metric_positive_definite() {
        let field = vec![0.3, -0.2, 0.9];
        let na = vec![0.1, 0.4, -0.5];
        let nb = vec![0.7, -0.8, 0.2];
        let g = build_metric_from_neighbors(&field, &na, &nb, 0.01, 3).unwrap();
        let det = determinant(&g.to_full(), 3, 1e-12).unwrap();
        assert!(det > 0.0, "det = {det}");
    }

    #[test]
    fn test_build_metric_short_neighbors_clamped() {
        let field = vec![1.0; 5];
        let na = vec![1.0, 2.0];
        let nb = vec![3.0, 6.0];
        let g = build_metric_from_neighbors(&field, &na, &nb, 1.0, 5).unwrap();
        // Components past the neighbor length see zero gradient.
        assert!((g.get(4, 4) - 1.0).abs() < 1e-12);
        assert_eq!(g.get(3, 4), 0.0);
    }

    #[test]
    fn test_build_metric_empty_field_rejected() {
        let e = build_metric_from_neighbors(&[], &[1.0], &[1.0], 0.1, 2);
        assert!(matches!(e, Err(RecurgentError::MissingInput(_))));
    }

    #[test]
    fn test_metric_inverse_identity() {
        let g = SymmetricMatrix::scaled_identity(3, 1.0);
        let result = metric_inverse(&g, &guards()).unwrap();
        assert!(!result.regularized);
        assert!((result.determinant - 1.0).abs() < 1e-9);
        for i in 0..3 {
            for j in 0..3 {
                let want = if i == j { 1.0 } else { 0.0 };
                assert!((result.inverse[i * 3 + j] - want).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_metric_inverse_regularizes_singular() {
        // Zero metric: det = 0 < floor, succeeds after Tikhonov addition.
        let g = SymmetricMatrix::zeros(4);
        let result = metric_inverse(&g, &guards()).unwrap();
        assert!(result.regularized);
        assert!(result.determinant.abs() > 0.0);
        // Inverse of tikhonov_add * I.
        let want = 1.0 / guards().tikhonov_add;
        assert!((result.inverse[0] - want).abs() / want < 1e-6);
    }

    #[test]
    fn test_metric_inverse_near_singular_regularizes() {
        let mut g = SymmetricMatrix::zeros(2);
        g.set(0, 0, 1e-7);
        g.set(1, 1, 1e-7);
        // det = 1e-14 < 1e-10 floor.
        let result = metric_inverse(&g, &guards()).unwrap();
        assert!(result.regularized);
        assert!(result.inverse.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_metric_inverse_well_conditioned_untouched() {
        let mut g = SymmetricMatrix::zeros(2);
        g.set(0, 0, 2.0);
        g.set(0, 1, 1.0);
        g.set(1, 1, 2.0);
        let result = metric_inverse(&g, &guards()).unwrap();
        assert!(!result.regularized);
        assert!((result.determinant - 3.0).abs() < 1e-9);
        assert!((result.inverse[0] - 2.0 / 3.0).abs() < 1e-9);
    }
}
