// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Christoffel, Ricci & Scalar Curvature
// ─────────────────────────────────────────────────────────────────────
//! Connection coefficients and curvature contractions:
//!
//!   Gamma^k_ij = 1/2 g^kl (d_i g_jl + d_j g_il - d_l g_ij)
//!   R_ij       = d_k Gamma^k_ij - d_j Gamma^k_ik
//!                + Gamma^l_ij Gamma^k_kl - Gamma^l_ik Gamma^k_jl
//!   R          = g^ij R_ij
//!
//! Metric partial layout: d_l g_ij at (l*n + i)*n + j. Christoffel
//! partial layout: d_m Gamma^k_ij at ((m*n + k)*n + i)*n + j. Partial
//! terms absent from the inputs are treated as zero.
//!
//! Both builders are O(n^4); the deadline is checked at each outer
//! index.

use serde::{Deserialize, Serialize};

use recurgent_types::{Deadline, NumericalGuards, RecurgentError, RecurgentResult, SymmetricMatrix};

use crate::linalg::christoffel_index;
use crate::metric::metric_inverse;

/// Christoffel symbols of the second kind, n^3 flat at (k*n + i)*n + j.
pub fn christoffel(
    g: &SymmetricMatrix,
    dg: &[f64],
    guards: &NumericalGuards,
    deadline: &Deadline,
) -> RecurgentResult<Vec<f64>> {
    let n = g.dim();
    if dg.len() != n * n * n {
        return Err(RecurgentError::DimensionMismatch(format!(
            "christoffel: metric partials need {} entries, got {}",
            n * n * n,
            dg.len()
        )));
    }

    let g_inv = metric_inverse(g, guards)?.inverse;
    let mut gamma = vec![0.0; n * n * n];

    for k in 0..n {
        deadline.check()?;
        for i in 0..n {
            for j in 0..n {
                let mut sum = 0.0;
                for l in 0..n {
                    let bracket = dg[christoffel_index(i, j, l, n)]
                        + dg[christoffel_index(j, i, l, n)]
                        - dg[christoffel_index(l, i, j, n)];
                    sum += g_inv[k * n + l] * bracket;
                }
                gamma[christoffel_index(k, i, j, n)] = 0.5 * sum;
            }
        }
    }
    Ok(gamma)
}

/// Ricci tensor from Christoffel symbols, n^2 flat at i*n + j.
///
/// The derivative terms are skipped (zero) when `dgamma` is absent.
pub fn ricci(
    gamma: &[f64],
    dgamma: Option<&[f64]>,
    n: usize,
    deadline: &Deadline,
) -> RecurgentResult<Vec<f64>> {
    if gamma.len() != n * n * n {
        return Err(RecurgentError::DimensionMismatch(format!(
            "ricci: Christoffel array needs {} entries, got {}",
            n * n * n,
            gamma.len()
        )));
    }
    if let Some(dg) = dgamma {
        if dg.len() != n * n * n * n {
            return Err(RecurgentError::DimensionMismatch(format!(
                "ricci: Christoffel partials need {} entries, got {}",
                n * n * n * n,
                dg.len()
            )));
        }
    }

    let dgamma_at =
        |m: usize, k: usize, i: usize, j: usize| ((m * n + k) * n + i) * n + j;

    let mut out = vec![0.0; n * n];
    for i in 0..n {
        deadline.check()?;
        for j in 0..n {
            let mut r = 0.0;
            if let Some(dg) = dgamma {
                for k in 0..n {
                    r += dg[dgamma_at(k, k, i, j)];
                    r -= dg[dgamma_at(j, k, i, k)];
                }
            }
            for l in 0..n {
                let gamma_lij = gamma[christoffel_index(l, i, j, n)];
                for k in 0..n {
                    r += gamma_lij * gamma[christoffel_index(k, k, l, n)];
                    r -= gamma[christoffel_index(l, i, k, n)]
                        * gamma[christoffel_index(k, j, l, n)];
                }
            }
            out[i * n + j] = r;
        }
    }
    Ok(out)
}

/// Scalar curvature R = sum_ij g^ij R_ij.
pub fn scalar_curvature(ricci: &[f64], g_inv: &[f64], n: usize) -> RecurgentResult<f64> {
    if ricci.len() != n * n || g_inv.len() != n * n {
        return Err(RecurgentError::DimensionMismatch(format!(
            "scalar_curvature: need {} entries, got ricci {} / inverse {}",
            n * n,
            ricci.len(),
            g_inv.len()
        )));
    }
    let mut r = 0.0;
    for i in 0..n {
        for j in 0..n {
            r += g_inv[i * n + j] * ricci[i * n + j];
        }
    }
    Ok(r)
}

/// First and second finite differences over the leading components of a
/// field, treating the component index as the grid coordinate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiniteDiffs {
    /// Central first derivative, neighbor indices clamped at the ends.
    pub first: Vec<f64>,
    /// Standard three-point second derivative, zero on the boundary rows.
    pub second: Vec<f64>,
}

impl FiniteDiffs {
    /// L2 norm of the first-derivative vector.
    pub fn gradient_norm(&self) -> f64 {
        self.first.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Sum of the second derivatives (discrete Laplacian mass).
    pub fn laplacian_sum(&self) -> f64 {
        self.second.iter().sum()
    }
}

/// Finite differences of the first `dims` components with step `h`.
pub fn finite_diffs(field: &[f64], h: f64, dims: usize) -> RecurgentResult<FiniteDiffs> {
    if field.is_empty() {
        return Err(RecurgentError::DimensionMismatch(
            "finite_diffs: empty field".into(),
        ));
    }
    let n = dims.min(field.len());
    let mut first = vec![0.0; n];
    let mut second = vec![0.0; n];

    for i in 0..n {
        let up = (i + 1).min(n - 1);
        let down = i.saturating_sub(1);
        first[i] = (field[up] - field[down]) / (2.0 * h);
        if i > 0 && i < n - 1 {
            second[i] = (field[i + 1] - 2.0 * field[i] + field[i - 1]) / (h * h);
        }
    }
    Ok(FiniteDiffs { first, second })
}
