// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Coupling Tensor & Reductions
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use recurgent_types::{ManifoldPoint, RecurgentResult};

/// Mixed-product recursive coupling tensor, n^3 flat at (i*n + j)*n + k.
///
/// Field indices clamp into the available component length, so short
/// vectors repeat their last component instead of failing the pair.
pub fn coupling_tensor(
    p: &ManifoldPoint,
    q: &ManifoldPoint,
    dims: usize,
) -> RecurgentResult<Vec<f64>> {
    let s_p = p.require_semantic()?;
    let s_q = q.require_semantic()?;
    let c_p = p.require_coherence()?;

    let clamped = |field: &[f64], idx: usize| field[idx.min(field.len() - 1)];

    let n = dims;
    let mut tensor = vec![0.0; n * n * n];
    for i in 0..n {
        let sp_i = clamped(s_p, i);
        for j in 0..n {
            let sq_j = clamped(s_q, j);
            let damp = 1.0 + sp_i.abs() + sq_j.abs();
            let pair = sp_i * sq_j / damp;
            for k in 0..n {
                tensor[(i * n + j) * n + k] = pair * clamped(c_p, k);
            }
        }
    }
    Ok(tensor)
}

/// Frobenius magnitude over the full tensor.
pub fn coupling_magnitude(tensor: &[f64]) -> f64 {
    tensor.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Self/hetero decomposition of a coupling tensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouplingSplit {
    /// Per-channel k: norm over the diagonal leading indices (i = j).
    pub self_coupling: Vec<f64>,
    /// Per-channel k: norm over the off-diagonal leading indices.
    pub hetero_coupling: Vec<f64>,
    pub self_strength: f64,
    pub hetero_strength: f64,
}

/// Split a tensor into self (i = j) and hetero (i != j) channel norms.
///
/// The squared channel norms partition the squared Frobenius magnitude:
/// self^2 + hetero^2 == |R|_F^2 within rounding.
pub fn split_self_hetero(tensor: &[f64], dims: usize) -> CouplingSplit {
    let n = dims;
    let mut self_sq = vec![0.0; n];
    let mut hetero_sq = vec![0.0; n];

    for i in 0..n {
        for j in 0..n {
            let target = if i == j { &mut self_sq } else { &mut hetero_sq };
            for (k, slot) in target.iter_mut().enumerate() {
                let v = tensor.get((i * n + j) * n + k).copied().unwrap_or(0.0);
                *slot += v * v;
            }
        }
    }

    let self_strength = self_sq.iter().sum::<f64>().sqrt();
    let hetero_strength = hetero_sq.iter().sum::<f64>().sqrt();
    CouplingSplit {
        self_coupling: self_sq.iter().map(|v| v.sqrt()).collect(),
        hetero_coupling: hetero_sq.iter().map(|v| v.sqrt()).collect(),
        self_strength,
        hetero_strength,
    }
}
