// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Symmetric Tensor Storage
// ─────────────────────────────────────────────────────────────────────
//! Flattened upper-triangular storage for symmetric matrices.
//!
//! The metric tensor is persisted as its upper triangle; both halves are
//! read through mirrored index access. Dense kernels expand to full
//! row-major form once and work on the expansion.

use serde::{Deserialize, Serialize};

use crate::error::{RecurgentError, RecurgentResult};

/// Symmetric n x n matrix stored as the flattened upper triangle
/// (row-major, `n * (n + 1) / 2` entries).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymmetricMatrix {
    dim: usize,
    upper: Vec<f64>,
}

impl SymmetricMatrix {
    /// Zero matrix of dimension `dim`.
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            upper: vec![0.0; dim * (dim + 1) / 2],
        }
    }

    /// Identity scaled by `value`.
    pub fn scaled_identity(dim: usize, value: f64) -> Self {
        let mut m = Self::zeros(dim);
        for i in 0..dim {
            m.set(i, i, value);
        }
        m
    }

    /// Wrap an existing upper-triangle buffer.
    pub fn from_upper(dim: usize, upper: Vec<f64>) -> RecurgentResult<Self> {
        let expected = dim * (dim + 1) / 2;
        if upper.len() != expected {
            return Err(RecurgentError::DimensionMismatch(format!(
                "upper triangle of dim {dim} needs {expected} entries, got {}",
                upper.len()
            )));
        }
        Ok(Self { dim, upper })
    }

    /// Symmetrize a full row-major matrix (halves averaged).
    pub fn from_full(dim: usize, full: &[f64]) -> RecurgentResult<Self> {
        if full.len() != dim * dim {
            return Err(RecurgentError::DimensionMismatch(format!(
                "full matrix of dim {dim} needs {} entries, got {}",
                dim * dim,
                full.len()
            )));
        }
        let mut m = Self::zeros(dim);
        for i in 0..dim {
            for j in i..dim {
                m.set(i, j, 0.5 * (full[i * dim + j] + full[j * dim + i]));
            }
        }
        Ok(m)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    fn upper_index(&self, i: usize, j: usize) -> usize {
        // (i, j) with i <= j into the flattened upper triangle.
        i * self.dim - i * (i + 1) / 2 + j
    }

    /// Mirrored read: `get(i, j) == get(j, i)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let (a, b) = if i <= j { (i, j) } else { (j, i) };
        self.upper[self.upper_index(a, b)]
    }

    /// Mirrored write.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        let (a, b) = if i <= j { (i, j) } else { (j, i) };
        let idx = self.upper_index(a, b);
        self.upper[idx] = value;
    }

    /// Expand to full row-major `dim * dim` form.
    pub fn to_full(&self) -> Vec<f64> {
        let n = self.dim;
        let mut full = vec![0.0; n * n];
        for i in 0..n {
            for j in i..n {
                let v = self.upper[self.upper_index(i, j)];
                full[i * n + j] = v;
                full[j * n + i] = v;
            }
        }
        full
    }

    /// Sum of diagonal entries.
    pub fn trace(&self) -> f64 {
        (0..self.dim).map(|i| self.get(i, i)).sum()
    }
}
