// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Linear Algebra Primitives
// ─────────────────────────────────────────────────────────────────────
//! Determinant with partial pivoting, Gauss-Jordan inverse, truncating
//! vector norm, and the flat row-major index helpers shared by the
//! dense kernels.

use recurgent_types::{RecurgentError, RecurgentResult};

/// Row-major index for n x n matrices (Ricci, inverse metric).
#[inline]
pub fn matrix_index(i: usize, j: usize, n: usize) -> usize {
    i * n + j
}

/// Flat index for rank-3 n^3 tensors (Christoffel, coupling): (k, i, j).
#[inline]
pub fn christoffel_index(k: usize, i: usize, j: usize, n: usize) -> usize {
    (k * n + i) * n + j
}

/// Euclidean norm over the first `dims` components.
///
/// Used to truncate from the storage dimension N to the active
/// dimension n before geometric work.
pub fn vector_norm(v: &[f64], dims: usize) -> RecurgentResult<f64> {
    if v.is_empty() {
        return Err(RecurgentError::DimensionMismatch(
            "vector_norm: empty vector".into(),
        ));
    }
    let take = dims.min(v.len());
    Ok(v[..take].iter().map(|x| x * x).sum::<f64>().sqrt())
}

fn check_square(m: &[f64], n: usize, op: &str) -> RecurgentResult<()> {
    if n == 0 {
        return Err(RecurgentError::DimensionMismatch(format!(
            "{op}: dimension must be >= 1"
        )));
    }
    if m.len() != n * n {
        return Err(RecurgentError::DimensionMismatch(format!(
            "{op}: {n}x{n} matrix needs {} entries, got {}",
            n * n,
            m.len()
        )));
    }
    Ok(())
}

/// Determinant via LU-style elimination with partial pivoting.
///
/// A pivot whose magnitude falls below `pivot_eps` after pivot
/// selection makes the matrix numerically singular: returns `Ok(0.0)`.
/// Sign flips across row swaps are tracked. O(n^3).
pub fn determinant(m: &[f64], n: usize, pivot_eps: f64) -> RecurgentResult<f64> {
    check_square(m, n, "determinant")?;
    let mut a = m.to_vec();
    let mut det = 1.0;

    for col in 0..n {
        // Partial pivoting: largest magnitude in the column.
        let mut pivot_row = col;
        let mut best = a[col * n + col].abs();
        for row in (col + 1)..n {
            let mag = a[row * n + col].abs();
            if mag > best {
                best = mag;
                pivot_row = row;
            }
        }
        if best < pivot_eps {
            return Ok(0.0);
        }
        if pivot_row != col {
            for c in 0..n {
                a.swap(col * n + c, pivot_row * n + c);
            }
            det = -det;
        }

        let pivot = a[col * n + col];
        det *= pivot;
        for row in (col + 1)..n {
            let factor = a[row * n + col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for c in col..n {
                a[row * n + c] -= factor * a[col * n + c];
            }
        }
    }

    Ok(det)
}

/// Inverse via Gauss-Jordan elimination on the augmented [M | I].
///
/// Fails with `SingularMatrix` when any pivot magnitude drops below
/// `pivot_eps`; callers with a metric in hand regularize first
/// (see `metric::metric_inverse`). O(n^3).
pub fn invert(m: &[f64], n: usize, pivot_eps: f64) -> RecurgentResult<Vec<f64>> {
    check_square(m, n, "invert")?;
    let mut a = m.to_vec();
    let mut inv = vec![0.0; n * n];
    for i in 0..n {
        inv[i * n + i] = 1.0;
    }

    for col in 0..n {
        let mut pivot_row = col;
        let mut best = a[col * n + col].abs();
        for row in (col + 1)..n {
            let mag = a[row * n + col].abs();
            if mag > best {
                best = mag;
                pivot_row = row;
            }
        }
        if best < pivot_eps {
            return Err(RecurgentError::SingularMatrix {
                column: col,
                pivot_eps,
            });
        }
        if pivot_row != col {
            for c in 0..n {
                a.swap(col * n + c, pivot_row * n + c);
                inv.swap(col * n + c, pivot_row * n + c);
            }
        }

        // Normalize the pivot row.
        let pivot = a[col * n + col];
        for c in 0..n {
            a[col * n + c] /= pivot;
            inv[col * n + c] /= pivot;
        }

        // Eliminate every other row.
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[row * n + col];
            if factor == 0.0 {
                continue;
            }
            for c in 0..n {
                a[row * n + c] -= factor * a[col * n + c];
                inv[row * n + c] -= factor * inv[col * n + c];
            }
        }
    }

    Ok(inv)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn identity(n: usize) -> Vec<f64> {
        let mut m = vec![0.0; n * n];
        for i in 0..n {
            m[i * n + i] = 1.0;
        }
        m
    }

    #[test]
    fn test_det_identity() {
        for n in [1, 2, 5, 8] {
            let d = determinant(&identity(n), n, EPS).unwrap();
            assert!((d - 1.0).abs() < 1e-9, "det(I_{n}) = {d}");
        }
    }

    #[test]
    fn test_det_known_2x2() {
        let m = vec![2.0, 1.0, 1.0, 2.0];
        let d = determinant(&m, 2, EPS).unwrap();
        assert!((d - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_det_singular_2x2() {
        let m = vec![1.0, 2.0, 2.0, 4.0];
        let d = determinant(&m, 2, EPS).unwrap();
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_det_zero_column() {
        let m = vec![1.0, 0.0, 3.0, 2.0, 0.0, 1.0, 0.5, 0.0, 2.0];
        let d = determinant(&m, 3, EPS).unwrap();
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_det_row_swap_sign() {
        // Permutation of the identity: det = -1.
        let m = vec![0.0, 1.0, 1.0, 0.0];
        let d = determinant(&m, 2, EPS).unwrap();
        assert!((d + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_det_shape_rejected() {
        assert!(determinant(&[1.0, 2.0, 3.0], 2, EPS).is_err());
        assert!(determinant(&[], 0, EPS).is_err());
    }

    #[test]
    fn test_inv_identity() {
        let inv = invert(&identity(4), 4, EPS).unwrap();
        assert_eq!(inv, identity(4));
    }

    #[test]
    fn test_inv_known_2x2() {
        let m = vec![2.0, 1.0, 1.0, 2.0];
        let inv = invert(&m, 2, EPS).unwrap();
        let expected = [2.0 / 3.0, -1.0 / 3.0, -1.0 / 3.0, 2.0 / 3.0];
        for (got, want) in inv.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-9, "{got} vs {want}");
        }
    }

    #[test]
    fn test_inv_times_original_is_identity() {
        let m = vec![4.0, 1.0, 0.5, 1.0, 3.0, 0.2, 0.5, 0.2, 5.0];
        let inv = invert(&m, 3, EPS).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let mut s = 0.0;
                for k in 0..3 {
                    s += inv[i * 3 + k] * m[k * 3 + j];
                }
                let want = if i == j { 1.0 } else { 0.0 };
                assert!((s - want).abs() < 1e-6, "product[{i}][{j}] = {s}");
            }
        }
    }

    #[test]
    fn test_inv_singular_rejected() {
        let m = vec![1.0, 2.0, 2.0, 4.0];
        assert!(matches!(
            invert(&m, 2, EPS),
            Err(RecurgentError::SingularMatrix { .. })
        ));
    }

    #[test]
    fn test_inv_needs_pivoting() {
        // Zero leading pivot forces a row swap.
        let m = vec![0.0, 1.0, 1.0, 0.0];
        let inv = invert(&m, 2, EPS).unwrap();
        assert_eq!(inv, vec![0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_vector_norm_truncates() {
        let v = vec![3.0, 4.0, 100.0, 100.0];
        let norm = vector_norm(&v, 2).unwrap();
        assert!((norm - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_vector_norm_dims_beyond_len() {
        let v = vec![3.0, 4.0];
        let norm = vector_norm(&v, 100).unwrap();
        assert!((norm - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_vector_norm_empty_rejected() {
        assert!(vector_norm(&[], 10).is_err());
    }

    #[test]
    fn test_index_helpers() {
        let n = 7;
        assert_eq!(matrix_index(2, 3, n), 17);
        assert_eq!(christoffel_index(1, 2, 3, n), (1 * 7 + 2) * 7 + 3);
    }
}
