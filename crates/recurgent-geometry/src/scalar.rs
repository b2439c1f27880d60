// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Scalar Field Operators
// ─────────────────────────────────────────────────────────────────────
//! The three scalar operators of the field theory:
//!
//!   M    = D * (1 / max(det g, eps)) * A        (semantic mass)
//!   Phi  = alpha * max(0, C - C_thr)^beta       (autopoietic potential)
//!   H[m] = m * exp(clamp(-k * (m - R_opt)))     (humility damping)
//!
//! Phi is strictly zero at and below the threshold and differentiable
//! from the right; H is strictly decreasing above R_opt for k > 0.

/// Semantic mass M = D * (1 / max(det_g, det_floor)) * A.
///
/// Negative recursive depth propagates its sign. A vanishing (or
/// negative) determinant is floored, never divided through.
#[inline]
pub fn semantic_mass(depth: f64, det_g: f64, stability: f64, det_floor: f64) -> f64 {
    depth * (1.0 / det_g.max(det_floor)) * stability
}

/// Autopoietic potential Phi(C) = alpha * max(0, C - c_threshold)^beta.
#[inline]
pub fn autopoietic_potential(c: f64, c_threshold: f64, alpha: f64, beta: f64) -> f64 {
    let excess = (c - c_threshold).max(0.0);
    if excess == 0.0 {
        return 0.0;
    }
    alpha * excess.powf(beta)
}

/// Humility damping H[m] = m * exp(clamp(-k * (m - r_opt), -clamp, +clamp)).
///
/// The exponent clamp prevents overflow for extreme coupling magnitudes.
#[inline]
pub fn humility(m: f64, r_opt: f64, k: f64, exp_clamp: f64) -> f64 {
    let exponent = (-k * (m - r_opt)).clamp(-exp_clamp, exp_clamp);
    m * exponent.exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DET_FLOOR: f64 = 1e-10;
    const EXP_CLAMP: f64 = 50.0;

    #[test]
    fn test_semantic_mass_basic() {
        // D=2, det_g=0.5, A=0.5 -> 2 * 2 * 0.5 = 2.0
        let m = semantic_mass(2.0, 0.5, 0.5, DET_FLOOR);
        assert!((m - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_semantic_mass_floor() {
        // det_g=0 floors to 1e-10 -> 1e10
        let m = semantic_mass(1.0, 0.0, 1.0, DET_FLOOR);
        assert!((m - 1e10).abs() < 1e6);
    }

    #[test]
    fn test_semantic_mass_negative_depth() {
        let m = semantic_mass(-2.0, 0.5, 0.5, DET_FLOOR);
        assert!((m + 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_autopoietic_piecewise() {
        assert!((autopoietic_potential(0.8, 0.7, 1.0, 2.0) - 0.01).abs() < 1e-9);
        assert_eq!(autopoietic_potential(0.7, 0.7, 1.0, 2.0), 0.0);
        assert!((autopoietic_potential(0.9, 0.7, 2.0, 1.0) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_autopoietic_zero_below_threshold() {
        assert_eq!(autopoietic_potential(0.3, 0.7, 1.0, 2.0), 0.0);
        assert_eq!(autopoietic_potential(-5.0, 0.7, 1.0, 2.0), 0.0);
    }

    #[test]
    fn test_autopoietic_continuous_at_threshold() {
        let just_above = autopoietic_potential(0.7 + 1e-9, 0.7, 1.0, 2.0);
        assert!(just_above < 1e-12);
    }

    #[test]
    fn test_autopoietic_strictly_increasing_above_threshold() {
        let mut prev = autopoietic_potential(0.71, 0.7, 1.0, 2.0);
        for i in 2..30 {
            let c = 0.7 + i as f64 * 0.01;
            let phi = autopoietic_potential(c, 0.7, 1.0, 2.0);
            assert!(phi > prev, "Phi({c}) = {phi} not above {prev}");
            prev = phi;
        }
    }

    #[test]
    fn test_humility_at_optimum() {
        let h = humility(0.5, 0.5, 2.0, EXP_CLAMP);
        assert!((h - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_humility_non_negative() {
        for i in 0..50 {
            let m = i as f64 * 0.1;
            assert!(humility(m, 0.5, 2.0, EXP_CLAMP) >= 0.0);
        }
    }

    #[test]
    fn test_humility_decreasing_above_optimum() {
        let mut prev = humility(0.6, 0.5, 2.0, EXP_CLAMP);
        for i in 1..40 {
            let m = 0.6 + i as f64 * 0.1;
            let h = humility(m, 0.5, 2.0, EXP_CLAMP);
            assert!(h < prev, "H({m}) = {h} not below {prev}");
            prev = h;
        }
    }

    #[test]
    fn test_humility_exponent_clamped() {
        // Without the clamp this would overflow to Inf.
        let h = humility(-1e6, 0.5, 2.0, EXP_CLAMP);
        assert!(h.is_finite());
    }
}
