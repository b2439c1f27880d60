// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Recurgent Kernel Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{RecurgentError, RecurgentResult};

/// Field dimensionality. The only system-wide constants; everything else
/// is a per-call parameter with a default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FieldDims {
    /// Components stored per field vector.
    pub storage_dim: usize,

    /// Leading components used by every geometric operator. Reducing it
    /// trades accuracy for O(n^3)/O(n^4) speedups.
    pub active_dim: usize,

    /// Small window used by certain reductions (paranoid-interpretation
    /// bias, truncated norms).
    pub small_window: usize,
}

impl Default for FieldDims {
    fn default() -> Self {
        Self {
            storage_dim: 2000,
            active_dim: 100,
            small_window: 50,
        }
    }
}

/// Numerical guard rails shared by the dense kernels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NumericalGuards {
    /// Floor applied to metric determinants before division.
    pub det_floor: f64,

    /// A pivot below this magnitude counts as zero during elimination.
    pub pivot_eps: f64,

    /// Diagonal addition when a metric determinant falls under `det_floor`.
    pub tikhonov_add: f64,

    /// Symmetric clamp on exponents before `exp()`.
    pub exp_clamp: f64,

    /// Generic epsilon guarding divisions in detector severities.
    pub generic_eps: f64,
}

impl Default for NumericalGuards {
    fn default() -> Self {
        Self {
            det_floor: 1e-10,
            pivot_eps: 1e-12,
            tikhonov_add: 1e-6,
            exp_clamp: 50.0,
            generic_eps: 1e-10,
        }
    }
}

/// Parameters of the explicit coherence-field evolution step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EvolutionParams {
    /// Euler step size.
    pub dt: f64,

    /// Step used by the finite-difference operator.
    pub finite_diff_h: f64,

    /// Coherence threshold shared by the attractor and autopoietic terms.
    pub coherence_threshold: f64,

    /// Autopoietic potential gain.
    pub autopoietic_alpha: f64,

    /// Autopoietic potential exponent.
    pub autopoietic_beta: f64,

    /// Humility damping rate.
    pub humility_k: f64,

    /// Optimal coupling magnitude for the humility operator.
    pub humility_r_opt: f64,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            dt: 0.01,
            finite_diff_h: 1e-6,
            coherence_threshold: 0.7,
            autopoietic_alpha: 1.0,
            autopoietic_beta: 2.0,
            humility_k: 2.0,
            humility_r_opt: 0.5,
        }
    }
}

/// Runtime configuration for the Recurgent Field Kernel.
///
/// Detector thresholds and clustering parameters are per-call structs
/// co-located with their operators; this is the system-wide remainder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub dims: FieldDims,
    pub guards: NumericalGuards,
    pub evolution: EvolutionParams,
}

impl EngineConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> RecurgentResult<()> {
        if self.dims.storage_dim == 0 {
            return Err(RecurgentError::Config(
                "storage_dim must be >= 1".to_string(),
            ));
        }
        if self.dims.active_dim == 0 || self.dims.active_dim > self.dims.storage_dim {
            return Err(RecurgentError::Config(format!(
                "active_dim must be in [1, storage_dim], got {}",
                self.dims.active_dim
            )));
        }
        if self.dims.small_window == 0 || self.dims.small_window > self.dims.active_dim {
            return Err(RecurgentError::Config(format!(
                "small_window must be in [1, active_dim], got {}",
                self.dims.small_window
            )));
        }
        if self.guards.pivot_eps <= 0.0 {
            return Err(RecurgentError::Config(format!(
                "pivot_eps must be > 0, got {}",
                self.guards.pivot_eps
            )));
        }
        if self.guards.det_floor <= 0.0 {
            return Err(RecurgentError::Config(format!(
                "det_floor must be > 0, got {}",
                self.guards.det_floor
            )));
        }
        if self.guards.tikhonov_add <= 0.0 {
            return Err(RecurgentError::Config(format!(
                "tikhonov_add must be > 0, got {}",
                self.guards.tikhonov_add
            )));
        }
        if self.guards.exp_clamp <= 0.0 {
            return Err(RecurgentError::Config(format!(
                "exp_clamp must be > 0, got {}",
                self.guards.exp_clamp
            )));
        }
        if self.evolution.dt <= 0.0 {
            return Err(RecurgentError::Config(format!(
                "dt must be > 0, got {}",
                self.evolution.dt
            )));
        }
        if self.evolution.autopoietic_beta <= 0.0 {
            return Err(RecurgentError::Config(format!(
                "autopoietic_beta must be > 0, got {}",
                self.evolution.autopoietic_beta
            )));
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> RecurgentResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| RecurgentError::Config(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}
