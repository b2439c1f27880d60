// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Recurgent Field Kernel Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy for the
//! Recurgent Field Kernel — geometric breakdown analytics over
//! semantic field observations.

pub mod config;
pub mod deadline;
pub mod error;
pub mod record;
pub mod tensor;

pub use config::{EngineConfig, EvolutionParams, FieldDims, NumericalGuards};
pub use deadline::{BatchOutcome, Deadline};
pub use error::{RecurgentError, RecurgentResult};
pub use record::{
    clamp_severity, ClusterRecord, EscalationRecord, ManifoldPoint, RecursiveCoupling,
    SignatureFamily, SignatureKind, SignatureRecord, WisdomField,
};
pub use tensor::SymmetricMatrix;
