// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Recurgent Field Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Public engine facade over the manifold store: the twelve signature
//! detectors (individually, by family, and as a combined sweep),
//! coordination clustering, escalation scoring, and the coherence
//! field evolution step.
//!
//! # Concurrency invariants
//!
//! 1. **Reads are lock-free**: detectors and analytics only read the
//!    store; concurrent calls never contend.
//! 2. **Writes serialize per point**: evolution snapshots and
//!    signature appends take a per-point mutex, so two evolution steps
//!    for one point can never interleave.
//! 3. **Cancellation is cooperative**: every public call accepts a
//!    `Deadline`; on expiry aggregates return finalized records
//!    flagged incomplete, and no record is half-written.
//! 4. **Batch sweeps fan out** on the rayon pool, one task per point;
//!    pure numeric work never yields inside a task.

pub mod engine;

pub use engine::FieldEngine;

pub use recurgent_analytics::{ClusterParams, EscalationParams};
pub use recurgent_signatures::DetectorParams;
pub use recurgent_store::{ManifoldStore, MemoryStore};
pub use recurgent_types::{
    BatchOutcome, Deadline, EngineConfig, RecurgentError, RecurgentResult,
};
