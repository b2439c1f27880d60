// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Coordination & Escalation Analytics
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Cross-observation analytics over the manifold store: hourly-bucket
//! coordination clustering of cross-source high-coupling pairs, and
//! escalation scoring along an ordered point trajectory.
//!
//! Both aggregates absorb per-row errors — a malformed pair or an
//! unresolvable point is counted and skipped, never fatal to the call.

pub mod clusters;
pub mod escalation;

pub use clusters::{coordination_clusters, ClusterParams};
pub use escalation::{escalation_trajectory, EscalationParams};
