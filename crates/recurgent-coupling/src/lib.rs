// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Recursive Coupling Kernel
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Pairwise recursive coupling tensor R_ijk(p, q) and its reductions.
//!
//! The tensor is a damped mixed product of the two semantic fields and
//! the source coherence field:
//!
//!   R_ijk = s_p[i] * s_q[j] * c_p[k] / (1 + |s_p[i]| + |s_q[j]|)
//!
//! Reductions: Frobenius magnitude over the full n^3 tensor, and a
//! per-channel self/hetero decomposition whose squared channel norms
//! partition the squared magnitude (diagonal leading indices i = j are
//! the self share).

pub mod tensor;

pub use tensor::{
    coupling_magnitude, coupling_tensor, split_self_hetero, CouplingSplit,
};
