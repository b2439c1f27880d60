// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Manifold Geometry Kernel
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Differential-geometry kernel over semantic field observations:
//! metric construction and regularized inversion, Christoffel symbols,
//! Ricci and scalar curvature, finite differences, geodesic length
//! integration, and the explicit coherence-field evolution step.
//!
//! All operators truncate to the active dimension n; storage vectors
//! keep their full N components. Dense tensors are flat row-major
//! `Vec<f64>` buffers — treat the n^3 Christoffel arrays as scratch
//! unless a caller persists them.

pub mod curvature;
pub mod evolution;
pub mod geodesic;
pub mod linalg;
pub mod metric;
pub mod scalar;

pub use curvature::{christoffel, finite_diffs, ricci, scalar_curvature, FiniteDiffs};
pub use evolution::evolve_coherence_field;
pub use geodesic::{field_distance, geodesic_distance};
pub use linalg::{christoffel_index, determinant, invert, matrix_index, vector_norm};
pub use metric::{build_metric_from_neighbors, metric_inverse, MetricInverse};
pub use scalar::{autopoietic_potential, humility, semantic_mass};
