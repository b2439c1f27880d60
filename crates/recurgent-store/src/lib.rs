// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Manifold Store Contract
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! The data-store contract the kernel consumes, and an in-memory
//! backend for tests and embedded deployments.
//!
//! Queries return owned buffers: callers acquire, copy, and release —
//! no store handle is held across the dense kernel loops. A relational
//! backend plugs in behind the `ManifoldStore` trait.

pub mod memory;
pub mod store;

pub use memory::MemoryStore;
pub use store::{CouplingOrder, ManifoldStore};
