//! Shared test fixtures and utilities for skitter crates.
//!
//! Provides reusable helpers for building test legs, generating body-surface
//! vertex clouds, and deterministic RNG setup.

pub mod fixtures;
pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use fixtures::{ellipsoid_cloud, test_leg, unit_template};
pub use rng::{angles_within, seeded_rng};
