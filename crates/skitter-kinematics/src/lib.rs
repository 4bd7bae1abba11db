//! Kinematic chain model and CCD inverse-kinematics solvers for skitter legs.
//!
//! # Architecture
//!
//! ```text
//! Leg (chain model) ──► forward kinematics ──► world joint/tip positions
//!        │
//!        ├──► CcdSolver       (general 3D, LocalRotation chains)
//!        └──► solve_planar_*  (planar batch, CumulativeBend chains)
//! ```
//!
//! A [`Leg`] is an ordered list of uniform rotational joints and rigid
//! segments. The solvers mutate its joint-angle vector in place; the
//! renderer reads the refreshed segment-end cache afterwards in the same
//! tick.
//!
//! # Angle conventions
//!
//! The two solvers parameterize joint angles differently (see
//! [`ChainKind`](skitter_core::types::ChainKind)). Each [`Leg`] is tagged
//! with its convention at construction and each solver entry point rejects
//! chains of the wrong kind, so the two FK evaluators can never be fed each
//! other's angle vectors.

pub mod chain;
pub mod planar;
pub mod solver;

pub use chain::{forward_kinematics, Leg, RootTransform, Segment, SegmentTemplate};
pub use planar::{planar_fk, solve_planar, solve_planar_batch, PlanarCcdConfig, PlanarTarget};
pub use solver::{CcdConfig, CcdSolver, SolveReport};
