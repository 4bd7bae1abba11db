//! Body-side coordination for skitter legs.
//!
//! # Architecture
//!
//! ```text
//! surface vertices ──► attach (filter/order) ──► per-leg anchors
//!                                                     │
//! BodyPose (position + yaw + walk state) ────────► Body (coordinator)
//!                                                     │
//!                                        planar batch solve, every tick
//!                                        general 3D retarget, on demand
//! ```
//!
//! The mesh-generation and rendering collaborators sit outside this crate:
//! they supply raw surface vertices and later read joint angles and
//! segment-end positions back from the [`Body`](coordinator::Body).

pub mod attach;
pub mod coordinator;
pub mod gait;
pub mod pose;

pub use attach::{anchor_point, attachment_points};
pub use coordinator::Body;
pub use gait::IdleGait;
pub use pose::BodyPose;
