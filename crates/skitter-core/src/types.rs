//! Shared kinematics types: angle conventions, joint limits, body sides.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ChainKind
// ---------------------------------------------------------------------------

/// Angle convention a chain's joint vector is expressed in.
///
/// The two CCD solvers parameterize "joint angle" differently and their
/// angle vectors are **not** interchangeable:
///
/// - [`ChainKind::LocalRotation`]: each angle is an independent rotation of
///   joint `i` about its local out-of-plane axis. Used by the general 3D
///   solver and the matrix FK walk.
/// - [`ChainKind::CumulativeBend`]: each angle is a bend offset added to a
///   running heading in the chain's swing plane. Used by the planar batch
///   solver and the planar FK.
///
/// Every chain carries its kind and each solver entry point rejects chains
/// of the wrong kind, so a vector produced under one convention can never be
/// fed to the other evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainKind {
    /// Independent per-joint rotations about each joint's local axis.
    LocalRotation,
    /// Bend offsets accumulated into a running planar heading.
    CumulativeBend,
}

// ---------------------------------------------------------------------------
// JointLimit
// ---------------------------------------------------------------------------

/// Inclusive angle range a joint may not exceed, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimit {
    pub min_deg: f32,
    pub max_deg: f32,
}

impl JointLimit {
    pub const fn new(min_deg: f32, max_deg: f32) -> Self {
        Self { min_deg, max_deg }
    }

    /// The default clamp used when a caller supplies no per-joint limits.
    pub const fn symmetric_90() -> Self {
        Self::new(-90.0, 90.0)
    }

    /// Clamp an angle (degrees) into this limit.
    pub fn clamp(&self, angle_deg: f32) -> f32 {
        angle_deg.clamp(self.min_deg, self.max_deg)
    }

    pub fn contains(&self, angle_deg: f32) -> bool {
        angle_deg >= self.min_deg && angle_deg <= self.max_deg
    }
}

impl Default for JointLimit {
    fn default() -> Self {
        Self::symmetric_90()
    }
}

impl From<[f32; 2]> for JointLimit {
    fn from(pair: [f32; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Which side of the body a leg attaches to.
///
/// Left legs render through a mirrored root transform so one chain model
/// serves both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Side of leg slot `i` under the interleaved left/right pair ordering.
    pub const fn of_slot(slot: usize) -> Self {
        if slot % 2 == 0 {
            Self::Left
        } else {
            Self::Right
        }
    }

    pub const fn is_left(self) -> bool {
        matches!(self, Self::Left)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
