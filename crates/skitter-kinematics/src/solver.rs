//! General 3D CCD (Cyclic Coordinate Descent) solver.
//!
//! Points one chain's tip at an arbitrary world-space target by adjusting
//! joints tip-to-root, one at a time: the tip and target are transformed
//! into the joint's local frame, projected onto its rotation plane, and the
//! joint is corrected by the signed angle between the two projections.
//!
//! CCD converges fast for serial chains without a Jacobian; per-joint work
//! is O(1) matrix ops. The accumulated joint frame is re-walked from the
//! root on every correction — O(N²) per sweep, fine at N≈7.

use nalgebra::{Matrix4, Point3, Vector2};

use skitter_core::config::SolverConfig;
use skitter_core::error::KinematicsError;
use skitter_core::types::ChainKind;

use crate::chain::{forward_kinematics, joint_rotation, segment_translation, Leg, RootTransform};

/// Projections shorter than this are treated as degenerate: the tip or
/// target lies on the joint's rotation axis and the correction angle is
/// undefined, so the joint is skipped for that sweep.
const PROJECTION_EPSILON: f32 = 1e-6;

// ---------------------------------------------------------------------------
// CcdConfig / SolveReport
// ---------------------------------------------------------------------------

/// Iteration budget and tolerance for the general 3D solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CcdConfig {
    /// Maximum tip-to-root sweeps per solve (default: 10).
    pub max_iterations: u32,
    /// Tip-to-target distance below which the solve stops (default: 0.01
    /// world units).
    pub tolerance: f32,
}

impl Default for CcdConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            tolerance: 0.01,
        }
    }
}

impl From<&SolverConfig> for CcdConfig {
    fn from(config: &SolverConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
        }
    }
}

/// Outcome of a CCD solve.
///
/// Non-convergence is not an error: the chain holds the best pose found and
/// the residual distance is exposed for callers that need a guarantee.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    /// Whether the tip reached the target within tolerance.
    pub converged: bool,
    /// Sweeps actually performed.
    pub iterations: u32,
    /// Final tip-to-target distance.
    pub residual: f32,
}

// ---------------------------------------------------------------------------
// CcdSolver
// ---------------------------------------------------------------------------

/// General 3D CCD solver for [`ChainKind::LocalRotation`] chains.
pub struct CcdSolver {
    config: CcdConfig,
}

impl CcdSolver {
    pub const fn new(config: CcdConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(CcdConfig::default())
    }

    pub const fn config(&self) -> &CcdConfig {
        &self.config
    }

    /// Solve the leg toward `target`, mutating its joint angles in place.
    ///
    /// Best effort: after the iteration budget the leg holds the closest
    /// pose found; inspect [`SolveReport::residual`] when convergence
    /// matters. A chain already within tolerance does zero sweeps.
    ///
    /// # Errors
    ///
    /// [`KinematicsError::AngleConvention`] unless the leg is a
    /// [`ChainKind::LocalRotation`] chain, [`KinematicsError::EmptyChain`]
    /// for a zero-segment leg.
    pub fn solve(
        &self,
        leg: &mut Leg,
        root: &RootTransform,
        target: Point3<f32>,
    ) -> Result<SolveReport, KinematicsError> {
        if leg.kind() != ChainKind::LocalRotation {
            return Err(KinematicsError::AngleConvention {
                expected: ChainKind::LocalRotation,
                got: leg.kind(),
            });
        }
        if leg.is_empty() {
            return Err(KinematicsError::EmptyChain);
        }

        let n = leg.len();
        let root_matrix = root.to_matrix();
        let lengths = leg.segment_lengths();
        let mut iterations = 0;

        for _ in 0..self.config.max_iterations {
            let positions = forward_kinematics(&root_matrix, leg.joint_angles(), &lengths);
            if (positions[n] - target).norm() < self.config.tolerance {
                break;
            }
            iterations += 1;

            for j in (0..n).rev() {
                let positions = forward_kinematics(&root_matrix, leg.joint_angles(), &lengths);
                let tip = positions[n];

                let frame = joint_frame(&root_matrix, leg.joint_angles(), &lengths, j);
                let Some(to_local) = frame.try_inverse() else {
                    continue;
                };

                let tip_local = to_local.transform_point(&tip);
                let target_local = to_local.transform_point(&target);

                // Project onto the joint's rotation plane (local XY).
                let v1 = Vector2::new(tip_local.x, tip_local.y);
                let v2 = Vector2::new(target_local.x, target_local.y);
                if v1.norm() < PROJECTION_EPSILON || v2.norm() < PROJECTION_EPSILON {
                    // Tip or target sits on the rotation axis; the signed
                    // angle is undefined. Skip this joint for the sweep.
                    continue;
                }

                let cross_z = v1.x * v2.y - v1.y * v2.x;
                let correction = cross_z.atan2(v1.dot(&v2)).to_degrees();
                leg.nudge_joint(j, correction);
            }
        }

        let positions = forward_kinematics(&root_matrix, leg.joint_angles(), &lengths);
        let residual = (positions[n] - target).norm();
        let converged = residual < self.config.tolerance;
        if !converged {
            log::debug!(
                "CCD stopped after {iterations} sweeps with residual {residual:.4} (tolerance {})",
                self.config.tolerance
            );
        }
        Ok(SolveReport {
            converged,
            iterations,
            residual,
        })
    }
}

/// Accumulated transform through joint `j`:
/// `R0 · RotZ(θ0) · TransX(L0) · … · RotZ(θj)`.
fn joint_frame(
    root: &Matrix4<f32>,
    angles_deg: &[f32],
    lengths: &[f32],
    j: usize,
) -> Matrix4<f32> {
    let mut frame = *root;
    for i in 0..j {
        frame *= joint_rotation(angles_deg[i]);
        frame *= segment_translation(lengths[i]);
    }
    frame * joint_rotation(angles_deg[j])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
