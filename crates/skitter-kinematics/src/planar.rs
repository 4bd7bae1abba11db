//! Planar batch CCD solver for continuous ground-following.
//!
//! A cheaper 2D approximation used for every leg, every tick: each chain is
//! assumed to swing in a fixed vertical plane relative to its attachment,
//! reduced to `(x, y)` with a constant horizontal reach and a target height
//! derived from the body's current altitude.
//!
//! Joint angles here are **cumulative bend offsets** added to a running
//! heading, not independent local rotations — see
//! [`ChainKind`](skitter_core::types::ChainKind). Only
//! [`ChainKind::CumulativeBend`] chains are accepted.

use skitter_core::error::KinematicsError;
use skitter_core::types::{ChainKind, JointLimit};

use crate::chain::{Leg, Segment};
use crate::solver::SolveReport;

// ---------------------------------------------------------------------------
// PlanarTarget / PlanarCcdConfig
// ---------------------------------------------------------------------------

/// A 2D target in a chain's local swing plane: `x` along the leg's
/// horizontal reach axis, `y` vertical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarTarget {
    pub x: f32,
    pub y: f32,
}

impl PlanarTarget {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Iteration budget and tolerance shared by every chain in a batch pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarCcdConfig {
    /// Maximum CCD sweeps per chain (default: 10).
    pub max_iterations: u32,
    /// Planar tip-to-target distance below which a chain stops (default: 0.01).
    pub tolerance: f32,
}

impl Default for PlanarCcdConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            tolerance: 0.01,
        }
    }
}

// ---------------------------------------------------------------------------
// Planar FK
// ---------------------------------------------------------------------------

/// Evaluate cumulative-bend planar forward kinematics.
///
/// Each angle is added to the running heading before stepping one segment:
///
/// ```text
/// a += θ[i]
/// x[i+1] = x[i] + L·cos(a)
/// y[i+1] = y[i] + L·sin(a)
/// ```
///
/// Returns N+1 `(x, y)` points starting at the origin, the last being the
/// tip. Pure function; no hidden state.
pub fn planar_fk(angles_deg: &[f32], segment_length: f32) -> Vec<(f32, f32)> {
    let mut points = Vec::with_capacity(angles_deg.len() + 1);
    points.push((0.0, 0.0));

    let mut heading_deg = 0.0f32;
    let (mut x, mut y) = (0.0, 0.0);
    for &angle in angles_deg {
        heading_deg += angle;
        let rad = heading_deg.to_radians();
        x += segment_length * rad.cos();
        y += segment_length * rad.sin();
        points.push((x, y));
    }
    points
}

// ---------------------------------------------------------------------------
// Planar CCD
// ---------------------------------------------------------------------------

/// Solve one planar chain toward `target`, mutating `angles` in place.
///
/// Tip-to-root sweeps: each joint is corrected by the signed angle between
/// the joint→tip and joint→target directions, then clamped into its limit
/// (`limits` is read leniently; missing entries fall back to the symmetric
/// default). Best effort: returns the pose found after the iteration budget
/// even when the tolerance was not met, with the residual exposed in the
/// report.
pub fn solve_planar(
    angles_deg: &mut [f32],
    segment_length: f32,
    limits: &[JointLimit],
    target: PlanarTarget,
    config: &PlanarCcdConfig,
) -> SolveReport {
    let n = angles_deg.len();
    let mut iterations = 0;

    for _ in 0..config.max_iterations {
        let points = planar_fk(angles_deg, segment_length);
        let tip = points[n];
        if planar_distance(tip, (target.x, target.y)) < config.tolerance {
            break;
        }
        iterations += 1;

        for j in (0..n).rev() {
            let points = planar_fk(angles_deg, segment_length);
            let joint = points[j];
            let tip = points[n];

            let to_target = (target.y - joint.1).atan2(target.x - joint.0);
            let to_tip = (tip.1 - joint.1).atan2(tip.0 - joint.0);
            let correction = (to_target - to_tip).to_degrees();

            let limit = limits.get(j).copied().unwrap_or_default();
            angles_deg[j] = limit.clamp(angles_deg[j] + correction);
        }
    }

    let points = planar_fk(angles_deg, segment_length);
    let residual = planar_distance(points[n], (target.x, target.y));
    SolveReport {
        converged: residual < config.tolerance,
        iterations,
        residual,
    }
}

/// Solve every chain in the batch against its target, sequentially.
///
/// Chains are independent (no shared mutable state), so order does not
/// matter. Legs and targets are paired up to the shorter of the two lists;
/// unpaired legs are left untouched.
///
/// # Errors
///
/// [`KinematicsError::AngleConvention`] if any leg is not a
/// [`ChainKind::CumulativeBend`] chain. No leg is mutated in that case.
pub fn solve_planar_batch(
    legs: &mut [Leg],
    targets: &[PlanarTarget],
    config: &PlanarCcdConfig,
) -> Result<Vec<SolveReport>, KinematicsError> {
    for leg in legs.iter() {
        if leg.kind() != ChainKind::CumulativeBend {
            return Err(KinematicsError::AngleConvention {
                expected: ChainKind::CumulativeBend,
                got: leg.kind(),
            });
        }
    }

    let mut reports = Vec::with_capacity(legs.len().min(targets.len()));
    for (leg, &target) in legs.iter_mut().zip(targets) {
        let segment_length = leg.segments().first().map_or(0.0, Segment::length);
        let mut angles = leg.joint_angles().to_vec();
        let report = solve_planar(
            &mut angles,
            segment_length,
            leg.limits(),
            target,
            config,
        );
        leg.set_joint_angles(&angles);
        reports.push(report);
    }
    Ok(reports)
}

fn planar_distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (a.0 - b.0, a.1 - b.1);
    (dx * dx + dy * dy).sqrt()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::chain::SegmentTemplate;

    // Local copy of `skitter_test_utils::fixtures::test_leg`: the fixture
    // crate's dev-dependency cycle links a second build of this crate, so
    // its `Leg` is a different type from `crate::chain::Leg` in unit tests.
    fn test_leg(kind: ChainKind, n: usize, segment_length: f32) -> Leg {
        Leg::new(kind, n, segment_length, 0.05, SegmentTemplate::shared(0.05))
    }

    #[test]
    fn planar_fk_straight_chain() {
        let points = planar_fk(&[0.0, 0.0, 0.0], 1.0);
        assert_eq!(points.len(), 4);
        assert_relative_eq!(points[3].0, 3.0, epsilon = 1e-6);
        assert_relative_eq!(points[3].1, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn planar_fk_accumulates_heading() {
        // 90 + 90 folds the second segment back onto -X.
        let points = planar_fk(&[90.0, 90.0], 1.0);
        assert_relative_eq!(points[1].0, 0.0, epsilon = 1e-5);
        assert_relative_eq!(points[1].1, 1.0, epsilon = 1e-5);
        assert_relative_eq!(points[2].0, -1.0, epsilon = 1e-5);
        assert_relative_eq!(points[2].1, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn two_segment_chain_reaches_target() {
        // N=2, L=1, target (1.5, 0.5), unrestricted limits.
        let mut angles = [0.0, 0.0];
        let limits = [JointLimit::new(-180.0, 180.0); 2];
        let config = PlanarCcdConfig {
            max_iterations: 20,
            tolerance: 0.01,
        };
        let report = solve_planar(&mut angles, 1.0, &limits, PlanarTarget::new(1.5, 0.5), &config);
        assert!(report.converged, "residual {}", report.residual);

        let points = planar_fk(&angles, 1.0);
        assert!(planar_distance(points[2], (1.5, 0.5)) < 0.01);
    }

    #[test]
    fn already_solved_chain_does_zero_sweeps() {
        let mut angles = [0.0, 0.0];
        let limits = [JointLimit::default(); 2];
        let report = solve_planar(
            &mut angles,
            1.0,
            &limits,
            PlanarTarget::new(2.0, 0.0),
            &PlanarCcdConfig::default(),
        );
        assert!(report.converged);
        assert_eq!(report.iterations, 0);
        assert_eq!(angles, [0.0, 0.0]);
    }

    #[test]
    fn solve_respects_biological_limits() {
        let limits = [
            JointLimit::new(30.0, 90.0),
            JointLimit::new(-15.0, 15.0),
            JointLimit::new(-40.0, 40.0),
            JointLimit::new(-30.0, 40.0),
            JointLimit::new(-30.0, 0.0),
            JointLimit::new(-30.0, 0.0),
            JointLimit::new(-30.0, 0.0),
        ];
        let mut angles = [45.0, 0.0, 0.0, 0.0, -10.0, -10.0, -10.0];
        solve_planar(
            &mut angles,
            0.6,
            &limits,
            PlanarTarget::new(3.0, -1.0),
            &PlanarCcdConfig::default(),
        );
        for (angle, limit) in angles.iter().zip(&limits) {
            assert!(
                limit.contains(*angle),
                "{angle} outside [{}, {}]",
                limit.min_deg,
                limit.max_deg
            );
        }
    }

    #[test]
    fn unreachable_target_keeps_angles_finite() {
        let mut angles = [0.0; 4];
        let limits = [JointLimit::new(-180.0, 180.0); 4];
        let report = solve_planar(
            &mut angles,
            1.0,
            &limits,
            PlanarTarget::new(50.0, 0.0),
            &PlanarCcdConfig::default(),
        );
        assert!(!report.converged);
        assert!(report.residual.is_finite());
        assert!(angles.iter().all(|a| a.is_finite()));
    }

    #[test]
    fn batch_rejects_local_rotation_chains() {
        let mut legs = vec![test_leg(ChainKind::LocalRotation, 3, 1.0)];
        let targets = [PlanarTarget::new(1.0, 0.0)];
        let err =
            solve_planar_batch(&mut legs, &targets, &PlanarCcdConfig::default()).unwrap_err();
        assert_eq!(
            err,
            KinematicsError::AngleConvention {
                expected: ChainKind::CumulativeBend,
                got: ChainKind::LocalRotation,
            }
        );
        // Untouched on error.
        assert_eq!(legs[0].joint_angles(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn batch_solves_chains_independently() {
        let mut legs = vec![
            test_leg(ChainKind::CumulativeBend, 3, 1.0),
            test_leg(ChainKind::CumulativeBend, 3, 1.0),
        ];
        for leg in &mut legs {
            leg.set_limits(&[JointLimit::new(-180.0, 180.0); 3]);
        }
        let targets = [PlanarTarget::new(2.0, 0.5), PlanarTarget::new(2.0, 0.5)];
        let reports =
            solve_planar_batch(&mut legs, &targets, &PlanarCcdConfig::default()).unwrap();
        assert_eq!(reports.len(), 2);
        // Identical chains + identical targets = identical poses.
        assert_eq!(legs[0].joint_angles(), legs[1].joint_angles());
    }

    #[test]
    fn batch_pairs_up_to_shorter_list() {
        let mut legs = vec![
            test_leg(ChainKind::CumulativeBend, 2, 1.0),
            test_leg(ChainKind::CumulativeBend, 2, 1.0),
        ];
        let targets = [PlanarTarget::new(1.5, 0.5)];
        let reports =
            solve_planar_batch(&mut legs, &targets, &PlanarCcdConfig::default()).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(legs[1].joint_angles(), &[0.0, 0.0]);
    }
}
