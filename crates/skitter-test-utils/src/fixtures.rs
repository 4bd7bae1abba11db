//! Chain and body-surface fixtures.

use std::sync::Arc;

use nalgebra::Point3;

use skitter_core::types::ChainKind;
use skitter_kinematics::chain::{Leg, SegmentTemplate};

/// Shared segment template with the canonical test thickness.
pub fn unit_template() -> Arc<SegmentTemplate> {
    SegmentTemplate::shared(0.05)
}

/// A leg of `n` uniform segments at the default thickness, zero pose,
/// default limits.
pub fn test_leg(kind: ChainKind, n: usize, segment_length: f32) -> Leg {
    Leg::new(kind, n, segment_length, 0.05, unit_template())
}

/// Deterministic ellipsoid vertex cloud, the shape of the reference body
/// mesh: `stacks × slices` latitude/longitude samples of an ellipsoid with
/// the given semi-axes, centered at the origin.
pub fn ellipsoid_cloud(rx: f32, ry: f32, rz: f32, stacks: usize, slices: usize) -> Vec<Point3<f32>> {
    let mut vertices = Vec::with_capacity((stacks + 1) * (slices + 1));
    for i in 0..=stacks {
        let phi = std::f32::consts::PI * i as f32 / stacks as f32;
        for j in 0..=slices {
            let theta = std::f32::consts::TAU * j as f32 / slices as f32;
            vertices.push(Point3::new(
                rx * phi.sin() * theta.cos(),
                ry * phi.cos(),
                rz * phi.sin() * theta.sin(),
            ));
        }
    }
    vertices
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leg_has_uniform_segments() {
        let leg = test_leg(ChainKind::LocalRotation, 7, 0.6);
        assert_eq!(leg.len(), 7);
        assert!(leg
            .segments()
            .iter()
            .all(|s| (s.length() - 0.6).abs() < f32::EPSILON));
    }

    #[test]
    fn ellipsoid_cloud_spans_semi_axes() {
        let cloud = ellipsoid_cloud(1.2, 0.8, 1.28, 16, 16);
        let max_x = cloud.iter().map(|p| p.x).fold(f32::MIN, f32::max);
        let max_z = cloud.iter().map(|p| p.z).fold(f32::MIN, f32::max);
        assert!((max_x - 1.2).abs() < 0.05);
        assert!((max_z - 1.28).abs() < 0.05);
    }

    #[test]
    fn ellipsoid_cloud_is_deterministic() {
        assert_eq!(ellipsoid_cloud(1.0, 1.0, 1.0, 8, 8), ellipsoid_cloud(1.0, 1.0, 1.0, 8, 8));
    }
}
