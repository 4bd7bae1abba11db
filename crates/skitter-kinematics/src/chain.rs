//! Leg chain model and forward kinematics.
//!
//! A [`Leg`] owns an ordered list of rigid [`Segment`]s with one rotational
//! joint per segment. Joint angles are stored in degrees and persist between
//! frames; the chain never stores its root transform, which the coordinator
//! supplies fresh on every FK or solve call.

use std::sync::Arc;

use nalgebra::{Matrix4, Point3, Rotation3, Translation3, Vector3};

use skitter_core::types::{ChainKind, JointLimit};

use crate::planar::planar_fk;

// ---------------------------------------------------------------------------
// SegmentTemplate
// ---------------------------------------------------------------------------

/// Read-only geometric template shared by every segment of a body.
///
/// The original renderer kept one process-wide static mesh for all leg
/// segments; here the template is an explicitly owned resource handed to
/// each [`Leg`] at construction behind an [`Arc`], so its lifetime is tied
/// to the owning body rather than the process.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentTemplate {
    /// Thickness the canonical unit-length segment mesh was built with.
    /// Per-segment `thickness` values scale relative to this.
    pub canonical_thickness: f32,
    /// Radial face count of the canonical segment prism.
    pub radial_sides: u32,
}

impl SegmentTemplate {
    pub const fn new(canonical_thickness: f32) -> Self {
        Self {
            canonical_thickness,
            radial_sides: 6,
        }
    }

    /// Shared handle for a body's segments.
    pub fn shared(canonical_thickness: f32) -> Arc<Self> {
        Arc::new(Self::new(canonical_thickness))
    }
}

impl Default for SegmentTemplate {
    fn default() -> Self {
        Self::new(0.05)
    }
}

// ---------------------------------------------------------------------------
// Segment
// ---------------------------------------------------------------------------

/// Rigid link of fixed length and thickness, attached at the distal end of
/// its owning joint's rotated frame.
#[derive(Debug, Clone)]
pub struct Segment {
    length: f32,
    thickness: f32,
    template: Arc<SegmentTemplate>,
}

impl Segment {
    pub const fn new(length: f32, thickness: f32, template: Arc<SegmentTemplate>) -> Self {
        Self {
            length,
            thickness,
            template,
        }
    }

    pub const fn length(&self) -> f32 {
        self.length
    }

    pub const fn thickness(&self) -> f32 {
        self.thickness
    }

    pub fn template(&self) -> &Arc<SegmentTemplate> {
        &self.template
    }
}

// ---------------------------------------------------------------------------
// RootTransform
// ---------------------------------------------------------------------------

/// Rigid placement of a chain's first joint in world space: position, yaw,
/// and an optional X-mirror for left/right leg symmetry.
///
/// The mirror makes this a general affine transform rather than an isometry,
/// so chain math runs on homogeneous [`Matrix4`]s throughout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootTransform {
    pub position: Point3<f32>,
    pub yaw_deg: f32,
    pub mirror_x: bool,
}

impl RootTransform {
    pub fn identity() -> Self {
        Self {
            position: Point3::origin(),
            yaw_deg: 0.0,
            mirror_x: false,
        }
    }

    pub const fn at(position: Point3<f32>) -> Self {
        Self {
            position,
            yaw_deg: 0.0,
            mirror_x: false,
        }
    }

    /// Homogeneous matrix: `Translate(p) · RotY(yaw) [· MirrorX]`.
    pub fn to_matrix(&self) -> Matrix4<f32> {
        let translate = Translation3::from(self.position.coords).to_homogeneous();
        let yaw = Rotation3::from_axis_angle(&Vector3::y_axis(), self.yaw_deg.to_radians())
            .to_homogeneous();
        let mut m = translate * yaw;
        if self.mirror_x {
            m *= Matrix4::new_nonuniform_scaling(&Vector3::new(-1.0, 1.0, 1.0));
        }
        m
    }
}

impl Default for RootTransform {
    fn default() -> Self {
        Self::identity()
    }
}

// ---------------------------------------------------------------------------
// Forward kinematics
// ---------------------------------------------------------------------------

/// Rotation of a joint about the chain's out-of-plane (local Z) axis.
pub(crate) fn joint_rotation(angle_deg: f32) -> Matrix4<f32> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), angle_deg.to_radians()).to_homogeneous()
}

/// Translation along a segment to its distal end.
pub(crate) fn segment_translation(length: f32) -> Matrix4<f32> {
    Translation3::new(length, 0.0, 0.0).to_homogeneous()
}

/// Evaluate local-rotation forward kinematics.
///
/// Walks `cur = cur · RotZ(θi) · TransX(Li)` from the root and returns the
/// chain's N+1 positions: the root origin followed by each segment's distal
/// end, the last being the tip. Pure function of its inputs; the solvers
/// call it many times per frame.
///
/// `angles` and `lengths` are paired up to the shorter of the two.
pub fn forward_kinematics(
    root: &Matrix4<f32>,
    angles_deg: &[f32],
    lengths: &[f32],
) -> Vec<Point3<f32>> {
    let n = angles_deg.len().min(lengths.len());
    let mut positions = Vec::with_capacity(n + 1);

    let mut cur = *root;
    positions.push(cur.transform_point(&Point3::origin()));

    for i in 0..n {
        cur *= joint_rotation(angles_deg[i]);
        cur *= segment_translation(lengths[i]);
        positions.push(cur.transform_point(&Point3::origin()));
    }
    positions
}

// ---------------------------------------------------------------------------
// Leg
// ---------------------------------------------------------------------------

/// One articulated leg: an ordered chain of joints and segments.
///
/// Invariant: `joint_angles.len() == limits.len() == segments.len()`.
/// The chain owns its joints and segments exclusively; the root transform is
/// supplied externally on every call.
#[derive(Debug, Clone)]
pub struct Leg {
    kind: ChainKind,
    segments: Vec<Segment>,
    joint_angles: Vec<f32>,
    limits: Vec<JointLimit>,
    segment_ends: Vec<Point3<f32>>,
}

impl Leg {
    /// Build a leg of `num_segments` uniform segments.
    pub fn new(
        kind: ChainKind,
        num_segments: usize,
        segment_length: f32,
        thickness: f32,
        template: Arc<SegmentTemplate>,
    ) -> Self {
        let segments = (0..num_segments)
            .map(|_| Segment::new(segment_length, thickness, Arc::clone(&template)))
            .collect();
        Self {
            kind,
            segments,
            joint_angles: vec![0.0; num_segments],
            limits: vec![JointLimit::default(); num_segments],
            segment_ends: Vec::new(),
        }
    }

    pub const fn kind(&self) -> ChainKind {
        self.kind
    }

    /// Number of joints (= segments).
    pub fn len(&self) -> usize {
        self.joint_angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joint_angles.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Per-segment lengths in chain order.
    pub fn segment_lengths(&self) -> Vec<f32> {
        self.segments.iter().map(Segment::length).collect()
    }

    /// Maximum tip extension: the sum of all segment lengths.
    pub fn max_reach(&self) -> f32 {
        self.segments.iter().map(Segment::length).sum()
    }

    /// Copy up to `min(angles.len(), self.len())` values into the joint
    /// vector. Extra input is silently ignored; short input leaves trailing
    /// joints unchanged. Deliberately lenient to allow partial updates.
    pub fn set_joint_angles(&mut self, angles_deg: &[f32]) {
        let n = angles_deg.len().min(self.joint_angles.len());
        self.joint_angles[..n].copy_from_slice(&angles_deg[..n]);
    }

    /// Read-only snapshot of the joint-angle vector, degrees.
    pub fn joint_angles(&self) -> &[f32] {
        &self.joint_angles
    }

    /// Replace per-joint limits, lenient like [`Self::set_joint_angles`].
    pub fn set_limits(&mut self, limits: &[JointLimit]) {
        let n = limits.len().min(self.limits.len());
        self.limits[..n].copy_from_slice(&limits[..n]);
    }

    pub fn limits(&self) -> &[JointLimit] {
        &self.limits
    }

    /// Add a correction to joint `j`, clamped into its limit. No-op for an
    /// out-of-range index.
    pub fn nudge_joint(&mut self, j: usize, delta_deg: f32) {
        if let (Some(angle), Some(limit)) = (self.joint_angles.get_mut(j), self.limits.get(j)) {
            *angle = limit.clamp(*angle + delta_deg);
        }
    }

    /// World positions of the chain under the given root, N+1 points with
    /// the tip last, evaluated under this chain's angle convention.
    pub fn world_points(&self, root: &RootTransform) -> Vec<Point3<f32>> {
        match self.kind {
            ChainKind::LocalRotation => forward_kinematics(
                &root.to_matrix(),
                &self.joint_angles,
                &self.segment_lengths(),
            ),
            ChainKind::CumulativeBend => {
                // Planar pose lifted into the leg's swing plane (local XY).
                let length = self.segments.first().map_or(0.0, Segment::length);
                let m = root.to_matrix();
                planar_fk(&self.joint_angles, length)
                    .into_iter()
                    .map(|(x, y)| m.transform_point(&Point3::new(x, y, 0.0)))
                    .collect()
            }
        }
    }

    /// Run an FK pass and refresh the segment-end cache the renderer reads.
    /// Returns the tip position.
    pub fn refresh_segment_ends(&mut self, root: &RootTransform) -> Point3<f32> {
        let points = self.world_points(root);
        self.segment_ends = points[1..].to_vec();
        *points.last().unwrap_or(&root.position)
    }

    /// World positions of each segment's distal end after the last FK pass.
    /// Empty until the first [`Self::refresh_segment_ends`] call.
    pub fn segment_ends(&self) -> &[Point3<f32>] {
        &self.segment_ends
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    // Local copies of the `skitter_test_utils::fixtures` helpers: the
    // fixture crate's dev-dependency cycle links a second build of this
    // crate, so its `Leg` is a different type from `crate::chain::Leg` in
    // unit tests.
    fn unit_template() -> Arc<SegmentTemplate> {
        SegmentTemplate::shared(0.05)
    }

    fn test_leg(kind: ChainKind, n: usize, segment_length: f32) -> Leg {
        Leg::new(kind, n, segment_length, 0.05, unit_template())
    }

    #[test]
    fn fk_straight_chain_extends_along_x() {
        let root = Matrix4::identity();
        let points = forward_kinematics(&root, &[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0]);
        assert_eq!(points.len(), 4);
        assert_relative_eq!(points[3].x, 3.0, epsilon = 1e-6);
        assert_relative_eq!(points[3].y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(points[3].z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn fk_right_angle_bend() {
        // First joint at 90 deg folds the whole chain onto +Y.
        let root = Matrix4::identity();
        let points = forward_kinematics(&root, &[90.0, 0.0], &[1.0, 1.0]);
        assert_relative_eq!(points[2].x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(points[2].y, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn fk_is_deterministic() {
        let root = RootTransform {
            position: Point3::new(0.5, 1.0, -0.25),
            yaw_deg: 33.0,
            mirror_x: false,
        }
        .to_matrix();
        let angles = [12.0, -40.0, 7.5, 22.0];
        let lengths = [0.6; 4];
        let a = forward_kinematics(&root, &angles, &lengths);
        let b = forward_kinematics(&root, &angles, &lengths);
        assert_eq!(a, b);
    }

    #[test]
    fn fk_pairs_up_to_shorter_input() {
        let root = Matrix4::identity();
        let points = forward_kinematics(&root, &[0.0, 0.0, 0.0], &[1.0, 1.0]);
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn mirrored_root_flips_x() {
        let plain = RootTransform::identity();
        let mirrored = RootTransform {
            mirror_x: true,
            ..RootTransform::identity()
        };
        let angles = [30.0, -20.0];
        let lengths = [1.0, 1.0];
        let a = forward_kinematics(&plain.to_matrix(), &angles, &lengths);
        let b = forward_kinematics(&mirrored.to_matrix(), &angles, &lengths);
        for (pa, pb) in a.iter().zip(&b) {
            assert_relative_eq!(pa.x, -pb.x, epsilon = 1e-5);
            assert_relative_eq!(pa.y, pb.y, epsilon = 1e-5);
            assert_relative_eq!(pa.z, pb.z, epsilon = 1e-5);
        }
    }

    #[test]
    fn set_joint_angles_ignores_extra_input() {
        let mut leg = test_leg(ChainKind::LocalRotation, 3, 1.0);
        leg.set_joint_angles(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(leg.joint_angles(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn set_joint_angles_keeps_trailing_on_short_input() {
        let mut leg = test_leg(ChainKind::LocalRotation, 3, 1.0);
        leg.set_joint_angles(&[10.0, 20.0, 30.0]);
        leg.set_joint_angles(&[-5.0]);
        assert_eq!(leg.joint_angles(), &[-5.0, 20.0, 30.0]);
    }

    #[test]
    fn nudge_joint_clamps_to_limit() {
        let mut leg = test_leg(ChainKind::LocalRotation, 2, 1.0);
        leg.set_limits(&[JointLimit::new(-15.0, 15.0)]);
        leg.nudge_joint(0, 50.0);
        assert_eq!(leg.joint_angles()[0], 15.0);
        leg.nudge_joint(0, -90.0);
        assert_eq!(leg.joint_angles()[0], -15.0);
    }

    #[test]
    fn refresh_segment_ends_caches_n_points() {
        let mut leg = test_leg(ChainKind::LocalRotation, 7, 0.6);
        assert!(leg.segment_ends().is_empty());
        let tip = leg.refresh_segment_ends(&RootTransform::identity());
        assert_eq!(leg.segment_ends().len(), 7);
        assert_relative_eq!(tip.x, 4.2, epsilon = 1e-5);
    }

    #[test]
    fn cumulative_bend_world_points_match_planar_fk() {
        let mut leg = test_leg(ChainKind::CumulativeBend, 3, 1.0);
        leg.set_joint_angles(&[30.0, 30.0, 30.0]);
        let points = leg.world_points(&RootTransform::identity());
        let planar = planar_fk(leg.joint_angles(), 1.0);
        for (p, (x, y)) in points.iter().zip(planar) {
            assert_relative_eq!(p.x, x, epsilon = 1e-5);
            assert_relative_eq!(p.y, y, epsilon = 1e-5);
            assert_relative_eq!(p.z, 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn template_is_shared_across_segments() {
        let template = unit_template();
        let leg = Leg::new(ChainKind::LocalRotation, 4, 0.5, 0.05, Arc::clone(&template));
        for segment in leg.segments() {
            assert!(Arc::ptr_eq(segment.template(), &template));
        }
    }
}
