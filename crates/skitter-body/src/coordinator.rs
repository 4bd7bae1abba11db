//! Multi-leg coordinator.
//!
//! [`Body`] owns the legs and drives them every tick: it refreshes the
//! attachment points, derives each leg's planar ground target from the
//! body's altitude, runs the planar batch solver over all legs, and
//! refreshes the segment-end caches the renderer reads. Legs are solved
//! sequentially; they share no mutable state, so order is irrelevant.
//!
//! A separate on-demand path retargets exactly one leg to an explicit 3D
//! world point with the general CCD solver. That path solves a dedicated
//! local-rotation chain and keeps its result as a per-slot override, so the
//! batch pass's cumulative-bend angle vectors never mix with the general
//! solver's local-rotation vectors.

use std::sync::Arc;

use nalgebra::{Point3, Rotation3, Vector3};

use skitter_core::config::SkitterConfig;
use skitter_core::error::{KinematicsError, SkitterError};
use skitter_core::types::{ChainKind, Side};

use skitter_kinematics::chain::{Leg, RootTransform, SegmentTemplate};
use skitter_kinematics::planar::{solve_planar_batch, PlanarCcdConfig, PlanarTarget};
use skitter_kinematics::solver::{CcdConfig, CcdSolver, SolveReport};

use crate::attach::{anchor_point, attachment_points};
use crate::gait::IdleGait;
use crate::pose::BodyPose;

/// The articulated body: pose, legs, and their per-tick coordination.
#[derive(Debug)]
pub struct Body {
    config: SkitterConfig,
    pose: BodyPose,
    surface: Vec<Point3<f32>>,
    attach_points: Vec<Point3<f32>>,
    template: Arc<SegmentTemplate>,
    legs: Vec<Leg>,
    retargets: Vec<Option<Leg>>,
    reports: Vec<SolveReport>,
    idle_gait: IdleGait,
    idle_mode: bool,
    time: f32,
    initial_contacts: Vec<Point3<f32>>,
}

impl Body {
    /// Build a body from a validated config and the surface vertex cloud
    /// supplied by the mesh collaborator, and settle the legs onto their
    /// initial ground contacts.
    pub fn new(config: SkitterConfig, surface: Vec<Point3<f32>>) -> Result<Self, SkitterError> {
        config.validate().map_err(SkitterError::Config)?;

        let template = Arc::new(SegmentTemplate::default());
        let n = config.body.segments_per_leg;
        let limits = config.planar.limits_for(n);

        let legs = (0..config.body.leg_count())
            .map(|slot| {
                // Front two pairs are slimmer than the rear pairs.
                let thickness = if slot / 2 < 2 {
                    config.body.front_thickness
                } else {
                    config.body.rear_thickness
                };
                let mut leg = Leg::new(
                    ChainKind::CumulativeBend,
                    n,
                    config.body.segment_length,
                    thickness,
                    Arc::clone(&template),
                );
                leg.set_limits(&limits);
                leg
            })
            .collect::<Vec<_>>();

        let retargets = vec![None; legs.len()];
        let attach_points = attachment_points(&surface, &config.attach);
        let start = config.body.start_position;

        let mut body = Self {
            config,
            pose: BodyPose::at(Point3::new(start[0], start[1], start[2])),
            surface,
            attach_points,
            template,
            legs,
            retargets,
            reports: Vec::new(),
            idle_gait: IdleGait::default(),
            idle_mode: false,
            time: 0.0,
            initial_contacts: Vec::new(),
        };

        // Settle the rest pose so initial ground contacts are meaningful.
        body.update(0.0)?;
        body.initial_contacts = body.leg_tips();
        Ok(body)
    }

    /// Advance one simulation tick.
    ///
    /// Integrates the pose, refreshes attachment points, solves every leg
    /// toward its ground target (or samples the idle gait), and refreshes
    /// the segment-end caches. Must complete before any draw call reads the
    /// joint angles; single-threaded callers get that ordering for free.
    pub fn update(&mut self, dt: f32) -> Result<(), KinematicsError> {
        self.time += dt;
        self.pose.update(dt);
        self.attach_points = attachment_points(&self.surface, &self.config.attach);

        if self.idle_mode {
            let angles = self.idle_gait.sample(self.time);
            for leg in &mut self.legs {
                leg.set_joint_angles(&angles);
            }
            self.reports.clear();
        } else {
            // Vertical target: reach the ground plane (plus clearance) from
            // the body's current altitude. Horizontal reach is constant.
            let target = PlanarTarget::new(
                self.config.planar.reach,
                self.config.body.ground_clearance - self.pose.position.y,
            );
            let targets = vec![target; self.legs.len()];
            let planar_config = PlanarCcdConfig {
                max_iterations: self.config.planar.max_iterations,
                tolerance: self.config.planar.tolerance,
            };
            self.reports = solve_planar_batch(&mut self.legs, &targets, &planar_config)?;
        }

        for slot in 0..self.legs.len() {
            let root = self.leg_root(slot);
            self.legs[slot].refresh_segment_ends(&root);
        }
        Ok(())
    }

    /// Retarget one leg's tip to an explicit world point with the general
    /// 3D solver.
    ///
    /// Solves a dedicated [`ChainKind::LocalRotation`] chain from the rest
    /// pose and keeps it as an override for the slot; the gait leg's
    /// cumulative-bend angles are never written from this path. The
    /// override persists until [`Self::clear_retarget`].
    pub fn retarget_leg(
        &mut self,
        slot: usize,
        target: Point3<f32>,
    ) -> Result<SolveReport, KinematicsError> {
        if slot >= self.legs.len() {
            return Err(KinematicsError::LegSlotOutOfRange {
                slot,
                count: self.legs.len(),
            });
        }

        let mut leg = Leg::new(
            ChainKind::LocalRotation,
            self.config.body.segments_per_leg,
            self.config.body.segment_length,
            self.legs[slot].segments()[0].thickness(),
            Arc::clone(&self.template),
        );
        leg.set_limits(&vec![
            self.config.solver.default_limit();
            self.config.body.segments_per_leg
        ]);

        let root = self.leg_root(slot);
        let solver = CcdSolver::new(CcdConfig::from(&self.config.solver));
        let report = solver.solve(&mut leg, &root, target)?;
        log::info!(
            "retargeted leg {slot}: converged={} residual={:.4}",
            report.converged,
            report.residual
        );

        leg.refresh_segment_ends(&root);
        self.retargets[slot] = Some(leg);
        Ok(report)
    }

    /// Drop a slot's retarget override; the batch pass resumes driving it.
    pub fn clear_retarget(&mut self, slot: usize) {
        if let Some(entry) = self.retargets.get_mut(slot) {
            *entry = None;
        }
    }

    /// Root transform for a leg slot: the attachment point carried into
    /// world space by the body pose, with idle sway on the yaw and a mirror
    /// for left-side legs.
    pub fn leg_root(&self, slot: usize) -> RootTransform {
        let attach = self
            .attach_points
            .get(slot)
            .copied()
            .unwrap_or_else(Point3::origin);
        let yaw = Rotation3::from_axis_angle(&Vector3::y_axis(), self.pose.yaw_deg.to_radians());
        let side = Side::of_slot(slot);
        // Opposite sides sway in opposite phase.
        let sway = if side.is_left() {
            self.idle_gait.sway(self.time)
        } else {
            self.idle_gait.sway(-self.time)
        };
        RootTransform {
            position: self.pose.position + yaw * attach.coords,
            yaw_deg: self.pose.yaw_deg + sway,
            mirror_x: side.is_left(),
        }
    }

    /// Current world tip position per leg slot, preferring retarget
    /// overrides.
    pub fn leg_tips(&self) -> Vec<Point3<f32>> {
        (0..self.legs.len())
            .map(|slot| {
                let leg = self.retargets[slot].as_ref().unwrap_or(&self.legs[slot]);
                leg.segment_ends()
                    .last()
                    .copied()
                    .unwrap_or_else(Point3::origin)
            })
            .collect()
    }

    /// Leg tips at the settled rest pose, computed once at construction.
    pub fn initial_tip_contacts(&self) -> &[Point3<f32>] {
        &self.initial_contacts
    }

    /// Head anchor shared by the geometry collaborator: the body's
    /// front-most surface vertex.
    pub fn head_anchor(&self) -> Point3<f32> {
        anchor_point(&self.surface)
    }

    /// Switch between ground-following and the idle oscillator gait.
    pub fn set_idle(&mut self, idle: bool) {
        self.idle_mode = idle;
    }

    /// Solve reports from the last batch pass, one per leg, exposing each
    /// residual. Empty in idle mode.
    pub fn last_reports(&self) -> &[SolveReport] {
        &self.reports
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn attach_points(&self) -> &[Point3<f32>] {
        &self.attach_points
    }

    pub fn pose(&self) -> &BodyPose {
        &self.pose
    }

    pub fn config(&self) -> &SkitterConfig {
        &self.config
    }

    // Locomotion controls, forwarded to the pose.

    pub fn start_walking_forward(&mut self) {
        self.pose.start_walking_forward();
    }

    pub fn stop_walking_forward(&mut self) {
        self.pose.stop_walking_forward();
    }

    pub fn start_walking_backward(&mut self) {
        self.pose.start_walking_backward();
    }

    pub fn stop_walking_backward(&mut self) {
        self.pose.stop_walking_backward();
    }

    pub fn start_turning_left(&mut self) {
        self.pose.start_turning_left();
    }

    pub fn stop_turning_left(&mut self) {
        self.pose.stop_turning_left();
    }

    pub fn start_turning_right(&mut self) {
        self.pose.start_turning_right();
    }

    pub fn stop_turning_right(&mut self) {
        self.pose.stop_turning_right();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use skitter_test_utils::fixtures::ellipsoid_cloud;

    fn test_body() -> Body {
        let surface = ellipsoid_cloud(1.2, 0.8, 1.28, 24, 24);
        Body::new(SkitterConfig::default(), surface).unwrap()
    }

    #[test]
    fn body_has_eight_legs_and_matching_attach_points() {
        let body = test_body();
        assert_eq!(body.legs().len(), 8);
        assert_eq!(body.attach_points().len(), 8);
        assert_eq!(body.initial_tip_contacts().len(), 8);
    }

    #[test]
    fn initial_contacts_are_finite_and_below_body() {
        let body = test_body();
        let body_y = body.pose().position.y;
        for tip in body.initial_tip_contacts() {
            assert!(tip.coords.iter().all(|c| c.is_finite()));
            assert!(tip.y < body_y, "tip {tip} not below body at y={body_y}");
        }
    }

    #[test]
    fn tick_keeps_all_angles_within_limits() {
        let mut body = test_body();
        for _ in 0..10 {
            body.update(0.05).unwrap();
        }
        for leg in body.legs() {
            for (angle, limit) in leg.joint_angles().iter().zip(leg.limits()) {
                assert!(
                    limit.contains(*angle),
                    "{angle} outside [{}, {}]",
                    limit.min_deg,
                    limit.max_deg
                );
            }
        }
    }

    #[test]
    fn tick_produces_one_report_per_leg() {
        let mut body = test_body();
        body.update(0.05).unwrap();
        let reports = body.last_reports();
        assert_eq!(reports.len(), 8);
        assert!(reports.iter().all(|r| r.residual.is_finite()));
    }

    #[test]
    fn walking_moves_the_body_forward() {
        let mut body = test_body();
        let z0 = body.pose().position.z;
        body.start_walking_forward();
        for _ in 0..20 {
            body.update(0.05).unwrap();
        }
        assert!(body.pose().position.z > z0);
    }

    #[test]
    fn turning_changes_heading() {
        let mut body = test_body();
        body.start_turning_left();
        body.update(1.0).unwrap();
        assert!(body.pose().yaw_deg > 0.0);
    }

    #[test]
    fn retarget_overrides_one_leg_tip() {
        let mut body = test_body();
        body.update(0.05).unwrap();
        let before = body.leg_tips();

        let contact = body.initial_tip_contacts()[7];
        let target = Point3::new(contact.x, -1.0, contact.z);
        let report = body.retarget_leg(7, target).unwrap();
        assert!(report.residual.is_finite());

        let after = body.leg_tips();
        assert_eq!(after[0], before[0]); // other legs untouched
        assert_ne!(after[7], before[7]);

        body.clear_retarget(7);
        assert_eq!(body.leg_tips()[7], before[7]);
    }

    #[test]
    fn retarget_out_of_range_slot_errors() {
        let mut body = test_body();
        let err = body.retarget_leg(99, Point3::origin()).unwrap_err();
        assert_eq!(
            err,
            KinematicsError::LegSlotOutOfRange {
                slot: 99,
                count: 8
            }
        );
    }

    #[test]
    fn idle_mode_samples_oscillators_instead_of_solving() {
        let mut body = test_body();
        body.set_idle(true);
        body.update(0.1).unwrap();
        assert!(body.last_reports().is_empty());
        // All legs share the sampled idle pose.
        let reference = body.legs()[0].joint_angles().to_vec();
        for leg in body.legs() {
            assert_eq!(leg.joint_angles(), reference.as_slice());
        }
    }

    #[test]
    fn mismatched_attach_pair_count_is_rejected_at_construction() {
        // 10 legs against the default 8 attachment points must not build.
        let surface = ellipsoid_cloud(1.2, 0.8, 1.28, 24, 24);
        let mut config = SkitterConfig::default();
        config.body.leg_pairs = 5;
        let err = Body::new(config, surface).unwrap_err();
        assert!(matches!(err, SkitterError::Config(_)));
    }

    #[test]
    fn every_leg_roots_on_a_body_side() {
        let body = test_body();
        for slot in 0..body.legs().len() {
            let root = body.leg_root(slot);
            assert!(
                root.position.x.abs() > 0.5,
                "slot {slot} rooted at body center: {}",
                root.position
            );
        }
    }

    #[test]
    fn left_and_right_roots_mirror() {
        let body = test_body();
        let left = body.leg_root(0);
        let right = body.leg_root(1);
        assert!(left.mirror_x);
        assert!(!right.mirror_x);
        assert!(left.position.x < right.position.x);
    }
}
