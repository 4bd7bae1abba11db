//! Body pose: world position, yaw heading, and locomotion toggles.

use nalgebra::{Point3, Vector3};

// Reference locomotion rates, world units / degrees per second.
const WALK_SPEED: f32 = 0.6;
const TURN_SPEED_DEG: f32 = 45.0;

/// Current rigid placement of the body plus its locomotion state.
///
/// The coordinator integrates this once per tick and derives every leg's
/// root transform from it; chains never store the pose themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPose {
    pub position: Point3<f32>,
    pub yaw_deg: f32,
    walking_forward: bool,
    walking_backward: bool,
    turning_left: bool,
    turning_right: bool,
}

impl BodyPose {
    pub const fn at(position: Point3<f32>) -> Self {
        Self {
            position,
            yaw_deg: 0.0,
            walking_forward: false,
            walking_backward: false,
            turning_left: false,
            turning_right: false,
        }
    }

    /// Unit forward direction under the current yaw (+Z at yaw 0).
    pub fn forward(&self) -> Vector3<f32> {
        let rad = self.yaw_deg.to_radians();
        Vector3::new(rad.sin(), 0.0, rad.cos())
    }

    /// Integrate walk/turn state over `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let mut turn = 0.0;
        if self.turning_left {
            turn += TURN_SPEED_DEG;
        }
        if self.turning_right {
            turn -= TURN_SPEED_DEG;
        }
        self.yaw_deg += turn * dt;

        let mut drive = 0.0;
        if self.walking_forward {
            drive += WALK_SPEED;
        }
        if self.walking_backward {
            drive -= WALK_SPEED;
        }
        self.position += self.forward() * drive * dt;
    }

    pub fn start_walking_forward(&mut self) {
        self.walking_forward = true;
    }

    pub fn stop_walking_forward(&mut self) {
        self.walking_forward = false;
    }

    pub fn start_walking_backward(&mut self) {
        self.walking_backward = true;
    }

    pub fn stop_walking_backward(&mut self) {
        self.walking_backward = false;
    }

    pub fn start_turning_left(&mut self) {
        self.turning_left = true;
    }

    pub fn stop_turning_left(&mut self) {
        self.turning_left = false;
    }

    pub fn start_turning_right(&mut self) {
        self.turning_right = true;
    }

    pub fn stop_turning_right(&mut self) {
        self.turning_right = false;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
