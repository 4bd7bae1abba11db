//! Idle-gait phase oscillators.
//!
//! Simple sinusoidal oscillators that drive the resting animation: a small
//! yaw sway on each leg's root and slow per-joint angle drift. These feed
//! target heights and root transforms only — they are not an animation
//! blending system.

/// One joint's oscillator: `base + amplitude · sin(t·frequency + phase)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointOscillator {
    pub base_deg: f32,
    pub amplitude_deg: f32,
    pub frequency: f32,
    pub phase: f32,
}

impl JointOscillator {
    pub fn sample(&self, t: f32) -> f32 {
        self.base_deg + self.amplitude_deg * (t * self.frequency + self.phase).sin()
    }
}

/// Per-joint oscillator bank plus the root sway, tuned to the reference
/// seven-joint leg.
#[derive(Debug, Clone, PartialEq)]
pub struct IdleGait {
    joints: Vec<JointOscillator>,
    sway_amplitude_deg: f32,
    sway_frequency: f32,
}

impl IdleGait {
    pub fn new(joints: Vec<JointOscillator>) -> Self {
        Self {
            joints,
            sway_amplitude_deg: 5.0,
            sway_frequency: 0.5,
        }
    }

    /// Sampled joint angles (degrees) at time `t`.
    pub fn sample(&self, t: f32) -> Vec<f32> {
        self.joints.iter().map(|j| j.sample(t)).collect()
    }

    /// Root yaw sway at time `t`; opposite-phase legs pass `-t`.
    pub fn sway(&self, t: f32) -> f32 {
        self.sway_amplitude_deg * (t * self.sway_frequency).sin()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }
}

impl Default for IdleGait {
    fn default() -> Self {
        // Reference rest pose and drift per joint, root to tip.
        let table: [(f32, f32, f32, f32); 7] = [
            (20.0, 10.0, 0.3, 0.0),
            (15.0, 8.0, 0.4, 0.5),
            (-10.0, 15.0, 0.35, 1.0),
            (-35.0, 12.0, 0.45, 1.5),
            (-20.0, 10.0, 0.5, 2.0),
            (-30.0, 8.0, 0.3, 2.5),
            (-10.0, 5.0, 0.25, 3.0),
        ];
        Self::new(
            table.iter()
                .map(|&(base_deg, amplitude_deg, frequency, phase)| JointOscillator {
                    base_deg,
                    amplitude_deg,
                    frequency,
                    phase,
                })
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sample_at_zero_phase_is_base_plus_phase_term() {
        let osc = JointOscillator {
            base_deg: 20.0,
            amplitude_deg: 10.0,
            frequency: 0.3,
            phase: 0.0,
        };
        assert_relative_eq!(osc.sample(0.0), 20.0, epsilon = 1e-6);
    }

    #[test]
    fn sample_stays_within_amplitude_band() {
        let gait = IdleGait::default();
        for step in 0..200 {
            let t = step as f32 * 0.1;
            for (angle, osc) in gait.sample(t).iter().zip(&gait.joints) {
                assert!((angle - osc.base_deg).abs() <= osc.amplitude_deg + 1e-5);
            }
        }
    }

    #[test]
    fn default_gait_matches_reference_rest_pose() {
        let gait = IdleGait::default();
        assert_eq!(gait.joint_count(), 7);
        // At t=0 joints with zero phase sit exactly at their base angle.
        let angles = gait.sample(0.0);
        assert_relative_eq!(angles[0], 20.0, epsilon = 1e-6);
    }

    #[test]
    fn sway_is_bounded_and_odd() {
        let gait = IdleGait::default();
        assert_relative_eq!(gait.sway(0.0), 0.0, epsilon = 1e-6);
        for step in 0..100 {
            let t = step as f32 * 0.17;
            assert!(gait.sway(t).abs() <= 5.0 + 1e-5);
            assert_relative_eq!(gait.sway(-t), -gait.sway(t), epsilon = 1e-5);
        }
    }
}
