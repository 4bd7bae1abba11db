//! TOML-backed configuration for the kinematics core.
//!
//! Every empirical constant of the solvers and the attachment filter lives
//! here rather than being hardcoded: iteration budgets, tolerances, joint
//! clamps, reach, and the filtering fractions. Defaults reproduce the
//! reference spider.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::JointLimit;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_leg_pairs() -> usize {
    4
}
const fn default_segments_per_leg() -> usize {
    7
}
const fn default_segment_length() -> f32 {
    0.6
}
const fn default_front_thickness() -> f32 {
    1.3
}
const fn default_rear_thickness() -> f32 {
    1.5
}
const fn default_start_position() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}
const fn default_max_iterations() -> u32 {
    10
}
const fn default_tolerance() -> f32 {
    0.01
}
const fn default_limit() -> [f32; 2] {
    [-90.0, 90.0]
}
const fn default_reach() -> f32 {
    3.0
}
fn default_planar_limits() -> Vec<[f32; 2]> {
    // One biologically plausible bend range per joint, root to tip.
    vec![
        [30.0, 90.0],
        [-15.0, 15.0],
        [-40.0, 40.0],
        [-30.0, 40.0],
        [-30.0, 0.0],
        [-30.0, 0.0],
        [-30.0, 0.0],
    ]
}
const fn default_pairs_per_side() -> usize {
    4
}
const fn default_inward_fraction() -> f32 {
    0.85
}
const fn default_z_exclude_fraction() -> f32 {
    0.10
}
const fn default_fallback_x_offset() -> f32 {
    1.2
}

// ---------------------------------------------------------------------------
// BodyConfig
// ---------------------------------------------------------------------------

/// Body and leg proportions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    /// Number of left/right leg pairs (default: 4, i.e. 8 legs).
    #[serde(default = "default_leg_pairs")]
    pub leg_pairs: usize,

    /// Segments (= joints) per leg (default: 7).
    #[serde(default = "default_segments_per_leg")]
    pub segments_per_leg: usize,

    /// Length of every leg segment in world units (default: 0.6).
    #[serde(default = "default_segment_length")]
    pub segment_length: f32,

    /// Thickness scale for the front two leg pairs (default: 1.3).
    #[serde(default = "default_front_thickness")]
    pub front_thickness: f32,

    /// Thickness scale for the rear leg pairs (default: 1.5).
    #[serde(default = "default_rear_thickness")]
    pub rear_thickness: f32,

    /// Body start position [x, y, z] (default: [0, 1, 0]).
    #[serde(default = "default_start_position")]
    pub start_position: [f32; 3],

    /// Extra clearance added to the per-tick ground target height
    /// (default: 0, feet aim for world y = 0).
    #[serde(default)]
    pub ground_clearance: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            leg_pairs: default_leg_pairs(),
            segments_per_leg: default_segments_per_leg(),
            segment_length: default_segment_length(),
            front_thickness: default_front_thickness(),
            rear_thickness: default_rear_thickness(),
            start_position: default_start_position(),
            ground_clearance: 0.0,
        }
    }
}

impl BodyConfig {
    /// Total leg count (both sides).
    pub const fn leg_count(&self) -> usize {
        self.leg_pairs * 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.leg_pairs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "body.leg_pairs".into(),
                message: "must be > 0".into(),
            });
        }
        if self.segments_per_leg == 0 {
            return Err(ConfigError::InvalidValue {
                field: "body.segments_per_leg".into(),
                message: "must be > 0".into(),
            });
        }
        if self.segment_length <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "body.segment_length".into(),
                message: format!("{} (must be > 0)", self.segment_length),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SolverConfig
// ---------------------------------------------------------------------------

/// Budget and clamp for the general 3D CCD solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Maximum CCD sweeps per solve (default: 10).
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Tip-to-target distance below which the solve stops (default: 0.01).
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,

    /// Clamp applied to joints with no caller-supplied limit, degrees
    /// (default: [-90, 90]).
    #[serde(default = "default_limit")]
    pub default_limit_deg: [f32; 2],
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            default_limit_deg: default_limit(),
        }
    }
}

impl SolverConfig {
    pub fn default_limit(&self) -> JointLimit {
        JointLimit::from(self.default_limit_deg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                field: "solver.max_iterations".into(),
                message: "must be > 0".into(),
            });
        }
        if self.tolerance <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "solver.tolerance".into(),
                message: format!("{} (must be > 0)", self.tolerance),
            });
        }
        if self.default_limit_deg[0] > self.default_limit_deg[1] {
            return Err(ConfigError::InvalidValue {
                field: "solver.default_limit_deg".into(),
                message: "min exceeds max".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PlanarLimitsConfig
// ---------------------------------------------------------------------------

/// Budget, reach, and per-joint clamps for the planar batch solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarLimitsConfig {
    /// Maximum CCD sweeps per chain per tick (default: 10).
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Planar tip-to-target distance tolerance (default: 0.01).
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,

    /// Fixed horizontal reach of the planar target, world units
    /// (default: 3.0).
    #[serde(default = "default_reach")]
    pub reach: f32,

    /// Per-joint [min, max] bend limits in degrees, root to tip. Chains
    /// longer than this list reuse the last entry for trailing joints.
    #[serde(default = "default_planar_limits")]
    pub joint_limits_deg: Vec<[f32; 2]>,
}

impl Default for PlanarLimitsConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            reach: default_reach(),
            joint_limits_deg: default_planar_limits(),
        }
    }
}

impl PlanarLimitsConfig {
    /// Materialize the limit table for a chain of `n` joints.
    ///
    /// Missing trailing entries repeat the last configured pair; an empty
    /// table falls back to the symmetric default.
    pub fn limits_for(&self, n: usize) -> Vec<JointLimit> {
        (0..n)
            .map(|i| {
                self.joint_limits_deg
                    .get(i)
                    .or_else(|| self.joint_limits_deg.last())
                    .map_or_else(JointLimit::default, |&pair| JointLimit::from(pair))
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                field: "planar.max_iterations".into(),
                message: "must be > 0".into(),
            });
        }
        if self.tolerance <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "planar.tolerance".into(),
                message: format!("{} (must be > 0)", self.tolerance),
            });
        }
        if self.reach <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "planar.reach".into(),
                message: format!("{} (must be > 0)", self.reach),
            });
        }
        for (i, pair) in self.joint_limits_deg.iter().enumerate() {
            if pair[0] > pair[1] {
                return Err(ConfigError::InvalidValue {
                    field: format!("planar.joint_limits_deg[{i}]"),
                    message: "min exceeds max".into(),
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AttachConfig
// ---------------------------------------------------------------------------

/// Attachment-point filtering policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachConfig {
    /// Attachment points sampled per body side (default: 4).
    #[serde(default = "default_pairs_per_side")]
    pub pairs_per_side: usize,

    /// Fraction of the extreme X value a vertex must exceed to count as a
    /// side candidate (default: 0.85, i.e. 15% inward).
    #[serde(default = "default_inward_fraction")]
    pub inward_fraction: f32,

    /// Fraction of the Z extent excluded at the front and back
    /// (default: 0.10).
    #[serde(default = "default_z_exclude_fraction")]
    pub z_exclude_fraction: f32,

    /// |X| offset of synthesized fallback points when a side has no
    /// candidate vertices (default: 1.2).
    #[serde(default = "default_fallback_x_offset")]
    pub fallback_x_offset: f32,
}

impl Default for AttachConfig {
    fn default() -> Self {
        Self {
            pairs_per_side: default_pairs_per_side(),
            inward_fraction: default_inward_fraction(),
            z_exclude_fraction: default_z_exclude_fraction(),
            fallback_x_offset: default_fallback_x_offset(),
        }
    }
}

impl AttachConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pairs_per_side == 0 {
            return Err(ConfigError::InvalidValue {
                field: "attach.pairs_per_side".into(),
                message: "must be > 0".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.inward_fraction) {
            return Err(ConfigError::InvalidValue {
                field: "attach.inward_fraction".into(),
                message: format!("{} (must be in [0, 1])", self.inward_fraction),
            });
        }
        if !(0.0..0.5).contains(&self.z_exclude_fraction) {
            return Err(ConfigError::InvalidValue {
                field: "attach.z_exclude_fraction".into(),
                message: format!("{} (must be in [0, 0.5))", self.z_exclude_fraction),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SkitterConfig
// ---------------------------------------------------------------------------

/// Complete workspace configuration loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkitterConfig {
    #[serde(default)]
    pub body: BodyConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub planar: PlanarLimitsConfig,
    #[serde(default)]
    pub attach: AttachConfig,
}

impl SkitterConfig {
    /// Validate all sections. Returns Err on the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.body.validate()?;
        self.solver.validate()?;
        self.planar.validate()?;
        self.attach.validate()?;

        // Legs index attachment points positionally by slot, so the
        // provider must yield exactly one point per leg.
        if self.attach.pairs_per_side != self.body.leg_pairs {
            return Err(ConfigError::InvalidValue {
                field: "attach.pairs_per_side".into(),
                message: format!(
                    "{} (must equal body.leg_pairs = {})",
                    self.attach.pairs_per_side, self.body.leg_pairs
                ),
            });
        }
        Ok(())
    }

    /// Parse and validate from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
