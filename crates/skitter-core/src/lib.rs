// skitter-core: Types, config, and errors for the skitter spider kinematics workspace.

pub mod config;
pub mod error;
pub mod types;

pub mod prelude {
    pub use crate::config::{
        AttachConfig, BodyConfig, PlanarLimitsConfig, SkitterConfig, SolverConfig,
    };
    pub use crate::error::{ConfigError, KinematicsError, SkitterError};
    pub use crate::types::{ChainKind, JointLimit, Side};
}
