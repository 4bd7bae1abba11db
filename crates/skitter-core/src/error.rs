use thiserror::Error;

use crate::types::ChainKind;

/// Top-level error type for the skitter workspace.
#[derive(Debug, Error)]
pub enum SkitterError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Kinematics error: {0}")]
    Kinematics(#[from] KinematicsError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Kinematics errors.
///
/// The solver taxonomy is deliberately narrow: non-convergence and
/// malformed-length angle input are *not* errors (best-effort contract,
/// lenient truncation). The only hard failures are structural misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KinematicsError {
    #[error("Angle convention mismatch: solver expects {expected:?} chains, got {got:?}")]
    AngleConvention { expected: ChainKind, got: ChainKind },

    #[error("Chain has no segments")]
    EmptyChain,

    #[error("Leg slot {slot} out of range ({count} legs)")]
    LegSlotOutOfRange { slot: usize, count: usize },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
