//! Error types shared across the Phyre bridge.
//!
//! Organized by subsystem: caller input validation, the external engine
//! collaborators, and process-wide configuration.

use std::error::Error;
use std::fmt;

/// Malformed raw input from the caller.
///
/// Raised before any decoding or simulation work is done.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputError {
    /// The points matrix is not two-dimensional.
    PointsRank {
        /// Number of dimensions the caller passed.
        ndim: usize,
    },
    /// The points matrix's second dimension is not 2 (`x`, `y`).
    PointsWidth {
        /// Size of the second dimension the caller passed.
        width: usize,
    },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PointsRank { ndim } => {
                write!(f, "number of dimensions must be two, got {ndim}")
            }
            Self::PointsWidth { width } => {
                write!(f, "second dimension must have size 2 (x, y), got {width}")
            }
        }
    }
}

impl Error for InputError {}

/// Failures reported by, or detected around, the external engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// The simulator faulted.
    SimulationFailed {
        /// Description of the failure.
        reason: String,
    },
    /// The rasterizer faulted.
    RenderFailed {
        /// Description of the failure.
        reason: String,
    },
    /// The user-input merge algorithm faulted.
    MergeFailed {
        /// Description of the failure.
        reason: String,
    },
    /// The featurizer faulted.
    FeaturizeFailed {
        /// Description of the failure.
        reason: String,
    },
    /// A rendered image does not have `width * height` pixels.
    ImageSizeMismatch {
        /// Pixel count the scene dimensions call for.
        expected: usize,
        /// Pixel count the rasterizer produced.
        actual: usize,
    },
    /// A feature buffer does not match `object_count * feature_size`.
    FeatureSizeMismatch {
        /// Float count the layout calls for.
        expected: usize,
        /// Float count supplied.
        actual: usize,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SimulationFailed { reason } => write!(f, "simulation failed: {reason}"),
            Self::RenderFailed { reason } => write!(f, "render failed: {reason}"),
            Self::MergeFailed { reason } => write!(f, "user input merge failed: {reason}"),
            Self::FeaturizeFailed { reason } => write!(f, "featurize failed: {reason}"),
            Self::ImageSizeMismatch { expected, actual } => {
                write!(f, "rendered image has {actual} pixels, expected {expected}")
            }
            Self::FeatureSizeMismatch { expected, actual } => {
                write!(f, "feature buffer has {actual} floats, expected {expected}")
            }
        }
    }
}

impl Error for EngineError {}

/// Errors detected while validating or installing [`EngineConstants`](crate::EngineConstants).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Frame rate is zero.
    ZeroFps,
    /// Object feature width is zero.
    ZeroFeatureSize,
    /// Step limits are inconsistent.
    StepLimits {
        /// Configured default maximum step count.
        default_max_steps: u32,
        /// Configured steps required for a solution.
        steps_for_solution: u32,
    },
    /// Constants were already installed for this process.
    AlreadyInitialized,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroFps => write!(f, "fps must be positive"),
            Self::ZeroFeatureSize => write!(f, "object_feature_size must be positive"),
            Self::StepLimits {
                default_max_steps,
                steps_for_solution,
            } => write!(
                f,
                "steps_for_solution ({steps_for_solution}) must be positive and not exceed \
                 default_max_steps ({default_max_steps})"
            ),
            Self::AlreadyInitialized => write!(f, "engine constants already initialized"),
        }
    }
}

impl Error for ConfigError {}
