//! Process-wide engine constants.
//!
//! The frame rate, object feature width and step limits are fixed for the
//! lifetime of the process. They are installed at most once, either
//! explicitly through [`init_constants`] or lazily with the defaults on the
//! first call to [`constants`].

use std::sync::OnceLock;

use crate::error::ConfigError;

static CONSTANTS: OnceLock<EngineConstants> = OnceLock::new();

/// Immutable engine configuration shared by every call in the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConstants {
    /// Simulation frames per second. Default: 60.
    pub fps: u32,
    /// Width of one object's feature vector, in floats. Default: 14.
    pub object_feature_size: usize,
    /// Default upper bound on simulated steps. Default: 1000.
    pub default_max_steps: u32,
    /// Steps the goal condition must hold for a solution. Default: 180.
    pub steps_for_solution: u32,
}

impl Default for EngineConstants {
    fn default() -> Self {
        Self {
            fps: 60,
            object_feature_size: 14,
            default_max_steps: 1000,
            steps_for_solution: 180,
        }
    }
}

impl EngineConstants {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        if self.object_feature_size == 0 {
            return Err(ConfigError::ZeroFeatureSize);
        }
        if self.steps_for_solution == 0 || self.steps_for_solution > self.default_max_steps {
            return Err(ConfigError::StepLimits {
                default_max_steps: self.default_max_steps,
                steps_for_solution: self.steps_for_solution,
            });
        }
        Ok(())
    }
}

/// Install the process-wide constants.
///
/// Must run before anything reads [`constants`]; fails with
/// [`ConfigError::AlreadyInitialized`] once constants are in place.
pub fn init_constants(constants: EngineConstants) -> Result<(), ConfigError> {
    constants.validate()?;
    CONSTANTS
        .set(constants)
        .map_err(|_| ConfigError::AlreadyInitialized)
}

/// The process-wide constants, installing the defaults on first use.
pub fn constants() -> &'static EngineConstants {
    CONSTANTS.get_or_init(EngineConstants::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(EngineConstants::default().validate(), Ok(()));
    }

    #[test]
    fn zero_feature_size_rejected() {
        let c = EngineConstants {
            object_feature_size: 0,
            ..EngineConstants::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::ZeroFeatureSize));
    }

    #[test]
    fn solution_steps_beyond_max_rejected() {
        let c = EngineConstants {
            default_max_steps: 100,
            steps_for_solution: 180,
            ..EngineConstants::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::StepLimits { .. })));
    }

    #[test]
    fn second_install_fails() {
        // Whichever of these runs first wins; the process-wide value is
        // never replaced afterwards.
        let _ = constants();
        assert_eq!(
            init_constants(EngineConstants::default()),
            Err(ConfigError::AlreadyInitialized)
        );
        assert_eq!(*constants(), EngineConstants::default());
    }
}
