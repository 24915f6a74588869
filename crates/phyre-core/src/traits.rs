//! Traits describing the engine's external collaborators.
//!
//! The physics integrator, the rasterizer, the object featurizer and the
//! user-input merge algorithm live outside this workspace. The bridge only
//! talks to them through these traits, so any engine (native, scripted or
//! a test fixture) can be plugged in.

use crate::error::EngineError;
use crate::scene::{Body, Image, Scene};
use crate::task::{Task, TaskSimulation, UserInput};

/// Runs the physics integrator.
pub trait Simulator {
    /// Simulate `task` for up to `steps` steps, recording every
    /// `stride`-th frame.
    fn simulate_task(
        &self,
        task: &Task,
        steps: i32,
        stride: i32,
    ) -> Result<TaskSimulation, EngineError>;

    /// Simulate a bare scene for `steps` steps, returning every frame.
    fn simulate_scene(&self, scene: &Scene, steps: i32) -> Result<Vec<Scene>, EngineError>;
}

/// Rasterizes scenes into palette-indexed images.
pub trait Rasterizer {
    /// Render `scene` into a freshly allocated image.
    fn render(&self, scene: &Scene) -> Result<Image, EngineError>;

    /// Render `scene` into `out`, which must hold exactly
    /// `scene.image_size()` pixels.
    ///
    /// Fails with [`EngineError::ImageSizeMismatch`] when the rendered
    /// image does not fill `out` exactly.
    fn render_into(&self, scene: &Scene, out: &mut [u8]) -> Result<(), EngineError> {
        let image = self.render(scene)?;
        if image.values.len() != out.len() {
            return Err(EngineError::ImageSizeMismatch {
                expected: out.len(),
                actual: image.values.len(),
            });
        }
        out.copy_from_slice(&image.values);
        Ok(())
    }
}

/// Converts the active bodies of a scene into fixed-width feature vectors.
pub trait Featurizer {
    /// Write one feature vector per active body of `scene`, in
    /// [`Scene::active_bodies`] order, into `out`.
    ///
    /// `out` holds exactly `active body count * object_feature_size` floats.
    fn featurize_into(&self, scene: &Scene, out: &mut [f32]) -> Result<(), EngineError>;
}

/// Result of the external user-input merge algorithm.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeOutcome {
    /// `true` when no input geometry conflicted with the scene.
    pub clean: bool,
    /// Bodies derived from the input.
    pub bodies: Vec<Body>,
}

/// Places user input into a scene and resolves occlusions.
pub trait InputMerger {
    /// Convert `input` into bodies placed among `bodies` in a
    /// `width` x `height` scene.
    ///
    /// An occluded placement is a normal outcome (`clean == false`); only
    /// a fault in the merge algorithm itself is an error.
    fn merge(
        &self,
        input: &UserInput,
        bodies: &[Body],
        keep_space_around_bodies: bool,
        allow_occlusions: bool,
        height: u32,
        width: u32,
    ) -> Result<MergeOutcome, EngineError>;
}

/// A complete engine: every collaborator the bridge needs.
///
/// Blanket-implemented for any type providing all four traits. The
/// `Send + Sync` bound lets one engine serve a pool of batch workers.
pub trait Engine: Simulator + Rasterizer + Featurizer + InputMerger + Send + Sync {}

impl<T> Engine for T where T: Simulator + Rasterizer + Featurizer + InputMerger + Send + Sync {}
