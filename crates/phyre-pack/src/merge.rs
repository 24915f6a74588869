//! Merging user input into a scene.

use phyre_core::{EngineError, InputMerger, Scene, UserInput, UserInputStatus};

/// Merge `input` into `scene` through the external merge algorithm.
///
/// The scene's occlusion status becomes [`UserInputStatus::NoOcclusions`]
/// when the merge reports clean, [`UserInputStatus::HadOcclusions`]
/// otherwise. The user-input body list is replaced unconditionally, even
/// when the merge produced no bodies. Must run before the scene is handed
/// to the simulator.
///
/// A faulting merger leaves `scene` untouched and its error is returned.
pub fn merge_into<M: InputMerger + ?Sized>(
    merger: &M,
    input: &UserInput,
    keep_space_around_bodies: bool,
    allow_occlusions: bool,
    scene: &mut Scene,
) -> Result<(), EngineError> {
    let outcome = merger.merge(
        input,
        &scene.bodies,
        keep_space_around_bodies,
        allow_occlusions,
        scene.height,
        scene.width,
    )?;
    scene.user_input_status = if outcome.clean {
        UserInputStatus::NoOcclusions
    } else {
        UserInputStatus::HadOcclusions
    };
    scene.user_input_bodies = outcome.bodies;
    tracing::debug!(
        clean = outcome.clean,
        bodies = scene.user_input_bodies.len(),
        "merged user input"
    );
    Ok(())
}
