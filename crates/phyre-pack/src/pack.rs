//! The batch pipeline: decode, merge, simulate, pack.

use phyre_codec::decode;
use phyre_core::{constants, Engine, Task, TaskSimulation, UserInput};

use crate::buffer::PackedBuffer;
use crate::count::{count_objects, count_objects_in_scene, had_occlusions};
use crate::error::PackError;
use crate::layout::{BatchLayout, BatchOutput};
use crate::mask::render_object_masks;
use crate::merge::merge_into;
use crate::metrics::{PackTimings, Stopwatch};

/// Parameters of one batch call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackRequest {
    /// Keep a margin between user input and existing bodies during merge.
    pub keep_space_around_bodies: bool,
    /// Simulation steps, passed to the simulator unvalidated.
    pub steps: i32,
    /// Record every `stride`-th frame, passed to the simulator unvalidated.
    pub stride: i32,
    /// Pack one full-scene image per frame.
    pub need_images: bool,
    /// Pack one feature vector per object per frame.
    pub need_featurized_objects: bool,
    /// Pack one mask per object per frame. Only honoured with `need_images`.
    pub need_object_masks: bool,
}

impl Default for PackRequest {
    fn default() -> Self {
        Self {
            keep_space_around_bodies: false,
            steps: i32::try_from(constants().default_max_steps).unwrap_or(i32::MAX),
            stride: 1,
            need_images: false,
            need_featurized_objects: false,
            need_object_masks: false,
        }
    }
}

/// Which output a [`PackedBuffer`] holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Full-scene images.
    Images,
    /// Per-object masks.
    ObjectMasks,
    /// Per-object feature vectors.
    Features,
}

/// Everything a batch call returns.
#[derive(Debug)]
pub struct PackResult {
    /// Whether the simulation solved the task.
    pub is_solved: bool,
    /// Whether merging user input caused occlusions.
    pub had_occlusions: bool,
    /// `image_frames * image_size` palette indices.
    pub images: PackedBuffer<u8>,
    /// `mask_frames * object_count * image_size` palette indices.
    pub object_masks: PackedBuffer<u8>,
    /// Object slots per frame, computed whether or not any per-object
    /// output was requested.
    pub object_count: usize,
    /// `feature_frames * object_count * feature_size` floats.
    pub features: PackedBuffer<f32>,
    /// Wall-clock timing.
    pub timings: PackTimings,
}

impl PackResult {
    /// Attach `hook` to all three buffers. Each buffer runs its own copy
    /// once, when it is dropped.
    pub fn on_release<F>(self, hook: F) -> Self
    where
        F: Fn(BufferKind, usize) + Clone + Send + Sync + 'static,
    {
        let images_hook = hook.clone();
        let masks_hook = hook.clone();
        Self {
            images: self
                .images
                .on_release(move |n| images_hook(BufferKind::Images, n)),
            object_masks: self
                .object_masks
                .on_release(move |n| masks_hook(BufferKind::ObjectMasks, n)),
            features: self
                .features
                .on_release(move |n| hook(BufferKind::Features, n)),
            ..self
        }
    }
}

/// Runs the batch pipeline against an engine.
pub struct BatchPacker<'e, E: Engine + ?Sized> {
    engine: &'e E,
    feature_size: usize,
}

impl<'e, E: Engine + ?Sized> BatchPacker<'e, E> {
    /// Packer for `engine`, using the process-wide feature width.
    pub fn new(engine: &'e E) -> Self {
        Self {
            engine,
            feature_size: constants().object_feature_size,
        }
    }

    /// Override the per-object feature width.
    pub fn with_feature_size(mut self, feature_size: usize) -> Self {
        self.feature_size = feature_size;
        self
    }

    /// Floats packed per object.
    pub fn feature_size(&self) -> usize {
        self.feature_size
    }

    /// Decode `encoded_task`, merge `input` into it, simulate and pack.
    ///
    /// User input is merged with occlusions disallowed.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(steps = request.steps, stride = request.stride)
    )]
    pub fn run(
        &self,
        encoded_task: &[u8],
        input: &UserInput,
        request: &PackRequest,
    ) -> Result<PackResult, PackError> {
        let watch = Stopwatch::start();
        let mut task: Task = decode(encoded_task)?;
        merge_into(
            self.engine,
            input,
            request.keep_space_around_bodies,
            false,
            &mut task.scene,
        )?;
        let simulation = self
            .engine
            .simulate_task(&task, request.steps, request.stride)?;
        let simulation_seconds = watch.elapsed_seconds();

        let output = self.pack(&simulation, request)?;
        let pack_seconds = (watch.elapsed_seconds() - simulation_seconds).max(0.0);
        tracing::debug!(
            frames = simulation.frame_count(),
            objects = output.layout.object_count,
            simulation_seconds,
            pack_seconds,
            "packed batch"
        );

        Ok(PackResult {
            is_solved: simulation.is_solution,
            had_occlusions: had_occlusions(&simulation),
            object_count: output.layout.object_count,
            images: output.images.into(),
            object_masks: output.masks.into(),
            features: output.features.into(),
            timings: PackTimings {
                simulation_seconds,
                pack_seconds,
            },
        })
    }

    /// Pack the frames of a finished simulation.
    ///
    /// The object count is fixed from frame 0. Every frame that fills
    /// per-object slots must hold exactly that many active bodies, or the
    /// call fails with [`PackError::ObjectCountChanged`].
    pub fn pack(
        &self,
        simulation: &TaskSimulation,
        request: &PackRequest,
    ) -> Result<BatchOutput, PackError> {
        let frames = &simulation.scene_list;
        let object_count = count_objects(simulation);
        let image_size = simulation.first_frame().map_or(0, |s| s.image_size());
        let layout = BatchLayout::plan(
            request,
            frames.len(),
            object_count,
            image_size,
            self.feature_size,
        );
        let mut output = BatchOutput::allocate(layout);

        if layout.has_object_slots() {
            for (frame, scene) in frames.iter().enumerate() {
                let found = count_objects_in_scene(scene);
                if found != object_count {
                    return Err(PackError::ObjectCountChanged {
                        frame,
                        expected: object_count,
                        found,
                    });
                }
            }
        }

        for (frame, scene) in frames.iter().enumerate().take(layout.image_frames) {
            self.engine.render_into(scene, output.image_mut(frame))?;
            if frame < layout.mask_frames {
                render_object_masks(self.engine, scene, output.frame_masks_mut(frame))?;
            }
        }

        for (frame, scene) in frames.iter().enumerate().take(layout.feature_frames) {
            self.engine
                .featurize_into(scene, output.frame_features_mut(frame))?;
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phyre_codec::encode;
    use phyre_core::{constants, EngineError};
    use phyre_test_utils::fixtures::{DriftSimulator, FixtureEngine, OverlapMerger};
    use phyre_test_utils::{ball, bar, scene_with, task_with, undefined_body};

    fn two_body_task() -> Vec<u8> {
        let scene = scene_with(32, 24, vec![ball(10.0, 20.0, 4.0), undefined_body()]);
        encode(&task_with(scene)).unwrap()
    }

    fn request(images: bool, features: bool, masks: bool) -> PackRequest {
        PackRequest {
            steps: 10,
            stride: 1,
            need_images: images,
            need_featurized_objects: features,
            need_object_masks: masks,
            ..PackRequest::default()
        }
    }

    #[test]
    fn nothing_requested_returns_empty_buffers() {
        let engine = FixtureEngine::new();
        let result = BatchPacker::new(&engine)
            .run(&two_body_task(), &UserInput::default(), &request(false, false, false))
            .unwrap();
        assert!(result.images.is_empty());
        assert!(result.object_masks.is_empty());
        assert!(result.features.is_empty());
        assert_eq!(result.object_count, 1);
        assert!(!result.is_solved);
        assert!(!result.had_occlusions);
    }

    #[test]
    fn single_active_body_scenario() {
        let engine = FixtureEngine::new();
        let result = BatchPacker::new(&engine)
            .run(&two_body_task(), &UserInput::default(), &request(true, true, false))
            .unwrap();
        let image_size = 32 * 24;
        assert_eq!(result.images.len(), 10 * image_size);
        assert_eq!(result.object_count, 1);
        assert_eq!(result.features.len(), 10 * constants().object_feature_size);
        assert!(result.object_masks.is_empty());
    }

    #[test]
    fn masks_sized_per_object_per_frame() {
        let engine = FixtureEngine::new();
        let scene = scene_with(
            16,
            16,
            vec![ball(4.0, 12.0, 3.0), bar(8.0, 2.0, 12.0, 2.0)],
        );
        let task = encode(&task_with(scene)).unwrap();
        let result = BatchPacker::new(&engine)
            .run(&task, &UserInput::default(), &request(true, false, true))
            .unwrap();
        assert_eq!(result.object_count, 2);
        assert_eq!(result.object_masks.len(), 10 * 2 * 256);
    }

    #[test]
    fn empty_simulation_packs_nothing() {
        let engine = FixtureEngine::new();
        let mut req = request(true, true, true);
        req.steps = 0;
        let result = BatchPacker::new(&engine)
            .run(&two_body_task(), &UserInput::default(), &req)
            .unwrap();
        assert_eq!(result.object_count, 0);
        assert!(result.images.is_empty());
        assert!(!result.had_occlusions);
    }

    #[test]
    fn simulator_fault_propagates() {
        let engine = FixtureEngine::new().with_simulator(DriftSimulator {
            fault: Some("integrator diverged".into()),
            ..DriftSimulator::default()
        });
        let err = BatchPacker::new(&engine)
            .run(&two_body_task(), &UserInput::default(), &request(true, false, false))
            .unwrap_err();
        assert!(matches!(
            err,
            PackError::Engine(EngineError::SimulationFailed { .. })
        ));
    }

    #[test]
    fn merge_fault_stops_the_run() {
        let engine = FixtureEngine::new().with_merger(OverlapMerger {
            fault: Some("merge() raised".into()),
            ..OverlapMerger::default()
        });
        let err = BatchPacker::new(&engine)
            .run(&two_body_task(), &UserInput::default(), &request(true, true, true))
            .unwrap_err();
        assert!(matches!(
            err,
            PackError::Engine(EngineError::MergeFailed { .. })
        ));
    }

    #[test]
    fn corrupt_task_is_a_codec_error() {
        let engine = FixtureEngine::new();
        let mut bytes = two_body_task();
        bytes.truncate(bytes.len() / 2);
        let err = BatchPacker::new(&engine)
            .run(&bytes, &UserInput::default(), &request(true, false, false))
            .unwrap_err();
        assert!(matches!(err, PackError::Codec(_)));
    }

    #[test]
    fn changed_object_count_is_rejected() {
        let engine = FixtureEngine::new();
        let first = scene_with(8, 8, vec![ball(2.0, 2.0, 2.0)]);
        let later = scene_with(8, 8, vec![ball(2.0, 2.0, 2.0), ball(6.0, 6.0, 2.0)]);
        let simulation = TaskSimulation {
            scene_list: vec![first.clone(), first, later],
            ..TaskSimulation::default()
        };
        let err = BatchPacker::new(&engine)
            .pack(&simulation, &request(false, true, false))
            .unwrap_err();
        assert!(matches!(
            err,
            PackError::ObjectCountChanged {
                frame: 2,
                expected: 1,
                found: 2
            }
        ));

        // Image-only packing has no object slots to misalign.
        let output = BatchPacker::new(&engine)
            .pack(&simulation, &request(true, false, false))
            .unwrap();
        assert_eq!(output.images.len(), 3 * 64);
    }
}
