//! Host-facing operations on encoded bytes and raw arrays.

use ndarray::ArrayViewD;
use phyre_codec::{decode, encode};
use phyre_core::{constants, Engine, Scene, Task, UserInput, UserInputStatus};

use crate::count::count_objects_in_scene;
use crate::error::PackError;
use crate::merge::merge_into;
use crate::pack::{BatchPacker, PackRequest, PackResult};
use crate::user_input::build_user_input;

/// Every operation the host runtime calls, backed by one engine.
///
/// Structured arguments and results cross this boundary encoded with
/// [`phyre_codec`]; geometry arrives as raw arrays. Each call is
/// self-contained and allocates fresh outputs.
#[derive(Clone, Debug)]
pub struct EngineBridge<E> {
    engine: E,
    feature_size: usize,
}

impl<E: Engine> EngineBridge<E> {
    /// Bridge over `engine`, using the process-wide feature width.
    pub fn new(engine: E) -> Self {
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

    /// The wrapped engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Per-object feature width.
    pub fn feature_size(&self) -> usize {
        self.feature_size
    }

    /// A batch packer borrowing this bridge's engine.
    pub fn packer(&self) -> BatchPacker<'_, E> {
        BatchPacker::new(&self.engine).with_feature_size(self.feature_size)
    }

    /// Simulate a bare scene, returning one encoded scene per frame.
    pub fn simulate_scene(&self, scene: &[u8], steps: i32) -> Result<Vec<Vec<u8>>, PackError> {
        let scene: Scene = decode(scene)?;
        let frames = self.engine.simulate_scene(&scene, steps)?;
        frames
            .iter()
            .map(|frame| encode(frame).map_err(PackError::from))
            .collect()
    }

    /// Merge encoded user input into an encoded scene.
    pub fn add_user_input_to_scene(
        &self,
        scene: &[u8],
        user_input: &[u8],
        keep_space_around_bodies: bool,
        allow_occlusions: bool,
    ) -> Result<Vec<u8>, PackError> {
        let mut scene: Scene = decode(scene)?;
        let input: UserInput = decode(user_input)?;
        merge_into(
            &self.engine,
            &input,
            keep_space_around_bodies,
            allow_occlusions,
            &mut scene,
        )?;
        Ok(encode(&scene)?)
    }

    /// Whether raw user input would occlude the task's bodies.
    ///
    /// The points matrix is validated before the task is decoded.
    pub fn check_for_occlusions(
        &self,
        task: &[u8],
        points: ArrayViewD<'_, i32>,
        rect_vertices_flat: &[f32],
        balls_flat: &[f32],
        keep_space_around_bodies: bool,
    ) -> Result<bool, PackError> {
        let input = build_user_input(points, rect_vertices_flat, balls_flat)?;
        self.occludes(task, &input, keep_space_around_bodies)
    }

    /// Whether encoded user input would occlude the task's bodies.
    pub fn check_for_occlusions_general(
        &self,
        task: &[u8],
        user_input: &[u8],
        keep_space_around_bodies: bool,
    ) -> Result<bool, PackError> {
        let input: UserInput = decode(user_input)?;
        self.occludes(task, &input, keep_space_around_bodies)
    }

    fn occludes(
        &self,
        task: &[u8],
        input: &UserInput,
        keep_space_around_bodies: bool,
    ) -> Result<bool, PackError> {
        let mut task: Task = decode(task)?;
        merge_into(
            &self.engine,
            input,
            keep_space_around_bodies,
            false,
            &mut task.scene,
        )?;
        Ok(task.scene.user_input_status == UserInputStatus::HadOcclusions)
    }

    /// Simulate an encoded task, returning the encoded simulation.
    pub fn simulate_task(&self, task: &[u8], steps: i32, stride: i32) -> Result<Vec<u8>, PackError> {
        let task: Task = decode(task)?;
        let simulation = self.engine.simulate_task(&task, steps, stride)?;
        Ok(encode(&simulation)?)
    }

    /// Run the batch pipeline on raw user input.
    ///
    /// The points matrix is validated before the task is decoded.
    pub fn magic_ponies(
        &self,
        task: &[u8],
        points: ArrayViewD<'_, i32>,
        rect_vertices_flat: &[f32],
        balls_flat: &[f32],
        request: &PackRequest,
    ) -> Result<PackResult, PackError> {
        let input = build_user_input(points, rect_vertices_flat, balls_flat)?;
        self.packer().run(task, &input, request)
    }

    /// Run the batch pipeline on encoded user input.
    pub fn magic_ponies_general(
        &self,
        task: &[u8],
        user_input: &[u8],
        request: &PackRequest,
    ) -> Result<PackResult, PackError> {
        let input: UserInput = decode(user_input)?;
        self.packer().run(task, &input, request)
    }

    /// Render an encoded scene into `width * height` palette indices.
    pub fn render(&self, scene: &[u8]) -> Result<Vec<u8>, PackError> {
        let scene: Scene = decode(scene)?;
        let mut pixels = vec![0; scene.image_size()];
        self.engine.render_into(&scene, &mut pixels)?;
        Ok(pixels)
    }

    /// Featurize an encoded scene into `object count * feature_size` floats.
    pub fn featurize_scene(&self, scene: &[u8]) -> Result<Vec<f32>, PackError> {
        let scene: Scene = decode(scene)?;
        let mut features = vec![0.0; count_objects_in_scene(&scene) * self.feature_size];
        self.engine.featurize_into(&scene, &mut features)?;
        Ok(features)
    }
}
