//! PyEngine: the external engine collaborators backed by a Python object.
//!
//! The bridge calls the engine with the GIL released; every method here
//! re-acquires it via `Python::attach`, hands the Python object encoded
//! bytes and decodes what comes back. Expected methods:
//!
//! ```text
//! simulate_task(task: bytes, steps: int, stride: int) -> bytes   # TaskSimulation
//! simulate_scene(scene: bytes, steps: int) -> list[bytes]        # Scene per frame
//! render(scene: bytes) -> bytes | Sequence[int]                  # width*height pixels
//! featurize(scene: bytes) -> Sequence[float]                     # objects*features
//! merge(user_input: bytes, scene: bytes, keep_space: bool,
//!       allow_occlusions: bool) -> tuple[bool, list[bytes]]      # (clean, Body list)
//! ```

use phyre_codec::{decode, encode, CodecError, Wire};
use phyre_core::{
    Body, EngineError, Featurizer, Image, InputMerger, MergeOutcome, Rasterizer, Scene, Simulator,
    Task, TaskSimulation, UserInput,
};
use pyo3::prelude::*;
use pyo3::pybacked::PyBackedBytes;
use pyo3::types::PyBytes;

/// A Python object implementing the engine protocol.
pub(crate) struct PyEngine {
    target: Py<PyAny>,
}

impl PyEngine {
    pub(crate) fn new(target: Py<PyAny>) -> Self {
        Self { target }
    }

    pub(crate) fn target(&self) -> &Py<PyAny> {
        &self.target
    }
}

fn encode_arg<T: Wire>(value: &T) -> Result<Vec<u8>, String> {
    encode(value).map_err(|e| e.to_string())
}

fn decode_reply<T: Wire>(method: &str, bytes: &[u8]) -> Result<T, String> {
    decode(bytes).map_err(|e: CodecError| format!("{method}() returned undecodable bytes: {e}"))
}

fn py_failure(method: &str, err: PyErr) -> String {
    tracing::debug!(method, %err, "python engine call raised");
    format!("{method}() raised: {err}")
}

impl Simulator for PyEngine {
    fn simulate_task(
        &self,
        task: &Task,
        steps: i32,
        stride: i32,
    ) -> Result<TaskSimulation, EngineError> {
        let run = || -> Result<TaskSimulation, String> {
            let task = encode_arg(task)?;
            let reply = Python::attach(|py| -> PyResult<PyBackedBytes> {
                let reply = self.target.bind(py).call_method1(
                    "simulate_task",
                    (PyBytes::new(py, &task), steps, stride),
                )?;
                Ok(reply.extract::<PyBackedBytes>()?)
            })
            .map_err(|e| py_failure("simulate_task", e))?;
            decode_reply("simulate_task", &reply)
        };
        run().map_err(|reason| EngineError::SimulationFailed { reason })
    }

    fn simulate_scene(&self, scene: &Scene, steps: i32) -> Result<Vec<Scene>, EngineError> {
        let run = || -> Result<Vec<Scene>, String> {
            let scene = encode_arg(scene)?;
            let replies = Python::attach(|py| -> PyResult<Vec<PyBackedBytes>> {
                let reply = self
                    .target
                    .bind(py)
                    .call_method1("simulate_scene", (PyBytes::new(py, &scene), steps))?;
                Ok(reply.extract::<Vec<PyBackedBytes>>()?)
            })
            .map_err(|e| py_failure("simulate_scene", e))?;
            replies
                .iter()
                .map(|frame| decode_reply("simulate_scene", frame))
                .collect()
        };
        run().map_err(|reason| EngineError::SimulationFailed { reason })
    }
}

impl Rasterizer for PyEngine {
    fn render(&self, scene: &Scene) -> Result<Image, EngineError> {
        let values = encode_arg(scene)
            .and_then(|bytes| {
                Python::attach(|py| -> PyResult<Vec<u8>> {
                    let reply = self
                        .target
                        .bind(py)
                        .call_method1("render", (PyBytes::new(py, &bytes),))?;
                    match reply.extract::<PyBackedBytes>() {
                        Ok(raw) => Ok(raw.to_vec()),
                        Err(_) => Ok(reply.extract::<Vec<u8>>()?),
                    }
                })
                .map_err(|e| py_failure("render", e))
            })
            .map_err(|reason| EngineError::RenderFailed { reason })?;
        Ok(Image {
            width: scene.width,
            height: scene.height,
            values,
        })
    }
}

impl Featurizer for PyEngine {
    fn featurize_into(&self, scene: &Scene, out: &mut [f32]) -> Result<(), EngineError> {
        let features = encode_arg(scene)
            .and_then(|bytes| {
                Python::attach(|py| -> PyResult<Vec<f32>> {
                    let reply = self
                        .target
                        .bind(py)
                        .call_method1("featurize", (PyBytes::new(py, &bytes),))?;
                    Ok(reply.extract::<Vec<f32>>()?)
                })
                .map_err(|e| py_failure("featurize", e))
            })
            .map_err(|reason| EngineError::FeaturizeFailed { reason })?;
        if features.len() != out.len() {
            return Err(EngineError::FeatureSizeMismatch {
                expected: out.len(),
                actual: features.len(),
            });
        }
        out.copy_from_slice(&features);
        Ok(())
    }
}

impl InputMerger for PyEngine {
    fn merge(
        &self,
        input: &UserInput,
        bodies: &[Body],
        keep_space_around_bodies: bool,
        allow_occlusions: bool,
        height: u32,
        width: u32,
    ) -> Result<MergeOutcome, EngineError> {
        let scene = Scene {
            bodies: bodies.to_vec(),
            ..Scene::new(width, height)
        };
        let run = || -> Result<MergeOutcome, String> {
            let input = encode_arg(input)?;
            let scene = encode_arg(&scene)?;
            let (clean, replies) = Python::attach(|py| -> PyResult<(bool, Vec<PyBackedBytes>)> {
                let reply = self.target.bind(py).call_method1(
                    "merge",
                    (
                        PyBytes::new(py, &input),
                        PyBytes::new(py, &scene),
                        keep_space_around_bodies,
                        allow_occlusions,
                    ),
                )?;
                Ok(reply.extract::<(bool, Vec<PyBackedBytes>)>()?)
            })
            .map_err(|e| py_failure("merge", e))?;
            let bodies = replies
                .iter()
                .map(|body| decode_reply::<Body>("merge", body))
                .collect::<Result<_, _>>()?;
            Ok(MergeOutcome { clean, bodies })
        };
        run().map_err(|reason| EngineError::MergeFailed { reason })
    }
}
