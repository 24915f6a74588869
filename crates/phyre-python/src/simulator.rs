//! Simulator: the Python-facing bridge over a Python engine object.
//!
//! Every method releases the GIL via `py.detach()` while the bridge runs;
//! the engine re-acquires it for each callback. Packed outputs become
//! 1-D numpy arrays that take ownership of the Rust buffers, so each
//! buffer is freed exactly once, when numpy drops its last reference.

use ndarray::{ArrayD, IxDyn};
use numpy::{AllowTypeChange, PyArray1, PyArrayLikeDyn};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use phyre_pack::{EngineBridge, PackRequest, PackResult, PackedBuffer};

use crate::engine::PyEngine;
use crate::error::to_py_err;

/// `(is_solved, had_occlusions, images, object_masks, object_count,
/// features, object_count, simulation_seconds, pack_seconds)`.
type PackTuple<'py> = (
    bool,
    bool,
    Bound<'py, PyArray1<u8>>,
    Bound<'py, PyArray1<u8>>,
    usize,
    Bound<'py, PyArray1<f32>>,
    usize,
    f64,
    f64,
);

/// Copy an integer array-like into an owned `int32` matrix of the same
/// shape.
///
/// Other dtypes are cast as `numpy.asarray(points, dtype=numpy.int32)`
/// casts them. Rank and width are checked later by the bridge, so shape
/// mistakes surface as `ValueError` with the usual hint.
fn owned_points<'py>(points: &Bound<'py, PyAny>) -> PyResult<ArrayD<i32>> {
    let points: PyArrayLikeDyn<'py, i32, AllowTypeChange> = points.extract().map_err(|err| {
        PyValueError::new_err(format!(
            "phyre error: `points` cannot be converted to an int32 array: {err}"
        ))
    })?;
    let view = points.as_array();
    let shape = view.shape().to_vec();
    let data: Vec<i32> = view.iter().copied().collect();
    ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Take the storage numpy will own.
///
/// Buffers built by the bridge carry no release hook; numpy's refcount
/// is the only release path once the storage is handed over.
fn storage_for_numpy<T>(buffer: PackedBuffer<T>) -> Vec<T> {
    let (data, hook) = buffer.into_parts();
    debug_assert!(
        hook.is_none(),
        "release hook would be lost when handing a buffer to numpy"
    );
    data
}

fn into_tuple(py: Python<'_>, result: PackResult) -> PackTuple<'_> {
    (
        result.is_solved,
        result.had_occlusions,
        PyArray1::from_vec(py, storage_for_numpy(result.images)),
        PyArray1::from_vec(py, storage_for_numpy(result.object_masks)),
        result.object_count,
        PyArray1::from_vec(py, storage_for_numpy(result.features)),
        result.object_count,
        result.timings.simulation_seconds,
        result.timings.pack_seconds,
    )
}

/// Task simulation and batch packing over a Python engine.
///
/// The engine must provide `simulate_task`, `simulate_scene`, `render`,
/// `featurize` and `merge`; all structured values cross as encoded bytes.
#[pyclass(frozen)]
pub(crate) struct Simulator {
    bridge: EngineBridge<PyEngine>,
}

#[pymethods]
impl Simulator {
    /// Wrap a Python engine object.
    #[new]
    fn new(engine: Py<PyAny>) -> Self {
        Simulator {
            bridge: EngineBridge::new(PyEngine::new(engine)),
        }
    }

    /// The wrapped engine object.
    #[getter]
    fn engine(&self, py: Python<'_>) -> Py<PyAny> {
        self.bridge.engine().target().clone_ref(py)
    }

    /// Get per-frame results of scene simulation.
    fn simulate_scene<'py>(
        &self,
        py: Python<'py>,
        scene: &[u8],
        steps: i32,
    ) -> PyResult<Vec<Bound<'py, PyBytes>>> {
        let frames = py
            .detach(|| self.bridge.simulate_scene(scene, steps))
            .map_err(to_py_err)?;
        Ok(frames.iter().map(|f| PyBytes::new(py, f)).collect())
    }

    /// Convert user input to user_input_bodies in the scene.
    fn add_user_input_to_scene<'py>(
        &self,
        py: Python<'py>,
        scene: &[u8],
        user_input: &[u8],
        keep_space_around_bodies: bool,
        allow_occlusions: bool,
    ) -> PyResult<Bound<'py, PyBytes>> {
        let merged = py
            .detach(|| {
                self.bridge.add_user_input_to_scene(
                    scene,
                    user_input,
                    keep_space_around_bodies,
                    allow_occlusions,
                )
            })
            .map_err(to_py_err)?;
        Ok(PyBytes::new(py, &merged))
    }

    /// Check whether the input points, rectangles and balls occlude scene
    /// objects.
    ///
    /// Raises:
    ///     ValueError: If `points` is not an integer array of shape (N, 2).
    fn check_for_occlusions<'py>(
        &self,
        py: Python<'py>,
        task: &[u8],
        points: &Bound<'py, PyAny>,
        rectangulars_vertices_flatten: Vec<f32>,
        balls_flatten: Vec<f32>,
        keep_space_around_bodies: bool,
    ) -> PyResult<bool> {
        let points = owned_points(points)?;
        py.detach(|| {
            self.bridge.check_for_occlusions(
                task,
                points.view(),
                &rectangulars_vertices_flatten,
                &balls_flatten,
                keep_space_around_bodies,
            )
        })
        .map_err(to_py_err)
    }

    /// Check whether encoded user input occludes scene objects.
    fn check_for_occlusions_general(
        &self,
        py: Python<'_>,
        task: &[u8],
        user_input: &[u8],
        keep_space_around_bodies: bool,
    ) -> PyResult<bool> {
        py.detach(|| {
            self.bridge
                .check_for_occlusions_general(task, user_input, keep_space_around_bodies)
        })
        .map_err(to_py_err)
    }

    /// Produce an encoded TaskSimulation.
    fn simulate_task<'py>(
        &self,
        py: Python<'py>,
        task: &[u8],
        steps: i32,
        stride: i32,
    ) -> PyResult<Bound<'py, PyBytes>> {
        let simulation = py
            .detach(|| self.bridge.simulate_task(task, steps, stride))
            .map_err(to_py_err)?;
        Ok(PyBytes::new(py, &simulation))
    }

    /// Simulate a task with raw user input and pack the requested outputs.
    ///
    /// Returns `(is_solved, had_occlusions, images, object_masks,
    /// object_count, features, object_count, simulation_seconds,
    /// pack_seconds)` with flat numpy buffers.
    #[pyo3(signature = (
        task, points, rectangulars_vertices_flatten, balls_flatten,
        keep_space_around_bodies, steps, stride, need_images,
        need_featurized_objects, need_object_masks=false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn magic_ponies<'py>(
        &self,
        py: Python<'py>,
        task: &[u8],
        points: &Bound<'py, PyAny>,
        rectangulars_vertices_flatten: Vec<f32>,
        balls_flatten: Vec<f32>,
        keep_space_around_bodies: bool,
        steps: i32,
        stride: i32,
        need_images: bool,
        need_featurized_objects: bool,
        need_object_masks: bool,
    ) -> PyResult<PackTuple<'py>> {
        let points = owned_points(points)?;
        let request = PackRequest {
            keep_space_around_bodies,
            steps,
            stride,
            need_images,
            need_featurized_objects,
            need_object_masks,
        };
        let result = py
            .detach(|| {
                self.bridge.magic_ponies(
                    task,
                    points.view(),
                    &rectangulars_vertices_flatten,
                    &balls_flatten,
                    &request,
                )
            })
            .map_err(to_py_err)?;
        Ok(into_tuple(py, result))
    }

    /// Simulate a task with encoded user input and pack the requested
    /// outputs. Returns the same tuple as `magic_ponies`.
    #[pyo3(signature = (
        task, user_input, keep_space_around_bodies, steps, stride,
        need_images, need_featurized_objects, need_object_masks=false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn magic_ponies_general<'py>(
        &self,
        py: Python<'py>,
        task: &[u8],
        user_input: &[u8],
        keep_space_around_bodies: bool,
        steps: i32,
        stride: i32,
        need_images: bool,
        need_featurized_objects: bool,
        need_object_masks: bool,
    ) -> PyResult<PackTuple<'py>> {
        let request = PackRequest {
            keep_space_around_bodies,
            steps,
            stride,
            need_images,
            need_featurized_objects,
            need_object_masks,
        };
        let result = py
            .detach(|| self.bridge.magic_ponies_general(task, user_input, &request))
            .map_err(to_py_err)?;
        Ok(into_tuple(py, result))
    }

    /// Render an encoded scene into `width * height` palette indices.
    fn render<'py>(&self, py: Python<'py>, scene: &[u8]) -> PyResult<Bound<'py, PyArray1<u8>>> {
        let pixels = py
            .detach(|| self.bridge.render(scene))
            .map_err(to_py_err)?;
        Ok(PyArray1::from_vec(py, pixels))
    }

    /// Convert an encoded scene into a flat matrix of object feature
    /// vectors.
    fn featurize_scene<'py>(
        &self,
        py: Python<'py>,
        scene: &[u8],
    ) -> PyResult<Bound<'py, PyArray1<f32>>> {
        let features = py
            .detach(|| self.bridge.featurize_scene(scene))
            .map_err(to_py_err)?;
        Ok(PyArray1::from_vec(py, features))
    }
}
