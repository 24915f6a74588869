//! PackError -> Python exception mapping with recovery hints.

use phyre_codec::CodecError;
use phyre_core::EngineError;
use phyre_pack::PackError;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::PyErr;

/// Which Python exception a failure raises.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    /// Caller passed bad data.
    Value,
    /// The engine or pipeline faulted.
    Runtime,
}

/// Convert a bridge error into a typed Python exception carrying a hint.
pub(crate) fn to_py_err(err: PackError) -> PyErr {
    let (kind, hint) = error_detail(&err);
    let full = format!("phyre error: {err}\n  Hint: {hint}");
    match kind {
        Kind::Value => PyValueError::new_err(full),
        Kind::Runtime => PyRuntimeError::new_err(full),
    }
}

/// Returns `(exception kind, recovery hint)` for each failure.
fn error_detail(err: &PackError) -> (Kind, &'static str) {
    match err {
        PackError::Input(_) => (
            Kind::Value,
            "`points` must be an integer array of shape (N, 2). \
             Pass np.zeros((0, 2), dtype=np.int32) when there are no points.",
        ),
        PackError::Codec(CodecError::UnexpectedTag { .. }) => (
            Kind::Value,
            "The bytes encode a different message type. Check the argument \
             order: tasks, scenes and user inputs are not interchangeable.",
        ),
        PackError::Codec(CodecError::UnsupportedVersion { .. }) => (
            Kind::Value,
            "The bytes were written by a newer encoder. Re-encode them with \
             this version of the library.",
        ),
        PackError::Codec(_) => (
            Kind::Value,
            "The encoded argument is corrupt or truncated. Re-encode it rather \
             than slicing or concatenating encoded buffers.",
        ),
        PackError::Engine(EngineError::ImageSizeMismatch { .. }) => (
            Kind::Runtime,
            "The engine's render() returned an image whose length is not \
             width * height of the scene.",
        ),
        PackError::Engine(EngineError::FeatureSizeMismatch { .. }) => (
            Kind::Runtime,
            "The engine's featurize() must return OBJECT_FEATURE_SIZE floats \
             for every body whose shape type is not UNDEFINED.",
        ),
        PackError::Engine(EngineError::MergeFailed { .. }) => (
            Kind::Runtime,
            "The engine's merge() must return a (bool, list[bytes]) tuple of \
             encoded bodies. An occluded placement is reported through the \
             bool, not by raising.",
        ),
        PackError::Engine(_) => (
            Kind::Runtime,
            "The engine raised during this call. The chained message names the \
             failing engine method.",
        ),
        PackError::ObjectCountChanged { .. } => (
            Kind::Runtime,
            "The simulator added or removed bodies mid-run. Per-object outputs \
             need the same bodies in every frame; request images only, or fix \
             the simulator.",
        ),
        PackError::WorkerPanicked { .. } => (
            Kind::Runtime,
            "A batch worker crashed. Retry the job on its own to see the \
             underlying failure.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phyre_core::InputError;

    #[test]
    fn caller_mistakes_are_value_errors() {
        let input = PackError::Input(InputError::PointsWidth { width: 3 });
        assert_eq!(error_detail(&input).0, Kind::Value);
        let codec = PackError::Codec(CodecError::Truncated);
        assert_eq!(error_detail(&codec).0, Kind::Value);
    }

    #[test]
    fn engine_faults_are_runtime_errors() {
        let engine = PackError::Engine(EngineError::SimulationFailed {
            reason: "x".into(),
        });
        assert_eq!(error_detail(&engine).0, Kind::Runtime);
        let count = PackError::ObjectCountChanged {
            frame: 1,
            expected: 2,
            found: 3,
        };
        assert_eq!(error_detail(&count).0, Kind::Runtime);
        let merge = PackError::Engine(EngineError::MergeFailed {
            reason: "merge() raised".into(),
        });
        assert_eq!(error_detail(&merge).0, Kind::Runtime);
    }

    #[test]
    fn every_hint_is_non_empty() {
        let errors = [
            PackError::Input(InputError::PointsRank { ndim: 1 }),
            PackError::Codec(CodecError::UnsupportedVersion { found: 9 }),
            PackError::Codec(CodecError::UnexpectedTag {
                expected: 1,
                found: 2,
            }),
            PackError::Engine(EngineError::ImageSizeMismatch {
                expected: 4,
                actual: 3,
            }),
            PackError::Engine(EngineError::FeatureSizeMismatch {
                expected: 14,
                actual: 0,
            }),
            PackError::WorkerPanicked { job: 0 },
        ];
        for err in &errors {
            assert!(!error_detail(err).1.is_empty(), "{err}");
        }
    }
}
