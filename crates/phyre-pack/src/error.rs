//! Error type for bridge and packing operations.

use std::error::Error;
use std::fmt;

use phyre_codec::CodecError;
use phyre_core::{EngineError, InputError};

/// Errors from a bridge call.
///
/// Every variant is fatal to the call: no partial results are returned
/// and nothing is retried.
#[derive(Debug)]
pub enum PackError {
    /// Raw caller input failed validation before any work was done.
    Input(InputError),
    /// An encoded argument could not be decoded, or a result could not be
    /// encoded.
    Codec(CodecError),
    /// The external engine faulted.
    Engine(EngineError),
    /// A frame's active body count differs from the count fixed at frame 0.
    ObjectCountChanged {
        /// Index of the offending frame.
        frame: usize,
        /// Object count fixed from frame 0.
        expected: usize,
        /// Active bodies found in this frame.
        found: usize,
    },
    /// A worker thread panicked while processing a job.
    WorkerPanicked {
        /// Index of the job the worker was processing.
        job: usize,
    },
}

impl fmt::Display for PackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(e) => write!(f, "invalid input: {e}"),
            Self::Codec(e) => write!(f, "codec: {e}"),
            Self::Engine(e) => write!(f, "engine: {e}"),
            Self::ObjectCountChanged {
                frame,
                expected,
                found,
            } => write!(
                f,
                "frame {frame} has {found} objects, but frame 0 fixed the layout at {expected}"
            ),
            Self::WorkerPanicked { job } => write!(f, "worker panicked on job {job}"),
        }
    }
}

impl Error for PackError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Input(e) => Some(e),
            Self::Codec(e) => Some(e),
            Self::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<InputError> for PackError {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

impl From<CodecError> for PackError {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

impl From<EngineError> for PackError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}
