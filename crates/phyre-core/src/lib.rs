//! Core types and traits for the Phyre simulation bridge.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the data model that crosses the boundary between the host runtime and
//! the rigid-body engine (scenes, bodies, tasks, user input, simulation
//! results), the error types shared by every layer, the process-wide
//! [`EngineConstants`], and the traits describing the engine's external
//! collaborators: [`Simulator`], [`Rasterizer`], [`Featurizer`] and
//! [`InputMerger`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod scene;
pub mod task;
pub mod traits;

pub use config::{constants, init_constants, EngineConstants};
pub use error::{ConfigError, EngineError, InputError};
pub use scene::{
    Body, BodyType, Color, Image, Scene, Shape, ShapeType, UserInputStatus, Vector, Vertices,
};
pub use task::{
    AbsoluteConvexPolygon, CircleWithPosition, SpatialRelationship, Task, TaskSimulation,
    UserInput,
};
pub use traits::{Engine, Featurizer, InputMerger, MergeOutcome, Rasterizer, Simulator};
