//! Phyre: the boundary between a rigid-body physics engine and the host
//! runtime that drives it for large-scale batch data generation.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Phyre sub-crates. For most users, adding `phyre` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use phyre::prelude::*;
//! use phyre::codec::{decode, encode};
//!
//! // A 64x64 scene with one ball and one inactive slot.
//! let mut scene = Scene::new(64, 64);
//! scene.bodies.push(Body {
//!     position: Vector::new(32.0, 48.0),
//!     shapes: vec![Shape::Circle { radius: 4.0 }],
//!     diameter: 8.0,
//!     shape_type: ShapeType::Ball,
//!     body_type: BodyType::Dynamic,
//!     ..Body::default()
//! });
//! scene.bodies.push(Body::default());
//! assert_eq!(count_objects_in_scene(&scene), 1);
//!
//! // Tasks cross the host boundary as bytes.
//! let task = Task { scene, ..Task::default() };
//! let bytes = encode(&task).unwrap();
//! let back: Task = decode(&bytes).unwrap();
//! assert_eq!(back, task);
//!
//! // Raw interaction geometry: two points, one rectangle, one ball.
//! let points = ndarray::arr2(&[[1, 2], [3, 4]]).into_dyn();
//! let rect = [0.0, 0.0, 4.0, 0.0, 4.0, 2.0, 0.0, 2.0];
//! let input = build_user_input(points.view(), &rect, &[10.0, 10.0, 2.0]).unwrap();
//! assert_eq!(input.flattened_point_list, vec![1, 2, 3, 4]);
//! assert_eq!(input.polygons[0].vertices.len(), 4);
//! assert_eq!(input.balls.len(), 1);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `phyre-core` | Data model, engine constants, errors, collaborator traits |
//! | [`codec`] | `phyre-codec` | Binary encoding of tasks, scenes and simulations |
//! | [`pack`] | `phyre-pack` | Input building, merge, batch packing, parallel runner |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Data model, constants, errors and collaborator traits (`phyre-core`).
///
/// Engines plug in by implementing [`types::Simulator`],
/// [`types::Rasterizer`], [`types::Featurizer`] and [`types::InputMerger`].
pub use phyre_core as types;

/// Binary encoding (`phyre-codec`).
pub use phyre_codec as codec;

/// Marshaling and batch packing (`phyre-pack`).
///
/// [`pack::EngineBridge`] exposes every host-facing operation;
/// [`pack::BatchPacker`] is the batch pipeline it runs.
pub use phyre_pack as pack;

/// Common imports for typical Phyre usage.
///
/// ```rust
/// use phyre::prelude::*;
/// ```
pub mod prelude {
    // Data model
    pub use phyre_core::{
        Body, BodyType, Color, Image, Scene, Shape, ShapeType, Task, TaskSimulation, UserInput,
        UserInputStatus, Vector,
    };

    // Configuration
    pub use phyre_core::{constants, init_constants, EngineConstants};

    // Collaborators
    pub use phyre_core::{Engine, Featurizer, InputMerger, MergeOutcome, Rasterizer, Simulator};

    // Errors
    pub use phyre_codec::CodecError;
    pub use phyre_core::{ConfigError, EngineError, InputError};
    pub use phyre_pack::PackError;

    // Packing
    pub use phyre_pack::{
        build_user_input, count_objects, count_objects_in_scene, pack_in_parallel,
        simulate_tasks_in_parallel, BatchPacker, EngineBridge, PackJob, PackRequest, PackResult,
        PackedBuffer, ParallelConfig,
    };
}
