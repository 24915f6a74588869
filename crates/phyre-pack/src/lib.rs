//! Marshaling and batch packing between the host runtime and the engine.
//!
//! This crate is the bridge's working core. A batch call flows through it
//! as follows:
//!
//! 1. [`build_user_input`] turns raw point/rectangle/circle arrays into a
//!    [`UserInput`](phyre_core::UserInput).
//! 2. [`merge_into`] runs the external merge algorithm and records the
//!    occlusion status and new bodies on the task scene.
//! 3. The external [`Simulator`](phyre_core::Simulator) produces the
//!    per-frame scene list.
//! 4. [`count_objects`] fixes the per-run object count from frame 0 and a
//!    [`BatchLayout`] derives every buffer size and offset from it.
//! 5. [`BatchPacker`] rasterizes frames, renders per-object masks
//!    ([`render_object_masks`]) and featurizes objects into contiguous
//!    [`PackedBuffer`]s whose ownership passes to the caller.
//!
//! [`EngineBridge`] exposes every host-facing operation on encoded bytes,
//! and [`parallel`] fans independent calls across a worker pool.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bridge;
pub mod buffer;
pub mod config;
pub mod count;
pub mod error;
pub mod layout;
pub mod mask;
pub mod merge;
pub mod metrics;
pub mod pack;
pub mod parallel;
pub mod user_input;

pub use bridge::EngineBridge;
pub use buffer::{PackedBuffer, ReleaseHook};
pub use config::ParallelConfig;
pub use count::{count_objects, count_objects_in_scene, had_occlusions};
pub use error::PackError;
pub use layout::{BatchLayout, BatchOutput};
pub use mask::render_object_masks;
pub use merge::merge_into;
pub use metrics::{PackTimings, Stopwatch};
pub use pack::{BatchPacker, BufferKind, PackRequest, PackResult};
pub use parallel::{pack_in_parallel, simulate_tasks_in_parallel, PackJob};
pub use user_input::build_user_input;
