//! Benchmark profiles and utilities for the Phyre simulation bridge.
//!
//! Provides pre-built tasks and requests for benchmarking and examples:
//!
//! - [`reference_task`]: 256x256 scene with 12 bodies
//! - [`stress_task`]: 512x512 scene with 48 bodies
//! - [`full_request`]: images, masks and features for a short run

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use phyre_core::Task;
use phyre_pack::PackRequest;
use phyre_test_utils::{random_scene, task_with};

/// Build a reference benchmark task: 256x256 pixels, 12 bodies.
pub fn reference_task(seed: u64) -> Task {
    task_with(random_scene(seed, 256, 256, 12))
}

/// Build a stress benchmark task: 512x512 pixels, 48 bodies.
///
/// Mask packing cost grows with pixels times objects, so this is
/// 16x the mask work of [`reference_task`].
pub fn stress_task(seed: u64) -> Task {
    task_with(random_scene(seed, 512, 512, 48))
}

/// Request every output for `steps` frames at stride 1.
pub fn full_request(steps: i32) -> PackRequest {
    PackRequest {
        steps,
        stride: 1,
        need_images: true,
        need_featurized_objects: true,
        need_object_masks: true,
        ..PackRequest::default()
    }
}
