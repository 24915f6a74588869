//! End-to-end batch packing example.
//!
//! Demonstrates: encode a task → place a ball → pack images, masks and
//! features → inspect the buffers → repeat across a worker pool.

use ndarray::Array2;
use phyre_bench::{full_request, reference_task};
use phyre_pack::{build_user_input, pack_in_parallel, EngineBridge, PackJob, ParallelConfig};
use phyre_test_utils::fixtures::FixtureEngine;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Phyre Batch Packing Example ===\n");

    let bridge = EngineBridge::new(FixtureEngine::new());
    let task = phyre_codec::encode(&reference_task(42)).unwrap();

    // --- One call: a ball dropped near the top of the scene ---
    let points = Array2::<i32>::zeros((0, 2)).into_dyn();
    let input = build_user_input(points.view(), &[], &[128.0, 240.0, 6.0]).unwrap();
    let user_input = phyre_codec::encode(&input).unwrap();
    let request = full_request(60);
    let result = bridge
        .magic_ponies_general(&task, &user_input, &request)
        .unwrap();

    println!("solved:        {}", result.is_solved);
    println!("occlusions:    {}", result.had_occlusions);
    println!("objects:       {}", result.object_count);
    println!("image bytes:   {}", result.images.len());
    println!("mask bytes:    {}", result.object_masks.len());
    println!("feature count: {}", result.features.len());
    println!(
        "timing:        sim {:.3} ms, pack {:.3} ms\n",
        result.timings.simulation_seconds * 1e3,
        result.timings.pack_seconds * 1e3
    );

    // --- Many calls across a worker pool ---
    let jobs: Vec<PackJob> = (0..16)
        .map(|seed| PackJob {
            encoded_task: phyre_codec::encode(&reference_task(seed)).unwrap(),
            input: input.clone(),
            request,
        })
        .collect();
    let results = pack_in_parallel(&bridge.packer(), &jobs, &ParallelConfig::default());
    let occluded = results
        .iter()
        .filter(|r| r.as_ref().is_ok_and(|r| r.had_occlusions))
        .count();
    println!("{} jobs, {occluded} with occlusions", results.len());
    tracing::info!(jobs = results.len(), occluded, "parallel batch finished");
}
