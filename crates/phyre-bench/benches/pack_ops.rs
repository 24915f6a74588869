//! Criterion benchmarks for the batch packing pipeline.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use phyre_bench::{full_request, reference_task, stress_task};
use phyre_codec::encode;
use phyre_core::UserInput;
use phyre_pack::{pack_in_parallel, BatchPacker, PackJob, PackRequest, ParallelConfig};
use phyre_test_utils::fixtures::FixtureEngine;

/// Benchmark: 60 frames, images only.
fn bench_pack_images(c: &mut Criterion) {
    let engine = FixtureEngine::new();
    let task = encode(&reference_task(42)).unwrap();
    let request = PackRequest {
        need_object_masks: false,
        need_featurized_objects: false,
        ..full_request(60)
    };
    let input = UserInput::default();

    c.bench_function("pack_images_60", |b| {
        b.iter(|| black_box(BatchPacker::new(&engine).run(&task, &input, &request).unwrap()));
    });
}

/// Benchmark: 60 frames, every output.
fn bench_pack_full(c: &mut Criterion) {
    let engine = FixtureEngine::new();
    let task = encode(&reference_task(42)).unwrap();
    let request = full_request(60);
    let input = UserInput::default();

    c.bench_function("pack_full_60", |b| {
        b.iter(|| black_box(BatchPacker::new(&engine).run(&task, &input, &request).unwrap()));
    });
}

/// Benchmark: 10 frames of masks on the stress profile.
fn bench_pack_masks_stress(c: &mut Criterion) {
    let engine = FixtureEngine::new();
    let task = encode(&stress_task(42)).unwrap();
    let request = PackRequest {
        need_featurized_objects: false,
        ..full_request(10)
    };
    let input = UserInput::default();

    let mut group = c.benchmark_group("stress");
    group.sample_size(10);
    group.bench_function("pack_masks_stress_10", |b| {
        b.iter(|| black_box(BatchPacker::new(&engine).run(&task, &input, &request).unwrap()));
    });
    group.finish();
}

/// Benchmark: 32 independent jobs on the default worker pool.
fn bench_pack_parallel(c: &mut Criterion) {
    let engine = FixtureEngine::new();
    let jobs: Vec<PackJob> = (0..32)
        .map(|seed| PackJob {
            encoded_task: encode(&reference_task(seed)).unwrap(),
            input: UserInput::default(),
            request: full_request(30),
        })
        .collect();
    let config = ParallelConfig::default();
    let packer = BatchPacker::new(&engine);

    c.bench_function("pack_parallel_32x30", |b| {
        b.iter(|| black_box(pack_in_parallel(&packer, &jobs, &config)));
    });
}

criterion_group!(
    benches,
    bench_pack_images,
    bench_pack_full,
    bench_pack_masks_stress,
    bench_pack_parallel
);
criterion_main!(benches);
