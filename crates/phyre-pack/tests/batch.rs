//! End-to-end batch packing against the fixture engine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use phyre_codec::encode;
use phyre_core::{constants, Rasterizer, UserInput};
use phyre_pack::pack::BufferKind;
use phyre_pack::{
    build_user_input, pack_in_parallel, simulate_tasks_in_parallel, BatchPacker, EngineBridge,
    PackJob, PackRequest, ParallelConfig,
};
use phyre_test_utils::fixtures::{
    DriftSimulator, FixtureEngine, GeometryFeaturizer, ShortSingletonRasterizer,
};
use phyre_test_utils::{ball, bar, random_scene, scene_with, task_with, undefined_body};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn request(steps: i32, images: bool, features: bool, masks: bool) -> PackRequest {
    PackRequest {
        steps,
        stride: 1,
        need_images: images,
        need_featurized_objects: features,
        need_object_masks: masks,
        ..PackRequest::default()
    }
}

#[test]
fn circle_and_undefined_body_ten_steps() {
    init_tracing();
    let scene = scene_with(40, 30, vec![ball(20.0, 25.0, 6.0), undefined_body()]);
    let task = encode(&task_with(scene)).unwrap();
    let engine = FixtureEngine::new();

    let result = BatchPacker::new(&engine)
        .run(&task, &UserInput::default(), &request(10, true, true, false))
        .unwrap();

    assert_eq!(result.images.len(), 10 * 40 * 30);
    assert_eq!(result.object_count, 1);
    assert_eq!(result.features.len(), 10 * constants().object_feature_size);
    assert!(result.timings.simulation_seconds >= 0.0);
    assert!(result.timings.pack_seconds >= 0.0);
}

#[test]
fn masks_match_single_object_renders() {
    init_tracing();
    let engine = FixtureEngine::new();
    let scene = scene_with(
        48,
        48,
        vec![ball(12.0, 40.0, 6.0), undefined_body(), bar(24.0, 4.0, 40.0, 3.0)],
    );
    let task = task_with(scene);
    let encoded = encode(&task).unwrap();
    let balls = [36.0, 30.0, 4.0];
    let points = ndarray::Array::<i32, _>::zeros(ndarray::IxDyn(&[0, 2]));
    let input = build_user_input(points.view(), &[], &balls).unwrap();

    let packer = BatchPacker::new(&engine);
    let req = request(6, true, false, true);
    let result = packer.run(&encoded, &input, &req).unwrap();
    let (frames, objects, image_size) = (6, 3, 48 * 48);
    assert_eq!(result.object_count, objects);
    assert_eq!(result.object_masks.len(), frames * objects * image_size);

    // Recreate the frames the packer saw and render every body alone.
    let mut merged = task.clone();
    phyre_pack::merge_into(&engine, &input, false, false, &mut merged.scene).unwrap();
    let simulation = phyre_core::Simulator::simulate_task(&engine, &merged, 6, 1).unwrap();
    for (f, scene) in simulation.scene_list.iter().enumerate() {
        let image = engine.render(scene).unwrap();
        assert_eq!(
            &result.images[f * image_size..(f + 1) * image_size],
            &image.values[..]
        );
        for (o, body) in scene.active_bodies().enumerate() {
            let alone = engine.render(&scene.isolate(body)).unwrap();
            let start = (f * objects + o) * image_size;
            assert_eq!(
                &result.object_masks[start..start + image_size],
                &alone.values[..],
                "frame {f} object {o}"
            );
        }
    }
}

#[test]
fn degraded_masks_keep_the_batch_alive() {
    init_tracing();
    let engine = FixtureEngine::new().with_rasterizer(ShortSingletonRasterizer);
    let scene = scene_with(16, 16, vec![ball(8.0, 12.0, 4.0), bar(8.0, 2.0, 12.0, 2.0)]);
    let task = encode(&task_with(scene)).unwrap();

    let result = BatchPacker::new(&engine)
        .run(&task, &UserInput::default(), &request(3, true, false, true))
        .unwrap();

    assert_eq!(result.object_masks.len(), 3 * 2 * 256);
    assert!(result.object_masks.iter().all(|&p| p == 0));
    assert!(result.images.iter().any(|&p| p != 0));
}

#[test]
fn all_flags_false_still_reports_scalars() {
    let engine = FixtureEngine::new().with_simulator(DriftSimulator {
        solved_after: Some(2),
        ..DriftSimulator::default()
    });
    let scene = scene_with(32, 32, vec![bar(16.0, 2.0, 30.0, 2.0)]);
    let task = encode(&task_with(scene)).unwrap();
    let points = ndarray::Array::<i32, _>::zeros(ndarray::IxDyn(&[0, 2]));
    // Ball sunk into the floor: merge must report occlusions.
    let input = build_user_input(points.view(), &[], &[16.0, 3.0, 2.0]).unwrap();

    let result = BatchPacker::new(&engine)
        .run(&task, &input, &request(5, false, false, false))
        .unwrap();

    assert!(result.is_solved);
    assert!(result.had_occlusions);
    assert_eq!(result.object_count, 1);
    assert!(result.images.is_empty());
    assert!(result.object_masks.is_empty());
    assert!(result.features.is_empty());
}

#[test]
fn every_buffer_released_exactly_once() {
    let engine = FixtureEngine::new();
    let scene = scene_with(16, 16, vec![ball(8.0, 12.0, 4.0)]);
    let task = encode(&task_with(scene)).unwrap();
    let released = Arc::new(Mutex::new(Vec::new()));
    let calls = Arc::new(AtomicUsize::new(0));

    let result = {
        let released = Arc::clone(&released);
        let calls = Arc::clone(&calls);
        BatchPacker::new(&engine)
            .run(&task, &UserInput::default(), &request(4, true, true, true))
            .unwrap()
            .on_release(move |kind, len| {
                calls.fetch_add(1, Ordering::SeqCst);
                released.lock().unwrap().push((kind, len));
            })
    };

    let images = Arc::new(result.images);
    let reader = Arc::clone(&images);
    std::thread::spawn(move || assert_eq!(reader.len(), 4 * 256))
        .join()
        .unwrap();
    drop(result.object_masks);
    drop(result.features);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    drop(images);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let mut seen = released.lock().unwrap().clone();
    seen.sort_by_key(|(kind, _)| *kind as u8);
    assert_eq!(
        seen,
        vec![
            (BufferKind::Images, 4 * 256),
            (BufferKind::ObjectMasks, 4 * 256),
            (BufferKind::Features, 4 * constants().object_feature_size),
        ]
    );
}

#[test]
fn parallel_results_match_sequential_runs() {
    init_tracing();
    let engine = FixtureEngine::new();
    let jobs: Vec<PackJob> = (0..12u64)
        .map(|seed| PackJob {
            encoded_task: encode(&task_with(random_scene(seed, 32, 32, 6))).unwrap(),
            input: UserInput::default(),
            request: request(5, true, true, false),
        })
        .collect();

    let packer = BatchPacker::new(&engine);
    let parallel = pack_in_parallel(&packer, &jobs, &ParallelConfig::with_workers(4));
    assert_eq!(parallel.len(), jobs.len());
    for (job, result) in jobs.iter().zip(parallel) {
        let result = result.unwrap();
        let expected = packer.run(&job.encoded_task, &job.input, &job.request).unwrap();
        assert_eq!(result.object_count, expected.object_count);
        assert_eq!(result.images.as_slice(), expected.images.as_slice());
        assert_eq!(result.features.as_slice(), expected.features.as_slice());
    }
}

#[test]
fn parallel_packing_uses_the_packer_feature_width() {
    let width = 20;
    let engine = FixtureEngine {
        featurizer: GeometryFeaturizer {
            feature_size: width,
        },
        ..FixtureEngine::new()
    };
    let jobs: Vec<PackJob> = (0..6u64)
        .map(|seed| PackJob {
            encoded_task: encode(&task_with(random_scene(seed, 24, 24, 4))).unwrap(),
            input: UserInput::default(),
            request: request(3, false, true, false),
        })
        .collect();

    let packer = BatchPacker::new(&engine).with_feature_size(width);
    let results = pack_in_parallel(&packer, &jobs, &ParallelConfig::with_workers(3));
    for (job, result) in jobs.iter().zip(results) {
        let result = result.unwrap();
        assert_eq!(result.features.len(), 3 * result.object_count * width);
        let expected = packer.run(&job.encoded_task, &job.input, &job.request).unwrap();
        assert_eq!(result.features.as_slice(), expected.features.as_slice());
    }
}

#[test]
fn parallel_simulation_keeps_order_and_errors() {
    let engine = FixtureEngine::new();
    let tasks: Vec<_> = (1..=9)
        .map(|n| task_with(scene_with(16, 16, vec![ball(8.0, 8.0, n as f32)])))
        .collect();
    let results = simulate_tasks_in_parallel(&engine, &tasks, 4, 1, &ParallelConfig::default());
    for (task, result) in tasks.iter().zip(results) {
        let simulation = result.unwrap();
        assert_eq!(simulation.frame_count(), 4);
        assert_eq!(
            simulation.scene_list[0].bodies[0].diameter,
            task.scene.bodies[0].diameter
        );
    }

    let broken = FixtureEngine::new().with_simulator(DriftSimulator {
        fault: Some("boom".into()),
        ..DriftSimulator::default()
    });
    let results =
        simulate_tasks_in_parallel(&broken, &tasks, 4, 1, &ParallelConfig::with_workers(3));
    assert!(results.iter().all(Result::is_err));
}

#[test]
fn bridge_render_matches_first_packed_frame() {
    let bridge = EngineBridge::new(FixtureEngine::new());
    let scene = scene_with(24, 24, vec![ball(12.0, 12.0, 8.0)]);
    let task = encode(&task_with(scene.clone())).unwrap();
    let result = bridge
        .magic_ponies_general(
            &task,
            &encode(&UserInput::default()).unwrap(),
            &request(1, true, false, false),
        )
        .unwrap();
    // The merge sets a status but adds no bodies, so pixels are unchanged.
    let rendered = bridge.render(&encode(&scene).unwrap()).unwrap();
    assert_eq!(result.images.as_slice(), &rendered[..]);
}
