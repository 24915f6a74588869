//! Test utilities and fixture engines for Phyre development.
//!
//! Provides scene builders ([`ball`], [`bar`], [`scene_with`], ...),
//! deterministic fixture implementations of the engine collaborator
//! traits (see [`fixtures`]), and a seeded random scene generator for
//! benchmarks and property tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    body_bounds, BoxRasterizer, DriftSimulator, FixtureEngine, GeometryFeaturizer, OverlapMerger,
    ShortSingletonRasterizer,
};

use phyre_core::{Body, BodyType, Color, Scene, Shape, ShapeType, Task, Vector, Vertices};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use smallvec::smallvec;

/// A dynamic green ball of the given diameter centred at `(x, y)`.
pub fn ball(x: f32, y: f32, diameter: f32) -> Body {
    Body {
        position: Vector::new(x, y),
        angle: 0.0,
        shapes: vec![Shape::Circle {
            radius: diameter / 2.0,
        }],
        color: Color::Green,
        diameter,
        shape_type: ShapeType::Ball,
        body_type: BodyType::Dynamic,
    }
}

/// A static black axis-aligned bar centred at `(x, y)`.
pub fn bar(x: f32, y: f32, length: f32, thickness: f32) -> Body {
    let (hx, hy) = (length / 2.0, thickness / 2.0);
    let vertices: Vertices = smallvec![
        Vector::new(-hx, -hy),
        Vector::new(hx, -hy),
        Vector::new(hx, hy),
        Vector::new(-hx, hy),
    ];
    Body {
        position: Vector::new(x, y),
        angle: 0.0,
        shapes: vec![Shape::Polygon { vertices }],
        color: Color::Black,
        diameter: length,
        shape_type: ShapeType::Bar,
        body_type: BodyType::Static,
    }
}

/// An inactive body slot. Carries geometry so tests can prove it is ignored.
pub fn undefined_body() -> Body {
    Body {
        shape_type: ShapeType::Undefined,
        ..ball(4.0, 4.0, 4.0)
    }
}

/// A scene of the given size holding `bodies`.
pub fn scene_with(width: u32, height: u32, bodies: Vec<Body>) -> Scene {
    Scene {
        bodies,
        ..Scene::new(width, height)
    }
}

/// A task wrapping `scene` with placeholder metadata.
pub fn task_with(scene: Scene) -> Task {
    Task {
        task_id: "00000:000".into(),
        scene,
        body_id1: 0,
        body_id2: 1,
        relationships: Vec::new(),
        tier: "BALL".into(),
    }
}

/// A reproducible scene with `n_bodies` bodies, roughly one in five inactive.
pub fn random_scene(seed: u64, width: u32, height: u32, n_bodies: usize) -> Scene {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (w, h) = (width as f32, height as f32);
    let bodies = (0..n_bodies)
        .map(|_| {
            let x = uniform(&mut rng, 0.0, w);
            let y = uniform(&mut rng, 0.0, h);
            match rng.next_u32() % 5 {
                0 => undefined_body(),
                1 | 2 => bar(x, y, uniform(&mut rng, 2.0, w / 2.0), 2.0),
                _ => ball(x, y, uniform(&mut rng, 2.0, h / 4.0)),
            }
        })
        .collect();
    scene_with(width, height, bodies)
}

fn uniform(rng: &mut ChaCha8Rng, lo: f32, hi: f32) -> f32 {
    lo + (rng.next_u32() as f32 / u32::MAX as f32) * (hi - lo)
}
