//! Deterministic engine fixtures.
//!
//! Stand-ins for the external engine, good enough to drive the bridge
//! end to end:
//!
//! - [`DriftSimulator`]: translates dynamic bodies at a constant velocity.
//! - [`BoxRasterizer`]: fills each active body's bounding box with its colour.
//! - [`ShortSingletonRasterizer`]: like [`BoxRasterizer`] but returns a
//!   one-pixel-short image for single-body scenes (the mask render path).
//! - [`GeometryFeaturizer`]: position, angle, diameter and one-hot shape/colour.
//! - [`OverlapMerger`]: converts input to bodies, flags bounding-box overlaps.
//! - [`FixtureEngine`]: all of the above behind one type.

use phyre_core::{
    constants, Body, BodyType, Color, EngineError, Featurizer, Image, InputMerger, MergeOutcome,
    Rasterizer, Scene, Shape, ShapeType, Simulator, Task, TaskSimulation, UserInput, Vector,
    Vertices,
};

/// Axis-aligned bounds of a body as `[min_x, min_y, max_x, max_y]`.
///
/// Rotation is ignored. A body without shapes collapses to its position.
pub fn body_bounds(body: &Body) -> [f32; 4] {
    let p = body.position;
    let mut bounds = [p.x, p.y, p.x, p.y];
    for shape in &body.shapes {
        match shape {
            Shape::Circle { radius } => {
                bounds[0] = bounds[0].min(p.x - radius);
                bounds[1] = bounds[1].min(p.y - radius);
                bounds[2] = bounds[2].max(p.x + radius);
                bounds[3] = bounds[3].max(p.y + radius);
            }
            Shape::Polygon { vertices } => {
                for v in vertices {
                    bounds[0] = bounds[0].min(p.x + v.x);
                    bounds[1] = bounds[1].min(p.y + v.y);
                    bounds[2] = bounds[2].max(p.x + v.x);
                    bounds[3] = bounds[3].max(p.y + v.y);
                }
            }
        }
    }
    bounds
}

fn overlaps(a: [f32; 4], b: [f32; 4], margin: f32) -> bool {
    a[0] < b[2] + margin && b[0] < a[2] + margin && a[1] < b[3] + margin && b[1] < a[3] + margin
}

// ── Simulator ───────────────────────────────────────────────────

/// Moves every dynamic body by `velocity` per step. Static bodies stay put.
#[derive(Clone, Debug)]
pub struct DriftSimulator {
    /// Displacement per step.
    pub velocity: Vector,
    /// Frame index from which the goal counts as reached (`None` = never).
    pub solved_after: Option<usize>,
    /// When set, every call fails with this reason.
    pub fault: Option<String>,
}

impl Default for DriftSimulator {
    fn default() -> Self {
        Self {
            velocity: Vector::new(0.0, -1.0),
            solved_after: None,
            fault: None,
        }
    }
}

impl DriftSimulator {
    fn check_fault(&self) -> Result<(), EngineError> {
        match &self.fault {
            Some(reason) => Err(EngineError::SimulationFailed {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn advance(&self, scene: &Scene, step: usize) -> Scene {
        let mut frame = scene.clone();
        let dx = self.velocity.x * step as f32;
        let dy = self.velocity.y * step as f32;
        for body in frame
            .bodies
            .iter_mut()
            .chain(frame.user_input_bodies.iter_mut())
        {
            if body.body_type == BodyType::Dynamic {
                body.position.x += dx;
                body.position.y += dy;
            }
        }
        frame
    }

    fn frames(&self, scene: &Scene, steps: i32, stride: i32) -> Vec<Scene> {
        let steps = steps.max(0) as usize;
        let stride = stride.max(1) as usize;
        (0..steps)
            .step_by(stride)
            .map(|step| self.advance(scene, step))
            .collect()
    }
}

impl Simulator for DriftSimulator {
    fn simulate_task(
        &self,
        task: &Task,
        steps: i32,
        stride: i32,
    ) -> Result<TaskSimulation, EngineError> {
        self.check_fault()?;
        let scene_list = self.frames(&task.scene, steps, stride);
        let solved_state_list: Vec<bool> = (0..scene_list.len())
            .map(|i| self.solved_after.is_some_and(|n| i >= n))
            .collect();
        Ok(TaskSimulation {
            is_solution: solved_state_list.last().copied().unwrap_or(false),
            scene_list,
            solved_state_list,
            steps_simulated: steps.max(0),
        })
    }

    fn simulate_scene(&self, scene: &Scene, steps: i32) -> Result<Vec<Scene>, EngineError> {
        self.check_fault()?;
        Ok(self.frames(scene, steps, 1))
    }
}

// ── Rasterizers ─────────────────────────────────────────────────

/// Fills each active body's bounding box with its palette colour.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoxRasterizer;

impl Rasterizer for BoxRasterizer {
    fn render(&self, scene: &Scene) -> Result<Image, EngineError> {
        let (w, h) = (scene.width as i64, scene.height as i64);
        let mut values = vec![0u8; scene.image_size()];
        for body in scene.active_bodies() {
            let [x0, y0, x1, y1] = body_bounds(body);
            let (x0, x1) = ((x0.floor() as i64).max(0), (x1.ceil() as i64).min(w));
            let (y0, y1) = ((y0.floor() as i64).max(0), (y1.ceil() as i64).min(h));
            for y in y0..y1 {
                for x in x0..x1 {
                    values[(y * w + x) as usize] = body.color as u8;
                }
            }
        }
        Ok(Image {
            width: scene.width,
            height: scene.height,
            values,
        })
    }
}

/// Renders like [`BoxRasterizer`], except that scenes holding exactly one
/// body come back one pixel short.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShortSingletonRasterizer;

impl Rasterizer for ShortSingletonRasterizer {
    fn render(&self, scene: &Scene) -> Result<Image, EngineError> {
        let mut image = BoxRasterizer.render(scene)?;
        if scene.bodies.len() + scene.user_input_bodies.len() == 1 {
            image.values.pop();
        }
        Ok(image)
    }
}

// ── Featurizer ──────────────────────────────────────────────────

const SHAPE_SLOTS: [ShapeType; 4] = [
    ShapeType::Ball,
    ShapeType::Bar,
    ShapeType::Jar,
    ShapeType::StandingSticks,
];

const COLOR_SLOTS: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Blue,
    Color::Purple,
    Color::Gray,
    Color::Black,
];

/// Writes `[x, y, angle, diameter, shape one-hot (4), colour one-hot (6)]`,
/// normalised by the scene size, truncated or zero-padded to `feature_size`.
#[derive(Clone, Copy, Debug)]
pub struct GeometryFeaturizer {
    pub feature_size: usize,
}

impl Default for GeometryFeaturizer {
    fn default() -> Self {
        Self {
            feature_size: constants().object_feature_size,
        }
    }
}

impl GeometryFeaturizer {
    fn features(scene: &Scene, body: &Body) -> Vec<f32> {
        let (w, h) = (scene.width.max(1) as f32, scene.height.max(1) as f32);
        let mut f = vec![
            body.position.x / w,
            body.position.y / h,
            body.angle / std::f32::consts::TAU,
            body.diameter / w,
        ];
        f.extend(
            SHAPE_SLOTS
                .iter()
                .map(|&s| if body.shape_type == s { 1.0 } else { 0.0 }),
        );
        f.extend(
            COLOR_SLOTS
                .iter()
                .map(|&c| if body.color == c { 1.0 } else { 0.0 }),
        );
        f
    }
}

impl Featurizer for GeometryFeaturizer {
    fn featurize_into(&self, scene: &Scene, out: &mut [f32]) -> Result<(), EngineError> {
        let expected = scene.active_bodies().count() * self.feature_size;
        if out.len() != expected {
            return Err(EngineError::FeatureSizeMismatch {
                expected,
                actual: out.len(),
            });
        }
        for (slot, body) in out
            .chunks_exact_mut(self.feature_size)
            .zip(scene.active_bodies())
        {
            slot.fill(0.0);
            for (dst, src) in slot.iter_mut().zip(Self::features(scene, body)) {
                *dst = src;
            }
        }
        Ok(())
    }
}

// ── Merger ──────────────────────────────────────────────────────

/// Turns balls into red dynamic balls, polygons into red dynamic bars and
/// the point cloud into one bar covering its bounding box.
///
/// A candidate body conflicts when it leaves the scene or its bounding box
/// overlaps an active existing body (grown by `margin` when space must be
/// kept around bodies). Conflicting bodies are dropped unless occlusions
/// are allowed; either way the merge is reported unclean.
#[derive(Clone, Debug)]
pub struct OverlapMerger {
    pub margin: f32,
    /// When set, every call fails with this reason.
    pub fault: Option<String>,
}

impl Default for OverlapMerger {
    fn default() -> Self {
        Self {
            margin: 2.0,
            fault: None,
        }
    }
}

impl OverlapMerger {
    fn candidates(input: &UserInput) -> Vec<Body> {
        let mut out = Vec::new();
        for ball in &input.balls {
            out.push(Body {
                position: ball.position,
                shapes: vec![Shape::Circle {
                    radius: ball.radius,
                }],
                color: Color::Red,
                diameter: ball.radius * 2.0,
                shape_type: ShapeType::Ball,
                body_type: BodyType::Dynamic,
                ..Body::default()
            });
        }
        for polygon in &input.polygons {
            let n = polygon.vertices.len().max(1) as f32;
            let cx = polygon.vertices.iter().map(|v| v.x).sum::<f32>() / n;
            let cy = polygon.vertices.iter().map(|v| v.y).sum::<f32>() / n;
            let vertices: Vertices = polygon
                .vertices
                .iter()
                .map(|v| Vector::new(v.x - cx, v.y - cy))
                .collect();
            out.push(Body {
                position: Vector::new(cx, cy),
                shapes: vec![Shape::Polygon { vertices }],
                color: Color::Red,
                shape_type: ShapeType::Bar,
                body_type: BodyType::Dynamic,
                ..Body::default()
            });
        }
        if let Some(points) = point_bounds(&input.flattened_point_list) {
            let [x0, y0, x1, y1] = points;
            let (hx, hy) = ((x1 - x0) / 2.0 + 0.5, (y1 - y0) / 2.0 + 0.5);
            out.push(Body {
                position: Vector::new((x0 + x1) / 2.0, (y0 + y1) / 2.0),
                shapes: vec![Shape::Polygon {
                    vertices: Vertices::from_slice(&[
                        Vector::new(-hx, -hy),
                        Vector::new(hx, -hy),
                        Vector::new(hx, hy),
                        Vector::new(-hx, hy),
                    ]),
                }],
                color: Color::Red,
                shape_type: ShapeType::Bar,
                body_type: BodyType::Dynamic,
                ..Body::default()
            });
        }
        out
    }
}

fn point_bounds(flat: &[i32]) -> Option<[f32; 4]> {
    let mut pairs = flat.chunks_exact(2);
    let first = pairs.next()?;
    let mut b = [
        first[0] as f32,
        first[1] as f32,
        first[0] as f32,
        first[1] as f32,
    ];
    for p in pairs {
        b[0] = b[0].min(p[0] as f32);
        b[1] = b[1].min(p[1] as f32);
        b[2] = b[2].max(p[0] as f32);
        b[3] = b[3].max(p[1] as f32);
    }
    Some(b)
}

impl InputMerger for OverlapMerger {
    fn merge(
        &self,
        input: &UserInput,
        bodies: &[Body],
        keep_space_around_bodies: bool,
        allow_occlusions: bool,
        height: u32,
        width: u32,
    ) -> Result<MergeOutcome, EngineError> {
        if let Some(reason) = &self.fault {
            return Err(EngineError::MergeFailed {
                reason: reason.clone(),
            });
        }
        let margin = if keep_space_around_bodies {
            self.margin
        } else {
            0.0
        };
        let existing: Vec<[f32; 4]> = bodies
            .iter()
            .filter(|b| b.is_active())
            .map(body_bounds)
            .collect();
        let mut clean = true;
        let mut placed = Vec::new();
        for candidate in Self::candidates(input) {
            let b = body_bounds(&candidate);
            let outside = b[0] < 0.0 || b[1] < 0.0 || b[2] > width as f32 || b[3] > height as f32;
            let conflict = outside || existing.iter().any(|&e| overlaps(b, e, margin));
            if conflict {
                clean = false;
                if !allow_occlusions {
                    continue;
                }
            }
            placed.push(candidate);
        }
        Ok(MergeOutcome {
            clean,
            bodies: placed,
        })
    }
}

// ── Combined engine ─────────────────────────────────────────────

/// A full fixture engine. The rasterizer is swappable to exercise the
/// degraded mask path.
#[derive(Clone, Debug, Default)]
pub struct FixtureEngine<R = BoxRasterizer> {
    pub simulator: DriftSimulator,
    pub rasterizer: R,
    pub featurizer: GeometryFeaturizer,
    pub merger: OverlapMerger,
}

impl FixtureEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R> FixtureEngine<R> {
    /// Replace the rasterizer.
    pub fn with_rasterizer<R2>(self, rasterizer: R2) -> FixtureEngine<R2> {
        FixtureEngine {
            simulator: self.simulator,
            rasterizer,
            featurizer: self.featurizer,
            merger: self.merger,
        }
    }

    /// Replace the simulator.
    pub fn with_simulator(mut self, simulator: DriftSimulator) -> Self {
        self.simulator = simulator;
        self
    }

    /// Replace the merger.
    pub fn with_merger(mut self, merger: OverlapMerger) -> Self {
        self.merger = merger;
        self
    }
}

impl<R> Simulator for FixtureEngine<R> {
    fn simulate_task(
        &self,
        task: &Task,
        steps: i32,
        stride: i32,
    ) -> Result<TaskSimulation, EngineError> {
        self.simulator.simulate_task(task, steps, stride)
    }

    fn simulate_scene(&self, scene: &Scene, steps: i32) -> Result<Vec<Scene>, EngineError> {
        self.simulator.simulate_scene(scene, steps)
    }
}

impl<R: Rasterizer> Rasterizer for FixtureEngine<R> {
    fn render(&self, scene: &Scene) -> Result<Image, EngineError> {
        self.rasterizer.render(scene)
    }
}

impl<R> Featurizer for FixtureEngine<R> {
    fn featurize_into(&self, scene: &Scene, out: &mut [f32]) -> Result<(), EngineError> {
        self.featurizer.featurize_into(scene, out)
    }
}

impl<R> InputMerger for FixtureEngine<R> {
    fn merge(
        &self,
        input: &UserInput,
        bodies: &[Body],
        keep_space_around_bodies: bool,
        allow_occlusions: bool,
        height: u32,
        width: u32,
    ) -> Result<MergeOutcome, EngineError> {
        self.merger.merge(
            input,
            bodies,
            keep_space_around_bodies,
            allow_occlusions,
            height,
            width,
        )
    }
}
