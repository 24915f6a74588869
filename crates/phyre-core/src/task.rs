//! Tasks, user input and simulation results.

use crate::scene::{Scene, Vector, Vertices};

/// Goal relationship between the two task bodies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SpatialRelationship {
    /// No relationship.
    #[default]
    None = 0,
    /// Body 1 above body 2.
    Above = 1,
    /// Body 1 below body 2.
    Below = 2,
    /// Body 1 left of body 2.
    LeftOf = 3,
    /// Body 1 right of body 2.
    RightOf = 4,
    /// The bodies touch at least once.
    TouchingBriefly = 5,
    /// The bodies stay in contact.
    Touching = 6,
    /// Body 1 inside body 2.
    Inside = 7,
    /// The bodies never touch.
    NotTouching = 8,
    /// Body 1 never inside body 2.
    NotInside = 9,
}

/// An initial scene plus problem metadata; the unit of simulation work.
///
/// Only `scene` is interpreted by the bridge. The remaining fields belong
/// to the simulator's goal checker and are carried through untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Task {
    /// Task identifier, e.g. `"00012:345"`.
    pub task_id: String,
    /// The initial scene.
    pub scene: Scene,
    /// Index of the first goal body in `scene.bodies`.
    pub body_id1: i32,
    /// Index of the second goal body in `scene.bodies`.
    pub body_id2: i32,
    /// Relationships that must hold for the task to count as solved.
    pub relationships: Vec<SpatialRelationship>,
    /// Tier name the task belongs to.
    pub tier: String,
}

/// A convex polygon given in absolute scene coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AbsoluteConvexPolygon {
    /// Vertices in input order. Winding and convexity are not checked.
    pub vertices: Vertices,
}

/// A circle given in absolute scene coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CircleWithPosition {
    /// Centre of the circle.
    pub position: Vector,
    /// Radius of the circle.
    pub radius: f32,
}

/// Interactive geometry to merge into a scene.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserInput {
    /// Interleaved `(x, y)` pixel coordinates.
    pub flattened_point_list: Vec<i32>,
    /// Four-vertex convex polygons.
    pub polygons: Vec<AbsoluteConvexPolygon>,
    /// Circles.
    pub balls: Vec<CircleWithPosition>,
}

impl UserInput {
    /// Number of `(x, y)` points in the flattened point list.
    pub fn point_count(&self) -> usize {
        self.flattened_point_list.len() / 2
    }

    /// Whether the input carries no geometry at all.
    pub fn is_empty(&self) -> bool {
        self.flattened_point_list.is_empty() && self.polygons.is_empty() && self.balls.is_empty()
    }
}

/// Full output of one task simulation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskSimulation {
    /// Per-frame scene snapshots, in time order. May be empty.
    pub scene_list: Vec<Scene>,
    /// Per-frame goal-check result, parallel to `scene_list` when present.
    pub solved_state_list: Vec<bool>,
    /// Whether the task was solved.
    pub is_solution: bool,
    /// Number of physics steps actually simulated.
    pub steps_simulated: i32,
}

impl TaskSimulation {
    /// Number of recorded frames.
    pub fn frame_count(&self) -> usize {
        self.scene_list.len()
    }

    /// The first recorded frame, if any.
    pub fn first_frame(&self) -> Option<&Scene> {
        self.scene_list.first()
    }
}
