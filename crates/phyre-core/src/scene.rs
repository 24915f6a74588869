//! Scene snapshots and the bodies they contain.

use smallvec::SmallVec;

/// A 2D vector in scene coordinates (pixels, origin bottom-left).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Vector {
    /// Construct a vector from its components.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Polygon vertex storage. Interaction polygons always carry four
/// vertices, so they never spill to the heap.
pub type Vertices = SmallVec<[Vector; 4]>;

/// A primitive shape, expressed relative to its body's position.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// A convex polygon given by its vertices in order.
    Polygon {
        /// Polygon vertices relative to the body position.
        vertices: Vertices,
    },
    /// A circle centred on the body position.
    Circle {
        /// Circle radius.
        radius: f32,
    },
}

/// Semantic shape of a body.
///
/// [`ShapeType::Undefined`] marks an inactive slot: such bodies are never
/// counted, rendered, masked or featurized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ShapeType {
    /// Inactive slot.
    #[default]
    Undefined = 0,
    /// A ball.
    Ball = 1,
    /// A straight bar.
    Bar = 2,
    /// An open jar.
    Jar = 3,
    /// A pair of standing sticks.
    StandingSticks = 4,
}

impl ShapeType {
    /// Whether bodies of this type occupy an object slot.
    pub fn is_active(self) -> bool {
        self != ShapeType::Undefined
    }
}

/// Whether a body is moved by the simulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BodyType {
    /// Never moves.
    #[default]
    Static = 0,
    /// Moved by the physics integrator.
    Dynamic = 1,
}

/// Palette colour of a body. The discriminant is the pixel value the
/// rasterizer writes for the body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    /// Background.
    #[default]
    White = 0,
    /// Red.
    Red = 1,
    /// Green.
    Green = 2,
    /// Blue.
    Blue = 3,
    /// Purple.
    Purple = 4,
    /// Gray.
    Gray = 5,
    /// Black.
    Black = 6,
    /// Light red.
    LightRed = 7,
}

/// One geometric/physical object in a scene.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Body {
    /// Position of the body origin.
    pub position: Vector,
    /// Rotation in radians.
    pub angle: f32,
    /// Shapes making up the body.
    pub shapes: Vec<Shape>,
    /// Palette colour.
    pub color: Color,
    /// Characteristic size used by featurization.
    pub diameter: f32,
    /// Semantic shape; `Undefined` marks an inactive slot.
    pub shape_type: ShapeType,
    /// Static or dynamic.
    pub body_type: BodyType,
}

impl Body {
    /// Whether the body occupies an object slot (shape type is not `Undefined`).
    pub fn is_active(&self) -> bool {
        self.shape_type.is_active()
    }
}

/// Outcome of merging user input into a scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UserInputStatus {
    /// No merge has been performed on this scene.
    #[default]
    Undefined = 0,
    /// The merge placed every input body without conflict.
    NoOcclusions = 1,
    /// At least one input body overlapped forbidden or occupied space.
    HadOcclusions = 2,
}

/// One snapshot of the simulated world.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Task-defined bodies.
    pub bodies: Vec<Body>,
    /// Bodies derived from user input by the merge step.
    pub user_input_bodies: Vec<Body>,
    /// Result of the last merge.
    pub user_input_status: UserInputStatus,
}

impl Scene {
    /// Create an empty scene of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Number of pixels in a rendered frame of this scene.
    pub fn image_size(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Every active body: task bodies first, then user-input bodies.
    ///
    /// This ordering is the object index used by masks and features.
    pub fn active_bodies(&self) -> impl Iterator<Item = &Body> + '_ {
        self.bodies
            .iter()
            .chain(self.user_input_bodies.iter())
            .filter(|body| body.is_active())
    }

    /// A scene with the same dimensions holding only `body`.
    pub fn isolate(&self, body: &Body) -> Scene {
        Scene {
            width: self.width,
            height: self.height,
            bodies: vec![body.clone()],
            ..Scene::default()
        }
    }
}

/// A rendered frame: one palette index per pixel, row-major.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Image {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel values, `width * height` of them when well-formed.
    pub values: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn body(shape_type: ShapeType) -> Body {
        Body {
            shape_type,
            ..Body::default()
        }
    }

    #[test]
    fn active_bodies_skip_undefined_and_keep_order() {
        let mut scene = Scene::new(4, 4);
        scene.bodies = vec![body(ShapeType::Ball), body(ShapeType::Undefined)];
        scene.user_input_bodies = vec![body(ShapeType::Undefined), body(ShapeType::Bar)];
        let types: Vec<ShapeType> = scene.active_bodies().map(|b| b.shape_type).collect();
        assert_eq!(types, vec![ShapeType::Ball, ShapeType::Bar]);
    }

    #[test]
    fn isolate_keeps_dimensions_only() {
        let mut scene = Scene::new(32, 16);
        scene.user_input_status = UserInputStatus::HadOcclusions;
        scene.bodies = vec![body(ShapeType::Jar), body(ShapeType::Ball)];
        let single = scene.isolate(&scene.bodies[1]);
        assert_eq!((single.width, single.height), (32, 16));
        assert_eq!(single.bodies, vec![body(ShapeType::Ball)]);
        assert!(single.user_input_bodies.is_empty());
        assert_eq!(single.user_input_status, UserInputStatus::Undefined);
    }

    #[test]
    fn image_size_does_not_overflow_u32() {
        let scene = Scene::new(u32::MAX, 2);
        assert_eq!(scene.image_size(), u32::MAX as usize * 2);
    }

    fn arb_shape_type() -> impl Strategy<Value = ShapeType> {
        prop_oneof![
            Just(ShapeType::Undefined),
            Just(ShapeType::Ball),
            Just(ShapeType::Bar),
            Just(ShapeType::Jar),
            Just(ShapeType::StandingSticks),
        ]
    }

    fn arb_bodies() -> impl Strategy<Value = Vec<Body>> {
        prop::collection::vec(arb_shape_type().prop_map(body), 0..12)
    }

    proptest! {
        #[test]
        fn active_bodies_are_the_active_subsequence(
            bodies in arb_bodies(),
            user in arb_bodies(),
        ) {
            let mut scene = Scene::new(8, 8);
            scene.bodies = bodies.clone();
            scene.user_input_bodies = user.clone();
            let expected: Vec<&Body> = bodies
                .iter()
                .chain(user.iter())
                .filter(|b| b.shape_type != ShapeType::Undefined)
                .collect();
            prop_assert_eq!(scene.active_bodies().collect::<Vec<_>>(), expected);
        }

        #[test]
        fn isolated_scene_has_one_active_body(bodies in arb_bodies()) {
            let mut scene = Scene::new(8, 8);
            scene.bodies = bodies;
            for active in scene.active_bodies() {
                let single = scene.isolate(active);
                prop_assert_eq!(single.active_bodies().count(), 1);
                prop_assert_eq!(single.image_size(), scene.image_size());
            }
        }
    }
}
