//! Encode/decode of the Phyre data model.
//!
//! Field order on the wire follows declaration order in `phyre-core`.
//! Enums travel as their `u8` discriminant; unknown discriminants are
//! rejected rather than mapped to a default.

use std::io::{Read, Write};

use phyre_core::{
    AbsoluteConvexPolygon, Body, BodyType, CircleWithPosition, Color, Scene, Shape, ShapeType,
    SpatialRelationship, Task, TaskSimulation, UserInput, UserInputStatus, Vector, Vertices,
};

use crate::codec::*;
use crate::error::CodecError;
use crate::{TAG_BODY, TAG_SCENE, TAG_TASK, TAG_TASK_SIMULATION, TAG_USER_INPUT};

const SHAPE_POLYGON: u8 = 0;
const SHAPE_CIRCLE: u8 = 1;

/// A type that can travel as a top-level message.
///
/// `write_body`/`read_body` handle the payload only; the header is added
/// by [`encode`](crate::encode) and checked by [`decode`](crate::decode).
/// Nested messages (a [`Scene`] inside a [`Task`]) are written body-only.
pub trait Wire: Sized {
    /// Message tag written in the header.
    const TAG: u8;

    /// Encode the payload.
    fn write_body(&self, w: &mut dyn Write) -> Result<(), CodecError>;

    /// Decode the payload.
    fn read_body(r: &mut dyn Read) -> Result<Self, CodecError>;
}

// ── Enums ───────────────────────────────────────────────────────

fn read_shape_type(r: &mut dyn Read) -> Result<ShapeType, CodecError> {
    match read_u8(r)? {
        0 => Ok(ShapeType::Undefined),
        1 => Ok(ShapeType::Ball),
        2 => Ok(ShapeType::Bar),
        3 => Ok(ShapeType::Jar),
        4 => Ok(ShapeType::StandingSticks),
        value => Err(CodecError::InvalidEnum {
            name: "ShapeType",
            value,
        }),
    }
}

fn read_body_type(r: &mut dyn Read) -> Result<BodyType, CodecError> {
    match read_u8(r)? {
        0 => Ok(BodyType::Static),
        1 => Ok(BodyType::Dynamic),
        value => Err(CodecError::InvalidEnum {
            name: "BodyType",
            value,
        }),
    }
}

fn read_color(r: &mut dyn Read) -> Result<Color, CodecError> {
    match read_u8(r)? {
        0 => Ok(Color::White),
        1 => Ok(Color::Red),
        2 => Ok(Color::Green),
        3 => Ok(Color::Blue),
        4 => Ok(Color::Purple),
        5 => Ok(Color::Gray),
        6 => Ok(Color::Black),
        7 => Ok(Color::LightRed),
        value => Err(CodecError::InvalidEnum {
            name: "Color",
            value,
        }),
    }
}

fn read_user_input_status(r: &mut dyn Read) -> Result<UserInputStatus, CodecError> {
    match read_u8(r)? {
        0 => Ok(UserInputStatus::Undefined),
        1 => Ok(UserInputStatus::NoOcclusions),
        2 => Ok(UserInputStatus::HadOcclusions),
        value => Err(CodecError::InvalidEnum {
            name: "UserInputStatus",
            value,
        }),
    }
}

fn read_relationship(r: &mut dyn Read) -> Result<SpatialRelationship, CodecError> {
    match read_u8(r)? {
        0 => Ok(SpatialRelationship::None),
        1 => Ok(SpatialRelationship::Above),
        2 => Ok(SpatialRelationship::Below),
        3 => Ok(SpatialRelationship::LeftOf),
        4 => Ok(SpatialRelationship::RightOf),
        5 => Ok(SpatialRelationship::TouchingBriefly),
        6 => Ok(SpatialRelationship::Touching),
        7 => Ok(SpatialRelationship::Inside),
        8 => Ok(SpatialRelationship::NotTouching),
        9 => Ok(SpatialRelationship::NotInside),
        value => Err(CodecError::InvalidEnum {
            name: "SpatialRelationship",
            value,
        }),
    }
}

// ── Geometry ────────────────────────────────────────────────────

fn write_vector(w: &mut dyn Write, v: &Vector) -> Result<(), CodecError> {
    write_f32_le(w, v.x)?;
    write_f32_le(w, v.y)
}

fn read_vector(r: &mut dyn Read) -> Result<Vector, CodecError> {
    Ok(Vector {
        x: read_f32_le(r)?,
        y: read_f32_le(r)?,
    })
}

fn write_vertices(w: &mut dyn Write, vertices: &Vertices) -> Result<(), CodecError> {
    write_seq(w, vertices, write_vector)
}

fn read_vertices(r: &mut dyn Read) -> Result<Vertices, CodecError> {
    Ok(read_seq(r, read_vector)?.into_iter().collect())
}

fn write_shape(w: &mut dyn Write, shape: &Shape) -> Result<(), CodecError> {
    match shape {
        Shape::Polygon { vertices } => {
            write_u8(w, SHAPE_POLYGON)?;
            write_vertices(w, vertices)
        }
        Shape::Circle { radius } => {
            write_u8(w, SHAPE_CIRCLE)?;
            write_f32_le(w, *radius)
        }
    }
}

fn read_shape(r: &mut dyn Read) -> Result<Shape, CodecError> {
    match read_u8(r)? {
        SHAPE_POLYGON => Ok(Shape::Polygon {
            vertices: read_vertices(r)?,
        }),
        SHAPE_CIRCLE => Ok(Shape::Circle {
            radius: read_f32_le(r)?,
        }),
        value => Err(CodecError::InvalidEnum {
            name: "Shape",
            value,
        }),
    }
}

// ── Messages ────────────────────────────────────────────────────

impl Wire for Body {
    const TAG: u8 = TAG_BODY;

    fn write_body(&self, w: &mut dyn Write) -> Result<(), CodecError> {
        write_vector(w, &self.position)?;
        write_f32_le(w, self.angle)?;
        write_seq(w, &self.shapes, write_shape)?;
        write_u8(w, self.color as u8)?;
        write_f32_le(w, self.diameter)?;
        write_u8(w, self.shape_type as u8)?;
        write_u8(w, self.body_type as u8)
    }

    fn read_body(r: &mut dyn Read) -> Result<Self, CodecError> {
        Ok(Body {
            position: read_vector(r)?,
            angle: read_f32_le(r)?,
            shapes: read_seq(r, read_shape)?,
            color: read_color(r)?,
            diameter: read_f32_le(r)?,
            shape_type: read_shape_type(r)?,
            body_type: read_body_type(r)?,
        })
    }
}

impl Wire for Scene {
    const TAG: u8 = TAG_SCENE;

    fn write_body(&self, w: &mut dyn Write) -> Result<(), CodecError> {
        write_u32_le(w, self.width)?;
        write_u32_le(w, self.height)?;
        write_seq(w, &self.bodies, |w, b| b.write_body(w))?;
        write_seq(w, &self.user_input_bodies, |w, b| b.write_body(w))?;
        write_u8(w, self.user_input_status as u8)
    }

    fn read_body(r: &mut dyn Read) -> Result<Self, CodecError> {
        Ok(Scene {
            width: read_u32_le(r)?,
            height: read_u32_le(r)?,
            bodies: read_seq(r, Body::read_body)?,
            user_input_bodies: read_seq(r, Body::read_body)?,
            user_input_status: read_user_input_status(r)?,
        })
    }
}

impl Wire for Task {
    const TAG: u8 = TAG_TASK;

    fn write_body(&self, w: &mut dyn Write) -> Result<(), CodecError> {
        write_length_prefixed_str(w, &self.task_id)?;
        self.scene.write_body(w)?;
        write_i32_le(w, self.body_id1)?;
        write_i32_le(w, self.body_id2)?;
        write_seq(w, &self.relationships, |w, rel| write_u8(w, *rel as u8))?;
        write_length_prefixed_str(w, &self.tier)
    }

    fn read_body(r: &mut dyn Read) -> Result<Self, CodecError> {
        Ok(Task {
            task_id: read_length_prefixed_str(r)?,
            scene: Scene::read_body(r)?,
            body_id1: read_i32_le(r)?,
            body_id2: read_i32_le(r)?,
            relationships: read_seq(r, read_relationship)?,
            tier: read_length_prefixed_str(r)?,
        })
    }
}

impl Wire for UserInput {
    const TAG: u8 = TAG_USER_INPUT;

    fn write_body(&self, w: &mut dyn Write) -> Result<(), CodecError> {
        write_seq(w, &self.flattened_point_list, |w, v| write_i32_le(w, *v))?;
        write_seq(w, &self.polygons, |w, p| write_vertices(w, &p.vertices))?;
        write_seq(w, &self.balls, |w, ball| {
            write_vector(w, &ball.position)?;
            write_f32_le(w, ball.radius)
        })
    }

    fn read_body(r: &mut dyn Read) -> Result<Self, CodecError> {
        Ok(UserInput {
            flattened_point_list: read_seq(r, read_i32_le)?,
            polygons: read_seq(r, |r| {
                Ok(AbsoluteConvexPolygon {
                    vertices: read_vertices(r)?,
                })
            })?,
            balls: read_seq(r, |r| {
                Ok(CircleWithPosition {
                    position: read_vector(r)?,
                    radius: read_f32_le(r)?,
                })
            })?,
        })
    }
}

impl Wire for TaskSimulation {
    const TAG: u8 = TAG_TASK_SIMULATION;

    fn write_body(&self, w: &mut dyn Write) -> Result<(), CodecError> {
        write_seq(w, &self.scene_list, |w, s| s.write_body(w))?;
        write_seq(w, &self.solved_state_list, |w, v| write_bool(w, *v))?;
        write_bool(w, self.is_solution)?;
        write_i32_le(w, self.steps_simulated)
    }

    fn read_body(r: &mut dyn Read) -> Result<Self, CodecError> {
        Ok(TaskSimulation {
            scene_list: read_seq(r, Scene::read_body)?,
            solved_state_list: read_seq(r, read_bool)?,
            is_solution: read_bool(r)?,
            steps_simulated: read_i32_le(r)?,
        })
    }
}
