//! Building [`UserInput`] from raw coordinate arrays.

use ndarray::{ArrayViewD, Ix2};
use phyre_core::{AbsoluteConvexPolygon, CircleWithPosition, InputError, UserInput, Vector};

/// Floats per rectangle: four `(x, y)` vertices.
pub const RECT_STRIDE: usize = 8;
/// Floats per ball: `x`, `y`, `radius`.
pub const BALL_STRIDE: usize = 3;

/// Build a [`UserInput`] from a points matrix and flat rectangle/ball arrays.
///
/// `points` must be an `N x 2` matrix of `(x, y)` pixel coordinates; any
/// other shape fails with an [`InputError`] before anything else happens.
/// Points are flattened row-major into an interleaved `x, y` list.
///
/// `rect_vertices_flat` is consumed 8 floats at a time, each stride giving
/// one polygon whose 4 vertices keep input order (no convexity or winding
/// check). `balls_flat` is consumed 3 floats at a time as `(x, y, radius)`.
/// A trailing partial stride is dropped and reported with a `warn!` event.
pub fn build_user_input(
    points: ArrayViewD<'_, i32>,
    rect_vertices_flat: &[f32],
    balls_flat: &[f32],
) -> Result<UserInput, InputError> {
    if points.ndim() != 2 {
        return Err(InputError::PointsRank {
            ndim: points.ndim(),
        });
    }
    if points.shape()[1] != 2 {
        return Err(InputError::PointsWidth {
            width: points.shape()[1],
        });
    }
    let points = points
        .into_dimensionality::<Ix2>()
        .map_err(|_| InputError::PointsRank { ndim: 2 })?;

    let mut flattened_point_list = Vec::with_capacity(points.nrows() * 2);
    for row in points.rows() {
        flattened_point_list.push(row[0]);
        flattened_point_list.push(row[1]);
    }

    let rects = rect_vertices_flat.chunks_exact(RECT_STRIDE);
    warn_partial_stride("rectangle vertices", RECT_STRIDE, rects.remainder().len());
    let polygons = rects
        .map(|rect| AbsoluteConvexPolygon {
            vertices: rect
                .chunks_exact(2)
                .map(|xy| Vector::new(xy[0], xy[1]))
                .collect(),
        })
        .collect();

    let balls = balls_flat.chunks_exact(BALL_STRIDE);
    warn_partial_stride("balls", BALL_STRIDE, balls.remainder().len());
    let balls = balls
        .map(|b| CircleWithPosition {
            position: Vector::new(b[0], b[1]),
            radius: b[2],
        })
        .collect();

    Ok(UserInput {
        flattened_point_list,
        polygons,
        balls,
    })
}

fn warn_partial_stride(input: &'static str, stride: usize, dropped: usize) {
    if dropped > 0 {
        tracing::warn!(
            input,
            stride,
            dropped,
            "input length is not a multiple of its stride; trailing values dropped"
        );
    }
}
