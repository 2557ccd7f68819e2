//! Camera transform stack
//!
//! World space is z-up. Camera space is right-handed with the camera looking
//! down -w, so every visible point has a negative camera-space z and the
//! near/far planes are passed in as negative values.

use super::error::RenderError;
use super::math::{Mat4, Vec3};

/// World-to-camera matrix for a camera at `origin` looking along `direction`.
///
/// `direction` must be non-zero and not parallel to the +z up reference.
pub fn build_view_matrix(origin: Vec3, direction: Vec3) -> Result<Mat4, RenderError> {
    let degenerate = || RenderError::DegenerateDirection { direction };

    let w = (-direction).try_normalize().ok_or_else(degenerate)?;
    let u = Vec3::UP.cross(w).try_normalize().ok_or_else(degenerate)?;
    let v = w.cross(u);

    let rotate = Mat4::from_basis_rows(u, v, w);
    let translate = Mat4::translation(-origin);
    Ok(rotate * translate)
}

/// Camera-to-screen matrix: perspective, then the symmetric frustum to the
/// canonical cube, then the viewport.
///
/// `near` and `far` are the signed camera-space plane positions
/// (`far < near < 0`). After the homogeneous divide:
/// - x lands in [-0.5, frame_width - 0.5], pixel centres on integers
/// - y is flipped so row 0 is the top of the image
/// - z lands in [far, near]; larger is nearer
pub fn build_projection_viewport_matrix(
    frame_width: usize,
    frame_height: usize,
    fov_degrees: f32,
    near: f32,
    far: f32,
) -> Mat4 {
    let (n, f) = (near, far);
    let nx = frame_width as f32;
    let ny = frame_height as f32;

    // Half extents of the near plane
    let t = n.abs() * (std::f32::consts::PI * fov_degrees / 360.0).tan();
    let r = t * (nx / ny);

    let perspective = Mat4::from_rows([
        [n, 0.0, 0.0, 0.0],
        [0.0, n, 0.0, 0.0],
        [0.0, 0.0, n + f, -n * f],
        [0.0, 0.0, 1.0, 0.0],
    ]);

    let orthographic = Mat4::from_rows([
        [1.0 / r, 0.0, 0.0, 0.0],
        [0.0, 1.0 / t, 0.0, 0.0],
        [0.0, 0.0, 2.0 / (n - f), -(n + f) / (n - f)],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    let viewport = Mat4::from_rows([
        [nx / 2.0, 0.0, 0.0, (nx - 1.0) / 2.0],
        [0.0, -ny / 2.0, 0.0, (ny - 1.0) / 2.0],
        [0.0, 0.0, (n - f) / 2.0, (n + f) / 2.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    viewport * orthographic * perspective
}
