//! Errors raised before a frame is rendered
//!
//! Nothing in the per-pixel loop can fail: bad input is rejected when the
//! camera, mesh or texture is built.

use super::math::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Look direction is zero or parallel to the +z up reference
    DegenerateDirection { direction: Vec3 },
    /// Frame with a zero dimension
    InvalidFrame { width: usize, height: usize },
    /// Field of view outside (0, 180) degrees, or not 0 < near < far
    InvalidLens { fov: f32, near: f32, far: f32 },
    /// Triangle index past the end of its attribute array
    IndexOutOfBounds {
        triangle: usize,
        attribute: &'static str,
        index: usize,
        len: usize,
    },
    /// RGB buffer whose length does not match width * height * 3
    TextureSize { width: usize, height: usize, len: usize },
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::DegenerateDirection { direction } => write!(
                f,
                "Degenerate camera direction ({}, {}, {}): must be non-zero and not parallel to +z",
                direction.x, direction.y, direction.z
            ),
            RenderError::InvalidFrame { width, height } => {
                write!(f, "Invalid frame size {}x{}", width, height)
            }
            RenderError::InvalidLens { fov, near, far } => write!(
                f,
                "Invalid lens: fov {} near {} far {} (need 0 < fov < 180, 0 < near < far)",
                fov, near, far
            ),
            RenderError::IndexOutOfBounds { triangle, attribute, index, len } => write!(
                f,
                "Triangle {} references {} index {} but only {} exist",
                triangle, attribute, index, len
            ),
            RenderError::TextureSize { width, height, len } => write!(
                f,
                "Texture {}x{} needs {} bytes of RGB data, got {}",
                width,
                height,
                width * height * 3,
                len
            ),
        }
    }
}

impl std::error::Error for RenderError {}
