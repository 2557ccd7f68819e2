//! Software triangle rasterizer
//!
//! Features:
//! - Camera matrix stack (view, perspective, canonical volume, viewport)
//! - Incremental edge-function scan conversion with a fixed shared-edge rule
//! - Persistent z-buffer
//! - Affine texture mapping, nearest-neighbour sampling with wraparound
//! - Optional point-light diffuse and fresnel shading

mod camera;
mod error;
mod math;
mod render;
mod shading;
mod transform;
mod types;

pub use camera::*;
pub use error::*;
pub use math::*;
pub use render::*;
pub use shading::*;
pub use transform::*;
pub use types::*;
