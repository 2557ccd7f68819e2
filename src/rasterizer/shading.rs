//! Per-fragment lighting for `ShadingMode::Diffuse`
//!
//! All vectors are in camera space, so the eye sits at the origin.

use super::math::{Mat4, Vec3};
use super::types::{Color, Light};

/// Move world-space lights into camera space, once per frame
pub fn lights_to_camera(lights: &[Light], view: &Mat4) -> Vec<Light> {
    lights
        .iter()
        .map(|light| Light::new(view.transform_point(light.position), light.intensity))
        .collect()
}

/// Diffuse intensity of `normal` at `position`, summed over all lights
pub fn diffuse(normal: Vec3, position: Vec3, lights: &[Light]) -> f32 {
    lights
        .iter()
        .map(|light| {
            let to_light = (light.position - position).normalize();
            light.intensity * normal.dot(to_light).max(0.0)
        })
        .sum()
}

/// Rim term: strongest where the surface is seen edge-on
pub fn fresnel(normal: Vec3, position: Vec3, strength: f32) -> f32 {
    let view = position.normalize();
    strength * 255.0 * (1.0 - normal.dot(view).abs())
}

/// Scale the texel by the diffuse term and add the rim, clipping at 255
pub fn shade(texel: Color, normal: Vec3, position: Vec3, lights: &[Light], rim: f32) -> Color {
    let normal = normal.normalize();
    let illum = diffuse(normal, position, lights);
    let add = fresnel(normal, position, rim);

    Color::from_f32(
        texel.r as f32 * illum + add,
        texel.g as f32 * illum + add,
        texel.b as f32 * illum + add,
    )
}
