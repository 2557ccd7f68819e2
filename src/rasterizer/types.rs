//! Core types for the rasterizer

use serde::{Serialize, Deserialize};
use super::error::RenderError;
use super::math::{Vec2, Vec3};

/// RGB color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from float channels, clipping each to 0-255
    pub fn from_f32(r: f32, g: f32, b: f32) -> Self {
        let clip = |c: f32| c.clamp(0.0, 255.0) as u8;
        Self { r: clip(r), g: clip(g), b: clip(b) }
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// One triangle of a mesh.
///
/// Attributes are indexed independently (OBJ style): corner `i` uses
/// `positions[i]`, `normals[i]` and `texcoords[i]` of the owning mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub positions: [usize; 3],
    pub normals: [usize; 3],
    pub texcoords: [usize; 3],
}

impl Triangle {
    pub fn new(positions: [usize; 3], normals: [usize; 3], texcoords: [usize; 3]) -> Self {
        Self { positions, normals, texcoords }
    }
}

/// Triangle mesh with independently indexed attributes.
///
/// Every triangle index is checked against its attribute array when the
/// mesh is built, so the rasterizer can index without bounds failures.
#[derive(Debug, Clone)]
pub struct Mesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        texcoords: Vec<Vec2>,
        triangles: Vec<Triangle>,
    ) -> Result<Self, RenderError> {
        for (i, tri) in triangles.iter().enumerate() {
            check_indices(i, "position", &tri.positions, positions.len())?;
            check_indices(i, "normal", &tri.normals, normals.len())?;
            check_indices(i, "texcoord", &tri.texcoords, texcoords.len())?;
        }

        log::debug!(
            "Mesh: {} vertices, {} normals, {} texcoords, {} triangles",
            positions.len(),
            normals.len(),
            texcoords.len(),
            triangles.len()
        );

        Ok(Self { positions, normals, texcoords, triangles })
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn texcoords(&self) -> &[Vec2] {
        &self.texcoords
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Unit cube spanning -1..1 on every axis, two triangles per face
    pub fn cube() -> Self {
        let positions = vec![
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ];

        let normals = vec![
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
        ];

        let texcoords = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];

        // Corners of each face counter-clockwise seen from outside, with its normal
        let faces: [([usize; 4], usize); 6] = [
            ([1, 2, 6, 5], 0), // +x
            ([3, 0, 4, 7], 1), // -x
            ([2, 3, 7, 6], 2), // +y
            ([0, 1, 5, 4], 3), // -y
            ([4, 5, 6, 7], 4), // +z
            ([3, 2, 1, 0], 5), // -z
        ];

        let mut triangles = Vec::with_capacity(12);
        for (quad, normal) in faces {
            let n = [normal; 3];
            triangles.push(Triangle::new([quad[0], quad[1], quad[2]], n, [0, 1, 2]));
            triangles.push(Triangle::new([quad[2], quad[3], quad[0]], n, [2, 3, 0]));
        }

        Self { positions, normals, texcoords, triangles }
    }
}

fn check_indices(
    triangle: usize,
    attribute: &'static str,
    indices: &[usize; 3],
    len: usize,
) -> Result<(), RenderError> {
    match indices.iter().find(|&&index| index >= len) {
        Some(&index) => Err(RenderError::IndexOutOfBounds { triangle, attribute, index, len }),
        None => Ok(()),
    }
}

/// RGB texture, rows stored top to bottom
#[derive(Debug, Clone)]
pub struct Texture {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Texture {
    /// Wrap a decoded RGB buffer of `width * height * 3` bytes
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, RenderError> {
        if width == 0 || height == 0 || data.len() != width * height * 3 {
            return Err(RenderError::TextureSize { width, height, len: data.len() });
        }
        Ok(Self { width, height, data })
    }

    /// Single texel texture
    pub fn solid(color: Color) -> Self {
        Self { width: 1, height: 1, data: color.to_bytes().to_vec() }
    }

    /// Create a checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                let color = if checker { color1 } else { color2 };
                data.extend_from_slice(&color.to_bytes());
            }
        }
        Self { width, height, data }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Nearest-neighbour lookup with repeat addressing.
    ///
    /// `t` runs bottom to top, so it is flipped against the row order.
    pub fn sample(&self, s: f32, t: f32) -> Color {
        let w = self.width as i64;
        let h = self.height as i64;

        let u = (self.width as f32 * s + 0.5).floor() as i64;
        let v = (self.height as f32 * (1.0 - t) + 0.5).floor() as i64;

        // NaN casts to 0, so every coordinate lands on some texel
        let u = u.rem_euclid(w) as usize;
        let v = v.rem_euclid(h) as usize;

        let i = 3 * (v * self.width + u);
        Color::new(self.data[i], self.data[i + 1], self.data[i + 2])
    }
}

/// Shading mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadingMode {
    /// Raw texel color
    #[default]
    Unlit,
    /// Point-light diffuse term plus a fresnel rim
    Diffuse,
}

/// Point light, positioned in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub position: Vec3,
    pub intensity: f32,
}

impl Light {
    pub fn new(position: Vec3, intensity: f32) -> Self {
        Self { position, intensity }
    }
}

/// Rasterizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Skip triangles whose camera-space normal faces away
    pub backface_cull: bool,
    /// Stop scanning a row once it has left the triangle
    pub early_row_exit: bool,
    pub shading: ShadingMode,
    /// Lights used by `ShadingMode::Diffuse`
    pub lights: Vec<Light>,
    /// Rim strength used by `ShadingMode::Diffuse`
    pub fresnel: f32,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            backface_cull: true,
            early_row_exit: true,
            shading: ShadingMode::Unlit,
            lights: Vec::new(),
            fresnel: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip() -> Texture {
        // 4x1: red, green, blue, white
        let data = [Color::RED, Color::GREEN, Color::BLUE, Color::WHITE]
            .iter()
            .flat_map(|c| c.to_bytes())
            .collect();
        Texture::new(4, 1, data).unwrap()
    }

    #[test]
    fn test_sample_nearest() {
        let tex = strip();
        assert_eq!(tex.sample(0.0, 0.5), Color::RED);
        assert_eq!(tex.sample(0.3, 0.5), Color::GREEN);
        assert_eq!(tex.sample(0.5, 0.5), Color::BLUE);
        assert_eq!(tex.sample(0.75, 0.5), Color::WHITE);
    }

    #[test]
    fn test_sample_wraps_with_period_one() {
        let tex = strip();
        assert_eq!(tex.sample(1.5, 0.5), tex.sample(0.5, 0.5));
        assert_eq!(tex.sample(-0.25, 0.5), tex.sample(0.75, 0.5));
        assert_eq!(tex.sample(-3.5, 0.5), tex.sample(0.5, 0.5));
    }

    #[test]
    fn test_sample_flips_t() {
        // 1x2: top row red, bottom row blue
        let data = [Color::RED, Color::BLUE].iter().flat_map(|c| c.to_bytes()).collect();
        let tex = Texture::new(1, 2, data).unwrap();
        assert_eq!(tex.sample(0.0, 0.9), Color::RED);
        assert_eq!(tex.sample(0.0, 0.6), Color::BLUE);
        assert_eq!(tex.sample(0.0, 1.6), tex.sample(0.0, 0.6));
    }

    #[test]
    fn test_sample_nan_does_not_panic() {
        let tex = strip();
        let _ = tex.sample(f32::NAN, f32::INFINITY);
    }

    #[test]
    fn test_texture_rejects_wrong_length() {
        assert!(matches!(
            Texture::new(2, 2, vec![0; 11]),
            Err(RenderError::TextureSize { width: 2, height: 2, len: 11 })
        ));
        assert!(Texture::new(0, 4, Vec::new()).is_err());
    }

    #[test]
    fn test_mesh_rejects_out_of_range_index() {
        let positions = vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        let normals = vec![Vec3::UP];
        let texcoords = vec![Vec2::default()];

        let bad_normal = Triangle::new([0, 1, 2], [0, 0, 1], [0, 0, 0]);
        let err = Mesh::new(positions.clone(), normals.clone(), texcoords.clone(), vec![bad_normal])
            .unwrap_err();
        assert_eq!(
            err,
            RenderError::IndexOutOfBounds { triangle: 0, attribute: "normal", index: 1, len: 1 }
        );

        let good = Triangle::new([0, 1, 2], [0, 0, 0], [0, 0, 0]);
        let bad_position = Triangle::new([0, 1, 3], [0, 0, 0], [0, 0, 0]);
        let err = Mesh::new(positions, normals, texcoords, vec![good, bad_position]).unwrap_err();
        assert!(matches!(err, RenderError::IndexOutOfBounds { triangle: 1, attribute: "position", .. }));
    }

    #[test]
    fn test_cube_is_valid() {
        let cube = Mesh::cube();
        assert_eq!(cube.triangles().len(), 12);
        let rebuilt = Mesh::new(
            cube.positions().to_vec(),
            cube.normals().to_vec(),
            cube.texcoords().to_vec(),
            cube.triangles().to_vec(),
        );
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let cube = Mesh::cube();
        for tri in cube.triangles() {
            let [a, b, c] = tri.positions.map(|i| cube.positions()[i]);
            let centroid = (a + b + c) * (1.0 / 3.0);
            let winding = (b - a).cross(c - a);
            let normal = cube.normals()[tri.normals[0]];
            assert!(centroid.dot(normal) > 0.0);
            assert!(winding.dot(normal) > 0.0);
        }
    }
}
