//! Core rendering functions
//! Projection pass, edge-function scan conversion and shading

use super::camera::Camera;
use super::math::{max3, min3, Vec2, Vec3};
use super::shading::{lights_to_camera, shade};
use super::types::{Mesh, ShadingMode, Texture};

/// Reference point for the shared-edge tie-break. Pixels exactly on an edge
/// belong to the triangle that has this point on its inner side.
const OFFSCREEN: (f32, f32) = (-1.0, -1.0);

/// Used instead when an edge's line passes through `OFFSCREEN`. The only
/// line through both points is y = -1, which no pixel lies on.
const OFFSCREEN_FALLBACK: (f32, f32) = (-2.0, -1.0);

/// Counters for one `rasterize` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub triangles: usize,
    pub culled: usize,
    /// Fragments that passed the depth test and were written
    pub fragments: usize,
}

/// A pixel covered by a triangle, with its barycentric weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub x: usize,
    pub y: usize,
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
}

/// Implicit line through p0 -> p1 evaluated at (x, y): twice the signed area
/// of the triangle (p0, p1, (x, y)).
pub fn edge_function(p0: Vec3, p1: Vec3, x: f32, y: f32) -> f32 {
    (p0.y - p1.y) * x + (p1.x - p0.x) * y + p0.x * p1.y - p1.x * p0.y
}

/// One edge, stepped across the bounding box by additions only
struct Edge {
    /// Value at the opposite vertex; normalizes the edge to a barycentric
    area: f32,
    /// Whether zero-valued pixels on this edge are kept
    owns_boundary: bool,
    step_x: f32,
    step_y: f32,
}

impl Edge {
    fn new(p0: Vec3, p1: Vec3, opposite: Vec3) -> Self {
        let area = edge_function(p0, p1, opposite.x, opposite.y);
        let mut reference = edge_function(p0, p1, OFFSCREEN.0, OFFSCREEN.1);
        if reference == 0.0 {
            reference = edge_function(p0, p1, OFFSCREEN_FALLBACK.0, OFFSCREEN_FALLBACK.1);
        }
        Self {
            area,
            owns_boundary: area * reference > 0.0,
            step_x: p0.y - p1.y,
            step_y: p1.x - p0.x,
        }
    }

    /// Barycentric weight and whether it admits the pixel
    fn weight(&self, value: f32) -> (f32, bool) {
        let weight = value / self.area;
        let inside = weight > 0.0 || (weight == 0.0 && self.owns_boundary);
        (weight, inside)
    }
}

/// Scan-convert a screen-space triangle, calling `emit` once per covered
/// pixel inside the frame. Returns the number of pixels emitted.
///
/// Vertices are (x, y) pixel coordinates with pixel centres on integers;
/// z is ignored here. Winding does not matter. Degenerate and non-finite
/// triangles cover nothing.
pub fn scan_triangle<F>(
    tri: &[Vec3; 3],
    frame_width: usize,
    frame_height: usize,
    early_row_exit: bool,
    mut emit: F,
) -> usize
where
    F: FnMut(Fragment),
{
    let [v0, v1, v2] = *tri;
    if frame_width == 0 || frame_height == 0 {
        return 0;
    }
    if !(v0.is_finite() && v1.is_finite() && v2.is_finite()) {
        return 0;
    }

    let a = Edge::new(v1, v2, v0);
    let b = Edge::new(v2, v0, v1);
    let g = Edge::new(v0, v1, v2);
    if a.area == 0.0 || b.area == 0.0 || g.area == 0.0 {
        return 0;
    }

    // Bounding box, then its overlap with the frame
    let x_min = min3(v0.x, v1.x, v2.x).floor().max(0.0);
    let y_min = min3(v0.y, v1.y, v2.y).floor().max(0.0);
    let x_max = max3(v0.x, v1.x, v2.x).ceil().min((frame_width - 1) as f32);
    let y_max = max3(v0.y, v1.y, v2.y).ceil().min((frame_height - 1) as f32);
    if x_min > x_max || y_min > y_max {
        return 0;
    }

    let mut row_a = edge_function(v1, v2, x_min, y_min);
    let mut row_b = edge_function(v2, v0, x_min, y_min);
    let mut row_g = edge_function(v0, v1, x_min, y_min);

    let (x_start, x_end) = (x_min as usize, x_max as usize);
    let (y_start, y_end) = (y_min as usize, y_max as usize);
    let mut count = 0;

    for y in y_start..=y_end {
        let (mut fa, mut fb, mut fg) = (row_a, row_b, row_g);
        let mut entered = false;

        for x in x_start..=x_end {
            let (alpha, in_a) = a.weight(fa);
            let (beta, in_b) = b.weight(fb);
            let (_, in_g) = g.weight(fg);

            if in_a && in_b && in_g {
                entered = true;
                count += 1;
                emit(Fragment { x, y, alpha, beta, gamma: 1.0 - alpha - beta });
            } else if entered && early_row_exit {
                // Convex: a row never re-enters the triangle
                break;
            }

            fa += a.step_x;
            fb += b.step_x;
            fg += g.step_x;
        }

        row_a += a.step_y;
        row_b += b.step_y;
        row_g += g.step_y;
    }

    count
}

impl Camera {
    /// Render `mesh` with `texture` into this camera's frame.
    ///
    /// The frame is not cleared first; call `reset` between frames.
    pub fn rasterize(&mut self, mesh: &Mesh, texture: &Texture) -> RasterStats {
        self.project(mesh);

        let lights = match self.settings.shading {
            ShadingMode::Diffuse => lights_to_camera(&self.settings.lights, &self.view),
            ShadingMode::Unlit => Vec::new(),
        };

        let Camera {
            frame,
            settings,
            near,
            far,
            screen_positions,
            view_positions,
            view_normals,
            ..
        } = self;
        let depth_range = *far..=*near;
        let texcoords = mesh.texcoords();
        let mut stats = RasterStats::default();

        for tri in mesh.triangles() {
            stats.triangles += 1;

            let normals = tri.normals.map(|i| view_normals[i]);
            if settings.backface_cull {
                let face = (normals[0] + normals[1] + normals[2]).normalize();
                if face.z < 0.0 {
                    stats.culled += 1;
                    continue;
                }
            }

            let screen = tri.positions.map(|i| screen_positions[i]);
            let [uv0, uv1, uv2] = tri.texcoords.map(|i| texcoords[i]);
            let width = frame.width;
            let height = frame.height;

            scan_triangle(&screen, width, height, settings.early_row_exit, |frag| {
                let Fragment { x, y, alpha, beta, gamma } = frag;
                let z = alpha * screen[0].z + beta * screen[1].z + gamma * screen[2].z;
                if !depth_range.contains(&z) || !frame.depth_test(x, y, z) {
                    return;
                }

                let uv = Vec2::blend(uv0, uv1, uv2, alpha, beta, gamma);
                let texel = texture.sample(uv.x, uv.y);
                let color = match settings.shading {
                    ShadingMode::Unlit => texel,
                    ShadingMode::Diffuse => {
                        let [p0, p1, p2] = tri.positions.map(|i| view_positions[i]);
                        let normal = Vec3::blend(normals[0], normals[1], normals[2], alpha, beta, gamma);
                        let position = Vec3::blend(p0, p1, p2, alpha, beta, gamma);
                        shade(texel, normal, position, &lights, settings.fresnel)
                    }
                };

                if frame.set_pixel_with_depth(x, y, z, color) {
                    stats.fragments += 1;
                }
            });
        }

        log::trace!(
            "Rasterized {} triangles ({} culled), {} fragments",
            stats.triangles,
            stats.culled,
            stats.fragments
        );
        stats
    }

    /// Projection pass: every position to screen space, every normal to
    /// camera space. Runs once per frame, before any triangle.
    fn project(&mut self, mesh: &Mesh) {
        let screen = self.projection_viewport * self.view;
        let normal_matrix = self
            .view
            .upper_left()
            .normal_matrix()
            .unwrap_or_else(|| self.view.upper_left());

        self.screen_positions.clear();
        self.screen_positions
            .extend(mesh.positions().iter().map(|&p| screen.transform_point(p)));

        self.view_normals.clear();
        self.view_normals
            .extend(mesh.normals().iter().map(|&n| (normal_matrix * n).normalize()));

        self.view_positions.clear();
        if self.settings.shading == ShadingMode::Diffuse {
            let view = self.view;
            self.view_positions
                .extend(mesh.positions().iter().map(|&p| view.transform_point(p)));
        }
    }
}
