//! Camera: pose, cached transforms and the frame it renders into

use super::error::RenderError;
use super::math::{Mat4, Vec3};
use super::transform::{build_projection_viewport_matrix, build_view_matrix};
use super::types::{Color, RasterSettings};

/// Color and depth buffers for software rendering.
///
/// Rows run top to bottom; pixel (x, y) lives at index `width * y + x`.
/// Depth grows toward the camera, so a fragment wins when its depth is
/// strictly greater than the stored one.
pub struct Framebuffer {
    pub pixels: Vec<u8>,   // RGB, 3 bytes per pixel
    pub zbuffer: Vec<f32>, // Depth buffer
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize, clear_depth: f32) -> Self {
        Self {
            pixels: vec![0; width * height * 3],
            zbuffer: vec![clear_depth; width * height],
            width,
            height,
        }
    }

    /// Zero the colors and push every depth back to `clear_depth`
    pub fn clear(&mut self, clear_depth: f32) {
        self.pixels.fill(0);
        self.zbuffer.fill(clear_depth);
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            let i = (y * self.width + x) * 3;
            Some(Color::new(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
        } else {
            None
        }
    }

    pub fn get_depth(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.zbuffer[y * self.width + x])
        } else {
            None
        }
    }

    /// True when depth `z` would beat what is stored at (x, y)
    pub fn depth_test(&self, x: usize, y: usize, z: f32) -> bool {
        x < self.width && y < self.height && z > self.zbuffer[y * self.width + x]
    }

    pub fn set_pixel_with_depth(&mut self, x: usize, y: usize, z: f32, color: Color) -> bool {
        if self.depth_test(x, y, z) {
            let idx = y * self.width + x;
            self.zbuffer[idx] = z;
            self.pixels[idx * 3..idx * 3 + 3].copy_from_slice(&color.to_bytes());
            return true;
        }
        false
    }
}

/// A camera that owns the frame it renders into.
///
/// The view matrix follows every `move_to`; the projection-viewport matrix
/// only changes with frame size or lens.
pub struct Camera {
    pub(super) origin: Vec3,
    pub(super) direction: Vec3,
    pub(super) fov: f32,
    /// Camera-space near plane (negative)
    pub(super) near: f32,
    /// Camera-space far plane (negative); also the empty depth value
    pub(super) far: f32,
    pub(super) view: Mat4,
    pub(super) projection_viewport: Mat4,
    pub(super) frame: Framebuffer,
    pub settings: RasterSettings,

    // Projection pass output, reused between frames
    pub(super) screen_positions: Vec<Vec3>,
    pub(super) view_positions: Vec<Vec3>,
    pub(super) view_normals: Vec<Vec3>,
}

impl Camera {
    /// `near` and `far` are positive draw distances along the view direction
    pub fn new(
        frame_width: usize,
        frame_height: usize,
        origin: Vec3,
        direction: Vec3,
        fov: f32,
        near: f32,
        far: f32,
    ) -> Result<Self, RenderError> {
        check_frame(frame_width, frame_height)?;
        check_lens(fov, near, far)?;
        let view = build_view_matrix(origin, direction)?;
        let projection_viewport =
            build_projection_viewport_matrix(frame_width, frame_height, fov, -near, -far);

        log::debug!(
            "Camera {}x{} fov {} draw distance {}..{}",
            frame_width,
            frame_height,
            fov,
            near,
            far
        );

        Ok(Self {
            origin,
            direction,
            fov,
            near: -near,
            far: -far,
            view,
            projection_viewport,
            frame: Framebuffer::new(frame_width, frame_height, -far),
            settings: RasterSettings::default(),
            screen_positions: Vec::new(),
            view_positions: Vec::new(),
            view_normals: Vec::new(),
        })
    }

    pub fn with_settings(mut self, settings: RasterSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Clear the frame: black colors, depth at the far plane
    pub fn reset(&mut self) {
        self.frame.clear(self.far);
    }

    /// Re-pose the camera. Only the view matrix is rebuilt; on a degenerate
    /// direction the previous pose is kept.
    pub fn move_to(&mut self, origin: Vec3, direction: Vec3) -> Result<(), RenderError> {
        self.view = build_view_matrix(origin, direction)?;
        self.origin = origin;
        self.direction = direction;
        Ok(())
    }

    /// Change the frame size, reallocating both buffers
    pub fn resize(&mut self, frame_width: usize, frame_height: usize) -> Result<(), RenderError> {
        check_frame(frame_width, frame_height)?;
        self.frame = Framebuffer::new(frame_width, frame_height, self.far);
        self.rebuild_projection();
        Ok(())
    }

    /// Change field of view and draw distances
    pub fn set_lens(&mut self, fov: f32, near: f32, far: f32) -> Result<(), RenderError> {
        check_lens(fov, near, far)?;
        self.fov = fov;
        self.near = -near;
        self.far = -far;
        self.rebuild_projection();
        self.reset();
        Ok(())
    }

    fn rebuild_projection(&mut self) {
        self.projection_viewport = build_projection_viewport_matrix(
            self.frame.width,
            self.frame.height,
            self.fov,
            self.near,
            self.far,
        );
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn frame_width(&self) -> usize {
        self.frame.width
    }

    pub fn frame_height(&self) -> usize {
        self.frame.height
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view
    }

    pub fn projection_viewport_matrix(&self) -> &Mat4 {
        &self.projection_viewport
    }

    /// RGB bytes, row 0 at the top
    pub fn color_buffer(&self) -> &[u8] {
        &self.frame.pixels
    }

    pub fn depth_buffer(&self) -> &[f32] {
        &self.frame.zbuffer
    }

    /// Depth value of an untouched pixel
    pub fn empty_depth(&self) -> f32 {
        self.far
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        self.frame.get_pixel(x, y)
    }

    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        self.frame.get_depth(x, y)
    }
}

fn check_frame(width: usize, height: usize) -> Result<(), RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidFrame { width, height });
    }
    Ok(())
}

fn check_lens(fov: f32, near: f32, far: f32) -> Result<(), RenderError> {
    let fov_ok = fov > 0.0 && fov < 180.0;
    let range_ok = near > 0.0 && far > near && far.is_finite();
    if !fov_ok || !range_ok {
        return Err(RenderError::InvalidLens { fov, near, far });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(32, 24, Vec3::new(0.0, -10.0, 0.0), Vec3::new(0.0, 1.0, 0.0), 60.0, 1.0, 100.0)
            .unwrap()
    }

    #[test]
    fn test_reset_clears_buffers() {
        let mut cam = camera();
        cam.frame.set_pixel_with_depth(3, 4, -5.0, Color::RED);
        assert_eq!(cam.pixel(3, 4), Some(Color::RED));

        cam.reset();
        assert!(cam.color_buffer().iter().all(|&b| b == 0));
        assert!(cam.depth_buffer().iter().all(|&z| z == -100.0));
        assert_eq!(cam.empty_depth(), -100.0);
        assert_eq!(cam.color_buffer().len(), 32 * 24 * 3);
    }

    #[test]
    fn test_move_keeps_projection() {
        let mut cam = camera();
        let projection = *cam.projection_viewport_matrix();
        let view = *cam.view_matrix();

        cam.move_to(Vec3::new(3.0, -10.0, 1.0), Vec3::new(-0.2, 1.0, 0.1)).unwrap();
        assert_eq!(*cam.projection_viewport_matrix(), projection);
        assert_ne!(*cam.view_matrix(), view);
        assert_eq!(cam.origin(), Vec3::new(3.0, -10.0, 1.0));
    }

    #[test]
    fn test_degenerate_move_keeps_pose() {
        let mut cam = camera();
        let view = *cam.view_matrix();
        let result = cam.move_to(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(matches!(result, Err(RenderError::DegenerateDirection { .. })));
        assert_eq!(*cam.view_matrix(), view);
        assert_eq!(cam.direction(), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_new_rejects_bad_parameters() {
        let origin = Vec3::new(0.0, -10.0, 0.0);
        let dir = Vec3::new(0.0, 1.0, 0.0);
        assert!(matches!(
            Camera::new(0, 10, origin, dir, 60.0, 1.0, 10.0),
            Err(RenderError::InvalidFrame { .. })
        ));
        assert!(matches!(
            Camera::new(10, 10, origin, dir, 60.0, 10.0, 1.0),
            Err(RenderError::InvalidLens { .. })
        ));
        assert!(Camera::new(10, 10, origin, dir, 180.0, 1.0, 10.0).is_err());
        assert!(Camera::new(10, 10, origin, Vec3::UP, 60.0, 1.0, 10.0).is_err());
    }

    #[test]
    fn test_resize_and_lens_rebuild_projection() {
        let mut cam = camera();
        let before = *cam.projection_viewport_matrix();

        cam.resize(64, 48).unwrap();
        assert_eq!(cam.frame_width(), 64);
        assert_eq!(cam.depth_buffer().len(), 64 * 48);
        assert_ne!(*cam.projection_viewport_matrix(), before);

        let resized = *cam.projection_viewport_matrix();
        cam.set_lens(30.0, 0.5, 20.0).unwrap();
        assert_ne!(*cam.projection_viewport_matrix(), resized);
        assert!(cam.depth_buffer().iter().all(|&z| z == -20.0));
    }

    #[test]
    fn test_depth_test_is_strict() {
        let mut fb = Framebuffer::new(4, 4, -10.0);
        assert!(fb.set_pixel_with_depth(1, 1, -5.0, Color::GREEN));
        assert!(!fb.set_pixel_with_depth(1, 1, -5.0, Color::RED));
        assert!(!fb.set_pixel_with_depth(1, 1, -7.0, Color::RED));
        assert!(fb.set_pixel_with_depth(1, 1, -2.0, Color::BLUE));
        assert_eq!(fb.get_pixel(1, 1), Some(Color::BLUE));
        assert!(!fb.set_pixel_with_depth(4, 0, 0.0, Color::RED));
    }
}
