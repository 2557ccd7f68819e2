//! Render configuration loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable config files.

use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use crate::rasterizer::{Camera, RasterSettings, RenderError, Vec3};

/// Error type for config loading and frame output
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    RenderError(RenderError),
    ImageError(image::ImageError),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::SerializeError(e)
    }
}

impl From<RenderError> for ConfigError {
    fn from(e: RenderError) -> Self {
        ConfigError::RenderError(e)
    }
}

impl From<image::ImageError> for ConfigError {
    fn from(e: image::ImageError) -> Self {
        ConfigError::ImageError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            ConfigError::RenderError(e) => write!(f, "Render error: {}", e),
            ConfigError::ImageError(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Everything needed to set up a render loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub frame_width: usize,
    pub frame_height: usize,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Draw distances, both positive
    pub near: f32,
    pub far: f32,
    pub origin: Vec3,
    pub direction: Vec3,
    /// Number of frames to render
    pub frames: usize,
    /// Added to every origin component after each frame
    pub step: f32,
    /// Where the last frame is written
    pub output: String,
    pub settings: RasterSettings,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frame_width: 640,
            frame_height: 480,
            fov: 30.0,
            near: 0.01,
            far: 15.0,
            origin: Vec3::new(5.0, 5.0, 5.0),
            direction: Vec3::new(-0.5774, -0.5774, -0.5774),
            frames: 1,
            step: 0.0,
            output: "frame.png".to_string(),
            settings: RasterSettings::default(),
        }
    }
}

impl RenderConfig {
    /// Validate the camera parameters and build the camera
    pub fn build_camera(&self) -> Result<Camera, RenderError> {
        let cam = Camera::new(
            self.frame_width,
            self.frame_height,
            self.origin,
            self.direction,
            self.fov,
            self.near,
            self.far,
        )?;
        Ok(cam.with_settings(self.settings.clone()))
    }

    /// Camera origin for frame `index`
    pub fn origin_at(&self, index: usize) -> Vec3 {
        let offset = self.step * index as f32;
        self.origin + Vec3::new(offset, offset, offset)
    }
}

/// Load a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RenderConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Load a config from a RON string
pub fn load_config_from_str(s: &str) -> Result<RenderConfig, ConfigError> {
    Ok(ron::from_str(s)?)
}

/// Save a config to a RON file
pub fn save_config<P: AsRef<Path>>(config: &RenderConfig, path: P) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Write the camera's color buffer as an image; format follows the extension
pub fn save_frame<P: AsRef<Path>>(camera: &Camera, path: P) -> Result<(), ConfigError> {
    let path = path.as_ref();
    image::save_buffer(
        path,
        camera.color_buffer(),
        camera.frame_width() as u32,
        camera.frame_height() as u32,
        image::ColorType::Rgb8,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::ShadingMode;

    #[test]
    fn test_parse_partial_config() {
        let config = load_config_from_str(
            "(
                frame_width: 64,
                frame_height: 64,
                fov: 30.0,
                near: 1.0,
                far: 50.0,
                origin: (x: 4.0, y: 4.0, z: 4.0),
                direction: (x: -1.0, y: -1.0, z: -1.0),
                settings: (shading: Diffuse, lights: [(position: (x: 0.0, y: 0.0, z: 9.0), intensity: 0.7)]),
            )",
        )
        .unwrap();

        assert_eq!(config.frame_width, 64);
        assert_eq!(config.origin, Vec3::new(4.0, 4.0, 4.0));
        assert_eq!(config.frames, 1);
        assert_eq!(config.output, "frame.png");
        assert_eq!(config.settings.shading, ShadingMode::Diffuse);
        assert_eq!(config.settings.lights.len(), 1);
        assert!(config.settings.backface_cull);

        let cam = config.build_camera().unwrap();
        assert_eq!(cam.frame_width(), 64);
        assert_eq!(cam.empty_depth(), -50.0);
        assert_eq!(cam.settings.shading, ShadingMode::Diffuse);
    }

    #[test]
    fn test_demo_config_parses() {
        let config = load_config_from_str(include_str!("../demos/cube.ron")).unwrap();
        assert_eq!(config.frames, 60);
        assert!(config.build_camera().is_ok());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            load_config_from_str("(frame_width: \"wide\")"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_build_camera_rejects_bad_lens() {
        let config = RenderConfig { near: 5.0, far: 1.0, ..RenderConfig::default() };
        assert!(matches!(config.build_camera(), Err(RenderError::InvalidLens { .. })));
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join(format!("softraster-config-{}.ron", std::process::id()));
        let config = RenderConfig { frames: 12, step: 0.01, ..RenderConfig::default() };
        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_origin_steps_per_frame() {
        let config = RenderConfig { step: 0.5, ..RenderConfig::default() };
        assert_eq!(config.origin_at(0), config.origin);
        assert_eq!(config.origin_at(2), Vec3::new(6.0, 6.0, 6.0));
    }
}
