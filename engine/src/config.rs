//! Engine configuration, read from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,
    pub render: RenderConfig,
    pub session: SessionMode,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    /// `env_logger` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            render: RenderConfig::default(),
            session: SessionMode::default(),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "prism".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// 4x multisampling when the surface format supports it.
    pub antialias: bool,
    /// Clear to a fully transparent background.
    pub transparent: bool,
    pub vsync: bool,
    pub background: [f32; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            antialias: true,
            transparent: false,
            vsync: true,
            background: [0.05, 0.05, 0.08],
        }
    }
}

/// How the session is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    /// Rendered into a desktop window.
    #[default]
    Inline,
    /// Passthrough augmented reality on a head-mounted display.
    ImmersiveAr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    /// Orbit pivot and initial look-at point.
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 70.0,
            near: 0.01,
            far: 40.0,
            position: [0.0, 1.6, 6.0],
            target: [0.0, 1.6, 0.0],
        }
    }
}

impl CameraConfig {
    pub fn build(&self, width: u32, height: u32) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(self.fov, 1.0, self.near, self.far);
        camera.resize(width, height);
        camera.set_position(Vec3::from(self.position));
        camera.set_target(Vec3::from(self.target));
        camera
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        let orbit = OrbitControls::default();
        Self {
            enable_damping: orbit.enable_damping,
            damping_factor: orbit.damping_factor,
            rotate_speed: orbit.rotate_speed,
            zoom_speed: orbit.zoom_speed,
            min_distance: orbit.min_distance,
            max_distance: orbit.max_distance,
        }
    }
}

impl ControlsConfig {
    pub fn build(&self, target: Vec3) -> OrbitControls {
        let mut controls = OrbitControls::with_target(target);
        controls.enable_damping = self.enable_damping;
        controls.damping_factor = self.damping_factor;
        controls.rotate_speed = self.rotate_speed;
        controls.zoom_speed = self.zoom_speed;
        controls.min_distance = self.min_distance;
        controls.max_distance = self.max_distance;
        controls
    }
}
