//! Camera controls.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

use crate::camera::PerspectiveCamera;

/// Moves the camera once per tick, before the scene is drawn.
pub trait CameraControl {
    fn update(&mut self, camera: &mut PerspectiveCamera);
}

/// Orbit the camera around a target point.
///
/// Input (drag and wheel) accumulates between ticks and is applied in
/// [`CameraControl::update`]. With damping on, rotation input is spread
/// over several ticks and the camera glides to a stop.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub enable_damping: bool,
    /// Fraction of the pending rotation applied per tick, in `(0, 1]`.
    pub damping_factor: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
}

// Keeps the camera off the poles where the up vector degenerates.
const POLE_MARGIN: f32 = 0.1;

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            min_distance: 0.1,
            max_distance: 30.0,
            enable_rotate: true,
            enable_zoom: true,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            enable_damping: true,
            damping_factor: 0.05,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
        }
    }
}

impl OrbitControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(target: Vec3) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Queue a rotation by `delta_theta` (azimuth) and `delta_phi` (elevation), in radians.
    pub fn rotate(&mut self, delta_theta: f32, delta_phi: f32) {
        if self.enable_rotate {
            self.delta_theta -= delta_theta * self.rotate_speed;
            self.delta_phi += delta_phi * self.rotate_speed;
        }
    }

    /// Queue a rotation from a pointer drag, in pixels.
    pub fn rotate_by_pixels(&mut self, delta_x: f32, delta_y: f32) {
        let rotate_scale = 0.004;
        self.rotate(delta_x * rotate_scale, delta_y * rotate_scale);
    }

    /// Positive `delta` zooms in.
    pub fn zoom(&mut self, delta: f32) {
        if !self.enable_zoom {
            return;
        }
        if delta > 0.0 {
            self.scale /= 1.0 + delta * self.zoom_speed * 0.1;
        } else {
            self.scale *= 1.0 - delta * self.zoom_speed * 0.1;
        }
    }

    /// Drop any queued input.
    pub fn reset(&mut self) {
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
    }

    fn is_idle(&self) -> bool {
        self.delta_theta == 0.0 && self.delta_phi == 0.0 && self.scale == 1.0
    }
}

impl CameraControl for OrbitControls {
    fn update(&mut self, camera: &mut PerspectiveCamera) {
        if self.is_idle() {
            camera.set_target(self.target);
            return;
        }

        let offset = camera.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            self.reset();
            return;
        }

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).asin();

        if self.enable_damping {
            let factor = self.damping_factor.clamp(f32::EPSILON, 1.0);
            theta += self.delta_theta * factor;
            phi += self.delta_phi * factor;
            self.delta_theta *= 1.0 - factor;
            self.delta_phi *= 1.0 - factor;
            if self.delta_theta.abs() < 1e-6 {
                self.delta_theta = 0.0;
            }
            if self.delta_phi.abs() < 1e-6 {
                self.delta_phi = 0.0;
            }
        } else {
            theta += self.delta_theta;
            phi += self.delta_phi;
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }

        phi = phi.clamp(-FRAC_PI_2 + POLE_MARGIN, FRAC_PI_2 - POLE_MARGIN);

        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.scale = 1.0;

        let offset = Vec3::new(
            radius * phi.cos() * theta.sin(),
            radius * phi.sin(),
            radius * phi.cos() * theta.cos(),
        );
        camera.set_position(self.target + offset);
        camera.set_target(self.target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(position: Vec3) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::default();
        camera.set_position(position);
        camera
    }

    #[test]
    fn test_idle_update_keeps_position() {
        let mut controls = OrbitControls::with_target(Vec3::new(0.0, 1.6, 0.0));
        let mut camera = camera_at(Vec3::new(0.0, 1.6, 6.0));
        controls.update(&mut camera);
        assert_eq!(camera.position, Vec3::new(0.0, 1.6, 6.0));
        assert_eq!(camera.target, Vec3::new(0.0, 1.6, 0.0));
    }

    #[test]
    fn test_rotation_preserves_distance() {
        let mut controls = OrbitControls::new();
        controls.enable_damping = false;
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 5.0));
        controls.rotate(0.5, 0.2);
        controls.update(&mut camera);
        assert!((camera.position.length() - 5.0).abs() < 1e-4);
        assert!(camera.position.x.abs() > 0.1);
    }

    #[test]
    fn test_damping_spreads_rotation_over_ticks() {
        let mut controls = OrbitControls::new();
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 5.0));
        controls.rotate(1.0, 0.0);
        controls.update(&mut camera);
        let first = camera.position;
        controls.update(&mut camera);
        assert_ne!(first, camera.position);
    }

    #[test]
    fn test_elevation_is_clamped_off_the_pole() {
        let mut controls = OrbitControls::new();
        controls.enable_damping = false;
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 5.0));
        controls.rotate(0.0, 10.0);
        controls.update(&mut camera);
        let max_y = 5.0 * (FRAC_PI_2 - POLE_MARGIN).sin();
        assert!(camera.position.y <= max_y + 1e-4);
    }

    #[test]
    fn test_zoom_is_clamped_to_max_distance() {
        let mut controls = OrbitControls::new();
        controls.max_distance = 8.0;
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 5.0));
        for _ in 0..50 {
            controls.zoom(-1.0);
        }
        controls.update(&mut camera);
        assert!((camera.position.length() - 8.0).abs() < 1e-4);
    }
}
