use glam::{Mat4, Vec3};
use winit::event::KeyEvent;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::config::CameraConfig;
use crate::types::CameraUniform;

pub const CAMERA_ZOOM_SPEED: f32 = 0.1;
pub const CAMERA_ROTATION_SPEED: f32 = 0.03;
pub const MIN_DISTANCE: f32 = 1.0;
const MAX_PITCH: f32 = 1.5;

/// Direction of the key light, pointing from the light into the scene
pub const LIGHT_DIRECTION: Vec3 = Vec3::new(-0.5, -1.0, -0.3);
pub const AMBIENT: f32 = 0.6;

#[derive(Default, Clone, Copy)]
pub struct MovementState {
    pub zoom_in: bool,
    pub zoom_out: bool,
    pub orbit_left: bool,
    pub orbit_right: bool,
    pub tilt_up: bool,
    pub tilt_down: bool,
}

impl MovementState {
    const fn to_direction(&self, positive: bool, negative: bool) -> f32 {
        match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    /// (zoom, yaw, pitch)
    const fn velocity(&self) -> (f32, f32, f32) {
        (
            self.to_direction(self.zoom_in, self.zoom_out),
            self.to_direction(self.orbit_right, self.orbit_left),
            self.to_direction(self.tilt_up, self.tilt_down),
        )
    }
}

/// Perspective camera orbiting a fixed target
pub struct Camera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub movement: MovementState,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let target = Vec3::from_array(config.target);
        let offset = Vec3::from_array(config.position) - target;
        let distance = offset.length().max(MIN_DISTANCE);

        Self {
            target,
            distance,
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            fov: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
            movement: MovementState::default(),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.target
            + self.distance
                * Vec3::new(
                    self.yaw.sin() * self.pitch.cos(),
                    self.pitch.sin(),
                    self.yaw.cos() * self.pitch.cos(),
                )
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect.max(f32::EPSILON), self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }

    pub fn update(&mut self) {
        let (zoom, yaw, pitch) = self.movement.velocity();

        self.distance = (self.distance * (1.0 - zoom * CAMERA_ZOOM_SPEED)).clamp(MIN_DISTANCE, self.far * 0.5);
        self.yaw += yaw * CAMERA_ROTATION_SPEED;
        self.pitch = (self.pitch + pitch * CAMERA_ROTATION_SPEED).clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn to_uniform(&self, aspect: f32) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection(aspect).to_cols_array_2d(),
            eye: self.position().to_array(),
            ambient: AMBIENT,
            light_dir: LIGHT_DIRECTION.normalize().to_array(),
            _pad: 0.0,
        }
    }

    pub fn process_keyboard(&mut self, event: &KeyEvent) {
        let is_pressed = event.state.is_pressed();
        if let PhysicalKey::Code(keycode) = event.physical_key {
            match keycode {
                KeyCode::KeyW => self.movement.zoom_in = is_pressed,
                KeyCode::KeyS => self.movement.zoom_out = is_pressed,
                KeyCode::KeyA => self.movement.orbit_left = is_pressed,
                KeyCode::KeyD => self.movement.orbit_right = is_pressed,
                KeyCode::KeyQ => self.movement.tilt_down = is_pressed,
                KeyCode::KeyE => self.movement.tilt_up = is_pressed,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_orbit_reproduces_config_position() {
        let config = CameraConfig::default();
        let camera = Camera::new(&config);
        assert!(approx(camera.position(), Vec3::from_array(config.position)));
    }

    #[test]
    fn test_zoom_keeps_direction() {
        let mut camera = Camera::new(&CameraConfig::default());
        let before = camera.position().normalize();
        camera.movement.zoom_in = true;
        camera.update();
        assert!(camera.distance < Vec3::new(6.0, 6.0, 8.0).length());
        assert!(approx(camera.position().normalize(), before));
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = Camera::new(&CameraConfig::default());
        camera.movement.tilt_up = true;
        for _ in 0..200 {
            camera.update();
        }
        assert!(camera.pitch <= MAX_PITCH);
    }

    #[test]
    fn test_target_projects_to_center() {
        let camera = Camera::new(&CameraConfig::default());
        let clip = camera.view_projection(16.0 / 9.0) * camera.target.extend(1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
    }
}
