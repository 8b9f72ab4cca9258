use std::collections::HashSet;

use glam::{Mat4, Vec3};

use crate::input::{Key, MouseButton};

const MIN_RADIUS: f32 = 1.;
const MAX_RADIUS: f32 = 900.;
const MAX_ZENITH: f32 = 89.;

/// A camera orbiting around a target point
pub struct Camera {
    /// The point the camera looks at
    target: Vec3,
    /// Distance from the target
    radius: f32,
    /// Horizontal angle around the target in degrees, 0 looks down -Z
    azimuth: f32,
    /// Vertical angle in degrees
    zenith: f32,
    /// The 'up' vector
    up: Vec3,
    /// View parameters restored by the reset key
    initial: (Vec3, f32, f32, f32),
    /// Degrees per pixel of mouse drag
    pub look_sensitivity: f32,
    /// Degrees per second while an orbit key is held
    pub orbit_speed: f32,
    /// Units per second while a zoom key is held
    pub zoom_speed: f32,
    /// Units per wheel notch
    pub wheel_step: f32,
    /// Last x position of the mouse
    current_x: f32,
    /// Last y position of the mouse
    current_y: f32,
    /// Orbiting with the mouse is active
    dragging: bool,
    held_keys: HashSet<Key>,
    projection: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        Self {
            target: Vec3::ZERO,
            radius: 10.,
            azimuth: 0.,
            zenith: 0.,
            up: Vec3::Y,
            initial: (Vec3::ZERO, 10., 0., 0.),
            look_sensitivity: 0.4,
            orbit_speed: 90.,
            zoom_speed: 150.,
            wheel_step: 10.,
            current_x: 0.,
            current_y: 0.,
            dragging: false,
            held_keys: HashSet::new(),
            projection: Mat4::IDENTITY,
        }
    }

    /// Places the camera at `eye`, looking at `target`
    pub fn set_view_parameters(&mut self, eye: Vec3, target: Vec3) {
        let offset = eye - target;
        let radius = offset.length().clamp(MIN_RADIUS, MAX_RADIUS);

        let (azimuth, zenith) = if offset.length_squared() > 0. {
            let dir = offset.normalize();
            (
                dir.x.atan2(dir.z).to_degrees(),
                dir.y.asin().to_degrees().clamp(-MAX_ZENITH, MAX_ZENITH),
            )
        } else {
            (0., 0.)
        };

        self.target = target;
        self.radius = radius;
        self.azimuth = azimuth;
        self.zenith = zenith;
        self.initial = (target, radius, azimuth, zenith);
    }

    /// A zero height is treated as 1 so that a minimized window doesn't produce NaNs
    pub fn set_projection_parameters(
        &mut self,
        fov: f32,
        width: f32,
        height: f32,
        near: f32,
        far: f32,
    ) {
        let aspect = width.max(1.) / height.max(1.);
        self.projection = Mat4::perspective_rh_gl(fov, aspect, near, far);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn eye(&self) -> Vec3 {
        let az = self.azimuth.to_radians();
        let zen = self.zenith.to_radians();

        let offset = Vec3::new(zen.cos() * az.sin(), zen.sin(), zen.cos() * az.cos());
        self.target + offset * self.radius
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, self.up)
    }

    pub fn on_mouse_button_down(&mut self, button: MouseButton, x: f32, y: f32) {
        self.current_x = x;
        self.current_y = y;

        if button == MouseButton::Left {
            self.dragging = true;
        }
    }

    pub fn on_mouse_button_up(&mut self, button: MouseButton, x: f32, y: f32) {
        self.current_x = x;
        self.current_y = y;

        if button == MouseButton::Left {
            self.dragging = false;
        }
    }

    /// Orbits while the left button is held, otherwise only tracks the position
    pub fn on_mouse_move(&mut self, x: f32, y: f32) {
        let dx = x - self.current_x;
        let dy = y - self.current_y;

        self.current_x = x;
        self.current_y = y;

        if self.dragging {
            self.orbit(-dx * self.look_sensitivity, dy * self.look_sensitivity);
        }
    }

    /// Positive delta zooms in
    pub fn on_mouse_wheel(&mut self, delta: f32) {
        self.zoom(-delta * self.wheel_step);
    }

    pub fn on_key_down(&mut self, key: Key) {
        if key == Key::R {
            self.reset();
        }

        self.held_keys.insert(key);
    }

    pub fn on_key_up(&mut self, key: Key) {
        self.held_keys.remove(&key);
    }

    /// Applies the held keys for `elapsed` seconds
    pub fn on_update(&mut self, elapsed: f32) {
        let held = |keys: &[Key]| keys.iter().any(|k| self.held_keys.contains(k));

        let mut d_azimuth = 0.;
        let mut d_zenith = 0.;
        let mut d_radius = 0.;

        if held(&[Key::A, Key::Left]) {
            d_azimuth -= 1.;
        }
        if held(&[Key::D, Key::Right]) {
            d_azimuth += 1.;
        }
        if held(&[Key::Q]) {
            d_zenith += 1.;
        }
        if held(&[Key::E]) {
            d_zenith -= 1.;
        }
        if held(&[Key::W, Key::Up]) {
            d_radius -= 1.;
        }
        if held(&[Key::S, Key::Down]) {
            d_radius += 1.;
        }

        let orbit_step = self.orbit_speed * elapsed;
        self.orbit(d_azimuth * orbit_step, d_zenith * orbit_step);
        self.zoom(d_radius * self.zoom_speed * elapsed);
    }

    fn orbit(&mut self, d_azimuth: f32, d_zenith: f32) {
        self.azimuth = (self.azimuth + d_azimuth) % 360.;
        self.zenith = (self.zenith + d_zenith).clamp(-MAX_ZENITH, MAX_ZENITH);
    }

    fn zoom(&mut self, d_radius: f32) {
        self.radius = (self.radius + d_radius).clamp(MIN_RADIUS, MAX_RADIUS);
    }

    fn reset(&mut self) {
        let (target, radius, azimuth, zenith) = self.initial;
        self.target = target;
        self.radius = radius;
        self.azimuth = azimuth;
        self.zenith = zenith;
    }
}
