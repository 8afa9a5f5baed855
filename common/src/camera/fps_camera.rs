use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::camera::camera::Camera;
use crate::input::Input;

const FIELD_OF_VIEW: f32 = std::f32::consts::FRAC_PI_4;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;

const SPEED: f32 = 3.0;
const FAST_SPEED: f32 = 12.0;
const MOUSE_SENSITIVITY: f32 = 100.0;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FpsCamera {
    position: Point3<f32>,
    yaw: f32,
    pitch: f32,
    looking_direction: Vector3<f32>,
    aspect_ratio: f32,
}

impl FpsCamera {
    pub fn new(position: Point3<f32>, aspect_ratio: f32) -> Self {
        Self::looking_at(position, position + Vector3::new(0.0, 0.0, -1.0), aspect_ratio)
    }

    pub fn looking_at(position: Point3<f32>, target: Point3<f32>, aspect_ratio: f32) -> Self {
        let direction = (target - position)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| Vector3::new(0.0, 0.0, -1.0));

        let mut camera = Self {
            position,
            yaw: direction.z.atan2(direction.x),
            pitch: direction.y.clamp(-1.0, 1.0).asin(),
            looking_direction: direction,
            aspect_ratio,
        };
        camera.clamp_pitch();
        camera.recompute_direction();

        camera
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    fn clamp_pitch(&mut self) {
        let epsilon = 0.00001;
        self.pitch = self.pitch.clamp(
            -std::f32::consts::FRAC_PI_2 + epsilon,
            std::f32::consts::FRAC_PI_2 - epsilon,
        );
    }

    fn recompute_direction(&mut self) {
        self.looking_direction = Vector3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize();
    }
}

impl Camera for FpsCamera {
    fn update(&mut self, input: &Input, deltatime: f32) {
        if input.mouse_button_down(MouseButton::Left) {
            let offset = input.device_offset() * deltatime * MOUSE_SENSITIVITY;

            self.yaw += offset.x;
            self.yaw %= 2.0 * std::f32::consts::PI;

            self.pitch -= offset.y;
            self.clamp_pitch();

            self.recompute_direction();
        }

        let up = Vector3::y();
        let right_direction = self
            .looking_direction
            .cross(&up)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::x);
        // No vertical movement from looking up or down
        let forward_direction = Vector3::new(self.looking_direction.x, 0.0, self.looking_direction.z)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros);

        let speed = if input.key_down(KeyCode::ShiftLeft) {
            FAST_SPEED
        } else {
            SPEED
        } * deltatime;

        if input.key_down(KeyCode::KeyW) {
            self.position += forward_direction * speed;
        }

        if input.key_down(KeyCode::KeyS) {
            self.position -= forward_direction * speed;
        }

        if input.key_down(KeyCode::KeyA) {
            self.position -= right_direction * speed;
        }

        if input.key_down(KeyCode::KeyD) {
            self.position += right_direction * speed;
        }

        if input.key_down(KeyCode::Space) {
            self.position += up * speed;
        }

        if input.key_down(KeyCode::ControlLeft) {
            self.position -= up * speed;
        }
    }

    fn position(&self) -> Point3<f32> {
        self.position
    }

    fn view(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            &self.position,
            &(self.position + self.looking_direction),
            &Vector3::y(),
        )
    }

    fn projection(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect_ratio, FIELD_OF_VIEW, NEAR_PLANE, FAR_PLANE)
    }

    fn direction(&self) -> Vector3<f32> {
        self.looking_direction
    }
}

impl Default for FpsCamera {
    fn default() -> Self {
        Self::new(Point3::origin(), 1.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Point3;
    use winit::event::ElementState;

    use super::*;

    #[test]
    fn looking_at_faces_target() {
        let camera = FpsCamera::looking_at(Point3::new(0.0, 1.0, 5.0), Point3::origin(), 16.0 / 9.0);

        let expected = Vector3::new(0.0, -1.0, -5.0).normalize();
        assert_relative_eq!(camera.direction(), expected, epsilon = 1e-5);

        // The target lands on the view space -Z axis
        let target = camera.view().transform_point(&Point3::origin());
        assert_relative_eq!(target.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(target.y, 0.0, epsilon = 1e-5);
        assert!(target.z < 0.0);
    }

    #[test]
    fn looking_straight_down_stays_finite() {
        let mut camera = FpsCamera::looking_at(Point3::new(0.0, 5.0, 0.0), Point3::origin(), 1.0);

        assert!(camera.direction().y < -0.999);
        assert!(camera.view_projection().iter().all(|value| value.is_finite()));

        let mut input = Input::new();
        input.set_key_state(KeyCode::KeyD, ElementState::Pressed);
        camera.update(&input, 1.0);

        let position = camera.position();
        assert!(position.coords.iter().all(|value| value.is_finite()));
        assert_relative_eq!(position.y, 5.0, epsilon = 1e-5);
        assert_relative_eq!(
            (position - Point3::new(0.0, 5.0, 0.0)).norm(),
            SPEED,
            epsilon = 1e-3
        );
    }

    #[test]
    fn view_projection_is_projection_after_view() {
        let camera = FpsCamera::looking_at(Point3::new(3.0, 2.0, 1.0), Point3::origin(), 1.5);

        assert_relative_eq!(
            camera.view_projection(),
            camera.projection() * camera.view(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn forward_movement_stays_horizontal() {
        let mut camera = FpsCamera::looking_at(Point3::new(0.0, 1.0, 5.0), Point3::origin(), 1.0);
        let mut input = Input::new();
        input.set_key_state(KeyCode::KeyW, ElementState::Pressed);

        camera.update(&input, 1.0);

        assert_relative_eq!(camera.position().y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(camera.position().z, 5.0 - SPEED, epsilon = 1e-4);
    }

    #[test]
    fn mouse_is_ignored_without_left_button() {
        let mut camera = FpsCamera::looking_at(Point3::new(0.0, 0.0, 5.0), Point3::origin(), 1.0);
        let direction = camera.direction();
        let mut input = Input::new();
        input.process_device_event(winit::event::DeviceEvent::MouseMotion { delta: (50.0, 20.0) });

        camera.update(&input, 0.016);

        assert_relative_eq!(camera.direction(), direction);
    }
}
