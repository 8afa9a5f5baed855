use nalgebra::{Matrix4, Point3, Vector3};

use crate::gpu::{ShaderProgram, UniformValue};
use crate::input::Input;
use crate::maths;

pub trait Camera {
    fn update(&mut self, input: &Input, deltatime: f32);

    fn position(&self) -> Point3<f32>;
    fn view(&self) -> Matrix4<f32>;
    fn projection(&self) -> Matrix4<f32>;
    fn direction(&self) -> Vector3<f32>;

    fn view_projection(&self) -> Matrix4<f32> {
        self.projection() * self.view()
    }

    /// Writes the combined view-projection matrix into `uniform_name` of `shader`.
    fn install_view_projection(&self, shader: &ShaderProgram, uniform_name: &str) {
        shader.set_uniform(
            uniform_name,
            UniformValue::Mat4(maths::raw_matrix(self.view_projection())),
        );
    }
}
