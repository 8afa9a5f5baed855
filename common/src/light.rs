use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::colors::{self, Color, ColorExt};
use crate::gpu::{ShaderProgram, UniformValue};
use crate::maths;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub position: Point3<f32>,
    pub color: Color,
}

impl Light {
    pub fn new(position: Point3<f32>, color: Color) -> Self {
        Self { position, color }
    }

    /// Writes the position as a `vec3` and the color as an opaque `vec4`.
    pub fn install(&self, shader: &ShaderProgram, position_uniform: &str, color_uniform: &str) {
        let (red, green, blue, alpha) = self.color.to_rgba_components_tuple();

        shader.set_uniform(
            position_uniform,
            UniformValue::Vec3(maths::raw_point(self.position)),
        );
        shader.set_uniform(color_uniform, UniformValue::Vec4([red, green, blue, alpha]));
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new(Point3::origin(), colors::WHITE)
    }
}
