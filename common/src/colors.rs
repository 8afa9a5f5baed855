use nalgebra::Vector3;
use palette::Srgb;

pub type Color = Srgb<f32>;

pub const BACKGROUND: Color = Color::new(0.07, 0.13, 0.17);
pub const LAMP: Color = Color::new(1.0, 0.8, 0.2);
pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

pub trait ColorExt {
    fn from_named(color: Srgb<u8>) -> Self;
    fn to_rgb_vector3(self) -> Vector3<f32>;
    fn to_rgba_components_tuple(self) -> (f32, f32, f32, f32);
}

impl ColorExt for Color {
    fn from_named(named: Srgb<u8>) -> Color {
        Srgb::<f32>::from_format(named)
    }

    fn to_rgb_vector3(self) -> Vector3<f32> {
        Vector3::new(self.red, self.green, self.blue)
    }

    fn to_rgba_components_tuple(self) -> (f32, f32, f32, f32) {
        (self.red, self.green, self.blue, 1.0)
    }
}
