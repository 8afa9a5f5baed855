pub use camera::Camera;
pub use fps_camera::FpsCamera;

mod camera;
mod fps_camera;
