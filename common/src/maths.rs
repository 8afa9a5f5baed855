use nalgebra::{Matrix4, Point3, Translation3, UnitQuaternion, Vector3};

pub fn raw_matrix(matrix: Matrix4<f32>) -> [[f32; 4]; 4] {
    <[[f32; 4]; 4]>::from(matrix)
}

pub fn raw_point(point: Point3<f32>) -> [f32; 3] {
    [point.x, point.y, point.z]
}

/// Translation * rotation * scale, the order every model matrix in the scene is built in.
pub fn model_matrix(
    translation: Vector3<f32>,
    rotation: UnitQuaternion<f32>,
    scale: Vector3<f32>,
) -> Matrix4<f32> {
    Translation3::from(translation).to_homogeneous()
        * rotation.to_homogeneous()
        * Matrix4::new_nonuniform_scaling(&scale)
}
