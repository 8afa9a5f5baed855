use log::info;
use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

use crate::camera::Camera;
use crate::config::{Dimensions, RoomConfig};
use crate::geometry::{Cube, Drawable, MeshError, Plane};
use crate::gpu::{Gpu, ShaderProgram};
use crate::light::Light;
use crate::maths;

pub const LIGHT_POSITION_UNIFORM: &str = "light_position";
pub const LIGHT_COLOR_UNIFORM: &str = "light_color";
pub const LAMP_POSITION_UNIFORM: &str = "lamp_position";
pub const LAMP_COLOR_UNIFORM: &str = "lamp_color";

fn rotation_x(degrees: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), degrees.to_radians())
}

fn rotation_y(degrees: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), degrees.to_radians())
}

/// Where every surface of the room goes. Each plane is a unit square facing +Z, so a transform
/// rotates it to face into the room (or out of a beam) and scales it to the surface size.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomLayout {
    room: Dimensions,
    beam: Dimensions,
    beam_count: u32,
    ceiling_gap: f32,
    wall_overhang: f32,
    lamp_drop: f32,
    lamp_marker_size: f32,
}

impl RoomLayout {
    pub fn new(config: &RoomConfig) -> Self {
        Self {
            room: config.room,
            beam: config.beam,
            beam_count: config.beam_count,
            ceiling_gap: config.ceiling_gap,
            wall_overhang: config.wall_overhang,
            lamp_drop: config.lighting.lamp_drop,
            lamp_marker_size: config.lighting.lamp_marker_size,
        }
    }

    pub fn floor(&self) -> Matrix4<f32> {
        maths::model_matrix(
            Vector3::new(0.0, -self.room.height / 2.0, 0.0),
            rotation_x(-90.0),
            Vector3::new(self.room.width, self.room.depth, 1.0),
        )
    }

    pub fn ceiling(&self) -> Matrix4<f32> {
        maths::model_matrix(
            Vector3::new(0.0, self.room.height / 2.0 + self.ceiling_gap, 0.0),
            rotation_x(90.0),
            Vector3::new(self.room.width, self.room.depth, 1.0),
        )
    }

    /// Back, front, left and right walls.
    pub fn walls(&self) -> [Matrix4<f32>; 4] {
        let Dimensions {
            width,
            height,
            depth,
        } = self.room;
        let height = height + self.wall_overhang;

        [
            maths::model_matrix(
                Vector3::new(0.0, 0.0, -depth / 2.0),
                UnitQuaternion::identity(),
                Vector3::new(width, height, 1.0),
            ),
            maths::model_matrix(
                Vector3::new(0.0, 0.0, depth / 2.0),
                rotation_y(180.0),
                Vector3::new(width, height, 1.0),
            ),
            maths::model_matrix(
                Vector3::new(-width / 2.0, 0.0, 0.0),
                rotation_y(90.0),
                Vector3::new(depth, height, 1.0),
            ),
            maths::model_matrix(
                Vector3::new(width / 2.0, 0.0, 0.0),
                rotation_y(-90.0),
                Vector3::new(depth, height, 1.0),
            ),
        ]
    }

    /// Z coordinate of every beam, a quarter of the room depth apart and centred on the middle one.
    pub fn beam_positions(&self) -> Vec<f32> {
        let spacing = self.room.depth / 4.0;
        let middle = (self.beam_count as f32 - 1.0) / 2.0;

        (0..self.beam_count)
            .map(|index| (index as f32 - middle) * spacing)
            .collect()
    }

    pub fn beam_center(&self, z: f32) -> Point3<f32> {
        Point3::new(0.0, self.room.height / 2.0 - self.beam.height / 2.0, z)
    }

    /// Bottom, top, front, back, left and right faces of the beam at `z`, all facing outwards.
    pub fn beam_faces(&self, z: f32) -> [Matrix4<f32>; 6] {
        let Dimensions {
            width,
            height,
            depth,
        } = self.beam;
        let center = self.beam_center(z).coords;

        let face = |offset: Vector3<f32>, rotation, scale: Vector3<f32>| {
            maths::model_matrix(center + offset, rotation, scale)
        };

        [
            face(
                Vector3::new(0.0, -height / 2.0, 0.0),
                rotation_x(90.0),
                Vector3::new(width, depth, 1.0),
            ),
            face(
                Vector3::new(0.0, height / 2.0, 0.0),
                rotation_x(-90.0),
                Vector3::new(width, depth, 1.0),
            ),
            face(
                Vector3::new(0.0, 0.0, depth / 2.0),
                UnitQuaternion::identity(),
                Vector3::new(width, height, 1.0),
            ),
            face(
                Vector3::new(0.0, 0.0, -depth / 2.0),
                rotation_y(180.0),
                Vector3::new(width, height, 1.0),
            ),
            face(
                Vector3::new(-width / 2.0, 0.0, 0.0),
                rotation_y(-90.0),
                Vector3::new(depth, height, 1.0),
            ),
            face(
                Vector3::new(width / 2.0, 0.0, 0.0),
                rotation_y(90.0),
                Vector3::new(depth, height, 1.0),
            ),
        ]
    }

    pub fn beams(&self) -> Vec<Matrix4<f32>> {
        self.beam_positions()
            .into_iter()
            .flat_map(|z| self.beam_faces(z))
            .collect()
    }

    /// Hangs under the middle of the room, below the beam line.
    pub fn lamp_position(&self) -> Point3<f32> {
        Point3::new(
            0.0,
            self.room.height / 2.0 - self.beam.height - self.lamp_drop,
            0.0,
        )
    }

    pub fn lamp_marker(&self) -> Matrix4<f32> {
        maths::model_matrix(
            self.lamp_position().coords,
            UnitQuaternion::identity(),
            Vector3::repeat(self.lamp_marker_size),
        )
    }
}

/// Every primitive making up the room, plus the two lights that shade it.
#[derive(Debug)]
pub struct Room {
    layout: RoomLayout,
    floor: Plane,
    walls: Plane,
    ceiling: Plane,
    beams: Plane,
    lamp: Cube,
    light: Light,
    lamp_light: Light,
}

impl Room {
    pub fn new(gpu: &Gpu, config: &RoomConfig) -> Result<Self, MeshError> {
        let layout = RoomLayout::new(config);
        let materials = &config.materials;

        let floor = Plane::new(gpu, &materials.floor)?;
        let walls = Plane::new(gpu, &materials.walls)?;
        let ceiling = Plane::new(gpu, &materials.ceiling)?;
        let beams = Plane::new(gpu, &materials.beams)?;
        let lamp = Cube::new(gpu, Vec::new())?;

        let lamp_position = layout.lamp_position();
        let light = Light::new(lamp_position, config.lighting.color);
        let lamp_light = Light::new(lamp_position, config.lighting.lamp_color);

        info!(
            "Built {}x{}x{} room with {} beams",
            config.room.width, config.room.height, config.room.depth, config.beam_count
        );

        Ok(Self {
            layout,
            floor,
            walls,
            ceiling,
            beams,
            lamp,
            light,
            lamp_light,
        })
    }

    pub fn layout(&self) -> &RoomLayout {
        &self.layout
    }

    /// Writes the light uniforms. They never change, so once after compiling is enough.
    pub fn install_lights(&self, shader: &ShaderProgram, light_shader: &ShaderProgram) {
        shader.activate();
        self.light
            .install(shader, LIGHT_POSITION_UNIFORM, LIGHT_COLOR_UNIFORM);
        self.lamp_light
            .install(shader, LAMP_POSITION_UNIFORM, LAMP_COLOR_UNIFORM);

        light_shader.activate();
        self.lamp_light
            .install(light_shader, LAMP_POSITION_UNIFORM, LAMP_COLOR_UNIFORM);
    }

    pub fn draw(
        &self,
        shader: &ShaderProgram,
        light_shader: &ShaderProgram,
        camera: &dyn Camera,
    ) -> Result<(), MeshError> {
        self.floor.draw(shader, camera, &self.layout.floor())?;
        self.ceiling.draw(shader, camera, &self.layout.ceiling())?;

        for transform in self.layout.beams() {
            self.beams.draw(shader, camera, &transform)?;
        }

        for transform in self.layout.walls() {
            self.walls.draw(shader, camera, &transform)?;
        }

        self.lamp
            .draw(light_shader, camera, &self.layout.lamp_marker())
    }

    pub fn delete(&mut self) {
        self.floor.delete();
        self.walls.delete();
        self.ceiling.delete();
        self.beams.delete();
        self.lamp.delete();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use approx::assert_relative_eq;

    use super::*;
    use crate::camera::FpsCamera;
    use crate::geometry::PlaneMaterial;
    use crate::gpu::{HeadlessContext, UniformValue};
    use crate::texture::fixtures;

    fn layout() -> RoomLayout {
        RoomLayout::new(&RoomConfig::default())
    }

    fn center(transform: &Matrix4<f32>) -> Point3<f32> {
        transform.transform_point(&Point3::origin())
    }

    fn facing(transform: &Matrix4<f32>) -> Vector3<f32> {
        transform.transform_vector(&Vector3::z()).normalize()
    }

    #[test]
    fn floor_spans_the_room_and_faces_up() {
        let floor = layout().floor();

        assert_relative_eq!(center(&floor), Point3::new(0.0, -7.5, 0.0), epsilon = 1e-5);
        assert_relative_eq!(facing(&floor), Vector3::y(), epsilon = 1e-5);

        let corner = floor.transform_point(&Point3::new(0.5, 0.5, 0.0));
        assert_relative_eq!(corner.x.abs(), 15.0, epsilon = 1e-4);
        assert_relative_eq!(corner.z.abs(), 25.0, epsilon = 1e-4);
    }

    #[test]
    fn ceiling_sits_above_the_walls_and_faces_down() {
        let ceiling = layout().ceiling();

        assert_relative_eq!(center(&ceiling), Point3::new(0.0, 9.5, 0.0), epsilon = 1e-5);
        assert_relative_eq!(facing(&ceiling), -Vector3::y(), epsilon = 1e-5);
    }

    #[test]
    fn walls_face_into_the_room() {
        for wall in layout().walls() {
            let to_center = Point3::origin() - center(&wall);

            assert!(facing(&wall).dot(&to_center) > 0.0);

            // Tall enough to meet the raised ceiling
            let top = wall.transform_point(&Point3::new(0.0, 0.5, 0.0));
            assert_relative_eq!(top.y, 9.5, epsilon = 1e-4);
        }
    }

    #[test]
    fn beams_are_a_quarter_depth_apart() {
        assert_eq!(layout().beam_positions(), vec![-12.5, 0.0, 12.5]);
        assert_eq!(layout().beams().len(), 18);
    }

    #[test]
    fn beam_faces_point_outwards() {
        let layout = layout();

        for z in layout.beam_positions() {
            let beam_center = layout.beam_center(z);

            for face in layout.beam_faces(z) {
                let outwards = center(&face) - beam_center;
                assert!(facing(&face).dot(&outwards) > 0.0);
            }
        }
    }

    #[test]
    fn lamp_hangs_under_the_middle_beam() {
        let layout = layout();

        assert_relative_eq!(layout.lamp_position(), Point3::new(0.0, 4.0, 0.0));
        assert_relative_eq!(center(&layout.lamp_marker()), layout.lamp_position());
    }

    #[test]
    fn room_draws_every_surface_and_installs_lights() {
        let context = Rc::new(RefCell::new(HeadlessContext::new()));
        let gpu = Gpu::from_shared(context.clone());
        let paths: Vec<_> = (0..3).map(|_| fixtures::write_png(2, 2)).collect();

        let material = PlaneMaterial::new(&paths[0], &paths[1], &paths[2]);
        let mut config = RoomConfig::default();
        config.materials.floor = material.clone();
        config.materials.walls = material.clone();
        config.materials.ceiling = material.clone();
        config.materials.beams = material;

        let room = Room::new(&gpu, &config);
        paths.iter().for_each(|path| fixtures::remove(path));
        let room = room.unwrap();

        let shader = ShaderProgram::from_source(&gpu, "void main() {}", "void main() {}").unwrap();
        let light_shader =
            ShaderProgram::from_source(&gpu, "void main() {}", "void main() {}").unwrap();
        let camera = FpsCamera::looking_at(config.camera_position, Point3::origin(), 1.0);

        room.install_lights(&shader, &light_shader);
        room.draw(&shader, &light_shader, &camera).unwrap();

        let context = context.borrow();
        // Floor, ceiling, four walls, six faces per beam and the lamp marker
        assert_eq!(context.draw_calls().count(), 1 + 1 + 4 + 18 + 1);
        assert_eq!(
            context
                .state()
                .uniform(shader.id().unwrap(), LAMP_POSITION_UNIFORM),
            Some(UniformValue::Vec3([0.0, 4.0, 0.0]))
        );
    }

    #[test]
    fn missing_texture_aborts_room_without_leaks() {
        let context = Rc::new(RefCell::new(HeadlessContext::new()));
        let gpu = Gpu::from_shared(context.clone());
        let mut config = RoomConfig::default();
        config.materials.floor = PlaneMaterial::new(
            fixtures::missing(),
            fixtures::missing(),
            fixtures::missing(),
        );

        assert!(matches!(
            Room::new(&gpu, &config),
            Err(MeshError::PlaneInitialization(_))
        ));
        assert_eq!(context.borrow().live_total(), 0);
    }
}
