use std::path::{Path, PathBuf};

use log::{debug, info, trace};
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::geometry::mesh::{
    self, CAMERA_POSITION_UNIFORM, Drawable, MeshBuffers, VIEW_PROJECTION_UNIFORM,
};
use crate::geometry::{MeshError, Vertex};
use crate::gpu::{Gpu, ShaderProgram, UniformValue};
use crate::maths;
use crate::texture::{Texture, TextureKind};

const NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

/// Two counter-clockwise triangles over the corners in `Plane::geometry` order.
const INDICES: [u32; 6] = [0, 2, 1, 0, 3, 2];

fn default_repeat() -> f32 {
    1.0
}

/// Texture maps for one plane and how many times they tile across it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlaneMaterial {
    pub diffuse: PathBuf,
    pub normal: PathBuf,
    pub roughness: PathBuf,
    #[serde(default = "default_repeat")]
    pub repeat_x: f32,
    #[serde(default = "default_repeat")]
    pub repeat_y: f32,
}

impl PlaneMaterial {
    pub fn new(
        diffuse: impl Into<PathBuf>,
        normal: impl Into<PathBuf>,
        roughness: impl Into<PathBuf>,
    ) -> Self {
        Self {
            diffuse: diffuse.into(),
            normal: normal.into(),
            roughness: roughness.into(),
            repeat_x: default_repeat(),
            repeat_y: default_repeat(),
        }
    }

    pub fn with_repeat(mut self, repeat_x: f32, repeat_y: f32) -> Self {
        self.repeat_x = repeat_x;
        self.repeat_y = repeat_y;
        self
    }

    fn maps(&self) -> [(&Path, TextureKind); 3] {
        [
            (self.diffuse.as_path(), TextureKind::Diffuse),
            (self.normal.as_path(), TextureKind::Normal),
            (self.roughness.as_path(), TextureKind::Roughness),
        ]
    }
}

#[derive(Debug)]
struct PlaneResources {
    buffers: MeshBuffers,
    textures: [Texture; 3],
}

impl PlaneResources {
    /// Locals are dropped in reverse order on every early return, so a failure at any step
    /// releases everything created before it.
    fn create(gpu: &Gpu, material: &PlaneMaterial, vertices: &[Vertex]) -> Result<Self, MeshError> {
        let buffers =
            MeshBuffers::upload(gpu, vertices, &INDICES).map_err(MeshError::ResourceCreation)?;

        let [diffuse, normal, roughness] = material.maps();
        let diffuse = Self::load_texture(gpu, diffuse, 0)?;
        let normal = Self::load_texture(gpu, normal, 1)?;
        let roughness = Self::load_texture(gpu, roughness, 2)?;

        Ok(Self {
            buffers,
            textures: [diffuse, normal, roughness],
        })
    }

    fn load_texture(
        gpu: &Gpu,
        (path, kind): (&Path, TextureKind),
        unit: u32,
    ) -> Result<Texture, MeshError> {
        let texture = Texture::load(gpu, path, kind, unit).map_err(MeshError::Texture)?;

        // Binding applies the repeat wrap mode
        texture.bind();
        texture.unbind();

        Ok(texture)
    }

    fn delete(&mut self) {
        self.buffers.delete();
        self.textures.iter_mut().for_each(Texture::delete);
    }
}

/// Unit square in its local XY plane facing +Z, textured with diffuse, normal and roughness maps.
#[derive(Debug)]
pub struct Plane {
    resources: Option<PlaneResources>,
    vertices: [Vertex; 4],
}

impl Plane {
    /// Either every buffer and texture is created or none remain allocated.
    pub fn new(gpu: &Gpu, material: &PlaneMaterial) -> Result<Self, MeshError> {
        let vertices = Self::geometry(material.repeat_x, material.repeat_y);

        let resources = PlaneResources::create(gpu, material, &vertices)
            .map_err(|err| MeshError::PlaneInitialization(Box::new(err)))?;

        info!(
            "Created plane with {:?} repeated {}x{}",
            material.diffuse, material.repeat_x, material.repeat_y
        );

        Ok(Self {
            resources: Some(resources),
            vertices,
        })
    }

    /// Corner vertices with texture coordinates scaled by the repeat factors.
    pub fn geometry(repeat_x: f32, repeat_y: f32) -> [Vertex; 4] {
        [
            Vertex::new([-0.5, -0.5, 0.0], NORMAL, [0.0, 0.0]),
            Vertex::new([-0.5, 0.5, 0.0], NORMAL, [0.0, repeat_y]),
            Vertex::new([0.5, 0.5, 0.0], NORMAL, [repeat_x, repeat_y]),
            Vertex::new([0.5, -0.5, 0.0], NORMAL, [repeat_x, 0.0]),
        ]
    }

    pub fn indices() -> &'static [u32; 6] {
        &INDICES
    }

    pub fn vertices(&self) -> &[Vertex; 4] {
        &self.vertices
    }

    pub fn textures(&self) -> &[Texture] {
        self.resources
            .as_ref()
            .map(|resources| resources.textures.as_slice())
            .unwrap_or_default()
    }

    /// Moves every resource into the returned plane and leaves this one deleted.
    pub fn take(&mut self) -> Self {
        Self {
            resources: self.resources.take(),
            vertices: self.vertices,
        }
    }

    /// Deletes what this plane owns, then takes over everything `other` owns.
    pub fn assign(&mut self, mut other: Plane) {
        self.delete();

        self.resources = other.resources.take();
        self.vertices = other.vertices;
    }
}

impl Drawable for Plane {
    fn draw(
        &self,
        shader: &ShaderProgram,
        camera: &dyn Camera,
        transform: &Matrix4<f32>,
    ) -> Result<(), MeshError> {
        let resources = self.resources.as_ref().ok_or(MeshError::DrawBeforeInit)?;

        shader.activate();
        resources.buffers.bind();

        for texture in &resources.textures {
            texture.assign_unit(shader);
            texture.bind();
        }

        shader.set_uniform(
            CAMERA_POSITION_UNIFORM,
            UniformValue::Vec3(maths::raw_point(camera.position())),
        );
        camera.install_view_projection(shader, VIEW_PROJECTION_UNIFORM);
        mesh::set_model_uniform(shader, transform);

        trace!("Drawing plane");
        let result = resources.buffers.draw_elements().map_err(MeshError::Draw);

        resources.buffers.unbind();

        result
    }

    fn delete(&mut self) {
        if let Some(mut resources) = self.resources.take() {
            debug!("Deleting plane");
            resources.delete();
        }
    }

    fn is_initialized(&self) -> bool {
        self.resources.is_some()
    }
}

impl Drop for Plane {
    fn drop(&mut self) {
        self.delete();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use nalgebra::{Point3, Vector3};

    use super::*;
    use crate::camera::FpsCamera;
    use crate::gpu::{GpuCall, HeadlessContext, ResourceKind};
    use crate::import::image::ImageLoadError;
    use crate::texture::{TextureLoadError, fixtures};

    struct Fixture {
        context: Rc<RefCell<HeadlessContext>>,
        gpu: Gpu,
        paths: Vec<PathBuf>,
    }

    impl Fixture {
        fn new() -> Self {
            let context = Rc::new(RefCell::new(HeadlessContext::new()));
            let gpu = Gpu::from_shared(context.clone());
            let paths = (0..3).map(|_| fixtures::write_png(2, 2)).collect();

            Self {
                context,
                gpu,
                paths,
            }
        }

        fn material(&self) -> PlaneMaterial {
            PlaneMaterial::new(&self.paths[0], &self.paths[1], &self.paths[2])
        }

        fn shader(&self) -> ShaderProgram {
            ShaderProgram::from_source(&self.gpu, "void main() {}", "void main() {}").unwrap()
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            self.paths.iter().for_each(|path| fixtures::remove(path));
        }
    }

    fn camera() -> FpsCamera {
        FpsCamera::looking_at(Point3::new(0.0, 1.0, 5.0), Point3::origin(), 1.0)
    }

    #[test]
    fn texture_coordinates_follow_repeat_factors() {
        let corners: Vec<[f32; 2]> = Plane::geometry(2.0, 3.0)
            .iter()
            .map(|vertex| vertex.tex_coord)
            .collect();

        assert_eq!(corners, [[0.0, 0.0], [0.0, 3.0], [2.0, 3.0], [2.0, 0.0]]);
    }

    #[test]
    fn triangles_face_the_normal() {
        let vertices = Plane::geometry(1.0, 1.0);
        let position = |index: u32| Vector3::from(vertices[index as usize].position);

        for triangle in Plane::indices().chunks(3) {
            let (a, b, c) = (position(triangle[0]), position(triangle[1]), position(triangle[2]));

            assert!((b - a).cross(&(c - a)).z > 0.0);
        }
    }

    #[test]
    fn construction_creates_every_resource() {
        let fixture = Fixture::new();

        let plane = Plane::new(&fixture.gpu, &fixture.material()).unwrap();

        let context = fixture.context.borrow();
        assert!(plane.is_initialized());
        assert_eq!(context.live(ResourceKind::Buffer), 2);
        assert_eq!(context.live(ResourceKind::VertexArray), 1);
        assert_eq!(context.live(ResourceKind::Texture), 3);
        assert_eq!(plane.textures().len(), 3);
    }

    #[test]
    fn delete_twice_matches_delete_once() {
        let fixture = Fixture::new();
        let mut plane = Plane::new(&fixture.gpu, &fixture.material()).unwrap();

        plane.delete();
        let calls_after_first = fixture.context.borrow().calls().len();
        plane.delete();
        drop(plane);

        let context = fixture.context.borrow();
        assert_eq!(context.calls().len(), calls_after_first);
        assert_eq!(context.live_total(), 0);
        assert_eq!(context.state().redundant_deletes(), 0);
    }

    #[test]
    fn take_leaves_source_uninitialized() {
        let fixture = Fixture::new();
        let shader = fixture.shader();
        let mut source = Plane::new(&fixture.gpu, &fixture.material()).unwrap();

        let destination = source.take();

        assert_eq!(
            source.draw(&shader, &camera(), &Matrix4::identity()),
            Err(MeshError::DrawBeforeInit)
        );

        let calls = fixture.context.borrow().calls().len();
        source.delete();
        assert_eq!(fixture.context.borrow().calls().len(), calls);

        destination
            .draw(&shader, &camera(), &Matrix4::identity())
            .unwrap();
        assert_eq!(fixture.context.borrow().draw_calls().count(), 1);
    }

    #[test]
    fn assign_releases_previous_resources() {
        let fixture = Fixture::new();
        let mut target = Plane::new(&fixture.gpu, &fixture.material()).unwrap();
        let source = Plane::new(&fixture.gpu, &fixture.material()).unwrap();
        let source_textures: Vec<_> = source.textures().iter().map(Texture::id).collect();

        target.assign(source);

        let context = fixture.context.borrow();
        assert_eq!(context.live(ResourceKind::Texture), 3);
        assert_eq!(context.live(ResourceKind::VertexArray), 1);
        assert_eq!(
            target.textures().iter().map(Texture::id).collect::<Vec<_>>(),
            source_textures
        );
    }

    #[test]
    fn draw_before_init_touches_nothing() {
        let fixture = Fixture::new();
        let shader = fixture.shader();
        let mut plane = Plane::new(&fixture.gpu, &fixture.material()).unwrap();
        plane.delete();
        fixture.context.borrow_mut().clear_calls();

        assert_eq!(
            plane.draw(&shader, &camera(), &Matrix4::identity()),
            Err(MeshError::DrawBeforeInit)
        );
        assert!(fixture.context.borrow().calls().is_empty());
    }

    #[test]
    fn missing_image_on_any_path_releases_everything() {
        for failing in 0..3 {
            let mut fixture = Fixture::new();
            fixtures::remove(&fixture.paths[failing]);
            fixture.paths[failing] = fixtures::missing();

            let result = Plane::new(&fixture.gpu, &fixture.material());

            let Err(MeshError::PlaneInitialization(cause)) = result else {
                panic!("Expected a plane initialization failure for path {}", failing);
            };
            assert_eq!(
                *cause,
                MeshError::Texture(TextureLoadError::ImageLoadError(
                    ImageLoadError::ImageNotFound(fixture.paths[failing].clone())
                ))
            );
            assert_eq!(fixture.context.borrow().live_total(), 0);
        }
    }

    #[test]
    fn undecodable_image_releases_everything() {
        let mut fixture = Fixture::new();
        fixtures::remove(&fixture.paths[2]);
        fixture.paths[2] = fixtures::write_garbage();

        let result = Plane::new(&fixture.gpu, &fixture.material());

        assert!(matches!(result, Err(MeshError::PlaneInitialization(_))));
        assert_eq!(fixture.context.borrow().live_total(), 0);
    }

    #[test]
    fn gpu_failure_at_any_step_releases_everything() {
        let injections = [
            (ResourceKind::VertexArray, 0),
            (ResourceKind::Buffer, 0),
            (ResourceKind::Buffer, 1),
            (ResourceKind::Texture, 0),
            (ResourceKind::Texture, 1),
            (ResourceKind::Texture, 2),
        ];

        for (kind, successes) in injections {
            let fixture = Fixture::new();
            fixture.context.borrow_mut().fail_after(kind, successes);

            let result = Plane::new(&fixture.gpu, &fixture.material());

            assert!(
                matches!(result, Err(MeshError::PlaneInitialization(_))),
                "{} failure after {} successes was not reported",
                kind,
                successes
            );
            assert_eq!(fixture.context.borrow().live_total(), 0);
        }
    }

    #[test]
    fn draw_binds_textures_and_passes_transform_through() {
        let fixture = Fixture::new();
        let shader = fixture.shader();
        let plane =
            Plane::new(&fixture.gpu, &fixture.material().with_repeat(2.0, 3.0)).unwrap();
        let transform = Matrix4::new_translation(&Vector3::new(1.0, -2.0, 3.0))
            * Matrix4::new_nonuniform_scaling(&Vector3::new(30.0, 50.0, 1.0));
        fixture.context.borrow_mut().clear_calls();

        plane.draw(&shader, &camera(), &transform).unwrap();

        let context = fixture.context.borrow();
        let calls = context.calls();
        let draw = calls
            .iter()
            .position(|call| matches!(call, GpuCall::DrawElements { .. }))
            .unwrap();

        for texture in plane.textures() {
            assert!(calls[..draw].contains(&GpuCall::BindTexture {
                unit: texture.unit(),
                texture: texture.id(),
            }));
        }

        let GpuCall::DrawElements { count, textures, .. } = &calls[draw] else {
            unreachable!();
        };
        assert_eq!(*count, 6);
        assert_eq!(textures.len(), 3);

        let program = shader.id().unwrap();
        assert_eq!(
            context.state().uniform(program, mesh::MODEL_UNIFORM),
            Some(UniformValue::Mat4(maths::raw_matrix(transform)))
        );
        assert_eq!(
            context.state().uniform(program, CAMERA_POSITION_UNIFORM),
            Some(UniformValue::Vec3([0.0, 1.0, 5.0]))
        );
        assert_eq!(
            context.state().uniform(program, "diffuse0"),
            Some(UniformValue::Sampler(0))
        );
    }
}
