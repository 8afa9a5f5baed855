use log::{info, trace};
use nalgebra::Matrix4;

use crate::camera::Camera;
use crate::geometry::mesh::{self, Drawable, MeshBuffers, VIEW_PROJECTION_UNIFORM};
use crate::geometry::{MeshError, Vertex};
use crate::gpu::{Gpu, ShaderProgram};
use crate::texture::Texture;

const FRONT: [f32; 3] = [0.0, 0.0, 1.0];
const BACK: [f32; 3] = [0.0, 0.0, -1.0];
const TOP: [f32; 3] = [0.0, 1.0, 0.0];
const BOTTOM: [f32; 3] = [0.0, -1.0, 0.0];
const RIGHT: [f32; 3] = [1.0, 0.0, 0.0];
const LEFT: [f32; 3] = [-1.0, 0.0, 0.0];

/// Unit cube centred on the origin. Four vertices per face so every face keeps its own normal,
/// corners listed counter-clockwise seen from outside.
#[rustfmt::skip]
const VERTICES: [Vertex; 24] = [
    Vertex::new([-0.5, -0.5,  0.5], FRONT, [0.0, 0.0]),
    Vertex::new([ 0.5, -0.5,  0.5], FRONT, [1.0, 0.0]),
    Vertex::new([ 0.5,  0.5,  0.5], FRONT, [1.0, 1.0]),
    Vertex::new([-0.5,  0.5,  0.5], FRONT, [0.0, 1.0]),

    Vertex::new([ 0.5, -0.5, -0.5], BACK, [0.0, 0.0]),
    Vertex::new([-0.5, -0.5, -0.5], BACK, [1.0, 0.0]),
    Vertex::new([-0.5,  0.5, -0.5], BACK, [1.0, 1.0]),
    Vertex::new([ 0.5,  0.5, -0.5], BACK, [0.0, 1.0]),

    Vertex::new([-0.5,  0.5,  0.5], TOP, [0.0, 0.0]),
    Vertex::new([ 0.5,  0.5,  0.5], TOP, [1.0, 0.0]),
    Vertex::new([ 0.5,  0.5, -0.5], TOP, [1.0, 1.0]),
    Vertex::new([-0.5,  0.5, -0.5], TOP, [0.0, 1.0]),

    Vertex::new([-0.5, -0.5, -0.5], BOTTOM, [0.0, 0.0]),
    Vertex::new([ 0.5, -0.5, -0.5], BOTTOM, [1.0, 0.0]),
    Vertex::new([ 0.5, -0.5,  0.5], BOTTOM, [1.0, 1.0]),
    Vertex::new([-0.5, -0.5,  0.5], BOTTOM, [0.0, 1.0]),

    Vertex::new([ 0.5, -0.5,  0.5], RIGHT, [0.0, 0.0]),
    Vertex::new([ 0.5, -0.5, -0.5], RIGHT, [1.0, 0.0]),
    Vertex::new([ 0.5,  0.5, -0.5], RIGHT, [1.0, 1.0]),
    Vertex::new([ 0.5,  0.5,  0.5], RIGHT, [0.0, 1.0]),

    Vertex::new([-0.5, -0.5, -0.5], LEFT, [0.0, 0.0]),
    Vertex::new([-0.5, -0.5,  0.5], LEFT, [1.0, 0.0]),
    Vertex::new([-0.5,  0.5,  0.5], LEFT, [1.0, 1.0]),
    Vertex::new([-0.5,  0.5, -0.5], LEFT, [0.0, 1.0]),
];

const INDICES: [u32; 36] = face_indices();

const fn face_indices() -> [u32; 36] {
    let mut indices = [0; 36];
    let mut face = 0;

    while face < 6 {
        let first = face as u32 * 4;
        let quad = [first, first + 1, first + 2, first, first + 2, first + 3];

        let mut i = 0;
        while i < 6 {
            indices[face * 6 + i] = quad[i];
            i += 1;
        }

        face += 1;
    }

    indices
}

/// Flat colored box. The texture list is kept with the cube but nothing samples it.
#[derive(Debug)]
pub struct Cube {
    buffers: Option<MeshBuffers>,
    textures: Vec<Texture>,
}

impl Cube {
    pub fn new(gpu: &Gpu, textures: Vec<Texture>) -> Result<Self, MeshError> {
        let buffers =
            MeshBuffers::upload(gpu, &VERTICES, &INDICES).map_err(MeshError::ResourceCreation)?;

        info!("Created cube");

        Ok(Self {
            buffers: Some(buffers),
            textures,
        })
    }

    pub fn vertices() -> &'static [Vertex; 24] {
        &VERTICES
    }

    pub fn indices() -> &'static [u32; 36] {
        &INDICES
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    /// Moves every resource into the returned cube and leaves this one deleted.
    pub fn take(&mut self) -> Self {
        Self {
            buffers: self.buffers.take(),
            textures: std::mem::take(&mut self.textures),
        }
    }
}

impl Drawable for Cube {
    fn draw(
        &self,
        shader: &ShaderProgram,
        camera: &dyn Camera,
        transform: &Matrix4<f32>,
    ) -> Result<(), MeshError> {
        let buffers = self.buffers.as_ref().ok_or(MeshError::DrawBeforeInit)?;

        shader.activate();
        buffers.bind();

        mesh::set_model_uniform(shader, transform);
        camera.install_view_projection(shader, VIEW_PROJECTION_UNIFORM);

        trace!("Drawing cube with {} indices", buffers.index_count());
        let result = buffers.draw_elements().map_err(MeshError::Draw);

        buffers.unbind();

        result
    }

    fn delete(&mut self) {
        if let Some(mut buffers) = self.buffers.take() {
            buffers.delete();
        }

        self.textures.iter_mut().for_each(Texture::delete);
    }

    fn is_initialized(&self) -> bool {
        self.buffers.is_some()
    }
}
