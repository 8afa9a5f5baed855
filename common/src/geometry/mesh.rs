use log::debug;
use nalgebra::Matrix4;

use crate::camera::Camera;
use crate::geometry::vertex::{self, Vertex};
use crate::geometry::MeshError;
use crate::gpu::{BufferData, BufferHandle, Gpu, GpuError, ShaderProgram, UniformValue, VertexLayout};
use crate::maths;

pub const MODEL_UNIFORM: &str = "model";
pub const VIEW_PROJECTION_UNIFORM: &str = "vp";
pub const CAMERA_POSITION_UNIFORM: &str = "camera_position";

/// Something the scene driver can draw any number of times with a fresh transform.
pub trait Drawable {
    fn draw(
        &self,
        shader: &ShaderProgram,
        camera: &dyn Camera,
        transform: &Matrix4<f32>,
    ) -> Result<(), MeshError>;

    /// Releases every GPU resource. Calling it again does nothing.
    fn delete(&mut self);

    fn is_initialized(&self) -> bool;
}

/// A vertex array with its vertex and index buffers, the full attribute layout recorded.
#[derive(Debug)]
pub struct MeshBuffers {
    // Field order is drop order: the layout goes before the buffers it references
    layout: VertexLayout,
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    gpu: Gpu,
}

impl MeshBuffers {
    /// Creates the vertex array and both buffers and leaves all of them unbound. If a step fails,
    /// whatever was already created is released on the way out.
    pub fn upload(gpu: &Gpu, vertices: &[Vertex], indices: &[u32]) -> Result<Self, GpuError> {
        let mut layout = VertexLayout::new(gpu)?;
        layout.bind();

        let vertex_buffer = BufferHandle::new(gpu, BufferData::Vertices(vertices))?;
        let index_buffer = BufferHandle::new(gpu, BufferData::Indices(indices))?;

        layout.describe_attributes(&vertex_buffer, &vertex::ATTRIBUTES)?;

        layout.unbind();
        vertex_buffer.unbind();
        index_buffer.unbind();

        debug!(
            "Uploaded mesh with {} vertices and {} indices",
            vertices.len(),
            indices.len()
        );

        Ok(Self {
            layout,
            vertex_buffer,
            index_buffer,
            gpu: gpu.clone(),
        })
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn vertex_buffer(&self) -> &BufferHandle {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &BufferHandle {
        &self.index_buffer
    }

    pub fn index_count(&self) -> usize {
        self.index_buffer.len()
    }

    pub fn is_live(&self) -> bool {
        self.layout.is_live() && self.vertex_buffer.is_live() && self.index_buffer.is_live()
    }

    pub fn bind(&self) {
        self.layout.bind();
    }

    pub fn unbind(&self) {
        self.layout.unbind();
    }

    /// Indexed draw over every index. The layout must be bound.
    pub fn draw_elements(&self) -> Result<(), GpuError> {
        let count = self.index_count();
        self.gpu.with(|context| context.draw_elements(count))
    }

    pub fn delete(&mut self) {
        self.layout.delete();
        self.vertex_buffer.delete();
        self.index_buffer.delete();
    }

    pub fn take(&mut self) -> Self {
        Self {
            layout: self.layout.take(),
            vertex_buffer: self.vertex_buffer.take(),
            index_buffer: self.index_buffer.take(),
            gpu: self.gpu.clone(),
        }
    }
}

pub fn set_model_uniform(shader: &ShaderProgram, transform: &Matrix4<f32>) {
    shader.set_uniform(
        MODEL_UNIFORM,
        UniformValue::Mat4(maths::raw_matrix(*transform)),
    );
}
