use std::cell::RefCell;
use std::fmt;
use std::num::NonZeroU32;
use std::rc::Rc;

use image::RgbaImage;

use crate::geometry::Vertex;
use crate::gpu::GpuError;

pub type ResourceId = NonZeroU32;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Buffer,
    VertexArray,
    Texture,
    Program,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Buffer => "buffer",
            Self::VertexArray => "vertex array",
            Self::Texture => "texture",
            Self::Program => "program",
        };

        write!(f, "{}", name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Vertex,
    Index,
}

/// The data block a buffer is created from. Vertex buffers are typed so that every backend agrees
/// on the 11 float layout.
#[derive(Copy, Clone, Debug)]
pub enum BufferData<'a> {
    Vertices(&'a [Vertex]),
    Indices(&'a [u32]),
}

impl BufferData<'_> {
    pub fn target(&self) -> BufferTarget {
        match self {
            Self::Vertices(_) => BufferTarget::Vertex,
            Self::Indices(_) => BufferTarget::Index,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Vertices(vertices) => vertices.len(),
            Self::Indices(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ElementType {
    Float,
}

impl ElementType {
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::Float => size_of::<f32>(),
        }
    }
}

/// One attribute slot of a vertex layout, in bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub slot: u32,
    pub components: u8,
    pub element_type: ElementType,
    pub stride: usize,
    pub offset: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    Repeat,
    ClampToEdge,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4([[f32; 4]; 4]),
    /// Texture unit a sampler reads from
    Sampler(u32),
}

/// Every operation a rendering context exposes to the resource owners. Calls act on one implicit
/// set of bindings, the same way an OpenGL context does.
pub trait GpuContext {
    /// Creates and uploads a buffer. The buffer is not bound.
    fn create_buffer(&mut self, data: BufferData<'_>) -> Result<ResourceId, GpuError>;
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<ResourceId>);
    fn delete_buffer(&mut self, buffer: ResourceId);

    fn create_vertex_array(&mut self) -> Result<ResourceId, GpuError>;
    fn bind_vertex_array(&mut self, vertex_array: Option<ResourceId>);
    /// Records an attribute of `buffer` against `vertex_array`. Both have to be the current
    /// bindings.
    fn describe_attribute(
        &mut self,
        vertex_array: ResourceId,
        buffer: ResourceId,
        attribute: VertexAttribute,
    ) -> Result<(), GpuError>;
    fn delete_vertex_array(&mut self, vertex_array: ResourceId);

    fn create_texture(&mut self, image: &RgbaImage) -> Result<ResourceId, GpuError>;
    fn bind_texture(&mut self, unit: u32, texture: Option<ResourceId>);
    /// Applies to the texture bound at `unit`.
    fn set_texture_wrap(&mut self, unit: u32, mode: WrapMode);
    fn delete_texture(&mut self, texture: ResourceId);

    fn create_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ResourceId, GpuError>;
    fn use_program(&mut self, program: Option<ResourceId>);
    fn set_uniform(&mut self, program: ResourceId, name: &str, value: UniformValue);
    fn delete_program(&mut self, program: ResourceId);

    /// Indexed triangle list draw over the first `count` indices of the bound vertex array.
    fn draw_elements(&mut self, count: usize) -> Result<(), GpuError>;
}

/// Shared handle to the current context. Every resource owner keeps one so it can release itself.
#[derive(Clone)]
pub struct Gpu(Rc<RefCell<dyn GpuContext>>);

impl Gpu {
    pub fn new<C: GpuContext + 'static>(context: C) -> Self {
        Self(Rc::new(RefCell::new(context)))
    }

    /// Wraps a context the caller also keeps a typed handle to, e.g. to begin frames or inspect a
    /// headless context.
    pub fn from_shared<C: GpuContext + 'static>(context: Rc<RefCell<C>>) -> Self {
        Self(context)
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut dyn GpuContext) -> R) -> R {
        f(&mut *self.0.borrow_mut())
    }
}

impl fmt::Debug for Gpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Gpu").finish()
    }
}
