pub use buffer::BufferHandle;
pub use context::{
    BufferData, BufferTarget, ElementType, Gpu, GpuContext, ResourceId, ResourceKind,
    UniformValue, VertexAttribute, WrapMode,
};
pub use error::GpuError;
pub use glium_backend::GliumContext;
pub use headless::{GpuCall, HeadlessContext};
pub use shader::ShaderProgram;
pub use vertex_layout::VertexLayout;

mod buffer;
mod context;
mod error;
mod glium_backend;
mod headless;
mod shader;
pub mod state;
mod vertex_layout;
