use std::collections::BTreeMap;
use std::rc::Rc;

use fxhash::FxHashMap;
use glium::backend::{Context, Facade};
use glium::index::PrimitiveType;
use glium::texture::RawImage2d;
use glium::uniforms::{
    MagnifySamplerFilter, MinifySamplerFilter, SamplerBehavior, SamplerWrapFunction, Uniforms,
};
use glium::{
    BackfaceCullingMode, Depth, DepthTest, DrawParameters, Frame, IndexBuffer, Program, Surface,
    Texture2d, VertexBuffer,
};
use image::RgbaImage;
use log::{info, trace, warn};

use crate::geometry::Vertex;
use crate::gpu::state::ContextState;
use crate::gpu::{
    BufferData, BufferTarget, GpuContext, GpuError, ResourceId, ResourceKind, UniformValue,
    VertexAttribute, WrapMode,
};

/// OpenGL context backed by glium. Native objects live in per-kind maps keyed by the ids handed
/// out by the shared state, draws go to the frame passed to `begin_frame`.
pub struct GliumContext {
    context: Rc<Context>,
    state: ContextState,

    vertex_buffers: FxHashMap<ResourceId, VertexBuffer<Vertex>>,
    index_buffers: FxHashMap<ResourceId, IndexBuffer<u32>>,
    textures: FxHashMap<ResourceId, Texture2d>,
    programs: FxHashMap<ResourceId, Program>,

    frame: Option<Frame>,
}

impl GliumContext {
    pub fn new<F: Facade + ?Sized>(facade: &F) -> Self {
        let context = facade.get_context().clone();

        info!(
            "Using OpenGL {:?} on {}",
            context.get_opengl_version(),
            context.get_opengl_renderer_string()
        );

        Self {
            context,
            state: ContextState::new(),
            vertex_buffers: FxHashMap::default(),
            index_buffers: FxHashMap::default(),
            textures: FxHashMap::default(),
            programs: FxHashMap::default(),
            frame: None,
        }
    }

    pub fn state(&self) -> &ContextState {
        &self.state
    }

    pub fn begin_frame(&mut self, frame: Frame) {
        if self.frame.replace(frame).is_some() {
            warn!("Beginning a frame while the previous one was never ended");
        }
    }

    pub fn end_frame(&mut self) -> Option<Frame> {
        self.frame.take()
    }

    fn draw_parameters() -> DrawParameters<'static> {
        DrawParameters {
            depth: Depth {
                test: DepthTest::IfLess,
                write: true,
                ..Default::default()
            },
            backface_culling: BackfaceCullingMode::CullClockwise,
            ..DrawParameters::default()
        }
    }
}

fn creation_error(kind: ResourceKind, reason: impl std::fmt::Debug) -> GpuError {
    GpuError::ResourceCreation(kind, format!("{:?}", reason))
}

impl GpuContext for GliumContext {
    fn create_buffer(&mut self, data: BufferData<'_>) -> Result<ResourceId, GpuError> {
        ContextState::check_buffer_data(&data)?;

        match data {
            BufferData::Vertices(vertices) => {
                let buffer = VertexBuffer::new(&self.context, vertices)
                    .map_err(|err| creation_error(ResourceKind::Buffer, err))?;

                let id = self
                    .state
                    .register_buffer(BufferTarget::Vertex, vertices.len());
                self.vertex_buffers.insert(id, buffer);

                Ok(id)
            }
            BufferData::Indices(indices) => {
                let buffer =
                    IndexBuffer::new(&self.context, PrimitiveType::TrianglesList, indices)
                        .map_err(|err| creation_error(ResourceKind::Buffer, err))?;

                let id = self.state.register_buffer(BufferTarget::Index, indices.len());
                self.index_buffers.insert(id, buffer);

                Ok(id)
            }
        }
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<ResourceId>) {
        self.state.bind_buffer(target, buffer);
    }

    fn delete_buffer(&mut self, buffer: ResourceId) {
        if self.state.remove_buffer(buffer) {
            // Dropping the glium object releases the GL name
            self.vertex_buffers.remove(&buffer);
            self.index_buffers.remove(&buffer);
        }
    }

    fn create_vertex_array(&mut self) -> Result<ResourceId, GpuError> {
        // glium builds and caches the GL vertex array object itself on first draw
        Ok(self.state.register_vertex_array())
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<ResourceId>) {
        self.state.bind_vertex_array(vertex_array);
    }

    fn describe_attribute(
        &mut self,
        vertex_array: ResourceId,
        buffer: ResourceId,
        attribute: VertexAttribute,
    ) -> Result<(), GpuError> {
        self.state
            .describe_attribute(vertex_array, buffer, attribute)
    }

    fn delete_vertex_array(&mut self, vertex_array: ResourceId) {
        self.state.remove_vertex_array(vertex_array);
    }

    fn create_texture(&mut self, image: &RgbaImage) -> Result<ResourceId, GpuError> {
        let dimensions = image.dimensions();

        // OpenGL expects the first row to be the bottom of the image
        let raw_image = RawImage2d::from_raw_rgba_reversed(image.as_raw(), dimensions);
        let texture = Texture2d::new(&self.context, raw_image)
            .map_err(|err| creation_error(ResourceKind::Texture, err))?;

        let id = self.state.register_texture(dimensions.0, dimensions.1);
        self.textures.insert(id, texture);

        Ok(id)
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<ResourceId>) {
        self.state.bind_texture(unit, texture);
    }

    fn set_texture_wrap(&mut self, unit: u32, mode: WrapMode) {
        self.state.set_texture_wrap(unit, mode);
    }

    fn delete_texture(&mut self, texture: ResourceId) {
        if self.state.remove_texture(texture) {
            self.textures.remove(&texture);
        }
    }

    fn create_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ResourceId, GpuError> {
        let program = Program::from_source(&self.context, vertex_source, fragment_source, None)
            .map_err(|err| GpuError::ShaderCompilation(err.to_string()))?;

        let id = self.state.register_program();
        self.programs.insert(id, program);

        Ok(id)
    }

    fn use_program(&mut self, program: Option<ResourceId>) {
        self.state.use_program(program);
    }

    fn set_uniform(&mut self, program: ResourceId, name: &str, value: UniformValue) {
        self.state.set_uniform(program, name, value);
    }

    fn delete_program(&mut self, program: ResourceId) {
        if self.state.remove_program(program) {
            self.programs.remove(&program);
        }
    }

    fn draw_elements(&mut self, count: usize) -> Result<(), GpuError> {
        let command = self.state.draw_command(count)?;
        let frame = self.frame.as_mut().ok_or(GpuError::NoFrame)?;

        let vertex_buffer = self.vertex_buffers.get(&command.vertex_buffer).ok_or(
            GpuError::UnknownResource(ResourceKind::Buffer, command.vertex_buffer),
        )?;
        let index_buffer = self.index_buffers.get(&command.index_buffer).ok_or(
            GpuError::UnknownResource(ResourceKind::Buffer, command.index_buffer),
        )?;
        let program = self.programs.get(&command.program).ok_or(
            GpuError::UnknownResource(ResourceKind::Program, command.program),
        )?;

        let indices = index_buffer
            .slice(0..command.count)
            .ok_or(GpuError::IndexOutOfRange {
                count: command.count,
                available: index_buffer.len(),
            })?;

        let uniforms = FrameUniforms {
            values: command.uniforms,
            texture_units: command.texture_units,
            textures: &self.textures,
            state: &self.state,
        };

        trace!(
            "Drawing {} indices with vertex array {}",
            command.count, command.vertex_array
        );

        frame
            .draw(
                vertex_buffer,
                indices,
                program,
                &uniforms,
                &Self::draw_parameters(),
            )
            .map_err(|err| GpuError::Draw(err.to_string()))
    }
}

/// Uniform values of one program, resolved against the textures bound when the draw is issued.
struct FrameUniforms<'a> {
    values: Option<&'a FxHashMap<String, UniformValue>>,
    texture_units: &'a BTreeMap<u32, ResourceId>,
    textures: &'a FxHashMap<ResourceId, Texture2d>,
    state: &'a ContextState,
}

fn sampler_behavior(wrap: WrapMode) -> SamplerBehavior {
    let wrap = match wrap {
        WrapMode::Repeat => SamplerWrapFunction::Repeat,
        WrapMode::ClampToEdge => SamplerWrapFunction::Clamp,
    };

    SamplerBehavior {
        wrap_function: (wrap, wrap, wrap),
        minify_filter: MinifySamplerFilter::LinearMipmapLinear,
        magnify_filter: MagnifySamplerFilter::Linear,
        ..SamplerBehavior::default()
    }
}

impl Uniforms for FrameUniforms<'_> {
    fn visit_values<'b, F: FnMut(&str, glium::uniforms::UniformValue<'b>)>(
        &'b self,
        mut visit: F,
    ) {
        use glium::uniforms::UniformValue as Glium;

        for (name, value) in self.values.into_iter().flatten() {
            let value = match *value {
                UniformValue::Float(value) => Glium::Float(value),
                UniformValue::Int(value) => Glium::SignedInt(value),
                UniformValue::Vec3(value) => Glium::Vec3(value),
                UniformValue::Vec4(value) => Glium::Vec4(value),
                UniformValue::Mat4(value) => Glium::Mat4(value),
                UniformValue::Sampler(unit) => {
                    let bound = self.texture_units.get(&unit).and_then(|id| {
                        Some((self.textures.get(id)?, self.state.texture(*id)?))
                    });

                    match bound {
                        Some((texture, record)) => {
                            Glium::Texture2d(texture, Some(sampler_behavior(record.wrap)))
                        }
                        None => {
                            warn!("Sampler {} reads unit {} with no texture bound", name, unit);
                            continue;
                        }
                    }
                }
            };

            visit(name, value);
        }
    }
}
