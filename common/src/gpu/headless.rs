use fxhash::FxHashMap;
use image::RgbaImage;
use log::trace;

use crate::gpu::state::ContextState;
use crate::gpu::{
    BufferData, BufferTarget, GpuContext, GpuError, ResourceId, ResourceKind, UniformValue,
    VertexAttribute, WrapMode,
};

#[derive(Debug, Clone, PartialEq)]
pub enum GpuCall {
    CreateBuffer {
        id: ResourceId,
        target: BufferTarget,
        len: usize,
    },
    BindBuffer {
        target: BufferTarget,
        buffer: Option<ResourceId>,
    },
    DeleteBuffer(ResourceId),
    CreateVertexArray(ResourceId),
    BindVertexArray(Option<ResourceId>),
    DescribeAttribute {
        vertex_array: ResourceId,
        buffer: ResourceId,
        attribute: VertexAttribute,
    },
    DeleteVertexArray(ResourceId),
    CreateTexture {
        id: ResourceId,
        width: u32,
        height: u32,
    },
    BindTexture {
        unit: u32,
        texture: Option<ResourceId>,
    },
    SetTextureWrap {
        unit: u32,
        mode: WrapMode,
    },
    DeleteTexture(ResourceId),
    CreateProgram(ResourceId),
    UseProgram(Option<ResourceId>),
    SetUniform {
        program: ResourceId,
        name: String,
        value: UniformValue,
    },
    DeleteProgram(ResourceId),
    DrawElements {
        count: usize,
        vertex_array: ResourceId,
        textures: Vec<(u32, ResourceId)>,
    },
}

/// A context with no driver behind it. It follows the same binding rules as the real backend,
/// records every call and counts live resources, which makes leaks and ordering mistakes visible.
#[derive(Debug, Default)]
pub struct HeadlessContext {
    state: ContextState,
    calls: Vec<GpuCall>,
    // Number of creations of a kind still allowed to succeed before one fails
    failures: FxHashMap<ResourceKind, usize>,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ContextState {
        &self.state
    }

    pub fn live(&self, kind: ResourceKind) -> usize {
        self.state.live(kind)
    }

    pub fn live_total(&self) -> usize {
        self.state.live_total()
    }

    pub fn calls(&self) -> &[GpuCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn draw_calls(&self) -> impl Iterator<Item = &GpuCall> {
        self.calls
            .iter()
            .filter(|call| matches!(call, GpuCall::DrawElements { .. }))
    }

    /// Makes the next creation of `kind` fail.
    pub fn fail_next(&mut self, kind: ResourceKind) {
        self.fail_after(kind, 0);
    }

    /// Lets `successes` creations of `kind` through, then fails the one after.
    pub fn fail_after(&mut self, kind: ResourceKind, successes: usize) {
        self.failures.insert(kind, successes);
    }

    fn check_failure(&mut self, kind: ResourceKind) -> Result<(), GpuError> {
        match self.failures.get_mut(&kind) {
            Some(0) => {
                self.failures.remove(&kind);
                Err(GpuError::ResourceCreation(
                    kind,
                    "injected failure".to_owned(),
                ))
            }
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn record(&mut self, call: GpuCall) {
        trace!("{:?}", call);
        self.calls.push(call);
    }
}

impl GpuContext for HeadlessContext {
    fn create_buffer(&mut self, data: BufferData<'_>) -> Result<ResourceId, GpuError> {
        ContextState::check_buffer_data(&data)?;
        self.check_failure(ResourceKind::Buffer)?;

        let id = self.state.register_buffer(data.target(), data.len());
        self.record(GpuCall::CreateBuffer {
            id,
            target: data.target(),
            len: data.len(),
        });

        Ok(id)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<ResourceId>) {
        self.state.bind_buffer(target, buffer);
        self.record(GpuCall::BindBuffer { target, buffer });
    }

    fn delete_buffer(&mut self, buffer: ResourceId) {
        if self.state.remove_buffer(buffer) {
            self.record(GpuCall::DeleteBuffer(buffer));
        }
    }

    fn create_vertex_array(&mut self) -> Result<ResourceId, GpuError> {
        self.check_failure(ResourceKind::VertexArray)?;

        let id = self.state.register_vertex_array();
        self.record(GpuCall::CreateVertexArray(id));

        Ok(id)
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<ResourceId>) {
        self.state.bind_vertex_array(vertex_array);
        self.record(GpuCall::BindVertexArray(vertex_array));
    }

    fn describe_attribute(
        &mut self,
        vertex_array: ResourceId,
        buffer: ResourceId,
        attribute: VertexAttribute,
    ) -> Result<(), GpuError> {
        self.state
            .describe_attribute(vertex_array, buffer, attribute)?;
        self.record(GpuCall::DescribeAttribute {
            vertex_array,
            buffer,
            attribute,
        });

        Ok(())
    }

    fn delete_vertex_array(&mut self, vertex_array: ResourceId) {
        if self.state.remove_vertex_array(vertex_array) {
            self.record(GpuCall::DeleteVertexArray(vertex_array));
        }
    }

    fn create_texture(&mut self, image: &RgbaImage) -> Result<ResourceId, GpuError> {
        self.check_failure(ResourceKind::Texture)?;

        let (width, height) = image.dimensions();
        let id = self.state.register_texture(width, height);
        self.record(GpuCall::CreateTexture { id, width, height });

        Ok(id)
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<ResourceId>) {
        self.state.bind_texture(unit, texture);
        self.record(GpuCall::BindTexture { unit, texture });
    }

    fn set_texture_wrap(&mut self, unit: u32, mode: WrapMode) {
        self.state.set_texture_wrap(unit, mode);
        self.record(GpuCall::SetTextureWrap { unit, mode });
    }

    fn delete_texture(&mut self, texture: ResourceId) {
        if self.state.remove_texture(texture) {
            self.record(GpuCall::DeleteTexture(texture));
        }
    }

    fn create_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ResourceId, GpuError> {
        if vertex_source.trim().is_empty() || fragment_source.trim().is_empty() {
            return Err(GpuError::ShaderCompilation("empty shader source".to_owned()));
        }

        self.check_failure(ResourceKind::Program)?;

        let id = self.state.register_program();
        self.record(GpuCall::CreateProgram(id));

        Ok(id)
    }

    fn use_program(&mut self, program: Option<ResourceId>) {
        self.state.use_program(program);
        self.record(GpuCall::UseProgram(program));
    }

    fn set_uniform(&mut self, program: ResourceId, name: &str, value: UniformValue) {
        self.state.set_uniform(program, name, value);
        self.record(GpuCall::SetUniform {
            program,
            name: name.to_owned(),
            value,
        });
    }

    fn delete_program(&mut self, program: ResourceId) {
        if self.state.remove_program(program) {
            self.record(GpuCall::DeleteProgram(program));
        }
    }

    fn draw_elements(&mut self, count: usize) -> Result<(), GpuError> {
        let command = self.state.draw_command(count)?;

        let call = GpuCall::DrawElements {
            count: command.count,
            vertex_array: command.vertex_array,
            textures: command
                .texture_units
                .iter()
                .map(|(unit, texture)| (*unit, *texture))
                .collect(),
        };

        self.record(call);
        Ok(())
    }
}
