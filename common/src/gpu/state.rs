use std::collections::BTreeMap;

use fxhash::FxHashMap;
use itertools::Itertools;
use log::{debug, warn};

use crate::geometry::vertex;
use crate::gpu::{
    BufferData, BufferTarget, GpuError, ResourceId, ResourceKind, UniformValue, VertexAttribute,
    WrapMode,
};

pub const MAX_TEXTURE_UNITS: u32 = 16;

#[derive(Debug)]
struct BufferRecord {
    target: BufferTarget,
    len: usize,
}

#[derive(Debug, Default)]
struct VertexArrayRecord {
    // slot -> (attribute, vertex buffer it was recorded against)
    attributes: BTreeMap<u32, (VertexAttribute, ResourceId)>,
    index_buffer: Option<ResourceId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureRecord {
    pub width: u32,
    pub height: u32,
    pub wrap: WrapMode,
}

/// Everything a backend needs to issue one indexed draw.
#[derive(Debug)]
pub struct DrawCommand<'a> {
    pub program: ResourceId,
    pub vertex_array: ResourceId,
    pub vertex_buffer: ResourceId,
    pub index_buffer: ResourceId,
    pub count: usize,
    pub uniforms: Option<&'a FxHashMap<String, UniformValue>>,
    pub texture_units: &'a BTreeMap<u32, ResourceId>,
}

/// Resource registry and binding state machine with OpenGL semantics. Backends own one of these and
/// only deal with their native objects.
#[derive(Debug, Default)]
pub struct ContextState {
    allocated: u32,

    buffers: FxHashMap<ResourceId, BufferRecord>,
    vertex_arrays: FxHashMap<ResourceId, VertexArrayRecord>,
    textures: FxHashMap<ResourceId, TextureRecord>,
    programs: FxHashMap<ResourceId, FxHashMap<String, UniformValue>>,

    vertex_buffer_binding: Option<ResourceId>,
    // Only used while no vertex array is bound, otherwise the vertex array owns the binding
    index_buffer_binding: Option<ResourceId>,
    vertex_array_binding: Option<ResourceId>,
    texture_units: BTreeMap<u32, ResourceId>,
    program_binding: Option<ResourceId>,

    redundant_deletes: usize,
}

impl ContextState {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> ResourceId {
        let id = ResourceId::MIN.saturating_add(self.allocated);
        self.allocated += 1;
        id
    }

    pub fn live(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Buffer => self.buffers.len(),
            ResourceKind::VertexArray => self.vertex_arrays.len(),
            ResourceKind::Texture => self.textures.len(),
            ResourceKind::Program => self.programs.len(),
        }
    }

    pub fn live_total(&self) -> usize {
        self.buffers.len() + self.vertex_arrays.len() + self.textures.len() + self.programs.len()
    }

    /// Deletes of ids that were never created or were already deleted.
    pub fn redundant_deletes(&self) -> usize {
        self.redundant_deletes
    }

    fn redundant_delete(&mut self, kind: ResourceKind, id: ResourceId) {
        warn!("Deleting unknown {} {}", kind, id);
        self.redundant_deletes += 1;
    }

    pub fn check_buffer_data(data: &BufferData<'_>) -> Result<(), GpuError> {
        if data.is_empty() {
            return Err(GpuError::EmptyData(data.target()));
        }

        Ok(())
    }

    pub fn register_buffer(&mut self, target: BufferTarget, len: usize) -> ResourceId {
        let id = self.allocate();
        debug!("Created {:?} buffer {} with {} elements", target, id, len);

        self.buffers.insert(id, BufferRecord { target, len });
        id
    }

    pub fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<ResourceId>) {
        if let Some(id) = buffer {
            match self.buffers.get(&id) {
                Some(record) if record.target == target => {}
                Some(record) => {
                    warn!(
                        "Cannot bind {:?} buffer {} as a {:?} buffer",
                        record.target, id, target
                    );
                    return;
                }
                None => {
                    warn!("Binding unknown buffer {}", id);
                    return;
                }
            }
        }

        match target {
            BufferTarget::Vertex => self.vertex_buffer_binding = buffer,
            BufferTarget::Index => match self.vertex_array_binding {
                Some(vertex_array) => {
                    if let Some(record) = self.vertex_arrays.get_mut(&vertex_array) {
                        record.index_buffer = buffer;
                    }
                }
                None => self.index_buffer_binding = buffer,
            },
        }
    }

    pub fn bound_buffer(&self, target: BufferTarget) -> Option<ResourceId> {
        match target {
            BufferTarget::Vertex => self.vertex_buffer_binding,
            BufferTarget::Index => match self.vertex_array_binding {
                Some(vertex_array) => self
                    .vertex_arrays
                    .get(&vertex_array)
                    .and_then(|record| record.index_buffer),
                None => self.index_buffer_binding,
            },
        }
    }

    pub fn buffer_len(&self, buffer: ResourceId) -> Option<usize> {
        self.buffers.get(&buffer).map(|record| record.len)
    }

    /// Returns false if the buffer did not exist.
    pub fn remove_buffer(&mut self, buffer: ResourceId) -> bool {
        if self.buffers.remove(&buffer).is_none() {
            self.redundant_delete(ResourceKind::Buffer, buffer);
            return false;
        }

        if self.vertex_buffer_binding == Some(buffer) {
            self.vertex_buffer_binding = None;
        }

        if self.index_buffer_binding == Some(buffer) {
            self.index_buffer_binding = None;
        }

        if let Some(record) = self
            .vertex_array_binding
            .and_then(|vertex_array| self.vertex_arrays.get_mut(&vertex_array))
        {
            if record.index_buffer == Some(buffer) {
                record.index_buffer = None;
            }
        }

        debug!("Deleted buffer {}", buffer);
        true
    }

    pub fn register_vertex_array(&mut self) -> ResourceId {
        let id = self.allocate();
        debug!("Created vertex array {}", id);

        self.vertex_arrays.insert(id, VertexArrayRecord::default());
        id
    }

    pub fn bind_vertex_array(&mut self, vertex_array: Option<ResourceId>) {
        if let Some(id) = vertex_array {
            if !self.vertex_arrays.contains_key(&id) {
                warn!("Binding unknown vertex array {}", id);
                return;
            }
        }

        self.vertex_array_binding = vertex_array;
    }

    pub fn bound_vertex_array(&self) -> Option<ResourceId> {
        self.vertex_array_binding
    }

    pub fn describe_attribute(
        &mut self,
        vertex_array: ResourceId,
        buffer: ResourceId,
        attribute: VertexAttribute,
    ) -> Result<(), GpuError> {
        if self.vertex_buffer_binding != Some(buffer) {
            return Err(GpuError::NotBound("vertex buffer"));
        }

        if self.vertex_array_binding != Some(vertex_array) {
            return Err(GpuError::NotBound("vertex array"));
        }

        let record = self
            .vertex_arrays
            .get_mut(&vertex_array)
            .ok_or(GpuError::UnknownResource(ResourceKind::VertexArray, vertex_array))?;

        // Every buffer holds `Vertex`, so the only valid description of a slot is its own
        let expected = vertex::ATTRIBUTES.get(attribute.slot as usize);
        if expected != Some(&attribute) {
            return Err(GpuError::LayoutMismatch(attribute.slot));
        }

        record.attributes.insert(attribute.slot, (attribute, buffer));

        Ok(())
    }

    pub fn remove_vertex_array(&mut self, vertex_array: ResourceId) -> bool {
        if self.vertex_arrays.remove(&vertex_array).is_none() {
            self.redundant_delete(ResourceKind::VertexArray, vertex_array);
            return false;
        }

        if self.vertex_array_binding == Some(vertex_array) {
            self.vertex_array_binding = None;
        }

        debug!("Deleted vertex array {}", vertex_array);
        true
    }

    pub fn register_texture(&mut self, width: u32, height: u32) -> ResourceId {
        let id = self.allocate();
        debug!("Created {}x{} texture {}", width, height, id);

        self.textures.insert(
            id,
            TextureRecord {
                width,
                height,
                wrap: WrapMode::default(),
            },
        );
        id
    }

    pub fn bind_texture(&mut self, unit: u32, texture: Option<ResourceId>) {
        if unit >= MAX_TEXTURE_UNITS {
            warn!("Texture unit {} is out of range", unit);
            return;
        }

        match texture {
            Some(id) if !self.textures.contains_key(&id) => warn!("Binding unknown texture {}", id),
            Some(id) => {
                self.texture_units.insert(unit, id);
            }
            None => {
                self.texture_units.remove(&unit);
            }
        }
    }

    pub fn bound_texture(&self, unit: u32) -> Option<ResourceId> {
        self.texture_units.get(&unit).copied()
    }

    pub fn set_texture_wrap(&mut self, unit: u32, mode: WrapMode) {
        let record = self
            .texture_units
            .get(&unit)
            .and_then(|texture| self.textures.get_mut(texture));

        match record {
            Some(record) => record.wrap = mode,
            None => warn!("No texture bound at unit {} to set wrap mode on", unit),
        }
    }

    pub fn texture(&self, texture: ResourceId) -> Option<&TextureRecord> {
        self.textures.get(&texture)
    }

    pub fn remove_texture(&mut self, texture: ResourceId) -> bool {
        if self.textures.remove(&texture).is_none() {
            self.redundant_delete(ResourceKind::Texture, texture);
            return false;
        }

        self.texture_units.retain(|_, bound| *bound != texture);

        debug!("Deleted texture {}", texture);
        true
    }

    pub fn register_program(&mut self) -> ResourceId {
        let id = self.allocate();
        debug!("Created program {}", id);

        self.programs.insert(id, FxHashMap::default());
        id
    }

    pub fn use_program(&mut self, program: Option<ResourceId>) {
        if let Some(id) = program {
            if !self.programs.contains_key(&id) {
                warn!("Using unknown program {}", id);
                return;
            }
        }

        self.program_binding = program;
    }

    pub fn bound_program(&self) -> Option<ResourceId> {
        self.program_binding
    }

    pub fn set_uniform(&mut self, program: ResourceId, name: &str, value: UniformValue) {
        match self.programs.get_mut(&program) {
            Some(uniforms) => {
                uniforms.insert(name.to_owned(), value);
            }
            None => warn!("Setting uniform {} on unknown program {}", name, program),
        }
    }

    pub fn uniform(&self, program: ResourceId, name: &str) -> Option<UniformValue> {
        self.programs
            .get(&program)
            .and_then(|uniforms| uniforms.get(name))
            .copied()
    }

    pub fn remove_program(&mut self, program: ResourceId) -> bool {
        if self.programs.remove(&program).is_none() {
            self.redundant_delete(ResourceKind::Program, program);
            return false;
        }

        if self.program_binding == Some(program) {
            self.program_binding = None;
        }

        debug!("Deleted program {}", program);
        true
    }

    /// Checks the bindings for an indexed draw of `count` indices.
    pub fn draw_command(&self, count: usize) -> Result<DrawCommand<'_>, GpuError> {
        let program = self.program_binding.ok_or(GpuError::NotBound("program"))?;

        let vertex_array = self
            .vertex_array_binding
            .ok_or(GpuError::NotBound("vertex array"))?;
        let record = self
            .vertex_arrays
            .get(&vertex_array)
            .ok_or(GpuError::UnknownResource(ResourceKind::VertexArray, vertex_array))?;

        let missing = vertex::ATTRIBUTES
            .iter()
            .map(|attribute| attribute.slot)
            .filter(|slot| !record.attributes.contains_key(slot))
            .collect_vec();

        if !missing.is_empty() {
            return Err(GpuError::IncompleteLayout(missing));
        }

        let vertex_buffer = record
            .attributes
            .values()
            .map(|(_, buffer)| *buffer)
            .next()
            .ok_or(GpuError::NotBound("vertex buffer"))?;

        if !self.buffers.contains_key(&vertex_buffer) {
            return Err(GpuError::UnknownResource(ResourceKind::Buffer, vertex_buffer));
        }

        let index_buffer = record
            .index_buffer
            .ok_or(GpuError::NotBound("index buffer"))?;
        let available = self
            .buffer_len(index_buffer)
            .ok_or(GpuError::UnknownResource(ResourceKind::Buffer, index_buffer))?;

        if count > available {
            return Err(GpuError::IndexOutOfRange { count, available });
        }

        Ok(DrawCommand {
            program,
            vertex_array,
            vertex_buffer,
            index_buffer,
            count,
            uniforms: self.programs.get(&program),
            texture_units: &self.texture_units,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::vertex::{ATTRIBUTES, POSITION};

    fn state_with_layout() -> (ContextState, ResourceId, ResourceId, ResourceId) {
        let mut state = ContextState::new();

        let vertex_array = state.register_vertex_array();
        state.bind_vertex_array(Some(vertex_array));

        let vertex_buffer = state.register_buffer(BufferTarget::Vertex, 4);
        state.bind_buffer(BufferTarget::Vertex, Some(vertex_buffer));

        let index_buffer = state.register_buffer(BufferTarget::Index, 6);
        state.bind_buffer(BufferTarget::Index, Some(index_buffer));

        for attribute in ATTRIBUTES {
            state
                .describe_attribute(vertex_array, vertex_buffer, attribute)
                .unwrap();
        }

        (state, vertex_array, vertex_buffer, index_buffer)
    }

    #[test]
    fn ids_are_unique_across_kinds() {
        let mut state = ContextState::new();

        let buffer = state.register_buffer(BufferTarget::Vertex, 1);
        let vertex_array = state.register_vertex_array();
        let texture = state.register_texture(1, 1);

        assert_ne!(buffer, vertex_array);
        assert_ne!(vertex_array, texture);
        assert_eq!(state.live_total(), 3);
    }

    #[test]
    fn index_buffer_binding_belongs_to_vertex_array() {
        let (mut state, vertex_array, _, index_buffer) = state_with_layout();

        state.bind_vertex_array(None);
        assert_eq!(state.bound_buffer(BufferTarget::Index), None);

        // Unbinding outside the vertex array leaves its record alone
        state.bind_buffer(BufferTarget::Index, None);
        state.bind_vertex_array(Some(vertex_array));
        assert_eq!(state.bound_buffer(BufferTarget::Index), Some(index_buffer));
    }

    #[test]
    fn describe_attribute_requires_bindings() {
        let mut state = ContextState::new();

        let vertex_array = state.register_vertex_array();
        let buffer = state.register_buffer(BufferTarget::Vertex, 1);

        assert_eq!(
            state.describe_attribute(vertex_array, buffer, POSITION),
            Err(GpuError::NotBound("vertex buffer"))
        );

        state.bind_buffer(BufferTarget::Vertex, Some(buffer));

        assert_eq!(
            state.describe_attribute(vertex_array, buffer, POSITION),
            Err(GpuError::NotBound("vertex array"))
        );
    }

    #[test]
    fn describe_attribute_rejects_other_bindings() {
        let mut state = ContextState::new();

        let first_array = state.register_vertex_array();
        let first_buffer = state.register_buffer(BufferTarget::Vertex, 1);
        let second_array = state.register_vertex_array();
        let second_buffer = state.register_buffer(BufferTarget::Vertex, 1);

        state.bind_vertex_array(Some(second_array));
        state.bind_buffer(BufferTarget::Vertex, Some(second_buffer));

        assert_eq!(
            state.describe_attribute(first_array, second_buffer, POSITION),
            Err(GpuError::NotBound("vertex array"))
        );
        assert_eq!(
            state.describe_attribute(second_array, first_buffer, POSITION),
            Err(GpuError::NotBound("vertex buffer"))
        );
    }

    #[test]
    fn describe_attribute_rejects_foreign_layout() {
        let (mut state, vertex_array, vertex_buffer, _) = state_with_layout();

        let shifted = VertexAttribute {
            offset: 4,
            ..POSITION
        };

        assert_eq!(
            state.describe_attribute(vertex_array, vertex_buffer, shifted),
            Err(GpuError::LayoutMismatch(0))
        );
    }

    #[test]
    fn draw_command_reports_missing_slots() {
        let mut state = ContextState::new();

        let program = state.register_program();
        state.use_program(Some(program));

        let vertex_array = state.register_vertex_array();
        state.bind_vertex_array(Some(vertex_array));

        let buffer = state.register_buffer(BufferTarget::Vertex, 4);
        state.bind_buffer(BufferTarget::Vertex, Some(buffer));
        state
            .describe_attribute(vertex_array, buffer, POSITION)
            .unwrap();

        assert_eq!(
            state.draw_command(6).unwrap_err(),
            GpuError::IncompleteLayout(vec![1, 2, 3])
        );
    }

    #[test]
    fn draw_command_checks_index_count() {
        let (mut state, vertex_array, vertex_buffer, index_buffer) = state_with_layout();

        let program = state.register_program();
        state.use_program(Some(program));

        assert_eq!(
            state.draw_command(7).unwrap_err(),
            GpuError::IndexOutOfRange {
                count: 7,
                available: 6
            }
        );

        let command = state.draw_command(6).unwrap();
        assert_eq!(command.vertex_array, vertex_array);
        assert_eq!(command.vertex_buffer, vertex_buffer);
        assert_eq!(command.index_buffer, index_buffer);
    }

    #[test]
    fn deleting_twice_is_counted_not_applied() {
        let mut state = ContextState::new();

        let texture = state.register_texture(2, 2);
        state.bind_texture(0, Some(texture));

        assert!(state.remove_texture(texture));
        assert_eq!(state.bound_texture(0), None);

        assert!(!state.remove_texture(texture));
        assert_eq!(state.redundant_deletes(), 1);
        assert_eq!(state.live(ResourceKind::Texture), 0);
    }

    #[test]
    fn wrap_mode_applies_to_bound_texture() {
        let mut state = ContextState::new();

        let texture = state.register_texture(2, 2);
        state.bind_texture(3, Some(texture));
        state.set_texture_wrap(3, WrapMode::ClampToEdge);

        assert_eq!(state.texture(texture).unwrap().wrap, WrapMode::ClampToEdge);
    }
}
