use crate::gpu::{BufferHandle, Gpu, GpuError, ResourceId, VertexAttribute};

/// Owns one vertex array object and the attribute descriptions recorded into it.
#[derive(Debug)]
pub struct VertexLayout {
    id: Option<ResourceId>,
    attributes: Vec<VertexAttribute>,
    gpu: Gpu,
}

impl VertexLayout {
    pub fn new(gpu: &Gpu) -> Result<Self, GpuError> {
        let id = gpu.with(|context| context.create_vertex_array())?;

        Ok(Self {
            id: Some(id),
            attributes: Vec::new(),
            gpu: gpu.clone(),
        })
    }

    pub fn id(&self) -> Option<ResourceId> {
        self.id
    }

    pub fn is_live(&self) -> bool {
        self.id.is_some()
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn bind(&self) {
        if let Some(id) = self.id {
            self.gpu.with(|context| context.bind_vertex_array(Some(id)));
        }
    }

    pub fn unbind(&self) {
        if self.id.is_some() {
            self.gpu.with(|context| context.bind_vertex_array(None));
        }
    }

    /// Records how `buffer` feeds one attribute slot. Both this layout and `buffer` must be bound.
    pub fn describe_attribute(
        &mut self,
        buffer: &BufferHandle,
        attribute: VertexAttribute,
    ) -> Result<(), GpuError> {
        let vertex_array = self.id.ok_or(GpuError::NotBound("vertex array"))?;
        let buffer = buffer.id().ok_or(GpuError::NotBound("vertex buffer"))?;

        self.gpu
            .with(|context| context.describe_attribute(vertex_array, buffer, attribute))?;

        self.attributes.retain(|existing| existing.slot != attribute.slot);
        self.attributes.push(attribute);

        Ok(())
    }

    pub fn describe_attributes(
        &mut self,
        buffer: &BufferHandle,
        attributes: &[VertexAttribute],
    ) -> Result<(), GpuError> {
        attributes
            .iter()
            .try_for_each(|attribute| self.describe_attribute(buffer, *attribute))
    }

    pub fn delete(&mut self) {
        if let Some(id) = self.id.take() {
            self.attributes.clear();
            self.gpu.with(|context| context.delete_vertex_array(id));
        }
    }

    pub fn take(&mut self) -> Self {
        Self {
            id: self.id.take(),
            attributes: std::mem::take(&mut self.attributes),
            gpu: self.gpu.clone(),
        }
    }
}

impl Drop for VertexLayout {
    fn drop(&mut self) {
        self.delete();
    }
}
