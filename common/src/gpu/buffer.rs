use crate::gpu::{BufferData, BufferTarget, Gpu, GpuError, ResourceId};

/// Sole owner of one vertex or index buffer. Not `Clone`: two owners would delete the same buffer.
#[derive(Debug)]
pub struct BufferHandle {
    id: Option<ResourceId>,
    target: BufferTarget,
    len: usize,
    gpu: Gpu,
}

impl BufferHandle {
    /// Uploads `data` into a new buffer and leaves it bound.
    pub fn new(gpu: &Gpu, data: BufferData<'_>) -> Result<Self, GpuError> {
        let target = data.target();
        let len = data.len();

        let id = gpu.with(|context| {
            let id = context.create_buffer(data)?;
            context.bind_buffer(target, Some(id));
            Ok::<_, GpuError>(id)
        })?;

        Ok(Self {
            id: Some(id),
            target,
            len,
            gpu: gpu.clone(),
        })
    }

    pub fn id(&self) -> Option<ResourceId> {
        self.id
    }

    pub fn target(&self) -> BufferTarget {
        self.target
    }

    /// Number of vertices or indices uploaded.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_live(&self) -> bool {
        self.id.is_some()
    }

    pub fn bind(&self) {
        if let Some(id) = self.id {
            self.gpu
                .with(|context| context.bind_buffer(self.target, Some(id)));
        }
    }

    pub fn unbind(&self) {
        if self.id.is_some() {
            self.gpu.with(|context| context.bind_buffer(self.target, None));
        }
    }

    /// Releases the buffer. Safe to call any number of times.
    pub fn delete(&mut self) {
        if let Some(id) = self.id.take() {
            self.len = 0;
            self.gpu.with(|context| context.delete_buffer(id));
        }
    }

    /// Moves the buffer out, leaving this handle empty.
    pub fn take(&mut self) -> Self {
        Self {
            id: self.id.take(),
            target: self.target,
            len: std::mem::take(&mut self.len),
            gpu: self.gpu.clone(),
        }
    }
}

impl Drop for BufferHandle {
    fn drop(&mut self) {
        self.delete();
    }
}
